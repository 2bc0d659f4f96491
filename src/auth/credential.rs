//! Composite `<keyId>.<secret>` credential parsing with redacted formatting.

// self
use crate::_prelude::*;

/// Parsed API credential; the secret half never appears in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
	key_id: String,
	secret: String,
}
impl Credential {
	/// Splits `raw` into its key identifier and signing secret.
	///
	/// The string must contain exactly one `.` with non-empty text on both sides.
	pub fn parse(raw: &str) -> Result<Self> {
		let mut parts = raw.split('.');

		match (parts.next(), parts.next(), parts.next()) {
			(Some(key_id), Some(secret), None) if !key_id.is_empty() && !secret.is_empty() =>
				Ok(Self { key_id: key_id.into(), secret: secret.into() }),
			_ => Err(Error::InvalidCredentialFormat),
		}
	}

	/// Returns the public key identifier embedded in every token.
	pub fn key_id(&self) -> &str {
		&self.key_id
	}

	/// Returns the signing secret. Callers must avoid logging this string.
	pub fn expose_secret(&self) -> &str {
		&self.secret
	}
}
impl FromStr for Credential {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		Self::parse(s)
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("key_id", &self.key_id)
			.field("secret", &"<redacted>")
			.finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}.<redacted>", self.key_id)
	}
}

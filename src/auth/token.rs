//! Short-lived HS256 token signing with per-credential caching.
//!
//! Tokens are compact JWTs whose header carries `sign_type: SIGN` and whose payload carries the
//! credential's key identifier, an expiry [`TOKEN_TTL`] after issuance, and the issue instant in
//! milliseconds. The remote service rejects tokens older than [`TOKEN_TTL`], so cached tokens are
//! only reused for [`CACHE_TTL`].

pub mod cache;

// std
use std::sync::LazyLock;
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	auth::{
		Credential,
		token::cache::{CachedToken, TokenCache, unix_millis},
	},
	obs::{self, TokenSource},
};

type HmacSha256 = Hmac<Sha256>;

/// Lifetime enforced by the remote service for every signed token.
pub const TOKEN_TTL: Duration = Duration::seconds(180);
/// Window during which a cached token is reused; 30 seconds shorter than [`TOKEN_TTL`].
pub const CACHE_TTL: Duration = Duration::seconds(150);

static SHARED: LazyLock<TokenIssuer> = LazyLock::new(TokenIssuer::default);

/// JOSE header attached to every token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
	/// Signature algorithm, always `HS256`.
	pub alg: String,
	/// Token type, always `JWT`.
	pub typ: String,
	/// Token class marker, always `SIGN`.
	pub sign_type: String,
}
impl TokenHeader {
	fn sign() -> Self {
		Self { alg: "HS256".into(), typ: "JWT".into(), sign_type: "SIGN".into() }
	}

	/// Decodes the header segment of `token` without verifying the signature.
	pub fn from_token(token: &str) -> Option<Self> {
		decode_segment(token.split('.').next()?)
	}
}

/// Payload carried by every token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
	/// Key identifier half of the credential.
	pub api_key: String,
	/// Expiry in seconds since the Unix epoch.
	pub exp: i64,
	/// Issue instant in milliseconds since the Unix epoch.
	pub timestamp: i64,
	/// Issue instant in seconds since the Unix epoch.
	pub iat: i64,
}
impl TokenClaims {
	fn new(credential: &Credential, issued_at: OffsetDateTime) -> Self {
		let iat = issued_at.unix_timestamp();

		Self {
			api_key: credential.key_id().into(),
			exp: iat + TOKEN_TTL.whole_seconds(),
			timestamp: unix_millis(issued_at),
			iat,
		}
	}

	/// Decodes the payload segment of `token` without verifying the signature.
	pub fn from_token(token: &str) -> Option<Self> {
		decode_segment(token.split('.').nth(1)?)
	}
}

/// Produces signed tokens for credentials, reusing cached tokens while they are fresh.
///
/// Clones share the same cache. Tokens are signed at the current instant; only a cached
/// token replacing one issued in the same millisecond for the same credential is moved one
/// millisecond later, so a regenerated token never equals the one it replaces.
#[derive(Clone, Debug, Default)]
pub struct TokenIssuer {
	cache: TokenCache,
}
impl TokenIssuer {
	/// Creates an issuer backed by the provided cache.
	pub fn new(cache: TokenCache) -> Self {
		Self { cache }
	}

	/// Returns a handle to the process-wide issuer.
	pub fn shared() -> Self {
		SHARED.clone()
	}

	/// Cache backing this issuer.
	pub fn cache(&self) -> &TokenCache {
		&self.cache
	}

	/// Issues a token for `credential` using the current UTC instant.
	pub fn issue(&self, credential: &str, use_cache: bool) -> Result<String> {
		self.issue_at(credential, use_cache, OffsetDateTime::now_utc())
	}

	/// Issues a token for `credential`, treating `now` as the current instant.
	///
	/// An invalid credential fails before the cache is touched.
	pub fn issue_at(&self, credential: &str, use_cache: bool, now: OffsetDateTime) -> Result<String> {
		let parsed = Credential::parse(credential)?;

		if use_cache && let Some(token) = self.cache.fresh(credential, now) {
			obs::record_token_issue(TokenSource::Cache);

			return Ok(token);
		}

		let issued_at = if use_cache { self.cache.next_issue_instant(credential, now) } else { now };
		let token = sign(&parsed, issued_at)?;

		if use_cache {
			self.cache.save(credential, CachedToken::new(token.clone(), issued_at));
		}

		obs::record_token_issue(TokenSource::Signed);

		Ok(token)
	}

	/// Empties the cache. Tokens already handed out stay valid.
	pub fn clear_all(&self) {
		self.cache.clear_all();
	}

	/// Drops the cached token for `credential`, if any.
	pub fn clear_one(&self, credential: &str) {
		self.cache.clear_one(credential);
	}
}

fn sign(credential: &Credential, issued_at: OffsetDateTime) -> Result<String> {
	let signing_input = format!(
		"{}.{}",
		encode_segment(&TokenHeader::sign())?,
		encode_segment(&TokenClaims::new(credential, issued_at))?
	);
	let mut mac = HmacSha256::new_from_slice(credential.expose_secret().as_bytes())
		.map_err(|e| Error::TokenGenerationFailed { reason: e.to_string() })?;

	mac.update(signing_input.as_bytes());

	let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

	Ok(format!("{signing_input}.{signature}"))
}

fn encode_segment<T>(value: &T) -> Result<String>
where
	T: Serialize,
{
	let json = serde_json::to_vec(value)
		.map_err(|e| Error::TokenGenerationFailed { reason: e.to_string() })?;

	Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T>(segment: &str) -> Option<T>
where
	T: for<'de> Deserialize<'de>,
{
	let json = URL_SAFE_NO_PAD.decode(segment).ok()?;

	serde_json::from_slice(&json).ok()
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	const CREDENTIAL: &str = "key123.secretXYZ";

	#[test]
	fn token_layout_matches_wire_format() {
		let issuer = TokenIssuer::default();
		let now = macros::datetime!(2025-11-10 12:00:00.250 UTC);
		let token = issuer.issue_at(CREDENTIAL, false, now).expect("Token should be issued.");
		let segments = token.split('.').collect::<Vec<_>>();

		assert_eq!(segments.len(), 3);

		let header = TokenHeader::from_token(&token).expect("Header should decode.");

		assert_eq!(header, TokenHeader::sign());

		let claims = TokenClaims::from_token(&token).expect("Claims should decode.");

		assert_eq!(claims.api_key, "key123");
		assert_eq!(claims.iat, now.unix_timestamp());
		assert_eq!(claims.exp, now.unix_timestamp() + 180);
		assert_eq!(claims.timestamp, now.unix_timestamp() * 1_000 + 250);

		let mut mac = HmacSha256::new_from_slice(b"secretXYZ").expect("HMAC accepts any key.");

		mac.update(format!("{}.{}", segments[0], segments[1]).as_bytes());

		let expected = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

		assert_eq!(segments[2], expected);
	}

	#[test]
	fn cache_hit_within_window_returns_same_token() {
		let issuer = TokenIssuer::default();
		let now = macros::datetime!(2025-11-10 12:00 UTC);
		let first = issuer.issue_at(CREDENTIAL, true, now).expect("First issue should succeed.");
		let second = issuer
			.issue_at(CREDENTIAL, true, now + Duration::milliseconds(149_999))
			.expect("Second issue should succeed.");

		assert_eq!(first, second);
	}

	#[test]
	fn expired_cache_entry_is_regenerated_with_later_timestamp() {
		let issuer = TokenIssuer::default();
		let now = macros::datetime!(2025-11-10 12:00 UTC);
		let first = issuer.issue_at(CREDENTIAL, true, now).expect("First issue should succeed.");
		let second = issuer
			.issue_at(CREDENTIAL, true, now + CACHE_TTL)
			.expect("Issue after the cache window should succeed.");
		let first_claims = TokenClaims::from_token(&first).expect("Claims should decode.");
		let second_claims = TokenClaims::from_token(&second).expect("Claims should decode.");

		assert_ne!(first, second);
		assert!(second_claims.timestamp > first_claims.timestamp);
		assert_eq!(
			issuer.cache().fetch(CREDENTIAL).map(|entry| entry.token),
			Some(second),
			"Cache should hold the regenerated token."
		);
	}

	#[test]
	fn uncached_issue_never_writes_cache() {
		let issuer = TokenIssuer::default();

		issuer.issue(CREDENTIAL, false).expect("Token should be issued.");

		assert!(issuer.cache().is_empty());
	}

	#[test]
	fn invalid_credential_leaves_cache_untouched() {
		let issuer = TokenIssuer::default();

		issuer.issue(CREDENTIAL, true).expect("Valid credential should be cached.");

		for raw in ["onlykey", "a.b.c", ".secret"] {
			assert!(matches!(issuer.issue(raw, true), Err(Error::InvalidCredentialFormat)));
		}

		assert_eq!(issuer.cache().len(), 1);
		assert!(issuer.cache().fetch("onlykey").is_none());
	}

	#[test]
	fn clear_forces_regeneration_even_within_same_millisecond() {
		let issuer = TokenIssuer::default();
		let now = macros::datetime!(2025-11-10 12:00 UTC);
		let before = issuer.issue_at(CREDENTIAL, true, now).expect("Token should be issued.");

		issuer.clear_all();

		let after = issuer.issue_at(CREDENTIAL, true, now).expect("Token should be reissued.");

		assert_ne!(before, after);

		issuer.clear_one(CREDENTIAL);

		let again = issuer.issue_at(CREDENTIAL, true, now).expect("Token should be reissued.");

		assert_ne!(after, again);
	}

	#[test]
	fn burst_signing_keeps_claims_on_the_clock() {
		let issuer = TokenIssuer::default();
		let now = macros::datetime!(2025-11-10 12:00:00.500 UTC);
		let credentials = ["key123.secretXYZ", "other.secret", "third.secret"];

		for round in 0..2_000 {
			for use_cache in [false, true] {
				let credential = credentials[round % credentials.len()];
				let token =
					issuer.issue_at(credential, use_cache, now).expect("Token should be issued.");
				let claims = TokenClaims::from_token(&token).expect("Claims should decode.");

				assert_eq!(claims.timestamp, unix_millis(now));
				assert_eq!(claims.exp - now.unix_timestamp(), TOKEN_TTL.whole_seconds());
			}
		}

		let cached = issuer.cache().fetch(CREDENTIAL).expect("Credential should be cached.");

		assert_eq!(cached.issued_at, now);
	}

	#[test]
	fn clones_and_shared_handles_share_cache() {
		let issuer = TokenIssuer::default();
		let clone = issuer.clone();
		let token = issuer.issue(CREDENTIAL, true).expect("Token should be issued.");

		assert_eq!(clone.issue(CREDENTIAL, true).expect("Clone should hit the cache."), token);

		let shared = TokenIssuer::shared();
		let credential = "shared-handle-test.secret";
		let shared_token = shared.issue(credential, true).expect("Shared issuer should sign.");

		assert_eq!(
			TokenIssuer::shared().cache().fresh(credential, OffsetDateTime::now_utc()),
			Some(shared_token)
		);

		shared.clear_one(credential);
	}
}

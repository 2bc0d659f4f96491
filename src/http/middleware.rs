//! Request middleware contract applied to every outgoing request before transmission.

// crates.io
use reqwest::{
	Request,
	header::{AUTHORIZATION, HeaderValue},
};
// self
use crate::{_prelude::*, auth::TokenIssuer, error::ConfigError};

/// Augments an outgoing request; runs after header merging and before transmission.
///
/// Any `Fn(Request) -> Result<Request>` closure qualifies.
pub trait RequestMiddleware
where
	Self: Send + Sync,
{
	/// Consumes the request and returns the augmented one.
	fn apply(&self, request: Request) -> Result<Request>;
}
impl<F> RequestMiddleware for F
where
	F: Send + Sync + Fn(Request) -> Result<Request>,
{
	fn apply(&self, request: Request) -> Result<Request> {
		self(request)
	}
}

/// Sets the `Authorization` header to a freshly issued (or cached) token.
///
/// The token is the whole header value, without a `Bearer ` prefix. The transport runs this
/// middleware last, so caller-supplied `Authorization` headers are always replaced.
#[derive(Clone)]
pub struct AuthMiddleware {
	issuer: TokenIssuer,
	credential: String,
	use_cache: bool,
}
impl AuthMiddleware {
	/// Creates a middleware signing with `credential` through `issuer`.
	pub fn new(issuer: TokenIssuer, credential: impl Into<String>, use_cache: bool) -> Self {
		Self { issuer, credential: credential.into(), use_cache }
	}

	/// Issuer backing this middleware.
	pub fn issuer(&self) -> &TokenIssuer {
		&self.issuer
	}
}
impl RequestMiddleware for AuthMiddleware {
	fn apply(&self, mut request: Request) -> Result<Request> {
		let token = self.issuer.issue(&self.credential, self.use_cache)?;
		let mut value = HeaderValue::from_str(&token)
			.map_err(|_| ConfigError::InvalidHeaderValue { name: AUTHORIZATION.to_string() })?;

		value.set_sensitive(true);
		request.headers_mut().insert(AUTHORIZATION, value);

		Ok(request)
	}
}
impl Debug for AuthMiddleware {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthMiddleware")
			.field("issuer", &self.issuer)
			.field("credential", &"<redacted>")
			.field("use_cache", &self.use_cache)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use reqwest::{Method, header::HeaderName};
	// self
	use super::*;

	fn request() -> Request {
		let mut request =
			Request::new(Method::POST, Url::parse("https://api.example.com/v4/echo").expect("URL."));

		request.headers_mut().insert(AUTHORIZATION, HeaderValue::from_static("forged"));

		request
	}

	#[test]
	fn auth_middleware_replaces_caller_authorization() {
		let issuer = TokenIssuer::default();
		let middleware = AuthMiddleware::new(issuer.clone(), "key123.secretXYZ", true);
		let request = middleware.apply(request()).expect("Middleware should sign the request.");
		let values = request.headers().get_all(AUTHORIZATION).iter().collect::<Vec<_>>();
		let cached = issuer
			.cache()
			.fetch("key123.secretXYZ")
			.expect("Cached token should exist after signing.");

		assert_eq!(values.len(), 1);
		assert_eq!(values[0].to_str().ok(), Some(cached.token.as_str()));
		assert!(values[0].is_sensitive());
		assert!(!cached.token.starts_with("Bearer "));
	}

	#[test]
	fn auth_middleware_propagates_invalid_credentials() {
		let middleware = AuthMiddleware::new(TokenIssuer::default(), "onlykey", true);
		let err = middleware.apply(request()).expect_err("Malformed credential must fail.");

		assert!(matches!(err, Error::InvalidCredentialFormat));
		assert!(!format!("{middleware:?}").contains("onlykey"));
	}

	#[test]
	fn closures_act_as_middleware() {
		let tag = |mut request: Request| -> Result<Request> {
			request
				.headers_mut()
				.insert(HeaderName::from_static("x-trace"), HeaderValue::from_static("on"));

			Ok(request)
		};
		let request = tag.apply(request()).expect("Closure middleware should succeed.");

		assert_eq!(request.headers().get("x-trace").and_then(|v| v.to_str().ok()), Some("on"));
	}
}

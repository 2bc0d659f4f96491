//! Client construction options, resolved configuration, and per-call overrides.

// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::_prelude::*;

/// Default origin for the Z.ai deployment.
pub const Z_AI_BASE_URL: &str = "https://api.z.ai/api/paas/v4/";
/// Origin for the ZhipuAI (open.bigmodel.cn) deployment.
pub const ZHIPU_AI_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4/";
/// Environment variable consulted when no API key is configured.
pub const ENV_API_KEY: &str = "ZAI_API_KEY";
/// Environment variable consulted when no base URL is configured.
pub const ENV_BASE_URL: &str = "ZAI_BASE_URL";
/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_millis(60_000);
/// Retry budget recorded when none is configured. Stored only; the transport never retries.
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Client identifier sent as `User-Agent`.
pub const USER_AGENT: &str = concat!("zai-sdk-rust/", env!("CARGO_PKG_VERSION"));

/// Construction input; every field is optional and resolved by [`ClientOptions::resolve`].
#[derive(Clone, Default)]
pub struct ClientOptions {
	/// Composite `<keyId>.<secret>` credential.
	pub api_key: Option<String>,
	/// Origin every request path is appended to.
	pub base_url: Option<String>,
	/// Request timeout.
	pub timeout: Option<StdDuration>,
	/// Retry budget passed through to callers.
	pub max_retries: Option<u32>,
	/// Headers sent with every request.
	pub default_headers: BTreeMap<String, String>,
	/// Whether signed tokens are cached; defaults to `true`.
	pub cache_token: Option<bool>,
}
impl ClientOptions {
	/// Options preselecting the Z.ai origin.
	pub fn zai(api_key: impl Into<String>) -> Self {
		Self::default().with_api_key(api_key).with_base_url(Z_AI_BASE_URL)
	}

	/// Options preselecting the ZhipuAI origin.
	pub fn zhipu(api_key: impl Into<String>) -> Self {
		Self::default().with_api_key(api_key).with_base_url(ZHIPU_AI_BASE_URL)
	}

	/// Sets the credential.
	pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
		self.api_key = Some(api_key.into());

		self
	}

	/// Sets the origin.
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());

		self
	}

	/// Sets the request timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Sets the retry budget.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = Some(max_retries);

		self
	}

	/// Adds one default header, replacing an earlier value for the same name.
	pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.default_headers.insert(name.into(), value.into());

		self
	}

	/// Replaces the default header set.
	pub fn with_default_headers(mut self, headers: BTreeMap<String, String>) -> Self {
		self.default_headers = headers;

		self
	}

	/// Enables or disables token caching.
	pub fn with_cache_token(mut self, cache_token: bool) -> Self {
		self.cache_token = Some(cache_token);

		self
	}

	/// Resolves the options against the process environment.
	pub fn resolve(self) -> Result<ClientConfig> {
		self.resolve_with(|name| std::env::var(name).ok())
	}

	/// Resolves the options, reading fallbacks through `lookup`.
	///
	/// Explicit values win over [`ENV_API_KEY`] / [`ENV_BASE_URL`], which win over built-in
	/// defaults. Empty strings count as absent.
	pub fn resolve_with<F>(self, lookup: F) -> Result<ClientConfig>
	where
		F: Fn(&str) -> Option<String>,
	{
		let credential = non_empty(self.api_key)
			.or_else(|| non_empty(lookup(ENV_API_KEY)))
			.ok_or(Error::MissingCredential)?;
		let base_url = non_empty(self.base_url)
			.or_else(|| non_empty(lookup(ENV_BASE_URL)))
			.unwrap_or_else(|| Z_AI_BASE_URL.into());

		Ok(ClientConfig {
			credential,
			base_url,
			timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
			max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
			default_headers: self.default_headers,
			cache_enabled: self.cache_token.unwrap_or(true),
		})
	}
}
impl Debug for ClientOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientOptions")
			.field("api_key_set", &self.api_key.is_some())
			.field("base_url", &self.base_url)
			.field("timeout", &self.timeout)
			.field("max_retries", &self.max_retries)
			.field("default_headers", &self.default_headers.keys().collect::<Vec<_>>())
			.field("cache_token", &self.cache_token)
			.finish()
	}
}

/// Resolved, immutable configuration owned by one transport.
#[derive(Clone)]
pub struct ClientConfig {
	credential: String,
	base_url: String,
	timeout: StdDuration,
	max_retries: u32,
	default_headers: BTreeMap<String, String>,
	cache_enabled: bool,
}
impl ClientConfig {
	/// Raw credential string. Callers must avoid logging it.
	pub fn credential(&self) -> &str {
		&self.credential
	}

	/// Origin every request path is appended to.
	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Default request timeout.
	pub fn timeout(&self) -> StdDuration {
		self.timeout
	}

	/// Retry budget; recorded for callers, never enacted by the transport.
	pub fn max_retries(&self) -> u32 {
		self.max_retries
	}

	/// Headers layered above the built-in defaults.
	pub fn default_headers(&self) -> &BTreeMap<String, String> {
		&self.default_headers
	}

	/// Whether signed tokens are cached.
	pub fn cache_enabled(&self) -> bool {
		self.cache_enabled
	}
}
impl Debug for ClientConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientConfig")
			.field("credential", &"<redacted>")
			.field("base_url", &self.base_url)
			.field("timeout", &self.timeout)
			.field("max_retries", &self.max_retries)
			.field("default_headers", &self.default_headers.keys().collect::<Vec<_>>())
			.field("cache_enabled", &self.cache_enabled)
			.finish()
	}
}

/// Per-call overrides merged over [`ClientConfig`] at call time.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// Timeout for this call.
	pub timeout: Option<StdDuration>,
	/// Headers layered above the configured defaults.
	pub headers: BTreeMap<String, String>,
	/// Retry budget for this call; recorded only.
	pub max_retries: Option<u32>,
	/// Token that aborts the call (and any stream it returns) when cancelled.
	pub cancellation_token: Option<CancellationToken>,
}
impl RequestOptions {
	/// Sets the timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Adds one header, replacing an earlier value for the same name.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Sets the retry budget.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = Some(max_retries);

		self
	}

	/// Attaches a cancellation token.
	pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
		self.cancellation_token = Some(token);

		self
	}

	/// Layers `self` over `defaults`: scalar fields from `self` win when set and headers merge
	/// with `self` taking precedence.
	pub fn merged_over(self, defaults: RequestOptions) -> RequestOptions {
		let mut headers = defaults.headers;

		headers.extend(self.headers);

		RequestOptions {
			timeout: self.timeout.or(defaults.timeout),
			headers,
			max_retries: self.max_retries.or(defaults.max_retries),
			cancellation_token: self.cancellation_token.or(defaults.cancellation_token),
		}
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
		move |name| pairs.iter().find(|(key, _)| *key == name).map(|(_, value)| value.to_string())
	}

	#[test]
	fn resolve_applies_defaults() {
		let config = ClientOptions::default()
			.with_api_key("key.secret")
			.resolve_with(env(&[]))
			.expect("Explicit key should resolve.");

		assert_eq!(config.credential(), "key.secret");
		assert_eq!(config.base_url(), Z_AI_BASE_URL);
		assert_eq!(config.timeout(), StdDuration::from_millis(60_000));
		assert_eq!(config.max_retries(), 2);
		assert!(config.cache_enabled());
		assert!(config.default_headers().is_empty());
	}

	#[test]
	fn resolve_falls_back_to_environment() {
		let config = ClientOptions::default()
			.with_api_key("")
			.resolve_with(env(&[
				(ENV_API_KEY, "envkey.envsecret"),
				(ENV_BASE_URL, "https://proxy.example.com/v4/"),
			]))
			.expect("Environment key should resolve.");

		assert_eq!(config.credential(), "envkey.envsecret");
		assert_eq!(config.base_url(), "https://proxy.example.com/v4/");
	}

	#[test]
	fn explicit_values_beat_environment() {
		let config = ClientOptions::zhipu("explicit.secret")
			.with_timeout(StdDuration::from_secs(5))
			.with_max_retries(7)
			.with_cache_token(false)
			.resolve_with(env(&[(ENV_API_KEY, "env.secret"), (ENV_BASE_URL, "https://env")]))
			.expect("Explicit options should resolve.");

		assert_eq!(config.credential(), "explicit.secret");
		assert_eq!(config.base_url(), ZHIPU_AI_BASE_URL);
		assert_eq!(config.timeout(), StdDuration::from_secs(5));
		assert_eq!(config.max_retries(), 7);
		assert!(!config.cache_enabled());
	}

	#[test]
	fn missing_credential_fails_fast() {
		let err = ClientOptions::default()
			.resolve_with(env(&[(ENV_API_KEY, "")]))
			.expect_err("Resolution without a key must fail.");

		assert!(matches!(err, Error::MissingCredential));
	}

	#[test]
	fn debug_output_redacts_credential() {
		let options = ClientOptions::zai("key.topsecret");
		let config = options.clone().resolve_with(env(&[])).expect("Options should resolve.");

		assert!(!format!("{options:?}").contains("topsecret"));
		assert!(!format!("{config:?}").contains("topsecret"));
	}

	#[test]
	fn request_options_merge_prefers_call_values() {
		let defaults = RequestOptions::default()
			.with_timeout(StdDuration::from_secs(10))
			.with_header("A", "default")
			.with_header("B", "default");
		let merged = RequestOptions::default()
			.with_header("B", "call")
			.with_max_retries(1)
			.merged_over(defaults);

		assert_eq!(merged.timeout, Some(StdDuration::from_secs(10)));
		assert_eq!(merged.max_retries, Some(1));
		assert_eq!(merged.headers.get("A").map(String::as_str), Some("default"));
		assert_eq!(merged.headers.get("B").map(String::as_str), Some("call"));
	}
}

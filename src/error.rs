//! Client-level error types shared by token issuance, the transport, and resources.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// No response was received (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Structured error body returned by the remote service.
	#[error(transparent)]
	Api(#[from] ApiError),

	/// Credential does not split into exactly two non-empty `<keyId>.<secret>` parts.
	#[error("Credential must have the form `<keyId>.<secret>`.")]
	InvalidCredentialFormat,
	/// Signing the authentication token failed.
	#[error("Failed to generate authentication token: {reason}.")]
	TokenGenerationFailed {
		/// Underlying cause; never contains the secret.
		reason: String,
	},
	/// No credential could be resolved from options or the environment.
	#[error("API key is required; provide it via options or the ZAI_API_KEY environment variable.")]
	MissingCredential,
	/// A successful response body did not match the expected shape.
	#[error("Response body could not be decoded (HTTP {status}).")]
	Decode {
		/// HTTP status code of the response.
		status: u16,
		/// Path-aware parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A successful response body expected to be text was not valid UTF-8.
	#[error("Response body is not valid UTF-8 (HTTP {status}).")]
	InvalidText {
		/// HTTP status code of the response.
		status: u16,
		/// Position of the first invalid byte.
		#[source]
		source: std::string::FromUtf8Error,
	},
	/// A streamed response violated the server-sent event framing.
	#[error("Streamed response is malformed: {reason}.")]
	MalformedStream {
		/// Parser-supplied description.
		reason: String,
	},
	/// The caller cancelled the exchange before it completed.
	#[error("Request was cancelled.")]
	Cancelled,
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying builder failure.
		#[source]
		source: BoxError,
	},
	/// Base origin or request path does not form a valid URL.
	#[error("Request URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Offending URL text.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Header name is not a valid HTTP token.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
	},
	/// Header value contains bytes HTTP does not allow.
	#[error("Value for header `{name}` is invalid.")]
	InvalidHeaderValue {
		/// Header whose value was rejected.
		name: String,
	},
	/// HTTP request construction failed.
	#[error("HTTP request could not be constructed.")]
	RequestBuild {
		/// Underlying builder failure.
		#[source]
		source: BoxError,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	Serialize(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a request builder failure inside [`ConfigError`].
	pub fn request_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::RequestBuild { source: Box::new(src) }
	}
}

/// Transport-level failures where no usable response was received.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The exchange exceeded its timeout.
	#[error("Request timed out.")]
	Timeout,
	/// The service answered with a failure status and no body to pass through.
	#[error("API responded with HTTP {status} and an empty body.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

/// Error body returned by the remote service, kept exactly as received.
#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("API responded with HTTP {status}: {}.", summarize(.body))]
pub struct ApiError {
	/// HTTP status code of the failed response.
	pub status: u16,
	/// Response body as JSON; non-JSON bodies are stored as a JSON string.
	pub body: serde_json::Value,
}
impl ApiError {
	/// Builds an error from a failed response body, returning `None` when the body is blank.
	pub fn from_body(status: u16, body: &[u8]) -> Option<Self> {
		if body.iter().all(u8::is_ascii_whitespace) {
			return None;
		}

		let body = serde_json::from_slice(body).unwrap_or_else(|_| {
			serde_json::Value::String(String::from_utf8_lossy(body).into_owned())
		});

		Some(Self { status, body })
	}

	/// Parses the documented `{ "error": { .. } }` shape, if the body follows it.
	pub fn detail(&self) -> Option<ApiErrorDetail> {
		parse_detail(&self.body)
	}
}

fn parse_detail(body: &serde_json::Value) -> Option<ApiErrorDetail> {
	ApiErrorBody::deserialize(body).ok().map(|body| body.error)
}

fn summarize(body: &serde_json::Value) -> String {
	match parse_detail(body) {
		Some(detail) => detail.message,
		None => match body {
			serde_json::Value::String(text) => text.clone(),
			other => other.to_string(),
		},
	}
}

/// Error payload envelope documented by the remote service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
	/// Error details.
	pub error: ApiErrorDetail,
}

/// Fields of a documented remote error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
	/// Human-readable message.
	pub message: String,
	/// Error category.
	#[serde(rename = "type", default)]
	pub kind: String,
	/// Service-specific error code.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn api_error_keeps_json_body_verbatim() {
		let raw = br#"{"error":{"message":"bad request","type":"invalid_request"}}"#;
		let err = ApiError::from_body(400, raw).expect("Non-empty body should produce an ApiError.");

		assert_eq!(
			err.body,
			serde_json::json!({"error": {"message": "bad request", "type": "invalid_request"}})
		);

		let detail = err.detail().expect("Documented error shape should parse.");

		assert_eq!(detail.message, "bad request");
		assert_eq!(detail.kind, "invalid_request");
		assert_eq!(detail.code, None);
		assert_eq!(err.to_string(), "API responded with HTTP 400: bad request.");
	}

	#[test]
	fn api_error_wraps_text_and_skips_blank_bodies() {
		let err = ApiError::from_body(502, b"upstream exploded")
			.expect("Text body should still produce an ApiError.");

		assert_eq!(err.body, serde_json::Value::String("upstream exploded".into()));
		assert!(err.detail().is_none());
		assert!(ApiError::from_body(500, b"  \n").is_none());
	}

	#[test]
	fn api_error_converts_into_client_error() {
		let err: Error = ApiError { status: 401, body: serde_json::json!({"code": 1000}) }.into();

		assert!(matches!(err, Error::Api(ApiError { status: 401, .. })));
	}

	#[test]
	fn token_generation_failure_reports_reason_only() {
		let err = Error::TokenGenerationFailed { reason: "HMAC key rejected".into() };

		assert_eq!(err.to_string(), "Failed to generate authentication token: HMAC key rejected.");
	}
}

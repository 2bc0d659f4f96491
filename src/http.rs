//! Authenticated HTTP transport shared by every resource.
//!
//! [`Transport`] owns a [`ReqwestClient`], the resolved [`ClientConfig`], and the middleware
//! chain. Every call shape funnels through one preparation routine that merges headers in
//! precedence order (built-in < configured defaults < per-call < authorization), applies the
//! effective timeout, runs caller middleware in registration order, and finally signs the
//! request through [`AuthMiddleware`]. Buffered shapes decode the whole body; the streaming shape
//! hands back a [`ResponseStream`] as soon as response headers arrive.

pub mod middleware;
pub mod stream;

pub use middleware::*;
pub use stream::*;

// crates.io
use bytes::Bytes;
use reqwest::{
	Method, Request, StatusCode,
	header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
	multipart::Form,
};
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	auth::TokenIssuer,
	config::{ClientConfig, ClientOptions, RequestOptions, USER_AGENT},
	error::{ApiError, ConfigError, TransportError},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Body attached to an outgoing request.
#[derive(Debug, Default)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// Pre-serialized JSON bytes.
	Json(Vec<u8>),
	/// Multipart form; the HTTP client supplies the boundary.
	Form(Form),
}
impl RequestBody {
	/// Serializes `body` as JSON.
	pub fn json<B>(body: &B) -> Result<Self>
	where
		B: ?Sized + Serialize,
	{
		Ok(Self::Json(serde_json::to_vec(body).map_err(ConfigError::from)?))
	}
}

/// Headers every request starts from before configured and per-call layers apply.
pub fn builtin_headers() -> BTreeMap<String, String> {
	BTreeMap::from([
		(CONTENT_TYPE.to_string(), "application/json".into()),
		(reqwest::header::USER_AGENT.to_string(), USER_AGENT.into()),
	])
}

/// Merges header layers from lowest to highest precedence.
///
/// Names compare case-insensitively; a later layer replaces any earlier value for the same name.
pub fn merge_headers<'a, I>(layers: I) -> Result<HeaderMap>
where
	I: IntoIterator<Item = &'a BTreeMap<String, String>>,
{
	let mut headers = HeaderMap::new();

	for layer in layers {
		for (name, value) in layer {
			let header = HeaderName::from_bytes(name.as_bytes())
				.map_err(|_| ConfigError::InvalidHeaderName { name: name.clone() })?;
			let value = HeaderValue::from_str(value)
				.map_err(|_| ConfigError::InvalidHeaderValue { name: name.clone() })?;

			headers.insert(header, value);
		}
	}

	Ok(headers)
}

/// Authenticated HTTP transport.
///
/// Clones share the underlying connection pool, configuration, and token issuer.
#[derive(Clone)]
pub struct Transport {
	http_client: ReqwestClient,
	config: ClientConfig,
	auth: AuthMiddleware,
	middlewares: Vec<Arc<dyn RequestMiddleware>>,
}
impl Transport {
	/// Resolves `options` against the environment and builds a transport.
	pub fn new(options: ClientOptions) -> Result<Self> {
		Self::with_config(options.resolve()?)
	}

	/// Builds a transport around a fresh [`ReqwestClient`].
	pub fn with_config(config: ClientConfig) -> Result<Self> {
		let http_client = ReqwestClient::builder().build().map_err(ConfigError::http_client_build)?;

		Ok(Self::with_http_client(config, http_client))
	}

	/// Builds a transport around a caller-supplied [`ReqwestClient`].
	///
	/// The transport owns an isolated [`TokenIssuer`]; use [`Transport::with_token_issuer`] to
	/// share one (for example [`TokenIssuer::shared`]).
	pub fn with_http_client(config: ClientConfig, http_client: ReqwestClient) -> Self {
		let auth =
			AuthMiddleware::new(TokenIssuer::default(), config.credential(), config.cache_enabled());

		Self { http_client, config, auth, middlewares: Vec::new() }
	}

	/// Replaces the token issuer used to sign requests.
	pub fn with_token_issuer(mut self, issuer: TokenIssuer) -> Self {
		self.auth =
			AuthMiddleware::new(issuer, self.config.credential(), self.config.cache_enabled());

		self
	}

	/// Appends a middleware; middleware runs in registration order, before authorization.
	pub fn with_middleware<M>(mut self, middleware: M) -> Self
	where
		M: 'static + RequestMiddleware,
	{
		self.middlewares.push(Arc::new(middleware));

		self
	}

	/// Resolved configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Issuer signing this transport's requests.
	pub fn token_issuer(&self) -> &TokenIssuer {
		self.auth.issuer()
	}

	/// Timeout that applies to a call made with `options`.
	pub fn effective_timeout(&self, options: &RequestOptions) -> StdDuration {
		options.timeout.unwrap_or_else(|| self.config.timeout())
	}

	/// Retry budget for a call made with `options`. Reported only; calls are never retried.
	pub fn effective_max_retries(&self, options: &RequestOptions) -> u32 {
		options.max_retries.unwrap_or_else(|| self.config.max_retries())
	}

	/// Joins `path` onto the configured origin; absolute `http(s)` URLs pass through.
	pub fn endpoint(&self, path: &str) -> Result<Url> {
		let url = if path.starts_with("http://") || path.starts_with("https://") {
			path.to_owned()
		} else {
			format!(
				"{}/{}",
				self.config.base_url().trim_end_matches('/'),
				path.trim_start_matches('/')
			)
		};

		Url::parse(&url).map_err(|source| Error::from(ConfigError::InvalidBaseUrl { url, source }))
	}

	/// Sends a JSON `GET` and decodes the response body.
	pub async fn get<T>(&self, path: &str, options: RequestOptions) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.request(CallKind::Get, path, RequestBody::Empty, options).await
	}

	/// Sends a `GET` and returns the response body as text.
	///
	/// A body that is not valid UTF-8 fails with [`Error::InvalidText`].
	pub async fn get_text(&self, path: &str, options: RequestOptions) -> Result<String> {
		let (status, bytes) = self.observe(CallKind::Get, path, RequestBody::Empty, options).await?;

		String::from_utf8(bytes.into()).map_err(|source| Error::InvalidText { status, source })
	}

	/// Sends a JSON `POST` and decodes the response body.
	pub async fn post<B, T>(&self, path: &str, body: &B, options: RequestOptions) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.request(CallKind::Post, path, RequestBody::json(body)?, options).await
	}

	/// Sends a JSON `PUT` and decodes the response body.
	pub async fn put<B, T>(&self, path: &str, body: &B, options: RequestOptions) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.request(CallKind::Put, path, RequestBody::json(body)?, options).await
	}

	/// Sends a `DELETE` and decodes the response body.
	pub async fn delete<T>(&self, path: &str, options: RequestOptions) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.request(CallKind::Delete, path, RequestBody::Empty, options).await
	}

	/// Sends a multipart `POST` and decodes the response body.
	///
	/// Any configured or per-call `Content-Type` is dropped so the multipart boundary survives.
	pub async fn post_form<T>(&self, path: &str, form: Form, options: RequestOptions) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.request(CallKind::PostForm, path, RequestBody::Form(form), options).await
	}

	/// Sends a JSON `POST` whose response is consumed incrementally.
	pub async fn stream<B>(
		&self,
		path: &str,
		body: &B,
		options: RequestOptions,
	) -> Result<ResponseStream>
	where
		B: ?Sized + Serialize,
	{
		self.request_stream(path, RequestBody::json(body)?, options).await
	}

	/// Performs a buffered exchange and decodes the JSON body as `T`.
	///
	/// An empty success body decodes as JSON `null`, so `()` and `Option<_>` accept it.
	pub async fn request<T>(
		&self,
		kind: CallKind,
		path: &str,
		body: RequestBody,
		options: RequestOptions,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let (status, bytes) = self.observe(kind, path, body, options).await?;

		decode(status, &bytes)
	}

	/// Opens a streamed `POST` exchange.
	///
	/// The timeout covers the wait for response headers only. The returned stream is cancelled
	/// by [`ResponseStream::cancel`] or by the per-call cancellation token, whichever fires first.
	pub async fn request_stream(
		&self,
		path: &str,
		body: RequestBody,
		options: RequestOptions,
	) -> Result<ResponseStream> {
		let kind = CallKind::Stream;
		let span = CallSpan::new(kind, path);

		span.instrument(async move {
			obs::record_call_outcome(kind, CallOutcome::Attempt);

			let result = self.open_stream(path, body, options).await;

			obs::record_call_outcome(kind, outcome_of(&result));

			result
		})
		.await
	}

	/// Builds the outgoing request for `kind` without sending it.
	pub fn prepare(
		&self,
		kind: CallKind,
		path: &str,
		body: RequestBody,
		options: &RequestOptions,
	) -> Result<Request> {
		let url = self.endpoint(path)?;
		let builtin = builtin_headers();
		let mut headers =
			merge_headers([&builtin, self.config.default_headers(), &options.headers])?;

		if matches!(body, RequestBody::Form(_)) {
			headers.remove(CONTENT_TYPE);
		}

		let mut builder = self.http_client.request(method_of(kind), url).headers(headers);

		builder = match body {
			RequestBody::Empty => builder,
			RequestBody::Json(bytes) => builder.body(bytes),
			RequestBody::Form(form) => builder.multipart(form),
		};

		if kind != CallKind::Stream {
			builder = builder.timeout(self.effective_timeout(options));
		}

		let mut request = builder.build().map_err(ConfigError::request_build)?;

		for middleware in &self.middlewares {
			request = middleware.apply(request)?;
		}

		self.auth.apply(request)
	}

	async fn observe(
		&self,
		kind: CallKind,
		path: &str,
		body: RequestBody,
		options: RequestOptions,
	) -> Result<(u16, Bytes)> {
		let span = CallSpan::new(kind, path);

		span.instrument(async move {
			obs::record_call_outcome(kind, CallOutcome::Attempt);

			let result = self.exchange(kind, path, body, options).await;

			obs::record_call_outcome(kind, outcome_of(&result));

			result
		})
		.await
	}

	async fn exchange(
		&self,
		kind: CallKind,
		path: &str,
		body: RequestBody,
		options: RequestOptions,
	) -> Result<(u16, Bytes)> {
		let request = self.prepare(kind, path, body, &options)?;

		until_cancelled(options.cancellation_token.as_ref(), async {
			let response = self.http_client.execute(request).await.map_err(TransportError::from)?;
			let status = response.status();
			let bytes = response.bytes().await.map_err(TransportError::from)?;

			ensure_success(status, &bytes)?;

			Ok::<_, Error>((status.as_u16(), bytes))
		})
		.await
	}

	async fn open_stream(
		&self,
		path: &str,
		body: RequestBody,
		options: RequestOptions,
	) -> Result<ResponseStream> {
		let timeout = self.effective_timeout(&options);
		let request = self.prepare(CallKind::Stream, path, body, &options)?;
		let cancel = options
			.cancellation_token
			.as_ref()
			.map(CancellationToken::child_token)
			.unwrap_or_default();
		let response = until_cancelled(Some(&cancel), async {
			let response = tokio::time::timeout(timeout, self.http_client.execute(request))
				.await
				.map_err(|_| TransportError::Timeout)?
				.map_err(TransportError::from)?;

			Ok::<_, Error>(response)
		})
		.await?;
		let status = response.status();

		if !status.is_success() {
			let bytes = until_cancelled(Some(&cancel), async {
				response.bytes().await.map_err(|e| Error::from(TransportError::from(e)))
			})
			.await?;

			return Err(failure(status, &bytes));
		}

		Ok(ResponseStream::from_response(response, cancel))
	}
}
impl Debug for Transport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Transport")
			.field("config", &self.config)
			.field("auth", &self.auth)
			.field("middlewares", &self.middlewares.len())
			.finish()
	}
}

fn method_of(kind: CallKind) -> Method {
	match kind {
		CallKind::Get => Method::GET,
		CallKind::Put => Method::PUT,
		CallKind::Delete => Method::DELETE,
		CallKind::Post | CallKind::PostForm | CallKind::Stream => Method::POST,
	}
}

fn outcome_of<T>(result: &Result<T>) -> CallOutcome {
	if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure }
}

fn ensure_success(status: StatusCode, body: &[u8]) -> Result<()> {
	if status.is_success() { Ok(()) } else { Err(failure(status, body)) }
}

fn failure(status: StatusCode, body: &[u8]) -> Error {
	obs::trace_failed_status(status.as_u16());

	match ApiError::from_body(status.as_u16(), body) {
		Some(e) => e.into(),
		None => TransportError::UnexpectedStatus { status: status.as_u16() }.into(),
	}
}

fn decode<T>(status: u16, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let body = if body.iter().all(u8::is_ascii_whitespace) { b"null".as_slice() } else { body };
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de).map_err(|source| Error::Decode { status, source })
}

async fn until_cancelled<F, T>(cancel: Option<&CancellationToken>, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	match cancel {
		Some(cancel) => tokio::select! {
			biased;
			_ = cancel.cancelled() => Err(Error::Cancelled),
			result = fut => result,
		},
		None => fut.await,
	}
}

//! Entry point bundling a [`Transport`] with the resource facades.

// self
use crate::{
	_prelude::*,
	config::{ClientOptions, RequestOptions},
	http::Transport,
	resources::{Chat, Embeddings, Files, Images},
};

/// API client; cheap to clone.
///
/// ```no_run
/// use zai_sdk::{
/// 	ZaiClient,
/// 	config::RequestOptions,
/// 	model,
/// 	resources::{ChatCompletionParams, ChatMessage},
/// };
///
/// # async fn run() -> zai_sdk::error::Result<()> {
/// let client = ZaiClient::of_zai("key.secret")?;
/// let params = ChatCompletionParams::new(model::GLM_4_FLASH, vec![ChatMessage::user("Hello")]);
/// let completion = client.chat().create(&params, RequestOptions::default()).await?;
///
/// println!("{:?}", completion.first_text());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ZaiClient {
	transport: Transport,
	defaults: RequestOptions,
}
impl ZaiClient {
	/// Builds a client from construction options, falling back to the environment.
	pub fn new(options: ClientOptions) -> Result<Self> {
		Ok(Self::from_transport(Transport::new(options)?))
	}

	/// Client for the Z.ai deployment.
	pub fn of_zai(api_key: impl Into<String>) -> Result<Self> {
		Self::new(ClientOptions::zai(api_key))
	}

	/// Client for the ZhipuAI deployment.
	pub fn of_zhipu(api_key: impl Into<String>) -> Result<Self> {
		Self::new(ClientOptions::zhipu(api_key))
	}

	/// Wraps an existing transport.
	pub fn from_transport(transport: Transport) -> Self {
		Self { transport, defaults: RequestOptions::default() }
	}

	/// Sets per-call options every resource call layers its own options over.
	///
	/// Headers merge by name with the call's own headers winning; the remaining fields fall back
	/// to these defaults only when the call leaves them unset.
	pub fn with_request_defaults(mut self, defaults: RequestOptions) -> Self {
		self.defaults = defaults;

		self
	}

	/// Underlying transport, for endpoints without a typed facade.
	pub fn transport(&self) -> &Transport {
		&self.transport
	}

	/// Chat completions.
	pub fn chat(&self) -> Chat<'_> {
		Chat::new(&self.transport).with_defaults(self.defaults.clone())
	}

	/// Image generation.
	pub fn images(&self) -> Images<'_> {
		Images::new(&self.transport).with_defaults(self.defaults.clone())
	}

	/// Text embeddings.
	pub fn embeddings(&self) -> Embeddings<'_> {
		Embeddings::new(&self.transport).with_defaults(self.defaults.clone())
	}

	/// File management.
	pub fn files(&self) -> Files<'_> {
		Files::new(&self.transport).with_defaults(self.defaults.clone())
	}
}

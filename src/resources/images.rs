//! Image generation.

// self
use crate::{_prelude::*, config::RequestOptions, http::Transport};

/// Parameters for an image generation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageGenerationParams {
	/// Model identifier, e.g. [`crate::model::COGVIEW_3_PLUS`].
	pub model: String,
	/// Text description of the image.
	pub prompt: String,
	/// Number of images.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub n: Option<u32>,
	/// Quality tier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub quality: Option<String>,
	/// `url` or `b64_json`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response_format: Option<String>,
	/// Dimensions such as `1024x1024`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub size: Option<String>,
	/// Style hint.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub style: Option<String>,
	/// End-user identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user: Option<String>,
}
impl ImageGenerationParams {
	/// Parameters with only the required fields set.
	pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
		Self {
			model: model.into(),
			prompt: prompt.into(),
			n: None,
			quality: None,
			response_format: None,
			size: None,
			style: None,
			user: None,
		}
	}

	/// Sets the image dimensions.
	pub fn with_size(mut self, size: impl Into<String>) -> Self {
		self.size = Some(size.into());

		self
	}
}

/// Generated images.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesResponse {
	/// Creation time in seconds since the Unix epoch.
	#[serde(default)]
	pub created: i64,
	/// One entry per image.
	pub data: Vec<GeneratedImage>,
}

/// One generated image, as a URL or base64 data depending on the requested format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
	/// Temporary download URL.
	#[serde(default)]
	pub url: Option<String>,
	/// Base64-encoded image.
	#[serde(default)]
	pub b64_json: Option<String>,
	/// Prompt after server-side rewriting.
	#[serde(default)]
	pub revised_prompt: Option<String>,
}

/// `POST /images/generations`.
#[derive(Clone, Debug)]
pub struct Images<'a> {
	transport: &'a Transport,
	defaults: RequestOptions,
}
impl<'a> Images<'a> {
	/// Binds the resource to `transport`.
	pub fn new(transport: &'a Transport) -> Self {
		Self { transport, defaults: RequestOptions::default() }
	}

	/// Sets options every call layers its own options over.
	pub fn with_defaults(mut self, defaults: RequestOptions) -> Self {
		self.defaults = defaults;

		self
	}

	/// Generates images from a prompt.
	pub async fn generate(
		&self,
		params: &ImageGenerationParams,
		options: RequestOptions,
	) -> Result<ImagesResponse> {
		self.transport.post("/images/generations", params, self.options(options)).await
	}

	fn options(&self, options: RequestOptions) -> RequestOptions {
		options.merged_over(self.defaults.clone())
	}
}

//! Text embeddings.

// self
use crate::{_prelude::*, config::RequestOptions, http::Transport, resources::Usage};

/// Text to embed: one string or a batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
	/// Single text.
	Text(String),
	/// Batch of texts, embedded in order.
	Batch(Vec<String>),
}
impl From<&str> for EmbeddingInput {
	fn from(text: &str) -> Self {
		Self::Text(text.into())
	}
}
impl From<String> for EmbeddingInput {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}
impl From<Vec<String>> for EmbeddingInput {
	fn from(batch: Vec<String>) -> Self {
		Self::Batch(batch)
	}
}

/// Parameters for an embedding request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmbeddingParams {
	/// Model identifier, e.g. [`crate::model::EMBEDDING_3`].
	pub model: String,
	/// Text to embed.
	pub input: EmbeddingInput,
	/// Output dimensionality (supported by `embedding-3`).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dimensions: Option<u32>,
	/// Vector encoding, e.g. `float`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub encoding_format: Option<String>,
	/// End-user identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user: Option<String>,
}
impl EmbeddingParams {
	/// Parameters with only the required fields set.
	pub fn new(model: impl Into<String>, input: impl Into<EmbeddingInput>) -> Self {
		Self {
			model: model.into(),
			input: input.into(),
			dimensions: None,
			encoding_format: None,
			user: None,
		}
	}

	/// Requests vectors of `dimensions` length.
	pub fn with_dimensions(mut self, dimensions: u32) -> Self {
		self.dimensions = Some(dimensions);

		self
	}
}

/// Embedding vectors for a request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
	/// One vector per input, in input order.
	pub data: Vec<Embedding>,
	/// Model that produced the vectors.
	#[serde(default)]
	pub model: String,
	/// Token accounting.
	#[serde(default)]
	pub usage: Option<Usage>,
}

/// One embedding vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
	/// Position of the matching input.
	#[serde(default)]
	pub index: u32,
	/// Vector components.
	pub embedding: Vec<f32>,
}

/// `POST /embeddings`.
#[derive(Clone, Debug)]
pub struct Embeddings<'a> {
	transport: &'a Transport,
	defaults: RequestOptions,
}
impl<'a> Embeddings<'a> {
	/// Binds the resource to `transport`.
	pub fn new(transport: &'a Transport) -> Self {
		Self { transport, defaults: RequestOptions::default() }
	}

	/// Sets options every call layers its own options over.
	pub fn with_defaults(mut self, defaults: RequestOptions) -> Self {
		self.defaults = defaults;

		self
	}

	/// Embeds the input text.
	pub async fn create(
		&self,
		params: &EmbeddingParams,
		options: RequestOptions,
	) -> Result<EmbeddingResponse> {
		self.transport.post("/embeddings", params, self.options(options)).await
	}

	fn options(&self, options: RequestOptions) -> RequestOptions {
		options.merged_over(self.defaults.clone())
	}
}

//! Typed request shaping for the remote endpoints; each resource is a thin caller of
//! [`Transport`](crate::http::Transport).

pub mod chat;
pub mod embeddings;
pub mod files;
pub mod images;

pub use chat::*;
pub use embeddings::*;
pub use files::*;
pub use images::*;

// self
use crate::_prelude::*;

/// Token accounting attached to completion and embedding responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
	/// Tokens consumed by the prompt.
	#[serde(default)]
	pub prompt_tokens: u32,
	/// Tokens produced by the completion.
	#[serde(default)]
	pub completion_tokens: u32,
	/// Sum of prompt and completion tokens.
	#[serde(default)]
	pub total_tokens: u32,
}

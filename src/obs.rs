//! Optional observability helpers for transport calls and token issuance.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `zai_sdk.call` with the `call` (shape) and
//!   `path` fields, plus debug events for token issuance and failed responses.
//! - Enable `metrics` to increment the `zai_sdk_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`, and the `zai_sdk_token_issue_total`
//!   counter labeled by `source`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Call shapes exposed by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Buffered JSON `GET`.
	Get,
	/// Buffered JSON `POST`.
	Post,
	/// Buffered JSON `PUT`.
	Put,
	/// Buffered `DELETE`.
	Delete,
	/// Buffered multipart `POST`.
	PostForm,
	/// Streamed `POST`.
	Stream,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Get => "get",
			CallKind::Post => "post",
			CallKind::Put => "put",
			CallKind::Delete => "delete",
			CallKind::PostForm => "post_form",
			CallKind::Stream => "stream",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a transport call.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Where an issued token came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenSource {
	/// Reused from the token cache.
	Cache,
	/// Freshly signed.
	Signed,
}
impl TokenSource {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenSource::Cache => "cache",
			TokenSource::Signed => "signed",
		}
	}
}
impl Display for TokenSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

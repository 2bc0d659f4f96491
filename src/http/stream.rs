//! Cancellable response streams: raw bytes, server-sent events, and JSON events.
//!
//! Nothing here buffers a whole response. Every stream ends (`None`) after the body ends, after
//! the first error item, or as soon as its cancellation token fires, and dropping the inner body
//! releases the connection.

// std
use std::{
	marker::PhantomData,
	task::{Context, Poll, ready},
};
// crates.io
use bytes::Bytes;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
// self
use crate::{_prelude::*, error::TransportError};

/// Data payload that marks the end of a server-sent event stream.
pub const DONE_SENTINEL: &str = "[DONE]";

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;
type SseStream = Pin<Box<eventsource_stream::EventStream<ResponseStream>>>;

/// Live response body delivered chunk by chunk.
pub struct ResponseStream {
	status: u16,
	inner: Option<ByteStream>,
	cancel: CancellationToken,
	cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
}
impl ResponseStream {
	pub(crate) fn from_response(response: reqwest::Response, cancel: CancellationToken) -> Self {
		let status = response.status().as_u16();
		let body = response
			.bytes_stream()
			.map(|chunk| chunk.map_err(|e| Error::from(TransportError::from(e))));

		Self::from_stream(status, body, cancel)
	}

	/// Wraps an arbitrary chunk stream.
	pub fn from_stream<S>(status: u16, stream: S, cancel: CancellationToken) -> Self
	where
		S: 'static + Send + Stream<Item = Result<Bytes>>,
	{
		let cancelled = Box::pin(cancel.clone().cancelled_owned());

		Self { status, inner: Some(Box::pin(stream)), cancel, cancelled }
	}

	/// HTTP status of the response.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Token that cancels this stream when fired from anywhere.
	pub fn cancellation_token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	/// Stops the stream and releases the connection; later polls yield `None`.
	pub fn cancel(&mut self) {
		self.cancel.cancel();
		self.inner = None;
	}

	/// Returns `true` once cancellation has been requested.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Frames the body as server-sent events.
	pub fn events(self) -> EventStream {
		EventStream::new(self)
	}

	/// Frames the body as server-sent events whose data decodes as `T`.
	pub fn json<T>(self) -> JsonStream<T>
	where
		T: DeserializeOwned,
	{
		JsonStream::new(self.events())
	}
}
impl Stream for ResponseStream {
	type Item = Result<Bytes>;

	fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		let this = self.get_mut();

		if this.inner.is_none() {
			return Poll::Ready(None);
		}
		if this.cancelled.as_mut().poll(cx).is_ready() {
			this.inner = None;

			return Poll::Ready(None);
		}

		let Some(inner) = this.inner.as_mut() else {
			return Poll::Ready(None);
		};
		let item = ready!(inner.as_mut().poll_next(cx));

		if !matches!(item, Some(Ok(_))) {
			this.inner = None;
		}

		Poll::Ready(item)
	}
}
impl Debug for ResponseStream {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResponseStream")
			.field("status", &self.status)
			.field("open", &self.inner.is_some())
			.field("cancelled", &self.is_cancelled())
			.finish()
	}
}

/// One server-sent event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamEvent {
	/// Event name; empty for the default `message` type.
	pub event: String,
	/// Event data with multi-line payloads joined by `\n`.
	pub data: String,
	/// Last event identifier seen on the stream.
	pub id: String,
}
impl StreamEvent {
	/// Decodes the event data as JSON.
	pub fn json<T>(&self) -> std::result::Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_str(&self.data);

		serde_path_to_error::deserialize(&mut de)
	}
}
impl From<eventsource_stream::Event> for StreamEvent {
	fn from(event: eventsource_stream::Event) -> Self {
		Self { event: event.event, data: event.data, id: event.id }
	}
}

/// Server-sent event view over a [`ResponseStream`]; a `data: [DONE]` event ends it.
pub struct EventStream {
	status: u16,
	inner: Option<SseStream>,
	cancel: CancellationToken,
}
impl EventStream {
	fn new(stream: ResponseStream) -> Self {
		let status = stream.status;
		let cancel = stream.cancel.clone();

		Self { status, inner: Some(Box::pin(stream.eventsource())), cancel }
	}

	/// HTTP status of the response.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Token that cancels this stream when fired from anywhere.
	pub fn cancellation_token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	/// Stops the stream and releases the connection; later polls yield `None`.
	pub fn cancel(&mut self) {
		self.cancel.cancel();
		self.inner = None;
	}
}
impl Stream for EventStream {
	type Item = Result<StreamEvent>;

	fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		let this = self.get_mut();

		if this.cancel.is_cancelled() {
			this.inner = None;
		}

		let Some(inner) = this.inner.as_mut() else {
			return Poll::Ready(None);
		};
		let item = match ready!(inner.as_mut().poll_next(cx)) {
			Some(Ok(event)) if event.data == DONE_SENTINEL => None,
			Some(Ok(event)) => return Poll::Ready(Some(Ok(event.into()))),
			Some(Err(EventStreamError::Transport(e))) => Some(Err(e)),
			Some(Err(e)) => Some(Err(Error::MalformedStream { reason: e.to_string() })),
			None => None,
		};

		this.inner = None;

		Poll::Ready(item)
	}
}
impl Debug for EventStream {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("EventStream")
			.field("status", &self.status)
			.field("open", &self.inner.is_some())
			.field("cancelled", &self.cancel.is_cancelled())
			.finish()
	}
}

/// Server-sent event stream whose event data decodes as `T`.
pub struct JsonStream<T> {
	events: EventStream,
	_marker: PhantomData<fn() -> T>,
}
impl<T> JsonStream<T> {
	fn new(events: EventStream) -> Self {
		Self { events, _marker: PhantomData }
	}

	/// Token that cancels this stream when fired from anywhere.
	pub fn cancellation_token(&self) -> CancellationToken {
		self.events.cancellation_token()
	}

	/// Stops the stream and releases the connection; later polls yield `None`.
	pub fn cancel(&mut self) {
		self.events.cancel();
	}
}
impl<T> Stream for JsonStream<T>
where
	T: DeserializeOwned,
{
	type Item = Result<T>;

	fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		let this = self.get_mut();
		let status = this.events.status;

		Pin::new(&mut this.events).poll_next(cx).map(|item| {
			item.map(|event| {
				event.and_then(|event| {
					event.json().map_err(|source| Error::Decode { status, source })
				})
			})
		})
	}
}
impl<T> Debug for JsonStream<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JsonStream").field("events", &self.events).finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use futures::stream;
	// self
	use super::*;

	fn chunks(parts: &'static [&'static str]) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
		stream::iter(parts.iter().map(|part| Ok(Bytes::from_static(part.as_bytes()))))
	}

	#[tokio::test]
	async fn byte_stream_yields_chunks_then_ends() {
		let mut body =
			ResponseStream::from_stream(200, chunks(&["a", "b", "c"]), CancellationToken::new());
		let mut seen = Vec::new();

		while let Some(chunk) = body.next().await {
			seen.push(chunk.expect("Chunk should be Ok."));
		}

		assert_eq!(seen, vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")]);
		assert!(body.next().await.is_none());
	}

	#[tokio::test]
	async fn byte_stream_stops_after_cancel() {
		let mut body =
			ResponseStream::from_stream(200, chunks(&["a", "b", "c"]), CancellationToken::new());

		assert!(body.next().await.is_some());

		body.cancel();

		assert!(body.is_cancelled());
		assert!(body.next().await.is_none());
	}

	#[tokio::test]
	async fn byte_stream_ends_after_error() {
		let failing = stream::iter(vec![
			Ok(Bytes::from_static(b"a")),
			Err(TransportError::Timeout.into()),
			Ok(Bytes::from_static(b"b")),
		]);
		let mut body = ResponseStream::from_stream(200, failing, CancellationToken::new());

		assert!(matches!(body.next().await, Some(Ok(_))));
		assert!(matches!(body.next().await, Some(Err(Error::Transport(TransportError::Timeout)))));
		assert!(body.next().await.is_none());
	}

	#[tokio::test]
	async fn pending_byte_stream_wakes_on_external_cancel() {
		let cancel = CancellationToken::new();
		let mut body = ResponseStream::from_stream(200, stream::pending(), cancel.clone());
		let canceller = cancel.clone();

		tokio::spawn(async move {
			tokio::time::sleep(StdDuration::from_millis(20)).await;
			canceller.cancel();
		});

		assert!(body.next().await.is_none());
	}

	#[tokio::test]
	async fn event_stream_splits_frames_across_chunks_and_honours_done() {
		let body = ResponseStream::from_stream(
			200,
			chunks(&[
				"data: one\n",
				"\ndata: t",
				"wo\n\nevent: note\ndata: three\n\n",
				"data: [DONE]\n\n",
				"data: late\n\n",
			]),
			CancellationToken::new(),
		);
		let events = body.events().collect::<Vec<_>>().await;
		let data = events
			.into_iter()
			.map(|event| event.expect("Event should parse."))
			.collect::<Vec<_>>();

		assert_eq!(data.len(), 3);
		assert_eq!(data[0].data, "one");
		assert_eq!(data[1].data, "two");
		assert_eq!(data[2].event, "note");
		assert_eq!(data[2].data, "three");
	}

	#[tokio::test]
	async fn event_stream_emits_nothing_after_cancel() {
		let mut events = ResponseStream::from_stream(
			200,
			chunks(&["data: 1\n\ndata: 2\n\ndata: 3\n\n"]),
			CancellationToken::new(),
		)
		.events();

		assert_eq!(events.next().await.expect("First event.").expect("Ok event.").data, "1");

		events.cancel();

		assert!(events.next().await.is_none());
	}

	#[tokio::test]
	async fn json_stream_decodes_and_reports_paths() {
		#[derive(Debug, Deserialize)]
		struct Chunk {
			n: u32,
		}

		let mut parsed = ResponseStream::from_stream(
			200,
			chunks(&["data: {\"n\":1}\n\n", "data: {\"n\":\"x\"}\n\n"]),
			CancellationToken::new(),
		)
		.json::<Chunk>();

		assert_eq!(parsed.next().await.expect("First item.").expect("Valid JSON.").n, 1);

		let err = parsed.next().await.expect("Second item.").expect_err("Invalid field type.");

		match err {
			Error::Decode { status, source } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "n");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}

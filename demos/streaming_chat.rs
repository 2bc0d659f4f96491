//! Streams a chat completion from a local mock server, printing each delta and stopping early
//! once enough text has arrived.

// std
use std::io::Write;
// crates.io
use color_eyre::Result;
use futures::StreamExt;
use httpmock::prelude::*;
// self
use zai_sdk::{
	ZaiClient,
	config::{ClientOptions, RequestOptions},
	model,
	resources::{ChatCompletionParams, ChatMessage},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let body = ["Streaming ", "keeps ", "latency ", "low ", "and ", "memory ", "flat."]
		.iter()
		.map(|piece| {
			format!("data: {{\"choices\":[{{\"index\":0,\"delta\":{{\"content\":\"{piece}\"}}}}]}}\n\n")
		})
		.chain(["data: [DONE]\n\n".to_owned()])
		.collect::<String>();
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/chat/completions");
			then.status(200).header("content-type", "text/event-stream").body(&body);
		})
		.await;
	let client = ZaiClient::new(
		ClientOptions::default().with_api_key("demo-key.demo-secret").with_base_url(server.base_url()),
	)?;
	let params =
		ChatCompletionParams::new(model::GLM_4_FLASH, vec![ChatMessage::user("Why stream?")]);
	let mut stream = client.chat().create_stream(&params, RequestOptions::default()).await?;
	let mut received = 0;

	while let Some(chunk) = stream.next().await {
		let chunk = chunk?;

		for choice in chunk.choices {
			if let Some(content) = choice.delta.content {
				received += content.len();

				print!("{content}");
				std::io::stdout().flush()?;
			}
		}

		if received >= 24 {
			stream.cancel();
		}
	}

	println!("\nStopped after {received} bytes of text.");

	Ok(())
}

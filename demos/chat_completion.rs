//! Sends a buffered chat completion through a local mock server and prints the reply along with
//! the claims carried by the signed token.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use zai_sdk::{
	ZaiClient,
	auth::TokenClaims,
	config::{ClientOptions, RequestOptions},
	model,
	resources::{ChatCompletionParams, ChatMessage},
};

const API_KEY: &str = "demo-key.demo-secret";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/chat/completions").header_exists("authorization");
			then.status(200).header("content-type", "application/json").body(
				"{\"id\":\"demo\",\"choices\":[{\"index\":0,\"message\":{\"role\":\"assistant\",\"content\":\"Hi there.\"}}]}",
			);
		})
		.await;
	let client = ZaiClient::new(
		ClientOptions::default().with_api_key(API_KEY).with_base_url(server.base_url()),
	)?;
	let params = ChatCompletionParams::new(
		model::GLM_4_FLASH,
		vec![ChatMessage::system("Answer in one sentence."), ChatMessage::user("Say hello.")],
	)
	.with_temperature(0.2);
	let completion = client.chat().create(&params, RequestOptions::default()).await?;
	let token = client.transport().token_issuer().issue(API_KEY, true)?;

	println!("Reply: {}.", completion.first_text().unwrap_or_default());

	if let Some(claims) = TokenClaims::from_token(&token) {
		println!("Token issued for `{}`, expiring at {}.", claims.api_key, claims.exp);
	}

	mock.assert_async().await;

	Ok(())
}

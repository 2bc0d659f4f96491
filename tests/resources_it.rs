// crates.io
use futures::StreamExt;
use httpmock::prelude::*;
use serde_json::json;
// self
use zai_sdk::{
	ZaiClient,
	config::{ClientOptions, RequestOptions},
	http::Transport,
	model,
	resources::{
		ChatCompletionParams, ChatMessage, EmbeddingParams, FileListOrder, FileListParams,
		FilePurpose, FileUpload, ImageGenerationParams, Role,
	},
};

fn client(server: &MockServer) -> ZaiClient {
	let config = ClientOptions::default()
		.with_api_key("key123.secretXYZ")
		.with_base_url(server.base_url())
		.resolve_with(|_| None)
		.expect("Test options should resolve.");

	ZaiClient::from_transport(Transport::with_config(config).expect("Transport should build."))
}

#[tokio::test]
async fn chat_create_posts_buffered_request() {
	let server = MockServer::start_async().await;
	let client = client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/chat/completions").json_body(json!({
				"model": "glm-4-flash",
				"messages": [
					{"role": "system", "content": "Be brief."},
					{"role": "user", "content": "hi"},
				],
				"max_tokens": 16,
				"stream": false,
			}));
			then.status(200).header("content-type", "application/json").body(
				r#"{"id":"c1","created":1,"model":"glm-4-flash","choices":[{"index":0,"message":{"role":"assistant","content":"Hello!"},"finish_reason":"stop"}],"usage":{"prompt_tokens":5,"completion_tokens":2,"total_tokens":7}}"#,
			);
		})
		.await;
	let params = ChatCompletionParams::new(
		model::GLM_4_FLASH,
		vec![ChatMessage::system("Be brief."), ChatMessage::user("hi")],
	)
	.with_max_tokens(16);
	let completion = client
		.chat()
		.create(&params, RequestOptions::default())
		.await
		.expect("Chat completion should succeed.");

	mock.assert_async().await;

	assert_eq!(completion.first_text(), Some("Hello!"));
	assert_eq!(completion.choices[0].message.role, Role::Assistant);
	assert_eq!(completion.usage.map(|usage| usage.total_tokens), Some(7));
}

#[tokio::test]
async fn chat_create_stream_yields_chunks_until_done() {
	let server = MockServer::start_async().await;
	let client = client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/chat/completions").json_body(json!({
				"model": "glm-4-flash",
				"messages": [{"role": "user", "content": "hi"}],
				"stream": true,
			}));
			then.status(200).header("content-type", "text/event-stream").body(
				"data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"Hel\"}}]}\n\n\
				 data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"},\"finish_reason\":\"stop\"}]}\n\n\
				 data: [DONE]\n\n",
			);
		})
		.await;
	let params = ChatCompletionParams::new(model::GLM_4_FLASH, vec![ChatMessage::user("hi")]);
	let chunks = client
		.chat()
		.create_stream(&params, RequestOptions::default())
		.await
		.expect("Stream should open.")
		.collect::<Vec<_>>()
		.await;
	let text = chunks
		.into_iter()
		.map(|chunk| chunk.expect("Chunk should decode."))
		.filter_map(|chunk| chunk.choices.into_iter().next())
		.filter_map(|choice| choice.delta.content)
		.collect::<String>();

	mock.assert_async().await;

	assert_eq!(text, "Hello");
}

#[tokio::test]
async fn images_generate_posts_prompt() {
	let server = MockServer::start_async().await;
	let client = client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/images/generations").json_body(json!({
				"model": "cogview-3-plus",
				"prompt": "a red fox",
				"size": "1024x1024",
			}));
			then.status(200).body(r#"{"created":1,"data":[{"url":"https://img.example/fox.png"}]}"#);
		})
		.await;
	let params =
		ImageGenerationParams::new(model::COGVIEW_3_PLUS, "a red fox").with_size("1024x1024");
	let images = client
		.images()
		.generate(&params, RequestOptions::default())
		.await
		.expect("Image generation should succeed.");

	mock.assert_async().await;

	assert_eq!(images.data[0].url.as_deref(), Some("https://img.example/fox.png"));
}

#[tokio::test]
async fn embeddings_create_posts_input() {
	let server = MockServer::start_async().await;
	let client = client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/embeddings")
				.json_body(json!({"model": "embedding-3", "input": "hello"}));
			then.status(200).body(
				r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.5,-0.25]}],"model":"embedding-3"}"#,
			);
		})
		.await;
	let embeddings = client
		.embeddings()
		.create(&EmbeddingParams::new(model::EMBEDDING_3, "hello"), RequestOptions::default())
		.await
		.expect("Embedding should succeed.");

	mock.assert_async().await;

	assert_eq!(embeddings.data[0].embedding, vec![0.5, -0.25]);
	assert!(embeddings.usage.is_none());
}

#[tokio::test]
async fn files_round_trip_through_all_endpoints() {
	let server = MockServer::start_async().await;
	let client = client(&server);
	let file = r#"{"id":"file-1","bytes":11,"created_at":1,"filename":"notes.jsonl","purpose":"batch"}"#;
	let upload = server
		.mock_async(|when, then| {
			when.method(POST).path("/files").header_exists("content-type");
			then.status(200).body(file);
		})
		.await;
	let list = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/files")
				.query_param("purpose", "batch")
				.query_param("order", "asc")
				.query_param("limit", "2");
			then.status(200).body(format!(r#"{{"object":"list","data":[{file}],"has_more":true}}"#));
		})
		.await;
	let delete = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/files/file-1");
			then.status(200).body(r#"{"id":"file-1","object":"file","deleted":true}"#);
		})
		.await;
	let content = server
		.mock_async(|when, then| {
			when.method(GET).path("/files/file-1/content");
			then.status(200).header("content-type", "text/plain").body("{\"a\":1}\n{\"a\":2}\n");
		})
		.await;
	let files = client.files();
	let created = files
		.create(
			FileUpload::new(b"{\"a\":1}\n".to_vec(), FilePurpose::Batch).with_filename("notes.jsonl"),
			RequestOptions::default(),
		)
		.await
		.expect("Upload should succeed.");
	let page = files
		.list(
			&FileListParams {
				purpose: Some(FilePurpose::Batch),
				order: Some(FileListOrder::Asc),
				limit: Some(2),
				after: None,
			},
			RequestOptions::default(),
		)
		.await
		.expect("Listing should succeed.");
	let deleted = files
		.delete(&created.id, RequestOptions::default())
		.await
		.expect("Deletion should succeed.");
	let text = files
		.content(&created.id, RequestOptions::default())
		.await
		.expect("Content download should succeed.");

	upload.assert_async().await;
	list.assert_async().await;
	delete.assert_async().await;
	content.assert_async().await;

	assert_eq!(created.purpose, FilePurpose::Batch);
	assert_eq!(page.data, vec![created]);
	assert!(page.has_more);
	assert!(deleted.deleted);
	assert_eq!(text, "{\"a\":1}\n{\"a\":2}\n");
}

#[tokio::test]
async fn client_request_defaults_sit_beneath_call_options() {
	let server = MockServer::start_async().await;
	let client = client(&server).with_request_defaults(
		RequestOptions::default().with_header("x-tenant", "team-a").with_header("x-trace", "default"),
	);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/embeddings")
				.header("x-tenant", "team-a")
				.header("x-trace", "call");
			then.status(200).body(r#"{"data":[],"model":"embedding-3"}"#);
		})
		.await;

	client
		.embeddings()
		.create(
			&EmbeddingParams::new(model::EMBEDDING_3, "hello"),
			RequestOptions::default().with_header("x-trace", "call"),
		)
		.await
		.expect("Embedding should succeed.");

	mock.assert_async().await;
}

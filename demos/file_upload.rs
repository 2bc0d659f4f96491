//! Uploads, lists, downloads, and deletes a file against a local mock server.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use zai_sdk::{
	ZaiClient,
	config::{ClientOptions, RequestOptions},
	resources::{FileListParams, FilePurpose, FileUpload},
};

const FILE: &str =
	r#"{"id":"file-demo","bytes":18,"created_at":1731240000,"filename":"batch.jsonl","purpose":"batch"}"#;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/files");
			then.status(200).body(FILE);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/files");
			then.status(200).body(format!("{{\"data\":[{FILE}],\"has_more\":false}}"));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/files/file-demo/content");
			then.status(200).body("{\"custom_id\":\"1\"}\n");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(DELETE).path("/files/file-demo");
			then.status(200).body("{\"id\":\"file-demo\",\"deleted\":true}");
		})
		.await;

	let client = ZaiClient::new(
		ClientOptions::default().with_api_key("demo-key.demo-secret").with_base_url(server.base_url()),
	)?;
	let files = client.files();
	let upload = FileUpload::new(b"{\"custom_id\":\"1\"}\n".to_vec(), FilePurpose::Batch)
		.with_filename("batch.jsonl");
	let created = files.create(upload, RequestOptions::default()).await?;
	let page = files.list(&FileListParams::default(), RequestOptions::default()).await?;
	let content = files.content(&created.id, RequestOptions::default()).await?;
	let deleted = files.delete(&created.id, RequestOptions::default()).await?;

	println!("Uploaded `{}` ({} bytes) for {}.", created.filename, created.bytes, created.purpose);
	println!("Listed {} file(s).", page.data.len());
	println!("Content: {}", content.trim_end());
	println!("Deleted: {}.", deleted.deleted);

	Ok(())
}

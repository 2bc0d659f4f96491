//! File upload, listing, deletion, and content download.

// crates.io
use reqwest::multipart::{Form, Part};
use url::form_urlencoded::Serializer;
// self
use crate::{_prelude::*, config::RequestOptions, error::ConfigError, http::Transport};

/// Intended use of an uploaded file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilePurpose {
	/// Batch job input.
	Batch,
	/// Knowledge retrieval.
	Retrieval,
	/// Content extraction.
	FileExtract,
	/// Code interpreter input.
	CodeInterpreter,
	/// Fine-tuning data.
	FineTune,
	/// Function-calling fine-tuning data.
	FineTuneFunctionCalling,
	/// CogView fine-tuning data.
	FineTuneVisionCogview,
	/// CogVLM fine-tuning data.
	FineTuneVisionCogvlm,
}
impl FilePurpose {
	/// Wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			FilePurpose::Batch => "batch",
			FilePurpose::Retrieval => "retrieval",
			FilePurpose::FileExtract => "file-extract",
			FilePurpose::CodeInterpreter => "code-interpreter",
			FilePurpose::FineTune => "fine-tune",
			FilePurpose::FineTuneFunctionCalling => "fine-tune-function-calling",
			FilePurpose::FineTuneVisionCogview => "fine-tune-vision-cogview",
			FilePurpose::FineTuneVisionCogvlm => "fine-tune-vision-cogvlm",
		}
	}
}
impl Display for FilePurpose {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Sort order for file listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileListOrder {
	/// Oldest first.
	Asc,
	/// Newest first.
	Desc,
}
impl FileListOrder {
	/// Wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			FileListOrder::Asc => "asc",
			FileListOrder::Desc => "desc",
		}
	}
}

/// File upload request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileUpload {
	/// File contents.
	pub file: Vec<u8>,
	/// Name reported to the service; `file` when unset.
	pub filename: Option<String>,
	/// Intended use.
	pub purpose: FilePurpose,
}
impl FileUpload {
	/// Upload of `file` for `purpose`.
	pub fn new(file: impl Into<Vec<u8>>, purpose: FilePurpose) -> Self {
		Self { file: file.into(), filename: None, purpose }
	}

	/// Sets the reported file name.
	pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
		self.filename = Some(filename.into());

		self
	}

	fn into_form(self) -> Form {
		let part = Part::bytes(self.file).file_name(self.filename.unwrap_or_else(|| "file".into()));

		Form::new().part("file", part).text("purpose", self.purpose.as_str())
	}
}

/// Filters for listing files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileListParams {
	/// Only files with this purpose.
	pub purpose: Option<FilePurpose>,
	/// Sort order.
	pub order: Option<FileListOrder>,
	/// Page size; zero counts as unset.
	pub limit: Option<u32>,
	/// Pagination cursor.
	pub after: Option<String>,
}
impl FileListParams {
	/// Request path including the query string.
	pub fn path(&self) -> String {
		let mut query = Serializer::new(String::new());

		if let Some(purpose) = self.purpose {
			query.append_pair("purpose", purpose.as_str());
		}
		if let Some(order) = self.order {
			query.append_pair("order", order.as_str());
		}
		if let Some(limit) = self.limit.filter(|limit| *limit > 0) {
			query.append_pair("limit", &limit.to_string());
		}
		if let Some(after) = self.after.as_deref().filter(|after| !after.is_empty()) {
			query.append_pair("after", after);
		}

		let query = query.finish();

		if query.is_empty() { "/files".into() } else { format!("/files?{query}") }
	}
}

/// Uploaded file metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
	/// File identifier.
	pub id: String,
	/// Size in bytes.
	#[serde(default)]
	pub bytes: u64,
	/// Upload time in seconds since the Unix epoch.
	#[serde(default)]
	pub created_at: i64,
	/// Reported file name.
	#[serde(default)]
	pub filename: String,
	/// Intended use.
	pub purpose: FilePurpose,
	/// Processing status, if reported.
	#[serde(default)]
	pub status: Option<String>,
	/// Processing failure details, if any.
	#[serde(default)]
	pub status_details: Option<String>,
}

/// One page of files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileList {
	/// Files on this page.
	pub data: Vec<FileObject>,
	/// Whether another page follows.
	#[serde(default)]
	pub has_more: bool,
}

/// Deletion acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDeleted {
	/// Deleted file identifier.
	pub id: String,
	/// Whether the file was removed.
	pub deleted: bool,
}

/// `/files` endpoints.
#[derive(Clone, Debug)]
pub struct Files<'a> {
	transport: &'a Transport,
	defaults: RequestOptions,
}
impl<'a> Files<'a> {
	/// Binds the resource to `transport`.
	pub fn new(transport: &'a Transport) -> Self {
		Self { transport, defaults: RequestOptions::default() }
	}

	/// Sets options every call layers its own options over.
	pub fn with_defaults(mut self, defaults: RequestOptions) -> Self {
		self.defaults = defaults;

		self
	}

	/// Uploads a file as `multipart/form-data`.
	pub async fn create(&self, upload: FileUpload, options: RequestOptions) -> Result<FileObject> {
		self.transport.post_form("/files", upload.into_form(), self.options(options)).await
	}

	/// Lists uploaded files.
	pub async fn list(&self, params: &FileListParams, options: RequestOptions) -> Result<FileList> {
		self.transport.get(&params.path(), self.options(options)).await
	}

	/// Deletes a file.
	pub async fn delete(&self, file_id: &str, options: RequestOptions) -> Result<FileDeleted> {
		self.transport.delete(self.file_url(file_id, None)?.as_str(), self.options(options)).await
	}

	/// Downloads a file's contents as text.
	pub async fn content(&self, file_id: &str, options: RequestOptions) -> Result<String> {
		let url = self.file_url(file_id, Some("content"))?;

		self.transport.get_text(url.as_str(), self.options(options)).await
	}

	/// `/files/{file_id}[/{tail}]` with `file_id` percent-encoded as one path segment.
	fn file_url(&self, file_id: &str, tail: Option<&str>) -> Result<Url> {
		let mut url = self.transport.endpoint("/files")?;

		if url.cannot_be_a_base() {
			return Err(ConfigError::InvalidBaseUrl {
				url: url.into(),
				source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
			}
			.into());
		}
		if let Ok(mut segments) = url.path_segments_mut() {
			segments.push(file_id).extend(tail);
		}

		Ok(url)
	}

	fn options(&self, options: RequestOptions) -> RequestOptions {
		options.merged_over(self.defaults.clone())
	}
}

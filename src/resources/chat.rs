//! Chat completions, buffered and streamed.

// self
use crate::{
	_prelude::*,
	config::RequestOptions,
	http::{JsonStream, Transport},
	resources::Usage,
};

const PATH: &str = "/chat/completions";

/// Author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// Instructions framing the conversation.
	System,
	/// End-user input.
	User,
	/// Model output.
	Assistant,
	/// Result of a tool call.
	Tool,
}

/// Message body: plain text or a list of typed parts (text and images for vision models).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
	/// Plain text.
	Text(String),
	/// Mixed content parts.
	Parts(Vec<ContentPart>),
}
impl From<&str> for MessageContent {
	fn from(text: &str) -> Self {
		Self::Text(text.into())
	}
}
impl From<String> for MessageContent {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}
impl From<Vec<ContentPart>> for MessageContent {
	fn from(parts: Vec<ContentPart>) -> Self {
		Self::Parts(parts)
	}
}

/// One part of a multi-part message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
	/// Text segment.
	Text {
		/// Segment text.
		text: String,
	},
	/// Image reference, as a URL or a base64 payload.
	ImageUrl {
		/// Image location.
		image_url: ImageUrl,
	},
}

/// Image location inside a [`ContentPart::ImageUrl`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
	/// HTTP(S) URL or base64 image data.
	pub url: String,
}

/// A message in a chat conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
	/// Author of the message.
	pub role: Role,
	/// Message body; assistant messages that only call tools carry none.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<MessageContent>,
	/// Tool invocations requested by the assistant.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_calls: Option<Vec<ToolCall>>,
	/// Tool call this message answers.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_call_id: Option<String>,
}
impl ChatMessage {
	fn with_role(role: Role, content: impl Into<MessageContent>) -> Self {
		Self { role, content: Some(content.into()), tool_calls: None, tool_call_id: None }
	}

	/// System message.
	pub fn system(content: impl Into<MessageContent>) -> Self {
		Self::with_role(Role::System, content)
	}

	/// User message.
	pub fn user(content: impl Into<MessageContent>) -> Self {
		Self::with_role(Role::User, content)
	}

	/// Assistant message.
	pub fn assistant(content: impl Into<MessageContent>) -> Self {
		Self::with_role(Role::Assistant, content)
	}

	/// Tool result answering `tool_call_id`.
	pub fn tool(tool_call_id: impl Into<String>, content: impl Into<MessageContent>) -> Self {
		Self { tool_call_id: Some(tool_call_id.into()), ..Self::with_role(Role::Tool, content) }
	}

	/// Text of the message when it is plain text.
	pub fn text(&self) -> Option<&str> {
		match &self.content {
			Some(MessageContent::Text(text)) => Some(text),
			_ => None,
		}
	}
}

/// Function the model may call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
	/// Function name.
	pub name: String,
	/// What the function does.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// JSON Schema of the arguments.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parameters: Option<serde_json::Value>,
}

/// Tool offered to the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
	/// Callable function.
	Function {
		/// Function definition.
		function: FunctionDefinition,
	},
}
impl Tool {
	/// Function tool.
	pub fn function(
		name: impl Into<String>,
		description: impl Into<String>,
		parameters: serde_json::Value,
	) -> Self {
		Self::Function {
			function: FunctionDefinition {
				name: name.into(),
				description: Some(description.into()),
				parameters: Some(parameters),
			},
		}
	}
}

/// Function invocation chosen by the model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
	/// Function name.
	#[serde(default)]
	pub name: String,
	/// Arguments as a JSON-encoded string.
	#[serde(default)]
	pub arguments: String,
}

/// Tool invocation chosen by the model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
	/// Call identifier, echoed back in the tool result.
	#[serde(default)]
	pub id: String,
	/// Tool kind; `function` today.
	#[serde(rename = "type", default)]
	pub kind: String,
	/// Invoked function.
	#[serde(default)]
	pub function: FunctionCall,
	/// Position of the call within a streamed delta.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub index: Option<u32>,
}

/// Parameters for a chat completion.
///
/// Unset optional fields are omitted from the request body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatCompletionParams {
	/// Model identifier, see [`crate::model`].
	pub model: String,
	/// Conversation so far.
	pub messages: Vec<ChatMessage>,
	/// Sampling temperature.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub temperature: Option<f32>,
	/// Nucleus sampling mass.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub top_p: Option<f32>,
	/// Completion length cap.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_tokens: Option<u32>,
	/// Presence penalty.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub presence_penalty: Option<f32>,
	/// Frequency penalty.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub frequency_penalty: Option<f32>,
	/// Stop sequences.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stop: Option<Vec<String>>,
	/// Tools the model may call.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tools: Option<Vec<Tool>>,
	/// Tool selection strategy, e.g. `"auto"`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tool_choice: Option<serde_json::Value>,
	/// Sampling seed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub seed: Option<i64>,
	/// End-user identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user: Option<String>,
	/// Whether to sample; `false` makes decoding greedy.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub do_sample: Option<bool>,
	/// Client-side request identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub request_id: Option<String>,
	/// Sensitive-word filtering settings.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sensitive_word_check: Option<serde_json::Value>,
}
impl ChatCompletionParams {
	/// Parameters with only the required fields set.
	pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
		Self {
			model: model.into(),
			messages,
			temperature: None,
			top_p: None,
			max_tokens: None,
			presence_penalty: None,
			frequency_penalty: None,
			stop: None,
			tools: None,
			tool_choice: None,
			seed: None,
			user: None,
			do_sample: None,
			request_id: None,
			sensitive_word_check: None,
		}
	}

	/// Sets the sampling temperature.
	pub fn with_temperature(mut self, temperature: f32) -> Self {
		self.temperature = Some(temperature);

		self
	}

	/// Sets the completion length cap.
	pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
		self.max_tokens = Some(max_tokens);

		self
	}

	/// Offers tools to the model.
	pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
		self.tools = Some(tools);

		self
	}
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
	#[serde(flatten)]
	params: &'a ChatCompletionParams,
	stream: bool,
}

/// Buffered chat completion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
	/// Completion identifier.
	pub id: String,
	/// Creation time in seconds since the Unix epoch.
	#[serde(default)]
	pub created: i64,
	/// Model that produced the completion.
	#[serde(default)]
	pub model: String,
	/// Candidate completions.
	pub choices: Vec<ChatChoice>,
	/// Token accounting.
	#[serde(default)]
	pub usage: Option<Usage>,
	/// Request identifier echoed by the service.
	#[serde(default)]
	pub request_id: Option<String>,
}
impl ChatCompletion {
	/// Text of the first choice, if it is plain text.
	pub fn first_text(&self) -> Option<&str> {
		self.choices.first().and_then(|choice| choice.message.text())
	}
}

/// One candidate in a [`ChatCompletion`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatChoice {
	/// Position among the candidates.
	#[serde(default)]
	pub index: u32,
	/// Generated message.
	pub message: ChatMessage,
	/// Why generation stopped.
	#[serde(default)]
	pub finish_reason: Option<String>,
}

/// One streamed chat completion event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
	/// Completion identifier shared by every chunk.
	#[serde(default)]
	pub id: String,
	/// Creation time in seconds since the Unix epoch.
	#[serde(default)]
	pub created: i64,
	/// Model producing the stream.
	#[serde(default)]
	pub model: String,
	/// Incremental choices.
	#[serde(default)]
	pub choices: Vec<ChunkChoice>,
	/// Token accounting, usually only on the final chunk.
	#[serde(default)]
	pub usage: Option<Usage>,
}

/// Incremental update for one candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
	/// Candidate position.
	#[serde(default)]
	pub index: u32,
	/// Newly generated content.
	#[serde(default)]
	pub delta: ChatDelta,
	/// Set on the last chunk of the candidate.
	#[serde(default)]
	pub finish_reason: Option<String>,
}

/// Newly generated fragment of a streamed message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatDelta {
	/// Role, sent on the first fragment.
	#[serde(default)]
	pub role: Option<Role>,
	/// Text fragment.
	#[serde(default)]
	pub content: Option<String>,
	/// Tool call fragments.
	#[serde(default)]
	pub tool_calls: Option<Vec<ToolCall>>,
}

/// `POST /chat/completions`.
#[derive(Clone, Debug)]
pub struct Chat<'a> {
	transport: &'a Transport,
	defaults: RequestOptions,
}
impl<'a> Chat<'a> {
	/// Binds the resource to `transport`.
	pub fn new(transport: &'a Transport) -> Self {
		Self { transport, defaults: RequestOptions::default() }
	}

	/// Sets options every call layers its own options over.
	pub fn with_defaults(mut self, defaults: RequestOptions) -> Self {
		self.defaults = defaults;

		self
	}

	/// Creates a buffered completion.
	pub async fn create(
		&self,
		params: &ChatCompletionParams,
		options: RequestOptions,
	) -> Result<ChatCompletion> {
		let body = ChatCompletionRequest { params, stream: false };

		self.transport.post(PATH, &body, self.options(options)).await
	}

	/// Creates a streamed completion; the stream ends at the `[DONE]` sentinel.
	pub async fn create_stream(
		&self,
		params: &ChatCompletionParams,
		options: RequestOptions,
	) -> Result<JsonStream<ChatCompletionChunk>> {
		let body = ChatCompletionRequest { params, stream: true };

		Ok(self.transport.stream(PATH, &body, self.options(options)).await?.json())
	}

	fn options(&self, options: RequestOptions) -> RequestOptions {
		options.merged_over(self.defaults.clone())
	}
}

//! Model identifiers accepted by the remote service.

/// GLM-4 Plus, the enhanced text model.
pub const GLM_4_PLUS: &str = "glm-4-plus";
/// GLM-4 Air, the lightweight text model.
pub const GLM_4_AIR: &str = "glm-4-air";
/// GLM-4 AirX, the extended Air model.
pub const GLM_4_AIRX: &str = "glm-4-airx";
/// GLM-4 Flash, the low-latency text model.
pub const GLM_4_FLASH: &str = "glm-4-flash";
/// GLM-4 standard text model.
pub const GLM_4: &str = "glm-4";
/// GLM-4 pinned to the 0520 release.
pub const GLM_4_0520: &str = "glm-4-0520";
/// GLM-4 Long, tuned for long contexts.
pub const GLM_4_LONG: &str = "glm-4-long";
/// GLM-4 Voice.
pub const GLM_4_VOICE: &str = "glm-4-voice";

/// GLM-4V Plus, the enhanced vision model.
pub const GLM_4V_PLUS: &str = "glm-4v-plus";
/// GLM-4V standard vision model.
pub const GLM_4V: &str = "glm-4v";
/// GLM-4V Flash.
pub const GLM_4V_FLASH: &str = "glm-4v-flash";

/// CogView-3 Plus image generation.
pub const COGVIEW_3_PLUS: &str = "cogview-3-plus";
/// CogView-3 image generation.
pub const COGVIEW_3: &str = "cogview-3";

/// Embedding-2 text embeddings.
pub const EMBEDDING_2: &str = "embedding-2";
/// Embedding-3 text embeddings.
pub const EMBEDDING_3: &str = "embedding-3";

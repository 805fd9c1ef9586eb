// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod http_client;
pub mod scrub;
pub mod traits;

// ── Provider implementations ────────────────────────────────────────────────
pub mod factory;
pub mod moderation;
pub mod openai;

// ── Re-exports ──────────────────────────────────────────────────────────────
pub use factory::{create_generator, create_moderator};
pub use moderation::OpenAiModerator;
pub use openai::OpenAiGenerator;
pub use traits::{
    GenerationFuture, Moderator, ResponseShape, TextGenerator, decode_response, generate_typed,
    strip_code_fence,
};

pub mod gemini;
pub mod openai;
pub mod traits;

pub use gemini::GeminiGenerator;
pub use openai::OpenAiGenerator;
pub use traits::{GenerationRequest, TextGenerator};

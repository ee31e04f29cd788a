pub mod gemini;
pub mod local;
pub mod prompt;

pub use gemini::GeminiReporter;
pub use local::LocalReporter;

mod progress;
mod service;

pub use progress::{GameProgress, QuestionPrompt};
pub use service::GameService;

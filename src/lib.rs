//! `elearn-ai-http` is the async integration layer for an e-learning
//! platform's AI features.
//!
//! The crate wraps the outbound side of the platform:
//! - [`HttpGateway::request`] — generic external REST calls with bounded
//!   retries and exponential backoff
//! - [`AiClient`] — recommendations, chatbot replies, quiz generation, and
//!   content analysis over an opaque [`GenerationBackend`]
//! - [`QuestionStore`] — persistence contract for generated quiz questions

mod backend;
mod client;
mod error;
mod gateway;
mod options;
mod prompt;
mod store;
mod types;

pub use backend::{GeminiBackend, GenerationBackend, DEFAULT_GEMINI_MODEL};
pub use client::{AiClient, DEFAULT_QUIZ_COUNT};
pub use error::IntegrationError;
pub use gateway::{HttpGateway, RequestSpec};
pub use options::GatewayOptions;
pub use prompt::{
    build_analysis_prompt, build_chatbot_prompt, build_quiz_prompt, build_recommendation_prompt,
    ChatContext, Difficulty, HistoryEntry, LearningAnalytics, UserProfile,
};
pub use store::{HttpQuestionStore, MemoryQuestionStore, NewQuestion, Question, QuestionStore};
pub use types::{ContentAnalysis, GenerationStatus, QuizGeneration};

pub type Result<T> = std::result::Result<T, IntegrationError>;

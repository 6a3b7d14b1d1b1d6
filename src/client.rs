use std::fmt;
use std::sync::Arc;

use crate::prompt::{
    build_analysis_prompt, build_chatbot_prompt, build_quiz_prompt, build_recommendation_prompt,
    ChatContext, Difficulty, HistoryEntry, UserProfile,
};
use crate::types::{ContentAnalysis, GenerationStatus, QuizGeneration};
use crate::GenerationBackend;

/// Number of quiz questions requested when the caller has no preference.
pub const DEFAULT_QUIZ_COUNT: u32 = 10;

const RECOMMENDATION_FALLBACK: &str =
    "Unable to generate recommendations at this time. Please try again later.";
const CHATBOT_FALLBACK: &str =
    "I'm sorry, I'm having trouble understanding right now. Could you please rephrase your question?";
const ANALYSIS_FALLBACK: &str = "Content analysis unavailable";

/// Generation orchestration client.
///
/// Builds domain prompts, invokes the injected [`GenerationBackend`], and
/// shapes results into typed outcomes. Every operation is stateless per call
/// and fails soft: a generation failure is logged and converted into a
/// feature-appropriate degraded output, never surfaced to the caller as an
/// error. User-facing flows always receive some response.
#[derive(Clone)]
pub struct AiClient {
    backend: Arc<dyn GenerationBackend>,
}

impl fmt::Debug for AiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiClient").finish_non_exhaustive()
    }
}

impl AiClient {
    /// Creates a client over an explicitly constructed backend handle.
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Generates text for a raw prompt.
    ///
    /// On any underlying failure, returns an empty string and logs the error
    /// for operator visibility.
    pub async fn generate(&self, prompt: &str) -> String {
        match self.backend.generate(prompt).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "content generation failed");
                String::new()
            }
        }
    }

    /// Generates personalized learning recommendations from a user profile
    /// and the last five learning-history entries.
    ///
    /// This path is user-critical, so a failure yields a fixed informative
    /// message rather than an empty string.
    pub async fn generate_learning_recommendations(
        &self,
        profile: &UserProfile,
        history: &[HistoryEntry],
    ) -> String {
        let prompt = build_recommendation_prompt(profile, history);
        match self.backend.generate(&prompt).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "recommendation generation failed");
                RECOMMENDATION_FALLBACK.to_owned()
            }
        }
    }

    /// Generates a chatbot reply for a user question with conversation
    /// context; failures yield a fixed apologetic reply.
    pub async fn generate_chatbot_response(&self, question: &str, context: &ChatContext) -> String {
        let prompt = build_chatbot_prompt(question, context);
        match self.backend.generate(&prompt).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "chatbot generation failed");
                CHATBOT_FALLBACK.to_owned()
            }
        }
    }

    /// Generates `count` multiple-choice quiz questions for a module.
    ///
    /// The difficulty value is mapped through the fixed
    /// iniciante/intermediario/avancado lookup; unrecognized values behave as
    /// "iniciante". The returned envelope carries the model's raw text —
    /// callers validate the JSON themselves.
    pub async fn generate_quiz_questions(
        &self,
        topic: &str,
        difficulty: &str,
        module_title: &str,
        count: u32,
    ) -> QuizGeneration {
        let difficulty = Difficulty::parse_lossy(difficulty);
        let prompt = build_quiz_prompt(topic, difficulty, module_title, count);
        match self.backend.generate(&prompt).await {
            Ok(text) => QuizGeneration::success(text),
            Err(err) => {
                tracing::warn!(error = %err, topic, "quiz generation failed");
                QuizGeneration::error(err.to_string())
            }
        }
    }

    /// Analyzes learning content (truncated to its first 1000 characters)
    /// and returns the raw analysis text under a status envelope.
    pub async fn analyze_learning_content(
        &self,
        content: &str,
        content_type: &str,
    ) -> ContentAnalysis {
        let prompt = build_analysis_prompt(content, content_type);
        match self.backend.generate(&prompt).await {
            Ok(text) => ContentAnalysis {
                analysis: text,
                status: GenerationStatus::Success,
            },
            Err(err) => {
                tracing::warn!(error = %err, content_type, "content analysis failed");
                ContentAnalysis {
                    analysis: ANALYSIS_FALLBACK.to_owned(),
                    status: GenerationStatus::Error,
                }
            }
        }
    }
}

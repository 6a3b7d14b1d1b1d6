//! Quiz question persistence.
//!
//! The store contract deliberately swallows failures: batch inserts are
//! all-or-nothing and degrade to an empty result, reads degrade to empty,
//! counts degrade to zero. Callers treat absence of data and query failure
//! identically, so these defaults are part of the contract, not incidental.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{HttpGateway, IntegrationError, RequestSpec, Result};

/// Option labels every question must carry.
const OPTION_LABELS: [&str; 5] = ["a", "b", "c", "d", "e"];

/// A question record to be persisted, as plain key/value data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewQuestion {
    /// Parent content identifier.
    pub conteudo_id: i64,
    pub pergunta: String,
    /// Alternatives labeled a–e.
    pub alternativas: BTreeMap<String, String>,
    pub resposta_correta: String,
    pub explicacao: String,
    /// Position of the question within its content.
    pub ordem: i32,
}

impl NewQuestion {
    /// Checks the record against the question shape the quiz prompt demands:
    /// non-empty question text, exactly five alternatives labeled a–e, a
    /// correct label among them, and a non-empty explanation.
    pub fn validate(&self) -> Result<()> {
        if self.pergunta.trim().is_empty() {
            return Err(IntegrationError::Decode(
                "question record has empty pergunta".to_owned(),
            ));
        }
        if self.alternativas.len() != OPTION_LABELS.len()
            || OPTION_LABELS
                .iter()
                .any(|label| !self.alternativas.contains_key(*label))
        {
            return Err(IntegrationError::Decode(
                "question record must carry exactly the alternatives a-e".to_owned(),
            ));
        }
        if !self.alternativas.contains_key(self.resposta_correta.as_str()) {
            return Err(IntegrationError::Decode(format!(
                "resposta_correta '{}' is not an alternative label",
                self.resposta_correta
            )));
        }
        if self.explicacao.trim().is_empty() {
            return Err(IntegrationError::Decode(
                "question record has empty explicacao".to_owned(),
            ));
        }
        Ok(())
    }
}

/// A persisted question with its server-assigned identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub conteudo_id: i64,
    pub pergunta: String,
    pub alternativas: BTreeMap<String, String>,
    pub resposta_correta: String,
    pub explicacao: String,
    pub ordem: i32,
}

/// Persistence contract for generated quiz questions.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Persists a batch atomically.
    ///
    /// All-or-nothing: if any record is invalid or any insert fails, the
    /// whole batch is rolled back and an empty vec is returned — never a
    /// partial list.
    async fn create_batch(&self, items: &[NewQuestion]) -> Vec<Question>;

    /// Returns the questions of a content, ordered by `ordem`.
    ///
    /// Failures degrade to an empty vec.
    async fn get_by_conteudo_id(&self, conteudo_id: i64) -> Vec<Question>;

    /// Returns the number of questions of a content, defaulting to 0 on
    /// failure.
    async fn count_by_conteudo_id(&self, conteudo_id: i64) -> u64;
}

/// Question store backed by the platform's persistence REST service,
/// routed through the retrying [`HttpGateway`].
#[derive(Clone, Debug)]
pub struct HttpQuestionStore {
    gateway: HttpGateway,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

impl HttpQuestionStore {
    /// Creates a store over an injected gateway and the service base URL.
    pub fn new(gateway: HttpGateway, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { gateway, base_url }
    }

    async fn try_create_batch(&self, items: &[NewQuestion]) -> Result<Vec<Question>> {
        for item in items {
            item.validate()?;
        }

        let payload = serde_json::to_value(items)
            .map_err(|err| IntegrationError::Decode(format!("unserializable batch: {err}")))?;
        let spec = RequestSpec::post(format!("{}/questoes/batch", self.base_url), payload);
        let response = self.gateway.request(&spec).await?;

        serde_json::from_value(response)
            .map_err(|err| IntegrationError::Decode(format!("invalid batch response: {err}")))
    }

    async fn try_get_by_conteudo_id(&self, conteudo_id: i64) -> Result<Vec<Question>> {
        let spec = RequestSpec::get(format!(
            "{}/conteudos/{conteudo_id}/questoes",
            self.base_url
        ));
        let response = self.gateway.request(&spec).await?;

        let mut questions: Vec<Question> = serde_json::from_value(response)
            .map_err(|err| IntegrationError::Decode(format!("invalid questions response: {err}")))?;
        questions.sort_by_key(|question| question.ordem);
        Ok(questions)
    }

    async fn try_count_by_conteudo_id(&self, conteudo_id: i64) -> Result<u64> {
        let spec = RequestSpec::get(format!(
            "{}/conteudos/{conteudo_id}/questoes/count",
            self.base_url
        ));
        let response = self.gateway.request(&spec).await?;

        let parsed: CountResponse = serde_json::from_value(response)
            .map_err(|err| IntegrationError::Decode(format!("invalid count response: {err}")))?;
        Ok(parsed.count)
    }
}

#[async_trait]
impl QuestionStore for HttpQuestionStore {
    async fn create_batch(&self, items: &[NewQuestion]) -> Vec<Question> {
        match self.try_create_batch(items).await {
            Ok(questions) => questions,
            Err(err) => {
                tracing::warn!(error = %err, "batch question insert failed, returning empty result");
                Vec::new()
            }
        }
    }

    async fn get_by_conteudo_id(&self, conteudo_id: i64) -> Vec<Question> {
        match self.try_get_by_conteudo_id(conteudo_id).await {
            Ok(questions) => questions,
            Err(err) => {
                tracing::warn!(error = %err, conteudo_id, "question lookup failed");
                Vec::new()
            }
        }
    }

    async fn count_by_conteudo_id(&self, conteudo_id: i64) -> u64 {
        match self.try_count_by_conteudo_id(conteudo_id).await {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(error = %err, conteudo_id, "question count failed");
                0
            }
        }
    }
}

/// In-process question store for tests and local development.
///
/// Applies the same validation and atomicity rules as the HTTP store.
#[derive(Debug, Default)]
pub struct MemoryQuestionStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: i64,
    questions: Vec<Question>,
}

impl MemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionStore for MemoryQuestionStore {
    async fn create_batch(&self, items: &[NewQuestion]) -> Vec<Question> {
        // Validate the whole batch before touching state so a late invalid
        // record cannot leave earlier ones behind.
        for item in items {
            if let Err(err) = item.validate() {
                tracing::warn!(error = %err, "batch question insert failed, returning empty result");
                return Vec::new();
            }
        }

        let mut inner = self.inner.lock().await;
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            inner.next_id += 1;
            let question = Question {
                id: inner.next_id,
                conteudo_id: item.conteudo_id,
                pergunta: item.pergunta.clone(),
                alternativas: item.alternativas.clone(),
                resposta_correta: item.resposta_correta.clone(),
                explicacao: item.explicacao.clone(),
                ordem: item.ordem,
            };
            inner.questions.push(question.clone());
            created.push(question);
        }
        created
    }

    async fn get_by_conteudo_id(&self, conteudo_id: i64) -> Vec<Question> {
        let inner = self.inner.lock().await;
        let mut questions: Vec<Question> = inner
            .questions
            .iter()
            .filter(|question| question.conteudo_id == conteudo_id)
            .cloned()
            .collect();
        questions.sort_by_key(|question| question.ordem);
        questions
    }

    async fn count_by_conteudo_id(&self, conteudo_id: i64) -> u64 {
        let inner = self.inner.lock().await;
        inner
            .questions
            .iter()
            .filter(|question| question.conteudo_id == conteudo_id)
            .count() as u64
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{MemoryQuestionStore, NewQuestion, QuestionStore};

    fn sample_question(conteudo_id: i64, ordem: i32) -> NewQuestion {
        let alternativas: BTreeMap<String, String> = [
            ("a", "2"),
            ("b", "3"),
            ("c", "4"),
            ("d", "5"),
            ("e", "6"),
        ]
        .into_iter()
        .map(|(label, text)| (label.to_owned(), text.to_owned()))
        .collect();

        NewQuestion {
            conteudo_id,
            pergunta: format!("Quanto é 1 + {ordem}?"),
            alternativas,
            resposta_correta: "a".to_owned(),
            explicacao: "Aritmética básica.".to_owned(),
            ordem,
        }
    }

    #[test]
    fn validate_rejects_missing_label_and_bad_answer() {
        let mut missing_label = sample_question(1, 0);
        missing_label.alternativas.remove("e");
        assert!(missing_label.validate().is_err());

        let mut bad_answer = sample_question(1, 0);
        bad_answer.resposta_correta = "f".to_owned();
        assert!(bad_answer.validate().is_err());

        let mut empty_question = sample_question(1, 0);
        empty_question.pergunta = "  ".to_owned();
        assert!(empty_question.validate().is_err());

        assert!(sample_question(1, 0).validate().is_ok());
    }

    #[tokio::test]
    async fn one_invalid_record_rolls_back_the_entire_batch() {
        let store = MemoryQuestionStore::new();
        let mut batch: Vec<NewQuestion> = (0..5).map(|i| sample_question(7, i)).collect();
        batch[3].resposta_correta = "z".to_owned();

        let created = store.create_batch(&batch).await;

        assert!(created.is_empty());
        assert_eq!(store.count_by_conteudo_id(7).await, 0);
    }

    #[tokio::test]
    async fn create_batch_assigns_ids_and_get_returns_ordered() {
        let store = MemoryQuestionStore::new();
        // Insert out of order to exercise the ordering guarantee.
        let batch = vec![
            sample_question(3, 2),
            sample_question(3, 0),
            sample_question(3, 1),
            sample_question(9, 0),
        ];

        let created = store.create_batch(&batch).await;
        assert_eq!(created.len(), 4);
        assert!(created.iter().all(|question| question.id > 0));

        let questions = store.get_by_conteudo_id(3).await;
        let ordem: Vec<i32> = questions.iter().map(|question| question.ordem).collect();
        assert_eq!(ordem, vec![0, 1, 2]);
        assert_eq!(store.count_by_conteudo_id(3).await, 3);
        assert_eq!(store.count_by_conteudo_id(9).await, 1);
        assert_eq!(store.count_by_conteudo_id(42).await, 0);
    }
}

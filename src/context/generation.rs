use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use super::prompt::{build_question_prompt, no_history_response, TREND_SYSTEM_PROMPT};
use super::{assemble_context, ContextBudget, Snippet};
use crate::compare::{compare, CompareError};
use crate::config::EngineConfig;
use crate::store::ResourceStore;

/// Failure reported by an external capability (generation or retrieval).
#[derive(Error, Debug)]
#[error("Capability error: {0}")]
pub struct CapabilityError(pub String);

#[derive(Error, Debug)]
pub enum AssistError {
    #[error("Generation capability failed: {0}")]
    Generation(#[from] CapabilityError),

    #[error("Comparison failed: {0}")]
    Compare(#[from] CompareError),
}

/// External text-completion capability consuming an assembled context.
pub trait TextGenerator {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, CapabilityError>;
}

/// External knowledge-retrieval capability returning ranked snippets
/// with source labels, most relevant first.
pub trait KnowledgeRetriever {
    fn retrieve(&self, query: &str, max_results: usize) -> Result<Vec<Snippet>, CapabilityError>;
}

/// Question-answering seam: compare → assemble context → retrieve →
/// generate. Performs no generation itself; both capabilities are
/// collaborators behind traits.
pub struct TrendAssistant<'a, S: ResourceStore> {
    store: &'a S,
    config: &'a EngineConfig,
    generator: &'a dyn TextGenerator,
    retriever: Option<&'a dyn KnowledgeRetriever>,
    timeout: Duration,
}

impl<'a, S: ResourceStore> TrendAssistant<'a, S> {
    pub fn new(
        store: &'a S,
        config: &'a EngineConfig,
        generator: &'a dyn TextGenerator,
        retriever: Option<&'a dyn KnowledgeRetriever>,
        timeout: Duration,
    ) -> Self {
        Self { store, config, generator, retriever, timeout }
    }

    /// Answer a longitudinal question about a subject's history.
    /// With no comparable history, returns a fixed response without
    /// invoking the generation capability.
    pub fn answer(
        &self,
        subject_id: Uuid,
        question: &str,
        codes: Option<&[String]>,
    ) -> Result<String, AssistError> {
        let results = compare(self.store, self.config, subject_id, codes, self.timeout)?;
        if results.is_empty() {
            return Ok(no_history_response());
        }

        let snippets = match self.retriever {
            Some(retriever) => retriever.retrieve(question, self.config.max_snippets)?,
            None => Vec::new(),
        };

        let context = assemble_context(&results, &snippets, &ContextBudget::from(self.config));
        let prompt = build_question_prompt(question, &context);

        tracing::debug!(
            subject = %subject_id,
            context_chars = context.len(),
            snippets = snippets.len(),
            "invoking generation capability"
        );
        Ok(self.generator.generate(TREND_SYSTEM_PROMPT, &prompt)?)
    }
}

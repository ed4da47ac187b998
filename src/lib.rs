//! medtrail: ingestion normalization and longitudinal comparison engine
//! for scanned medical documents.
//!
//! The pipeline turns raw OCR output (text lines, key-value pairs, table
//! grids) into a persisted clinical resource graph (Subject → Report →
//! Observation), deduplicates re-uploaded documents by content
//! fingerprint, and answers questions like "how did this patient's
//! hemoglobin change between report A and report B?".
//!
//! External capabilities (OCR, blob/metadata storage, text generation,
//! knowledge retrieval) are collaborators behind traits: [`store::ResourceStore`],
//! [`context::TextGenerator`], [`context::KnowledgeRetriever`].

pub mod compare;
pub mod config;
pub mod context;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod subjects;

pub use compare::{compare, fetch_reports, ComparisonResult};
pub use config::EngineConfig;
pub use context::{assemble_context, ContextBudget, Snippet, TrendAssistant};
pub use pipeline::{IngestError, IngestOutcome, Ingestor, OcrOutput, TableGrid};
pub use store::{InMemoryStore, ResourceStore, SqliteStore, StoreError};
pub use subjects::register_subject;

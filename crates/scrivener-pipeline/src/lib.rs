//! The Scrivener generation pipeline.
//!
//! Automates production of long-form documents through a fixed sequence of
//! stages — summary, outline, draft, references, merged document, and two
//! quality checks — each produced by an external text-generation service and
//! gated by human approval.
//!
//! - [`PipelineController`] sequences the stages, enforces preconditions and
//!   regeneration budgets, and advances job status
//! - [`allocator`] repairs hierarchical word counts in generated outlines
//! - [`hints`] extracts word-count and citation-style hints from raw
//!   instruction text
//! - [`ArtifactRegistry`] holds the per-job, per-stage artifacts with their
//!   approval and regeneration metadata

pub mod allocator;
pub mod config;
pub mod hints;
pub mod prompts;
pub mod registry;
pub mod reports;
pub mod status;
pub mod summary;
pub mod validation;

mod controller;

pub use config::{PipelineConfig, StageModels, DEFAULT_REGENERATION_LIMIT};
pub use controller::{JobBrief, PipelineController, RunReport};
pub use registry::ArtifactRegistry;

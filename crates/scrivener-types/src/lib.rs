//! Shared types for the Scrivener document-generation pipeline.
//!
//! This crate provides the foundational types used across all other Scrivener
//! crates:
//! - `ScrivenerError` — unified error taxonomy
//! - `Stage` — the fixed, ordered generation stages
//! - `JobStatus` — the job status vocabulary with its rank order
//! - `Job` / `Artifact` — the persisted data model with approval and
//!   regeneration metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ScrivenerError
// ---------------------------------------------------------------------------

/// Unified error type for all Scrivener subsystems.
#[derive(Debug, thiserror::Error)]
pub enum ScrivenerError {
    // === Generation service errors ===
    #[error("Provider {provider} returned HTTP {status}: {message}")]
    ProviderError {
        provider: String,
        status: u16,
        message: String,
        retryable: bool,
    },

    #[error("Authentication failed for provider {provider}")]
    AuthError { provider: String },

    #[error("Request to {provider} timed out after {timeout_ms}ms")]
    RequestTimeout { provider: String, timeout_ms: u64 },

    #[error("Empty response from generation service for {stage}")]
    EmptyResponse { stage: Stage },

    // === Pipeline errors ===
    #[error("Cannot generate {stage}: {needs}")]
    MissingPrecondition { stage: Stage, needs: String },

    #[error("Generation limit reached ({limit}) for {scope}")]
    GenerationLimit { scope: String, limit: u32 },

    #[error("No {stage} artifact exists for this job")]
    UnknownArtifact { stage: Stage },

    // === Generic ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// A convenience alias for `Result<T, ScrivenerError>`.
pub type Result<T> = std::result::Result<T, ScrivenerError>;

// ---------------------------------------------------------------------------
// Stage — the ordered generation stages
// ---------------------------------------------------------------------------

/// One step of the generation pipeline, in execution order.
///
/// The declaration order is load-bearing: it defines both the generation
/// sequence and the status-advancement ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Summary,
    Structure,
    Content,
    References,
    FullContent,
    Plagiarism,
    AiReport,
}

impl Stage {
    /// All stages in generation order.
    pub const ALL: [Stage; 7] = [
        Stage::Summary,
        Stage::Structure,
        Stage::Content,
        Stage::References,
        Stage::FullContent,
        Stage::Plagiarism,
        Stage::AiReport,
    ];

    /// The stage whose approved output feeds this one. `Summary` has none.
    pub fn predecessor(self) -> Option<Stage> {
        match self {
            Stage::Summary => None,
            Stage::Structure => Some(Stage::Summary),
            Stage::Content => Some(Stage::Structure),
            Stage::References => Some(Stage::Content),
            Stage::FullContent => Some(Stage::References),
            Stage::Plagiarism => Some(Stage::FullContent),
            Stage::AiReport => Some(Stage::Plagiarism),
        }
    }

    /// The job status reached when this stage's artifact is approved.
    pub fn status(self) -> JobStatus {
        match self {
            Stage::Summary => JobStatus::Summary,
            Stage::Structure => JobStatus::Structure,
            Stage::Content => JobStatus::Content,
            Stage::References => JobStatus::References,
            Stage::FullContent => JobStatus::FullContent,
            Stage::Plagiarism => JobStatus::Plagiarism,
            Stage::AiReport => JobStatus::AiReport,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Stage::Summary => "Job Summary",
            Stage::Structure => "Job Structure",
            Stage::Content => "Content",
            Stage::References => "References",
            Stage::FullContent => "Full Content",
            Stage::Plagiarism => "Plagiarism Report",
            Stage::AiReport => "AI Report",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// JobStatus — status vocabulary with rank order
// ---------------------------------------------------------------------------

/// Job status vocabulary.
///
/// Declaration order defines the rank used by status advancement: a recorded
/// status never moves backward. `Rejected` sits outside the rank ladder — it
/// is terminal and sticky, short-circuiting any recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Summary,
    Structure,
    Content,
    References,
    FullContent,
    Plagiarism,
    AiReport,
    Rework,
    ReworkDone,
    Completed,
    Approved,
    Rejected,
}

impl JobStatus {
    /// Terminal statuses admit no further automated transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Rejected | JobStatus::Approved)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Summary => "SUMMARY",
            JobStatus::Structure => "STRUCTURE",
            JobStatus::Content => "CONTENT",
            JobStatus::References => "REFERENCES",
            JobStatus::FullContent => "FULL_CONTENT",
            JobStatus::Plagiarism => "PLAGIARISM",
            JobStatus::AiReport => "AI_REPORT",
            JobStatus::Rework => "REWORK",
            JobStatus::ReworkDone => "REWORK_DONE",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Approved => "APPROVED",
            JobStatus::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// Opaque job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One document-production job.
///
/// Jobs are created by the surrounding application; the pipeline controller
/// is the only writer of `status`. Approval of the job as a whole is recorded
/// here once every stage artifact has been approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub is_approved: bool,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new() -> Self {
        Self {
            id: JobId::new(),
            status: JobStatus::Pending,
            is_approved: false,
            approved_by: None,
            approved_at: None,
        }
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// ArtifactPayload — one variant per stage's output shape
// ---------------------------------------------------------------------------

/// Stage-specific artifact payload.
///
/// One variant per stage, selected by [`Stage`]; the variant carries exactly
/// the fields that stage produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ArtifactPayload {
    Summary {
        topic: String,
        word_count: u32,
        reference_style: String,
        writing_style: String,
        summary_text: String,
    },
    Structure {
        structure_text: String,
        total_word_count: u32,
    },
    Content {
        content_text: String,
        actual_word_count: u32,
    },
    References {
        reference_list: String,
        citation_list: String,
    },
    FullContent {
        content_with_citations: String,
        final_word_count: u32,
    },
    Plagiarism {
        report: String,
        similarity_percentage: f64,
    },
    AiReport {
        report: String,
        ai_percentage: f64,
    },
}

impl ArtifactPayload {
    /// The stage this payload belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            ArtifactPayload::Summary { .. } => Stage::Summary,
            ArtifactPayload::Structure { .. } => Stage::Structure,
            ArtifactPayload::Content { .. } => Stage::Content,
            ArtifactPayload::References { .. } => Stage::References,
            ArtifactPayload::FullContent { .. } => Stage::FullContent,
            ArtifactPayload::Plagiarism { .. } => Stage::Plagiarism,
            ArtifactPayload::AiReport { .. } => Stage::AiReport,
        }
    }

    /// The primary text carried by this payload, for display and export.
    pub fn primary_text(&self) -> &str {
        match self {
            ArtifactPayload::Summary { summary_text, .. } => summary_text,
            ArtifactPayload::Structure { structure_text, .. } => structure_text,
            ArtifactPayload::Content { content_text, .. } => content_text,
            ArtifactPayload::References { reference_list, .. } => reference_list,
            ArtifactPayload::FullContent {
                content_with_citations,
                ..
            } => content_with_citations,
            ArtifactPayload::Plagiarism { report, .. } => report,
            ArtifactPayload::AiReport { report, .. } => report,
        }
    }
}

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

/// The persisted output of one stage for one job.
///
/// At most one live artifact exists per (job, stage). Regeneration replaces
/// the payload in place and bumps `regeneration_count`; it never resets the
/// approval fields — approval must be explicitly re-granted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub stage: Stage,
    pub payload: ArtifactPayload,
    pub regeneration_count: u32,
    pub is_approved: bool,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub generated_at: DateTime<Utc>,
}

impl Artifact {
    /// Create a freshly generated, unapproved artifact.
    pub fn new(payload: ArtifactPayload) -> Self {
        Self {
            stage: payload.stage(),
            payload,
            regeneration_count: 0,
            is_approved: false,
            approved_by: None,
            approved_at: None,
            generated_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

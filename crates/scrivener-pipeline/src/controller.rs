//! The pipeline controller — sequencing, preconditions, budgets, approval.
//!
//! Seven stages run strictly one at a time per job, each consuming the
//! previous stage's approved output: summary, outline, draft, references,
//! merged document, then the two quality checks. Every stage is gated by a
//! regeneration budget and an approval precondition, and every failure is
//! reported back as a value; nothing here panics on a bad response.

use chrono::Utc;

use scrivener_llm::{ContentItem, DynClient, GenerationClient, GenerationRequest};
use scrivener_types::{
    Artifact, ArtifactPayload, Job, JobId, JobStatus, Result, ScrivenerError, Stage,
};

use crate::allocator;
use crate::config::PipelineConfig;
use crate::hints;
use crate::prompts;
use crate::registry::ArtifactRegistry;
use crate::reports;
use crate::status;
use crate::summary::parse_summary_fields;
use crate::validation::{count_words, strip_markdown, strip_trailing_references, validate_draft};

// ---------------------------------------------------------------------------
// JobBrief
// ---------------------------------------------------------------------------

/// The raw material a job starts from: combined instruction text (the
/// surrounding application has already extracted any attachment text into
/// it) plus inline image payloads.
#[derive(Debug, Clone)]
pub struct JobBrief {
    pub instructions: String,
    pub images: Vec<ContentItem>,
}

impl JobBrief {
    pub fn from_text(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.images.push(ContentItem::inline_image(media_type, data));
        self
    }
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// Outcome of a sequential run: one human-readable line per completed stage,
/// plus the error that stopped the run, if any.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub results: Vec<String>,
    pub error: Option<String>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

// ---------------------------------------------------------------------------
// Payload extractors
// ---------------------------------------------------------------------------

fn payload_mismatch() -> ScrivenerError {
    ScrivenerError::Other("artifact payload does not match its stage".to_string())
}

fn as_summary(payload: &ArtifactPayload) -> Result<(&str, u32, &str, &str, &str)> {
    match payload {
        ArtifactPayload::Summary {
            topic,
            word_count,
            reference_style,
            writing_style,
            summary_text,
        } => Ok((
            topic,
            *word_count,
            reference_style,
            writing_style,
            summary_text,
        )),
        _ => Err(payload_mismatch()),
    }
}

fn as_structure(payload: &ArtifactPayload) -> Result<(&str, u32)> {
    match payload {
        ArtifactPayload::Structure {
            structure_text,
            total_word_count,
        } => Ok((structure_text, *total_word_count)),
        _ => Err(payload_mismatch()),
    }
}

fn as_content(payload: &ArtifactPayload) -> Result<&str> {
    match payload {
        ArtifactPayload::Content { content_text, .. } => Ok(content_text),
        _ => Err(payload_mismatch()),
    }
}

fn as_references(payload: &ArtifactPayload) -> Result<(&str, &str)> {
    match payload {
        ArtifactPayload::References {
            reference_list,
            citation_list,
        } => Ok((reference_list, citation_list)),
        _ => Err(payload_mismatch()),
    }
}

fn as_full_content(payload: &ArtifactPayload) -> Result<&str> {
    match payload {
        ArtifactPayload::FullContent {
            content_with_citations,
            ..
        } => Ok(content_with_citations),
        _ => Err(payload_mismatch()),
    }
}

// ---------------------------------------------------------------------------
// PipelineController
// ---------------------------------------------------------------------------

/// Drives stage generation for jobs.
///
/// Owns the artifact registry and the generation client; jobs themselves are
/// created by the surrounding application and passed in, but their `status`
/// field is written only here.
pub struct PipelineController {
    client: DynClient,
    registry: ArtifactRegistry,
    config: PipelineConfig,
}

impl PipelineController {
    pub fn new(client: impl GenerationClient + 'static, config: PipelineConfig) -> Self {
        Self {
            client: DynClient::new(client),
            registry: ArtifactRegistry::new(),
            config,
        }
    }

    pub fn registry(&self) -> &ArtifactRegistry {
        &self.registry
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Status and approval
    // -----------------------------------------------------------------------

    /// Recompute the job's status from the approval snapshot and persist it.
    /// The recorded status never moves backward; `Rejected` is sticky.
    pub async fn advance_status(&self, job: &mut Job) -> JobStatus {
        let approved = self.registry.approved_stages(job.id).await;
        let new_status = status::advance(job.status, approved, job.is_approved);
        if new_status != job.status {
            tracing::info!(job = %job.id, from = %job.status, to = %new_status, "status advanced");
            job.status = new_status;
        }
        new_status
    }

    /// Approve a stage's artifact on behalf of `actor`.
    ///
    /// Once every stage is approved the job itself is marked approved, which
    /// advances its status to `APPROVED`.
    pub async fn approve(&self, job: &mut Job, stage: Stage, actor: &str) -> Result<JobStatus> {
        self.registry.approve(job.id, stage, actor).await?;
        tracing::info!(job = %job.id, stage = %stage, actor, "artifact approved");
        if !job.is_approved && self.registry.all_approved(job.id).await {
            job.is_approved = true;
            job.approved_by = Some(actor.to_string());
            job.approved_at = Some(Utc::now());
        }
        Ok(self.advance_status(job).await)
    }

    // -----------------------------------------------------------------------
    // Stage generation
    // -----------------------------------------------------------------------

    /// Generate or regenerate the job summary from the brief.
    pub async fn generate_summary(&self, job: &Job, brief: &JobBrief) -> Result<String> {
        self.begin(job.id, Stage::Summary).await?;

        let instructions_text = if brief.instructions.trim().is_empty() {
            prompts::DEFAULT_JOB_INSTRUCTIONS.to_string()
        } else {
            brief.instructions.clone()
        };

        // Hints from the raw brief override whatever the service reports.
        let wc_hint = hints::extract_word_count_hint(&instructions_text);
        let style_hint = hints::extract_reference_style(&instructions_text);

        let mut request = GenerationRequest::text(
            prompts::SUMMARY_INSTRUCTIONS,
            &instructions_text,
            self.config.models.for_stage(Stage::Summary),
        );
        for image in &brief.images {
            request.push(image.clone());
        }

        let text = self.generate_text(Stage::Summary, &request).await?;
        let mut fields = parse_summary_fields(&text);
        if let Some(count) = wc_hint.as_deref().and_then(hints::hint_lower_bound) {
            if count > 0 {
                fields.word_count = count;
            }
        }
        if let Some(style) = style_hint {
            fields.reference_style = style.to_string();
        }

        self.registry
            .record(
                job.id,
                ArtifactPayload::Summary {
                    topic: fields.topic,
                    word_count: fields.word_count,
                    reference_style: fields.reference_style,
                    writing_style: fields.writing_style,
                    summary_text: fields.summary_text,
                },
            )
            .await;
        Ok(format!("{} generated", Stage::Summary))
    }

    /// Generate or regenerate the outline from the approved summary.
    pub async fn generate_structure(&self, job: &Job) -> Result<String> {
        let summary = self
            .require_approved(job.id, Stage::Summary, Stage::Structure)
            .await?;
        let (topic, word_count, reference_style, writing_style, summary_text) =
            as_summary(&summary.payload)?;

        self.begin(job.id, Stage::Structure).await?;

        let payload =
            prompts::structure_payload(topic, word_count, reference_style, writing_style, summary_text);
        let request = GenerationRequest::text(
            prompts::STRUCTURE_INSTRUCTIONS,
            payload,
            self.config.models.for_stage(Stage::Structure),
        );
        let text = self.generate_text(Stage::Structure, &request).await?;

        let target = (word_count > 0).then_some(word_count);
        let rebalanced = allocator::rebalance(&text, target);

        self.registry
            .record(
                job.id,
                ArtifactPayload::Structure {
                    structure_text: rebalanced,
                    total_word_count: word_count,
                },
            )
            .await;
        Ok(format!("{} generated", Stage::Structure))
    }

    /// Generate or regenerate the draft from the approved outline.
    ///
    /// An out-of-tolerance or markdown-tainted draft earns exactly one
    /// corrective re-prompt; after that the output is accepted best-effort.
    pub async fn generate_content(&self, job: &Job) -> Result<String> {
        let structure = self
            .require_approved(job.id, Stage::Structure, Stage::Content)
            .await?;
        let (structure_text, _) = as_structure(&structure.payload)?;
        let structure_text = structure_text.to_string();

        self.begin(job.id, Stage::Content).await?;

        let model = self.config.models.for_stage(Stage::Content);
        let request =
            GenerationRequest::text(prompts::CONTENT_INSTRUCTIONS, &structure_text, model);
        let first = self.generate_text(Stage::Content, &request).await?;
        let mut cleaned = strip_trailing_references(&strip_markdown(&first));

        let report = validate_draft(&cleaned, &structure_text);
        if !report.within_tolerance() {
            tracing::warn!(
                job = %job.id,
                total_words = report.total_words,
                section_issues = report.section_issues.len(),
                markdown = report.has_markdown_headings,
                "draft out of tolerance, re-prompting once"
            );
            let mut retry =
                GenerationRequest::text(prompts::CONTENT_INSTRUCTIONS, &structure_text, model);
            retry.push(ContentItem::text(prompts::content_retry_reminder(
                report.total_target,
            )));
            // A failed retry keeps the first draft rather than failing the
            // stage.
            if let Ok(second) = self.generate_text(Stage::Content, &retry).await {
                cleaned = strip_trailing_references(&strip_markdown(&second));
            }
        }

        let actual_word_count = count_words(&cleaned);
        self.registry
            .record(
                job.id,
                ArtifactPayload::Content {
                    content_text: cleaned,
                    actual_word_count,
                },
            )
            .await;
        Ok(format!("{} generated", Stage::Content))
    }

    /// Generate or regenerate the reference and citation lists from the
    /// approved draft.
    pub async fn generate_references(&self, job: &Job) -> Result<String> {
        let content = self
            .require_approved(job.id, Stage::Content, Stage::References)
            .await?;
        let content_text = as_content(&content.payload)?.to_string();

        let summary = self.registry.get(job.id, Stage::Summary).await.ok_or(
            ScrivenerError::MissingPrecondition {
                stage: Stage::References,
                needs: format!("{} has not been generated yet", Stage::Summary),
            },
        )?;
        let (_, word_count, reference_style, _, _) = as_summary(&summary.payload)?;
        let reference_style = reference_style.to_string();

        self.begin(job.id, Stage::References).await?;

        let payload = prompts::references_payload(&content_text, &reference_style, word_count);
        let request = GenerationRequest::text(
            prompts::REFERENCES_INSTRUCTIONS,
            payload,
            self.config.models.for_stage(Stage::References),
        );
        let text = self.generate_text(Stage::References, &request).await?;
        let (reference_list, citation_list) = prompts::split_references_block(&text);

        self.registry
            .record(
                job.id,
                ArtifactPayload::References {
                    reference_list,
                    citation_list,
                },
            )
            .await;
        Ok(format!("{} generated", Stage::References))
    }

    /// Generate or regenerate the merged, cited document from the approved
    /// draft and references.
    pub async fn generate_full_content(&self, job: &Job) -> Result<String> {
        let content = self
            .require_approved(job.id, Stage::Content, Stage::FullContent)
            .await?;
        let content_text = as_content(&content.payload)?.to_string();
        let references = self
            .require_approved(job.id, Stage::References, Stage::FullContent)
            .await?;
        let (reference_list, citation_list) = as_references(&references.payload)?;
        let (reference_list, citation_list) =
            (reference_list.to_string(), citation_list.to_string());

        let summary = self.registry.get(job.id, Stage::Summary).await.ok_or(
            ScrivenerError::MissingPrecondition {
                stage: Stage::FullContent,
                needs: format!("{} has not been generated yet", Stage::Summary),
            },
        )?;
        let (_, _, reference_style, _, _) = as_summary(&summary.payload)?;
        let reference_style = reference_style.to_string();

        self.begin(job.id, Stage::FullContent).await?;

        let payload = prompts::merge_payload(
            &content_text,
            &reference_list,
            &citation_list,
            &reference_style,
        );
        let request = GenerationRequest::text(
            prompts::MERGE_INSTRUCTIONS,
            payload,
            self.config.models.for_stage(Stage::FullContent),
        );
        let text = self.generate_text(Stage::FullContent, &request).await?;

        let final_word_count = count_words(&text);
        self.registry
            .record(
                job.id,
                ArtifactPayload::FullContent {
                    content_with_citations: text,
                    final_word_count,
                },
            )
            .await;
        Ok(format!("{} generated", Stage::FullContent))
    }

    /// Generate the plagiarism report for the approved merged document.
    pub async fn generate_plagiarism_report(&self, job: &Job) -> Result<String> {
        let full = self
            .require_approved(job.id, Stage::FullContent, Stage::Plagiarism)
            .await?;
        let text = as_full_content(&full.payload)?.to_string();
        self.plagiarism_from_text(job.id, &text).await
    }

    /// Generate the AI-likeness report once the plagiarism check is
    /// approved.
    pub async fn generate_ai_report(&self, job: &Job) -> Result<String> {
        self.require_approved(job.id, Stage::Plagiarism, Stage::AiReport)
            .await?;
        let text = self.full_content_text(job.id).await?;
        self.ai_report_from_text(job.id, &text).await
    }

    // -----------------------------------------------------------------------
    // Sequential run
    // -----------------------------------------------------------------------

    /// Run every stage in order on behalf of `actor`.
    ///
    /// Refuses to start once any artifact of the job has used up the shared
    /// regeneration budget. Intermediate artifacts are auto-approved so the
    /// run can continue without intervention; the merged document is left
    /// unapproved for separate human review. The first failure stops the
    /// run, leaving earlier stages' artifacts intact — callers revert the
    /// transient in-progress marker if nothing was produced.
    pub async fn run_sequential(&self, job: &mut Job, brief: &JobBrief, actor: &str) -> RunReport {
        let mut results = Vec::new();
        let limit = self.config.regeneration_limit;
        if self.registry.max_generation_usage(job.id).await >= limit {
            return RunReport {
                results,
                error: Some(format!(
                    "Generation limit reached ({limit} regenerations used)."
                )),
            };
        }

        if job.status == JobStatus::Pending {
            job.status = JobStatus::InProgress;
        }

        let error = self
            .run_stages(job, brief, actor, &mut results)
            .await
            .err()
            .map(|e| e.to_string());
        if let Some(ref message) = error {
            tracing::warn!(job = %job.id, %message, "sequential run stopped");
        }
        RunReport { results, error }
    }

    async fn run_stages(
        &self,
        job: &mut Job,
        brief: &JobBrief,
        actor: &str,
        results: &mut Vec<String>,
    ) -> Result<()> {
        let line = self.generate_summary(job, brief).await?;
        self.approve(job, Stage::Summary, actor).await?;
        results.push(line);

        let line = self.generate_structure(job).await?;
        self.approve(job, Stage::Structure, actor).await?;
        results.push(line);

        let line = self.generate_content(job).await?;
        self.approve(job, Stage::Content, actor).await?;
        results.push(line);

        let line = self.generate_references(job).await?;
        self.approve(job, Stage::References, actor).await?;
        results.push(line);

        // The merged document awaits human review; status still advances
        // for the stages approved so far.
        let line = self.generate_full_content(job).await?;
        self.advance_status(job).await;
        results.push(line);

        // Quality checks run on the freshly merged text even though it is
        // not approved yet.
        let full_text = self.full_content_text(job.id).await?;
        let line = self.plagiarism_from_text(job.id, &full_text).await?;
        self.approve(job, Stage::Plagiarism, actor).await?;
        results.push(line);

        let line = self.ai_report_from_text(job.id, &full_text).await?;
        self.approve(job, Stage::AiReport, actor).await?;
        results.push(line);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn begin(&self, job: JobId, stage: Stage) -> Result<u32> {
        self.registry
            .begin_generation(job, stage, self.config.regeneration_limit)
            .await
    }

    async fn generate_text(&self, stage: Stage, request: &GenerationRequest) -> Result<String> {
        let response = self.client.generate(request).await?;
        let text = response.text.trim().to_string();
        if text.is_empty() {
            return Err(ScrivenerError::EmptyResponse { stage });
        }
        Ok(text)
    }

    async fn require_approved(
        &self,
        job: JobId,
        needed: Stage,
        stage: Stage,
    ) -> Result<Artifact> {
        match self.registry.get(job, needed).await {
            None => Err(ScrivenerError::MissingPrecondition {
                stage,
                needs: format!("{needed} has not been generated yet"),
            }),
            Some(artifact) if !artifact.is_approved => Err(ScrivenerError::MissingPrecondition {
                stage,
                needs: format!("{needed} must be approved first"),
            }),
            Some(artifact) => Ok(artifact),
        }
    }

    async fn full_content_text(&self, job: JobId) -> Result<String> {
        let artifact = self
            .registry
            .get(job, Stage::FullContent)
            .await
            .ok_or(ScrivenerError::UnknownArtifact {
                stage: Stage::FullContent,
            })?;
        Ok(as_full_content(&artifact.payload)?.to_string())
    }

    async fn plagiarism_from_text(&self, job: JobId, text: &str) -> Result<String> {
        self.begin(job, Stage::Plagiarism).await?;
        let (report, similarity_percentage) = reports::plagiarism_report(text);
        self.registry
            .record(
                job,
                ArtifactPayload::Plagiarism {
                    report,
                    similarity_percentage,
                },
            )
            .await;
        Ok(format!("{} generated", Stage::Plagiarism))
    }

    async fn ai_report_from_text(&self, job: JobId, text: &str) -> Result<String> {
        self.begin(job, Stage::AiReport).await?;
        let (report, ai_percentage) = reports::ai_likeness_report(text);
        self.registry
            .record(job, ArtifactPayload::AiReport { report, ai_percentage })
            .await;
        Ok(format!("{} generated", Stage::AiReport))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scrivener_llm::{GenerationResponse, Usage};

    /// Client that answers each stage with a canned response keyed by the
    /// instruction text.
    struct CannedClient {
        summary: String,
        empty_on_summary: bool,
    }

    impl CannedClient {
        fn new() -> Self {
            Self {
                summary: "Topic - Widgets; Word Count - 1000; Referencing Style - Harvard; \
                          Academic Style - Report; Job Summary - Write about widgets."
                    .to_string(),
                empty_on_summary: false,
            }
        }
    }

    #[async_trait]
    impl GenerationClient for CannedClient {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> scrivener_types::Result<GenerationResponse> {
            let text = if request.instructions == prompts::SUMMARY_INSTRUCTIONS {
                if self.empty_on_summary {
                    String::new()
                } else {
                    self.summary.clone()
                }
            } else if request.instructions == prompts::STRUCTURE_INSTRUCTIONS {
                "1. Introduction - 100 words\n2. Body - 800 words\n3. Conclusion - 100 words\n\
                 Total Word Count: 1000"
                    .to_string()
            } else {
                "placeholder".to_string()
            };
            Ok(GenerationResponse {
                id: "canned".into(),
                text,
                model: request.model.clone(),
                usage: Usage::default(),
            })
        }

        fn name(&self) -> &str {
            "canned"
        }

        fn default_model(&self) -> &str {
            "gpt-4.1-mini"
        }
    }

    #[tokio::test]
    async fn summary_generation_records_parsed_fields() {
        let controller = PipelineController::new(CannedClient::new(), PipelineConfig::default());
        let job = Job::new();
        let brief = JobBrief::from_text("Write a report on widgets.");

        let line = controller.generate_summary(&job, &brief).await.unwrap();
        assert_eq!(line, "Job Summary generated");

        let artifact = controller
            .registry()
            .get(job.id, Stage::Summary)
            .await
            .unwrap();
        let (topic, word_count, style, _, _) = as_summary(&artifact.payload).unwrap();
        assert_eq!(topic, "Widgets");
        assert_eq!(word_count, 1000);
        assert_eq!(style, "Harvard");
        assert!(!artifact.is_approved);
    }

    #[tokio::test]
    async fn brief_hints_override_reported_fields() {
        let controller = PipelineController::new(CannedClient::new(), PipelineConfig::default());
        let job = Job::new();
        // The service says 1000 words / Harvard; the brief says 2,500 / APA.
        let brief = JobBrief::from_text("Write about 2,500 words on widgets, APA style.");

        controller.generate_summary(&job, &brief).await.unwrap();

        let artifact = controller
            .registry()
            .get(job.id, Stage::Summary)
            .await
            .unwrap();
        let (_, word_count, style, _, _) = as_summary(&artifact.payload).unwrap();
        assert_eq!(word_count, 2500);
        assert_eq!(style, "APA");
    }

    #[tokio::test]
    async fn structure_requires_approved_summary() {
        let controller = PipelineController::new(CannedClient::new(), PipelineConfig::default());
        let job = Job::new();

        let err = controller.generate_structure(&job).await.unwrap_err();
        assert!(matches!(
            err,
            ScrivenerError::MissingPrecondition {
                stage: Stage::Structure,
                ..
            }
        ));
        assert!(err.to_string().contains("has not been generated"));

        // Generated but unapproved is still not enough.
        let brief = JobBrief::from_text("widgets");
        controller.generate_summary(&job, &brief).await.unwrap();
        let err = controller.generate_structure(&job).await.unwrap_err();
        assert!(err.to_string().contains("must be approved first"));
    }

    #[tokio::test]
    async fn structure_output_is_rebalanced_to_summary_target() {
        let controller = PipelineController::new(CannedClient::new(), PipelineConfig::default());
        let mut job = Job::new();
        let brief = JobBrief::from_text("widgets");

        controller.generate_summary(&job, &brief).await.unwrap();
        controller
            .approve(&mut job, Stage::Summary, "admin")
            .await
            .unwrap();
        controller.generate_structure(&job).await.unwrap();

        let artifact = controller
            .registry()
            .get(job.id, Stage::Structure)
            .await
            .unwrap();
        let (text, total) = as_structure(&artifact.payload).unwrap();
        assert_eq!(total, 1000);
        assert!(text.contains("Total Word Count: 1000"));
        assert_eq!(crate::allocator::top_level_total(text), 1000);
    }

    #[tokio::test]
    async fn empty_response_is_a_named_failure() {
        let client = CannedClient {
            empty_on_summary: true,
            ..CannedClient::new()
        };
        let controller = PipelineController::new(client, PipelineConfig::default());
        let job = Job::new();
        let brief = JobBrief::from_text("widgets");

        let err = controller.generate_summary(&job, &brief).await.unwrap_err();
        assert!(matches!(
            err,
            ScrivenerError::EmptyResponse {
                stage: Stage::Summary
            }
        ));
        // No artifact was recorded.
        assert!(controller
            .registry()
            .get(job.id, Stage::Summary)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn regeneration_budget_is_enforced_per_stage() {
        let controller = PipelineController::new(CannedClient::new(), PipelineConfig::default());
        let job = Job::new();
        let brief = JobBrief::from_text("widgets");

        // First generation plus three regenerations are allowed.
        for _ in 0..4 {
            controller.generate_summary(&job, &brief).await.unwrap();
        }
        let err = controller.generate_summary(&job, &brief).await.unwrap_err();
        assert!(matches!(
            err,
            ScrivenerError::GenerationLimit { limit: 3, .. }
        ));
    }

    #[tokio::test]
    async fn approval_cascades_to_job_status() {
        let controller = PipelineController::new(CannedClient::new(), PipelineConfig::default());
        let mut job = Job::new();
        let brief = JobBrief::from_text("widgets");

        controller.generate_summary(&job, &brief).await.unwrap();
        let status = controller
            .approve(&mut job, Stage::Summary, "admin")
            .await
            .unwrap();
        assert_eq!(status, JobStatus::Summary);
        assert_eq!(job.status, JobStatus::Summary);
        assert!(!job.is_approved);
    }

    #[tokio::test]
    async fn advance_status_is_sticky_on_rejected() {
        let controller = PipelineController::new(CannedClient::new(), PipelineConfig::default());
        let mut job = Job::new();
        job.status = JobStatus::Rejected;

        let brief = JobBrief::from_text("widgets");
        controller.generate_summary(&job, &brief).await.unwrap();
        controller
            .registry()
            .approve(job.id, Stage::Summary, "admin")
            .await
            .unwrap();

        assert_eq!(controller.advance_status(&mut job).await, JobStatus::Rejected);
        assert_eq!(job.status, JobStatus::Rejected);
    }
}

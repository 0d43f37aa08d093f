//! Per-job, per-stage artifact store.
//!
//! The registry enforces the two invariants the rest of the pipeline relies
//! on at its own boundary rather than trusting callers:
//!
//! - `regeneration_count` only ever moves up, and the budget check plus the
//!   increment happen atomically under one write lock
//!   ([`ArtifactRegistry::begin_generation`]). A reserved attempt counts
//!   against the budget whether or not the generation call later succeeds.
//! - approval is an explicit, separate operation; regenerating an artifact
//!   replaces its payload but never resets the approval fields.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use scrivener_types::{Artifact, ArtifactPayload, JobId, Result, ScrivenerError, Stage};

// ---------------------------------------------------------------------------
// ArtifactRegistry
// ---------------------------------------------------------------------------

/// Thread-safe store of the live artifact for each (job, stage) pair.
///
/// Cloning yields another handle to the same underlying store.
#[derive(Clone)]
pub struct ArtifactRegistry {
    inner: Arc<RwLock<HashMap<(JobId, Stage), Artifact>>>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The live artifact for a (job, stage), if one has been generated.
    pub async fn get(&self, job: JobId, stage: Stage) -> Option<Artifact> {
        self.inner.read().await.get(&(job, stage)).cloned()
    }

    pub async fn is_approved(&self, job: JobId, stage: Stage) -> bool {
        self.inner
            .read()
            .await
            .get(&(job, stage))
            .map(|a| a.is_approved)
            .unwrap_or(false)
    }

    /// Atomically reserve one generation attempt for a stage.
    ///
    /// When an artifact already exists this is the compare-and-increment on
    /// its regeneration count: the call fails without side effects once the
    /// count has reached `limit`. A first generation (no artifact yet) always
    /// succeeds and reserves count zero. Returns the count the upcoming
    /// generation will run under.
    pub async fn begin_generation(&self, job: JobId, stage: Stage, limit: u32) -> Result<u32> {
        let mut map = self.inner.write().await;
        match map.get_mut(&(job, stage)) {
            Some(artifact) => {
                if artifact.regeneration_count >= limit {
                    return Err(ScrivenerError::GenerationLimit {
                        scope: stage.to_string(),
                        limit,
                    });
                }
                artifact.regeneration_count += 1;
                Ok(artifact.regeneration_count)
            }
            None => Ok(0),
        }
    }

    /// Record a freshly generated payload for its stage.
    ///
    /// A new artifact starts unapproved with count zero; an existing one has
    /// its payload replaced and timestamp refreshed while its regeneration
    /// count and approval fields are left untouched.
    pub async fn record(&self, job: JobId, payload: ArtifactPayload) {
        let stage = payload.stage();
        let mut map = self.inner.write().await;
        match map.get_mut(&(job, stage)) {
            Some(artifact) => {
                artifact.payload = payload;
                artifact.generated_at = Utc::now();
            }
            None => {
                map.insert((job, stage), Artifact::new(payload));
            }
        }
    }

    /// Approve a stage's artifact, recording the actor and timestamp.
    pub async fn approve(&self, job: JobId, stage: Stage, actor: &str) -> Result<()> {
        let mut map = self.inner.write().await;
        let artifact = map
            .get_mut(&(job, stage))
            .ok_or(ScrivenerError::UnknownArtifact { stage })?;
        artifact.is_approved = true;
        artifact.approved_by = Some(actor.to_string());
        artifact.approved_at = Some(Utc::now());
        Ok(())
    }

    /// Stages of this job whose artifacts are currently approved.
    pub async fn approved_stages(&self, job: JobId) -> Vec<Stage> {
        let map = self.inner.read().await;
        Stage::ALL
            .into_iter()
            .filter(|stage| {
                map.get(&(job, *stage))
                    .map(|a| a.is_approved)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Whether every stage of this job has an approved artifact.
    pub async fn all_approved(&self, job: JobId) -> bool {
        self.approved_stages(job).await.len() == Stage::ALL.len()
    }

    /// The highest regeneration count recorded on any artifact of the job.
    ///
    /// Gates the job-wide budget for sequential runs.
    pub async fn max_generation_usage(&self, job: JobId) -> u32 {
        let map = self.inner.read().await;
        Stage::ALL
            .into_iter()
            .filter_map(|stage| map.get(&(job, stage)).map(|a| a.regeneration_count))
            .max()
            .unwrap_or(0)
    }

    /// All artifacts of a job in stage order, for display and export.
    pub async fn artifacts(&self, job: JobId) -> Vec<Artifact> {
        let map = self.inner.read().await;
        Stage::ALL
            .into_iter()
            .filter_map(|stage| map.get(&(job, stage)).cloned())
            .collect()
    }
}

impl Default for ArtifactRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_payload(text: &str) -> ArtifactPayload {
        ArtifactPayload::Summary {
            topic: "Topic".into(),
            word_count: 1500,
            reference_style: "Harvard".into(),
            writing_style: "Report".into(),
            summary_text: text.into(),
        }
    }

    #[tokio::test]
    async fn record_and_get_round_trip() {
        let registry = ArtifactRegistry::new();
        let job = JobId::new();

        registry.record(job, summary_payload("first")).await;
        let artifact = registry.get(job, Stage::Summary).await.unwrap();
        assert_eq!(artifact.stage, Stage::Summary);
        assert_eq!(artifact.regeneration_count, 0);
        assert!(!artifact.is_approved);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let registry = ArtifactRegistry::new();
        assert!(registry.get(JobId::new(), Stage::Content).await.is_none());
    }

    #[tokio::test]
    async fn first_generation_reserves_count_zero() {
        let registry = ArtifactRegistry::new();
        let job = JobId::new();
        let count = registry
            .begin_generation(job, Stage::Summary, 3)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn regeneration_increments_until_limit() {
        let registry = ArtifactRegistry::new();
        let job = JobId::new();
        registry.record(job, summary_payload("v0")).await;

        for expected in 1..=3 {
            let count = registry
                .begin_generation(job, Stage::Summary, 3)
                .await
                .unwrap();
            assert_eq!(count, expected);
        }

        let err = registry
            .begin_generation(job, Stage::Summary, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrivenerError::GenerationLimit { limit: 3, .. }));

        // The refused attempt had no side effects.
        let artifact = registry.get(job, Stage::Summary).await.unwrap();
        assert_eq!(artifact.regeneration_count, 3);
    }

    #[tokio::test]
    async fn regeneration_preserves_approval() {
        let registry = ArtifactRegistry::new();
        let job = JobId::new();
        registry.record(job, summary_payload("v0")).await;
        registry.approve(job, Stage::Summary, "admin").await.unwrap();

        registry
            .begin_generation(job, Stage::Summary, 3)
            .await
            .unwrap();
        registry.record(job, summary_payload("v1")).await;

        let artifact = registry.get(job, Stage::Summary).await.unwrap();
        assert_eq!(artifact.regeneration_count, 1);
        // Approval is not reset automatically; re-granting is an explicit
        // external decision.
        assert!(artifact.is_approved);
        assert_eq!(artifact.payload.primary_text(), "v1");
    }

    #[tokio::test]
    async fn approve_missing_artifact_fails() {
        let registry = ArtifactRegistry::new();
        let err = registry
            .approve(JobId::new(), Stage::References, "admin")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScrivenerError::UnknownArtifact {
                stage: Stage::References
            }
        ));
    }

    #[tokio::test]
    async fn approve_records_actor_and_time() {
        let registry = ArtifactRegistry::new();
        let job = JobId::new();
        registry.record(job, summary_payload("v0")).await;
        registry.approve(job, Stage::Summary, "reviewer").await.unwrap();

        let artifact = registry.get(job, Stage::Summary).await.unwrap();
        assert!(artifact.is_approved);
        assert_eq!(artifact.approved_by.as_deref(), Some("reviewer"));
        assert!(artifact.approved_at.is_some());
    }

    #[tokio::test]
    async fn approved_stages_in_stage_order() {
        let registry = ArtifactRegistry::new();
        let job = JobId::new();
        registry.record(job, summary_payload("s")).await;
        registry
            .record(
                job,
                ArtifactPayload::Structure {
                    structure_text: "1. A - 10 words".into(),
                    total_word_count: 10,
                },
            )
            .await;
        registry.approve(job, Stage::Structure, "admin").await.unwrap();
        registry.approve(job, Stage::Summary, "admin").await.unwrap();

        assert_eq!(
            registry.approved_stages(job).await,
            vec![Stage::Summary, Stage::Structure]
        );
        assert!(!registry.all_approved(job).await);
    }

    #[tokio::test]
    async fn max_generation_usage_takes_the_maximum() {
        let registry = ArtifactRegistry::new();
        let job = JobId::new();
        assert_eq!(registry.max_generation_usage(job).await, 0);

        registry.record(job, summary_payload("s")).await;
        registry
            .begin_generation(job, Stage::Summary, 5)
            .await
            .unwrap();
        registry
            .begin_generation(job, Stage::Summary, 5)
            .await
            .unwrap();

        registry
            .record(
                job,
                ArtifactPayload::Content {
                    content_text: "body".into(),
                    actual_word_count: 1,
                },
            )
            .await;
        registry
            .begin_generation(job, Stage::Content, 5)
            .await
            .unwrap();

        assert_eq!(registry.max_generation_usage(job).await, 2);
    }

    #[tokio::test]
    async fn jobs_are_independent() {
        let registry = ArtifactRegistry::new();
        let job_a = JobId::new();
        let job_b = JobId::new();
        registry.record(job_a, summary_payload("a")).await;

        assert!(registry.get(job_b, Stage::Summary).await.is_none());
        assert_eq!(registry.max_generation_usage(job_b).await, 0);
    }

    #[tokio::test]
    async fn concurrent_begin_generation_respects_limit() {
        let registry = ArtifactRegistry::new();
        let job = JobId::new();
        registry.record(job, summary_payload("v0")).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.begin_generation(job, Stage::Summary, 3).await
            }));
        }

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                granted += 1;
            }
        }

        // Exactly `limit` reservations may win, no matter the interleaving.
        assert_eq!(granted, 3);
        let artifact = registry.get(job, Stage::Summary).await.unwrap();
        assert_eq!(artifact.regeneration_count, 3);
    }
}

//! Status advancement over the fixed rank table.
//!
//! The recorded job status is the furthest-progress status implied by which
//! stage artifacts are approved. Advancement is a pure function over an
//! explicit snapshot — current status, approved stages, and the job-level
//! approval flag — so there is no hidden shared state to race on. The
//! recorded status never moves backward; manual transitions (entering
//! `Rework`, rejecting a job) are commands issued by the surrounding
//! workflow, not something this function invents.

use scrivener_types::{JobStatus, Stage};

/// Recompute a job's status from an approval snapshot.
///
/// `Rejected` is sticky: once a job is rejected no amount of artifact
/// approval moves it anywhere else.
pub fn advance<I>(current: JobStatus, approved_stages: I, job_approved: bool) -> JobStatus
where
    I: IntoIterator<Item = Stage>,
{
    if current == JobStatus::Rejected {
        return JobStatus::Rejected;
    }

    let mut status = current;
    for stage in approved_stages {
        status = status.max(stage.status());
    }
    if job_approved {
        status = status.max(JobStatus::Approved);
    }
    status
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

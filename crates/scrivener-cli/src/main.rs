//! CLI binary for running Scrivener generation jobs.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use scrivener_llm::{DeadlineClient, GenerationService, LoggingMiddleware};
use scrivener_pipeline::{allocator, hints, JobBrief, PipelineConfig, PipelineController};
use scrivener_types::{Artifact, ArtifactPayload, Job, JobId, JobStatus, Stage};

#[derive(Parser)]
#[command(name = "scriv", version, about = "Staged document-generation pipeline runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every generation stage for a job from an instructions file
    Run {
        /// Path to the instructions text file (attachment text already
        /// extracted and appended by the caller)
        instructions: PathBuf,

        /// Inline image attachments (png/jpeg)
        #[arg(long)]
        image: Vec<PathBuf>,

        /// Directory the stage artifacts are written to
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        /// Approve the merged document immediately instead of leaving it
        /// for review
        #[arg(long)]
        approve_final: bool,
    },

    /// Rebalance the word counts of an outline file
    Rebalance {
        /// Path to the outline text file
        outline: PathBuf,

        /// Target total word count
        #[arg(short, long)]
        target: Option<u32>,
    },

    /// Show the word-count and reference-style hints found in a file
    Hints {
        /// Path to the instructions text file
        instructions: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run {
            instructions,
            image,
            output,
            approve_final,
        } => cmd_run(&instructions, &image, &output, approve_final).await,
        Commands::Rebalance { outline, target } => cmd_rebalance(&outline, target),
        Commands::Hints { instructions } => cmd_hints(&instructions),
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn cmd_run(
    instructions: &Path,
    images: &[PathBuf],
    output: &Path,
    approve_final: bool,
) -> anyhow::Result<()> {
    let config = PipelineConfig::from_env();

    // Missing credentials abort here, before any job state exists.
    let service = GenerationService::from_env()?.with_middleware(LoggingMiddleware);
    let client = DeadlineClient::new(service, config.request_timeout);
    let controller = PipelineController::new(client, config);

    let text = std::fs::read_to_string(instructions)?;
    let mut brief = JobBrief::from_text(text);
    for path in images {
        brief = brief.with_image(media_type_for(path)?, std::fs::read(path)?);
    }

    let mut job = Job::new();
    let prior_status = job.status;
    println!("Running job {}", job.id);

    let report = controller.run_sequential(&mut job, &brief, "cli").await;
    for line in &report.results {
        println!("  {line}");
    }

    if let Some(error) = &report.error {
        // The run sets a transient in-progress marker; revert it when the
        // failure happened before any stage was approved.
        if job.status == JobStatus::InProgress {
            job.status = prior_status;
        }
        write_artifacts(&controller, job.id, output).await?;
        anyhow::bail!("generation stopped: {error}");
    }

    if approve_final {
        let status = controller.approve(&mut job, Stage::FullContent, "cli").await?;
        println!("Merged document approved, job status {status}");
    } else {
        println!("Merged document awaits review (job status {})", job.status);
    }

    write_artifacts(&controller, job.id, output).await?;
    println!("Artifacts written to {}", output.display());
    Ok(())
}

fn media_type_for(path: &Path) -> anyhow::Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        other => anyhow::bail!("unsupported image type: .{other}"),
    }
}

async fn write_artifacts(
    controller: &PipelineController,
    job: JobId,
    output: &Path,
) -> anyhow::Result<()> {
    let artifacts = controller.registry().artifacts(job).await;
    if artifacts.is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(output)?;
    for artifact in artifacts {
        let file = output.join(format!("{}.txt", file_stem(artifact.stage)));
        std::fs::write(&file, artifact_body(&artifact))?;
    }
    Ok(())
}

fn file_stem(stage: Stage) -> &'static str {
    match stage {
        Stage::Summary => "summary",
        Stage::Structure => "structure",
        Stage::Content => "content",
        Stage::References => "references",
        Stage::FullContent => "full_content",
        Stage::Plagiarism => "plagiarism_report",
        Stage::AiReport => "ai_report",
    }
}

fn artifact_body(artifact: &Artifact) -> String {
    match &artifact.payload {
        ArtifactPayload::References {
            reference_list,
            citation_list,
        } => format!(
            "REFERENCE LIST:\n\n{reference_list}\n\n\nCITATION LIST:\n\n{citation_list}"
        ),
        payload => payload.primary_text().to_string(),
    }
}

// ---------------------------------------------------------------------------
// rebalance
// ---------------------------------------------------------------------------

fn cmd_rebalance(outline: &Path, target: Option<u32>) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(outline)?;
    println!("{}", allocator::rebalance(&text, target));
    Ok(())
}

// ---------------------------------------------------------------------------
// hints
// ---------------------------------------------------------------------------

fn cmd_hints(instructions: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(instructions)?;
    match hints::extract_word_count_hint(&text) {
        Some(hint) => println!("Word count hint: {hint}"),
        None => println!("Word count hint: none"),
    }
    match hints::extract_reference_style(&text) {
        Some(style) => println!("Reference style: {style}"),
        None => println!("Reference style: none"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_by_extension() {
        assert_eq!(media_type_for(Path::new("a.png")).unwrap(), "image/png");
        assert_eq!(media_type_for(Path::new("b.JPG")).unwrap(), "image/jpeg");
        assert_eq!(media_type_for(Path::new("c.jpeg")).unwrap(), "image/jpeg");
        assert!(media_type_for(Path::new("d.pdf")).is_err());
    }

    #[test]
    fn file_stems_cover_every_stage() {
        let stems: Vec<&str> = Stage::ALL.into_iter().map(file_stem).collect();
        assert_eq!(stems.len(), 7);
        let unique: std::collections::HashSet<&&str> = stems.iter().collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn references_artifact_renders_both_lists() {
        let artifact = Artifact::new(ArtifactPayload::References {
            reference_list: "Smith, J. (2023).".into(),
            citation_list: "(Smith, 2023)".into(),
        });
        let body = artifact_body(&artifact);
        assert!(body.starts_with("REFERENCE LIST:"));
        assert!(body.contains("CITATION LIST:"));
        assert!(body.contains("(Smith, 2023)"));
    }
}

// crates/cli/src/main.rs
//! examtrack binary.
//!
//! Submits exam-generation requests to the study-tool backend and watches
//! the resulting jobs as live progress bars. Active jobs are persisted, so
//! `examtrack watch` after a restart picks up where a previous run left off.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use examtrack_tracker::{
    render, CardKind, FileStore, GenerateRequest, HttpSource, JobEvent, JobTracker,
    RegistryStore, TrackerConfig, UploadFile,
};

#[derive(Parser)]
#[command(name = "examtrack", about = "Track AI exam-generation jobs", version)]
struct Cli {
    /// Backend base URL.
    #[arg(
        long,
        env = "EXAMTRACK_BACKEND_URL",
        default_value = "http://127.0.0.1:8000",
        global = true
    )]
    backend_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit files for exam generation and watch the job to completion.
    Submit {
        /// Source files (PDF, slides, notes) to generate from.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Exam title.
        #[arg(long)]
        name: String,

        /// Number of questions to request.
        #[arg(long, default_value_t = 20)]
        count: u32,

        /// easy | medium | hard
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// Comma-separated question types, e.g. "mcq,short,cloze".
        #[arg(long, default_value = "mcq,short")]
        question_types: String,

        /// Comma-separated concepts to focus on.
        #[arg(long)]
        focus: Option<String>,

        /// exam | practice
        #[arg(long, default_value = "exam")]
        exam_mode: String,

        /// strict | creative
        #[arg(long, default_value = "strict")]
        generation_mode: String,

        /// Class to file the exam under.
        #[arg(long)]
        class_id: Option<i64>,

        /// AI provider key, forwarded as X-Gemini-API-Key.
        #[arg(long, env = "EXAMTRACK_API_KEY", hide_env_values = true)]
        api_key: String,
    },

    /// Resume watching the jobs recorded in the registry.
    Watch,

    /// Drop a job from the registry without waiting for it.
    Dismiss { job_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,examtrack=info,examtrack_tracker=info".into()),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!(backend_url = %cli.backend_url, "examtrack starting");
    let store = Arc::new(FileStore::default_paths()?);

    match cli.command {
        Command::Submit {
            files,
            name,
            count,
            difficulty,
            question_types,
            focus,
            exam_mode,
            generation_mode,
            class_id,
            api_key,
        } => {
            let source = Arc::new(HttpSource::new(&cli.backend_url));
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                let content = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload".to_string());
                uploads.push(UploadFile { filename, content });
            }

            let req = GenerateRequest {
                files: uploads,
                exam_name: name.clone(),
                question_count: count,
                difficulty,
                question_types,
                focus_concepts: focus,
                exam_mode: Some(exam_mode),
                generation_mode: Some(generation_mode),
                class_id,
                api_key,
            };
            let accepted = source.submit(&req).await?;
            println!("Job {} accepted", accepted.job_id);

            let tracker = JobTracker::new(store, source, TrackerConfig::default());
            tracker.resume();
            tracker.track(&accepted.job_id, &name);
            watch(tracker).await
        }

        Command::Watch => {
            let source = Arc::new(HttpSource::new(&cli.backend_url));
            let tracker = JobTracker::new(store, source, TrackerConfig::default());
            if tracker.resume() == 0 {
                println!("No active jobs.");
                return Ok(());
            }
            watch(tracker).await
        }

        Command::Dismiss { job_id } => {
            let mut jobs = store.load();
            let before = jobs.len();
            jobs.retain(|j| j.job_id != job_id);
            if jobs.len() == before {
                bail!("Job {job_id} is not in the registry");
            }
            store.save(&jobs)?;
            println!("Dismissed {job_id}");
            Ok(())
        }
    }
}

/// Drive progress bars off the tracker's event bus until the active set
/// drains.
async fn watch(tracker: Arc<JobTracker>) -> Result<()> {
    let mut rx = tracker.subscribe();
    let multi = MultiProgress::new();
    let style = ProgressStyle::with_template("{prefix:.bold} [{bar:30}] {pos:>3}% {msg}")?
        .progress_chars("=> ");
    let mut bars: HashMap<String, ProgressBar> = HashMap::new();
    sync_bars(&tracker, &multi, &style, &mut bars);

    while !tracker.active().is_empty() {
        match rx.recv().await {
            Ok(JobEvent::Completed { result_id, .. }) => {
                if let Some(id) = result_id {
                    let _ = multi.println(format!("Exam #{id} saved to your library"));
                }
            }
            Ok(_) => sync_bars(&tracker, &multi, &style, &mut bars),
            Err(RecvError::Lagged(_)) => sync_bars(&tracker, &multi, &style, &mut bars),
            Err(RecvError::Closed) => break,
        }
    }
    Ok(())
}

fn sync_bars(
    tracker: &JobTracker,
    multi: &MultiProgress,
    style: &ProgressStyle,
    bars: &mut HashMap<String, ProgressBar>,
) {
    let cards = render(&tracker.active());

    bars.retain(|job_id, bar| {
        let keep = cards.iter().any(|c| &c.job_id == job_id);
        if !keep {
            bar.finish_and_clear();
        }
        keep
    });

    for card in &cards {
        let bar = bars.entry(card.job_id.clone()).or_insert_with(|| {
            let bar = multi.add(ProgressBar::new(100));
            bar.set_style(style.clone());
            bar.set_prefix(card.title.clone());
            bar
        });
        match card.kind {
            CardKind::InProgress => {
                bar.set_position(card.percent.unwrap_or(0) as u64);
                let msg = match card.hint {
                    Some(hint) => format!("{} — {}", card.status_line, hint),
                    None => card.status_line.clone(),
                };
                bar.set_message(msg);
            }
            CardKind::Success => {
                bar.set_position(100);
                let msg = match &card.detail {
                    Some(detail) => format!("✓ {} ({})", card.status_line, detail),
                    None => format!("✓ {}", card.status_line),
                };
                bar.set_message(msg);
            }
            CardKind::Failure => {
                bar.set_message(format!("✗ {}", card.status_line));
            }
        }
    }
}

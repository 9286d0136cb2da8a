use std::path::{Path, PathBuf};

use clap::Parser;
use dotenvy::dotenv;
use tm_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use tm_common::{CandidatePool, MatchingConfig, MatchingPipeline, ParsedJob, ParsedResume};
use tracing::{info, warn};

const APP_NAME: &str = "tm-match";

#[derive(Debug, Parser)]
#[command(
    name = "tm-match",
    about = "Retrieve and score parsed candidate records against a parsed job record"
)]
struct Cli {
    /// Parsed job record (JSON)
    #[arg(long)]
    job: PathBuf,

    /// Parsed candidate records (JSON); the file name becomes the candidate id
    #[arg(long, num_args = 1.., required = true)]
    candidates: Vec<PathBuf>,

    /// Per-index retrieval depth; overrides TM_TOP_K_RETRIEVAL
    #[arg(long)]
    top_k: Option<usize>,

    /// Pretty-print the JSON reports
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn candidate_id_from_path(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Unreadable or invalid candidate files are logged and left out of the pool.
fn load_candidates(paths: &[PathBuf]) -> CandidatePool {
    let mut pool = CandidatePool::new();

    for path in paths {
        let id = candidate_id_from_path(path);
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read candidate file; skipping");
                continue;
            }
        };
        let resume = match ParsedResume::from_json(&raw) {
            Ok(resume) => resume,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "invalid candidate record; skipping");
                continue;
            }
        };
        if let Err(err) = pool.insert(id, resume) {
            warn!(path = %path.display(), error = %err, "candidate not added");
        }
    }

    pool
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing_subscriber(APP_NAME);
    install_tracing_panic_hook(APP_NAME);

    let args = Cli::parse();
    let mut config = MatchingConfig::from_env()?;
    if let Some(top_k) = args.top_k {
        config.top_k_retrieval = top_k;
        config.validate()?;
    }

    let job = ParsedJob::from_json(&std::fs::read_to_string(&args.job)?)?;
    let pool = load_candidates(&args.candidates);
    info!(
        job_title = %job.job_title,
        candidates = pool.len(),
        top_k = config.top_k_retrieval,
        embedder = %config.embedder,
        "starting matching run"
    );

    let mut pipeline = MatchingPipeline::from_config(&config)?;
    let outcome = pipeline.run(&job, &pool)?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&outcome.reports)?
    } else {
        serde_json::to_string(&outcome.reports)?
    };
    println!("{rendered}");

    info!(run_id = %outcome.run_id, reports = outcome.reports.len(), "done");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{APP_NAME} failed: {err}");
        std::process::exit(1);
    }
}

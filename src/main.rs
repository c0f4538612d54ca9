use anyhow::Result;
use clap::Parser;
use std::{path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use videomme::{dataset, process};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reshape the Video-MME question CSV into per-video JSON"
)]
struct Args {
    /// Source CSV, one row per question
    #[arg(short, long, default_value = "video_mme_test.csv")]
    input: PathBuf,
    /// Destination JSON file
    #[arg(short, long, default_value = "video_mme_test.json")]
    output: PathBuf,
    /// Number of videos to echo to stdout after writing
    #[arg(long, default_value_t = 2)]
    preview: usize,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();
    let start = Instant::now();

    // ─── 2) read rows ────────────────────────────────────────────────
    let records = process::load_records(&args.input)?;
    info!(rows = records.len(), input = %args.input.display(), "loaded rows");

    // ─── 3) group + resolve ──────────────────────────────────────────
    let (videos, stats) = dataset::build_dataset(records);

    // ─── 4) persist ──────────────────────────────────────────────────
    dataset::write_dataset(&args.output, &videos)?;
    info!(
        videos = stats.videos,
        questions = stats.questions,
        output = %args.output.display(),
        elapsed = ?start.elapsed(),
        "dataset written"
    );

    if args.preview > 0 {
        let n = args.preview.min(videos.len());
        println!("=== first {} videos ===", n);
        println!("{}", dataset::to_pretty_json(&videos[..n])?);
    }

    Ok(())
}

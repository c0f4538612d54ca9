use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use videomme::probe::{self, ChatCompletionsClient, Sampling};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Ask a vision-language model server one Video-MME question to check the setup"
)]
struct Args {
    /// Dataset produced by the converter
    #[arg(long, default_value = "video_mme_test.json")]
    dataset: PathBuf,
    /// Directory holding `<videoID>.<ext>` files
    #[arg(long, default_value = "Video-MME/unzipped/data")]
    video_dir: PathBuf,
    /// Root URL of an OpenAI-compatible server
    #[arg(long, default_value = "http://localhost:8000/")]
    server: String,
    #[arg(long, default_value = "Qwen/Qwen3-VL-8B-Instruct")]
    model: String,
    #[arg(long, default_value_t = 128)]
    max_new_tokens: u32,
    #[arg(long, default_value_t = 1.0)]
    fps: f32,
    #[arg(long, default_value_t = 360 * 420)]
    max_pixels: u32,
    /// Retries for failed requests, with exponential backoff
    #[arg(long, default_value_t = 3)]
    retries: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!(model = %args.model, server = %args.server, "starting smoke test");

    let sampling = Sampling {
        max_new_tokens: args.max_new_tokens,
        fps: args.fps,
        max_pixels: args.max_pixels,
    };
    let service =
        ChatCompletionsClient::new(&args.server, args.model.clone(), sampling)?.with_retries(args.retries, 500);

    match probe::run_probe(&service, &args.dataset, &args.video_dir).await {
        Ok(report) => {
            println!("question:  {}", report.question_id);
            println!("response:  {}", report.response);
            println!(
                "predicted: {}",
                report.predicted.map(String::from).unwrap_or_else(|| "-".into())
            );
            println!("expected:  {}", report.expected);
            println!("correct:   {}", report.is_correct());
            info!("smoke test complete, environment looks usable");
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, "smoke test failed");
            Err(e)
        }
    }
}

// src/probe/mod.rs
//
// One-question smoke test against a vision-language model server.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::dataset::{load_dataset, Question};

pub mod client;

pub use client::{ChatCompletionsClient, Sampling, VisionLanguageService};

/// Container formats tried, in order, when looking for a video file.
pub const VIDEO_EXTENSIONS: [&str; 5] = [".mp4", ".avi", ".mkv", ".mov", ".webm"];

static ANSWER_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([ABCD])\b").expect("answer letter pattern is valid"));

/// First `<dir>/<video_key><ext>` that exists.
pub fn locate_video(dir: &Path, video_key: &str) -> Option<PathBuf> {
    VIDEO_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}{}", video_key, ext)))
        .find(|p| p.exists())
}

pub fn build_prompt(question: &Question) -> String {
    let mut prompt = format!("{}\n\n", question.question);
    for option in &question.options {
        prompt.push_str(option);
        prompt.push('\n');
    }
    prompt.push_str("\nPlease select the correct answer (A, B, C, or D).");
    prompt
}

/// The first standalone A-D letter in the response, case-insensitively.
pub fn parse_predicted_answer(response: &str) -> Option<char> {
    ANSWER_LETTER
        .captures(&response.to_uppercase())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().chars().next())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub video_key: String,
    pub video_path: PathBuf,
    pub question_id: String,
    pub response: String,
    pub predicted: Option<char>,
    pub expected: String,
}

impl ProbeReport {
    pub fn is_correct(&self) -> bool {
        self.predicted
            .map(|p| self.expected == p.to_string())
            .unwrap_or(false)
    }
}

/// Load the dataset, find the first video on disk, ask the service its first
/// question and compare the predicted letter with the answer label.
#[instrument(level = "info", skip(service, dataset_path, video_dir), fields(dataset = %dataset_path.as_ref().display()))]
pub async fn run_probe<S, P, Q>(service: &S, dataset_path: P, video_dir: Q) -> Result<ProbeReport>
where
    S: VisionLanguageService,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    // ─── 1) dataset ─────────────────────────────────────────────────
    info!("[1/4] loading dataset");
    let videos = load_dataset(&dataset_path)?;
    let first = videos.first().context("dataset has no videos")?;
    info!(videos = videos.len(), video = %first.video_key, "dataset loaded");

    // ─── 2) video file ──────────────────────────────────────────────
    info!("[2/4] locating video file");
    let video_dir = video_dir.as_ref();
    let video_path = locate_video(video_dir, &first.video_key).with_context(|| {
        format!(
            "no video file for {} in {} (tried {})",
            first.video_key,
            video_dir.display(),
            VIDEO_EXTENSIONS.join(", ")
        )
    })?;
    info!(path = %video_path.display(), "found video");

    // ─── 3) inference ───────────────────────────────────────────────
    info!("[3/4] querying model");
    let question = first
        .questions
        .first()
        .with_context(|| format!("video {} has no questions", first.video_id))?;
    info!(question = %question.question, options = ?question.options, answer = %question.answer, "question");
    let prompt = build_prompt(question);
    let response = service
        .respond(&video_path, &prompt)
        .await
        .context("model inference failed")?;
    info!(response = %response, "model replied");

    // ─── 4) compare ─────────────────────────────────────────────────
    info!("[4/4] checking answer");
    let report = ProbeReport {
        video_key: first.video_key.clone(),
        video_path,
        question_id: question.question_id.clone(),
        predicted: parse_predicted_answer(&response),
        response,
        expected: question.answer.clone(),
    };
    info!(predicted = ?report.predicted, correct = report.is_correct(), "probe finished");
    Ok(report)
}

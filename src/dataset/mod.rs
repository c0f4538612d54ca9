// src/dataset/mod.rs
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::process::{answer, options, RawRecord};

pub mod read;
pub mod write;

pub use read::load_dataset;
pub use write::{to_pretty_json, write_dataset};

/// A multiple-choice question with its options and resolved answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: String,
    pub task_type: String,
    pub question: String,
    pub options: Vec<String>,
    /// Answer label, as given.
    pub answer: String,
    /// Text of the correct option, or the label if it could not be resolved.
    pub response: String,
}

/// All questions that share a grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub video_id: String,
    pub duration: String,
    pub domain: String,
    pub sub_category: String,
    pub url: String,
    #[serde(rename = "videoID")]
    pub video_key: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub videos: usize,
    pub questions: usize,
    /// Options blobs kept whole because they could not be segmented.
    pub option_fallbacks: usize,
    /// Answers that fell back to the raw label.
    pub answer_fallbacks: usize,
}

struct Converted {
    record: RawRecord,
    question: Question,
    option_fallback: bool,
    answer_fallback: bool,
}

fn convert_record(record: RawRecord) -> Converted {
    let extraction = options::segment_options(&record.options_list);
    let option_fallback = extraction.is_fallback();
    let opts = extraction.into_options();

    let resolution = answer::resolve(&record.answer, &record.answer_idx, &opts);
    let answer_fallback = resolution.is_fallback();

    let question = Question {
        question_id: record.question_id.clone(),
        task_type: record.task_type.clone(),
        question: record.question.clone(),
        options: opts,
        answer: record.answer.clone(),
        response: resolution.into_text(),
    };

    Converted {
        record,
        question,
        option_fallback,
        answer_fallback,
    }
}

/// Turn rows into per-video entries.
///
/// Videos are ordered by first appearance of their `video_id`; the
/// video-level fields come from that first row. Questions keep row order.
pub fn build_dataset(records: Vec<RawRecord>) -> (Vec<VideoEntry>, ConversionStats) {
    let converted: Vec<Converted> = records.into_par_iter().map(convert_record).collect();

    let mut stats = ConversionStats::default();
    let mut videos: Vec<VideoEntry> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for c in converted {
        stats.questions += 1;
        if c.option_fallback {
            debug!(question_id = %c.question.question_id, "options kept unsegmented");
            stats.option_fallbacks += 1;
        }
        if c.answer_fallback {
            debug!(
                question_id = %c.question.question_id,
                answer_idx = %c.record.answer_idx,
                "answer index unresolved, using label"
            );
            stats.answer_fallbacks += 1;
        }

        let idx = *position.entry(c.record.video_id.clone()).or_insert_with(|| {
            videos.push(VideoEntry {
                video_id: c.record.video_id.clone(),
                duration: c.record.duration.clone(),
                domain: c.record.domain.clone(),
                sub_category: c.record.sub_category.clone(),
                url: c.record.url.clone(),
                video_key: c.record.video_key.clone(),
                questions: Vec::new(),
            });
            videos.len() - 1
        });
        videos[idx].questions.push(c.question);
    }

    stats.videos = videos.len();
    info!(
        videos = stats.videos,
        questions = stats.questions,
        option_fallbacks = stats.option_fallbacks,
        answer_fallbacks = stats.answer_fallbacks,
        "built dataset"
    );
    (videos, stats)
}

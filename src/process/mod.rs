// src/process/mod.rs
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, trace};

pub mod answer;
pub mod options;

pub use answer::{parse_answer_index, resolve, resolve_answer, Resolution};
pub use options::{extract_options, segment_options, Extraction, OPTION_LABELS};

/// One CSV row: a video plus one of its questions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawRecord {
    /// Grouping key.
    pub video_id: String,
    pub duration: String,
    pub domain: String,
    pub sub_category: String,
    pub url: String,
    /// Identifier of the video file itself (the `videoID` column).
    #[serde(rename = "videoID")]
    pub video_key: String,
    pub question_id: String,
    pub task_type: String,
    pub question: String,
    /// All options in one cell, e.g. `"A. ... B. ..."`.
    pub options_list: String,
    /// Answer label, e.g. `"C"`.
    pub answer: String,
    /// Zero-based answer position; kept as text because it may be malformed.
    pub answer_idx: String,
}

/// Read every row of a headed CSV stream, in order.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize::<RawRecord>().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        trace!(idx, video_id = %record.video_id, question_id = %record.question_id, "record");
        records.push(record);
    }
    Ok(records)
}

/// Open `csv_path` and load all of its rows as [`RawRecord`]s.
#[tracing::instrument(level = "info", skip(csv_path), fields(path = %csv_path.as_ref().display()))]
pub fn load_records<P: AsRef<Path>>(csv_path: P) -> Result<Vec<RawRecord>> {
    let file = File::open(&csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path.as_ref()))?;
    let records = read_records(file)
        .with_context(|| format!("Failed to read {:?}", csv_path.as_ref()))?;
    debug!(rows = records.len(), "loaded CSV");
    Ok(records)
}

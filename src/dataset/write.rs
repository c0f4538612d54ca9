use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::{debug, warn};

use super::VideoEntry;

const INDENT: &[u8] = b"    ";

fn write_pretty<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> Result<()> {
    let mut ser = Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
    value
        .serialize(&mut ser)
        .context("serializing JSON")?;
    Ok(())
}

/// Pretty JSON with 4-space indentation. Non-ASCII text is kept as-is.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    write_pretty(&mut buf, value)?;
    Ok(String::from_utf8(buf)?)
}

/// Write `videos` to `path` as a JSON array.
pub fn write_dataset<P: AsRef<Path>>(path: P, videos: &[VideoEntry]) -> Result<()> {
    let path = path.as_ref();
    write_json_atomic(path, videos)?;
    debug!(path = %path.display(), videos = videos.len(), "wrote dataset");
    Ok(())
}

/// Write `value` to `.<name>.tmp` beside `path`, then rename it over `path`.
/// The temp file is removed if anything before the rename fails.
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("no file name in {:?}", path))?
        .to_string_lossy();
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    let file = fs::File::create(&tmp_path)
        .with_context(|| format!("creating {:?}", tmp_path))?;
    let written = (|| -> Result<()> {
        let mut out = BufWriter::new(file);
        write_pretty(&mut out, value)?;
        out.write_all(b"\n")?;
        out.flush()
            .with_context(|| format!("flushing {:?}", tmp_path))?;
        Ok(())
    })();
    if let Err(e) = written {
        if let Err(rm) = fs::remove_file(&tmp_path) {
            warn!(path = %tmp_path.display(), error = %rm, "failed to remove temp file");
        }
        return Err(e);
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{load_dataset, Question};
    use tempfile::tempdir;

    fn entry() -> VideoEntry {
        VideoEntry {
            video_id: "601".to_string(),
            duration: "long".to_string(),
            domain: "生活记录".to_string(),
            sub_category: "Vlog".to_string(),
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            video_key: "abc".to_string(),
            questions: vec![Question {
                question_id: "601-1".to_string(),
                task_type: "Action Reasoning".to_string(),
                question: "视频里的人在做什么？".to_string(),
                options: vec!["A. 做饭".to_string(), "B. 跑步".to_string()],
                answer: "A".to_string(),
                response: "A. 做饭".to_string(),
            }],
        }
    }

    #[test]
    fn test_write_keeps_non_ascii_and_field_names() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("video_mme_test.json");
        write_dataset(&path, &[entry()])?;

        let text = fs::read_to_string(&path)?;
        assert!(text.contains("视频里的人在做什么？"));
        assert!(!text.contains("\\u"));
        assert!(text.contains("\"videoID\": \"abc\""));
        assert!(text.contains("\n        \"questions\": ["));
        assert!(text.ends_with("]\n"));
        // temp file is gone after the rename
        assert!(!tmp.path().join(".video_mme_test.json.tmp").exists());

        let back = load_dataset(&path)?;
        assert_eq!(back, vec![entry()]);
        Ok(())
    }

    #[test]
    fn test_write_replaces_existing_file() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("out.json");
        fs::write(&path, "stale")?;
        write_dataset(&path, &[])?;
        assert_eq!(fs::read_to_string(&path)?, "[]\n");
        Ok(())
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("out.json");
        fs::write(&path, "previous")?;

        assert!(write_json_atomic(&path, &Unserializable).is_err());
        assert!(!tmp.path().join(".out.json.tmp").exists());
        assert_eq!(fs::read_to_string(&path)?, "previous");
        Ok(())
    }

    #[test]
    fn test_pretty_json_indent() -> Result<()> {
        let json = to_pretty_json(&vec!["A. 是"])?;
        assert_eq!(json, "[\n    \"A. 是\"\n]");
        Ok(())
    }
}

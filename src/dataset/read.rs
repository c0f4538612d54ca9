use anyhow::{Context, Result};
use std::{fs::File, io::BufReader, path::Path};

use super::VideoEntry;

/// Load a dataset previously written by [`super::write_dataset`].
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Vec<VideoEntry>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening {:?}", path))?;
    serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {:?}", path))
}

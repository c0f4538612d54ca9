// src/process/options.rs

/// Labels recognised in an options blob, in scan order.
pub const OPTION_LABELS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// Outcome of segmenting an options blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// One entry per contiguous label found, starting at `A`.
    Segmented(Vec<String>),
    /// The blob could not be segmented; carries it unmodified.
    Fallback(String),
}

impl Extraction {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Extraction::Fallback(_))
    }

    /// Flatten into an option list; a fallback becomes a single entry.
    pub fn into_options(self) -> Vec<String> {
        match self {
            Extraction::Segmented(options) => options,
            Extraction::Fallback(blob) => vec![blob],
        }
    }
}

fn marker(label: char) -> String {
    format!("{}. ", label)
}

/// The label whose marker terminates `label`'s span. Past `F` this is `G`,
/// which is never scanned for but still ends the `F` span.
fn next_label(label: char) -> char {
    char::from_u32(label as u32 + 1).unwrap_or(label)
}

/// Split `blob` on `"A. "`, `"B. "`, ... markers.
///
/// Scanning stops at the first label whose marker is absent, so a gap
/// (e.g. `A`, `B`, `D`) yields only the options before it. Each span runs
/// from its marker up to the first occurrence of the next label's marker,
/// or to the end of the blob, and is trimmed.
///
/// When the next label's marker first occurs before this label's marker
/// (e.g. the `"C. "` inside `"D.C. "`), the span is empty and scanning
/// continues. A span that cannot be sliced out of the blob turns the whole
/// result into [`Extraction::Fallback`].
pub fn segment_options(blob: &str) -> Extraction {
    let mut options = Vec::with_capacity(OPTION_LABELS.len());

    for &label in OPTION_LABELS.iter() {
        let Some(start) = blob.find(&marker(label)) else {
            break;
        };
        let end = blob
            .find(&marker(next_label(label)))
            .unwrap_or(blob.len());

        if end < start {
            options.push(String::new());
            continue;
        }
        match blob.get(start..end) {
            Some(span) => options.push(span.trim().to_string()),
            None => return Extraction::Fallback(blob.to_string()),
        }
    }

    Extraction::Segmented(options)
}

/// Option list for `blob`, never failing.
pub fn extract_options(blob: &str) -> Vec<String> {
    segment_options(blob).into_options()
}

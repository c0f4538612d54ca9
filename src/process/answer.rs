// src/process/answer.rs

/// How the answer text for a question was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The index pointed at an option; holds that option's text.
    Option(String),
    /// The index was unusable; holds the raw answer label.
    Label(String),
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Label(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Resolution::Option(text) | Resolution::Label(text) => text,
        }
    }
}

/// Parse an answer index cell. Surrounding whitespace and a leading `+` are
/// accepted; anything negative or non-integral is `None`.
pub fn parse_answer_index(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}

/// Look the answer index up in `options`, falling back to `label`.
pub fn resolve(label: &str, raw_index: &str, options: &[String]) -> Resolution {
    match parse_answer_index(raw_index).and_then(|idx| options.get(idx)) {
        Some(option) => Resolution::Option(option.clone()),
        None => Resolution::Label(label.to_string()),
    }
}

/// Human-readable answer: the indexed option, or the label when the index is
/// malformed or out of range.
pub fn resolve_answer(label: &str, raw_index: &str, options: &[String]) -> String {
    resolve(label, raw_index, options).into_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yes_no() -> Vec<String> {
        vec!["A. Yes".to_string(), "B. No".to_string()]
    }

    #[test]
    fn valid_index_picks_option() {
        assert_eq!(resolve_answer("B", "1", &yes_no()), "B. No");
        assert_eq!(resolve_answer("A", " 0 ", &yes_no()), "A. Yes");
    }

    #[test]
    fn out_of_range_falls_back_to_label() {
        assert_eq!(resolve_answer("B", "5", &yes_no()), "B");
        assert_eq!(resolve_answer("B", "2", &yes_no()), "B");
        assert_eq!(resolve_answer("A", "0", &[]), "A");
    }

    #[test]
    fn malformed_index_falls_back_to_label() {
        for raw in ["abc", "", "-1", "1.0", "one"] {
            let r = resolve("B", raw, &yes_no());
            assert!(r.is_fallback(), "{raw:?} should not resolve");
            assert_eq!(r.into_text(), "B");
        }
    }

    #[test]
    fn parses_index_like_integer_cells() {
        assert_eq!(parse_answer_index("2"), Some(2));
        assert_eq!(parse_answer_index("+3"), Some(3));
        assert_eq!(parse_answer_index("\t4\n"), Some(4));
    }

    #[test]
    fn end_to_end_resolution() {
        let options = crate::process::options::extract_options("A. Paris\nB. London\nC. Berlin");
        let r = resolve("C", "2", &options);
        assert_eq!(r, Resolution::Option("C. Berlin".to_string()));
    }
}

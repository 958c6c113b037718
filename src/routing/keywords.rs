//! The health-topic keyword set.

/// Substrings that mark a prompt as a health/medical query.
///
/// Matching is case-insensitive substring containment, not word-boundary
/// matching, so "Dr." also fires on "Dr. Seuss". That false positive is a
/// known tradeoff of the substring approach and is kept on purpose.
const BUILTIN_KEYWORDS: &[&str] = &[
    "blood pressure",
    "heart rate",
    "vital signs",
    "health data",
    "medical",
    "diagnosis",
    "symptoms",
    "treatment",
    "medication",
    "blood sugar",
    "cholesterol",
    "temperature",
    "pulse",
    "oxygen",
    "health",
    "medical condition",
    "disease",
    "illness",
    "patient",
    "doctor",
    "medical history",
    "Dr.",
    "physician",
];

/// An ordered, case-insensitive set of knowledge keywords.
///
/// Built once at startup and immutable afterwards. Entries are normalized to
/// lowercase at construction so mixed-case entries like "Dr." participate in
/// case-insensitive matching.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// The built-in health-topic keyword set.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_KEYWORDS.iter().copied())
    }

    /// Build a set from arbitrary keywords, dropping blank entries.
    pub fn new<'a>(keywords: impl IntoIterator<Item = &'a str>) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Append extra keywords, keeping the built-in ordering first.
    pub fn extend<S: AsRef<str>>(mut self, extra: &[S]) -> Self {
        for keyword in extra {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() {
                self.keywords.push(keyword);
            }
        }
        self
    }

    /// Whether the lower-cased text contains any keyword as a substring.
    pub fn matches(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_set_is_nonempty_and_lowercased() {
        let set = KeywordSet::builtin();
        assert_eq!(set.len(), BUILTIN_KEYWORDS.len());
        assert!(set.keywords.iter().all(|k| *k == k.to_lowercase()));
    }

    #[test]
    fn matching_is_case_insensitive_both_ways() {
        let set = KeywordSet::builtin();
        assert!(set.matches("BLOOD PRESSURE check"));
        assert!(set.matches("blood pressure check"));
        // "Dr." is stored lowercased, so it matches lower-cased prompts too.
        assert!(set.matches("a good dr. seuss book"));
    }

    #[test]
    fn blank_entries_are_dropped() {
        let set = KeywordSet::new(["", "  ", "pulse"]);
        assert_eq!(set.len(), 1);
        assert!(set.matches("resting PULSE"));
    }

    #[test]
    fn empty_text_matches_nothing() {
        assert!(!KeywordSet::builtin().matches(""));
    }
}

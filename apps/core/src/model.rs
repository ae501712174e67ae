use std::ops::Range;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub url: String,
}

impl Candidate {
    pub fn new(id: &str, title: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Title,
    Url,
}

impl MatchField {
    pub fn value<'a>(&self, candidate: &'a Candidate) -> &'a str {
        match self {
            Self::Title => &candidate.title,
            Self::Url => &candidate.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchMeta {
    pub field: MatchField,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch {
    pub candidate: Candidate,
    pub score: f64,
    pub meta: MatchMeta,
}

pub fn normalize_for_match(input: &str) -> Vec<char> {
    input.chars().flat_map(|c| c.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_for_match, Candidate, MatchField};

    #[test]
    fn normalization_folds_case_and_keeps_punctuation() {
        let folded: String = normalize_for_match("GitHub.com/Org").into_iter().collect();
        assert_eq!(folded, "github.com/org");
    }

    #[test]
    fn candidate_deserializes_without_title() {
        let candidate: Candidate =
            serde_json::from_str(r#"{"id":"7","url":"https://example.com"}"#).unwrap();
        assert_eq!(candidate.title, "");
        assert_eq!(MatchField::Url.value(&candidate), "https://example.com");
    }
}

use std::cell::RefCell;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Range;

use crate::config::Config;
use crate::model::{normalize_for_match, Candidate, MatchField, MatchMeta, RankedMatch};

pub const DEFAULT_PROVIDER: &str = "edit-distance";
pub const DEFAULT_THRESHOLD: f64 = 0.4;
pub const DEFAULT_DISTANCE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteError {
    EngineUnavailable(String),
    FetchFailed(String),
    NoIndex,
}

impl Display for PaletteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EngineUnavailable(name) => write!(f, "match provider unavailable: {name}"),
            Self::FetchFailed(reason) => write!(f, "candidate fetch failed: {reason}"),
            Self::NoIndex => write!(f, "no candidate index loaded"),
        }
    }
}

impl std::error::Error for PaletteError {}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    pub threshold: f64,
    pub distance: u32,
    pub keys: Vec<MatchField>,
    pub max_results: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            distance: DEFAULT_DISTANCE,
            keys: vec![MatchField::Title, MatchField::Url],
            max_results: 50,
        }
    }
}

impl From<&Config> for MatchOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            threshold: cfg.threshold,
            distance: cfg.distance,
            keys: cfg.keys.clone(),
            max_results: cfg.max_results as usize,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldScore {
    pub score: f64,
    pub span: Range<usize>,
}

/// A fuzzy scorer for a single (pattern, field) pair. Both inputs are already
/// case-folded. Lower scores are better; `None` means no usable alignment.
pub trait FuzzyScorer: Send {
    fn name(&self) -> &'static str;
    fn score(&self, pattern: &[char], text: &[char], options: &MatchOptions) -> Option<FieldScore>;
}

pub fn provider_by_name(name: &str) -> Result<Box<dyn FuzzyScorer>, PaletteError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "edit-distance" | "bitap" => Ok(Box::new(EditDistanceScorer::default())),
        "subsequence" => Ok(Box::new(SubsequenceScorer)),
        _ => Err(PaletteError::EngineUnavailable(name.to_string())),
    }
}

/// Approximate substring matching: the fewest edits that turn the pattern into
/// any substring of the text, scored as `errors / pattern_len + start / distance`.
#[derive(Debug, Default)]
pub struct EditDistanceScorer {
    rows: RefCell<DpRows>,
}

#[derive(Debug, Default)]
struct DpRows {
    prev_cost: Vec<usize>,
    prev_start: Vec<usize>,
    cost: Vec<usize>,
    start: Vec<usize>,
}

impl DpRows {
    fn prepare(&mut self, width: usize) {
        // Row 0 is free everywhere: a match may begin at any text offset.
        self.prev_cost.clear();
        self.prev_cost.resize(width, 0);
        self.prev_start.clear();
        self.prev_start.extend(0..width);
        self.cost.clear();
        self.cost.resize(width, 0);
        self.start.clear();
        self.start.resize(width, 0);
    }

    fn swap(&mut self) {
        std::mem::swap(&mut self.prev_cost, &mut self.cost);
        std::mem::swap(&mut self.prev_start, &mut self.start);
    }
}

fn max_errors(pattern_len: usize, threshold: f64) -> usize {
    let allowed = (threshold.max(0.0) * pattern_len as f64 + 1e-9).floor() as usize;
    allowed.min(pattern_len - 1)
}

impl FuzzyScorer for EditDistanceScorer {
    fn name(&self) -> &'static str {
        "edit-distance"
    }

    fn score(&self, pattern: &[char], text: &[char], options: &MatchOptions) -> Option<FieldScore> {
        let m = pattern.len();
        if m == 0 || text.is_empty() {
            return None;
        }

        let max_errors = max_errors(m, options.threshold);
        // Every pattern char absent from the text costs at least one edit.
        let absent = pattern.iter().filter(|&ch| !text.contains(ch)).count();
        if absent > max_errors {
            return None;
        }

        let mut rows = self.rows.borrow_mut();
        let rows = &mut *rows;
        rows.prepare(text.len() + 1);

        for (i, pattern_char) in pattern.iter().enumerate() {
            rows.cost[0] = i + 1;
            rows.start[0] = 0;
            let mut row_min = i + 1;

            for (j, text_char) in text.iter().enumerate() {
                let mut cost = rows.prev_cost[j] + usize::from(pattern_char != text_char);
                let mut start = rows.prev_start[j];

                // Equal cost keeps the earliest start so proximity stays minimal.
                let up = rows.prev_cost[j + 1] + 1;
                if up < cost || (up == cost && rows.prev_start[j + 1] < start) {
                    cost = up;
                    start = rows.prev_start[j + 1];
                }
                let left = rows.cost[j] + 1;
                if left < cost || (left == cost && rows.start[j] < start) {
                    cost = left;
                    start = rows.start[j];
                }

                rows.cost[j + 1] = cost;
                rows.start[j + 1] = start;
                row_min = row_min.min(cost);
            }

            // Row minima never decrease, so no later row can get back under the cutoff.
            if row_min > max_errors {
                return None;
            }
            rows.swap();
        }

        let mut best: Option<FieldScore> = None;
        for end in 1..rows.prev_cost.len() {
            let cost = rows.prev_cost[end];
            if cost > max_errors {
                continue;
            }
            let start = rows.prev_start[end];
            let score = location_score(cost, m, start, options.distance);
            if best.as_ref().map_or(true, |current| score < current.score) {
                best = Some(FieldScore {
                    score,
                    span: start..end,
                });
            }
        }
        best
    }
}

fn location_score(errors: usize, pattern_len: usize, start: usize, distance: u32) -> f64 {
    let accuracy = errors as f64 / pattern_len as f64;
    if distance == 0 {
        return if start > 0 { 1.0 } else { accuracy };
    }
    accuracy + start as f64 / distance as f64
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubsequenceScorer;

impl FuzzyScorer for SubsequenceScorer {
    fn name(&self) -> &'static str {
        "subsequence"
    }

    fn score(&self, pattern: &[char], text: &[char], _options: &MatchOptions) -> Option<FieldScore> {
        if pattern.is_empty() || text.is_empty() || pattern.len() > text.len() {
            return None;
        }
        let text_len = text.len() as f64;

        if let Some(position) = text.windows(pattern.len()).position(|window| window == pattern) {
            let length_penalty = (text.len() - pattern.len()) as f64 / text_len;
            return Some(FieldScore {
                score: (position as f64 / text_len) * 0.1 + length_penalty * 0.05,
                span: position..position + pattern.len(),
            });
        }

        let positions = subsequence_positions(text, pattern)?;
        let first = positions[0];
        let last = positions[positions.len() - 1];
        let gap_penalty: usize = positions
            .windows(2)
            .map(|pair| pair[1].saturating_sub(pair[0] + 1))
            .sum();

        Some(FieldScore {
            score: (0.1 + (gap_penalty as f64 + first as f64 * 0.5) / (2.0 * text_len)).min(1.0),
            span: first..last + 1,
        })
    }
}

fn subsequence_positions(haystack: &[char], needle: &[char]) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(needle.len());
    let mut next_start = 0;

    for needle_char in needle {
        let offset = haystack[next_start..]
            .iter()
            .position(|hay_char| hay_char == needle_char)?;
        let absolute = next_start + offset;
        positions.push(absolute);
        next_start = absolute + 1;
    }

    Some(positions)
}

struct IndexedCandidate {
    candidate: Candidate,
    fields: Vec<(MatchField, Vec<char>)>,
}

pub struct MatchEngine {
    scorer: Option<Box<dyn FuzzyScorer>>,
    options: MatchOptions,
    index: Option<Vec<IndexedCandidate>>,
}

impl Debug for MatchEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("scorer", &self.scorer.as_ref().map(|scorer| scorer.name()))
            .field("options", &self.options)
            .field("indexed", &self.index.as_ref().map(Vec::len))
            .finish()
    }
}

impl MatchEngine {
    pub fn new(scorer: Box<dyn FuzzyScorer>, options: MatchOptions) -> Self {
        Self {
            scorer: Some(scorer),
            options,
            index: None,
        }
    }

    pub fn unavailable(options: MatchOptions) -> Self {
        Self {
            scorer: None,
            options,
            index: None,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, PaletteError> {
        let scorer = provider_by_name(&cfg.provider)?;
        Ok(Self::new(scorer, MatchOptions::from(cfg)))
    }

    pub fn is_available(&self) -> bool {
        self.scorer.is_some()
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    pub fn indexed_len(&self) -> usize {
        self.index.as_ref().map_or(0, Vec::len)
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn index(&mut self, candidates: Vec<Candidate>) -> Result<usize, PaletteError> {
        if self.scorer.is_none() && !candidates.is_empty() {
            self.index = None;
            return Err(PaletteError::EngineUnavailable(
                "no fuzzy scorer configured".to_string(),
            ));
        }

        let keys = self.options.keys.clone();
        let indexed: Vec<IndexedCandidate> = candidates
            .into_iter()
            .map(|candidate| {
                let fields = keys
                    .iter()
                    .map(|key| (*key, normalize_for_match(key.value(&candidate))))
                    .collect();
                IndexedCandidate { candidate, fields }
            })
            .collect();
        let count = indexed.len();
        self.index = Some(indexed);
        Ok(count)
    }

    pub fn query(&self, text: &str) -> Vec<RankedMatch> {
        let trimmed = text.trim();
        if trimmed.is_empty() || self.options.max_results == 0 {
            return Vec::new();
        }
        let (Some(scorer), Some(index)) = (self.scorer.as_ref(), self.index.as_ref()) else {
            return Vec::new();
        };

        let pattern = normalize_for_match(trimmed);
        let mut scored: Vec<(usize, RankedMatch)> = index
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                self.best_field(&**scorer, entry, &pattern)
                    .map(|ranked| (position, ranked))
            })
            .collect();

        scored.sort_by(|a, b| a.1.score.total_cmp(&b.1.score).then_with(|| a.0.cmp(&b.0)));

        scored
            .into_iter()
            .take(self.options.max_results)
            .map(|(_, ranked)| ranked)
            .collect()
    }

    fn best_field(
        &self,
        scorer: &dyn FuzzyScorer,
        entry: &IndexedCandidate,
        pattern: &[char],
    ) -> Option<RankedMatch> {
        let mut best: Option<(MatchField, FieldScore)> = None;
        for (field, text) in &entry.fields {
            let Some(field_score) = scorer.score(pattern, text, &self.options) else {
                continue;
            };
            if field_score.score > self.options.threshold {
                continue;
            }
            if best
                .as_ref()
                .map_or(true, |(_, current)| field_score.score < current.score)
            {
                best = Some((*field, field_score));
            }
        }

        best.map(|(field, field_score)| RankedMatch {
            candidate: entry.candidate.clone(),
            score: field_score.score,
            meta: MatchMeta {
                field,
                span: field_score.span,
            },
        })
    }
}

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cursor::{Direction, SelectionCursor};
use crate::model::{Candidate, RankedMatch};
use crate::search::{MatchEngine, PaletteError};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub query: String,
    pub results: Vec<RankedMatch>,
    pub cursor: Option<usize>,
    pub visible: bool,
    pub indexed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub title: String,
    pub url: String,
    pub is_selected: bool,
    pub icon_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteView {
    pub visible: bool,
    pub query: String,
    pub rows: Vec<ResultRow>,
}

#[derive(Debug)]
pub struct SearchSession {
    engine: MatchEngine,
    query: String,
    results: Vec<RankedMatch>,
    cursor: SelectionCursor,
}

impl SearchSession {
    pub fn new(engine: MatchEngine) -> Self {
        Self {
            engine,
            query: String::new(),
            results: Vec::new(),
            cursor: SelectionCursor::default(),
        }
    }

    pub fn load(&mut self, candidates: Vec<Candidate>) -> Result<usize, PaletteError> {
        self.reset();
        self.engine.index(candidates)
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
        let trimmed = text.trim();
        if !trimmed.is_empty() && !self.engine.is_indexed() {
            debug!("query before index: {}", PaletteError::NoIndex);
        }
        self.results = self.engine.query(trimmed);
        self.cursor.reset(self.results.len());
    }

    pub fn navigate(&mut self, direction: Direction) {
        if self.results.is_empty() {
            return;
        }
        self.cursor.step(direction);
    }

    pub fn hover(&mut self, index: usize) -> bool {
        self.cursor.select(index)
    }

    pub fn commit(&self) -> Option<&Candidate> {
        let position = self.cursor.current()?;
        self.results.get(position).map(|ranked| &ranked.candidate)
    }

    pub fn reset(&mut self) {
        self.query.clear();
        self.results.clear();
        self.cursor.reset(0);
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[RankedMatch] {
        &self.results
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor.current()
    }

    pub fn is_indexed(&self) -> bool {
        self.engine.is_indexed()
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn state(&self, visible: bool) -> SessionState {
        SessionState {
            query: self.query.clone(),
            results: self.results.clone(),
            cursor: self.cursor.current(),
            visible,
            indexed: self.engine.is_indexed(),
        }
    }

    pub fn view(&self, visible: bool) -> PaletteView {
        let selected = self.cursor.current();
        let rows = self
            .results
            .iter()
            .enumerate()
            .map(|(index, ranked)| ResultRow {
                title: ranked.candidate.title.clone(),
                url: ranked.candidate.url.clone(),
                is_selected: selected == Some(index),
                icon_key: ranked.candidate.url.clone(),
            })
            .collect();

        PaletteView {
            visible,
            query: self.query.clone(),
            rows,
        }
    }
}

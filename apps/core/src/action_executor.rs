use std::fmt::{Display, Formatter};

use crate::model::Candidate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    EmptyUrl,
}

impl Display for LaunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "empty url"),
        }
    }
}

impl std::error::Error for LaunchError {}

pub trait ActionDispatcher {
    fn open_bookmark(&mut self, url: &str);
}

pub fn open_candidate<D: ActionDispatcher + ?Sized>(
    dispatcher: &mut D,
    candidate: &Candidate,
) -> Result<(), LaunchError> {
    let trimmed = candidate.url.trim();
    if trimmed.is_empty() {
        return Err(LaunchError::EmptyUrl);
    }

    dispatcher.open_bookmark(trimmed);
    Ok(())
}

use serde::{Deserialize, Serialize};

use crate::model::Candidate;
use crate::overlay_state::Visibility;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostRequest {
    Ping,
    Toggle,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HostResponse {
    Pong,
    Shown,
    Hidden,
}

impl From<Visibility> for HostResponse {
    fn from(value: Visibility) -> Self {
        match value {
            Visibility::Visible => Self::Shown,
            Visibility::Hidden => Self::Hidden,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum OutboundRequest {
    GetBookmarks,
    OpenBookmark { url: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmarksResponse {
    #[serde(default)]
    pub bookmarks: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded(Vec<Candidate>),
    Failed(String),
}

impl From<BookmarksResponse> for FetchOutcome {
    fn from(value: BookmarksResponse) -> Self {
        match value.bookmarks {
            Some(bookmarks) => Self::Loaded(bookmarks),
            None => Self::Failed("response has no bookmarks field".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Key { key: String },
    Input { text: String },
    PointerDown { inside: bool },
    Visibility { hidden: bool },
    Click { index: usize },
    Hover { index: usize },
}

//! Geographic annotation ("note") model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OsmError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    Open,
    Closed,
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NoteStatus::Open => "open",
            NoteStatus::Closed => "closed",
        })
    }
}

impl FromStr for NoteStatus {
    type Err = OsmError;

    fn from_str(s: &str) -> Result<Self, OsmError> {
        match s {
            "open" => Ok(NoteStatus::Open),
            "closed" => Ok(NoteStatus::Closed),
            other => Err(OsmError::UnexpectedResponse(format!(
                "unknown note status: {other}"
            ))),
        }
    }
}

/// What a note comment did to the note's thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteAction {
    Opened,
    Commented,
    Closed,
    Reopened,
}

impl fmt::Display for NoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NoteAction::Opened => "opened",
            NoteAction::Commented => "commented",
            NoteAction::Closed => "closed",
            NoteAction::Reopened => "reopened",
        })
    }
}

impl FromStr for NoteAction {
    type Err = OsmError;

    fn from_str(s: &str) -> Result<Self, OsmError> {
        match s {
            "opened" => Ok(NoteAction::Opened),
            "commented" => Ok(NoteAction::Commented),
            "closed" => Ok(NoteAction::Closed),
            "reopened" => Ok(NoteAction::Reopened),
            other => Err(OsmError::UnexpectedResponse(format!(
                "unknown note action: {other}"
            ))),
        }
    }
}

/// One entry of a note's comment thread. Anonymous comments carry no
/// author identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteComment {
    pub date: String,
    pub action: NoteAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<i64>,
}

/// A free-text annotation pinned to a coordinate, with an append-only
/// comment thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub status: NoteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_closed: Option<String>,
    pub comments: Vec<NoteComment>,
}

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ConvertedImage;

/// Lifecycle of one batch item.
///
/// ```text
/// queued ──start──▶ converting ──complete──▶ done
///    ▲                   └──────fail──────▶ error
///    └──────────── requeue ◀── done | error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Queued,
    Converting,
    Done,
    Error,
}

impl ItemState {
    /// Whether the item reached an outcome in the last pass.
    pub fn is_settled(&self) -> bool {
        matches!(self, ItemState::Done | ItemState::Error)
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemState::Queued => "queued",
            ItemState::Converting => "converting",
            ItemState::Done => "done",
            ItemState::Error => "error",
        };
        f.pad(label)
    }
}

/// A requested state change together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Start,
    Complete(ConvertedImage),
    Fail(String),
    Requeue,
}

impl Transition {
    pub fn target(&self) -> ItemState {
        match self {
            Transition::Start => ItemState::Converting,
            Transition::Complete(_) => ItemState::Done,
            Transition::Fail(_) => ItemState::Error,
            Transition::Requeue => ItemState::Queued,
        }
    }
}

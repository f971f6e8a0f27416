use thiserror::Error;

use super::ItemState;
use crate::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("You can only upload up to {max} images at a time ({existing} held, {incoming} submitted)")]
    CapacityExceeded {
        existing: usize,
        incoming: usize,
        max: usize,
    },

    #[error("no batch item at position {0}")]
    InvalidIndex(usize),

    #[error("batch item {0} not found")]
    UnknownItem(ItemId),

    #[error("illegal transition from {from} to {to}")]
    IllegalTransition { from: ItemState, to: ItemState },

    #[error("batch item at position {0} has no converted output")]
    NotConverted(usize),
}

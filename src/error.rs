//! Error types.
//!
//! Callers see three distinct failure kinds from the ladder: a missing
//! player, a rejected query parameter, and an internal invariant violation.
//! Only the first two are the caller's fault; the third means the ladder no
//! longer mirrors the record store and must be rebuilt by a full reload.

use thiserror::Error;

use crate::player::PlayerId;

/// A query parameter that failed validation. Each variant names one field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("'strategy' should be either 'around_player' or 'rank'")]
    Strategy,

    #[error("'offset' should be an integer either equal or greater than zero")]
    Offset,

    #[error("'limit' should be an integer between 0 and {max}")]
    Limit { max: usize },

    #[error("'range' should be an integer between 0 and {max}")]
    Range { max: usize },

    #[error("'player_id' should be an integer either equal or greater than zero")]
    PlayerId,
}

impl ValidationError {
    /// Name of the offending query field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            ValidationError::Strategy => "strategy",
            ValidationError::Offset => "offset",
            ValidationError::Limit { .. } => "limit",
            ValidationError::Range { .. } => "range",
            ValidationError::PlayerId => "player_id",
        }
    }
}

/// The identity map and the ordered index disagree, or the change feed broke
/// one of its own preconditions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum InternalError {
    #[error("index produced non-positive rank for player {id}")]
    NonPositiveRank { id: PlayerId },

    #[error("player {id} is in the identity map but not in the index")]
    MissingFromIndex { id: PlayerId },

    #[error("add event for player {id}, who is already on the ladder")]
    DuplicateAdd { id: PlayerId },

    #[error("update event for player {id}, who is not on the ladder")]
    MissingOnUpdate { id: PlayerId },

    #[error("delete event for player {id}, who is not on the ladder")]
    MissingOnDelete { id: PlayerId },

    #[error("full reload lists player {id} more than once")]
    DuplicateInReload { id: PlayerId },

    #[error("ladder is desynchronized from the record store and awaits a full reload")]
    Desynchronized,
}

/// Any failure returned by a ladder query.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum LadderError {
    #[error("cannot find the player with id {0}")]
    NotFound(PlayerId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

impl LadderError {
    /// HTTP status a façade should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            LadderError::NotFound(_) => 404,
            LadderError::Validation(_) => 422,
            LadderError::Internal(_) => 500,
        }
    }
}

/// Failures of the in-memory record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("player {0} already exists")]
    AlreadyExists(PlayerId),

    #[error("cannot find the player with id {0}")]
    NotFound(PlayerId),

    #[error("line {line}: expected `id,mmr`, found {content:?}")]
    Parse { line: usize, content: String },

    #[error("failed to read player records")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// HTTP status a façade should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            StoreError::AlreadyExists(_) => 400,
            StoreError::NotFound(_) => 404,
            StoreError::Parse { .. } => 422,
            StoreError::Io(_) => 500,
        }
    }
}

//! Ladder queries and parsing them from raw request parameters.

use serde::{Deserialize, Serialize};

use crate::config::QueryConfig;
use crate::error::ValidationError;
use crate::player::PlayerId;

/// How to select a window of the ladder.
///
/// Serialized with an internal `strategy` tag, matching the query-string
/// form `strategy=rank&offset=0&limit=10`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum LadderQuery {
    /// Ranks `offset + 1 ..= offset + limit`.
    Rank { offset: usize, limit: usize },
    /// Ranks within `range` of the player's own, clamped at rank 1 without
    /// re-centering.
    AroundPlayer { player_id: PlayerId, range: usize },
}

impl LadderQuery {
    /// Builds a query from string key/value pairs as a request layer would
    /// receive them.
    ///
    /// `strategy` defaults to `rank`, and omitted numeric fields take their
    /// defaults from `config`, except `player_id`, which `around_player`
    /// requires. Only the fields of the chosen strategy are read; unknown keys
    /// are ignored. Bounds are not checked here, the ladder does that.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] for the first field that is not a
    /// non-negative integer, or [`ValidationError::Strategy`] for an unknown
    /// strategy.
    ///
    /// # Examples
    ///
    /// ```
    /// use mmr_ladder::{LadderQuery, QueryConfig, ValidationError};
    ///
    /// let config = QueryConfig::default();
    /// let query = LadderQuery::from_params([("strategy", "around_player"), ("player_id", "42")], &config);
    /// assert_eq!(query, Ok(LadderQuery::AroundPlayer { player_id: 42, range: 5 }));
    ///
    /// let query = LadderQuery::from_params([("offset", "-1")], &config);
    /// assert_eq!(query, Err(ValidationError::Offset));
    /// ```
    pub fn from_params<'a, I>(params: I, config: &QueryConfig) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut strategy = None;
        let mut offset = None;
        let mut limit = None;
        let mut range = None;
        let mut player_id = None;

        for (key, value) in params {
            match key {
                // An empty strategy falls back to the default.
                "strategy" if !value.is_empty() => strategy = Some(value),
                "offset" => offset = Some(value),
                "limit" => limit = Some(value),
                "range" => range = Some(value),
                "player_id" => player_id = Some(value),
                _ => {}
            }
        }

        match strategy.unwrap_or("rank") {
            "rank" => Ok(LadderQuery::Rank {
                offset: parse_or(offset, config.default_offset, ValidationError::Offset)?,
                limit: parse_or(limit, config.default_limit, ValidationError::Limit { max: config.max_limit })?,
            }),
            "around_player" => {
                let player_id = player_id.ok_or(ValidationError::PlayerId)?;
                Ok(LadderQuery::AroundPlayer {
                    player_id: player_id.trim().parse().map_err(|_| ValidationError::PlayerId)?,
                    range: parse_or(range, config.default_range, ValidationError::Range { max: config.max_range })?,
                })
            }
            _ => Err(ValidationError::Strategy),
        }
    }
}

fn parse_or(value: Option<&str>, default: usize, error: ValidationError) -> Result<usize, ValidationError> {
    value.map_or(Ok(default), |value| value.trim().parse().map_err(|_| error))
}

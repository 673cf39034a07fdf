//! Ladder configuration.
//!
//! Every field has a default, so a partial document (or none at all) is a
//! valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Bounds and defaults for ladder queries.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Largest `limit` accepted by the `rank` strategy.
    pub max_limit: usize,
    /// Largest `range` accepted by the `around_player` strategy.
    pub max_range: usize,
    pub default_offset: usize,
    pub default_limit: usize,
    pub default_range: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_limit: 100,
            max_range: 50,
            default_offset: 0,
            default_limit: 10,
            default_range: 5,
        }
    }
}

/// Where the record store bootstraps from.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// File of `id,mmr` lines. The store starts empty when unset.
    pub initial_data: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    pub query: QueryConfig,
    pub store: StoreConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config: LadderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LadderConfig::default());
        assert_eq!(config.query.max_limit, 100);
        assert_eq!(config.query.max_range, 50);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config: LadderConfig =
            serde_json::from_str(r#"{"query": {"max_limit": 20}, "store": {"initial_data": "res/InitialData.txt"}}"#).unwrap();
        assert_eq!(config.query.max_limit, 20);
        assert_eq!(config.query.default_limit, 10);
        assert_eq!(config.store.initial_data, Some(PathBuf::from("res/InitialData.txt")));
    }
}

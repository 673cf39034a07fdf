//! Tier classification derived from a rank and the ladder size.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::player::{Mmr, PlayerId};

/// Ranks at or above this are always [`Tier::Challenger`].
pub const CHALLENGER_CUTOFF: usize = 100;

// Upper percentile bound (inclusive) of each tier below Challenger.
const PERCENTILE_TIERS: [(usize, Tier); 5] = [
    (1, Tier::Master),
    (5, Tier::Diamond),
    (10, Tier::Platinum),
    (25, Tier::Gold),
    (65, Tier::Silver),
];

/// Percentile bucket of a ranked player.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Challenger,
    Master,
    Diamond,
    Platinum,
    Gold,
    Silver,
    Bronze,
}

impl Tier {
    /// Classifies 1-based `rank` on a ladder of `total` players.
    ///
    /// The top [`CHALLENGER_CUTOFF`] ranks are Challenger regardless of
    /// ladder size. Below that the percentile `rank / total * 100` picks
    /// the tier, each bound inclusive.
    ///
    /// # Examples
    ///
    /// ```
    /// use mmr_ladder::Tier;
    ///
    /// assert_eq!(Tier::from_rank(100, 25_000), Tier::Challenger);
    /// assert_eq!(Tier::from_rank(101, 25_000), Tier::Master);
    /// assert_eq!(Tier::from_rank(25_000, 25_000), Tier::Bronze);
    /// ```
    #[must_use]
    pub fn from_rank(rank: usize, total: usize) -> Self {
        if rank <= CHALLENGER_CUTOFF {
            return Tier::Challenger;
        }
        // Integer form of `rank / total * 100 <= percentile`.
        let scaled_rank = rank as u128 * 100;
        PERCENTILE_TIERS
            .iter()
            .find(|&&(percentile, _)| scaled_rank <= total as u128 * percentile as u128)
            .map_or(Tier::Bronze, |&(_, tier)| tier)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::Challenger => "CHALLENGER",
            Tier::Master => "MASTER",
            Tier::Diamond => "DIAMOND",
            Tier::Platinum => "PLATINUM",
            Tier::Gold => "GOLD",
            Tier::Silver => "SILVER",
            Tier::Bronze => "BRONZE",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player as reported to the query layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RankedEntry {
    pub id: PlayerId,
    pub mmr: Mmr,
    pub rank: usize,
    pub tier: Tier,
}

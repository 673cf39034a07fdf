//! Order-statistic indexes over player records.
//!
//! An [`OrderedIndex`] keeps players in ladder order (see [`Player`]'s `Ord`)
//! and answers "what is this player's rank" and "who holds ranks `a..=b`".
//! Two implementations share the contract and must agree on every answer:
//!
//! - [`TreeIndex`]: a weight-balanced tree with subtree sizes, O(log n) per
//!   operation. This is what the ladder runs on.
//! - [`LinearIndex`]: a sorted vector, O(n) per mutation. It exists as a
//!   reference to check the tree against.

use serde::{Deserialize, Serialize};

use crate::player::Player;

mod linear;
mod tree;

pub use linear::LinearIndex;
pub use tree::TreeIndex;

/// A record together with its 1-based position in ladder order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub player: Player,
    pub rank: usize,
}

/// The ordered-index contract.
///
/// An index is keyed by ladder order alone and cannot look a player up by
/// id. Resolving an id to its current record is the caller's job:
/// [`Leaderboard`](crate::Leaderboard) keeps an identity map beside the
/// index and passes the record it holds to [`find`](Self::find) and
/// [`delete`](Self::delete). The `mmr` places the record in ladder order and
/// the `id` identifies it, so a lookup with a stale `mmr` misses, which the
/// caller treats as the index and its own view having drifted apart.
pub trait OrderedIndex {
    /// Creates an empty index with room for `capacity` records before it
    /// reallocates.
    fn with_capacity(capacity: usize) -> Self
    where
        Self: Sized;

    /// Number of records in the index.
    fn size(&self) -> usize;

    /// Adds `player`. Returns `false`, leaving the index unchanged, if the
    /// record is already present; callers must never let that happen.
    fn insert(&mut self, player: Player) -> bool;

    /// Removes `player`. Returns `false` if it was not present.
    fn delete(&mut self, player: &Player) -> bool;

    /// Returns `player` with its rank, or `None` if it is not present.
    fn find(&self, player: &Player) -> Option<RankedPlayer>;

    /// Returns ranks `from..=to` in ascending order.
    ///
    /// Both bounds are clamped into `1..=size()`, so an out-of-range window
    /// yields a short or empty result rather than an error.
    fn get_by_rank(&self, from: usize, to: usize) -> Vec<RankedPlayer>;

    /// Removes every record.
    fn clear(&mut self);

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

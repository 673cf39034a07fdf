use crate::index::{OrderedIndex, RankedPlayer};
use crate::player::Player;
use crate::raw::RawLadderTree;

/// Weight-balanced order-statistic tree index.
///
/// Insert, delete, rank lookup and single-rank selection are all O(log n).
/// A window of `k` consecutive ranks costs O(log n + k): one descent to the
/// first rank, then an in-order walk.
///
/// # Examples
///
/// ```
/// use mmr_ladder::{OrderedIndex, Player, TreeIndex};
///
/// let mut index = TreeIndex::new();
/// for id in 1..=1_000 {
///     index.insert(Player::new(id, 5_000 - id));
/// }
///
/// let found = index.find(&Player::new(10, 4_990)).unwrap();
/// assert_eq!(found.rank, 10);
///
/// let top: Vec<u64> = index.get_by_rank(1, 3).iter().map(|entry| entry.player.id).collect();
/// assert_eq!(top, vec![1, 2, 3]);
/// ```
pub struct TreeIndex {
    tree: RawLadderTree<Player>,
}

impl TreeIndex {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tree: RawLadderTree::new(),
        }
    }

    /// Number of records the index can hold before it reallocates.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Number of nodes on the longest root-to-leaf path. Stays within a
    /// small constant of `log2(size)` whatever the insertion order.
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns the record at 1-based `rank`.
    #[must_use]
    pub fn select(&self, rank: usize) -> Option<&Player> {
        self.tree.select(rank)
    }
}

impl Default for TreeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedIndex for TreeIndex {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: RawLadderTree::with_capacity(capacity),
        }
    }

    fn size(&self) -> usize {
        self.tree.len()
    }

    fn insert(&mut self, player: Player) -> bool {
        self.tree.insert(player)
    }

    fn delete(&mut self, player: &Player) -> bool {
        self.tree.remove(player).is_some()
    }

    fn find(&self, player: &Player) -> Option<RankedPlayer> {
        self.tree
            .get_with_rank(player)
            .map(|(&player, rank)| RankedPlayer { player, rank })
    }

    fn get_by_rank(&self, from: usize, to: usize) -> Vec<RankedPlayer> {
        self.tree
            .range(from, to)
            .map(|(rank, &player)| RankedPlayer { player, rank })
            .collect()
    }

    fn clear(&mut self) {
        self.tree.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_matches_get_by_rank() {
        let mut index = TreeIndex::with_capacity(64);
        for id in 0..64 {
            index.insert(Player::new(id, id % 8));
        }
        for found in index.get_by_rank(1, 64) {
            assert_eq!(index.select(found.rank), Some(&found.player));
        }
        assert_eq!(index.select(0), None);
        assert_eq!(index.select(65), None);
    }

    #[test]
    fn increasing_ids_stay_balanced() {
        let mut index = TreeIndex::new();
        for id in 1..=10_000 {
            index.insert(Player::new(id, 0));
        }
        // log2(10_000) < 14
        assert!(index.height() <= 28, "height {}", index.height());
        assert_eq!(index.find(&Player::new(10_000, 0)).map(|found| found.rank), Some(1));
        assert_eq!(index.find(&Player::new(1, 0)).map(|found| found.rank), Some(10_000));
    }
}

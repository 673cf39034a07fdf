use crate::index::{OrderedIndex, RankedPlayer};
use crate::player::Player;

/// Sorted-vector index. Every mutation shifts the tail of the vector, so it
/// is only suitable as a reference for checking [`TreeIndex`](super::TreeIndex).
#[derive(Clone, Debug, Default)]
pub struct LinearIndex {
    players: Vec<Player>,
}

impl LinearIndex {
    #[must_use]
    pub const fn new() -> Self {
        Self { players: Vec::new() }
    }
}

impl OrderedIndex for LinearIndex {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            players: Vec::with_capacity(capacity),
        }
    }

    fn size(&self) -> usize {
        self.players.len()
    }

    fn insert(&mut self, player: Player) -> bool {
        match self.players.binary_search(&player) {
            Ok(_) => false,
            Err(position) => {
                self.players.insert(position, player);
                true
            }
        }
    }

    fn delete(&mut self, player: &Player) -> bool {
        match self.players.binary_search(player) {
            Ok(position) => {
                self.players.remove(position);
                true
            }
            Err(_) => false,
        }
    }

    fn find(&self, player: &Player) -> Option<RankedPlayer> {
        let position = self.players.binary_search(player).ok()?;
        Some(RankedPlayer {
            player: self.players[position],
            rank: position + 1,
        })
    }

    fn get_by_rank(&self, from: usize, to: usize) -> Vec<RankedPlayer> {
        let from = from.max(1);
        let to = to.min(self.players.len());
        if from > to {
            return Vec::new();
        }
        self.players[from - 1..to]
            .iter()
            .zip(from..)
            .map(|(&player, rank)| RankedPlayer { player, rank })
            .collect()
    }

    fn clear(&mut self) {
        self.players.clear();
    }
}

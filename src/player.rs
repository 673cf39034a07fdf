//! Player records and the ladder ordering.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Stable player identity, assigned by the record store.
pub type PlayerId = u64;

/// Skill rating.
pub type Mmr = u64;

/// A player record as owned by the record store.
///
/// The [`Ord`] implementation is the ladder order: higher `mmr` first and,
/// between equal ratings, higher `id` first. No two distinct records compare
/// equal unless they share both fields, so every player has exactly one rank.
///
/// # Examples
///
/// ```
/// use mmr_ladder::Player;
///
/// let leader = Player::new(1, 2000);
/// let tied_newcomer = Player::new(7, 1500);
/// let tied_veteran = Player::new(3, 1500);
///
/// let mut ladder = vec![tied_veteran, leader, tied_newcomer];
/// ladder.sort();
/// assert_eq!(ladder, vec![leader, tied_newcomer, tied_veteran]);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub mmr: Mmr,
}

impl Player {
    #[must_use]
    pub const fn new(id: PlayerId, mmr: Mmr) -> Self {
        Self { id, mmr }
    }
}

impl Ord for Player {
    fn cmp(&self, other: &Self) -> Ordering {
        other.mmr.cmp(&self.mmr).then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Player {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn higher_mmr_comes_first() {
        assert!(Player::new(1, 200) < Player::new(2, 100));
    }

    #[test]
    fn tie_goes_to_higher_id() {
        assert!(Player::new(25_001, 999_999) < Player::new(2, 999_999));
    }

    #[test]
    fn only_identical_records_are_equal() {
        assert_eq!(Player::new(4, 10).cmp(&Player::new(4, 10)), Ordering::Equal);
        assert_ne!(Player::new(4, 10).cmp(&Player::new(4, 11)), Ordering::Equal);
    }

    proptest! {
        #[test]
        fn ordering_is_antisymmetric(a in any::<(u64, u64)>(), b in any::<(u64, u64)>()) {
            let a = Player::new(a.0, a.1);
            let b = Player::new(b.0, b.1);
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
            prop_assert_eq!(a.cmp(&b) == Ordering::Equal, a == b);
        }
    }
}

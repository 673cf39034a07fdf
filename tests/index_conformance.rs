use mmr_ladder::{LinearIndex, OrderedIndex, Player, TreeIndex};
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 5_000;

fn id_strategy() -> impl Strategy<Value = u64> {
    // Fewer ids than operations, so inserts collide and deletes hit.
    0u64..2_000
}

fn mmr_strategy() -> impl Strategy<Value = u64> {
    // A narrow rating band forces plenty of ties.
    0u64..64
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum IndexOp {
    Insert(u64, u64),
    Delete(u64, u64),
    Find(u64, u64),
    GetByRank(usize, usize),
    Clear,
}

fn index_op_strategy() -> impl Strategy<Value = IndexOp> {
    prop_oneof![
        6 => (id_strategy(), mmr_strategy()).prop_map(|(id, mmr)| IndexOp::Insert(id, mmr)),
        3 => (id_strategy(), mmr_strategy()).prop_map(|(id, mmr)| IndexOp::Delete(id, mmr)),
        2 => (id_strategy(), mmr_strategy()).prop_map(|(id, mmr)| IndexOp::Find(id, mmr)),
        2 => (0usize..2_100, 0usize..64).prop_map(|(from, width)| IndexOp::GetByRank(from, from + width)),
        1 => Just(IndexOp::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random operation sequence on the tree and the sorted-vector
    /// reference and asserts identical answers at every step.
    #[test]
    fn tree_matches_linear(ops in proptest::collection::vec(index_op_strategy(), TEST_SIZE)) {
        let mut tree = TreeIndex::new();
        let mut linear = LinearIndex::new();

        for op in ops {
            match op {
                IndexOp::Insert(id, mmr) => {
                    let player = Player::new(id, mmr);
                    prop_assert_eq!(tree.insert(player), linear.insert(player));
                }
                IndexOp::Delete(id, mmr) => {
                    let player = Player::new(id, mmr);
                    prop_assert_eq!(tree.delete(&player), linear.delete(&player));
                }
                IndexOp::Find(id, mmr) => {
                    let player = Player::new(id, mmr);
                    prop_assert_eq!(tree.find(&player), linear.find(&player));
                }
                IndexOp::GetByRank(from, to) => {
                    prop_assert_eq!(tree.get_by_rank(from, to), linear.get_by_rank(from, to));
                }
                IndexOp::Clear => {
                    tree.clear();
                    linear.clear();
                }
            }
            prop_assert_eq!(tree.size(), linear.size());
        }

        // Full walk: every rank agrees, and ranks are dense from 1.
        let everything = tree.get_by_rank(1, tree.size());
        prop_assert_eq!(&everything, &linear.get_by_rank(1, linear.size()));
        for (position, found) in everything.iter().enumerate() {
            prop_assert_eq!(found.rank, position + 1);
            prop_assert_eq!(tree.select(found.rank), Some(&found.player));
        }
    }

    /// Whatever the insertion order, the tree stays within a constant factor
    /// of a perfectly balanced one.
    #[test]
    fn height_stays_logarithmic(ids in proptest::collection::vec(any::<u64>(), 1..4_000)) {
        let mut tree = TreeIndex::new();
        for id in ids {
            tree.insert(Player::new(id, id % 16));
        }
        // Each child holds at least a quarter of its parent's weight, so the
        // height is bounded by log_{4/3}(n + 1) < 2.5 * bits(n).
        let bits = (usize::BITS - tree.size().leading_zeros()) as usize;
        let bound = 5 * bits / 2 + 1;
        prop_assert!(tree.height() <= bound, "height {} exceeds {} for {} players", tree.height(), bound, tree.size());
    }
}

#[test]
fn ordered_and_reversed_inserts_agree() {
    let mut ascending = TreeIndex::new();
    let mut descending = TreeIndex::new();
    for id in 0..3_000 {
        ascending.insert(Player::new(id, id / 3));
    }
    for id in (0..3_000).rev() {
        descending.insert(Player::new(id, id / 3));
    }
    pretty_assertions::assert_eq!(ascending.get_by_rank(1, 3_000), descending.get_by_rank(1, 3_000));
    pretty_assertions::assert_eq!(ascending.select(1), Some(&Player::new(2_999, 999)));
}

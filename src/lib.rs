//! A live MMR leaderboard.
//!
//! Players are ranked by matchmaking rating (MMR), highest first, with ties
//! broken by the higher player id. The crate keeps that ranking in step with
//! a record store and answers three questions cheaply:
//!
//! - how many players are on the ladder ([`Leaderboard::count`]),
//! - where one player stands ([`Leaderboard::find`]),
//! - who occupies a window of ranks ([`Leaderboard::get`]), either a page
//!   starting at an offset or the neighbourhood of a given player.
//!
//! Each answer carries the player's [`Tier`], a bucket derived from rank and
//! ladder size.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use mmr_ladder::{LadderQuery, Leaderboard, MemoryStore, Player, Tier};
//!
//! let store = MemoryStore::new();
//! for id in 1..=1_000 {
//!     store.create(Player::new(id, 3_000 - id)).unwrap();
//! }
//!
//! // Subscribing hands the ladder a full snapshot, then every later change.
//! let ladder: Arc<Leaderboard> = Arc::new(Leaderboard::new());
//! store.subscribe(ladder.clone());
//! assert_eq!(ladder.count(), 1_000);
//!
//! store.update(Player::new(500, 5_000)).unwrap();
//! let entry = ladder.find(500).unwrap();
//! assert_eq!((entry.rank, entry.tier), (1, Tier::Challenger));
//!
//! let page = ladder.get(&LadderQuery::Rank { offset: 100, limit: 3 }).unwrap();
//! let ids: Vec<u64> = page.iter().map(|entry| entry.id).collect();
//! assert_eq!(ids, vec![100, 101, 102]);
//! assert_eq!(page[1].tier, Tier::Gold);
//! ```
//!
//! # Implementation
//!
//! The ranking lives in an [`OrderedIndex`]. [`TreeIndex`] is a
//! weight-balanced binary tree whose nodes carry subtree sizes, so rank
//! lookups and rank selection are O(log n) and a window of `k` ranks is
//! O(log n + k). [`LinearIndex`] implements the same contract over a sorted
//! vector and serves as the reference the tree is tested against.

#![forbid(unsafe_code)]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Ranks are `usize`; widening them into `u128` for percentile math is lossless.
#![allow(clippy::cast_lossless)]
#![allow(clippy::module_name_repetitions)]

mod raw;

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod player;
pub mod query;
pub mod store;
pub mod tier;

pub use config::{LadderConfig, QueryConfig, StoreConfig};
pub use engine::Leaderboard;
pub use error::{InternalError, LadderError, StoreError, ValidationError};
pub use index::{LinearIndex, OrderedIndex, RankedPlayer, TreeIndex};
pub use player::{Mmr, Player, PlayerId};
pub use query::LadderQuery;
pub use store::{MemoryStore, StoreEvent, StoreSubscriber, SubscriptionId};
pub use tier::{RankedEntry, Tier};

//! The ranking engine.
//!
//! A [`Leaderboard`] mirrors the record store through its change feed and
//! answers rank queries out of its own identity map and ordered index. Both
//! live behind one read-write lock: events are applied under the write lock,
//! queries run under the read lock, so no reader ever sees a half-applied
//! event.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, error, info};

use crate::config::QueryConfig;
use crate::error::{InternalError, LadderError, ValidationError};
use crate::index::{OrderedIndex, RankedPlayer, TreeIndex};
use crate::player::{Player, PlayerId};
use crate::query::LadderQuery;
use crate::store::{StoreEvent, StoreSubscriber};
use crate::tier::{RankedEntry, Tier};

struct LadderState<I> {
    players: HashMap<PlayerId, Player>,
    index: I,
}

impl<I: OrderedIndex + Default> LadderState<I> {
    fn new() -> Self {
        Self {
            players: HashMap::new(),
            index: I::default(),
        }
    }

    /// Builds the replacement state off to the side so a bad snapshot never
    /// leaves a half-built ladder behind.
    fn rebuilt(players: &[Player]) -> Result<Self, InternalError> {
        let mut state = Self {
            players: HashMap::with_capacity(players.len()),
            index: I::with_capacity(players.len()),
        };
        for &player in players {
            if state.players.insert(player.id, player).is_some() || !state.index.insert(player) {
                return Err(InternalError::DuplicateInReload { id: player.id });
            }
        }
        Ok(state)
    }
}

impl<I: OrderedIndex> LadderState<I> {
    // Preconditions are checked before anything is touched, so a rejected
    // event leaves both structures exactly as they were.

    fn add(&mut self, player: Player) -> Result<(), InternalError> {
        if self.players.contains_key(&player.id) || !self.index.insert(player) {
            return Err(InternalError::DuplicateAdd { id: player.id });
        }
        self.players.insert(player.id, player);
        Ok(())
    }

    fn update(&mut self, player: Player) -> Result<(), InternalError> {
        let id = player.id;
        let old = *self.players.get(&id).ok_or(InternalError::MissingOnUpdate { id })?;
        if self.index.find(&old).is_none() {
            return Err(InternalError::MissingFromIndex { id });
        }
        // A stray copy of the new record would make the insert below fail
        // after the old one is already gone.
        if player != old && self.index.find(&player).is_some() {
            return Err(InternalError::DuplicateAdd { id });
        }
        self.index.delete(&old);
        self.index.insert(player);
        self.players.insert(id, player);
        Ok(())
    }

    fn delete(&mut self, id: PlayerId) -> Result<(), InternalError> {
        let old = *self.players.get(&id).ok_or(InternalError::MissingOnDelete { id })?;
        if !self.index.delete(&old) {
            return Err(InternalError::MissingFromIndex { id });
        }
        self.players.remove(&id);
        Ok(())
    }

    fn locate(&self, id: PlayerId) -> Result<RankedPlayer, LadderError> {
        let player = self.players.get(&id).ok_or(LadderError::NotFound(id))?;
        let found = self.index.find(player).ok_or(InternalError::MissingFromIndex { id })?;
        Ok(found)
    }

    fn entry(&self, found: RankedPlayer) -> Result<RankedEntry, InternalError> {
        let RankedPlayer { player, rank } = found;
        if rank == 0 {
            return Err(InternalError::NonPositiveRank { id: player.id });
        }
        Ok(RankedEntry {
            id: player.id,
            mmr: player.mmr,
            rank,
            tier: Tier::from_rank(rank, self.index.size()),
        })
    }

    fn window(&self, from: usize, to: usize) -> Result<Vec<RankedEntry>, InternalError> {
        self.index
            .get_by_rank(from, to)
            .into_iter()
            .map(|found| self.entry(found))
            .collect()
    }
}

/// A live MMR ladder.
///
/// Feed it the record store's events (directly through [`apply`] or by
/// subscribing it to a [`MemoryStore`](crate::MemoryStore)) and query it with
/// [`count`], [`find`] and [`get`].
///
/// An internal error (the identity map and index disagreeing, or the change
/// feed breaking its own preconditions) is logged and latches the ladder:
/// every query and incremental event fails with
/// [`InternalError::Desynchronized`] until the next full reload.
///
/// [`apply`]: Leaderboard::apply
/// [`count`]: Leaderboard::count
/// [`find`]: Leaderboard::find
/// [`get`]: Leaderboard::get
///
/// # Examples
///
/// ```
/// use mmr_ladder::{LadderQuery, Leaderboard, Player, StoreEvent, Tier};
///
/// let ladder: Leaderboard = Leaderboard::new();
/// ladder
///     .apply(&StoreEvent::FullReload((1..=500).map(|id| Player::new(id, 10_000 - id)).collect()))
///     .unwrap();
///
/// let player = ladder.find(101).unwrap();
/// assert_eq!((player.rank, player.tier), (101, Tier::Gold));
///
/// let around = ladder.get(&LadderQuery::AroundPlayer { player_id: 1, range: 2 }).unwrap();
/// let ranks: Vec<usize> = around.iter().map(|entry| entry.rank).collect();
/// assert_eq!(ranks, vec![1, 2, 3]);
/// ```
pub struct Leaderboard<I = TreeIndex> {
    config: QueryConfig,
    state: RwLock<LadderState<I>>,
    desynchronized: AtomicBool,
}

impl<I: OrderedIndex + Default> Leaderboard<I> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(QueryConfig::default())
    }

    #[must_use]
    pub fn with_config(config: QueryConfig) -> Self {
        Self {
            config,
            state: RwLock::new(LadderState::new()),
            desynchronized: AtomicBool::new(false),
        }
    }

    /// Applies one change-feed event.
    ///
    /// # Errors
    ///
    /// An [`InternalError`] if the event's precondition does not hold, if
    /// the ladder is already desynchronized (for anything but a full
    /// reload), or if a full reload lists an id twice. The error has been
    /// logged and the ladder latched by the time it is returned.
    pub fn apply(&self, event: &StoreEvent) -> Result<(), InternalError> {
        let mut state = self.state.write();
        debug!(event = event.kind(), "applying store event");

        let result = match event {
            StoreEvent::FullReload(players) => LadderState::rebuilt(players).map(|rebuilt| {
                *state = rebuilt;
                if self.desynchronized.swap(false, Ordering::SeqCst) {
                    info!("ladder resynchronized by full reload");
                }
                info!(players = state.index.size(), "ladder reloaded");
            }),
            _ if self.is_desynchronized() => Err(InternalError::Desynchronized),
            StoreEvent::Add(player) => state.add(*player),
            StoreEvent::Update(player) => state.update(*player),
            StoreEvent::Delete(id) => state.delete(*id),
        };
        result.map_err(|err| self.latch(err))
    }
}

impl<I: OrderedIndex> Leaderboard<I> {
    /// Number of players on the ladder.
    pub fn count(&self) -> usize {
        self.state.read().index.size()
    }

    /// Looks up one player's rank and tier.
    ///
    /// # Errors
    ///
    /// [`LadderError::NotFound`] if the player is not on the ladder,
    /// [`LadderError::Internal`] if the ladder is desynchronized.
    pub fn find(&self, id: PlayerId) -> Result<RankedEntry, LadderError> {
        let state = self.state.read();
        self.ensure_synchronized()?;
        let found = state.locate(id).map_err(|err| self.latch_query(err))?;
        state.entry(found).map_err(|err| self.latch(err).into())
    }

    /// Returns a window of the ladder in rank order.
    ///
    /// `Rank { offset, limit }` returns ranks `offset + 1 ..= offset + limit`.
    /// `AroundPlayer { player_id, range }` returns ranks
    /// `max(1, r - range) ..= r + range` around the player's rank `r`; the
    /// window is not re-centered when it is cut off at the top. Both are
    /// truncated at the bottom of the ladder.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Limit`] or [`ValidationError::Range`] when the
    /// parameter exceeds the configured maximum, [`LadderError::NotFound`]
    /// for an unknown `player_id`, [`LadderError::Internal`] if the ladder
    /// is desynchronized.
    pub fn get(&self, query: &LadderQuery) -> Result<Vec<RankedEntry>, LadderError> {
        let state = self.state.read();
        self.ensure_synchronized()?;

        let (from, to) = match *query {
            LadderQuery::Rank { offset, limit } => {
                if limit > self.config.max_limit {
                    return Err(ValidationError::Limit { max: self.config.max_limit }.into());
                }
                if limit == 0 {
                    return Ok(Vec::new());
                }
                (offset.saturating_add(1), offset.saturating_add(limit))
            }
            LadderQuery::AroundPlayer { player_id, range } => {
                let rank = state.locate(player_id).map_err(|err| self.latch_query(err))?.rank;
                if range > self.config.max_range {
                    return Err(ValidationError::Range { max: self.config.max_range }.into());
                }
                (rank.saturating_sub(range).max(1), rank.saturating_add(range))
            }
        };

        state.window(from, to).map_err(|err| self.latch(err).into())
    }

    /// Whether an internal error has been seen since the last full reload.
    pub fn is_desynchronized(&self) -> bool {
        self.desynchronized.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    fn ensure_synchronized(&self) -> Result<(), InternalError> {
        if self.is_desynchronized() {
            return Err(InternalError::Desynchronized);
        }
        Ok(())
    }

    fn latch(&self, err: InternalError) -> InternalError {
        error!(error = %err, "ladder invariant violated, waiting for a full reload");
        self.desynchronized.store(true, Ordering::SeqCst);
        err
    }

    fn latch_query(&self, err: LadderError) -> LadderError {
        match err {
            LadderError::Internal(internal) => LadderError::Internal(self.latch(internal)),
            other => other,
        }
    }
}

impl<I: OrderedIndex + Default> Default for Leaderboard<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: OrderedIndex + Default + Send + Sync> StoreSubscriber for Leaderboard<I> {
    fn on_event(&self, event: &StoreEvent) {
        // Failures are already logged and latched by `apply`; the store has
        // nothing to do about them.
        let _ = self.apply(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::LinearIndex;

    fn ladder_of(size: u64) -> Leaderboard {
        let ladder = Leaderboard::new();
        let players = (1..=size).map(|id| Player::new(id, 1_000_000 - id)).collect();
        ladder.apply(&StoreEvent::FullReload(players)).unwrap();
        ladder
    }

    /// Identity map and index hold the same records, and the index ranks
    /// them densely from 1.
    fn assert_consistent<I: OrderedIndex>(ladder: &Leaderboard<I>) {
        let state = ladder.state.read();
        assert_eq!(state.players.len(), state.index.size());
        for player in state.players.values() {
            let found = state.index.find(player);
            assert_eq!(found.map(|found| found.player), Some(*player), "player {} missing from index", player.id);
        }
        let all = state.index.get_by_rank(1, state.index.size());
        for (position, found) in all.iter().enumerate() {
            assert_eq!(found.rank, position + 1);
            assert_eq!(state.players.get(&found.player.id), Some(&found.player));
        }
    }

    #[test]
    fn map_and_index_agree_after_every_event() {
        let ladder: Leaderboard = Leaderboard::new();
        let mut present = std::collections::HashSet::new();
        // Simple LCG for a deterministic event mix over a small id space.
        let mut x: u64 = 12345;
        for _ in 0..3_000 {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            let id = (x >> 33) % 200;
            let mmr = (x >> 13) % 50;
            let event = match (present.contains(&id), x % 3) {
                (false, _) => StoreEvent::Add(Player::new(id, mmr)),
                (true, 0) => StoreEvent::Delete(id),
                (true, _) => StoreEvent::Update(Player::new(id, mmr)),
            };
            match event {
                StoreEvent::Delete(_) => present.remove(&id),
                _ => present.insert(id),
            };
            ladder.apply(&event).unwrap();
            assert_consistent(&ladder);
        }
        assert_eq!(ladder.count(), present.len());
    }

    #[test]
    fn update_onto_stray_record_leaves_state_alone() {
        let ladder = ladder_of(5);
        // A copy of the new record already sits in the index.
        ladder.state.write().index.insert(Player::new(2, 7));
        assert_eq!(
            ladder.apply(&StoreEvent::Update(Player::new(2, 7))),
            Err(InternalError::DuplicateAdd { id: 2 })
        );
        let state = ladder.state.read();
        assert_eq!(state.players.get(&2), Some(&Player::new(2, 999_998)));
        assert!(state.index.find(&Player::new(2, 999_998)).is_some());
        assert_eq!(state.index.size(), 6);
    }

    #[test]
    fn update_to_same_rating_is_accepted() {
        let ladder = ladder_of(5);
        ladder.apply(&StoreEvent::Update(Player::new(4, 999_996))).unwrap();
        assert_eq!(ladder.find(4).map(|entry| entry.rank), Ok(4));
        assert_consistent(&ladder);
    }

    #[test]
    fn reload_presizes_the_index() {
        let ladder = ladder_of(1_000);
        assert!(ladder.state.read().index.capacity() >= 1_000);
        assert_consistent(&ladder);
    }

    #[test]
    fn rejected_add_leaves_state_alone() {
        let ladder = ladder_of(5);
        assert_eq!(ladder.apply(&StoreEvent::Add(Player::new(3, 1))), Err(InternalError::DuplicateAdd { id: 3 }));
        assert!(ladder.is_desynchronized());
        let state = ladder.state.read();
        assert_eq!(state.players.len(), 5);
        assert_eq!(state.index.size(), 5);
        assert_eq!(state.players.get(&3), Some(&Player::new(3, 999_997)));
    }

    #[test]
    fn desync_blocks_queries_until_reload() {
        let ladder = ladder_of(5);
        let _ = ladder.apply(&StoreEvent::Delete(42));
        assert_eq!(ladder.find(1), Err(LadderError::Internal(InternalError::Desynchronized)));
        assert_eq!(
            ladder.apply(&StoreEvent::Add(Player::new(6, 1))),
            Err(InternalError::Desynchronized)
        );

        ladder.apply(&StoreEvent::FullReload(vec![Player::new(9, 9)])).unwrap();
        assert!(!ladder.is_desynchronized());
        assert_eq!(ladder.find(9).map(|entry| entry.rank), Ok(1));
    }

    #[test]
    fn index_drift_is_an_internal_error() {
        let ladder = ladder_of(5);
        // Knock the index out of step with the identity map.
        ladder.state.write().index.delete(&Player::new(2, 999_998));
        assert_eq!(ladder.find(2), Err(LadderError::Internal(InternalError::MissingFromIndex { id: 2 })));
        assert!(ladder.is_desynchronized());
    }

    #[test]
    fn duplicate_in_reload_keeps_previous_state() {
        let ladder = ladder_of(3);
        let result = ladder.apply(&StoreEvent::FullReload(vec![Player::new(1, 1), Player::new(1, 2)]));
        assert_eq!(result, Err(InternalError::DuplicateInReload { id: 1 }));
        assert_eq!(ladder.count(), 3);
    }

    #[test]
    fn runs_on_linear_index() {
        let ladder: Leaderboard<LinearIndex> = Leaderboard::new();
        ladder
            .apply(&StoreEvent::FullReload(vec![Player::new(1, 10), Player::new(2, 20)]))
            .unwrap();
        ladder.apply(&StoreEvent::Update(Player::new(1, 30))).unwrap();
        assert_eq!(ladder.find(1).map(|entry| entry.rank), Ok(1));
        assert_eq!(ladder.find(2).map(|entry| entry.rank), Ok(2));
    }

    #[test]
    fn custom_bounds_apply() {
        let ladder: Leaderboard = Leaderboard::with_config(QueryConfig {
            max_limit: 3,
            ..QueryConfig::default()
        });
        assert_eq!(ladder.config().max_limit, 3);
        assert_eq!(
            ladder.get(&LadderQuery::Rank { offset: 0, limit: 4 }),
            Err(LadderError::Validation(ValidationError::Limit { max: 3 }))
        );
    }
}

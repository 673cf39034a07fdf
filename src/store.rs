//! In-memory record store and its change feed.
//!
//! The store is the single source of truth for player records. It validates
//! and applies every mutation, then delivers a [`StoreEvent`] to each
//! subscriber, synchronously and in commit order.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::player::{Player, PlayerId};

/// One entry of the change feed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreEvent {
    /// Replaces everything a subscriber knows. Sent once on subscription.
    FullReload(Vec<Player>),
    Add(Player),
    Update(Player),
    Delete(PlayerId),
}

impl StoreEvent {
    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            StoreEvent::FullReload(_) => "full_reload",
            StoreEvent::Add(_) => "add",
            StoreEvent::Update(_) => "update",
            StoreEvent::Delete(_) => "delete",
        }
    }
}

/// Receives the change feed.
///
/// Events arrive while the store holds its lock, so a subscriber must not
/// call back into the store from `on_event`.
pub trait StoreSubscriber: Send + Sync {
    fn on_event(&self, event: &StoreEvent);
}

/// Handle returned by [`MemoryStore::subscribe`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct StoreInner {
    players: HashMap<PlayerId, Player>,
    subscribers: Vec<(SubscriptionId, Arc<dyn StoreSubscriber>)>,
    next_subscription: u64,
}

impl StoreInner {
    fn broadcast(&self, event: &StoreEvent) {
        debug!(event = event.kind(), subscribers = self.subscribers.len(), "broadcasting store event");
        for (_, subscriber) in &self.subscribers {
            subscriber.on_event(event);
        }
    }

    fn snapshot(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.players.values().copied().collect();
        players.sort_unstable_by_key(|player| player.id);
        players
    }
}

/// Player records kept in memory.
///
/// Records, subscribers and event delivery share one lock, so a mutation and
/// its broadcast are a single step, and a new subscriber's snapshot can
/// neither miss nor repeat a concurrent mutation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `id,mmr` lines. Blank lines are skipped; a repeated id keeps the
    /// last value.
    ///
    /// # Errors
    ///
    /// [`StoreError::Parse`] for a malformed line, [`StoreError::Io`] if the
    /// reader fails.
    pub fn load<R: BufRead>(reader: R) -> Result<Self, StoreError> {
        let mut players = HashMap::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let player = parse_record(trimmed).ok_or_else(|| StoreError::Parse {
                line: number + 1,
                content: trimmed.to_owned(),
            })?;
            if players.insert(player.id, player).is_some() {
                warn!(id = player.id, line = number + 1, "duplicate player id in initial data, keeping the later record");
            }
        }

        info!(players = players.len(), "loaded initial player records");
        Ok(Self {
            inner: Mutex::new(StoreInner {
                players,
                ..StoreInner::default()
            }),
        })
    }

    /// Opens and [`load`](Self::load)s the file at `path`.
    ///
    /// # Errors
    ///
    /// As for [`load`](Self::load), plus [`StoreError::Io`] if the file cannot
    /// be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening player records");
        Self::load(BufReader::new(File::open(path)?))
    }

    /// Builds a store from configuration: empty unless `initial_data` is set.
    ///
    /// # Errors
    ///
    /// As for [`open`](Self::open).
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        match &config.initial_data {
            Some(path) => Self::open(path),
            None => Ok(Self::new()),
        }
    }

    /// Registers `subscriber` and immediately delivers a
    /// [`StoreEvent::FullReload`] of the current records. Every later
    /// mutation is delivered after it.
    pub fn subscribe(&self, subscriber: Arc<dyn StoreSubscriber>) -> SubscriptionId {
        let mut inner = self.inner.lock();
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;

        let snapshot = StoreEvent::FullReload(inner.snapshot());
        subscriber.on_event(&snapshot);
        inner.subscribers.push((id, subscriber));

        info!(subscription = id.0, players = inner.players.len(), "subscriber registered");
        id
    }

    /// Stops delivery to the subscriber. Returns `false` if it was not
    /// registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(subscription, _)| *subscription != id);
        let removed = inner.subscribers.len() != before;
        if removed {
            info!(subscription = id.0, "subscriber removed");
        }
        removed
    }

    /// Adds a new player and broadcasts [`StoreEvent::Add`].
    ///
    /// # Errors
    ///
    /// [`StoreError::AlreadyExists`] if the id is taken.
    pub fn create(&self, player: Player) -> Result<Player, StoreError> {
        let mut inner = self.inner.lock();
        if inner.players.contains_key(&player.id) {
            warn!(id = player.id, "rejected create of existing player");
            return Err(StoreError::AlreadyExists(player.id));
        }
        inner.players.insert(player.id, player);
        inner.broadcast(&StoreEvent::Add(player));
        Ok(player)
    }

    /// Replaces an existing player's record and broadcasts
    /// [`StoreEvent::Update`].
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if there is no such player.
    pub fn update(&self, player: Player) -> Result<Player, StoreError> {
        let mut inner = self.inner.lock();
        match inner.players.get_mut(&player.id) {
            Some(record) => *record = player,
            None => {
                warn!(id = player.id, "rejected update of missing player");
                return Err(StoreError::NotFound(player.id));
            }
        }
        inner.broadcast(&StoreEvent::Update(player));
        Ok(player)
    }

    /// Removes a player and broadcasts [`StoreEvent::Delete`]. Returns the
    /// removed record.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if there is no such player.
    pub fn delete(&self, id: PlayerId) -> Result<Player, StoreError> {
        let mut inner = self.inner.lock();
        let Some(player) = inner.players.remove(&id) else {
            warn!(id, "rejected delete of missing player");
            return Err(StoreError::NotFound(id));
        };
        inner.broadcast(&StoreEvent::Delete(id));
        Ok(player)
    }

    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<Player> {
        self.inner.lock().players.get(&id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: PlayerId) -> bool {
        self.inner.lock().players.contains_key(&id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.lock().players.len()
    }
}

fn parse_record(line: &str) -> Option<Player> {
    let (id, mmr) = line.split_once(',')?;
    Some(Player::new(id.trim().parse().ok()?, mmr.trim().parse().ok()?))
}

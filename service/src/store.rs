use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use sweeper_core::{Board, GameId, GameSession, MineLayout, OwnerId};

use crate::{Result, ServiceError};

/// Owner-scoped persistence for game sessions.
///
/// A game that belongs to another owner behaves exactly like a missing one.
pub trait GameStore: Send + Sync {
    fn create(
        &self,
        owner: OwnerId,
        layout: MineLayout,
        board: Board,
        now: DateTime<Utc>,
    ) -> Result<GameSession>;

    fn load(&self, owner: OwnerId, id: GameId) -> Result<GameSession>;

    /// Runs `f` on the stored session while holding that session's exclusive lock.
    /// The new snapshot is persisted only when `f` succeeds.
    fn update<T, F>(&self, owner: OwnerId, id: GameId, f: F) -> Result<T>
    where
        F: FnOnce(&mut GameSession) -> Result<T>;

    /// All sessions of `owner`, oldest first.
    fn list(&self, owner: OwnerId) -> Result<Vec<GameSession>>;
}

fn poisoned<T>(_: T) -> ServiceError {
    log::error!("Game store lock poisoned");
    ServiceError::Storage("lock poisoned".to_string())
}

/// In-process store. Each session sits behind its own mutex, so moves on different games
/// never wait on each other while moves on one game are applied one at a time.
#[derive(Debug)]
pub struct MemoryStore {
    games: RwLock<HashMap<GameId, Arc<Mutex<GameSession>>>>,
    next_id: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            games: RwLock::default(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: GameId) -> Result<Option<Arc<Mutex<GameSession>>>> {
        let games = self.games.read().map_err(poisoned)?;
        Ok(games.get(&id).cloned())
    }
}

impl GameStore for MemoryStore {
    fn create(
        &self,
        owner: OwnerId,
        layout: MineLayout,
        board: Board,
        now: DateTime<Utc>,
    ) -> Result<GameSession> {
        let id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let session = GameSession::open(id, owner, layout, board, now)?;
        self.games
            .write()
            .map_err(poisoned)?
            .insert(id, Arc::new(Mutex::new(session.clone())));
        Ok(session)
    }

    fn load(&self, owner: OwnerId, id: GameId) -> Result<GameSession> {
        let entry = self.entry(id)?.ok_or(ServiceError::NotFound(id))?;
        let session = entry.lock().map_err(poisoned)?;
        if session.owner() != owner {
            return Err(ServiceError::NotFound(id));
        }
        Ok(session.clone())
    }

    fn update<T, F>(&self, owner: OwnerId, id: GameId, f: F) -> Result<T>
    where
        F: FnOnce(&mut GameSession) -> Result<T>,
    {
        let entry = self.entry(id)?.ok_or(ServiceError::NotFound(id))?;
        let mut stored = entry.lock().map_err(poisoned)?;
        if stored.owner() != owner {
            return Err(ServiceError::NotFound(id));
        }

        let mut working = stored.clone();
        let value = f(&mut working)?;
        *stored = working;
        Ok(value)
    }

    fn list(&self, owner: OwnerId) -> Result<Vec<GameSession>> {
        let entries: Vec<_> = self.games.read().map_err(poisoned)?.values().cloned().collect();
        let mut sessions = Vec::new();
        for entry in entries {
            let session = entry.lock().map_err(poisoned)?;
            if session.owner() == owner {
                sessions.push(session.clone());
            }
        }
        sessions.sort_by_key(|session| session.id());
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeper_core::GameError;

    fn store_with_game(owner: OwnerId) -> (MemoryStore, GameId) {
        let store = MemoryStore::new();
        let layout = MineLayout::from_mine_coords((3, 3), &[(1, 1)]).unwrap();
        let session = store
            .create(owner, layout, Board::hidden((3, 3)), Utc::now())
            .unwrap();
        (store, session.id())
    }

    #[test]
    fn ids_are_unique() {
        let (store, first) = store_with_game(OwnerId(1));
        let layout = MineLayout::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        let second = store
            .create(OwnerId(1), layout, Board::hidden((2, 2)), Utc::now())
            .unwrap()
            .id();

        assert_ne!(first, second);
        assert_eq!(store.list(OwnerId(1)).unwrap().len(), 2);
    }

    #[test]
    fn other_owners_cannot_see_game() {
        let (store, id) = store_with_game(OwnerId(1));

        assert_eq!(store.load(OwnerId(2), id), Err(ServiceError::NotFound(id)));
        assert_eq!(
            store.update(OwnerId(2), id, |_| Ok(())),
            Err(ServiceError::NotFound(id))
        );
        assert!(store.list(OwnerId(2)).unwrap().is_empty());
    }

    #[test]
    fn failed_update_is_not_persisted() {
        let (store, id) = store_with_game(OwnerId(1));

        let result = store.update(OwnerId(1), id, |session| {
            session.make_move((0, 0), Utc::now())?;
            Err::<(), _>(ServiceError::from(GameError::OutOfBounds))
        });

        assert_eq!(result, Err(ServiceError::Game(GameError::OutOfBounds)));
        let session = store.load(OwnerId(1), id).unwrap();
        assert_eq!(session.move_count(), 0);
        assert_eq!(session.board().hidden_count(), 9);
    }

    #[test]
    fn concurrent_moves_are_serialized() {
        let store = Arc::new(MemoryStore::new());
        let layout = MineLayout::from_mine_coords((10, 10), &[(9, 9)]).unwrap();
        let id = store
            .create(OwnerId(1), layout, Board::hidden((10, 10)), Utc::now())
            .unwrap()
            .id();

        // every thread targets a distinct cell on the mine's boundary
        let targets = [(8, 8), (9, 8), (8, 9)];
        let handles: Vec<_> = targets
            .into_iter()
            .map(|target| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.update(OwnerId(1), id, |session| {
                        session.make_move(target, Utc::now()).map_err(Into::into)
                    })
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }

        let session = store.load(OwnerId(1), id).unwrap();
        assert_eq!(session.move_count(), 3);
        for target in targets {
            assert!(!session.board()[target].is_hidden());
        }
    }
}

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Mutex;
use sweeper_core::{
    Coord, Coord2, GameConfig, GameError, GameId, GameSession, OwnerId, ShuffleGenerator,
    generate,
};
use sweeper_protocol::{
    GameView, MakeMoveRequest, MakeMoveResponse, NewGameRequest, NewGameResponse, PlayerStats,
    UnfinishedGame, render_board,
};

use crate::*;

/// Handles the game endpoints for an already authenticated owner.
pub struct GameService<S, R> {
    store: S,
    seeds: Mutex<R>,
    clock: fn() -> DateTime<Utc>,
}

impl<S: GameStore, R: SeedSource> GameService<S, R> {
    pub fn new(store: S, seeds: R) -> Self {
        Self {
            store,
            seeds: Mutex::new(seeds),
            clock: Utc::now,
        }
    }

    /// Replaces the wall clock, mostly useful to pin timestamps.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn next_seed(&self) -> Result<u64> {
        let mut seeds = self
            .seeds
            .lock()
            .map_err(|_| ServiceError::Storage("seed source lock poisoned".to_string()))?;
        seeds.next_seed()
    }

    pub fn new_game(&self, owner: OwnerId, request: &NewGameRequest) -> Result<NewGameResponse> {
        let config = GameConfig::new(request.width, request.height, request.bomb_count)
            .inspect_err(|err| {
                log::warn!("Rejected new game {:?} for owner {}: {}", request, owner, err)
            })?;
        let seed = self.next_seed()?;
        let (layout, board) = generate(ShuffleGenerator::new(seed), config);

        let session = self.store.create(owner, layout, board, (self.clock)())?;
        log::info!(
            "Created game {} ({}x{}, {} mines) for owner {}",
            session.id(),
            config.width(),
            config.height(),
            config.mines,
            owner
        );
        Ok(NewGameResponse {
            id: session.id().0,
            board: render_board(session.board()),
        })
    }

    pub fn make_move(
        &self,
        owner: OwnerId,
        request: &MakeMoveRequest,
    ) -> Result<MakeMoveResponse> {
        let id = GameId(request.game_id);
        let now = (self.clock)();
        let result = self.store.update(owner, id, |session| {
            let target = to_coords(session, request.x, request.y)?;
            let outcome = session.make_move(target, now)?;
            Ok(MakeMoveResponse {
                board: render_board(session.board()),
                result: outcome.won(),
            })
        });

        if let Err(err) = &result {
            log::warn!("Rejected move {:?} for owner {}: {}", request, owner, err);
        }
        result
    }

    pub fn game(&self, owner: OwnerId, id: GameId) -> Result<GameView> {
        let session = self.store.load(owner, id)?;
        let config = session.layout().game_config();
        Ok(GameView {
            id: session.id().0,
            width: config.width(),
            height: config.height(),
            bomb_count: config.mines,
            board: render_board(session.board()),
            moves_count: session.move_count(),
            start_time: timestamp(session.start_time()),
            end_time: session.end_time().map(timestamp),
            result: session.won(),
        })
    }

    pub fn unfinished_games(&self, owner: OwnerId) -> Result<Vec<UnfinishedGame>> {
        Ok(self
            .store
            .list(owner)?
            .iter()
            .filter(|session| !session.is_finished())
            .map(|session| UnfinishedGame {
                id: session.id().0,
                board: render_board(session.board()),
                moves_count: session.move_count(),
                created_at: timestamp(session.created_at()),
                updated_at: timestamp(session.updated_at()),
            })
            .collect())
    }

    /// Totals over finished games only.
    pub fn stats(&self, owner: OwnerId) -> Result<PlayerStats> {
        let finished: Vec<_> = self
            .store
            .list(owner)?
            .into_iter()
            .filter(GameSession::is_finished)
            .collect();
        let games_won = finished.iter().filter(|s| s.won() == Some(true)).count() as u32;
        let games_played = finished.len() as u32;
        let total_moves: u64 = finished.iter().map(|s| u64::from(s.move_count())).sum();
        let average_moves = if games_played == 0 {
            0.0
        } else {
            total_moves as f64 / f64::from(games_played)
        };

        Ok(PlayerStats {
            games_played,
            games_won,
            games_lost: games_played - games_won,
            average_moves,
        })
    }
}

/// Request coordinates are signed; anything that does not fit the board is out of bounds.
fn to_coords(session: &GameSession, x: i32, y: i32) -> Result<Coord2> {
    if session.is_finished() {
        return Err(GameError::GameAlreadyEnded.into());
    }
    match (Coord::try_from(x), Coord::try_from(y)) {
        (Ok(x), Ok(y)) => Ok((x, y)),
        _ => Err(GameError::OutOfBounds.into()),
    }
}

fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

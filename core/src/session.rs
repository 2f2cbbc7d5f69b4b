use chrono::{DateTime, Utc};
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

/// Opaque owner reference, resolved by whatever authenticates requests.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored shape of a session. Converting back into a [`GameSession`] validates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: GameId,
    pub owner: OwnerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub move_count: u32,
    pub layout: MineLayout,
    pub board: Board,
    pub won: Option<bool>,
}

/// One game from creation to its final move.
///
/// Valid transitions:
/// - in progress -> in progress (safe reveal)
/// - in progress -> won
/// - in progress -> lost
///
/// Once `won` is set the session is frozen and every further move fails with
/// [`GameError::GameAlreadyEnded`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord", into = "SessionRecord")]
pub struct GameSession {
    id: GameId,
    owner: OwnerId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    move_count: u32,
    layout: MineLayout,
    board: Board,
    won: Option<bool>,
}

impl GameSession {
    /// Opens a fresh session over a generated layout and its blank board.
    pub fn open(
        id: GameId,
        owner: OwnerId,
        layout: MineLayout,
        board: Board,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        check_board(&layout, &board, None)?;
        log::debug!("Opened game {} for owner {}", id, owner);
        Ok(Self {
            id,
            owner,
            created_at: now,
            updated_at: now,
            start_time: now,
            end_time: None,
            move_count: 0,
            layout,
            board,
            won: None,
        })
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn layout(&self) -> &MineLayout {
        &self.layout
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// `Some(true)` for a win, `Some(false)` for a loss, `None` while in progress.
    pub fn won(&self) -> Option<bool> {
        self.won
    }

    pub fn is_finished(&self) -> bool {
        self.won.is_some()
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.is_finished() {
            Err(GameError::GameAlreadyEnded)
        } else {
            Ok(())
        }
    }

    /// Applies one reveal. On error the session is left untouched and the move is not
    /// counted.
    pub fn make_move(&mut self, target: Coord2, now: DateTime<Utc>) -> Result<RevealOutcome> {
        self.check_not_finished()?;
        let Reveal { board, outcome } =
            RevealEngine::new(&self.layout).reveal(&self.board, target)?;

        self.board = board;
        self.move_count += 1;
        self.updated_at = now;
        if let Some(won) = outcome.won() {
            self.end_time = Some(now);
            self.won = Some(won);
            log::debug!(
                "Game {} ended after {} moves, won: {}",
                self.id,
                self.move_count,
                won
            );
        }
        Ok(outcome)
    }
}

impl TryFrom<SessionRecord> for GameSession {
    type Error = GameError;

    fn try_from(record: SessionRecord) -> Result<Self> {
        if record.end_time.is_some() != record.won.is_some() {
            return Err(GameError::InconsistentOutcome);
        }
        check_board(&record.layout, &record.board, record.won)?;
        Ok(Self {
            id: record.id,
            owner: record.owner,
            created_at: record.created_at,
            updated_at: record.updated_at,
            start_time: record.start_time,
            end_time: record.end_time,
            move_count: record.move_count,
            layout: record.layout,
            board: record.board,
            won: record.won,
        })
    }
}

/// Checks that `board` is reachable on `layout` for the given outcome.
///
/// Every revealed count must match the layout. Mine markers only appear after a loss,
/// and a loss uncovers every mine with exactly one of them triggered. A win requires every
/// safe cell to be uncovered.
fn check_board(layout: &MineLayout, board: &Board, won: Option<bool>) -> Result<()> {
    let size = checked_size(layout.values())?;
    if board.size() != size {
        return Err(GameError::InvalidBoardShape);
    }

    let lost = won == Some(false);
    let mut triggered = 0;
    for (coords, cell) in board.iter() {
        let consistent = match cell {
            Cell::Revealed(count) => layout.adjacent_mine_count(coords) == Some(count),
            cell if cell.is_mine() => lost && layout.contains_mine(coords),
            _ => !(lost && layout.contains_mine(coords)),
        };
        if !consistent {
            log::debug!("Cell {:?} at {:?} does not match the layout", cell, coords);
            return Err(GameError::InconsistentBoard);
        }
        if cell == Cell::TriggeredMine {
            triggered += 1;
        }
    }

    if triggered != usize::from(lost) {
        return Err(GameError::InconsistentBoard);
    }
    if won == Some(true) && !RevealEngine::new(layout).is_cleared(board) {
        return Err(GameError::InconsistentBoard);
    }
    Ok(())
}

impl From<GameSession> for SessionRecord {
    fn from(session: GameSession) -> Self {
        Self {
            id: session.id,
            owner: session.owner,
            created_at: session.created_at,
            updated_at: session.updated_at,
            start_time: session.start_time,
            end_time: session.end_time,
            move_count: session.move_count,
            layout: session.layout,
            board: session.board,
            won: session.won,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ndarray::Array2;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn session(size: Coord2, mines: &[Coord2]) -> GameSession {
        let layout = MineLayout::from_mine_coords(size, mines).unwrap();
        GameSession::open(GameId(1), OwnerId(7), layout, Board::hidden(size), at(0)).unwrap()
    }

    #[test]
    fn open_session_is_blank() {
        let game = session((4, 3), &[(0, 0)]);

        assert_eq!(game.move_count(), 0);
        assert_eq!(game.end_time(), None);
        assert_eq!(game.won(), None);
        assert!(!game.is_finished());
        assert_eq!(game.board().hidden_count(), 12);
    }

    #[test]
    fn open_rejects_mismatched_board() {
        let layout = MineLayout::from_mine_coords((4, 3), &[(0, 0)]).unwrap();

        assert_eq!(
            GameSession::open(GameId(1), OwnerId(1), layout, Board::hidden((3, 4)), at(0)),
            Err(GameError::InvalidBoardShape)
        );
    }

    #[test]
    fn accepted_moves_are_counted() {
        let mut game = session((3, 3), &[(1, 1)]);

        assert_eq!(game.make_move((0, 0), at(5)), Ok(RevealOutcome::InProgress));
        assert_eq!(game.make_move((2, 0), at(9)), Ok(RevealOutcome::InProgress));

        assert_eq!(game.move_count(), 2);
        assert_eq!(game.updated_at(), at(9));
        assert_eq!(game.end_time(), None);
    }

    #[test]
    fn rejected_moves_are_not_counted() {
        let mut game = session((3, 3), &[(1, 1)]);
        game.make_move((0, 0), at(1)).unwrap();
        let before = game.clone();

        assert_eq!(game.make_move((0, 0), at(2)), Err(GameError::AlreadyRevealed));
        assert_eq!(game.make_move((3, 0), at(2)), Err(GameError::OutOfBounds));
        assert_eq!(game, before);
    }

    #[test]
    fn loss_freezes_session() {
        let mut game = session((3, 3), &[(1, 1)]);

        assert_eq!(game.make_move((1, 1), at(3)), Ok(RevealOutcome::Lost));
        assert_eq!(game.won(), Some(false));
        assert_eq!(game.end_time(), Some(at(3)));
        assert_eq!(game.move_count(), 1);

        assert_eq!(game.make_move((0, 0), at(4)), Err(GameError::GameAlreadyEnded));
        assert_eq!(game.move_count(), 1);
        assert_eq!(game.board()[(0, 0)], Cell::Hidden);
    }

    #[test]
    fn win_sets_end_time() {
        let mut game = session((2, 1), &[(0, 0)]);

        assert_eq!(game.make_move((1, 0), at(8)), Ok(RevealOutcome::Won));
        assert_eq!(game.won(), Some(true));
        assert_eq!(game.end_time(), Some(at(8)));
    }

    fn board(rows: usize, cols: usize, cells: &[Cell]) -> Board {
        Board::from_cells(Array2::from_shape_vec((rows, cols), cells.to_vec()).unwrap()).unwrap()
    }

    fn lost_record() -> SessionRecord {
        let mut game = session((3, 1), &[(0, 0), (2, 0)]);
        game.make_move((2, 0), at(1)).unwrap();
        SessionRecord::from(game)
    }

    #[test]
    fn open_rejects_out_of_range_size() {
        let layout = MineLayout::from_mine_coords((101, 1), &[(0, 0)]).unwrap();

        assert_eq!(
            GameSession::open(GameId(1), OwnerId(1), layout, Board::hidden((101, 1)), at(0)),
            Err(GameError::InvalidBoardShape)
        );
    }

    #[test]
    fn record_with_count_on_mine_is_rejected() {
        let mut record = SessionRecord::from(session((2, 1), &[(0, 0)]));
        record.board = board(1, 2, &[Cell::Revealed(7), Cell::Hidden]);

        assert_eq!(GameSession::try_from(record), Err(GameError::InconsistentBoard));
    }

    #[test]
    fn record_with_wrong_count_is_rejected() {
        let mut record = SessionRecord::from(session((2, 1), &[(0, 0)]));
        record.board = board(1, 2, &[Cell::Hidden, Cell::Revealed(0)]);

        assert_eq!(GameSession::try_from(record), Err(GameError::InconsistentBoard));
    }

    #[test]
    fn record_with_mines_shown_while_in_progress_is_rejected() {
        let mut record = SessionRecord::from(session((2, 1), &[(0, 0)]));
        record.board = board(1, 2, &[Cell::Mine, Cell::Hidden]);

        assert_eq!(GameSession::try_from(record), Err(GameError::InconsistentBoard));
    }

    #[test]
    fn lost_record_round_trips() {
        let record = lost_record();
        assert_eq!(
            record.board,
            board(1, 3, &[Cell::Mine, Cell::Hidden, Cell::TriggeredMine])
        );

        let game = GameSession::try_from(record).unwrap();
        assert_eq!(game.won(), Some(false));
    }

    #[test]
    fn lost_record_needs_exactly_one_triggered_mine() {
        let mut none = lost_record();
        none.board = board(1, 3, &[Cell::Mine, Cell::Hidden, Cell::Mine]);
        assert_eq!(GameSession::try_from(none), Err(GameError::InconsistentBoard));

        let mut two = lost_record();
        two.board = board(1, 3, &[Cell::TriggeredMine, Cell::Hidden, Cell::TriggeredMine]);
        assert_eq!(GameSession::try_from(two), Err(GameError::InconsistentBoard));
    }

    #[test]
    fn lost_record_marks_only_mines() {
        let mut record = lost_record();
        record.board = board(1, 3, &[Cell::Mine, Cell::Mine, Cell::TriggeredMine]);
        assert_eq!(GameSession::try_from(record), Err(GameError::InconsistentBoard));

        let mut hidden_mine = lost_record();
        hidden_mine.board = board(1, 3, &[Cell::Hidden, Cell::Hidden, Cell::TriggeredMine]);
        assert_eq!(
            GameSession::try_from(hidden_mine),
            Err(GameError::InconsistentBoard)
        );
    }

    #[test]
    fn won_record_needs_cleared_board() {
        let mut record = SessionRecord::from(session((2, 1), &[(0, 0)]));
        record.end_time = Some(at(3));
        record.won = Some(true);
        assert_eq!(
            GameSession::try_from(record.clone()),
            Err(GameError::InconsistentBoard)
        );

        record.board = board(1, 2, &[Cell::Hidden, Cell::Revealed(1)]);
        assert!(GameSession::try_from(record).is_ok());
    }

    #[test]
    fn tampered_json_is_rejected() {
        let mut game = session((2, 1), &[(0, 0)]);
        game.make_move((1, 0), at(1)).unwrap();
        let json = serde_json::to_string(&game).unwrap();
        assert!(serde_json::from_str::<GameSession>(&json).is_ok());

        let tampered = json.replace("{\"Revealed\":1}", "{\"Revealed\":3}");
        assert_ne!(tampered, json);
        assert!(serde_json::from_str::<GameSession>(&tampered).is_err());
    }

    #[test]
    fn record_round_trip_validates() {
        let mut game = session((3, 3), &[(1, 1)]);
        game.make_move((2, 2), at(1)).unwrap();

        let json = serde_json::to_string(&game).unwrap();
        let loaded: GameSession = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, game);

        let mut record = SessionRecord::from(game);
        record.end_time = Some(at(2));
        assert_eq!(GameSession::try_from(record), Err(GameError::InconsistentOutcome));
    }
}

use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{IllegalMoveError, InvalidCellError};

use super::player::Player;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// The eight winning lines: three rows, three columns and two diagonals.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Status of a board, derived purely from its cells.
///
/// Exactly one variant holds for any board. A board on which both players
/// complete a line is not reachable through legal play; for such boards the
/// first completed line in [`WINNING_LINES`] order decides the winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum BoardStatus {
    Ongoing,
    Won(Player),
    Draw,
}

impl BoardStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_ongoing()
    }
}

/// A 3×3 tic-tac-toe board.
///
/// The board is mutated only through [`Board::apply_move`], which validates
/// the target cell. Its status is recomputed from the cells on every call to
/// [`Board::status`] and never cached.
///
/// Serialized as an array of nine signs (`1` for X, `-1` for O, `0` for empty).
///
/// # Example
///
/// ```
/// use noughts_engine::{Board, BoardStatus, Player};
///
/// let board = Board::try_from([1, -1, 1, 1, -1, -1, -1, 1, 1]).unwrap();
/// assert_eq!(board.status(), BoardStatus::Draw);
///
/// let board = Board::try_from([1, 1, 1, -1, -1, 0, 0, 0, 0]).unwrap();
/// assert_eq!(board.status(), BoardStatus::Won(Player::X));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "[i8; 9]", into = "[i8; 9]")]
pub struct Board {
    cells: [Option<Player>; CELL_COUNT],
}

impl Board {
    pub const EMPTY: Self = Self {
        cells: [None; CELL_COUNT],
    };

    #[must_use]
    pub fn cells(&self) -> &[Option<Player>; CELL_COUNT] {
        &self.cells
    }

    /// Returns the occupant of the cell at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= CELL_COUNT`.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<Player> {
        self.cells[index]
    }

    #[must_use]
    pub fn is_legal_move(&self, index: usize) -> bool {
        self.cells.get(index).is_some_and(Option::is_none)
    }

    /// Returns the indices of all empty cells in ascending order.
    #[must_use]
    pub fn legal_moves(&self) -> ArrayVec<usize, CELL_COUNT> {
        (0..CELL_COUNT).filter(|&i| self.cells[i].is_none()).collect()
    }

    /// Places `player`'s mark on the cell at `index`.
    ///
    /// The board is modified only if `index` is in range and the cell is empty;
    /// on error the board is left unchanged. Terminal boards are not rejected
    /// here; [`Game::play`](crate::Game::play) enforces turn order and game end.
    pub fn apply_move(&mut self, player: Player, index: usize) -> Result<(), IllegalMoveError> {
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(IllegalMoveError::OutOfRange { index })?;
        if cell.is_some() {
            return Err(IllegalMoveError::Occupied { index });
        }
        *cell = Some(player);
        Ok(())
    }

    /// Returns a copy of this board with `player`'s mark on `index`.
    ///
    /// # Panics
    ///
    /// Panics if the move is illegal.
    #[must_use]
    pub fn with_move(mut self, player: Player, index: usize) -> Self {
        self.apply_move(player, index)
            .expect("move must be legal on this board");
        self
    }

    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        WINNING_LINES.iter().find_map(|&[a, b, c]| {
            let p = self.cells[a]?;
            (self.cells[b] == Some(p) && self.cells[c] == Some(p)).then_some(p)
        })
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn status(&self) -> BoardStatus {
        if let Some(player) = self.winner() {
            BoardStatus::Won(player)
        } else if self.is_full() {
            BoardStatus::Draw
        } else {
            BoardStatus::Ongoing
        }
    }

    /// Returns the cells encoded as signs (`1` for X, `-1` for O, `0` for empty).
    #[must_use]
    pub fn signs(&self) -> [i8; CELL_COUNT] {
        self.cells.map(|c| c.map_or(0, Player::sign))
    }
}

impl TryFrom<[i8; CELL_COUNT]> for Board {
    type Error = InvalidCellError;

    fn try_from(signs: [i8; CELL_COUNT]) -> Result<Self, Self::Error> {
        let mut cells = [None; CELL_COUNT];
        for (cell, value) in cells.iter_mut().zip(signs) {
            *cell = match value {
                0 => None,
                _ => Some(Player::from_sign(value).ok_or(InvalidCellError { value })?),
            };
        }
        Ok(Self { cells })
    }
}

impl From<Board> for [i8; CELL_COUNT] {
    fn from(board: Board) -> Self {
        board.signs()
    }
}

/// Compact single-line rendering, rows separated by `/` (e.g. `X.O/.X./..O`).
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 && i % 3 == 0 {
                f.write_str("/")?;
            }
            match cell {
                Some(player) => write!(f, "{player}")?,
                None => f.write_str(".")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(signs: [i8; CELL_COUNT]) -> Board {
        Board::try_from(signs).unwrap()
    }

    /// Enumerates every board reachable from the empty board through legal
    /// alternating play that stops at terminal states.
    fn reachable_boards() -> Vec<Board> {
        fn walk(board: Board, to_move: Player, out: &mut Vec<Board>) {
            out.push(board);
            if board.status().is_terminal() {
                return;
            }
            for index in board.legal_moves() {
                walk(board.with_move(to_move, index), to_move.opponent(), out);
            }
        }
        let mut out = Vec::new();
        walk(Board::EMPTY, Player::X, &mut out);
        out
    }

    #[test]
    fn test_empty_board() {
        let board = Board::EMPTY;
        assert_eq!(board.status(), BoardStatus::Ongoing);
        assert_eq!(board.legal_moves().as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(board.to_string(), ".../.../...");
    }

    #[test]
    fn test_apply_move_on_empty_cell() {
        let mut board = Board::EMPTY;
        board.apply_move(Player::X, 4).unwrap();
        assert_eq!(board.cell(4), Some(Player::X));
        assert_eq!(board.legal_moves().len(), 8);
        assert!(!board.legal_moves().contains(&4));
    }

    #[test]
    fn test_apply_move_rejects_occupied_cell() {
        let mut board = board([1, 0, 0, 0, 0, 0, 0, 0, 0]);
        let before = board;
        assert_eq!(
            board.apply_move(Player::O, 0),
            Err(IllegalMoveError::Occupied { index: 0 })
        );
        assert_eq!(
            board.apply_move(Player::X, 0),
            Err(IllegalMoveError::Occupied { index: 0 })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_apply_move_rejects_out_of_range() {
        let mut board = Board::EMPTY;
        assert_eq!(
            board.apply_move(Player::X, 9),
            Err(IllegalMoveError::OutOfRange { index: 9 })
        );
        assert_eq!(
            board.apply_move(Player::X, usize::MAX),
            Err(IllegalMoveError::OutOfRange { index: usize::MAX })
        );
        assert_eq!(board, Board::EMPTY);
    }

    #[test]
    fn test_apply_move_succeeds_iff_cell_empty_and_touches_only_that_cell() {
        for start in reachable_boards().into_iter().step_by(97) {
            for index in 0..=CELL_COUNT {
                for player in [Player::X, Player::O] {
                    let mut board = start;
                    let was_legal = start.is_legal_move(index);
                    assert_eq!(board.apply_move(player, index).is_ok(), was_legal);
                    for i in 0..CELL_COUNT {
                        if was_legal && i == index {
                            assert_eq!(board.cell(i), Some(player));
                        } else {
                            assert_eq!(board.cell(i), start.cell(i));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_winning_line() {
        for line in WINNING_LINES {
            for player in [Player::X, Player::O] {
                let mut board = Board::EMPTY;
                for index in line {
                    board.apply_move(player, index).unwrap();
                }
                assert_eq!(board.status(), BoardStatus::Won(player), "{board}");
            }
        }
    }

    #[test]
    fn test_draw_board() {
        // X O X / X O O / O X X
        let board = board([1, -1, 1, 1, -1, -1, -1, 1, 1]);
        assert_eq!(board.status(), BoardStatus::Draw);
        assert!(board.legal_moves().is_empty());
        assert_eq!(board.to_string(), "XOX/XOO/OXX");
    }

    #[test]
    fn test_win_on_full_board_is_not_draw() {
        // X X X / O O X / X O O
        let board = board([1, 1, 1, -1, -1, 1, 1, -1, -1]);
        assert_eq!(board.status(), BoardStatus::Won(Player::X));
    }

    #[test]
    fn test_status_is_total_over_reachable_boards() {
        let boards = reachable_boards();
        // 5478 distinct positions, counted here with move-order duplicates.
        assert_eq!(boards.len(), 549_946);
        for board in boards.iter().step_by(31) {
            let holds = [
                board.status().is_ongoing(),
                board.status() == BoardStatus::Won(Player::X),
                board.status() == BoardStatus::Won(Player::O),
                board.status().is_draw(),
            ];
            assert_eq!(holds.iter().filter(|h| **h).count(), 1, "{board}");
            if board.status().is_ongoing() {
                assert!(!board.legal_moves().is_empty());
                assert_eq!(board.winner(), None);
            }
        }
    }

    #[test]
    fn test_invalid_cell_value() {
        assert_eq!(
            Board::try_from([0, 0, 2, 0, 0, 0, 0, 0, 0]),
            Err(InvalidCellError { value: 2 })
        );
    }

    #[test]
    fn test_serde_as_sign_array() {
        let board = board([1, 0, -1, 0, 1, 0, 0, 0, -1]);
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, "[1,0,-1,0,1,0,0,0,-1]");
        assert_eq!(serde_json::from_str::<Board>(&json).unwrap(), board);
        assert!(serde_json::from_str::<Board>("[3,0,0,0,0,0,0,0,0]").is_err());
    }
}

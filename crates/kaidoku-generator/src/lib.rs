//! Difficulty-targeted Sudoku puzzle generation.
//!
//! # Overview
//!
//! The generator works in three stages:
//!
//! 1. **Full board**: walk a random permutation of the 81 positions, trying
//!    digits in random order and keeping any placement that does not clash
//!    with its row, column, or box. Once at least 17 clues are down, every
//!    further placement is checked with the exact-cover solver; the first
//!    uniquely-determined board is committed.
//! 2. **Dig holes**: remove clues in random order, keeping each hole only
//!    while the solution stays unique.
//! 3. **Classify**: rebuild the candidate grid from the surviving clues and
//!    replay the deduction pipeline; the hardest technique used is the
//!    puzzle's difficulty class.
//!
//! [`PuzzleGenerator::generate`] retries this loop until a puzzle of the
//! requested class appears, bounded by a fixed attempt cap.
//!
//! # Reproducibility
//!
//! Generation is driven by a seedable PRNG. [`PuzzleGenerator::new`] seeds
//! it from the thread-local entropy source; [`PuzzleGenerator::with_seed`]
//! replays a previous run exactly.
//!
//! ```
//! use kaidoku_generator::{PuzzleGenerator, PuzzleSeed};
//!
//! let seed = PuzzleSeed::from([7u8; 32]);
//! let mut first = PuzzleGenerator::with_seed(seed);
//! let mut second = PuzzleGenerator::with_seed(seed);
//! let a = first.generate_once();
//! let b = second.generate_once();
//! assert_eq!(
//!     a.map(|p| p.clues),
//!     b.map(|p| p.clues),
//! );
//! ```

use std::{fmt::Display, str::FromStr};

use kaidoku_core::Position;
use kaidoku_solver::{Grid, SolverError, dlx};
use rand::{
    Rng, RngExt, SeedableRng,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg64;

pub use kaidoku_solver::Difficulty;

/// Retry cap for [`PuzzleGenerator::generate`].
const MAX_ATTEMPTS: usize = 100_000;

/// Cap on random board walks within one [`PuzzleGenerator::generate_once`]
/// call. A walk dies when it paints itself into an unsolvable corner, which
/// is common enough that single walks are not worth surfacing.
const MAX_BOARD_WALKS: usize = 10_000;

/// Clue count below which a board cannot be unique, so the exact-cover
/// check is not worth running yet.
const MIN_CLUES: usize = 17;

/// A 256-bit seed for reproducible puzzle generation, printable as a
/// 64-character hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleSeed(pub [u8; 32]);

impl From<[u8; 32]> for PuzzleSeed {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Display for PuzzleSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for PuzzleSeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err("seed string must be 64 hexadecimal characters".to_string());
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let byte_str = s
                .get(i * 2..i * 2 + 2)
                .ok_or_else(|| "seed string must be 64 hexadecimal characters".to_owned())?;
            *byte = u8::from_str_radix(byte_str, 16)
                .map_err(|_| format!("invalid hexadecimal byte: {byte_str}"))?;
        }
        Ok(PuzzleSeed(bytes))
    }
}

impl Distribution<PuzzleSeed> for StandardUniform {
    fn sample<R>(&self, rng: &mut R) -> PuzzleSeed
    where
        R: Rng + ?Sized,
    {
        PuzzleSeed(rng.random())
    }
}

/// One generated puzzle: the ready-to-solve grid, its clue string, and the
/// difficulty class the pipeline assigned (or `None` when the puzzle needs
/// more than the technique library).
#[derive(Debug)]
pub struct GeneratedPuzzle {
    /// The puzzle grid, candidates rebuilt from the clues.
    pub grid: Grid,
    /// The 81-character clue string (`'0'` = empty).
    pub clues: String,
    /// Hardest technique class used by the pipeline, if it completes.
    pub difficulty: Option<Difficulty>,
}

/// A seedable Sudoku puzzle generator.
///
/// # Examples
///
/// ```no_run
/// use kaidoku_generator::{Difficulty, PuzzleGenerator};
///
/// let mut generator = PuzzleGenerator::new();
/// if let Some(grid) = generator.generate(Difficulty::Intermediate) {
///     println!("{}", grid.to_board_string());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PuzzleGenerator {
    rng: Pcg64,
    seed: PuzzleSeed,
}

impl Default for PuzzleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzleGenerator {
    /// Creates a generator seeded from the thread-local entropy source.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Creates a generator with an explicit seed; the same seed reproduces
    /// the same puzzles in the same order.
    #[must_use]
    pub fn with_seed(seed: PuzzleSeed) -> Self {
        Self {
            rng: Pcg64::from_seed(seed.0),
            seed,
        }
    }

    /// Returns the seed this generator was created with.
    #[must_use]
    pub fn seed(&self) -> PuzzleSeed {
        self.seed
    }

    /// Generates a puzzle of exactly the requested difficulty class.
    ///
    /// Retries full generation until the classifier agrees, up to a fixed
    /// attempt cap; returns `None` if the cap is exhausted.
    #[must_use]
    pub fn generate(&mut self, difficulty: Difficulty) -> Option<Grid> {
        for attempt in 1..=MAX_ATTEMPTS {
            let Some(puzzle) = self.generate_once() else {
                continue;
            };
            if puzzle.difficulty == Some(difficulty) {
                log::debug!(
                    "attempt {attempt}: produced a {difficulty:?} puzzle with {} clues",
                    puzzle.clues.bytes().filter(|&b| b != b'0').count()
                );
                return Some(puzzle.grid);
            }
            log::trace!(
                "attempt {attempt}: discarded a {:?} puzzle",
                puzzle.difficulty
            );
        }
        None
    }

    /// Runs one full generation attempt: build a board, dig holes, and
    /// classify whatever comes out. Returns `None` only when every board
    /// walk within the attempt dies.
    #[must_use]
    pub fn generate_once(&mut self) -> Option<GeneratedPuzzle> {
        let mut board = (0..MAX_BOARD_WALKS).find_map(|_| self.generate_full_board())?;
        self.dig_holes(&mut board);
        let clues: String = board.iter().map(|&v| char::from(b'0' + v)).collect();
        let grid = Grid::from_givens(&clues).ok()?;
        let difficulty = grid.clone().check_difficulty();
        Some(GeneratedPuzzle {
            grid,
            clues,
            difficulty,
        })
    }

    /// Builds a random completed board. Placements are random but
    /// conflict-free; once enough clues are down, the exact-cover check
    /// decides: a unique solution commits the board, an ambiguous one keeps
    /// walking, and an unsolvable state abandons the attempt.
    fn generate_full_board(&mut self) -> Option<[u8; 81]> {
        let mut board = [0u8; 81];
        let mut placements = 0usize;

        let mut positions: Vec<Position> = Position::ALL.to_vec();
        positions.shuffle(&mut self.rng);
        let mut digits: [u8; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];

        for pos in positions {
            digits.shuffle(&mut self.rng);
            for &digit in &digits {
                if conflicts(&board, pos, digit) {
                    continue;
                }
                board[index(pos)] = digit;
                placements += 1;
                if placements < MIN_CLUES {
                    break;
                }
                let clues: String = board.iter().map(|&v| char::from(b'0' + v)).collect();
                match dlx::solve(&clues) {
                    Ok(solution) => {
                        for (slot, ch) in board.iter_mut().zip(solution.bytes()) {
                            *slot = ch - b'0';
                        }
                        return Some(board);
                    }
                    Err(SolverError::MultipleSolutions { .. }) => break,
                    Err(_) => {
                        // A wrong turn somewhere earlier; start over rather
                        // than salvage a stale solution.
                        log::trace!("board walk hit a dead end after {placements} placements");
                        return None;
                    }
                }
            }
        }
        None
    }

    /// Removes clues in random order while the solution stays unique.
    fn dig_holes(&mut self, board: &mut [u8; 81]) {
        let mut positions: Vec<Position> = Position::ALL.to_vec();
        positions.shuffle(&mut self.rng);
        for pos in positions {
            let removed = std::mem::replace(&mut board[index(pos)], 0);
            let clues: String = board.iter().map(|&v| char::from(b'0' + v)).collect();
            if dlx::solve(&clues).is_err() {
                board[index(pos)] = removed;
            }
        }
    }
}

fn index(pos: Position) -> usize {
    usize::from(pos.x()) * 9 + usize::from(pos.y())
}

fn conflicts(board: &[u8; 81], pos: Position, digit: u8) -> bool {
    for i in 0..9u8 {
        if board[usize::from(pos.x()) * 9 + usize::from(i)] == digit {
            return true;
        }
        if board[usize::from(i) * 9 + usize::from(pos.y())] == digit {
            return true;
        }
        let bx = (pos.x() / 3) * 3 + i / 3;
        let by = (pos.y() / 3) * 3 + i % 3;
        if board[usize::from(bx) * 9 + usize::from(by)] == digit {
            return true;
        }
    }
    false
}

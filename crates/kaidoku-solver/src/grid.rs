//! The candidate grid: cell matrix, derived indexes, and the step loop.

use kaidoku_core::{Digit, DigitSet, House, HouseKind, Position};

use crate::{
    SolverError,
    cell::{Cell, CellId},
    dlx,
    graph::CandidateGraph,
    step::{Difficulty, ExecMode, Execution},
    technique,
};

/// Length of the full serialized pattern: 81 cells × 12 characters.
const PATTERN_LEN: usize = 972;

/// The 9×9 grid plus everything the deduction pipeline reads.
///
/// The grid owns its 81 cells in a fixed row-major arena and four derived
/// structures rebuilt wholesale after every executed step: the per-house
/// filled-digit bitmaps, the per-digit strong-link pair lists, the bi-value
/// cell indexes, and the candidate graph. Techniques observe those indexes
/// and emit a [`Step`](crate::Step); they never mutate the cell matrix —
/// only [`execute`](Self::execute) does.
///
/// # Examples
///
/// ```
/// use kaidoku_solver::Grid;
///
/// let mut grid = Grid::from_givens(
///     "530070000600195000098000060800060003400803001700020006060000280000419005000080079",
/// )?;
/// let step = grid.next_step().to_vec();
/// assert!(!step.is_empty(), "an easy puzzle always has a next step");
/// grid.execute();
/// # Ok::<(), kaidoku_solver::SolverError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Cell>,
    /// Digits already placed, per `[house kind][house index]`.
    filled: [[DigitSet; 9]; 3],
    /// For each digit, the cell pairs that are its only two candidates in
    /// some house. A pair repeated across houses appears once per house.
    strong_links: [Vec<(CellId, CellId)>; 9],
    bi_values: Vec<CellId>,
    /// Bi-value cells grouped by their candidate pair, `[high][low]`.
    bi_values_by_cands: Vec<Vec<Vec<CellId>>>,
    graph: CandidateGraph,
    instructions: Vec<u8>,
    execution: Execution,
}

impl Grid {
    fn empty() -> Self {
        Self {
            cells: Position::ALL.iter().map(|&pos| Cell::new(pos)).collect(),
            filled: [[DigitSet::EMPTY; 9]; 3],
            strong_links: std::array::from_fn(|_| Vec::new()),
            bi_values: Vec::new(),
            bi_values_by_cands: vec![vec![Vec::new(); 9]; 9],
            graph: CandidateGraph::default(),
            instructions: Vec::new(),
            execution: Execution::default(),
        }
    }

    /// Builds a grid from the 972-character pattern: per cell, a given flag,
    /// the current value, nine candidate bits (LSB-first for digits 1-9),
    /// and the solution digit.
    ///
    /// The pattern is parsed strictly, the solution is confirmed unique, and
    /// the construction checks run before any derived structure is built.
    ///
    /// # Errors
    ///
    /// [`SolverError::InvalidPattern`] on a malformed pattern,
    /// [`SolverError::NoSolution`] / [`SolverError::MultipleSolutions`] from
    /// the uniqueness check, and [`SolverError::Contradictory`] when a
    /// value, answer, or candidate fails the consistency checks.
    pub fn from_pattern(pattern: &str) -> Result<Self, SolverError> {
        let mut grid = Self::empty();
        grid.parse_pattern(pattern)?;
        grid.uniqueness()?;
        grid.check_values_match_answers()?;
        grid.check_house_candidates()?;
        grid.check_answer_candidates()?;
        grid.update_cand_could_be();
        grid.rebuild();
        Ok(grid)
    }

    /// Builds a grid from an 81-character clue string (`'0'` = empty).
    ///
    /// Every clue becomes a given; candidates start as everything the givens
    /// do not exclude. This is the entry point used by the generator and by
    /// tests.
    ///
    /// # Errors
    ///
    /// [`SolverError::InvalidPattern`] on a malformed string, plus the
    /// uniqueness outcomes of [`dlx::solve`].
    pub fn from_givens(givens: &str) -> Result<Self, SolverError> {
        if givens.len() != 81 {
            return Err(SolverError::InvalidPattern("givens must be 81 characters"));
        }
        let mut grid = Self::empty();
        for (cell, ch) in grid.cells.iter_mut().zip(givens.bytes()) {
            match ch {
                b'0' => {}
                b'1'..=b'9' => {
                    cell.given = true;
                    cell.value = Some(Digit::from_value(ch - b'0'));
                }
                _ => return Err(SolverError::InvalidPattern("givens must be digits 0-9")),
            }
        }
        grid.uniqueness()?;
        grid.update_cand_could_be();
        for cell in &mut grid.cells {
            cell.candidates = cell.cand_could_be;
        }
        grid.rebuild();
        Ok(grid)
    }

    fn parse_pattern(&mut self, pattern: &str) -> Result<(), SolverError> {
        if pattern.len() != PATTERN_LEN {
            return Err(SolverError::InvalidPattern("wrong length"));
        }
        let bytes = pattern.as_bytes();
        for (i, cell) in self.cells.iter_mut().enumerate() {
            let chunk = &bytes[i * 12..(i + 1) * 12];

            cell.given = match chunk[0] {
                b'0' => false,
                b'1' => true,
                _ => return Err(SolverError::InvalidPattern("invalid given flag")),
            };
            cell.value = match chunk[1] {
                b'0' => None,
                b'1'..=b'9' => Some(Digit::from_value(chunk[1] - b'0')),
                _ => return Err(SolverError::InvalidPattern("invalid value")),
            };

            cell.candidates = DigitSet::EMPTY;
            for (bit, digit) in chunk[2..11].iter().copied().zip(Digit::ALL) {
                match (cell.value, bit) {
                    (_, b'0') => {}
                    (None, b'1') => cell.candidates.insert(digit),
                    // A placed cell must carry no candidate bits.
                    _ => return Err(SolverError::InvalidPattern("invalid candidates")),
                }
            }

            cell.ans = match chunk[11] {
                b'0' => None,
                b'1'..=b'9' => Some(Digit::from_value(chunk[11] - b'0')),
                _ => return Err(SolverError::InvalidPattern("invalid answer")),
            };
        }
        Ok(())
    }

    /// The 81-character clue string: given values, `'0'` elsewhere.
    fn compress(&self) -> String {
        self.cells
            .iter()
            .map(|cell| {
                if cell.given {
                    cell.value.map_or('0', |d| char::from(b'0' + d.value()))
                } else {
                    '0'
                }
            })
            .collect()
    }

    /// Runs the exact-cover check on the givens and reconciles `ans` with
    /// the unique solution.
    fn uniqueness(&mut self) -> Result<(), SolverError> {
        let solution = dlx::solve(&self.compress())?;
        for (cell, ch) in self.cells.iter_mut().zip(solution.bytes()) {
            let digit = Digit::from_value(ch - b'0');
            match cell.ans {
                None => cell.ans = Some(digit),
                Some(ans) if ans != digit => {
                    return Err(SolverError::Contradictory(
                        "provided answer doesn't match the unique solution",
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn check_values_match_answers(&self) -> Result<(), SolverError> {
        for cell in &self.cells {
            if cell.value.is_some() && cell.value != cell.ans {
                return Err(SolverError::Contradictory("cell value contradicts answer"));
            }
        }
        Ok(())
    }

    /// No house may contain a placed value that remains as a candidate
    /// elsewhere in that house.
    fn check_house_candidates(&self) -> Result<(), SolverError> {
        for house in House::ALL {
            let mut placed = DigitSet::EMPTY;
            let mut candidates = DigitSet::EMPTY;
            for pos in house.positions() {
                let cell = self.cell_at(pos);
                match cell.value {
                    Some(value) => placed.insert(value),
                    None => candidates |= cell.candidates,
                }
            }
            if !(placed & candidates).is_empty() {
                return Err(SolverError::Contradictory(
                    "candidate conflicts with a placed value in its house",
                ));
            }
        }
        Ok(())
    }

    /// Every empty cell must still carry its answer as a candidate.
    fn check_answer_candidates(&self) -> Result<(), SolverError> {
        for cell in &self.cells {
            if cell.value.is_none()
                && cell.ans.is_some_and(|ans| !cell.candidates.contains(ans))
            {
                return Err(SolverError::Contradictory(
                    "empty cell is missing its answer as a candidate",
                ));
            }
        }
        Ok(())
    }

    /// Recomputes `cand_could_be`: for every given, its digit is excluded
    /// from the whole row, column, and box, and everything from the given
    /// cell itself.
    fn update_cand_could_be(&mut self) {
        for id in 0..self.cells.len() {
            let cell = &self.cells[id];
            if !cell.given {
                continue;
            }
            let (pos, value) = (cell.pos, cell.value);
            self.cells[id].cand_could_be = DigitSet::EMPTY;
            let Some(value) = value else { continue };
            for kind in HouseKind::ALL {
                for peer in House::containing(kind, pos).positions() {
                    self.cells[Self::id_of(peer)].cand_could_be.remove(value);
                }
            }
        }
    }

    /// Rebuilds every derived structure from the cell matrix. Runs once at
    /// construction and after every executed step; nothing is maintained
    /// incrementally.
    fn rebuild(&mut self) {
        self.update_filled();
        self.update_bi_values();
        self.update_strong_links();
        self.graph
            .rebuild(&self.cells, &self.strong_links, &self.bi_values);
    }

    fn update_filled(&mut self) {
        self.filled = [[DigitSet::EMPTY; 9]; 3];
        for cell in &self.cells {
            if let Some(value) = cell.value {
                self.filled[0][usize::from(cell.pos.x())].insert(value);
                self.filled[1][usize::from(cell.pos.y())].insert(value);
                self.filled[2][usize::from(cell.pos.box_index())].insert(value);
            }
        }
    }

    fn update_bi_values(&mut self) {
        self.bi_values.clear();
        for row in &mut self.bi_values_by_cands {
            for entry in row {
                entry.clear();
            }
        }
        for (id, cell) in self.cells.iter().enumerate() {
            if let Some((lo, hi)) = cell.candidates.as_pair() {
                self.bi_values.push(id);
                self.bi_values_by_cands[usize::from(hi.index())][usize::from(lo.index())]
                    .push(id);
            }
        }
    }

    fn update_strong_links(&mut self) {
        for links in &mut self.strong_links {
            links.clear();
        }
        for cell in &mut self.cells {
            cell.sl = [None; 27];
        }
        for house in House::ALL {
            for digit in Digit::ALL {
                let mut pair: [CellId; 2] = [0; 2];
                let mut count = 0;
                for pos in house.positions() {
                    let cell = self.cell_at(pos);
                    if cell.value.is_none() && cell.candidates.contains(digit) {
                        if count < 2 {
                            pair[count] = Self::id_of(pos);
                        }
                        count += 1;
                    }
                }
                if count == 2 {
                    self.strong_links[usize::from(digit.index())].push((pair[0], pair[1]));
                    let slot =
                        usize::from(house.kind().index()) * 9 + usize::from(digit.index());
                    self.cells[pair[0]].sl[slot] = Some(pair[1]);
                    self.cells[pair[1]].sl[slot] = Some(pair[0]);
                }
            }
        }
    }

    /// Clears the scratch buffers and runs the technique pipeline in its
    /// fixed order; the first technique to find anything wins.
    ///
    /// Returns the instruction bytes of the winning step, or an empty slice
    /// when no technique applies. Repeated calls without an intervening
    /// [`execute`](Self::execute) return the same bytes.
    pub fn next_step(&mut self) -> &[u8] {
        self.instructions.clear();
        self.execution = Execution::default();
        for &(name, technique) in technique::ORDERED {
            if let Some(step) = technique(self) {
                log::trace!("{name} emitted {} instruction bytes", step.bytes.len());
                self.instructions = step.bytes;
                self.execution = step.execution;
                break;
            }
        }
        &self.instructions
    }

    /// Applies the recorded execution back into the cell matrix, then
    /// rebuilds the derived structures.
    ///
    /// Placements set the value, clear the cell's candidates, and clear the
    /// digit from every peer's candidates; eliminations clear single
    /// candidates. The driver calls this between [`next_step`]
    /// (Self::next_step) calls — the engine never auto-advances except
    /// inside [`check_difficulty`](Self::check_difficulty).
    pub fn execute(&mut self) {
        let execution = std::mem::take(&mut self.execution);
        for &word in execution.executees() {
            let (pos, digit) = unpack_executee(word);
            match execution.mode() {
                ExecMode::Place => {
                    let id = Self::id_of(pos);
                    self.cells[id].value = Some(digit);
                    self.cells[id].candidates = DigitSet::EMPTY;
                    for kind in HouseKind::ALL {
                        for peer in House::containing(kind, pos).positions() {
                            self.cells[Self::id_of(peer)].candidates.remove(digit);
                        }
                    }
                }
                ExecMode::Eliminate => {
                    self.cells[Self::id_of(pos)].candidates.remove(digit);
                }
            }
        }
        self.instructions.clear();
        self.rebuild();
    }

    /// Replays the pipeline to completion and returns the hardest technique
    /// class used, or `None` when the library is exhausted before the grid
    /// fills ("unsolvable by these techniques").
    pub fn check_difficulty(&mut self) -> Option<Difficulty> {
        let mut hardest = Difficulty::Beginner;
        while !self.completed() {
            if self.next_step().is_empty() {
                return None;
            }
            hardest = hardest.max(Difficulty::of_opcode(self.instructions[0]));
            self.execute();
        }
        Some(hardest)
    }

    /// Returns `true` once every cell has a value.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.cells.iter().all(|cell| cell.value.is_some())
    }

    /// Serializes the board as 162 characters: 81 given values (`'0'` where
    /// not given) followed by 81 answer digits.
    #[must_use]
    pub fn to_board_string(&self) -> String {
        let mut out = self.compress();
        out.extend(
            self.cells
                .iter()
                .map(|cell| cell.ans.map_or('0', |d| char::from(b'0' + d.value()))),
        );
        out
    }

    /// Returns the instruction bytes of the last [`next_step`]
    /// (Self::next_step) call.
    #[must_use]
    pub fn instructions(&self) -> &[u8] {
        &self.instructions
    }

    /// Returns the execution of the last step.
    #[must_use]
    pub fn execution(&self) -> &Execution {
        &self.execution
    }

    /// Returns the cell at `pos`.
    #[must_use]
    pub fn cell_at(&self, pos: Position) -> &Cell {
        &self.cells[Self::id_of(pos)]
    }

    /// Iterates over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn id_of(pos: Position) -> CellId {
        usize::from(pos.x()) * 9 + usize::from(pos.y())
    }

    pub(crate) fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    /// Cell `i` of house `index` of the given kind.
    pub(crate) fn house_cell(&self, kind: HouseKind, index: u8, i: u8) -> &Cell {
        self.cell_at(House::new(kind, index).cell(i))
    }

    pub(crate) fn filled(&self, kind: HouseKind, index: u8) -> DigitSet {
        self.filled[usize::from(kind.index())][usize::from(index)]
    }

    pub(crate) fn strong_links(&self, digit: Digit) -> &[(CellId, CellId)] {
        &self.strong_links[usize::from(digit.index())]
    }

    pub(crate) fn bi_values(&self) -> &[CellId] {
        &self.bi_values
    }

    pub(crate) fn bi_values_by_cands(&self, hi: Digit, lo: Digit) -> &[CellId] {
        &self.bi_values_by_cands[usize::from(hi.index())][usize::from(lo.index())]
    }

    pub(crate) fn graph(&self) -> &CandidateGraph {
        &self.graph
    }

    #[cfg(test)]
    pub(crate) fn test_empty() -> Self {
        Self::empty()
    }

    #[cfg(test)]
    pub(crate) fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        let id = Self::id_of(pos);
        &mut self.cells[id]
    }

    #[cfg(test)]
    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    #[cfg(test)]
    pub(crate) fn test_rebuild(&mut self) {
        self.rebuild();
    }
}

/// Splits an executee word into its position and digit.
#[expect(clippy::cast_possible_truncation)]
pub(crate) fn unpack_executee(word: u16) -> (Position, Digit) {
    let pos = Position::new((word >> 12) as u8, (word >> 8) as u8 & 0xF);
    let digit = Digit::from_index(word as u8 & 0xF);
    (pos, digit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_from_givens_fills_answers() {
        let grid = testing::easy_grid();
        for cell in grid.cells() {
            assert!(cell.ans().is_some());
            if let Some(value) = cell.value() {
                assert_eq!(Some(value), cell.ans());
                assert!(cell.candidates().is_empty());
            } else {
                assert!(cell.candidates().contains(cell.ans().unwrap()));
            }
        }
    }

    #[test]
    fn test_from_givens_rejects_ambiguous_puzzles() {
        let sparse =
            "000002000000080000050000000000300800000900400000000000000806000000000070000000008";
        assert!(matches!(
            Grid::from_givens(sparse),
            Err(SolverError::MultipleSolutions { .. })
        ));
    }

    #[test]
    fn test_pattern_round_trip() {
        let grid = testing::easy_grid();
        let pattern = testing::to_pattern(&grid);
        let reparsed = Grid::from_pattern(&pattern).unwrap();
        for (a, b) in grid.cells().zip(reparsed.cells()) {
            assert_eq!(a.value(), b.value());
            assert_eq!(a.ans(), b.ans());
            assert_eq!(a.candidates(), b.candidates());
            assert_eq!(a.given(), b.given());
        }
    }

    #[test]
    fn test_pattern_length_is_checked() {
        assert_eq!(
            Grid::from_pattern("10").unwrap_err(),
            SolverError::InvalidPattern("wrong length")
        );
    }

    #[test]
    fn test_pattern_rejects_candidates_on_filled_cell() {
        let grid = testing::easy_grid();
        let mut pattern = testing::to_pattern(&grid);
        // Cell (0, 0) holds the given 5; flip one of its candidate bits on.
        pattern.replace_range(2..3, "1");
        assert_eq!(
            Grid::from_pattern(&pattern).unwrap_err(),
            SolverError::InvalidPattern("invalid candidates")
        );
    }

    #[test]
    fn test_house_candidate_check_rejects_conflicts() {
        let grid = testing::easy_grid();
        let mut pattern = testing::to_pattern(&grid);
        // Cell (0, 2) is empty; force candidate 5, which its row already
        // holds as the given at (0, 0).
        let base = 2 * 12;
        pattern.replace_range(base + 2 + 4..base + 2 + 5, "1");
        assert_eq!(
            Grid::from_pattern(&pattern).unwrap_err(),
            SolverError::Contradictory("candidate conflicts with a placed value in its house")
        );
    }

    #[test]
    fn test_execute_place_clears_peers() {
        let mut grid = testing::easy_grid();
        loop {
            let step = grid.next_step().to_vec();
            assert!(!step.is_empty());
            if grid.execution().mode() == ExecMode::Place {
                let word = grid.execution().executees()[0];
                let (pos, digit) = unpack_executee(word);
                grid.execute();
                for kind in HouseKind::ALL {
                    for peer in House::containing(kind, pos).positions() {
                        assert!(
                            !grid.cell_at(peer).candidates().contains(digit),
                            "peer {peer:?} kept candidate {digit}"
                        );
                    }
                }
                break;
            }
            grid.execute();
        }
    }

    #[test]
    fn test_next_step_is_idempotent() {
        let mut grid = testing::easy_grid();
        let first = grid.next_step().to_vec();
        let second = grid.next_step().to_vec();
        assert_eq!(first, second);
        assert!(!grid.execution().is_empty());
    }

    #[test]
    fn test_strong_links_are_mutual() {
        let grid = testing::easy_grid();
        for digit in Digit::ALL {
            for &(a, b) in grid.strong_links(digit) {
                let slot = grid.cell(a).sl.iter().position(|&s| s == Some(b));
                let slot = slot.expect("pair must be cross-linked");
                assert_eq!(grid.cell(b).sl[slot], Some(a));
            }
        }
    }

    #[test]
    fn test_check_difficulty_solves_easy_grid() {
        let mut grid = testing::easy_grid();
        let difficulty = grid.check_difficulty().expect("easy grid must solve");
        assert!(grid.completed());
        assert_eq!(difficulty, Difficulty::Beginner);
        for cell in grid.cells() {
            assert_eq!(cell.value(), cell.ans());
        }
    }

    #[test]
    fn test_house_digit_coverage_invariant() {
        let mut grid = testing::easy_grid();
        for _ in 0..10 {
            for house in House::ALL {
                for digit in Digit::ALL {
                    let covered = house.positions().any(|pos| {
                        let cell = grid.cell_at(pos);
                        cell.value() == Some(digit) || cell.candidates().contains(digit)
                    });
                    assert!(covered, "{house:?} lost digit {digit}");
                }
            }
            if grid.next_step().is_empty() {
                break;
            }
            grid.execute();
        }
    }

    #[test]
    fn test_to_board_string_shape() {
        let grid = testing::easy_grid();
        let board = grid.to_board_string();
        assert_eq!(board.len(), 162);
        assert_eq!(&board[..81], testing::EASY);
        assert!(board[81..].bytes().all(|b| (b'1'..=b'9').contains(&b)));
    }
}

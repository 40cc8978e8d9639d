//! Exact-cover uniqueness checking via dancing links.
//!
//! The standard Sudoku exact-cover matrix has 729 option rows (one per
//! `(row, col, digit)` triple) and 324 constraint columns in four blocks of
//! 81: row-has-digit, column-has-digit, box-has-digit, cell-filled. A clue
//! contributes only its own digit's option; an empty cell contributes all
//! nine.
//!
//! The search continues past the first solution and stops immediately after
//! a second one is found, so the caller learns whether the puzzle is unique,
//! ambiguous (with the first solution attached), or unsolvable.

use crate::SolverError;

const COLUMNS: usize = 324;

/// Sparse 0/1 matrix as four circular doubly-linked lists over node indices.
///
/// Node 0 is the head; nodes `1..=COLUMNS` are the column headers; body
/// nodes follow in insertion order.
struct Matrix {
    left: Vec<usize>,
    right: Vec<usize>,
    up: Vec<usize>,
    down: Vec<usize>,
    col: Vec<usize>,
    row: Vec<usize>,
    /// Live node count per column header.
    size: Vec<usize>,
    /// First body node of each option row; 0 while the row is empty.
    first: Vec<usize>,
    /// Option rows of the partial solution.
    stack: Vec<usize>,
    solution: Option<[u8; 81]>,
}

impl Matrix {
    fn new(rows: usize) -> Self {
        let headers = COLUMNS + 1;
        let mut matrix = Self {
            left: Vec::with_capacity(headers),
            right: Vec::with_capacity(headers),
            up: Vec::with_capacity(headers),
            down: Vec::with_capacity(headers),
            col: vec![0; headers],
            row: vec![0; headers],
            size: vec![0; headers],
            first: vec![0; rows + 1],
            stack: Vec::with_capacity(81),
            solution: None,
        };
        for i in 0..headers {
            matrix.left.push(i.wrapping_sub(1));
            matrix.right.push(i + 1);
            matrix.up.push(i);
            matrix.down.push(i);
        }
        matrix.left[0] = COLUMNS;
        matrix.right[COLUMNS] = 0;
        matrix
    }

    /// Inserts a 1 at `(r, c)`, linking it below column `c` and into row `r`.
    fn insert(&mut self, r: usize, c: usize) {
        let node = self.left.len();
        self.col.push(c);
        self.row.push(r);
        self.size[c] += 1;

        self.down.push(self.down[c]);
        self.up.push(c);
        self.left.push(node);
        self.right.push(node);
        let below = self.down[node];
        self.up[below] = node;
        self.down[c] = node;

        if self.first[r] == 0 {
            self.first[r] = node;
        } else {
            let head = self.first[r];
            self.right[node] = self.right[head];
            self.left[self.right[node]] = node;
            self.left[node] = head;
            self.right[head] = node;
        }
    }

    fn cover(&mut self, c: usize) {
        self.left[self.right[c]] = self.left[c];
        self.right[self.left[c]] = self.right[c];
        let mut i = self.down[c];
        while i != c {
            let mut j = self.right[i];
            while j != i {
                self.up[self.down[j]] = self.up[j];
                self.down[self.up[j]] = self.down[j];
                self.size[self.col[j]] -= 1;
                j = self.right[j];
            }
            i = self.down[i];
        }
    }

    fn uncover(&mut self, c: usize) {
        let mut i = self.up[c];
        while i != c {
            let mut j = self.left[i];
            while j != i {
                self.up[self.down[j]] = j;
                self.down[self.up[j]] = j;
                self.size[self.col[j]] += 1;
                j = self.left[j];
            }
            i = self.up[i];
        }
        self.left[self.right[c]] = c;
        self.right[self.left[c]] = c;
    }

    fn record_solution(&mut self) {
        let mut cells = [0u8; 81];
        for &r in &self.stack {
            let cell = (r - 1) / 9;
            #[expect(clippy::cast_possible_truncation)]
            let digit = ((r - 1) % 9 + 1) as u8;
            cells[cell] = digit;
        }
        self.solution = Some(cells);
    }

    /// Algorithm X over the dancing links. Returns `true` when a second
    /// solution was found and the search should unwind.
    fn search(&mut self) -> bool {
        if self.right[0] == 0 {
            if self.solution.is_some() {
                return true;
            }
            self.record_solution();
            return false;
        }

        // Smallest active column first. This is a speed heuristic, not a
        // correctness requirement.
        let mut cur = self.right[0];
        let mut i = self.right[cur];
        while i != 0 {
            if self.size[i] < self.size[cur] {
                cur = i;
            }
            i = self.right[i];
        }

        self.cover(cur);
        let mut i = self.down[cur];
        while i != cur {
            self.stack.push(self.row[i]);
            let mut j = self.right[i];
            while j != i {
                self.cover(self.col[j]);
                j = self.right[j];
            }
            let stop = self.search();
            let mut j = self.left[i];
            while j != i {
                self.uncover(self.col[j]);
                j = self.left[j];
            }
            self.stack.pop();
            if stop {
                self.uncover(cur);
                return true;
            }
            i = self.down[i];
        }
        self.uncover(cur);
        false
    }
}

/// Option row id for placing `digit` (1-9) at zero-based `(x, y)`; 1-based
/// so that 0 can mean "row empty" in the matrix.
fn option_id(x: usize, y: usize, digit: usize) -> usize {
    x * 81 + y * 9 + digit
}

fn insert_option(matrix: &mut Matrix, x: usize, y: usize, digit: usize) {
    let b = (x / 3) * 3 + y / 3;
    let id = option_id(x, y, digit);
    matrix.insert(id, x * 9 + digit);
    matrix.insert(id, 81 + y * 9 + digit);
    matrix.insert(id, 81 * 2 + b * 9 + digit);
    matrix.insert(id, 81 * 3 + x * 9 + y + 1);
}

/// Solves an 81-character puzzle string (`'0'` = empty cell) and reports on
/// uniqueness.
///
/// # Errors
///
/// - [`SolverError::InvalidPattern`] if the string is not 81 digits.
/// - [`SolverError::NoSolution`] if the exact cover has no solution.
/// - [`SolverError::MultipleSolutions`] as soon as a second solution is
///   found; the first one is attached.
pub fn solve(puzzle: &str) -> Result<String, SolverError> {
    if puzzle.len() != 81 {
        return Err(SolverError::InvalidPattern("puzzle must be 81 characters"));
    }

    let mut matrix = Matrix::new(729);
    for (i, ch) in puzzle.bytes().enumerate() {
        if !ch.is_ascii_digit() {
            return Err(SolverError::InvalidPattern("puzzle must be digits 0-9"));
        }
        let value = usize::from(ch - b'0');
        for digit in 1..=9 {
            if value != 0 && value != digit {
                continue;
            }
            insert_option(&mut matrix, i / 9, i % 9, digit);
        }
    }

    let stopped = matrix.search();
    let format = |cells: [u8; 81]| cells.iter().map(|d| char::from(b'0' + d)).collect();
    match matrix.solution {
        Some(first) if stopped => {
            log::trace!("exact cover found a second solution");
            Err(SolverError::MultipleSolutions {
                first: format(first),
            })
        }
        Some(unique) => Ok(format(unique)),
        None => Err(SolverError::NoSolution),
    }
}

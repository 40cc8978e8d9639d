//! The candidate graph chain and loop searches run over.
//!
//! For every `(cell, digit)` pair where the digit is still a candidate, the
//! graph holds two nodes: a denial node ("the candidate is false here") in
//! the first half of the node vector, and an assertion node ("the candidate
//! is true here") at `denial index + half`. Edges are directed:
//!
//! - denial → assertion (strong implication) for every bi-local strong link
//!   and for the two digits of every bi-value cell;
//! - assertion → denial (weak implication) to the cell's other candidates
//!   and to the same digit in every seen cell.
//!
//! A chain alternating strong and weak implications is then just a path, and
//! an alternating loop is a cycle.

use kaidoku_core::{Digit, Position};

use crate::cell::{Cell, CellId};

/// One node of the candidate graph.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// `false` in the denial half, `true` in the assertion half.
    pub asserted: bool,
    pub digit: Digit,
    pub pos: Position,
    /// Outgoing edges, as node indices.
    pub edges: Vec<usize>,
}

/// The rebuilt-per-step candidate graph.
#[derive(Debug, Clone, Default)]
pub(crate) struct CandidateGraph {
    nodes: Vec<Node>,
    half: usize,
}

impl CandidateGraph {
    /// Number of nodes (both halves).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of denial nodes; assertion node `i + half` pairs with denial
    /// node `i`.
    pub fn half(&self) -> usize {
        self.half
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    /// Rebuilds the graph from the current cell matrix and derived links.
    pub fn rebuild(
        &mut self,
        cells: &[Cell],
        strong_links: &[Vec<(CellId, CellId)>; 9],
        bi_values: &[CellId],
    ) {
        self.nodes.clear();
        let mut lookup = [[usize::MAX; 9]; 81];

        for (id, cell) in cells.iter().enumerate() {
            for digit in cell.candidates {
                lookup[id][usize::from(digit.index())] = self.nodes.len();
                self.nodes.push(Node {
                    asserted: false,
                    digit,
                    pos: cell.pos,
                    edges: Vec::new(),
                });
            }
        }
        self.half = self.nodes.len();
        for i in 0..self.half {
            let mut node = self.nodes[i].clone();
            node.asserted = true;
            node.edges.clear();
            self.nodes.push(node);
        }

        let denial = |lookup: &[[usize; 9]; 81], id: CellId, digit: Digit| {
            lookup[id][usize::from(digit.index())]
        };

        // Strong implications: bi-local links first, then bi-value cells.
        for digit in Digit::ALL {
            for &(a, b) in &strong_links[usize::from(digit.index())] {
                let an = denial(&lookup, a, digit);
                let bn = denial(&lookup, b, digit);
                self.nodes[an].edges.push(bn + self.half);
                self.nodes[bn].edges.push(an + self.half);
            }
        }
        for &id in bi_values {
            let Some((lo, hi)) = cells[id].candidates.as_pair() else {
                continue;
            };
            let lo_n = denial(&lookup, id, lo);
            let hi_n = denial(&lookup, id, hi);
            self.nodes[lo_n].edges.push(hi_n + self.half);
            self.nodes[hi_n].edges.push(lo_n + self.half);
        }

        // Weak implications, from every assertion node.
        for (id, cell) in cells.iter().enumerate() {
            for digit in cell.candidates {
                let cur = denial(&lookup, id, digit) + self.half;
                for other in cell.candidates {
                    if other != digit {
                        let target = denial(&lookup, id, other);
                        self.nodes[cur].edges.push(target);
                    }
                }
                for (other_id, other) in cells.iter().enumerate() {
                    if cell.pos.sees(other.pos) && other.candidates.contains(digit) {
                        let target = denial(&lookup, other_id, digit);
                        self.nodes[cur].edges.push(target);
                    }
                }
            }
        }
    }
}

/// Breadth-first chain search from `start`.
///
/// Relaxation inserts a node only when the new distance is strictly smaller
/// than the recorded one, and `limit` bounds the depth; when `process`
/// accepts an odd-distance node, the limit shrinks to that distance so later
/// starts short-circuit. `process` receives the hit node and the parent
/// table for chain reconstruction.
pub(crate) fn bfs_chain<P, F>(
    graph: &CandidateGraph,
    start: usize,
    limit: &mut usize,
    predicate: P,
    mut process: F,
) -> bool
where
    P: Fn(&CandidateGraph, usize, usize) -> bool,
    F: FnMut(usize, &[Option<usize>]) -> bool,
{
    let mut queue = std::collections::VecDeque::new();
    let mut dist = vec![usize::MAX; graph.len()];
    let mut parent: Vec<Option<usize>> = vec![None; graph.len()];
    let mut found = false;

    queue.push_back(start);
    dist[start] = 0;
    while let Some(head) = queue.pop_front() {
        if dist[head] >= limit.saturating_sub(1) {
            break;
        }
        for &next in &graph.node(head).edges {
            if !predicate(graph, head, next) {
                continue;
            }
            if dist[next] <= dist[head] + 1 {
                continue;
            }
            queue.push_back(next);
            parent[next] = Some(head);
            dist[next] = dist[head] + 1;
            if dist[next] % 2 == 1 && process(next, &parent) {
                *limit = dist[next];
                found = true;
                break;
            }
        }
        if found {
            break;
        }
    }
    found
}

/// Walks the parent table from `end` back to the search start, inclusive.
pub(crate) fn chain_to_start(parent: &[Option<usize>], end: usize) -> Vec<usize> {
    let mut chain = vec![end];
    let mut cur = end;
    while let Some(prev) = parent[cur] {
        chain.push(prev);
        cur = prev;
    }
    chain
}

/// Enumerates simple directed cycles by DFS with an in-stack marker, sorted
/// by length ascending. Collection stops at `max_cycles` collected cycles or
/// `max_steps` visited edges, which bounds the search on dense graphs
/// without changing which loop a caller emits first (shorter cycles are
/// found before the budget can run out on realistic grids).
pub(crate) fn enumerate_cycles(
    graph: &CandidateGraph,
    max_cycles: usize,
    max_steps: usize,
) -> Vec<Vec<usize>> {
    struct Search<'a> {
        graph: &'a CandidateGraph,
        in_stack: Vec<bool>,
        path: Vec<usize>,
        cycles: Vec<Vec<usize>>,
        max_cycles: usize,
        steps_left: usize,
    }

    impl Search<'_> {
        /// Returns `true` when a budget is exhausted and the whole
        /// enumeration should stop.
        fn dfs(&mut self, cur: usize, start: usize) -> bool {
            self.in_stack[cur] = true;
            self.path.push(cur);
            let mut exhausted = false;
            for i in 0..self.graph.node(cur).edges.len() {
                if self.steps_left == 0 {
                    exhausted = true;
                    break;
                }
                self.steps_left -= 1;
                let next = self.graph.node(cur).edges[i];
                if !self.in_stack[next] {
                    if self.dfs(next, start) {
                        exhausted = true;
                        break;
                    }
                } else if next == start && self.path.len() > 1 {
                    self.cycles.push(self.path.clone());
                    if self.cycles.len() >= self.max_cycles {
                        exhausted = true;
                        break;
                    }
                }
            }
            self.path.pop();
            self.in_stack[cur] = false;
            exhausted
        }
    }

    let mut search = Search {
        graph,
        in_stack: vec![false; graph.len()],
        path: Vec::new(),
        cycles: Vec::new(),
        max_cycles,
        steps_left: max_steps,
    };
    for start in 0..graph.len() {
        if search.dfs(start, start) {
            break;
        }
    }
    let mut cycles = search.cycles;
    cycles.sort_by_key(Vec::len);
    cycles
}


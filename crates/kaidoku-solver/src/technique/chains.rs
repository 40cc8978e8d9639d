//! Chain and loop searches over the candidate graph.

use kaidoku_core::{Digit, Position, encode};

use super::candidates_seeing_both;
use crate::{
    Step,
    graph::{bfs_chain, chain_to_start, enumerate_cycles},
    grid::Grid,
    step::{StepBuilder, opcode},
};

/// Upper bound on collected nice-loop cycles. Bounds memory on dense graphs
/// without changing which loop is emitted first.
const MAX_CYCLES: usize = 20_000;

/// Edge-visit budget for the nice-loop cycle enumeration.
const MAX_CYCLE_STEPS: usize = 4_000_000;

/// X-Chain: shortest alternating chain on a single digit; the digit leaves
/// every cell seeing both endpoints.
pub(crate) fn x_chain(grid: &Grid) -> Option<Step> {
    let graph = grid.graph();
    let mut limit = usize::MAX;
    let mut best: Option<(Vec<Position>, Vec<Position>, Digit)> = None;

    for start in 0..graph.half() {
        let digit = graph.node(start).digit;
        let head = graph.node(start).pos;
        bfs_chain(
            graph,
            start,
            &mut limit,
            |g, _, next| g.node(next).digit == digit,
            |next, parent| {
                let tail = graph.node(next).pos;
                let victims = candidates_seeing_both(grid, head, tail, digit);
                if victims.is_empty() {
                    return false;
                }
                let chain = chain_to_start(parent, next)
                    .into_iter()
                    .map(|node| graph.node(node).pos)
                    .collect();
                best = Some((chain, victims, digit));
                true
            },
        );
    }

    let (chain, victims, digit) = best?;
    let mut step = StepBuilder::new();
    step.push(opcode::X_CHAIN);
    #[expect(clippy::cast_possible_truncation)]
    step.push(chain.len() as u8);
    for pos in chain {
        step.push_pos(pos);
    }
    step.push_digit(digit);
    for victim in victims {
        step.add_exec(victim, digit);
    }
    Some(step.finish())
}

/// XY-Chain: a chain alternating through bi-value cells whose endpoints
/// share a digit; that digit leaves every cell seeing both endpoints.
pub(crate) fn xy_chain(grid: &Grid) -> Option<Step> {
    let graph = grid.graph();
    let mut limit = usize::MAX;
    let mut best: Option<(Vec<(Position, Digit)>, Vec<Position>, Digit)> = None;

    for start in 0..graph.half() {
        let start_node = graph.node(start);
        if grid.cell_at(start_node.pos).candidates().len() != 2 {
            continue;
        }
        let (head, digit) = (start_node.pos, start_node.digit);
        bfs_chain(
            graph,
            start,
            &mut limit,
            |g, h, next| {
                let from = g.node(h);
                let to = g.node(next);
                if from.asserted {
                    from.digit == to.digit
                } else {
                    from.pos == to.pos
                }
            },
            |next, parent| {
                let tail = graph.node(next);
                if tail.digit != digit {
                    return false;
                }
                let victims = candidates_seeing_both(grid, head, tail.pos, digit);
                if victims.is_empty() {
                    return false;
                }
                let chain = chain_to_start(parent, next)
                    .into_iter()
                    .map(|node| (graph.node(node).pos, graph.node(node).digit))
                    .collect();
                best = Some((chain, victims, digit));
                true
            },
        );
    }

    let (chain, victims, digit) = best?;
    let mut step = StepBuilder::new();
    step.push(opcode::XY_CHAIN);
    #[expect(clippy::cast_possible_truncation)]
    step.push(chain.len() as u8);
    for (pos, d) in chain {
        step.push_pos(pos);
        step.push_digit(d);
    }
    for victim in victims {
        step.add_exec(victim, digit);
    }
    Some(step.finish())
}

/// The two discontinuous AIC shapes.
enum AicKind {
    /// Endpoints share the digit and do not see each other.
    Type1,
    /// Endpoints differ in digit and see each other.
    Type2,
}

struct AicFinding {
    kind: AicKind,
    chain: Vec<(Position, Digit)>,
    executees: Vec<u16>,
}

/// AIC: breadth-first alternating-inference chains from every denial node;
/// among all findings the shortest chain wins, tie-broken by the larger
/// elimination set.
pub(crate) fn aic(grid: &Grid) -> Option<Step> {
    let graph = grid.graph();
    let mut limit = usize::MAX;
    let mut findings: Vec<AicFinding> = Vec::new();

    for start in 0..graph.half() {
        let head = graph.node(start);
        let (head_pos, head_digit) = (head.pos, head.digit);
        bfs_chain(
            graph,
            start,
            &mut limit,
            |_, _, _| true,
            |next, parent| {
                let tail = graph.node(next);
                let finding = if tail.digit == head_digit {
                    if head_pos.sees(tail.pos) {
                        // A closed shape; the nice loop handles it better.
                        return false;
                    }
                    let executees: Vec<u16> =
                        candidates_seeing_both(grid, head_pos, tail.pos, head_digit)
                            .into_iter()
                            .map(|pos| encode::exe(pos, head_digit))
                            .collect();
                    if executees.is_empty() {
                        return false;
                    }
                    (AicKind::Type1, executees)
                } else if head_pos.sees(tail.pos) {
                    let mut executees = Vec::new();
                    if grid.cell_at(head_pos).candidates().contains(tail.digit) {
                        executees.push(encode::exe(head_pos, tail.digit));
                    }
                    if grid.cell_at(tail.pos).candidates().contains(head_digit) {
                        executees.push(encode::exe(tail.pos, head_digit));
                    }
                    if executees.is_empty() {
                        return false;
                    }
                    (AicKind::Type2, executees)
                } else {
                    return false;
                };

                let chain = chain_to_start(parent, next)
                    .into_iter()
                    .map(|node| (graph.node(node).pos, graph.node(node).digit))
                    .collect();
                findings.push(AicFinding {
                    kind: finding.0,
                    chain,
                    executees: finding.1,
                });
                true
            },
        );
    }

    // Shortest chain wins; ties go to the larger elimination set, and the
    // earliest finding keeps its place on a full tie.
    let mut best: Option<&AicFinding> = None;
    for finding in &findings {
        let better = best.is_none_or(|b| {
            finding.chain.len() < b.chain.len()
                || (finding.chain.len() == b.chain.len()
                    && finding.executees.len() > b.executees.len())
        });
        if better {
            best = Some(finding);
        }
    }
    let best = best?;

    let mut step = StepBuilder::new();
    step.push(match best.kind {
        AicKind::Type1 => opcode::AIC,
        AicKind::Type2 => opcode::AIC + 1,
    });
    #[expect(clippy::cast_possible_truncation)]
    step.push(best.chain.len() as u8);
    for &(pos, digit) in &best.chain {
        step.push_pos(pos);
        step.push_digit(digit);
    }
    for &word in &best.executees {
        step.add_exec_word(word);
    }
    Some(step.finish())
}

/// Continuous nice loop: enumerate alternating cycles, shortest first, and
/// emit the first one whose weak links justify any elimination.
pub(crate) fn nice_loop(grid: &Grid) -> Option<Step> {
    let graph = grid.graph();
    for cycle in enumerate_cycles(graph, MAX_CYCLES, MAX_CYCLE_STEPS) {
        let mut step = StepBuilder::new();

        let mut eliminate_pair = |step: &mut StepBuilder, cur: usize, nxt: usize| {
            let cur = graph.node(cur);
            let nxt = graph.node(nxt);
            if cur.digit == nxt.digit {
                // Weak link between cells: the digit leaves everything that
                // sees both ends.
                for victim in candidates_seeing_both(grid, cur.pos, nxt.pos, cur.digit) {
                    step.add_exec(victim, cur.digit);
                }
            } else {
                // Weak link inside one cell: its other candidates leave.
                for digit in grid.cell_at(cur.pos).candidates() {
                    if digit != cur.digit && digit != nxt.digit {
                        step.add_exec(cur.pos, digit);
                    }
                }
            }
        };

        for i in (2..cycle.len()).step_by(2) {
            eliminate_pair(&mut step, cycle[i], cycle[i - 1]);
        }
        eliminate_pair(&mut step, cycle[0], cycle[cycle.len() - 1]);

        if !step.has_exec() {
            continue;
        }
        step.push(opcode::NICE_LOOP);
        #[expect(clippy::cast_possible_truncation)]
        step.push(cycle.len() as u8);
        for node in cycle {
            let node = graph.node(node);
            step.push_pos(node.pos);
            step.push_digit(node.digit);
        }
        return Some(step.finish());
    }
    None
}

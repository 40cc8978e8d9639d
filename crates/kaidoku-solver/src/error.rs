use derive_more::{Display, Error};

/// Errors surfaced by grid construction and the uniqueness checker.
///
/// Techniques themselves never fail: they either emit a step or pass, and
/// [`Grid::next_step`](crate::Grid::next_step) returns an empty buffer when
/// the whole library passes.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SolverError {
    /// The serialized pattern has the wrong length, an illegal character, or
    /// inconsistent candidate bytes.
    #[display("invalid pattern: {_0}")]
    InvalidPattern(#[error(not(source))] &'static str),

    /// The exact-cover search found no solution.
    #[display("puzzle has no solution")]
    NoSolution,

    /// The exact-cover search found a second solution. The first one found
    /// is attached so the generator can recover it.
    #[display("puzzle has multiple solutions")]
    MultipleSolutions {
        /// The first solution encountered, as an 81-character digit string.
        #[error(not(source))]
        first: String,
    },

    /// Construction-time consistency checks failed: a value contradicts the
    /// answer, an empty cell is missing its answer as a candidate, or a
    /// candidate conflicts with a placed value in its house.
    #[display("contradictory grid: {_0}")]
    Contradictory(#[error(not(source))] &'static str),
}

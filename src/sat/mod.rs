//! Crate `sat` exposes the uniform clause/assume/solve interface the
//! encoders and the k-search driver program against, independent of which
//! concrete solver backend services it (see `backend`).

pub mod backend;

use crate::types::Lit;

/// Model produced by a `Sat` result: `model[v]` is the truth value assigned
/// to variable `v` (1-based; index 0 unused).
pub type Model = Vec<bool>;

#[derive(Debug, Clone)]
pub enum SolveResult {
    Sat(Model),
    /// An optional unsat core, when the backend tracks one.
    Unsat(Option<Vec<Lit>>),
    Unknown,
}

/// What an [`ExternalPropagator`] hands back from [`ExternalPropagator::propagate`].
pub enum PropagatorOutcome {
    /// No new information this round.
    None,
    /// `lit` is forced; `reason` is the clause that justifies it (including
    /// `lit` itself), e.g. `[-a, -b, lit]` for a 3-literal reason.
    Implied { lit: Lit, reason: Vec<Lit> },
    /// The current trail is inconsistent; `clause` is a conflict clause
    /// that is already falsified under the current assignment.
    Conflict { clause: Vec<Lit> },
}

/// Callback surface an external propagator (the Zykov encoding's
/// contraction state machine) implements to hook into the backend's trail.
pub trait ExternalPropagator {
    /// `lit` was just pushed onto the trail at decision level `level`.
    fn on_assign(&mut self, lit: Lit, level: usize);
    /// The solver is backjumping; undo every `on_assign` recorded at a
    /// level strictly greater than `level_up_to`.
    fn on_unassign(&mut self, level_up_to: usize);
    /// Consulted after every unit-propagation fixpoint, until it reports
    /// [`PropagatorOutcome::None`].
    fn propagate(&mut self) -> PropagatorOutcome;
    /// Consulted before the solver's own decision heuristic; returning
    /// `Some(lit)` overrides the built-in choice for this decision.
    fn decide(&mut self) -> Option<Lit>;
}

/// Uniform interface over incremental and non-incremental SAT backends.
///
/// Variables are 1-based nonzero signed integers, exactly as in DIMACS.
/// `assume` only pins a literal for the *next* `solve()` call.
pub trait SatAdaptor {
    /// Allocates `n` fresh variables, returning the id of the first one.
    fn new_vars(&mut self, n: usize) -> Lit;
    fn add_clause(&mut self, lits: &[Lit]);
    fn assume(&mut self, lits: &[Lit]);
    fn solve(&mut self) -> SolveResult;
    /// Attaches an external propagator. Only the incremental backend
    /// supports this; see [`crate::config::Config::validate`].
    fn connect_propagator(&mut self, propagator: Box<dyn ExternalPropagator>);
    /// Drops all clauses and the attached propagator so the adaptor can be
    /// reused for an unrelated instance (required between k values on a
    /// non-incremental backend).
    fn reset(&mut self);
    fn num_vars(&self) -> usize;
}

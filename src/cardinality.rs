//! Totalizer-style at-most-k cardinality encoding over an indicator literal
//! set, built once per bound sequence and then only ever grown: moving the
//! bound from `k` to `k+1` activates one more unit clause instead of
//! rebuilding any part of the merge tree.
//!
//! `remove-cj`-style pruning (dropping indicator literals preprocessing has
//! already forced false) is the caller's job: filter the slice handed to
//! [`Totalizer::build`] before calling it.

use crate::sat::SatAdaptor;
use crate::types::Lit;

/// A balanced-tree unary counter: `output[i]` (0-indexed) is true iff at
/// least `i + 1` of the original input literals are true.
pub struct Totalizer {
    output: Vec<Lit>,
    /// `bound_lit[k]` is the activation literal enforcing `sum <= k`, built
    /// lazily the first time that bound is requested.
    bound_lit: Vec<Option<Lit>>,
}

impl Totalizer {
    /// Builds the merge tree over `inputs`, allocating auxiliary variables
    /// on `solver` as needed. `inputs` must be nonempty.
    pub fn build(solver: &mut dyn SatAdaptor, inputs: &[Lit]) -> Totalizer {
        assert!(!inputs.is_empty(), "totalizer needs at least one input literal");
        let output = build_node(solver, inputs);
        Totalizer {
            bound_lit: vec![None; output.len() + 1],
            output,
        }
    }

    /// Number of input literals the counter was built over.
    pub fn capacity(&self) -> usize {
        self.output.len()
    }

    /// Activation literal that, when asserted true, forces `sum <= k`.
    /// Returns `None` when `k` already exceeds the input count, i.e. the
    /// bound is vacuously true and no assumption is needed.
    pub fn activate_bound(&mut self, solver: &mut dyn SatAdaptor, k: usize) -> Option<Lit> {
        if k >= self.output.len() {
            return None;
        }
        if let Some(lit) = self.bound_lit[k] {
            return Some(lit);
        }
        let act = solver.new_vars(1);
        // act -> not(output[k]), i.e. act forbids "at least k+1 true".
        solver.add_clause(&[-act, -self.output[k]]);
        self.bound_lit[k] = Some(act);
        Some(act)
    }
}

fn build_node(solver: &mut dyn SatAdaptor, inputs: &[Lit]) -> Vec<Lit> {
    if inputs.len() == 1 {
        return vec![inputs[0]];
    }
    let mid = inputs.len() / 2;
    let left = build_node(solver, &inputs[..mid]);
    let right = build_node(solver, &inputs[mid..]);
    merge(solver, &left, &right)
}

/// Standard totalizer merge: `left` has `p` outputs, `right` has `q`, the
/// result has `p + q`. Treats `left[-1]`/`right[-1]` as an implicit
/// always-true literal at index 0 and an implicit always-false literal past
/// the end, per the usual totalizer clause derivation.
fn merge(solver: &mut dyn SatAdaptor, left: &[Lit], right: &[Lit]) -> Vec<Lit> {
    let p = left.len();
    let q = right.len();
    let first = solver.new_vars(p + q);
    let out: Vec<Lit> = (0..p + q).map(|i| first + i as Lit).collect();

    // "at least": a_i & b_j -> c_r, with a_0/b_0 the implicit always-true
    // literal dropped from the antecedent (i, j range over 1..=p, 1..=q so
    // a_i/b_j always resolve to a real literal here).
    for i in 0..=p {
        for j in 0..=q {
            if i == 0 && j == 0 {
                continue;
            }
            let mut clause = Vec::with_capacity(3);
            if i > 0 {
                clause.push(-left[i - 1]);
            }
            if j > 0 {
                clause.push(-right[j - 1]);
            }
            clause.push(out[i + j - 1]);
            solver.add_clause(&clause);
        }
    }

    // "at most": c_r -> a_{i+1} | b_{j+1}, dropping a consequent when it
    // would be the implicit always-false literal past the end of its side.
    for i in 0..=p {
        for j in 0..=q {
            if i == p && j == q {
                continue;
            }
            let mut clause = vec![-out[i + j]];
            if i < p {
                clause.push(left[i]);
            }
            if j < q {
                clause.push(right[j]);
            }
            solver.add_clause(&clause);
        }
    }

    out
}

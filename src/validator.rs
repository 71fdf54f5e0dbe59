//! Post-solve sanity checks: does the decoded coloring actually respect the
//! graph, and does re-asserting it as unit assumptions stay satisfiable.

use crate::error::{CoreError, CoreResult};
use crate::graph::Graph;
use crate::sat::{SatAdaptor, SolveResult};
use crate::types::Lit;

/// Checks `coloring` uses only `0..k` and is proper on `graph`.
pub fn validate_coloring(graph: &Graph, coloring: &[usize], k: usize) -> CoreResult<()> {
    if coloring.len() != graph.num_vertices() {
        return Err(CoreError::Invariant(format!(
            "coloring has {} entries for a {}-vertex graph",
            coloring.len(),
            graph.num_vertices()
        )));
    }
    if let Some(&bad) = coloring.iter().find(|&&c| c >= k) {
        return Err(CoreError::Invariant(format!(
            "coloring uses color {bad} outside the 0..{k} budget"
        )));
    }
    if !graph.is_proper_coloring(coloring) {
        return Err(CoreError::Invariant(
            "decoded coloring assigns the same color to adjacent vertices".into(),
        ));
    }
    Ok(())
}

/// Re-solves with the decoded model pinned as unit assumptions, confirming
/// the SAT call that produced it was internally consistent.
pub fn round_trip_sat(solver: &mut dyn SatAdaptor, decision_lits: &[Lit]) -> CoreResult<()> {
    solver.assume(decision_lits);
    match solver.solve() {
        SolveResult::Sat(_) => Ok(()),
        _ => Err(CoreError::Invariant(
            "re-asserting the decoded model as assumptions made the instance unsatisfiable".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encodings::assignment::AssignmentEncoder;
    use crate::encodings::Encoder;
    use crate::sat::backend::CdclSolver;

    #[test]
    fn proper_coloring_of_k3_validates() {
        let g = Graph::from_edges(3, &[(0, 1), (0, 2), (1, 2)]);
        assert!(validate_coloring(&g, &[0, 1, 2], 3).is_ok());
    }

    #[test]
    fn repeated_color_on_an_edge_is_rejected() {
        let g = Graph::from_edges(2, &[(0, 1)]);
        assert!(validate_coloring(&g, &[0, 0], 2).is_err());
    }

    #[test]
    fn color_outside_budget_is_rejected() {
        let g = Graph::from_edges(2, &[(0, 1)]);
        assert!(validate_coloring(&g, &[0, 5], 6).is_err());
    }

    #[test]
    fn round_trip_sat_holds_for_assignment_encoding() {
        let g = Graph::from_edges(3, &[(0, 1), (1, 2)]);
        let mut enc = AssignmentEncoder::default();
        let mut s = CdclSolver::new();
        let vars = enc.encode(&mut s, &g, 2, &[]);
        let model = match s.solve() {
            crate::sat::SolveResult::Sat(m) => m,
            _ => panic!("path graph is 2-colorable"),
        };
        let decision_lits: Vec<Lit> = vars.iter().map(|&v| if model[v as usize] { v } else { -v }).collect();
        assert!(round_trip_sat(&mut s, &decision_lits).is_ok());
    }
}

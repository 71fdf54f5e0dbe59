//! Partial-order encoding: `y[v][i]` means "vertex v's color is <= i", for
//! `i` in `0..k-1` (the top level `k-1` is always true and carries no
//! literal). Monotonicity clauses keep the `y`s a genuine order; an edge
//! clause per color level forbids both endpoints landing on exactly that
//! level.
//!
//! Like [`super::assignment::AssignmentEncoder`], this needs a freshly
//! reset solver: `y[v][i] = v * (k - 1) + i + 1`, with `k <= 1` producing no
//! `y` variables at all (every edge then yields an empty, immediately
//! unsatisfiable clause, which is the correct answer: no graph with an edge
//! is 1-colorable).

use crate::graph::Graph;
use crate::sat::{Model, SatAdaptor};
use crate::types::Lit;

use super::Encoder;

#[derive(Debug, Clone, Copy, Default)]
pub struct PartialOrderEncoder;

fn width(k: usize) -> usize {
    k.saturating_sub(1)
}

/// `y[v][i]` for `i in 0..k-1`; `None` past the stored range (`i == k-1`
/// reads as the implicit always-true top level).
fn y(v: usize, i: usize, k: usize) -> Option<Lit> {
    if i < width(k) {
        Some((v * width(k) + i + 1) as Lit)
    } else {
        None
    }
}

impl Encoder for PartialOrderEncoder {
    fn encode(&mut self, solver: &mut dyn SatAdaptor, graph: &Graph, k: usize, seed_clique: &[usize]) -> Vec<Lit> {
        let n = graph.num_vertices();
        let w = width(k);
        if w > 0 {
            let first = solver.new_vars(n * w);
            debug_assert_eq!(first, 1, "PartialOrderEncoder requires a freshly reset solver");
        }

        for v in 0..n {
            for i in 0..w.saturating_sub(1) {
                // y[v][i] -> y[v][i+1]
                solver.add_clause(&[-y(v, i, k).unwrap(), y(v, i + 1, k).unwrap()]);
            }
        }

        for (u, v) in graph.edges() {
            for i in 0..k {
                let mut clause = Vec::with_capacity(4);
                if i > 0 {
                    clause.push(y(u, i - 1, k).unwrap());
                    clause.push(y(v, i - 1, k).unwrap());
                }
                if let Some(l) = y(u, i, k) {
                    clause.push(-l);
                }
                if let Some(l) = y(v, i, k) {
                    clause.push(-l);
                }
                solver.add_clause(&clause);
            }
        }

        // Symmetry breaking: the i-th seed-clique vertex's color is pinned
        // to exactly `i` by forcing y[v][i..] true and y[v][..i] false.
        for (i, &v) in seed_clique.iter().enumerate().take(k) {
            if let Some(l) = y(v, i, k) {
                solver.add_clause(&[l]);
            }
            if i > 0 {
                if let Some(l) = y(v, i - 1, k) {
                    solver.add_clause(&[-l]);
                }
            }
        }

        (0..n * w).map(|i| (i + 1) as Lit).collect()
    }

    fn decode(&self, model: &Model, graph: &Graph, k: usize) -> Vec<usize> {
        let n = graph.num_vertices();
        (0..n)
            .map(|v| {
                (0..k)
                    .find(|&i| y(v, i, k).map_or(true, |l| model[l as usize]))
                    .expect("the implicit top level is always true")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::backend::CdclSolver;
    use crate::sat::SolveResult;

    #[test]
    fn single_edge_is_not_one_colorable() {
        let g = Graph::from_edges(2, &[(0, 1)]);
        let mut enc = PartialOrderEncoder;
        let mut s = CdclSolver::new();
        enc.encode(&mut s, &g, 1, &[]);
        assert!(matches!(s.solve(), SolveResult::Unsat(_)));
    }

    #[test]
    fn single_edge_is_two_colorable() {
        let g = Graph::from_edges(2, &[(0, 1)]);
        let mut enc = PartialOrderEncoder;
        let mut s = CdclSolver::new();
        enc.encode(&mut s, &g, 2, &[]);
        match s.solve() {
            SolveResult::Sat(model) => {
                let coloring = enc.decode(&model, &g, 2);
                assert!(g.is_proper_coloring(&coloring));
            }
            _ => panic!("a single edge is always 2-colorable"),
        }
    }

    #[test]
    fn c5_needs_three_colors() {
        let g = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        let mut enc = PartialOrderEncoder;

        let mut s2 = CdclSolver::new();
        enc.encode(&mut s2, &g, 2, &[]);
        assert!(matches!(s2.solve(), SolveResult::Unsat(_)));

        let mut s3 = CdclSolver::new();
        enc.encode(&mut s3, &g, 3, &[]);
        match s3.solve() {
            SolveResult::Sat(model) => {
                let coloring = enc.decode(&model, &g, 3);
                assert!(g.is_proper_coloring(&coloring));
            }
            _ => panic!("C5 is 3-colorable"),
        }
    }

    #[test]
    fn seed_clique_is_pinned_to_canonical_colors() {
        let g = Graph::from_edges(3, &[(0, 1), (0, 2), (1, 2)]);
        let mut enc = PartialOrderEncoder;
        let mut s = CdclSolver::new();
        enc.encode(&mut s, &g, 3, &[0, 1, 2]);
        match s.solve() {
            SolveResult::Sat(model) => {
                let coloring = enc.decode(&model, &g, 3);
                assert_eq!(coloring, vec![0, 1, 2]);
            }
            _ => panic!("K3 is 3-colorable"),
        }
    }
}

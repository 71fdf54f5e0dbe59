//! Assignment encoding: one indicator `x[v][c]` per (vertex, color) pair.
//!
//! Requires a freshly reset solver: variable ids are derived directly from
//! `(vertex, color)` rather than threaded through from `new_vars`'s return
//! value, so `x[v][c] = v * k + c + 1`.

use crate::graph::Graph;
use crate::sat::{Model, SatAdaptor};
use crate::types::Lit;

use super::Encoder;

#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentEncoder {
    /// Adds pairwise at-most-one clauses per vertex. Off by default since
    /// the per-edge conflict clauses already make extra true colors on one
    /// vertex harmless for decoding; turning it on trades more clauses for
    /// a tighter search space.
    pub amo: bool,
}

fn var(v: usize, c: usize, k: usize) -> Lit {
    (v * k + c + 1) as Lit
}

impl Encoder for AssignmentEncoder {
    fn encode(&mut self, solver: &mut dyn SatAdaptor, graph: &Graph, k: usize, seed_clique: &[usize]) -> Vec<Lit> {
        let n = graph.num_vertices();
        let first = solver.new_vars(n * k);
        debug_assert_eq!(first, 1, "AssignmentEncoder requires a freshly reset solver");

        for v in 0..n {
            let clause: Vec<Lit> = (0..k).map(|c| var(v, c, k)).collect();
            solver.add_clause(&clause);
            if self.amo {
                for c1 in 0..k {
                    for c2 in (c1 + 1)..k {
                        solver.add_clause(&[-var(v, c1, k), -var(v, c2, k)]);
                    }
                }
            }
        }

        for (u, v) in graph.edges() {
            for c in 0..k {
                solver.add_clause(&[-var(u, c, k), -var(v, c, k)]);
            }
        }

        // Symmetry breaking: pin the i-th seed-clique vertex to color i.
        for (i, &v) in seed_clique.iter().enumerate().take(k) {
            solver.add_clause(&[var(v, i, k)]);
        }

        (0..n * k).map(|i| (i + 1) as Lit).collect()
    }

    fn decode(&self, model: &Model, graph: &Graph, k: usize) -> Vec<usize> {
        let n = graph.num_vertices();
        let mut coloring = vec![0usize; n];
        for v in 0..n {
            coloring[v] = (0..k)
                .find(|&c| model[var(v, c, k) as usize])
                .expect("at-least-one clause guarantees every vertex has a color");
        }
        coloring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::backend::CdclSolver;
    use crate::sat::SolveResult;

    #[test]
    fn k4_needs_four_colors() {
        let g = Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        let mut enc = AssignmentEncoder::default();

        let mut s3 = CdclSolver::new();
        enc.encode(&mut s3, &g, 3, &[]);
        assert!(matches!(s3.solve(), SolveResult::Unsat(_)));

        let mut s4 = CdclSolver::new();
        enc.encode(&mut s4, &g, 4, &[]);
        match s4.solve() {
            SolveResult::Sat(model) => {
                let coloring = enc.decode(&model, &g, 4);
                assert!(g.is_proper_coloring(&coloring));
            }
            _ => panic!("K4 is 4-colorable"),
        }
    }

    #[test]
    fn k33_is_two_colorable() {
        let mut edges = vec![];
        for u in 0..3 {
            for v in 3..6 {
                edges.push((u, v));
            }
        }
        let g = Graph::from_edges(6, &edges);
        let mut enc = AssignmentEncoder { amo: true };
        let mut s = CdclSolver::new();
        enc.encode(&mut s, &g, 2, &[]);
        match s.solve() {
            SolveResult::Sat(model) => {
                let coloring = enc.decode(&model, &g, 2);
                assert!(g.is_proper_coloring(&coloring));
            }
            _ => panic!("K3,3 is bipartite"),
        }

        let mut s1 = CdclSolver::new();
        enc.encode(&mut s1, &g, 1, &[]);
        assert!(matches!(s1.solve(), SolveResult::Unsat(_)));
    }

    #[test]
    fn seed_clique_pins_canonical_colors() {
        let g = Graph::from_edges(3, &[(0, 1), (0, 2), (1, 2)]);
        let mut enc = AssignmentEncoder::default();
        let mut s = CdclSolver::new();
        enc.encode(&mut s, &g, 3, &[0, 1, 2]);
        match s.solve() {
            SolveResult::Sat(model) => {
                let coloring = enc.decode(&model, &g, 3);
                assert_eq!(coloring[0], 0);
                assert_eq!(coloring[1], 1);
                assert_eq!(coloring[2], 2);
            }
            _ => panic!("K3 is 3-colorable"),
        }
    }
}

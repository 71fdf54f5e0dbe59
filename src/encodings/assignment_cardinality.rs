//! Assignment encoding over a fixed palette of `ub` colors, paired with a
//! [`crate::cardinality::Totalizer`] over one "color `c` is used by some
//! vertex" indicator per palette entry. Unlike [`super::assignment`] and
//! [`super::partial_order`], whose variable layouts are keyed by `k` and so
//! need a fresh solver every attempt, this encoder is built exactly once:
//! moving the search from `k` to `k +/- 1` only asks the totalizer to
//! activate a different bound literal, reusing every clause (and every
//! clause the backend has learned) across the whole k-search.

use crate::cardinality::Totalizer;
use crate::graph::Graph;
use crate::sat::{Model, SatAdaptor};
use crate::types::Lit;

pub struct AssignmentCardinalityEncoder {
    ub: usize,
    x: Vec<Lit>,
    totalizer: Totalizer,
}

impl AssignmentCardinalityEncoder {
    /// Builds the fixed-palette assignment clauses plus the totalizer over
    /// `used[c]` once, on `solver`. `ub` is the number of colors in the
    /// palette (every `k` ever attempted through this encoder must be `<=
    /// ub`); `seed_clique` pins the first `ub` seed-clique vertices to their
    /// index for symmetry breaking, same as the per-k encoders.
    pub fn build(solver: &mut dyn SatAdaptor, graph: &Graph, ub: usize, seed_clique: &[usize]) -> AssignmentCardinalityEncoder {
        assert!(ub > 0, "a nonempty graph needs at least one color in the palette");
        let n = graph.num_vertices();
        let first = solver.new_vars(n * ub);
        let x: Vec<Lit> = (0..n * ub).map(|i| first + i as Lit).collect();
        let xv = |x: &[Lit], v: usize, c: usize| x[v * ub + c];

        for v in 0..n {
            let clause: Vec<Lit> = (0..ub).map(|c| xv(&x, v, c)).collect();
            solver.add_clause(&clause);
        }

        for (u, v) in graph.edges() {
            for c in 0..ub {
                solver.add_clause(&[-xv(&x, u, c), -xv(&x, v, c)]);
            }
        }

        for (i, &v) in seed_clique.iter().enumerate().take(ub) {
            solver.add_clause(&[xv(&x, v, i)]);
        }

        let used_first = solver.new_vars(ub);
        let used: Vec<Lit> = (0..ub).map(|i| used_first + i as Lit).collect();
        for c in 0..ub {
            for v in 0..n {
                solver.add_clause(&[-xv(&x, v, c), used[c]]);
            }
        }

        let totalizer = Totalizer::build(solver, &used);
        AssignmentCardinalityEncoder { ub, x, totalizer }
    }

    /// Activation literal that, when assumed, forces at most `k` of the
    /// palette's colors to be used. `None` when `k >= ub`, i.e. the bound is
    /// vacuously true and nothing needs assuming.
    pub fn activate_bound(&mut self, solver: &mut dyn SatAdaptor, k: usize) -> Option<Lit> {
        self.totalizer.activate_bound(solver, k)
    }

    pub fn decode(&self, model: &Model, graph: &Graph) -> Vec<usize> {
        let n = graph.num_vertices();
        (0..n)
            .map(|v| {
                (0..self.ub)
                    .find(|&c| model[self.x[v * self.ub + c] as usize])
                    .expect("at-least-one clause guarantees every vertex has a color")
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
    fn k4_needs_four_of_a_five_color_palette() {
        let g = Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        let mut s = CdclSolver::new();
        let mut enc = AssignmentCardinalityEncoder::build(&mut s, &g, 5, &[]);

        let act3 = enc.activate_bound(&mut s, 3).unwrap();
        s.assume(&[act3]);
        assert!(matches!(s.solve(), SolveResult::Unsat(_)));

        let act4 = enc.activate_bound(&mut s, 4).unwrap();
        s.assume(&[act4]);
        match s.solve() {
            SolveResult::Sat(model) => {
                let coloring = enc.decode(&model, &g);
                assert!(g.is_proper_coloring(&coloring));
            }
            _ => panic!("K4 is 4-colorable out of a 5-color palette"),
        }
    }

    #[test]
    fn raising_the_bound_again_keeps_learned_clauses() {
        let g = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        let mut s = CdclSolver::new();
        let mut enc = AssignmentCardinalityEncoder::build(&mut s, &g, 5, &[]);

        let act2 = enc.activate_bound(&mut s, 2).unwrap();
        s.assume(&[act2]);
        assert!(matches!(s.solve(), SolveResult::Unsat(_)));

        // Same solver, same clause database, just a different activation
        // literal assumed -- no re-encoding happens between these calls.
        let act3 = enc.activate_bound(&mut s, 3).unwrap();
        s.assume(&[act3]);
        match s.solve() {
            SolveResult::Sat(model) => {
                let coloring = enc.decode(&model, &g);
                assert!(g.is_proper_coloring(&coloring));
            }
            _ => panic!("C5 is 3-colorable"),
        }
    }

    #[test]
    fn bound_at_or_above_the_palette_size_is_vacuous() {
        let g = Graph::from_edges(2, &[(0, 1)]);
        let mut s = CdclSolver::new();
        let mut enc = AssignmentCardinalityEncoder::build(&mut s, &g, 2, &[]);
        assert!(enc.activate_bound(&mut s, 2).is_none());
    }
}

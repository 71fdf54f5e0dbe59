//! Crate `graph` provides the bit-vector adjacency model.
//!
//! Vertices are `0..n`; adjacency is stored as `n` bit-vectors of width `n`,
//! kept symmetric with no self-loops by construction.

use bitvec::prelude::*;

#[derive(Debug, Clone)]
pub struct Graph {
    n: usize,
    rows: Vec<BitVec>,
}

impl Graph {
    pub fn new(n: usize) -> Graph {
        Graph {
            n,
            rows: vec![bitvec![0; n]; n],
        }
    }

    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Graph {
        let mut g = Graph::new(n);
        for &(u, v) in edges {
            g.add_edge(u, v);
        }
        g
    }

    pub fn num_vertices(&self) -> usize {
        self.n
    }

    pub fn num_edges(&self) -> usize {
        self.rows.iter().map(|r| r.count_ones()).sum::<usize>() / 2
    }

    pub fn add_edge(&mut self, u: usize, v: usize) {
        if u == v {
            return;
        }
        self.rows[u].set(v, true);
        self.rows[v].set(u, true);
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.rows[u][v]
    }

    pub fn neighbors(&self, v: usize) -> &BitSlice {
        &self.rows[v]
    }

    pub fn degree(&self, v: usize) -> usize {
        self.rows[v].count_ones()
    }

    pub fn vertices(&self) -> impl Iterator<Item = usize> {
        0..self.n
    }

    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(self.num_edges());
        for u in 0..self.n {
            for v in self.rows[u].iter_ones() {
                if v > u {
                    out.push((u, v));
                }
            }
        }
        out
    }

    /// The complement graph Ḡ, used by the MNTS clique search (maximum
    /// weight clique on Ḡ = maximum weight independent set on G).
    pub fn complement(&self) -> Graph {
        let mut comp = Graph::new(self.n);
        for u in 0..self.n {
            let mut row = !self.rows[u].clone();
            row.set(u, false);
            comp.rows[u] = row;
        }
        comp
    }

    /// `true` iff `set` is pairwise non-adjacent, i.e. an independent set.
    pub fn is_independent_set(&self, set: &[usize]) -> bool {
        for (i, &u) in set.iter().enumerate() {
            for &v in &set[i + 1..] {
                if self.has_edge(u, v) {
                    return false;
                }
            }
        }
        true
    }

    /// `true` iff `set` is pairwise adjacent, i.e. a clique.
    pub fn is_clique(&self, set: &[usize]) -> bool {
        for (i, &u) in set.iter().enumerate() {
            for &v in &set[i + 1..] {
                if !self.has_edge(u, v) {
                    return false;
                }
            }
        }
        true
    }

    pub fn is_proper_coloring(&self, coloring: &[usize]) -> bool {
        if coloring.len() != self.n {
            return false;
        }
        for (u, v) in self.edges() {
            if coloring[u] == coloring[v] {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k4() -> Graph {
        Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)])
    }

    #[test]
    fn edges_are_symmetric() {
        let g = k4();
        for u in 0..4 {
            for v in 0..4 {
                assert_eq!(g.has_edge(u, v), g.has_edge(v, u));
            }
        }
    }

    #[test]
    fn no_self_loops() {
        let g = Graph::from_edges(3, &[(0, 0), (0, 1)]);
        assert!(!g.has_edge(0, 0));
        assert_eq!(g.num_edges(), 1);
    }

    #[test]
    fn complement_of_k4_is_empty() {
        let comp = k4().complement();
        assert_eq!(comp.num_edges(), 0);
    }

    #[test]
    fn degree_matches_neighbor_count() {
        let g = k4();
        for v in 0..4 {
            assert_eq!(g.degree(v), 3);
            assert_eq!(g.neighbors(v).count_ones(), 3);
        }
    }

    #[test]
    fn clique_and_independent_set_checks() {
        let g = k4();
        assert!(g.is_clique(&[0, 1, 2, 3]));
        assert!(!g.is_independent_set(&[0, 1]));
        let comp = g.complement();
        assert!(comp.is_independent_set(&[0, 1, 2, 3]));
    }
}

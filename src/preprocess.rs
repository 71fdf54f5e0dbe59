//! Crate `preprocess` removes dominated/low-degree vertices and computes a
//! seed clique used for symmetry breaking in every encoding.

use std::collections::HashMap;

use crate::graph::Graph;

/// Result of preprocessing: the graph the encoders actually see, the
/// mapping back to original vertex ids, and a seed clique (indices into the
/// *reduced* graph) for symmetry breaking.
pub struct Preprocessed {
    pub graph: Graph,
    /// `original_id[v]` is the id of reduced vertex `v` in the input graph.
    pub original_id: Vec<usize>,
    pub seed_clique: Vec<usize>,
    /// `(removed_original_id, dominator_original_id)` pairs, in removal
    /// order, letting a caller reconstruct a full-graph coloring by giving
    /// each removed vertex its dominator's color.
    pub removed: Vec<(usize, usize)>,
}

/// `N(v) ⊆ N(u) ∪ {u}`: any proper coloring can be transformed to color `v`
/// the same as `u`, so `v` is safe to fold into `u` before solving and
/// restore afterwards.
pub(crate) fn is_dominated(g: &Graph, v: usize, u: usize) -> bool {
    if v == u || g.has_edge(u, v) {
        return false;
    }
    g.neighbors(v).iter_ones().all(|w| w == u || g.has_edge(u, w))
}

/// Greedily picks a clique to seed symmetry-breaking constraints: repeatedly
/// extend the current clique with the remaining vertex of highest degree
/// into the clique-so-far.
fn greedy_seed_clique(g: &Graph) -> Vec<usize> {
    let n = g.num_vertices();
    if n == 0 {
        return vec![];
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&v| std::cmp::Reverse(g.degree(v)));

    let mut clique = vec![order[0]];
    for &cand in &order[1..] {
        if clique.iter().all(|&q| g.has_edge(cand, q)) {
            clique.push(cand);
        }
    }
    clique
}

/// Removes vertices dominated by another active vertex, one pass at a time,
/// until no further reduction applies. Never removes every vertex of a
/// maximal clique component (each removal strictly needs a dominator that
/// remains active), which keeps disjoint dense components such as K5 intact.
fn remove_dominated(g: &Graph) -> (Graph, Vec<usize>, Vec<(usize, usize)>) {
    let n = g.num_vertices();
    let mut active: Vec<usize> = (0..n).collect();
    let mut removed = Vec::new();

    loop {
        let mut removed_one = false;
        'search: for (i, &v) in active.iter().enumerate() {
            for &u in active.iter() {
                if v != u && is_dominated(g, v, u) {
                    removed.push((v, u));
                    active.remove(i);
                    removed_one = true;
                    break 'search;
                }
            }
        }
        if !removed_one {
            break;
        }
    }

    let mut reduced = Graph::new(active.len());
    for (i, &u) in active.iter().enumerate() {
        for (j, &v) in active.iter().enumerate() {
            if j > i && g.has_edge(u, v) {
                reduced.add_edge(i, j);
            }
        }
    }
    (reduced, active, removed)
}

/// Runs preprocessing per the toggles in [`crate::config::Config`]. With
/// `graph_reduction` off, the graph passes through unchanged. Either way a
/// seed clique is computed when `seed_clique_ordering` is set.
pub fn preprocess(
    g: &Graph,
    graph_reduction: bool,
    seed_clique_ordering: bool,
) -> Preprocessed {
    let (reduced, original_id, removed) = if graph_reduction {
        remove_dominated(g)
    } else {
        (g.clone(), (0..g.num_vertices()).collect(), Vec::new())
    };

    let seed_clique = if seed_clique_ordering {
        greedy_seed_clique(&reduced)
    } else {
        vec![]
    };

    Preprocessed {
        graph: reduced,
        original_id,
        seed_clique,
        removed,
    }
}

/// Reconstructs a coloring of the full, pre-reduction graph from a coloring
/// of `pre.graph`, giving each removed vertex its dominator's color
/// (following the dominator chain when a dominator was itself removed).
pub fn expand_coloring(pre: &Preprocessed, reduced_coloring: &[usize]) -> Vec<usize> {
    let reduced_idx_of: HashMap<usize, usize> = pre
        .original_id
        .iter()
        .enumerate()
        .map(|(i, &orig)| (orig, i))
        .collect();
    let dominator_of: HashMap<usize, usize> = pre.removed.iter().copied().collect();
    let n = pre.original_id.len() + pre.removed.len();

    (0..n)
        .map(|orig| {
            let mut cur = orig;
            while !reduced_idx_of.contains_key(&cur) {
                cur = *dominator_of
                    .get(&cur)
                    .expect("every removed vertex has a recorded dominator");
            }
            reduced_coloring[reduced_idx_of[&cur]]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_clique_is_actually_a_clique() {
        let g = Graph::from_edges(5, &[(0, 1), (0, 2), (1, 2), (2, 3), (3, 4)]);
        let clique = greedy_seed_clique(&g);
        assert!(g.is_clique(&clique));
        assert!(clique.len() >= 2);
    }

    #[test]
    fn disconnected_k3_and_k5_keeps_all_of_k5() {
        // K3 on {0,1,2}, K5 on {3,4,5,6,7}, disjoint.
        let mut edges = vec![(0, 1), (0, 2), (1, 2)];
        for u in 3..8 {
            for v in (u + 1)..8 {
                edges.push((u, v));
            }
        }
        let g = Graph::from_edges(8, &edges);
        let pre = preprocess(&g, true, true);
        let k5_survivors: usize = pre
            .original_id
            .iter()
            .filter(|&&orig| orig >= 3)
            .count();
        assert_eq!(k5_survivors, 5, "no K5 vertex may be removed by reduction");
    }

    #[test]
    fn dominated_pendant_vertex_is_removed() {
        // Vertex 3 is adjacent only to 0, and N(3) = {0} subset N(0) u {0}.
        let g = Graph::from_edges(4, &[(0, 1), (0, 2), (1, 2), (0, 3)]);
        let pre = preprocess(&g, true, false);
        assert!(pre.graph.num_vertices() < g.num_vertices());
        assert!(!pre.original_id.contains(&3) || pre.graph.num_vertices() == 4);
    }

    #[test]
    fn expand_coloring_gives_dominated_vertex_its_dominators_color() {
        let g = Graph::from_edges(4, &[(0, 1), (0, 2), (1, 2), (0, 3)]);
        let pre = preprocess(&g, true, false);
        let reduced_coloring: Vec<usize> = (0..pre.graph.num_vertices()).collect();
        let full = expand_coloring(&pre, &reduced_coloring);
        assert_eq!(full.len(), 4);
        assert!(g.is_proper_coloring(&full));
    }

    #[test]
    fn reduction_off_is_identity() {
        let g = Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3)]);
        let pre = preprocess(&g, false, false);
        assert_eq!(pre.graph.num_vertices(), g.num_vertices());
        assert_eq!(pre.original_id, vec![0, 1, 2, 3]);
    }
}

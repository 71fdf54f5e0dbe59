//! Union-find over vertex contractions plus the induced-edge relation the
//! propagator needs to decide whether a requested merge is legal.
//!
//! No path compression: every `union` is reversible in O(1) by recording
//! the previous parent pointer, which is what lets [`ZykovState`] replay
//! backtracking exactly the way the backend's trail does.

pub mod propagator;

use bitvec::prelude::*;

use crate::graph::Graph;

#[derive(Debug, Clone)]
pub struct UndoUnion {
    big: usize,
    small: usize,
    /// `class_adj[big]` before the merge. Unlike `members` (a disjoint
    /// partition, so the small side's bits can just be cleared back out),
    /// neighbor sets of different classes can overlap, so the only correct
    /// undo is restoring the exact prior snapshot.
    prev_adj_big: BitVec,
}

/// Undo token for [`ZykovState::add_induced_edge`]. `None` when the roots
/// were already induced-adjacent, so the edge was a no-op to begin with.
#[derive(Debug, Clone, Copy)]
pub struct UndoEdge(Option<(usize, usize)>);

#[derive(Debug, Clone)]
pub struct ZykovState {
    parent: Vec<usize>,
    size: Vec<usize>,
    /// `members[r]`: original vertices currently contracted into root `r`.
    members: Vec<BitVec>,
    /// `class_adj[r]`: original vertices adjacent to *any* member of root
    /// `r`'s class (the class's induced neighborhood).
    class_adj: Vec<BitVec>,
}

impl ZykovState {
    pub fn new(g: &Graph) -> ZykovState {
        let n = g.num_vertices();
        let mut members = Vec::with_capacity(n);
        let mut class_adj = Vec::with_capacity(n);
        for v in 0..n {
            let mut m = bitvec![0; n];
            m.set(v, true);
            members.push(m);
            class_adj.push(g.neighbors(v).to_bitvec());
        }
        ZykovState {
            parent: (0..n).collect(),
            size: vec![1; n],
            members,
            class_adj,
        }
    }

    pub fn find(&self, x: usize) -> usize {
        let mut x = x;
        while self.parent[x] != x {
            x = self.parent[x];
        }
        x
    }

    pub fn roots(&self) -> Vec<usize> {
        (0..self.parent.len()).filter(|&v| self.find(v) == v).collect()
    }

    /// `true` iff some real edge crosses the two (already-distinct) roots.
    pub fn induced_adjacent(&self, ra: usize, rb: usize) -> bool {
        (self.class_adj[ra].clone() & self.members[rb].clone()).any()
    }

    pub fn members_of(&self, root: usize) -> &BitSlice {
        &self.members[root]
    }

    /// Merges the classes of `a` and `b`. Returns `None` if they were
    /// already the same class (a no-op the caller must still journal).
    pub fn union(&mut self, a: usize, b: usize) -> Option<UndoUnion> {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return None;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] { (ra, rb) } else { (rb, ra) };
        let prev_adj_big = self.class_adj[big].clone();
        self.parent[small] = big;
        self.size[big] += self.size[small];
        let small_members = self.members[small].clone();
        let small_adj = self.class_adj[small].clone();
        self.members[big] |= small_members;
        self.class_adj[big] |= small_adj;
        Some(UndoUnion { big, small, prev_adj_big })
    }

    /// Reverses exactly the mutation `union` performed, in LIFO order.
    pub fn undo(&mut self, u: UndoUnion) {
        self.parent[u.small] = u.small;
        self.size[u.big] -= self.size[u.small];
        // `members` is a disjoint partition, so the bits `small` contributed
        // can simply be cleared back out of `big`.
        let small_members = self.members[u.small].clone();
        clear_bits(&mut self.members[u.big], &small_members);
        // `class_adj` sets can overlap across classes, so only restoring
        // the exact pre-merge snapshot is correct.
        self.class_adj[u.big] = u.prev_adj_big;
    }

    /// Records a real edge between the (already-distinct) classes of `ra`
    /// and `rb` without merging them -- the `s[u,v] = false` case, which
    /// still makes the two classes induced-adjacent from then on. A no-op,
    /// reported via the returned token, when they already were.
    pub fn add_induced_edge(&mut self, ra: usize, rb: usize) -> UndoEdge {
        if self.induced_adjacent(ra, rb) {
            return UndoEdge(None);
        }
        let members_a = self.members[ra].clone();
        let members_b = self.members[rb].clone();
        self.class_adj[ra] |= members_b;
        self.class_adj[rb] |= members_a;
        UndoEdge(Some((ra, rb)))
    }

    /// Reverses exactly the mutation `add_induced_edge` performed.
    pub fn undo_edge(&mut self, u: UndoEdge) {
        if let Some((ra, rb)) = u.0 {
            let members_a = self.members[ra].clone();
            let members_b = self.members[rb].clone();
            clear_bits(&mut self.class_adj[ra], &members_b);
            clear_bits(&mut self.class_adj[rb], &members_a);
        }
    }

    /// Builds the induced graph over current roots, relabelled `0..roots.len()`
    /// in the order `roots` is given.
    pub fn induced_graph(&self, roots: &[usize]) -> Graph {
        let mut g = Graph::new(roots.len());
        for i in 0..roots.len() {
            for j in (i + 1)..roots.len() {
                if self.induced_adjacent(roots[i], roots[j]) {
                    g.add_edge(i, j);
                }
            }
        }
        g
    }
}

fn clear_bits(target: &mut BitVec, mask: &BitSlice) {
    for i in mask.iter_ones() {
        target.set(i, false);
    }
}

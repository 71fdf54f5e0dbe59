//! CNF builders for k-colorability. Each encoding owns its own variable
//! layout and decodes a SAT model back into a `Vec<usize>` coloring; the
//! k-search driver is oblivious to which one it is talking to.

pub mod assignment;
pub mod assignment_cardinality;
pub mod partial_order;

use crate::graph::Graph;
use crate::sat::{Model, SatAdaptor};
use crate::types::Lit;

/// Everything the driver needs from an encoder for one fixed `k`.
pub trait Encoder {
    /// Adds the clauses asserting "this graph is k-colorable" to `solver`,
    /// returning the color-indicator literals the cardinality/seed-clique
    /// machinery may need (encoding-specific; may be empty).
    fn encode(&mut self, solver: &mut dyn SatAdaptor, graph: &Graph, k: usize, seed_clique: &[usize]) -> Vec<Lit>;

    /// Recovers `coloring[v] = ` the color assigned to vertex `v` from a
    /// satisfying model.
    fn decode(&self, model: &Model, graph: &Graph, k: usize) -> Vec<usize>;
}

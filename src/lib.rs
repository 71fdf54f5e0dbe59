//! A SAT-based graph coloring solver.
//!
//! `chromasat` decides the chromatic number of a graph by driving a
//! CDCL SAT engine through one of three encodings of k-colorability
//! (Assignment, Partial-Order, or an incremental Zykov external
//! propagator), wrapped in a k-search strategy that narrows in on the
//! smallest satisfiable `k`.
//!
//! [`driver::run`] is the single entry point: hand it a [`config::Config`]
//! and a [`graph::Graph`], get back a [`driver::SolveReport`]. Everything
//! else -- preprocessing, bounding, encoding, the SAT backend itself -- is
//! exposed as a public module for callers who want to assemble their own
//! pipeline instead.
//!
//! Command-line argument parsing, file I/O and process exit codes are left
//! to whatever embeds this crate; see [`error::CoreError::exit_code`] and
//! [`driver::SolveReport::exit_code`] for the mapping a CLI wrapper should
//! use.

pub mod bounds;
pub mod cardinality;
pub mod config;
pub mod driver;
pub mod encodings;
pub mod error;
pub mod graph;
pub mod mnts;
pub mod preprocess;
pub mod sat;
pub mod state;
pub mod types;
pub mod validator;
pub mod zykov;

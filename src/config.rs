//! Crate `config` provides the solver's configuration record.
//!
//! Command-line parsing is external to this crate (see the crate-level
//! documentation); `Config` is the validated record that parsing is
//! expected to hand the driver.

use crate::error::{CoreError, CoreResult};

/// Which CNF encoding of k-colorability to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Assignment,
    /// Assignment encoding over a fixed-size color palette with an explicit
    /// totalizer cardinality constraint over "color used" indicators,
    /// rather than a palette sized to `k` and rebuilt every attempt.
    AssignmentCardinality,
    PartialOrder,
    ZykovPropagator,
}

/// k-search strategy driving the sequence of SAT calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    TopDown,
    BottomUp,
    SingleK,
}

/// SAT backend selection. `ZykovPropagator` requires `Incremental`, since
/// only that backend supports `connect_propagator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverBackend {
    Incremental,
    NonIncremental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Debug,
}

/// Branching-literal policy inside the Zykov propagator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZykovStrategy {
    /// Delegate to the backing solver's own decision heuristic.
    CadicalZykov,
    /// Prefer the unassigned s[u,v] whose roots have the largest combined
    /// closed-neighborhood intersection.
    BagSize,
}

/// Experimental in-propagator greedy-coloring refresh of the upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColoringAlgorithm {
    None,
    IteratedSeq,
}

#[derive(Debug, Clone)]
pub struct Config {
    //
    //## problem
    //
    pub encoding: Encoding,
    pub strategy: Strategy,
    pub solver: SolverBackend,
    pub verbosity: Verbosity,

    //
    //## preprocessing
    //
    pub preprocessing: bool,
    pub graph_reduction: bool,
    pub seed_clique_ordering: bool,

    //
    //## bounding
    //
    pub mycielsky_lb: bool,
    pub trivial_cj_removal: bool,

    //
    //## assignment encoding
    //
    pub assignment_amo: bool,

    //
    //## zykov propagator
    //
    pub clique_explanations: bool,
    pub mycielsky_explanations: bool,
    pub dominated_decisions: bool,
    pub positive_pruning: bool,
    pub negative_pruning: bool,
    pub zykov_strategy: ZykovStrategy,
    pub coloring_algorithm: ColoringAlgorithm,
    pub prop_clique_limit: usize,
    pub mycielsky_threshold: usize,

    //
    //## MNTS tabu search
    //
    pub mnts_length: usize,
    pub mnts_depth: usize,

    //
    //## solving mode
    //
    pub non_incremental: bool,
    pub detailed_backtracking_stats: bool,
    pub num_colors: Option<usize>, // required for SingleK

    //
    //## CNF sink
    //
    pub write_cnf_only: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            encoding: Encoding::Assignment,
            strategy: Strategy::BottomUp,
            solver: SolverBackend::Incremental,
            verbosity: Verbosity::Normal,

            preprocessing: true,
            graph_reduction: true,
            seed_clique_ordering: true,

            mycielsky_lb: false,
            trivial_cj_removal: true,

            assignment_amo: false,

            clique_explanations: false,
            mycielsky_explanations: false,
            dominated_decisions: false,
            positive_pruning: false,
            negative_pruning: false,
            zykov_strategy: ZykovStrategy::CadicalZykov,
            coloring_algorithm: ColoringAlgorithm::None,
            prop_clique_limit: 1000,
            mycielsky_threshold: 2,

            mnts_length: 0,
            mnts_depth: 0,

            non_incremental: false,
            detailed_backtracking_stats: false,
            num_colors: None,

            write_cnf_only: false,
        }
    }
}

impl Config {
    /// The `zykov-color` named default: Zykov propagator with clique and
    /// Mycielsky explanations, dominated-vertex decisions, and both pruning
    /// rules on, on the incremental backend.
    pub fn zykov_color() -> Config {
        Config {
            encoding: Encoding::ZykovPropagator,
            strategy: Strategy::BottomUp,
            solver: SolverBackend::Incremental,
            clique_explanations: true,
            mycielsky_explanations: true,
            dominated_decisions: true,
            positive_pruning: true,
            negative_pruning: true,
            mycielsky_lb: true,
            mnts_length: 2000,
            mnts_depth: 50,
            ..Config::default()
        }
    }

    /// The `assignment` named default.
    pub fn assignment() -> Config {
        Config {
            encoding: Encoding::Assignment,
            strategy: Strategy::BottomUp,
            assignment_amo: false,
            ..Config::default()
        }
    }

    /// The `partial-order` named default.
    pub fn partial_order() -> Config {
        Config {
            encoding: Encoding::PartialOrder,
            strategy: Strategy::TopDown,
            ..Config::default()
        }
    }

    /// The `assignment-cardinality` named default: one solver and one
    /// totalizer built once, with `BottomUp` only ever extending the
    /// activation literal instead of re-encoding per `k`.
    pub fn assignment_cardinality() -> Config {
        Config {
            encoding: Encoding::AssignmentCardinality,
            strategy: Strategy::BottomUp,
            ..Config::default()
        }
    }

    /// Validates option combinations the way `Options.cpp`'s range/conflict
    /// checks do: refuses nonsensical or contradictory toggle combinations
    /// before a single clause gets built.
    pub fn validate(&self) -> CoreResult<()> {
        if self.encoding == Encoding::ZykovPropagator && self.solver == SolverBackend::NonIncremental
        {
            return Err(CoreError::Config(
                "ZykovPropagator requires the incremental SAT backend".into(),
            ));
        }
        if self.strategy == Strategy::SingleK && self.num_colors.is_none() {
            return Err(CoreError::Config(
                "SingleK strategy requires num_colors to be set".into(),
            ));
        }
        if self.mycielsky_explanations && !self.clique_explanations {
            return Err(CoreError::Config(
                "Mycielsky explanations require clique explanations to be enabled".into(),
            ));
        }
        if self.write_cnf_only && self.encoding != Encoding::PartialOrder {
            return Err(CoreError::Config(
                "write-cnf-only is only supported for the PartialOrder encoding".into(),
            ));
        }
        if self.non_incremental && self.encoding == Encoding::ZykovPropagator {
            return Err(CoreError::Config(
                "ZykovPropagator cannot run on a non-incremental solve".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn named_presets_validate() {
        assert!(Config::zykov_color().validate().is_ok());
        assert!(Config::assignment().validate().is_ok());
        assert!(Config::assignment_cardinality().validate().is_ok());
        assert!(Config::partial_order().validate().is_ok());
    }

    #[test]
    fn zykov_requires_incremental_backend() {
        let mut cfg = Config::zykov_color();
        cfg.solver = SolverBackend::NonIncremental;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn single_k_requires_num_colors() {
        let mut cfg = Config::default();
        cfg.strategy = Strategy::SingleK;
        assert!(cfg.validate().is_err());
        cfg.num_colors = Some(3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn mycielsky_explanations_require_clique_explanations() {
        let mut cfg = Config::default();
        cfg.mycielsky_explanations = true;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn write_cnf_only_requires_partial_order() {
        let mut cfg = Config::assignment();
        cfg.write_cnf_only = true;
        assert!(cfg.validate().is_err());
    }
}

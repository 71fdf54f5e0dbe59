//! k-search strategies: BottomUp, TopDown and SingleK drive a sequence of
//! SAT calls over increasing/decreasing/fixed `k`, dispatching to whichever
//! encoding `Config` selects. This is the crate's single external entry
//! point: embedding code calls [`run`] and gets back a [`SolveReport`].

use std::collections::HashMap;
use std::time::Instant;

use crate::bounds::{self, CliqueOracle};
use crate::config::{Config, Encoding, Strategy};
use crate::encodings::assignment::AssignmentEncoder;
use crate::encodings::assignment_cardinality::AssignmentCardinalityEncoder;
use crate::encodings::partial_order::PartialOrderEncoder;
use crate::encodings::Encoder;
use crate::error::{CoreError, CoreResult};
use crate::graph::Graph;
use crate::preprocess::{self, Preprocessed};
use crate::sat::backend::CdclSolver;
use crate::sat::{SatAdaptor, SolveResult};
use crate::state::SearchState;
use crate::types::Lit;
use crate::validator;
use crate::zykov::propagator::{self as zykov_propagator, ZykovPropagator};
use crate::zykov::ZykovState;

#[derive(Debug, Clone)]
pub struct SolveReport {
    pub chromatic_number: Option<usize>,
    pub coloring: Option<Vec<usize>>,
    pub lower_bound: usize,
    pub upper_bound: usize,
    pub k_attempts: u64,
    pub decisions: u64,
    pub conflicts: u64,
    pub wall_time_ms: u128,
}

impl SolveReport {
    /// `0` on a confirmed chromatic number, `10` when the search space was
    /// exhausted (or `SingleK` came back UNSAT) without finding one.
    pub fn exit_code(&self) -> i32 {
        if self.chromatic_number.is_some() {
            0
        } else {
            10
        }
    }
}

pub fn run(config: &Config, graph: &Graph) -> CoreResult<SolveReport> {
    config.validate()?;
    let start = Instant::now();

    let pre = preprocess::preprocess(graph, config.preprocessing && config.graph_reduction, config.seed_clique_ordering);

    let oracle = CliqueOracle {
        mnts_length: config.mnts_length,
        mnts_depth: config.mnts_depth.max(1),
        seed: 12345,
    };
    let lb = bounds::integer_lower_bound(&oracle, &pre.graph).max(if pre.graph.num_vertices() == 0 { 0 } else { 1 });
    let ub = bounds::greedy_upper_bound(&pre.graph).max(lb);

    let mut search = SearchState::new(config.verbosity);
    let mut session = SolveSession::new(config, &pre, ub);

    let (found_k, reduced_coloring) = match config.strategy {
        Strategy::BottomUp => {
            let mut result = None;
            for k in lb..=ub {
                let outcome = session.attempt(config, &pre, k, &mut search)?;
                search.report_k(k, outcome.is_some());
                if let Some(coloring) = outcome {
                    result = Some((k, coloring));
                    break;
                }
            }
            match result {
                Some(r) => r,
                None => return unresolved(&search, lb, ub, start),
            }
        }
        Strategy::TopDown => {
            let mut last_sat: Option<(usize, Vec<usize>)> = None;
            for k in (lb..=ub).rev() {
                let outcome = session.attempt(config, &pre, k, &mut search)?;
                search.report_k(k, outcome.is_some());
                match outcome {
                    Some(coloring) => last_sat = Some((k, coloring)),
                    None => break,
                }
            }
            match last_sat {
                Some(r) => r,
                None => return unresolved(&search, lb, ub, start),
            }
        }
        Strategy::SingleK => {
            let k = config.num_colors.expect("Config::validate requires num_colors for SingleK");
            let outcome = session.attempt(config, &pre, k, &mut search)?;
            search.report_k(k, outcome.is_some());
            match outcome {
                Some(coloring) => (k, coloring),
                None => return unresolved(&search, lb, ub, start),
            }
        }
    };

    let full_coloring = preprocess::expand_coloring(&pre, &reduced_coloring);
    validator::validate_coloring(graph, &full_coloring, found_k)?;

    Ok(SolveReport {
        chromatic_number: Some(found_k),
        coloring: Some(full_coloring),
        lower_bound: lb,
        upper_bound: ub,
        k_attempts: search.k_attempts,
        decisions: search.decisions,
        conflicts: search.conflicts,
        wall_time_ms: start.elapsed().as_millis(),
    })
}

fn unresolved(search: &SearchState, lb: usize, ub: usize, start: Instant) -> CoreResult<SolveReport> {
    Ok(SolveReport {
        chromatic_number: None,
        coloring: None,
        lower_bound: lb,
        upper_bound: ub,
        k_attempts: search.k_attempts,
        decisions: search.decisions,
        conflicts: search.conflicts,
        wall_time_ms: start.elapsed().as_millis(),
    })
}

/// Per-`run()` solving state. Assignment and Partial-Order get a fresh
/// solver every k (their variable layouts are keyed by k, so nothing is
/// gained by reuse); the Zykov encoding keeps one solver and one set of
/// pair variables alive across every k attempt, so CNF clauses learned
/// while searching for k also help the search for k+/-1; the
/// Assignment-Cardinality encoding likewise builds its fixed-palette
/// clauses and totalizer exactly once and only asks for a new activation
/// literal per k -- that carryover is the entire reason to call either of
/// them "incremental".
enum SolveSession {
    PerK,
    Cardinality {
        solver: CdclSolver,
        encoder: AssignmentCardinalityEncoder,
    },
    Zykov {
        solver: CdclSolver,
        pair_vars: HashMap<(usize, usize), Lit>,
    },
}

impl SolveSession {
    fn new(config: &Config, pre: &Preprocessed, ub: usize) -> SolveSession {
        match config.encoding {
            Encoding::AssignmentCardinality if pre.graph.num_vertices() > 0 => {
                let mut solver = CdclSolver::new();
                let encoder = AssignmentCardinalityEncoder::build(&mut solver, &pre.graph, ub, &pre.seed_clique);
                SolveSession::Cardinality { solver, encoder }
            }
            Encoding::ZykovPropagator => {
                let mut solver = CdclSolver::new();
                let mut pair_vars = HashMap::new();
                for (u, v) in non_adjacent_pairs(&pre.graph) {
                    let var = solver.new_vars(1);
                    pair_vars.insert((u, v), var);
                }
                SolveSession::Zykov { solver, pair_vars }
            }
            _ => SolveSession::PerK,
        }
    }

    /// One SAT call for a fixed `k`. Returns the decoded coloring (over
    /// `pre.graph`'s vertex numbering) on SAT.
    fn attempt(
        &mut self,
        config: &Config,
        pre: &Preprocessed,
        k: usize,
        search: &mut SearchState,
    ) -> CoreResult<Option<Vec<usize>>> {
        if pre.graph.num_vertices() == 0 {
            return Ok(Some(vec![]));
        }
        match (self, config.encoding) {
            (SolveSession::PerK, Encoding::Assignment) => {
                let mut solver = CdclSolver::new();
                let mut enc = AssignmentEncoder { amo: config.assignment_amo };
                enc.encode(&mut solver, &pre.graph, k, &pre.seed_clique);
                let result = solver.solve();
                record_stats(search, solver.stats());
                match result {
                    SolveResult::Sat(model) => Ok(Some(enc.decode(&model, &pre.graph, k))),
                    SolveResult::Unsat(_) => Ok(None),
                    SolveResult::Unknown => Err(CoreError::Backend("assignment encoding returned Unknown".into())),
                }
            }
            (SolveSession::Cardinality { solver, encoder }, Encoding::AssignmentCardinality) => {
                match encoder.activate_bound(solver, k) {
                    Some(act) => solver.assume(&[act]),
                    None => solver.assume(&[]),
                }
                let result = solver.solve();
                record_stats(search, solver.stats());
                match result {
                    SolveResult::Sat(model) => Ok(Some(encoder.decode(&model, &pre.graph))),
                    SolveResult::Unsat(_) => Ok(None),
                    SolveResult::Unknown => Err(CoreError::Backend("assignment-cardinality encoding returned Unknown".into())),
                }
            }
            (SolveSession::PerK, Encoding::PartialOrder) => {
                let mut solver = CdclSolver::new();
                let mut enc = PartialOrderEncoder;
                enc.encode(&mut solver, &pre.graph, k, &pre.seed_clique);
                let result = solver.solve();
                record_stats(search, solver.stats());
                match result {
                    SolveResult::Sat(model) => Ok(Some(enc.decode(&model, &pre.graph, k))),
                    SolveResult::Unsat(_) => Ok(None),
                    SolveResult::Unknown => Err(CoreError::Backend("partial-order encoding returned Unknown".into())),
                }
            }
            (SolveSession::Zykov { solver, pair_vars }, Encoding::ZykovPropagator) => {
                let bound_act = solver.new_vars(1);
                let cfg = zykov_propagator::Config {
                    clique_explanations: config.clique_explanations,
                    mycielsky_explanations: config.mycielsky_explanations,
                    dominated_decisions: config.dominated_decisions,
                    positive_pruning: config.positive_pruning,
                    negative_pruning: config.negative_pruning,
                    strategy: config.zykov_strategy,
                    prop_clique_limit: config.prop_clique_limit,
                    mycielsky_threshold: config.mycielsky_threshold,
                    mnts_length: config.mnts_length,
                    mnts_depth: config.mnts_depth.max(1),
                    seed: 12345,
                };
                let propagator = ZykovPropagator::new(pre.graph.clone(), pair_vars, k, Some(bound_act), cfg);
                solver.connect_propagator(Box::new(propagator));
                solver.assume(&[bound_act]);

                let result = solver.solve();
                record_stats(search, solver.stats());
                match result {
                    SolveResult::Sat(model) => Ok(Some(decode_zykov_coloring(&pre.graph, pair_vars, &model))),
                    SolveResult::Unsat(_) => Ok(None),
                    SolveResult::Unknown => Err(CoreError::Backend("Zykov propagator encoding returned Unknown".into())),
                }
            }
            _ => unreachable!("SolveSession::new selects the variant matching config.encoding"),
        }
    }
}

fn record_stats(search: &mut SearchState, (decisions, conflicts, propagations): (u64, u64, u64)) {
    search.decisions += decisions;
    search.conflicts += conflicts;
    search.propagations += propagations;
}

fn non_adjacent_pairs(g: &Graph) -> Vec<(usize, usize)> {
    let n = g.num_vertices();
    let mut pairs = Vec::new();
    for u in 0..n {
        for v in (u + 1)..n {
            if !g.has_edge(u, v) {
                pairs.push((u, v));
            }
        }
    }
    pairs
}

/// Reconstructs the coloring a Zykov-encoding model implies by replaying
/// every merge the model asserts into a fresh union-find, independent of
/// whatever internal state the (now-consumed) propagator held.
fn decode_zykov_coloring(graph: &Graph, pair_vars: &HashMap<(usize, usize), Lit>, model: &[bool]) -> Vec<usize> {
    let mut state = ZykovState::new(graph);
    for (&(u, v), &var) in pair_vars {
        if model[var as usize] {
            state.union(u, v);
        }
    }
    let roots = state.roots();
    let mut color_of_root = HashMap::new();
    for (i, &r) in roots.iter().enumerate() {
        color_of_root.insert(r, i);
    }
    (0..graph.num_vertices()).map(|v| color_of_root[&state.find(v)]).collect()
}

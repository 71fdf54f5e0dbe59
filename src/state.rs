//! Search-progress bookkeeping and verbosity-gated reporting.
//!
//! One-line summaries per k value at `Normal`, a per-decision trace at
//! `Debug`; `Quiet` prints nothing. The driver owns a single
//! [`SearchState`] for the whole run and never touches a file or a CSV
//! writer itself -- that split belongs to whatever embeds this crate.

use crate::config::Verbosity;
use crate::types::Ema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Decisions,
    Conflicts,
    Propagations,
    Restarts,
}

#[derive(Debug, Clone)]
pub struct SearchState {
    pub verbosity: Verbosity,
    pub decisions: u64,
    pub conflicts: u64,
    pub propagations: u64,
    pub restarts: u64,
    pub k_attempts: u64,
    conflict_rate: Ema,
}

impl SearchState {
    pub fn new(verbosity: Verbosity) -> SearchState {
        SearchState {
            verbosity,
            decisions: 0,
            conflicts: 0,
            propagations: 0,
            restarts: 0,
            k_attempts: 0,
            conflict_rate: Ema::new(32.0),
        }
    }

    pub fn bump(&mut self, stat: Stat) {
        match stat {
            Stat::Decisions => self.decisions += 1,
            Stat::Conflicts => {
                self.conflicts += 1;
                self.conflict_rate.update(1.0);
            }
            Stat::Propagations => self.propagations += 1,
            Stat::Restarts => self.restarts += 1,
        }
    }

    pub fn conflict_rate(&self) -> f64 {
        self.conflict_rate.get()
    }

    /// Logs the outcome of one k-value SAT call. A no-op at `Quiet`.
    pub fn report_k(&mut self, k: usize, sat: bool) {
        self.k_attempts += 1;
        match self.verbosity {
            Verbosity::Quiet => {}
            Verbosity::Normal => {
                println!(
                    "k={k:<3} {:<4} decisions={} conflicts={}",
                    if sat { "SAT" } else { "UNSAT" },
                    self.decisions,
                    self.conflicts
                );
            }
            Verbosity::Debug => {
                println!(
                    "[{}] k={k:<3} {:<4} decisions={} conflicts={} propagations={} restarts={} conflict_rate={:.3}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    if sat { "SAT" } else { "UNSAT" },
                    self.decisions,
                    self.conflicts,
                    self.propagations,
                    self.restarts,
                    self.conflict_rate()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_updates_the_right_counter() {
        let mut st = SearchState::new(Verbosity::Quiet);
        st.bump(Stat::Decisions);
        st.bump(Stat::Conflicts);
        st.bump(Stat::Conflicts);
        assert_eq!(st.decisions, 1);
        assert_eq!(st.conflicts, 2);
        assert!(st.conflict_rate() > 0.0);
    }

    #[test]
    fn report_k_is_silent_at_quiet() {
        let mut st = SearchState::new(Verbosity::Quiet);
        st.report_k(3, true);
        assert_eq!(st.k_attempts, 1);
    }
}

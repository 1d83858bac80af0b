//! Symbolic reachability over parametric timed automata
//!
//! The driver explores symbolic states `(q, (C, D))` breadth-first. A
//! successor of a state under a transition is computed by the usual
//! pipeline over the zone engine: conjoin the guard atoms, reset, let time
//! elapse, canonicalise, then conjoin the target invariants, filtering
//! empty zones at every stage. Because the engine may split the parameter
//! space, one transition can yield several successor states.
//!
//! Symbolic state spaces of parametric automata need not be finite, so the
//! exploration carries a state cap; hitting the cap marks the result as
//! incomplete instead of looping forever.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use log::{debug, info, warn};
use parda_pdbm::{AtomicGuard, Cpdbm, Oracle, OracleError};

use crate::{Location, Pta};

/// A node of the symbolic state-space graph: a location and a zone
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolicState {
    location: Location,
    zone: Cpdbm,
}

impl SymbolicState {
    /// Pair a location with a zone
    pub fn new(location: Location, zone: Cpdbm) -> Self {
        SymbolicState { location, zone }
    }

    /// The control location
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The parametrised clock zone
    pub fn zone(&self) -> &Cpdbm {
        &self.zone
    }
}

impl fmt::Display for SymbolicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state at {}:\n{}", self.location, self.zone)
    }
}

/// Options steering an exploration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorationOptions {
    /// Abort after this many distinct symbolic states
    pub max_states: usize,
}

impl Default for ExplorationOptions {
    fn default() -> Self {
        ExplorationOptions { max_states: 10_000 }
    }
}

/// Result of a symbolic exploration
#[derive(Debug, Clone)]
pub struct Exploration {
    states: Vec<SymbolicState>,
    complete: bool,
}

impl Exploration {
    /// All visited symbolic states in discovery order
    pub fn states(&self) -> &[SymbolicState] {
        &self.states
    }

    /// Whether the state space was exhausted (false when the state cap was
    /// hit)
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Check whether some visited state lies in the given location
    pub fn is_reachable(&self, location: &Location) -> bool {
        self.states.iter().any(|s| s.location() == location)
    }

    /// The locations of the automaton never visited
    ///
    /// Only meaningful as "definitely unreachable" when
    /// [`Exploration::is_complete`] holds; a truncated exploration may
    /// simply not have gotten there yet.
    pub fn unreachable_locations<'a>(&self, pta: &'a Pta) -> Vec<&'a Location> {
        pta.locations()
            .filter(|location| !self.is_reachable(location))
            .collect()
    }
}

/// Conjoin a sequence of guard atoms onto every zone, canonicalising after
/// each atom and dropping empty zones
fn apply_guards(
    zones: Vec<Cpdbm>,
    guards: &[AtomicGuard],
    oracle: &mut dyn Oracle,
) -> Result<Vec<Cpdbm>, OracleError> {
    let mut current = zones;
    for guard in guards {
        let mut next = Vec::new();
        for zone in &current {
            for refined in zone.add_guard_and_canonical(guard, oracle)? {
                if !next.contains(&refined) {
                    next.push(refined);
                }
            }
        }
        current = next;
    }
    Ok(current)
}

/// Explore the reachable symbolic state space of an automaton
///
/// Seeds the exploration with the canonical initial zones (`∀c. c >= 0`
/// under the automaton's initial parameter constraints, restricted by the
/// initial location's invariants) and runs a breadth-first search with a
/// visited set over `(location, zone)` pairs.
pub fn explore(
    pta: &Pta,
    oracle: &mut dyn Oracle,
    options: &ExplorationOptions,
) -> Result<Exploration, OracleError> {
    info!("exploring {}", pta.name());

    let mut visited: HashSet<SymbolicState> = HashSet::new();
    let mut order: Vec<SymbolicState> = Vec::new();
    let mut queue: VecDeque<SymbolicState> = VecDeque::new();
    let mut complete = true;

    let seeds = Cpdbm::create_initial(
        pta.clocks().copied(),
        pta.initial_constraints().clone(),
        oracle,
    )?;
    let seeds = apply_guards(seeds, pta.invariant_for(pta.initial_location()), oracle)?;
    for zone in seeds {
        let state = SymbolicState::new(pta.initial_location().clone(), zone);
        if visited.insert(state.clone()) {
            order.push(state.clone());
            queue.push_back(state);
        }
    }

    while let Some(state) = queue.pop_front() {
        if visited.len() >= options.max_states {
            warn!(
                "exploration of {} truncated at {} states",
                pta.name(),
                visited.len()
            );
            complete = false;
            break;
        }

        for transition in pta.outgoing_transitions(state.location()) {
            debug!("firing {transition}");

            let zones = apply_guards(vec![state.zone().clone()], transition.guards(), oracle)?;

            // reset, let time elapse, then restore canonicity in one pass
            let mut stepped = Vec::new();
            for zone in zones {
                let advanced = zone.reset(transition.resets()).delay();
                for canonical in advanced.canonical(oracle)? {
                    if !stepped.contains(&canonical) {
                        stepped.push(canonical);
                    }
                }
            }

            let stepped = apply_guards(stepped, pta.invariant_for(transition.target()), oracle)?;

            for zone in stepped {
                let successor = SymbolicState::new(transition.target().clone(), zone);
                if visited.insert(successor.clone()) {
                    order.push(successor.clone());
                    queue.push_back(successor);
                }
            }
        }
    }

    info!(
        "exploration of {} finished with {} states (complete: {complete})",
        pta.name(),
        order.len()
    );
    Ok(Exploration {
        states: order,
        complete,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parda_pdbm::{Clock, ConstraintSet, Pdbm};

    #[test]
    fn test_symbolic_state_accessors() {
        let zone = Cpdbm::new(ConstraintSet::top(), Pdbm::initial([Clock::ZERO]));
        let state = SymbolicState::new(Location::new("start"), zone.clone());
        assert_eq!(state.location().name(), "start");
        assert_eq!(state.zone(), &zone);
    }

    #[test]
    fn test_default_options() {
        assert_eq!(ExplorationOptions::default().max_states, 10_000);
    }

    #[test]
    fn test_exploration_queries() {
        let zone = Cpdbm::new(ConstraintSet::top(), Pdbm::initial([Clock::ZERO]));
        let exploration = Exploration {
            states: vec![SymbolicState::new(Location::new("a"), zone)],
            complete: true,
        };
        assert!(exploration.is_complete());
        assert!(exploration.is_reachable(&Location::new("a")));
        assert!(!exploration.is_reachable(&Location::new("b")));
    }
}

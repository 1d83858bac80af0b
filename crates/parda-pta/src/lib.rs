//! A library to describe and analyse parametric timed automata
//!
//! A parametric timed automaton (PTA) is a finite automaton whose
//! transitions are guarded by clock-difference constraints over symbolic
//! parameters, reset clocks to constants, and whose locations carry
//! invariant guards. This crate contains:
//!
//! - the model types [`Location`], [`Action`], [`Transition`] and [`Pta`],
//! - a validating [`builder::PtaBuilder`] to construct automata,
//! - symbolic states and the breadth-first reachability driver in
//!   [`reachability`].
//!
//! The zone arithmetic lives in the `parda-pdbm` crate; every operation on
//! zones is delegated to it and parametrised by an oracle (see
//! `parda-smt-oracle` for the SMT-backed one).

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use parda_display_utils::join_iterator;
use parda_pdbm::{AtomicGuard, Clock, ConstraintSet, Parameter, ResetSet};

pub mod builder;
pub mod reachability;

/// A control location of a parametric timed automaton
///
/// Locations are identified by their name.
#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct Location(String);

impl Location {
    /// Create a new location with the given name
    pub fn new(name: impl ToString) -> Self {
        Location(name.to_string())
    }

    /// Returns the name of the location
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Location {
    fn from(name: &str) -> Self {
        Location::new(name)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transition label
///
/// The empty label is the silent action `ε`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord, Default)]
pub struct Action(String);

impl Action {
    /// The silent action
    pub const EPSILON: Action = Action(String::new());

    /// Create an action with the given label; an empty label is `ε`
    pub fn new(label: impl ToString) -> Self {
        Action(label.to_string())
    }

    /// Returns the label of the action
    pub fn label(&self) -> &str {
        &self.0
    }

    /// Check whether this is the silent action
    pub fn is_epsilon(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_epsilon() {
            write!(f, "ε")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A transition `q --[a, g, r]--> q'` of a parametric timed automaton
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    source: Location,
    target: Location,
    action: Action,
    guards: Vec<AtomicGuard>,
    resets: ResetSet,
}

impl Transition {
    /// Create a transition
    pub fn new(
        source: Location,
        target: Location,
        action: Action,
        guards: impl IntoIterator<Item = AtomicGuard>,
        resets: ResetSet,
    ) -> Self {
        Transition {
            source,
            target,
            action,
            guards: guards.into_iter().collect(),
            resets,
        }
    }

    /// Source location of the transition
    pub fn source(&self) -> &Location {
        &self.source
    }

    /// Target location of the transition
    pub fn target(&self) -> &Location {
        &self.target
    }

    /// Action labelling the transition
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Guard atoms that must all hold for the transition to fire
    pub fn guards(&self) -> &[AtomicGuard] {
        &self.guards
    }

    /// Clock resets applied when the transition fires
    pub fn resets(&self) -> &ResetSet {
        &self.resets
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --[{}, {{{}}}, {}]--> {}",
            self.source,
            self.action,
            join_iterator(self.guards.iter(), ", "),
            self.resets,
            self.target
        )
    }
}

/// A parametric timed automaton
///
/// Use [`builder::PtaBuilder`] to construct one; the builder validates
/// that every referenced location, clock and parameter is declared.
#[derive(Debug, Clone)]
pub struct Pta {
    name: String,
    locations: BTreeSet<Location>,
    initial_location: Location,
    outgoing: HashMap<Location, Vec<Transition>>,
    clocks: BTreeSet<Clock>,
    parameters: BTreeSet<Parameter>,
    invariants: HashMap<Location, Vec<AtomicGuard>>,
    initial_constraints: ConstraintSet,
}

impl Pta {
    /// Name of the automaton
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The locations of the automaton
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    /// The initial location
    pub fn initial_location(&self) -> &Location {
        &self.initial_location
    }

    /// The clocks of the automaton, not including the zero clock
    pub fn clocks(&self) -> impl Iterator<Item = &Clock> {
        self.clocks.iter()
    }

    /// The parameters of the automaton
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// The initial constraint on the parameters (`⊤` when unconstrained)
    pub fn initial_constraints(&self) -> &ConstraintSet {
        &self.initial_constraints
    }

    /// All transitions of the automaton
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.outgoing.values().flatten()
    }

    /// The transitions leaving `location`
    pub fn outgoing_transitions(&self, location: &Location) -> impl Iterator<Item = &Transition> {
        self.outgoing.get(location).into_iter().flatten()
    }

    /// The invariant guards of `location`; empty when none were declared
    pub fn invariant_for(&self, location: &Location) -> &[AtomicGuard] {
        self.invariants
            .get(location)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl fmt::Display for Pta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "pta {} (initial: {}, clocks: {}, parameters: {})",
            self.name,
            self.initial_location,
            join_iterator(self.clocks.iter(), ", "),
            join_iterator(self.parameters.iter(), ", "),
        )?;
        let mut transitions: Vec<&Transition> = self.transitions().collect();
        transitions.sort_by(|a, b| (a.source(), a.target()).cmp(&(b.source(), b.target())));
        for transition in transitions {
            writeln!(f, "    {transition}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_name() {
        let loc = Location::new("idle");
        assert_eq!(loc.name(), "idle");
        assert_eq!(loc.to_string(), "idle");
        assert_eq!(Location::from("idle"), loc);
    }

    #[test]
    fn test_action_epsilon() {
        assert!(Action::EPSILON.is_epsilon());
        assert_eq!(Action::EPSILON.to_string(), "ε");
        let send = Action::new("send");
        assert!(!send.is_epsilon());
        assert_eq!(send.label(), "send");
    }

    #[test]
    fn test_transition_accessors() {
        let c = Clock::fresh();
        let t = Transition::new(
            Location::new("a"),
            Location::new("b"),
            Action::new("go"),
            [AtomicGuard::less_than(c, parda_pdbm::Rational::from_int(5))],
            ResetSet::to_zero([c]),
        );
        assert_eq!(t.source().name(), "a");
        assert_eq!(t.target().name(), "b");
        assert_eq!(t.guards().len(), 1);
        assert_eq!(t.resets().iter().count(), 1);
        let rendered = t.to_string();
        assert!(rendered.contains("a --[go,"));
        assert!(rendered.contains("--> b"));
    }
}

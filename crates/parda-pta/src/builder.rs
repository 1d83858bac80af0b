//! Builder for parametric timed automata
//!
//! The builder collects declarations and components and validates the
//! whole automaton once at [`PtaBuilder::build`]: every location, clock
//! and parameter referenced by a transition or invariant must have been
//! declared. This keeps [`super::Pta`] free of partially wired automata.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use log::debug;
use parda_pdbm::{AtomicGuard, Clock, ConstraintSet, Parameter};

use crate::{Location, Pta, Transition};

/// Error raised when [`PtaBuilder::build`] rejects an automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PtaBuildError {
    /// No initial location was set
    MissingInitialLocation,
    /// The same location was declared twice
    DuplicateLocation(Location),
    /// A component references an undeclared location
    UndeclaredLocation(Location),
    /// A guard or reset references an undeclared clock
    UndeclaredClock(Clock),
    /// A guard references an undeclared parameter
    UndeclaredParameter(Parameter),
}

impl fmt::Display for PtaBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PtaBuildError::MissingInitialLocation => {
                write!(f, "no initial location was declared")
            }
            PtaBuildError::DuplicateLocation(location) => {
                write!(f, "location {location} was declared twice")
            }
            PtaBuildError::UndeclaredLocation(location) => {
                write!(f, "undeclared location: {location}")
            }
            PtaBuildError::UndeclaredClock(clock) => {
                write!(f, "undeclared clock: {clock}")
            }
            PtaBuildError::UndeclaredParameter(parameter) => {
                write!(f, "undeclared parameter: {parameter}")
            }
        }
    }
}

impl std::error::Error for PtaBuildError {}

/// Builder collecting the components of a [`Pta`]
///
/// # Example
///
/// ```
/// use parda_pdbm::{AtomicGuard, Clock, Parameter, Rational, ResetSet};
/// use parda_pta::builder::PtaBuilder;
/// use parda_pta::{Action, Location, Transition};
///
/// let c = Clock::fresh();
/// let idle = Location::new("idle");
/// let busy = Location::new("busy");
///
/// let pta = PtaBuilder::new("worker")
///     .with_clocks([c])
///     .with_locations([idle.clone(), busy.clone()])
///     .with_initial_location(idle.clone())
///     .with_transition(Transition::new(
///         idle,
///         busy,
///         Action::new("start"),
///         [AtomicGuard::greater_equal(c, Rational::from_int(1))],
///         ResetSet::to_zero([c]),
///     ))
///     .build()
///     .unwrap();
/// assert_eq!(pta.name(), "worker");
/// ```
#[derive(Debug, Default)]
pub struct PtaBuilder {
    name: String,
    locations: Vec<Location>,
    initial_location: Option<Location>,
    transitions: Vec<Transition>,
    clocks: BTreeSet<Clock>,
    parameters: BTreeSet<Parameter>,
    invariants: Vec<(Location, Vec<AtomicGuard>)>,
    initial_constraints: ConstraintSet,
}

impl PtaBuilder {
    /// Start building an automaton with the given name
    pub fn new(name: impl ToString) -> Self {
        PtaBuilder {
            name: name.to_string(),
            ..PtaBuilder::default()
        }
    }

    /// Declare locations
    pub fn with_locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations.extend(locations);
        self
    }

    /// Declare the initial location
    pub fn with_initial_location(mut self, location: Location) -> Self {
        self.initial_location = Some(location);
        self
    }

    /// Declare clocks
    pub fn with_clocks(mut self, clocks: impl IntoIterator<Item = Clock>) -> Self {
        self.clocks.extend(clocks);
        self
    }

    /// Declare parameters
    pub fn with_parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Add a transition
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add invariant guards to a location (cumulative)
    pub fn with_invariant(
        mut self,
        location: Location,
        guards: impl IntoIterator<Item = AtomicGuard>,
    ) -> Self {
        self.invariants
            .push((location, guards.into_iter().collect()));
        self
    }

    /// Constrain the parameters of the automaton initially
    pub fn with_initial_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.initial_constraints = constraints;
        self
    }

    /// Validate and build the automaton
    pub fn build(self) -> Result<Pta, PtaBuildError> {
        let mut locations = BTreeSet::new();
        for location in self.locations {
            if !locations.insert(location.clone()) {
                return Err(PtaBuildError::DuplicateLocation(location));
            }
        }

        let initial_location = self
            .initial_location
            .ok_or(PtaBuildError::MissingInitialLocation)?;
        if !locations.contains(&initial_location) {
            return Err(PtaBuildError::UndeclaredLocation(initial_location));
        }

        let check_guard = |guard: &AtomicGuard| -> Result<(), PtaBuildError> {
            for clock in [guard.clock1(), guard.clock2()] {
                if !clock.is_zero_clock() && !self.clocks.contains(&clock) {
                    return Err(PtaBuildError::UndeclaredClock(clock));
                }
            }
            for (parameter, _) in guard.bound().coefficients() {
                if !self.parameters.contains(parameter) {
                    return Err(PtaBuildError::UndeclaredParameter(*parameter));
                }
            }
            Ok(())
        };

        let mut outgoing: HashMap<Location, Vec<Transition>> = HashMap::new();
        for transition in self.transitions {
            for endpoint in [transition.source(), transition.target()] {
                if !locations.contains(endpoint) {
                    return Err(PtaBuildError::UndeclaredLocation(endpoint.clone()));
                }
            }
            for guard in transition.guards() {
                check_guard(guard)?;
            }
            for (clock, _) in transition.resets().iter() {
                if !self.clocks.contains(clock) {
                    return Err(PtaBuildError::UndeclaredClock(*clock));
                }
            }
            outgoing
                .entry(transition.source().clone())
                .or_default()
                .push(transition);
        }

        let mut invariants: HashMap<Location, Vec<AtomicGuard>> = HashMap::new();
        for (location, guards) in self.invariants {
            if !locations.contains(&location) {
                return Err(PtaBuildError::UndeclaredLocation(location));
            }
            for guard in &guards {
                check_guard(guard)?;
            }
            invariants.entry(location).or_default().extend(guards);
        }

        debug!(
            "built pta {} with {} locations and {} transitions",
            self.name,
            locations.len(),
            outgoing.values().map(Vec::len).sum::<usize>()
        );

        Ok(Pta {
            name: self.name,
            locations,
            initial_location,
            outgoing,
            clocks: self.clocks,
            parameters: self.parameters,
            invariants,
            initial_constraints: self.initial_constraints,
        })
    }
}

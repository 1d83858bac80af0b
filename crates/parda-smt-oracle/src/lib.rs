//! SMT solver interaction for the PARDA engine
//!
//! This crate implements the engine's [`parda_pdbm::Oracle`] interface on
//! top of an external SMT solver. Solvers are spawned as subprocesses in
//! interactive SMT-LIB2 mode through the
//! [easy-smt](https://crates.io/crates/easy-smt) crate, with the logic
//! fixed to quantifier-free linear real arithmetic (`QF_LRA`).
//!
//! [`SolverBuilderCfg`] describes how to start a solver (command,
//! arguments, options); ready-made configurations exist for Z3
//! ([`SolverBuilderCfg::new_z3`]) and cvc5 ([`SolverBuilderCfg::new_cvc5`]),
//! and [`SolverBuilder::automatic`] picks whichever is installed.

use core::{error, fmt};
use std::process::Command;

use easy_smt::ContextBuilder;
use log::{debug, error, trace, warn};

#[cfg(feature = "config_deserialize")]
use serde::Deserialize;

pub mod encoding;
pub mod oracle;

pub use oracle::SmtOracle;

/// Z3 command
pub const Z3_PRG: &str = "z3";
/// Options putting Z3 into quiet interactive SMT-LIB2 mode
pub const Z3_ARGS: [&str; 3] = ["-smt2", "-in", "-v:0"];

/// cvc5 command
pub const CVC5_PRG: &str = "cvc5";
/// Options putting cvc5 into quiet incremental SMT-LIB2 mode
pub const CVC5_ARGS: [&str; 3] = ["--quiet", "--lang=smt2", "--incremental"];

/// Interface to a running SMT solver process
///
/// Alias for [`easy_smt::Context`].
pub type SmtSolver = easy_smt::Context;

/// An SMT expression; alias for [`easy_smt::SExpr`]
pub type SmtExpr = easy_smt::SExpr;

/// Hook checking the probed solver version `(major, minor, patch)`
///
/// Implementations should `warn!` or `error!` about unsupported versions.
type CompatibilityCheck = fn((i32, i32, i32));

/// Configuration for a [`SolverBuilder`]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "config_deserialize", derive(Deserialize))]
pub struct SolverBuilderCfg {
    /// Command starting the solver
    command: String,
    /// Arguments passed to the command
    #[cfg_attr(feature = "config_deserialize", serde(default))]
    args: Vec<String>,
    /// Options applied to every new solver instance
    #[cfg_attr(feature = "config_deserialize", serde(default))]
    opts: Vec<SolverOption>,
    /// Whether to set the logic explicitly to `QF_LRA`
    #[cfg_attr(feature = "config_deserialize", serde(default = "default_set_logic"))]
    set_logic: bool,
    /// Version compatibility hook
    #[cfg_attr(feature = "config_deserialize", serde(skip))]
    check_version: Option<CompatibilityCheck>,
}

#[cfg(feature = "config_deserialize")]
fn default_set_logic() -> bool {
    true
}

impl PartialEq for SolverBuilderCfg {
    /// Compare configurations ignoring the concrete version hook
    fn eq(&self, other: &Self) -> bool {
        self.command == other.command
            && self.args == other.args
            && self.opts == other.opts
            && self.set_logic == other.set_logic
            && self.check_version.is_some() == other.check_version.is_some()
    }
}

impl SolverBuilderCfg {
    /// Configuration for an arbitrary SMT-LIB2 solver
    ///
    /// The solver must run in interactive REPL mode and understand the
    /// `QF_LRA` logic over `Real` terms.
    pub fn new(command: String, args: Vec<String>, opts: Vec<SolverOption>, set_logic: bool) -> Self {
        Self {
            command,
            args,
            opts,
            set_logic,
            check_version: None,
        }
    }

    /// Default configuration for Z3
    pub fn new_z3() -> Self {
        Self {
            command: Z3_PRG.to_string(),
            args: Z3_ARGS.iter().map(|s| s.to_string()).collect(),
            opts: Vec::new(),
            set_logic: true,
            check_version: None,
        }
    }

    /// Default configuration for cvc5
    pub fn new_cvc5() -> Self {
        let check_version = |version: (i32, i32, i32)| {
            if version.0 <= 1 && version.1 < 1 {
                warn!(
                    "detected cvc5 {}.{}.{}; versions below 1.1.0 are not supported",
                    version.0, version.1, version.2
                );
            }
        };
        Self {
            command: CVC5_PRG.to_string(),
            args: CVC5_ARGS.iter().map(|s| s.to_string()).collect(),
            opts: Vec::new(),
            set_logic: true,
            check_version: Some(check_version),
        }
    }
}

/// An option applied to a freshly started solver
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config_deserialize", derive(Deserialize))]
pub enum SolverOption {
    /// Option with a boolean value
    Boolean {
        /// Name of the option, including the leading colon
        name: String,
        /// Value to set
        value: bool,
    },
    /// Option with an unsigned integer value
    UnsignedInt {
        /// Name of the option, including the leading colon
        name: String,
        /// Value to set
        value: u32,
    },
}

impl SolverOption {
    /// Apply the option to a solver, logging failures
    pub fn apply(&self, solver: &mut SmtSolver) {
        let (name, value) = match self {
            SolverOption::Boolean { name, value } => {
                let value = if *value { solver.true_() } else { solver.false_() };
                (name, value)
            }
            SolverOption::UnsignedInt { name, value } => (name, solver.numeral(*value)),
        };
        trace!("setting solver option {name}");
        if let Err(e) = solver.set_option(name, value) {
            error!("failed to set solver option {name}: {e}");
        }
    }
}

impl fmt::Display for SolverOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverOption::Boolean { name, value } => write!(f, "{name} = {value}"),
            SolverOption::UnsignedInt { name, value } => write!(f, "{name} = {value}"),
        }
    }
}

/// Error creating a [`SolverBuilder`]
#[derive(Debug, PartialEq, Clone)]
pub enum SolverBuilderError {
    /// The solver command could not be executed
    NotInstalled(String),
}

impl fmt::Display for SolverBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBuilderError::NotInstalled(command) => {
                write!(f, "SMT solver `{command}` is not installed")
            }
        }
    }
}

impl error::Error for SolverBuilderError {}

/// Factory for solver instances
///
/// Building the factory probes the solver binary once (`--version`); every
/// [`SolverBuilder::new_solver`] call then starts a fresh subprocess.
/// Because each instance is a separate process, one builder can safely
/// serve many threads, each owning its own solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverBuilder {
    command: String,
    args: Vec<String>,
    opts: Vec<SolverOption>,
    set_logic: bool,
}

impl SolverBuilder {
    /// Create a builder from a configuration, probing the solver binary
    pub fn new(cfg: &SolverBuilderCfg) -> Result<Self, SolverBuilderError> {
        match probe_version(&cfg.command) {
            Ok(version) => {
                trace!(
                    "found solver {} version {}.{}.{}",
                    cfg.command, version.0, version.1, version.2
                );
                if let Some(check_version) = cfg.check_version {
                    check_version(version);
                }
            }
            Err(ProbeError::NotInstalled) => {
                return Err(SolverBuilderError::NotInstalled(cfg.command.clone()));
            }
            Err(ProbeError::UnparsableVersion) => {
                warn!("could not parse the version of solver {}", cfg.command);
            }
        }

        Ok(Self {
            command: cfg.command.clone(),
            args: cfg.args.clone(),
            opts: cfg.opts.clone(),
            set_logic: cfg.set_logic,
        })
    }

    /// Builder for whichever supported solver is installed, preferring Z3
    pub fn automatic() -> Result<Self, SolverBuilderError> {
        SolverBuilder::new(&SolverBuilderCfg::new_z3())
            .or_else(|_| SolverBuilder::new(&SolverBuilderCfg::new_cvc5()))
            .map_err(|_| {
                SolverBuilderError::NotInstalled("no supported SMT solver found".to_string())
            })
    }

    /// Start a new solver instance
    ///
    /// # Panics
    ///
    /// Panics when the interactive session cannot be established even
    /// though the binary probed fine at builder construction.
    pub fn new_solver(&self) -> SmtSolver {
        trace!("starting solver instance of {}", self.command);
        let mut builder = ContextBuilder::new();
        builder.solver(&self.command, &self.args);

        let mut solver = builder.build().unwrap_or_else(|e| {
            panic!(
                "failed to start interactive session with SMT solver `{}`: {e}",
                self.command
            )
        });

        for opt in &self.opts {
            debug!("applying solver option {opt}");
            opt.apply(&mut solver);
        }

        if self.set_logic {
            debug!("setting solver logic to QF_LRA");
            solver
                .set_logic("QF_LRA")
                .expect("failed to set logic QF_LRA in the SMT solver");
        }

        solver
    }
}

#[derive(Debug, PartialEq)]
enum ProbeError {
    NotInstalled,
    UnparsableVersion,
}

/// Run `<command> --version` and extract `(major, minor, patch)`
fn probe_version(command: &str) -> Result<(i32, i32, i32), ProbeError> {
    let output = Command::new(command)
        .arg("--version")
        .output()
        .map_err(|_| ProbeError::NotInstalled)?;
    if !output.status.success() {
        return Err(ProbeError::NotInstalled);
    }
    let text = String::from_utf8_lossy(&output.stdout);
    parse_version(&text).ok_or(ProbeError::UnparsableVersion)
}

/// Extract `x.y.z` following the first occurrence of `version ` in the
/// output of `--version`
fn parse_version(output: &str) -> Option<(i32, i32, i32)> {
    let start = output.find("version ")? + "version ".len();
    let token = output[start..].split_whitespace().next()?;
    let mut parts = token.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    Some((major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_z3_version() {
        assert_eq!(parse_version("Z3 version 4.8.12 - 64 bit"), Some((4, 8, 12)));
    }

    #[test]
    fn test_parse_cvc5_version() {
        let out = "This is cvc5 version 1.1.0 [git tag 1.1.0 branch HEAD]\n\
                   compiled with GCC version 11.4.0";
        assert_eq!(parse_version(out), Some((1, 1, 0)));
    }

    #[test]
    fn test_parse_version_without_marker() {
        assert_eq!(parse_version("some unrelated output"), None);
        assert_eq!(parse_version("version not.a.number"), None);
    }

    #[test]
    fn test_cfg_equality_ignores_version_hook() {
        let a = SolverBuilderCfg::new("z3".to_string(), vec!["-in".to_string()], vec![], true);
        let b = SolverBuilderCfg::new("z3".to_string(), vec!["-in".to_string()], vec![], true);
        assert_eq!(a, b);

        let c = SolverBuilderCfg::new("cvc5".to_string(), vec![], vec![], true);
        assert_ne!(a, c);
        // the presets differ in their hooks
        assert_ne!(SolverBuilderCfg::new_z3(), SolverBuilderCfg::new_cvc5());
    }

    #[test]
    fn test_probe_missing_solver() {
        assert_eq!(
            probe_version("definitely-not-an-smt-solver"),
            Err(ProbeError::NotInstalled)
        );
    }

    #[test]
    fn test_builder_for_missing_solver_errors() {
        let cfg = SolverBuilderCfg::new(
            "definitely-not-an-smt-solver".to_string(),
            vec![],
            vec![],
            false,
        );
        assert_eq!(
            SolverBuilder::new(&cfg),
            Err(SolverBuilderError::NotInstalled(
                "definitely-not-an-smt-solver".to_string()
            ))
        );
    }

    #[test]
    fn test_solver_option_display() {
        let opt = SolverOption::Boolean {
            name: ":produce-models".to_string(),
            value: true,
        };
        assert_eq!(opt.to_string(), ":produce-models = true");
        let opt = SolverOption::UnsignedInt {
            name: ":seed".to_string(),
            value: 42,
        };
        assert_eq!(opt.to_string(), ":seed = 42");
    }

    #[test]
    fn test_builder_error_display() {
        let err = SolverBuilderError::NotInstalled("z3".to_string());
        assert_eq!(err.to_string(), "SMT solver `z3` is not installed");
    }
}

//! # Invariant Registry
//!
//! Modules register named state checks during assembly. Once assembly is done
//! the registry is frozen behind an `Arc` and handed to the crisis module,
//! which evaluates it on its configured cadence and on demand.

use crate::context::Context;
use crate::errors::ModuleError;
use std::fmt;

/// An invariant check. `Ok(None)` means the invariant holds; `Ok(Some(msg))`
/// describes the violation.
pub type InvariantFn =
    Box<dyn Fn(&Context<'_>) -> Result<Option<String>, ModuleError> + Send + Sync>;

/// A registered invariant.
pub struct Invariant {
    pub module: &'static str,
    pub route: &'static str,
    check: InvariantFn,
}

impl Invariant {
    /// Fully qualified route, `module/route`.
    pub fn full_route(&self) -> String {
        format!("{}/{}", self.module, self.route)
    }

    pub fn check(&self, ctx: &Context<'_>) -> Result<Option<String>, ModuleError> {
        (self.check)(ctx)
    }
}

impl fmt::Debug for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invariant")
            .field("module", &self.module)
            .field("route", &self.route)
            .finish()
    }
}

/// A violated invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invariant broken: {module}/{route}: {message}")]
pub struct InvariantViolation {
    pub module: &'static str,
    pub route: &'static str,
    pub message: String,
}

/// Ordered collection of invariants.
#[derive(Debug, Default)]
pub struct InvariantRegistry {
    invariants: Vec<Invariant>,
}

impl InvariantRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, module: &'static str, route: &'static str, check: F)
    where
        F: Fn(&Context<'_>) -> Result<Option<String>, ModuleError> + Send + Sync + 'static,
    {
        self.invariants.push(Invariant {
            module,
            route,
            check: Box::new(check),
        });
    }

    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Invariant> {
        self.invariants.iter()
    }

    pub fn find(&self, module: &str, route: &str) -> Option<&Invariant> {
        self.invariants
            .iter()
            .find(|i| i.module == module && i.route == route)
    }

    /// Run every invariant in registration order, stopping at the first
    /// violation.
    pub fn assert_all(&self, ctx: &Context<'_>) -> Result<Result<(), InvariantViolation>, ModuleError> {
        for invariant in &self.invariants {
            if let Some(message) = invariant.check(ctx)? {
                return Ok(Err(InvariantViolation {
                    module: invariant.module,
                    route: invariant.route,
                    message,
                }));
            }
        }
        Ok(Ok(()))
    }
}

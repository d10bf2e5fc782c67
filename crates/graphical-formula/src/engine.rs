//! Evaluation engine
//!
//! Chooses between the general evaluator and the accelerated integer backend.
//! The accelerated path is only tried for expressions with no division, no
//! decimal literal and an empty scope; any failure on that path falls back to
//! the general evaluator and is reported only as a diagnostic.
//!
//! # Example
//!
//! ```rust
//! use graphical_formula::{Engine, EngineOptions, Scope};
//!
//! let engine = Engine::new(EngineOptions::default());
//! let value = engine.evaluate("(2+3)*4", &Scope::new(), true).unwrap();
//! assert_eq!(value, 20.into());
//! ```

use crate::accel::{self, AccelError, Accelerator};
use crate::error::FormulaResult;
use crate::evaluator::evaluate;
use crate::extension::Scope;
use crate::number::Number;
use crate::parser::parse_expression;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Environment variable that switches the accelerated backend off
pub const ACCELERATION_ENV: &str = "GRAPHICAL_ACCELERATION";

/// Process-wide engine (lazily initialized from the environment)
static GLOBAL_ENGINE: OnceLock<Engine> = OnceLock::new();

/// Options for the evaluation engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Try the accelerated backend for eligible expressions (default: true)
    pub acceleration: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { acceleration: true }
    }
}

impl EngineOptions {
    /// Defaults, overridden by `GRAPHICAL_ACCELERATION` (`0`, `false`, `off`, `no`)
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(value) = std::env::var(ACCELERATION_ENV) {
            options.acceleration = !matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "off" | "no"
            );
        }
        options
    }
}

/// Expression evaluation engine
#[derive(Clone)]
pub struct Engine {
    options: EngineOptions,
    accelerator: Option<Arc<dyn Accelerator>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("accelerator", &self.accelerator.as_ref().map(|a| a.name()))
            .finish()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Engine {
    /// Create an engine using the built-in accelerator, if compiled in
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            accelerator: accel::native(),
        }
    }

    /// Create an engine that only ever uses the general evaluator
    pub fn without_acceleration() -> Self {
        Self {
            options: EngineOptions {
                acceleration: false,
            },
            accelerator: None,
        }
    }

    /// Create an engine with a specific accelerated backend
    pub fn with_accelerator(options: EngineOptions, accelerator: Arc<dyn Accelerator>) -> Self {
        Self {
            options,
            accelerator: Some(accelerator),
        }
    }

    /// The process-wide engine, configured from the environment on first use
    pub fn global() -> &'static Engine {
        GLOBAL_ENGINE.get_or_init(|| Engine::new(EngineOptions::from_env()))
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Evaluate an expression against a scope
    pub fn evaluate(
        &self,
        expression: &str,
        scope: &Scope,
        allow_acceleration: bool,
    ) -> FormulaResult<Number> {
        let ast = parse_expression(expression)?;

        let eligible = allow_acceleration
            && self.options.acceleration
            && scope.is_empty()
            && !ast.has_division()
            && !ast.has_decimal_literal();

        if eligible {
            match self.accelerate(expression) {
                Ok(value) => return Ok(Number::Integer(value)),
                Err(AccelError::Unavailable(reason)) => {
                    tracing::warn!("{reason}; using general evaluator for '{expression}'");
                }
                Err(AccelError::Fault(reason)) => {
                    tracing::warn!(
                        "accelerated evaluation of '{expression}' failed ({reason}); falling back"
                    );
                }
            }
        }

        evaluate(&ast, scope)
    }

    fn accelerate(&self, expression: &str) -> Result<i64, AccelError> {
        let accelerator = self
            .accelerator
            .as_ref()
            .ok_or_else(|| AccelError::Unavailable("no accelerator compiled in".into()))?;
        tracing::debug!(backend = accelerator.name(), "accelerated evaluation of '{expression}'");
        accelerator.compute(expression)
    }
}

/// Evaluate an expression with the process-wide engine
pub fn compute(expression: &str, scope: &Scope, allow_acceleration: bool) -> FormulaResult<Number> {
    Engine::global().evaluate(expression, scope, allow_acceleration)
}

//! # graphical-formula
//!
//! Formula definition, substitution and evaluation engine for graphical.
//!
//! This crate provides:
//! - Parameter mappings and extension bindings
//! - Formula definitions (template + parameters, or a custom evaluation)
//! - Formula instances (substitute → evaluate → cache)
//! - Expression parsing and evaluation with an optional accelerated backend
//! - Bundles of related formulas sharing one argument set
//! - JSON records for extension-free formulas
//!
//! ## Example
//!
//! ```rust
//! use graphical_formula::{parameters, Arguments, FormulaBuilder};
//!
//! let area = FormulaBuilder::new("rectangle_area")
//!     .template("a*b")
//!     .parameters(parameters!["a", "b"])
//!     .build()
//!     .unwrap();
//!
//! let instance = area.instantiate(&Arguments::from([("a", 2), ("b", 3)])).unwrap();
//! assert_eq!(instance.number(), Some(6.into()));
//! ```

pub mod accel;
pub mod ast;
pub mod bundle;
pub mod custom;
pub mod definition;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod extension;
pub mod instance;
pub mod json;
pub mod number;
pub mod parameter;
pub mod parser;

pub use accel::{AccelError, Accelerator, IntegerAccelerator};
pub use ast::{BinaryOperator, Expr, UnaryOperator};
pub use bundle::{Bundle, BundleBuilder, BundleType, Resolution, Resolver};
pub use custom::{CustomEvaluation, FractionRender, LiteralRender};
pub use definition::{
    CustomFormula, ExtensionDecl, FormulaBuilder, FormulaDefinition, FormulaKind, StandardFormula,
};
pub use engine::{compute, Engine, EngineOptions};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::evaluate;
pub use extension::{Extension, ExtensionBinding, ExtensionFn, Scope};
pub use instance::{substitute, Argument, Arguments, FormulaInstance, FormulaValue};
pub use json::{deserialize, from_json, serialize, to_json, SerializedFormula};
pub use number::Number;
pub use parameter::{ParameterBuilder, ParameterMap};
pub use parser::{parse_expression, MAX_NESTING_DEPTH, MAX_TREE_HEIGHT};

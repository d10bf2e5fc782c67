//! # graphical
//!
//! Declarative arithmetic formulas: define a template and its parameters
//! once, instantiate it with keyword arguments, and read the computed result.
//!
//! ## Features
//!
//! - Formula definitions with parameter mappings and extensions
//! - Exact integer and decimal arithmetic with an optional accelerated backend
//! - Bundles exposing related formulas (area, perimeter, ...) over shared arguments
//! - JSON records for extension-free formulas
//! - A built-in catalogue of geometric shapes with English and Chinese names
//!
//! ## Example
//!
//! ```rust
//! use graphical::prelude::*;
//!
//! let area = build_instance("trapezoid_area", &Arguments::from([("a", 10), ("b", 20), ("h", 30)]))
//!     .unwrap();
//! assert_eq!(area.number(), Some(450.into()));
//!
//! let square = shape("正方形", Arguments::from([("a", 3)])).unwrap();
//! assert_eq!(square.get("面积").unwrap(), square.get("area").unwrap());
//! ```

pub mod catalog;
pub mod export;
pub mod prelude;

pub use catalog::{builtin, Catalog, CatalogEntry, Shape};
pub use export::{export_json, write_export};

// Re-export formula types
pub use graphical_formula::{
    compute, deserialize, from_json, parameters, serialize, to_json, Argument, Arguments, Bundle,
    BundleBuilder, BundleType, CustomEvaluation, Engine, EngineOptions, Extension,
    ExtensionBinding, FormulaBuilder, FormulaDefinition, FormulaError, FormulaInstance,
    FormulaResult, FormulaValue, FractionRender, LiteralRender, Number, ParameterMap, Resolution,
    Resolver, Scope, SerializedFormula,
};

/// A formula given by catalogue name or as a definition
#[derive(Debug, Clone, Copy)]
pub enum FormulaRef<'a> {
    /// English or Chinese catalogue name
    Name(&'a str),
    Definition(&'a FormulaDefinition),
}

impl<'a> From<&'a str> for FormulaRef<'a> {
    fn from(name: &'a str) -> Self {
        FormulaRef::Name(name)
    }
}

impl<'a> From<&'a String> for FormulaRef<'a> {
    fn from(name: &'a String) -> Self {
        FormulaRef::Name(name)
    }
}

impl<'a> From<&'a FormulaDefinition> for FormulaRef<'a> {
    fn from(definition: &'a FormulaDefinition) -> Self {
        FormulaRef::Definition(definition)
    }
}

/// Resolve a formula reference to its definition
pub fn definition<'a>(formula: impl Into<FormulaRef<'a>>) -> FormulaResult<&'a FormulaDefinition> {
    match formula.into() {
        FormulaRef::Definition(definition) => Ok(definition),
        FormulaRef::Name(name) => builtin()?
            .formula(name)
            .map(|entry| &entry.definition)
            .ok_or_else(|| FormulaError::UnknownFormula(name.to_string())),
    }
}

/// Build an instance of a catalogue formula or of a given definition
pub fn build_instance<'a>(
    formula: impl Into<FormulaRef<'a>>,
    arguments: &Arguments,
) -> FormulaResult<FormulaInstance> {
    definition(formula)?.instantiate(arguments)
}

/// Bind arguments to a catalogue shape
pub fn shape(name: &str, arguments: Arguments) -> FormulaResult<Bundle> {
    let shape = builtin()?
        .shape(name)
        .ok_or_else(|| FormulaError::UnknownFormula(name.to_string()))?;
    Ok(shape.bundle_type.construct(arguments))
}

/// Declared accessors of a catalogue shape
pub fn list_accessors(name: &str) -> FormulaResult<Vec<&'static str>> {
    let shape = builtin()?
        .shape(name)
        .ok_or_else(|| FormulaError::UnknownFormula(name.to_string()))?;
    Ok(shape.bundle_type.list_accessors())
}

//! Prelude module - common imports for graphical users
//!
//! ```rust
//! use graphical::prelude::*;
//! ```

pub use crate::{
    build_instance,
    list_accessors,
    shape,
    Arguments,
    // Bundles
    Bundle,
    BundleType,
    // Catalogue
    Catalog,
    Engine,
    EngineOptions,
    ExtensionBinding,
    // Definitions
    FormulaBuilder,
    FormulaDefinition,
    // Error types
    FormulaError,
    FormulaInstance,
    FormulaResult,
    FormulaValue,
    Number,
    ParameterMap,
};

pub use graphical_formula::parameters;

//! Formula instances
//!
//! An instance binds keyword arguments to a definition. Substitution and
//! evaluation happen once, when the instance is built; afterwards it is an
//! immutable record of what was computed.

use crate::error::{FormulaError, FormulaResult};
use crate::number::Number;
use crate::parameter::ParameterMap;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;

/// A keyword argument value
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    /// Substituted verbatim
    Text(String),
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Integer(i) => write!(f, "{}", i),
            // Floats always carry a fractional part so they read back as decimals
            Argument::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Argument::Float(x) => write!(f, "{}", x),
            Argument::Decimal(d) => write!(f, "{}", d),
            Argument::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Argument::Integer(value)
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Argument::Integer(i64::from(value))
    }
}

impl From<u32> for Argument {
    fn from(value: u32) -> Self {
        Argument::Integer(i64::from(value))
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Argument::Float(value)
    }
}

impl From<Decimal> for Argument {
    fn from(value: Decimal) -> Self {
        Argument::Decimal(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Text(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Text(value)
    }
}

/// Keyword arguments passed when instantiating a formula or bundle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: HashMap<String, Argument>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one argument
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Argument>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Argument>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Arguments
where
    K: Into<String>,
    V: Into<Argument>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut arguments = Arguments::new();
        for (name, value) in iter {
            arguments.insert(name, value);
        }
        arguments
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Arguments
where
    K: Into<String>,
    V: Into<Argument>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// The cached result of an instance
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(Number),
    /// Produced by literal-render formulas
    Text(String),
}

impl FormulaValue {
    pub fn as_number(&self) -> Option<Number> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormulaValue::Text(s) => Some(s),
            FormulaValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FormulaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaValue::Number(n) => write!(f, "{}", n),
            FormulaValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<Number> for FormulaValue {
    fn from(value: Number) -> Self {
        FormulaValue::Number(value)
    }
}

/// Replace parameter symbols in a template with argument values
///
/// Every external name must be bound; the first missing one (in parameter
/// order) is reported. Replacement is plain text replacement, one symbol at
/// a time in parameter order, so a symbol that is a substring of another
/// symbol or of an earlier replacement is replaced there too.
pub fn substitute(
    template: &str,
    parameters: &ParameterMap,
    arguments: &Arguments,
) -> FormulaResult<String> {
    let mut bound = Vec::with_capacity(parameters.len());
    for (external, symbol) in parameters.iter() {
        let value = arguments
            .get(external)
            .ok_or_else(|| FormulaError::MissingParameter(external.to_string()))?;
        bound.push((symbol, value.to_string()));
    }

    let mut resolved = template.to_string();
    for (symbol, value) in bound {
        if symbol.is_empty() {
            continue;
        }
        resolved = resolved.replace(symbol, &value);
    }
    Ok(resolved)
}

/// A formula bound to concrete arguments, with its result computed
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaInstance {
    name: String,
    arguments: Arguments,
    resolved: String,
    value: FormulaValue,
}

impl FormulaInstance {
    pub fn new(
        name: impl Into<String>,
        arguments: Arguments,
        resolved: impl Into<String>,
        value: FormulaValue,
    ) -> Self {
        Self {
            name: name.into(),
            arguments,
            resolved: resolved.into(),
            value,
        }
    }

    /// Name of the definition this instance was built from
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// The template after substitution
    pub fn resolved_template(&self) -> &str {
        &self.resolved
    }

    /// The cached result
    pub fn value(&self) -> &FormulaValue {
        &self.value
    }

    pub fn number(&self) -> Option<Number> {
        self.value.as_number()
    }

    pub fn text(&self) -> Option<&str> {
        self.value.as_text()
    }
}

impl fmt::Display for FormulaInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

//! Extensions: named functions and constants injected into an evaluation scope

use crate::error::{FormulaError, FormulaResult};
use crate::number::Number;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Extension function signature
///
/// Receives the evaluated positional arguments exactly as the template
/// spells the call.
pub type ExtensionFn = dyn Fn(&[Number]) -> FormulaResult<Number> + Send + Sync;

/// What a name is bound to inside a scope
#[derive(Clone)]
pub enum Extension {
    /// A plain value, e.g. `pi`
    Constant(Number),
    /// A callable, e.g. `sin(x)`
    Function(Arc<ExtensionFn>),
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extension::Constant(n) => f.debug_tuple("Constant").field(n).finish(),
            Extension::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// An immutable (name, extension) pair
#[derive(Debug, Clone)]
pub struct ExtensionBinding {
    name: String,
    extension: Extension,
}

impl ExtensionBinding {
    pub fn new(name: impl Into<String>, extension: Extension) -> Self {
        Self {
            name: name.into(),
            extension,
        }
    }

    /// Bind a constant value
    pub fn constant(name: impl Into<String>, value: impl Into<Number>) -> Self {
        Self::new(name, Extension::Constant(value.into()))
    }

    /// Bind a function over evaluated arguments
    pub fn function<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Number]) -> FormulaResult<Number> + Send + Sync + 'static,
    {
        Self::new(name, Extension::Function(Arc::new(function)))
    }

    /// Bind a one-argument float function such as `f64::sin`
    pub fn unary(name: impl Into<String>, function: fn(f64) -> f64) -> Self {
        let name = name.into();
        let label = name.clone();
        Self::function(name, move |args: &[Number]| match args {
            [x] => Number::try_from_f64(function(x.to_f64())),
            _ => Err(FormulaError::ArgumentCount {
                function: label.clone(),
                expected: "1".into(),
                actual: args.len(),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &Extension {
        &self.extension
    }

    /// Whether the name can be referenced from an expression
    pub fn is_valid(&self) -> bool {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' => {
                chars.all(|c| c.is_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }
}

/// Symbols available to an expression at evaluation time
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<String, Extension>,
}

impl Scope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a name; a later binding of the same name replaces the earlier one
    pub fn bind(&mut self, binding: ExtensionBinding) {
        self.bindings.insert(binding.name, binding.extension);
    }

    /// Merge another scope into this one, the other scope winning on collision
    pub fn merge(&mut self, other: &Scope) {
        for (name, extension) in &other.bindings {
            self.bindings.insert(name.clone(), extension.clone());
        }
    }

    /// Look up a name
    pub fn get(&self, name: &str) -> Option<&Extension> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Bound names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<ExtensionBinding> for Scope {
    fn from_iter<I: IntoIterator<Item = ExtensionBinding>>(iter: I) -> Self {
        let mut scope = Scope::new();
        for binding in iter {
            scope.bind(binding);
        }
        scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let scope: Scope = vec![
            ExtensionBinding::constant("k", 1),
            ExtensionBinding::constant("k", 2),
        ]
        .into_iter()
        .collect();
        assert_eq!(scope.len(), 1);
        assert!(matches!(scope.get("k"), Some(Extension::Constant(n)) if *n == Number::from(2)));
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base: Scope = std::iter::once(ExtensionBinding::constant("pi", 3)).collect();
        let other: Scope = std::iter::once(ExtensionBinding::constant("pi", 4)).collect();
        base.merge(&other);
        assert!(matches!(base.get("pi"), Some(Extension::Constant(n)) if *n == Number::from(4)));
    }

    #[test]
    fn test_unary_checks_arity() {
        let binding = ExtensionBinding::unary("abs", f64::abs);
        let Extension::Function(f) = binding.extension() else {
            panic!("Expected Function");
        };
        assert_eq!(f(&[Number::from(-2)]).unwrap(), Number::from(2));
        assert!(matches!(
            f(&[]),
            Err(FormulaError::ArgumentCount { actual: 0, .. })
        ));
    }

    #[test]
    fn test_binding_validity() {
        assert!(ExtensionBinding::constant("pi", 3).is_valid());
        assert!(ExtensionBinding::constant("_x1", 3).is_valid());
        assert!(ExtensionBinding::constant("圆周率", 3).is_valid());
        assert!(!ExtensionBinding::constant("", 3).is_valid());
        assert!(!ExtensionBinding::constant("1x", 3).is_valid());
        assert!(!ExtensionBinding::constant("a-b", 3).is_valid());
    }
}

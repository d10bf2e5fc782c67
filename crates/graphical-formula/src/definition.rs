//! Formula definitions
//!
//! A [`FormulaDefinition`] is the immutable, reusable "type" of a formula:
//! a template, the mapping from argument names to template symbols, and
//! optionally extensions bound into the evaluation scope. Definitions are
//! produced by [`FormulaBuilder`], which validates and normalizes the
//! declaration.
//!
//! A definition built with a [`CustomEvaluation`] is not normalized at all;
//! the evaluation decides how instances are produced.

use crate::custom::CustomEvaluation;
use crate::engine::Engine;
use crate::error::{FormulaError, FormulaResult};
use crate::extension::{ExtensionBinding, Scope};
use crate::instance::{substitute, Arguments, FormulaInstance, FormulaValue};
use crate::parameter::ParameterMap;
use std::fmt;
use std::sync::Arc;

/// Extension declaration: one binding or several
#[derive(Debug, Clone)]
pub enum ExtensionDecl {
    Single(ExtensionBinding),
    Many(Vec<ExtensionBinding>),
}

impl ExtensionDecl {
    fn into_bindings(self) -> Vec<ExtensionBinding> {
        match self {
            ExtensionDecl::Single(binding) => vec![binding],
            ExtensionDecl::Many(bindings) => bindings,
        }
    }
}

impl From<ExtensionBinding> for ExtensionDecl {
    fn from(binding: ExtensionBinding) -> Self {
        ExtensionDecl::Single(binding)
    }
}

impl From<Vec<ExtensionBinding>> for ExtensionDecl {
    fn from(bindings: Vec<ExtensionBinding>) -> Self {
        ExtensionDecl::Many(bindings)
    }
}

impl<const N: usize> From<[ExtensionBinding; N]> for ExtensionDecl {
    fn from(bindings: [ExtensionBinding; N]) -> Self {
        ExtensionDecl::Many(bindings.into())
    }
}

/// A template evaluated as an arithmetic expression
#[derive(Debug, Clone)]
pub struct StandardFormula {
    template: String,
    parameters: ParameterMap,
    extensions: Option<Scope>,
}

/// A formula whose instances are produced by a [`CustomEvaluation`]
#[derive(Clone)]
pub struct CustomFormula {
    template: Option<String>,
    parameters: Option<ParameterMap>,
    extensions: Option<Scope>,
    evaluation: Arc<dyn CustomEvaluation>,
}

impl CustomFormula {
    pub fn evaluation(&self) -> &Arc<dyn CustomEvaluation> {
        &self.evaluation
    }
}

impl fmt::Debug for CustomFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFormula")
            .field("template", &self.template)
            .field("parameters", &self.parameters)
            .field("extensions", &self.extensions)
            .field("evaluation", &self.evaluation.kind())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum FormulaKind {
    Standard(StandardFormula),
    Custom(CustomFormula),
}

/// An immutable formula declaration
#[derive(Debug, Clone)]
pub struct FormulaDefinition {
    name: String,
    kind: FormulaKind,
}

impl FormulaDefinition {
    pub fn builder(name: impl Into<String>) -> FormulaBuilder {
        FormulaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FormulaKind {
        &self.kind
    }

    pub fn template(&self) -> Option<&str> {
        match &self.kind {
            FormulaKind::Standard(f) => Some(&f.template),
            FormulaKind::Custom(f) => f.template.as_deref(),
        }
    }

    pub fn parameters(&self) -> Option<&ParameterMap> {
        match &self.kind {
            FormulaKind::Standard(f) => Some(&f.parameters),
            FormulaKind::Custom(f) => f.parameters.as_ref(),
        }
    }

    pub fn extensions(&self) -> Option<&Scope> {
        match &self.kind {
            FormulaKind::Standard(f) => f.extensions.as_ref(),
            FormulaKind::Custom(f) => f.extensions.as_ref(),
        }
    }

    pub fn has_extensions(&self) -> bool {
        self.extensions().is_some()
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, FormulaKind::Custom(_))
    }

    /// Build an instance with the process-wide engine
    pub fn instantiate(&self, arguments: &Arguments) -> FormulaResult<FormulaInstance> {
        self.instantiate_with(Engine::global(), arguments)
    }

    /// Build an instance: substitute arguments, evaluate once, cache the value
    pub fn instantiate_with(
        &self,
        engine: &Engine,
        arguments: &Arguments,
    ) -> FormulaResult<FormulaInstance> {
        let (resolved, value) = match &self.kind {
            FormulaKind::Standard(formula) => {
                let resolved = substitute(&formula.template, &formula.parameters, arguments)?;
                let value = match &formula.extensions {
                    Some(scope) => engine.evaluate(&resolved, scope, false)?,
                    None => engine.evaluate(&resolved, &Scope::new(), true)?,
                };
                (resolved, FormulaValue::Number(value))
            }
            FormulaKind::Custom(formula) => formula.evaluation.construct(self, arguments, engine)?,
        };
        Ok(FormulaInstance::new(
            self.name.clone(),
            arguments.clone(),
            resolved,
            value,
        ))
    }
}

fn same_extensions(a: Option<&Scope>, b: Option<&Scope>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.names() == b.names(),
        _ => false,
    }
}

impl PartialEq for FormulaDefinition {
    /// Extensions compare by bound names; custom evaluations by identity
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name
            || self.template() != other.template()
            || self.parameters() != other.parameters()
            || !same_extensions(self.extensions(), other.extensions())
        {
            return false;
        }
        match (&self.kind, &other.kind) {
            (FormulaKind::Standard(_), FormulaKind::Standard(_)) => true,
            (FormulaKind::Custom(a), FormulaKind::Custom(b)) => {
                Arc::as_ptr(&a.evaluation) as *const () == Arc::as_ptr(&b.evaluation) as *const ()
            }
            _ => false,
        }
    }
}

/// Builder for [`FormulaDefinition`]
#[derive(Default)]
pub struct FormulaBuilder {
    name: String,
    template: Option<String>,
    parameters: Option<ParameterMap>,
    extensions: Option<Vec<ExtensionBinding>>,
    custom: Option<Arc<dyn CustomEvaluation>>,
}

impl FormulaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Parameter mapping, from a map, a builder or `(external, symbol)` pairs
    pub fn parameters(mut self, parameters: impl Into<ParameterMap>) -> Self {
        self.parameters = Some(parameters.into());
        self
    }

    /// Bind one or more extensions; repeated calls accumulate
    pub fn extensions(mut self, extensions: impl Into<ExtensionDecl>) -> Self {
        self.extensions
            .get_or_insert_with(Vec::new)
            .extend(extensions.into().into_bindings());
        self
    }

    /// Hand instance construction to a custom evaluation
    pub fn custom(mut self, evaluation: Arc<dyn CustomEvaluation>) -> Self {
        self.custom = Some(evaluation);
        self
    }

    pub fn build(self) -> FormulaResult<FormulaDefinition> {
        if let Some(evaluation) = self.custom {
            let extensions = self
                .extensions
                .filter(|bindings| !bindings.is_empty())
                .map(|bindings| bindings.into_iter().collect());
            return Ok(FormulaDefinition {
                name: self.name,
                kind: FormulaKind::Custom(CustomFormula {
                    template: self.template,
                    parameters: self.parameters,
                    extensions,
                    evaluation,
                }),
            });
        }

        let template = self.template.ok_or_else(|| FormulaError::Definition {
            formula: self.name.clone(),
            field: "template",
        })?;
        let parameters = self.parameters.ok_or_else(|| FormulaError::Definition {
            formula: self.name.clone(),
            field: "parameters",
        })?;

        let extensions = match self.extensions {
            Some(bindings) if !bindings.is_empty() => {
                if let Some(invalid) = bindings.iter().find(|b| !b.is_valid()) {
                    return Err(FormulaError::InvalidExtension(invalid.name().to_string()));
                }
                Some(bindings.into_iter().collect::<Scope>())
            }
            _ => None,
        };

        tracing::debug!(
            formula = %self.name,
            parameters = parameters.len(),
            extensions = extensions.as_ref().map_or(0, Scope::len),
            "built formula definition"
        );

        Ok(FormulaDefinition {
            name: self.name,
            kind: FormulaKind::Standard(StandardFormula {
                template,
                parameters,
                extensions,
            }),
        })
    }
}

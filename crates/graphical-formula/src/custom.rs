//! Custom evaluations
//!
//! Formulas built with a custom evaluation skip the standard normalization
//! and decide for themselves how an instance is produced.

use crate::definition::FormulaDefinition;
use crate::engine::Engine;
use crate::error::{FormulaError, FormulaResult};
use crate::extension::Scope;
use crate::instance::{substitute, Arguments, FormulaValue};
use crate::parameter::ParameterMap;
use lazy_regex::regex_replace_all;

/// Instance construction for custom formulas
pub trait CustomEvaluation: Send + Sync {
    /// Short name of this evaluation kind, for diagnostics
    fn kind(&self) -> &str;

    /// Produce the resolved template and the value of an instance
    fn construct(
        &self,
        definition: &FormulaDefinition,
        arguments: &Arguments,
        engine: &Engine,
    ) -> FormulaResult<(String, FormulaValue)>;
}

fn template_and_parameters(definition: &FormulaDefinition) -> FormulaResult<(&str, &ParameterMap)> {
    let template = definition.template().ok_or_else(|| FormulaError::Definition {
        formula: definition.name().to_string(),
        field: "template",
    })?;
    let parameters = definition
        .parameters()
        .ok_or_else(|| FormulaError::Definition {
            formula: definition.name().to_string(),
            field: "parameters",
        })?;
    Ok((template, parameters))
}

/// Substitutes arguments into the template and keeps the text as the result
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralRender;

impl CustomEvaluation for LiteralRender {
    fn kind(&self) -> &str {
        "literal"
    }

    fn construct(
        &self,
        definition: &FormulaDefinition,
        arguments: &Arguments,
        _engine: &Engine,
    ) -> FormulaResult<(String, FormulaValue)> {
        let (template, parameters) = template_and_parameters(definition)?;
        let text = substitute(template, parameters, arguments)?;
        Ok((text.clone(), FormulaValue::Text(text)))
    }
}

/// Evaluates templates containing `<frac N D>` markers as decimal divisions
///
/// Each marker becomes a `Decimal` quotient rounded to 28 significant
/// digits, so a fraction with no terminating expansion is not exact:
/// `<frac 1 3>*3` evaluates to `0.9999999999999999999999999999`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FractionRender;

impl FractionRender {
    /// Rewrite every `<frac N D>` marker to `(N/D)`
    pub fn rewrite(text: &str) -> String {
        regex_replace_all!(r"<frac\s+(\d+)\s+(\d+)>", text, |_, n: &str, d: &str| {
            format!("({}/{})", n, d)
        })
        .into_owned()
    }
}

impl CustomEvaluation for FractionRender {
    fn kind(&self) -> &str {
        "fraction"
    }

    fn construct(
        &self,
        definition: &FormulaDefinition,
        arguments: &Arguments,
        engine: &Engine,
    ) -> FormulaResult<(String, FormulaValue)> {
        let (template, parameters) = template_and_parameters(definition)?;
        let expression = Self::rewrite(&substitute(template, parameters, arguments)?);

        let empty = Scope::new();
        let scope = definition.extensions().unwrap_or(&empty);
        let value = engine.evaluate(&expression, scope, false)?;
        Ok((expression, FormulaValue::Number(value)))
    }
}

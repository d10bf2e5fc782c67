//! JSON records for formula definitions
//!
//! Wire format:
//!
//! ```json
//! {"name": "rectangle_area", "formula": "a*b", "args": {"a": "a", "b": "b"}}
//! ```
//!
//! A definition needs a template and parameters to be written out, and
//! definitions carrying extensions are rejected. A record always reads back
//! as a standard formula.

use crate::definition::FormulaDefinition;
use crate::error::{FormulaError, FormulaResult};
use crate::parameter::ParameterMap;
use serde::{Deserialize, Serialize};

/// The serialized form of a formula definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedFormula {
    #[serde(default)]
    pub name: String,
    pub formula: String,
    pub args: ParameterMap,
}

/// Convert a definition to its record
pub fn serialize(definition: &FormulaDefinition) -> FormulaResult<SerializedFormula> {
    let unsupported = |reason: &str| FormulaError::SerializationUnsupported {
        formula: definition.name().to_string(),
        reason: reason.to_string(),
    };

    if definition.has_extensions() {
        return Err(unsupported("extensions cannot be serialized"));
    }

    let formula = definition
        .template()
        .ok_or_else(|| unsupported("no template"))?;
    let args = definition
        .parameters()
        .ok_or_else(|| unsupported("no parameters"))?;

    Ok(SerializedFormula {
        name: definition.name().to_string(),
        formula: formula.to_string(),
        args: args.clone(),
    })
}

/// Rebuild a definition from its record
pub fn deserialize(record: SerializedFormula) -> FormulaResult<FormulaDefinition> {
    FormulaDefinition::builder(record.name)
        .template(record.formula)
        .parameters(record.args)
        .build()
}

/// Serialize a definition to JSON text
pub fn to_json(definition: &FormulaDefinition) -> FormulaResult<String> {
    Ok(serde_json::to_string(&serialize(definition)?)?)
}

/// Deserialize a definition from JSON text
pub fn from_json(text: &str) -> FormulaResult<FormulaDefinition> {
    let record: SerializedFormula = serde_json::from_str(text)?;
    deserialize(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::LiteralRender;
    use crate::definition::FormulaBuilder;
    use crate::engine::Engine;
    use crate::extension::ExtensionBinding;
    use crate::instance::Arguments;
    use crate::parameters;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn trapezoid_area() -> FormulaDefinition {
        FormulaBuilder::new("trapezoid_area")
            .template("(a+b)*h/2")
            .parameters(parameters!["a", "b", "h"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_to_json() {
        assert_eq!(
            to_json(&trapezoid_area()).unwrap(),
            r#"{"name":"trapezoid_area","formula":"(a+b)*h/2","args":{"a":"a","b":"b","h":"h"}}"#
        );
    }

    #[test]
    fn test_round_trip() {
        let definition = trapezoid_area();
        let back = from_json(&to_json(&definition).unwrap()).unwrap();
        assert_eq!(back, definition);

        let arguments = Arguments::from([("a", 10), ("b", 20), ("h", 30)]);
        let engine = Engine::default();
        assert_eq!(
            back.instantiate_with(&engine, &arguments).unwrap().value(),
            definition.instantiate_with(&engine, &arguments).unwrap().value()
        );
    }

    #[test]
    fn test_extra_keys_ignored() {
        let definition =
            from_json(r#"{"name":"n","formula":"x+1","args":{"x":"x"},"comment":"ignored"}"#)
                .unwrap();
        assert_eq!(definition.template(), Some("x+1"));
    }

    #[test]
    fn test_missing_fields_fail() {
        assert!(matches!(
            from_json(r#"{"name":"n","args":{}}"#),
            Err(FormulaError::Json(_))
        ));
        assert!(matches!(
            from_json(r#"{"name":"n","formula":"1"}"#),
            Err(FormulaError::Json(_))
        ));
        assert!(matches!(from_json("not json"), Err(FormulaError::Json(_))));
    }

    #[test]
    fn test_extensions_not_serializable() {
        let circle = FormulaBuilder::new("circle_area")
            .template("pi*(r**2)")
            .parameters(parameters!["r"])
            .extensions(ExtensionBinding::constant("pi", 3))
            .build()
            .unwrap();
        assert!(matches!(
            to_json(&circle),
            Err(FormulaError::SerializationUnsupported { ref formula, .. }) if formula == "circle_area"
        ));
    }

    #[test]
    fn test_custom_serializes_template_and_parameters() {
        let text = FormulaBuilder::new("text")
            .template("t")
            .parameters(parameters![topic = "t"])
            .custom(Arc::new(LiteralRender))
            .build()
            .unwrap();
        assert_eq!(
            to_json(&text).unwrap(),
            r#"{"name":"text","formula":"t","args":{"topic":"t"}}"#
        );

        let back = from_json(&to_json(&text).unwrap()).unwrap();
        assert!(!back.is_custom());
        assert_eq!(back.template(), Some("t"));
    }

    #[test]
    fn test_custom_without_template_not_serializable() {
        let bare = FormulaBuilder::new("bare")
            .custom(Arc::new(LiteralRender))
            .build()
            .unwrap();
        assert!(matches!(
            serialize(&bare),
            Err(FormulaError::SerializationUnsupported { ref reason, .. }) if reason == "no template"
        ));
    }

    proptest! {
        #[test]
        fn prop_round_trip_preserves_definition(
            name in "[a-z_]{1,12}",
            template in "[a-z0-9+*() ]{0,24}",
            symbols in proptest::collection::vec(("[a-z]{1,6}", "[a-z]{1,3}"), 0..5),
        ) {
            let definition = FormulaBuilder::new(name)
                .template(template)
                .parameters(symbols)
                .build()
                .unwrap();
            let back = from_json(&to_json(&definition).unwrap()).unwrap();
            prop_assert_eq!(back, definition);
        }
    }
}

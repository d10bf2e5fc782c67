//! Tests for JSON records of formula definitions

use graphical::prelude::*;
use graphical::{builtin, from_json, serialize, to_json, SerializedFormula};
use pretty_assertions::assert_eq;

#[test]
fn test_builtin_round_trip() {
    let arguments = Arguments::from([("a", 4), ("b", 5), ("h", 6)]);
    for entry in builtin().unwrap().formulas() {
        if entry.definition.is_custom() {
            continue;
        }
        let Ok(json) = to_json(&entry.definition) else {
            continue;
        };
        let back = from_json(&json).unwrap();
        assert_eq!(back, entry.definition);
        assert_eq!(
            back.instantiate(&arguments).unwrap().value(),
            entry.definition.instantiate(&arguments).unwrap().value()
        );
    }
}

#[test]
fn test_record_fields() {
    let record = serialize(&builtin().unwrap().formula("长方形周长").unwrap().definition).unwrap();
    assert_eq!(
        record,
        SerializedFormula {
            name: "rectangle_perimeter".into(),
            formula: "(a+b)*2".into(),
            args: ParameterMap::from([("a", "a"), ("b", "b")]),
        }
    );
}

#[test]
fn test_marketing_record() {
    let marketing = &builtin().unwrap().formula("营销号生成器").unwrap().definition;
    let record = serialize(marketing).unwrap();
    assert_eq!(record.name, "Marketing");
    assert_eq!(Some(record.formula.as_str()), marketing.template());
    assert_eq!(
        record.args,
        ParameterMap::from([("keyword", "k"), ("incident", "i"), ("another", "a")])
    );
}

#[test]
fn test_load_renamed_parameters() {
    let definition =
        from_json(r#"{"name": "speed", "formula": "d/t", "args": {"distance": "d", "time": "t"}}"#)
            .unwrap();
    let instance = definition
        .instantiate(&Arguments::from([("distance", 100), ("time", 4)]))
        .unwrap();
    assert_eq!(instance.number(), Some(Number::from(25)));
}

#[test]
fn test_extension_formulas_refuse_serialization() {
    let circle = &builtin().unwrap().formula("circle_area").unwrap().definition;
    let err = to_json(circle).unwrap_err();
    assert!(matches!(
        err,
        FormulaError::SerializationUnsupported { ref formula, .. } if formula == "circle_area"
    ));
}

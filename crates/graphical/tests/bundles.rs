//! Tests for the built-in shape bundles

use graphical::prelude::*;
use graphical::{builtin, FormulaValue};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::str::FromStr;

#[test]
fn test_synonyms_agree() {
    let cuboid = shape("cuboid", Arguments::from([("a", 2), ("b", 3), ("h", 4)])).unwrap();
    for (english, chinese) in [
        ("volume", "体积"),
        ("surface_area", "表面积"),
        ("total_length", "棱长总和"),
    ] {
        assert_eq!(cuboid.get(english).unwrap(), cuboid.get(chinese).unwrap());
    }
    assert_eq!(cuboid.get("volume").unwrap(), FormulaValue::Number(Number::from(24)));
}

#[test]
fn test_circle_bundle() {
    let circle = shape("圆形", Arguments::from([("r", 2)])).unwrap();
    assert_eq!(
        circle.get("area").unwrap(),
        FormulaValue::Number(Number::Decimal(Decimal::from_str("12.56").unwrap()))
    );
    assert_eq!(circle.get("周长").unwrap(), circle.get("perimeter").unwrap());
}

#[test]
fn test_unknown_accessor() {
    let triangle = shape("triangle", Arguments::from([("a", 3), ("h", 4)])).unwrap();
    let err = triangle.get("perimeter").unwrap_err();
    assert_eq!(err.to_string(), "'triangle' object has no attribute 'perimeter'");
}

#[test]
fn test_list_accessors() {
    assert_eq!(list_accessors("square").unwrap(), vec!["area", "perimeter", "面积", "周长"]);
    assert!(matches!(list_accessors("hexagon"), Err(FormulaError::UnknownFormula(_))));
}

#[test]
fn test_every_shape_evaluates() {
    let arguments = Arguments::from([("a", 2), ("b", 3), ("h", 4), ("r", 1)]);
    for shape in builtin().unwrap().shapes() {
        let bundle = shape.bundle_type.construct(arguments.clone());
        for accessor in shape.bundle_type.list_accessors() {
            assert!(bundle.get(accessor).is_ok(), "{}.{}", shape.name, accessor);
        }
    }
}

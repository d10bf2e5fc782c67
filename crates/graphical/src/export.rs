//! Bulk export of the built-in catalogue
//!
//! Produces one JSON object keyed by each formula's Chinese name. Formulas
//! carrying extensions cannot be serialized and are left out.

use crate::catalog::Catalog;
use graphical_formula::{serialize, FormulaResult, SerializedFormula};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::io::Write;

/// Records in catalogue order
struct Records(Vec<(&'static str, SerializedFormula)>);

impl Serialize for Records {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (display_name, record) in &self.0 {
            map.serialize_entry(display_name, record)?;
        }
        map.end()
    }
}

fn records(catalog: &Catalog) -> FormulaResult<Records> {
    let mut records = Vec::new();
    for entry in catalog.formulas() {
        if entry.definition.has_extensions() {
            tracing::debug!(formula = entry.name, "skipped in export");
            continue;
        }
        records.push((entry.display_name, serialize(&entry.definition)?));
    }
    Ok(Records(records))
}

/// Write the export as JSON with 4-space indentation
pub fn write_export<W: Write>(catalog: &Catalog, writer: W) -> FormulaResult<()> {
    let records = records(catalog)?;
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    records.serialize(&mut serializer)?;
    Ok(())
}

/// The export as a string
pub fn export_json(catalog: &Catalog) -> FormulaResult<String> {
    let mut buffer = Vec::new();
    write_export(catalog, &mut buffer)?;
    // serde_json only ever writes UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_export_shape() {
        let json = export_json(&Catalog::builtin().unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 15);
        assert!(!object.contains_key("圆形面积"));
        assert!(!object.contains_key("圆形周长"));
        assert_eq!(object["营销号生成器"]["name"], "Marketing");
        assert_eq!(object["营销号生成器"]["args"]["keyword"], "k");
        assert_eq!(object["梯形面积"]["formula"], "(a+b)*h/2");
        assert_eq!(object["梯形面积"]["name"], "trapezoid_area");
    }

    #[test]
    fn test_export_layout() {
        let json = export_json(&Catalog::builtin().unwrap()).unwrap();
        assert!(json.starts_with("{\n    \"正方形面积\": {\n        \"name\": \"square_area\","));
        assert!(json.find("正方形面积").unwrap() < json.find("长方体棱长总和").unwrap());
    }
}

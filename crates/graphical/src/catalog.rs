//! Built-in catalogue
//!
//! Geometric shape formulas, their bundles, and the marketing-copy
//! generator, each with an English and a Chinese name.

use graphical_formula::{
    parameters, BundleType, ExtensionBinding, FormulaBuilder, FormulaDefinition, FormulaError,
    FormulaResult, LiteralRender, ParameterMap,
};
use once_cell::sync::OnceCell;
use rust_decimal::Decimal;
use std::sync::Arc;

static BUILTIN: OnceCell<Catalog> = OnceCell::new();

/// The built-in catalogue, built on first use
pub fn builtin() -> FormulaResult<&'static Catalog> {
    BUILTIN.get_or_try_init(Catalog::builtin)
}

/// `(name, display name, template, parameters)`
const STANDARD_FORMULAS: &[(&str, &str, &str, &[&str])] = &[
    ("square_area", "正方形面积", "a*a", &["a"]),
    ("square_perimeter", "正方形周长", "a*4", &["a"]),
    ("rectangle_area", "长方形面积", "a*b", &["a", "b"]),
    ("rectangle_perimeter", "长方形周长", "(a+b)*2", &["a", "b"]),
    ("triangle_area", "三角形面积", "a*h/2", &["a", "h"]),
    ("trapezoid_area", "梯形面积", "(a+b)*h/2", &["a", "b", "h"]),
    ("parallelogram_area", "平行四边形面积", "a*h", &["a", "h"]),
    ("parallelogram_perimeter", "平行四边形周长", "(a+h)*2", &["a", "h"]),
    ("cube_surface_area", "正方体表面积", "a*a*6", &["a"]),
    ("cube_volume", "正方体体积", "a*a*a", &["a"]),
    ("sum_of_cube_edges", "正方体棱长总和", "a*12", &["a"]),
    ("cuboid_surface_area", "长方体表面积", "(a*b+a*h+b*h)*2", &["a", "b", "h"]),
    ("cuboid_volume", "长方体体积", "a*b*h", &["a", "b", "h"]),
    ("sum_of_cuboid_edges", "长方体棱长总和", "(a+b+h)*4", &["a", "b", "h"]),
];

/// `(name, display name, template)`, all over radius `r` with `pi` bound
const CIRCLE_FORMULAS: &[(&str, &str, &str)] = &[
    ("circle_perimeter", "圆形周长", "pi*r*2"),
    ("circle_area", "圆形面积", "pi*(r**2)"),
];

const MARKETING_TEMPLATE: &str = "ki是怎么回事呢？k相信大家都很熟悉了，但是ki是怎么回事呢？\
下面就让小编大家一起带大家了解一下吧。ki，其实就是a。大家可能会惊讶k怎么会i呢？\
但事实就是这样，小编也感到非常惊讶。这就是关于ki的事情了，大家有什么想法呢，\
欢迎在评论区告诉小编一起讨论哦！";

/// Accessor names with their Chinese synonyms
const AREA: (&str, &str) = ("area", "面积");
const PERIMETER: (&str, &str) = ("perimeter", "周长");
const VOLUME: (&str, &str) = ("volume", "体积");
const SURFACE_AREA: (&str, &str) = ("surface_area", "表面积");
const TOTAL_LENGTH: (&str, &str) = ("total_length", "棱长总和");

/// `(name, display name, [(accessor, formula name)])`
type ShapeRow = (&'static str, &'static str, &'static [((&'static str, &'static str), &'static str)]);

const SHAPES: &[ShapeRow] = &[
    ("square", "正方形", &[(AREA, "square_area"), (PERIMETER, "square_perimeter")]),
    ("rectangle", "长方形", &[(AREA, "rectangle_area"), (PERIMETER, "rectangle_perimeter")]),
    ("triangle", "三角形", &[(AREA, "triangle_area")]),
    ("trapezoid", "梯形", &[(AREA, "trapezoid_area")]),
    (
        "parallelogram",
        "平行四边形",
        &[(AREA, "parallelogram_area"), (PERIMETER, "parallelogram_perimeter")],
    ),
    (
        "cube",
        "正方体",
        &[
            (VOLUME, "cube_volume"),
            (SURFACE_AREA, "cube_surface_area"),
            (TOTAL_LENGTH, "sum_of_cube_edges"),
        ],
    ),
    (
        "cuboid",
        "长方体",
        &[
            (VOLUME, "cuboid_volume"),
            (SURFACE_AREA, "cuboid_surface_area"),
            (TOTAL_LENGTH, "sum_of_cuboid_edges"),
        ],
    ),
    ("circle", "圆形", &[(PERIMETER, "circle_perimeter"), (AREA, "circle_area")]),
];

/// A built-in formula
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// 1-based position in the catalogue
    pub id: usize,
    pub name: &'static str,
    pub display_name: &'static str,
    pub definition: FormulaDefinition,
}

/// A built-in shape bundle
#[derive(Debug, Clone)]
pub struct Shape {
    pub name: &'static str,
    pub display_name: &'static str,
    pub bundle_type: BundleType,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    formulas: Vec<CatalogEntry>,
    shapes: Vec<Shape>,
}

impl Catalog {
    /// Build the built-in catalogue
    pub fn builtin() -> FormulaResult<Self> {
        let mut formulas = Vec::new();
        let mut push = |name: &'static str, display_name: &'static str, definition| {
            let id = formulas.len() + 1;
            formulas.push(CatalogEntry {
                id,
                name,
                display_name,
                definition,
            });
        };

        for &(name, display_name, template, params) in STANDARD_FORMULAS {
            let definition = FormulaBuilder::new(name)
                .template(template)
                .parameters(ParameterMap::builder().names(params.iter().copied()))
                .build()?;
            push(name, display_name, definition);
        }

        let pi = Decimal::new(314, 2);
        for &(name, display_name, template) in CIRCLE_FORMULAS {
            let definition = FormulaBuilder::new(name)
                .template(template)
                .parameters(parameters!["r"])
                .extensions(ExtensionBinding::constant("pi", pi))
                .build()?;
            push(name, display_name, definition);
        }

        let marketing = FormulaBuilder::new("Marketing")
            .template(MARKETING_TEMPLATE)
            .parameters(parameters![keyword = "k", incident = "i", another = "a"])
            .custom(Arc::new(LiteralRender))
            .build()?;
        push("Marketing", "营销号生成器", marketing);

        let mut shapes = Vec::with_capacity(SHAPES.len());
        for &(name, display_name, accessors) in SHAPES {
            let mut builder = BundleType::builder(name);
            for &((accessor, _), formula) in accessors {
                let entry = formulas
                    .iter()
                    .find(|entry| entry.name == formula)
                    .ok_or_else(|| FormulaError::UnknownFormula(formula.to_string()))?;
                builder = builder.accessor(accessor, entry.definition.clone());
            }
            for &((accessor, synonym), _) in accessors {
                builder = builder.alias(synonym, accessor);
            }
            shapes.push(Shape {
                name,
                display_name,
                bundle_type: builder.build()?,
            });
        }

        tracing::debug!(
            formulas = formulas.len(),
            shapes = shapes.len(),
            "built-in catalogue ready"
        );
        Ok(Self { formulas, shapes })
    }

    /// All formulas, in catalogue order
    pub fn formulas(&self) -> &[CatalogEntry] {
        &self.formulas
    }

    /// Look up a formula by English or Chinese name
    pub fn formula(&self, name: &str) -> Option<&CatalogEntry> {
        self.formulas
            .iter()
            .find(|entry| entry.name == name || entry.display_name == name)
    }

    /// Look up a formula by its 1-based id
    pub fn by_id(&self, id: usize) -> Option<&CatalogEntry> {
        id.checked_sub(1).and_then(|index| self.formulas.get(index))
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Look up a shape by English or Chinese name
    pub fn shape(&self, name: &str) -> Option<&Shape> {
        self.shapes
            .iter()
            .find(|shape| shape.name == name || shape.display_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_catalogue_order_and_ids() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.formulas().len(), 17);
        assert_eq!(catalog.by_id(1).unwrap().name, "square_area");
        assert_eq!(catalog.by_id(17).unwrap().display_name, "营销号生成器");
        assert!(catalog.by_id(0).is_none());
        assert!(catalog.by_id(18).is_none());
    }

    #[test]
    fn test_lookup_by_either_name() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.formula("梯形面积").unwrap().name, "trapezoid_area");
        assert_eq!(catalog.formula("cube_volume").unwrap().display_name, "正方体体积");
        assert_eq!(catalog.shape("圆形").unwrap().name, "circle");
        assert!(catalog.formula("hexagon_area").is_none());
    }

    #[test]
    fn test_shape_accessors() {
        let catalog = Catalog::builtin().unwrap();
        let cube = &catalog.shape("cube").unwrap().bundle_type;
        assert_eq!(
            cube.list_accessors(),
            vec!["volume", "surface_area", "total_length", "体积", "表面积", "棱长总和"]
        );
    }

    #[test]
    fn test_only_circle_formulas_carry_extensions() {
        let catalog = Catalog::builtin().unwrap();
        let with_extensions: Vec<&str> = catalog
            .formulas()
            .iter()
            .filter(|entry| entry.definition.has_extensions())
            .map(|entry| entry.name)
            .collect();
        assert_eq!(with_extensions, vec!["circle_perimeter", "circle_area"]);
    }
}

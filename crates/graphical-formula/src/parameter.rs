//! Parameter mappings
//!
//! A formula's parameters map the external names callers pass as keyword
//! arguments to the symbols that appear in the template. Order is kept: it
//! decides which missing argument is reported first and the key order of
//! serialized records.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered mapping from external argument name to template symbol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: Vec<(String, String)>,
}

impl ParameterMap {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a mapping from positional names and keyword pairs
    pub fn builder() -> ParameterBuilder {
        ParameterBuilder::default()
    }

    /// Map `external` to `symbol`
    ///
    /// A name that is already present keeps its position and takes the new
    /// symbol.
    pub fn insert(&mut self, external: impl Into<String>, symbol: impl Into<String>) {
        let external = external.into();
        let symbol = symbol.into();
        match self.entries.iter_mut().find(|(name, _)| *name == external) {
            Some(entry) => entry.1 = symbol,
            None => self.entries.push((external, symbol)),
        }
    }

    /// Symbol for an external name
    pub fn get(&self, external: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == external)
            .map(|(_, symbol)| symbol.as_str())
    }

    pub fn contains(&self, external: &str) -> bool {
        self.get(external).is_some()
    }

    /// External names, in declaration order
    pub fn externals(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(external, symbol)` pairs, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, symbol)| (name.as_str(), symbol.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ParameterMap::new();
        for (external, symbol) in iter {
            map.insert(external, symbol);
        }
        map
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ParameterMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V> From<Vec<(K, V)>> for ParameterMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<ParameterBuilder> for ParameterMap {
    fn from(builder: ParameterBuilder) -> Self {
        builder.build()
    }
}

impl Serialize for ParameterMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (external, symbol) in &self.entries {
            map.serialize_entry(external, symbol)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParameterMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParameterMapVisitor;

        impl<'de> Visitor<'de> for ParameterMapVisitor {
            type Value = ParameterMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a mapping of argument names to template symbols")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ParameterMap, A::Error> {
                let mut map = ParameterMap::new();
                while let Some((external, symbol)) = access.next_entry::<String, String>()? {
                    map.insert(external, symbol);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ParameterMapVisitor)
    }
}

/// Builder mixing positional names (mapped to themselves) and keyword pairs
///
/// Keyword pairs always come after positional names in the result.
#[derive(Debug, Clone, Default)]
pub struct ParameterBuilder {
    positional: Vec<String>,
    keywords: Vec<(String, String)>,
}

impl ParameterBuilder {
    /// Add a name that appears in the template as itself
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.positional.push(name.into());
        self
    }

    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.positional.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add an external name mapped to a different template symbol
    pub fn keyword(mut self, external: impl Into<String>, symbol: impl Into<String>) -> Self {
        self.keywords.push((external.into(), symbol.into()));
        self
    }

    pub fn keywords<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.keywords
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn build(self) -> ParameterMap {
        let mut map = ParameterMap::new();
        for name in self.positional {
            map.insert(name.clone(), name);
        }
        for (external, symbol) in self.keywords {
            map.insert(external, symbol);
        }
        map
    }
}

/// Build a [`ParameterMap`]
///
/// ```rust
/// use graphical_formula::parameters;
///
/// let plain = parameters!["a", "b"];
/// assert_eq!(plain.get("b"), Some("b"));
///
/// let renamed = parameters![keyword = "k", incident = "i"];
/// assert_eq!(renamed.get("incident"), Some("i"));
///
/// let mixed = parameters!["a"; height = "h"];
/// assert_eq!(mixed.externals().collect::<Vec<_>>(), ["a", "height"]);
/// ```
#[macro_export]
macro_rules! parameters {
    () => {
        $crate::ParameterMap::new()
    };
    ($($name:literal),+ $(,)?) => {
        $crate::ParameterMap::builder()
            $(.name($name))+
            .build()
    };
    ($($external:ident = $symbol:expr),+ $(,)?) => {
        $crate::ParameterMap::builder()
            $(.keyword(stringify!($external), $symbol))+
            .build()
    };
    ($($name:literal),+ ; $($external:ident = $symbol:expr),+ $(,)?) => {
        $crate::ParameterMap::builder()
            $(.name($name))+
            $(.keyword(stringify!($external), $symbol))+
            .build()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_positional_then_keyword() {
        let map = ParameterMap::builder()
            .keyword("height", "h")
            .names(["a", "b"])
            .build();
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![("a", "a"), ("b", "b"), ("height", "h")]
        );
    }

    #[test]
    fn test_repeated_name_keeps_position() {
        let map = ParameterMap::builder()
            .names(["a", "b"])
            .keyword("a", "x")
            .build();
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("a", "x"), ("b", "b")]);
    }

    #[test]
    fn test_macro_forms() {
        assert!(parameters![].is_empty());
        assert_eq!(parameters!["a", "b"], ParameterMap::from([("a", "a"), ("b", "b")]));
        assert_eq!(
            parameters![keyword = "k", another = "a"],
            ParameterMap::from([("keyword", "k"), ("another", "a")])
        );
        assert_eq!(
            parameters!["a", "b"; h = "h"],
            ParameterMap::from([("a", "a"), ("b", "b"), ("h", "h")])
        );
    }

    #[test]
    fn test_json_keeps_order() {
        let map = ParameterMap::from([("z", "z"), ("a", "x")]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"z":"z","a":"x"}"#);

        let back: ParameterMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back.externals().collect::<Vec<_>>(), vec!["z", "a"]);
    }
}

//! Bundles of related formulas
//!
//! A [`BundleType`] groups definitions that share one argument set, such as
//! the area and perimeter of a shape. Constructing it with arguments gives a
//! [`Bundle`] whose accessors are computed on first read and cached.
//!
//! Accessor lookup:
//! 1. Declared accessors (aliases share the cache slot of their target)
//! 2. The bundle type's [`Resolver`], if any
//! 3. Otherwise [`FormulaError::UnknownAccessor`]

use crate::definition::FormulaDefinition;
use crate::engine::Engine;
use crate::error::{FormulaError, FormulaResult};
use crate::instance::{Arguments, FormulaInstance, FormulaValue};
use once_cell::sync::OnceCell;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// What a resolver produces for an accessor name
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Instantiated with the bundle's arguments
    Definition(FormulaDefinition),
    /// Returned as is
    Instance(FormulaInstance),
}

/// Fallback lookup for accessors a bundle type does not declare
pub trait Resolver: Send + Sync {
    fn resolve(&self, accessor: &str, arguments: &Arguments) -> Option<Resolution>;
}

impl<F> Resolver for F
where
    F: Fn(&str, &Arguments) -> Option<Resolution> + Send + Sync,
{
    fn resolve(&self, accessor: &str, arguments: &Arguments) -> Option<Resolution> {
        self(accessor, arguments)
    }
}

struct BundleTypeInner {
    name: String,
    /// Accessor name -> slot, in declaration order
    accessors: Vec<(String, usize)>,
    slots: Vec<FormulaDefinition>,
    resolver: Option<Arc<dyn Resolver>>,
}

/// A named set of accessors over formula definitions
#[derive(Clone)]
pub struct BundleType {
    inner: Arc<BundleTypeInner>,
}

impl fmt::Debug for BundleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleType")
            .field("name", &self.inner.name)
            .field("accessors", &self.list_accessors())
            .field("resolver", &self.inner.resolver.is_some())
            .finish()
    }
}

impl BundleType {
    pub fn builder(name: impl Into<String>) -> BundleBuilder {
        BundleBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Declared accessor names (aliases included), in declaration order
    pub fn list_accessors(&self) -> Vec<&str> {
        self.inner
            .accessors
            .iter()
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Definition behind a declared accessor
    pub fn definition(&self, accessor: &str) -> Option<&FormulaDefinition> {
        self.slot(accessor).map(|slot| &self.inner.slots[slot])
    }

    /// Bind arguments, using the process-wide engine
    pub fn construct(&self, arguments: Arguments) -> Bundle {
        self.construct_with(Engine::global().clone(), arguments)
    }

    pub fn construct_with(&self, engine: Engine, arguments: Arguments) -> Bundle {
        Bundle {
            bundle_type: self.clone(),
            cells: self.inner.slots.iter().map(|_| OnceCell::new()).collect(),
            arguments,
            engine,
        }
    }

    fn slot(&self, accessor: &str) -> Option<usize> {
        self.inner
            .accessors
            .iter()
            .find(|(name, _)| name == accessor)
            .map(|(_, slot)| *slot)
    }
}

/// Builder for [`BundleType`]
pub struct BundleBuilder {
    name: String,
    accessors: Vec<(String, usize)>,
    slots: Vec<FormulaDefinition>,
    aliases: Vec<(String, String)>,
    resolver: Option<Arc<dyn Resolver>>,
}

impl BundleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accessors: Vec::new(),
            slots: Vec::new(),
            aliases: Vec::new(),
            resolver: None,
        }
    }

    /// Declare an accessor with its own cache slot
    pub fn accessor(mut self, name: impl Into<String>, definition: FormulaDefinition) -> Self {
        self.accessors.push((name.into(), self.slots.len()));
        self.slots.push(definition);
        self
    }

    /// Declare another name for an existing accessor
    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), target.into()));
        self
    }

    pub fn resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Fails if an alias points at an accessor that was never declared
    pub fn build(mut self) -> FormulaResult<BundleType> {
        for (alias, target) in std::mem::take(&mut self.aliases) {
            let slot = self
                .accessors
                .iter()
                .find(|(name, _)| *name == target)
                .map(|(_, slot)| *slot)
                .ok_or_else(|| FormulaError::UnknownAccessor {
                    bundle: self.name.clone(),
                    accessor: target.clone(),
                })?;
            self.accessors.push((alias, slot));
        }

        Ok(BundleType {
            inner: Arc::new(BundleTypeInner {
                name: self.name,
                accessors: self.accessors,
                slots: self.slots,
                resolver: self.resolver,
            }),
        })
    }
}

/// A bundle type bound to shared arguments
pub struct Bundle {
    bundle_type: BundleType,
    cells: Vec<OnceCell<FormulaInstance>>,
    arguments: Arguments,
    engine: Engine,
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("bundle_type", &self.bundle_type.name())
            .field("arguments", &self.arguments)
            .finish()
    }
}

impl Bundle {
    pub fn bundle_type(&self) -> &BundleType {
        &self.bundle_type
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Instance behind an accessor
    ///
    /// Declared accessors are borrowed from the cache; resolver results are
    /// built on every call.
    pub fn instance(&self, accessor: &str) -> FormulaResult<Cow<'_, FormulaInstance>> {
        if let Some(slot) = self.bundle_type.slot(accessor) {
            let definition = &self.bundle_type.inner.slots[slot];
            let instance = self.cells[slot]
                .get_or_try_init(|| definition.instantiate_with(&self.engine, &self.arguments))?;
            return Ok(Cow::Borrowed(instance));
        }

        let resolution = self
            .bundle_type
            .inner
            .resolver
            .as_ref()
            .and_then(|resolver| resolver.resolve(accessor, &self.arguments));

        match resolution {
            Some(Resolution::Definition(definition)) => Ok(Cow::Owned(
                definition.instantiate_with(&self.engine, &self.arguments)?,
            )),
            Some(Resolution::Instance(instance)) => Ok(Cow::Owned(instance)),
            None => Err(FormulaError::UnknownAccessor {
                bundle: self.bundle_type.name().to_string(),
                accessor: accessor.to_string(),
            }),
        }
    }

    /// Value behind an accessor
    pub fn get(&self, accessor: &str) -> FormulaResult<FormulaValue> {
        Ok(self.instance(accessor)?.value().clone())
    }
}

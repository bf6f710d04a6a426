use arcstr::ArcStr;
use async_graphql::dynamic;
use indexmap::IndexMap;

use crate::error::Error;

struct Entry {
    /// Address of the definition owning the name.
    definition: usize,
    /// Weak type, or [`None`] while it is being built.
    ty: Option<dynamic::Type>,
}

/// A type registry used to build schemas.
///
/// The registry gathers the weak types of every named type reachable from the
/// schema roots. Each type is built at most once: a placeholder is inserted
/// before building it, so recursive type graphs terminate.
///
/// Every name belongs to a single definition. Clones of a descriptor share
/// their definition, while every builder step creates a new one.
#[derive(Default)]
pub struct Registry {
    types: IndexMap<ArcStr, Entry>,
}

fn address<D: ?Sized>(definition: &D) -> usize {
    std::ptr::from_ref(definition).cast::<()>().addr()
}

impl Registry {
    /// Constructs a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `name` for `definition`, returning whether it was claimed
    /// before.
    fn claim<D: ?Sized>(&mut self, name: &str, definition: &D) -> Result<bool, Error> {
        let definition = address(definition);
        match self.types.get(name) {
            Some(entry) if entry.definition == definition => Ok(true),
            Some(_) => Err(Error::DuplicateType {
                type_name: name.into(),
            }),
            None => {
                self.types
                    .insert(name.into(), Entry { definition, ty: None });
                Ok(false)
            }
        }
    }

    /// Registers the named type of `definition`, building its weak type with
    /// `build` unless it was seen before.
    ///
    /// # Errors
    ///
    /// With [`Error::DuplicateType`] if another definition registered the
    /// same name, or if `build` fails.
    pub fn register_with<D, F, T>(&mut self, name: &str, definition: &D, build: F) -> Result<(), Error>
    where
        D: ?Sized,
        F: FnOnce(&mut Self) -> Result<T, Error>,
        T: Into<dynamic::Type>,
    {
        if self.claim(name, definition)? {
            return Ok(());
        }

        __strong_graphql_trace_debug!("Registering type `{}`", name);

        let ty = build(self)?;
        self.define(name, ty);
        Ok(())
    }

    /// Reserves `name` for `definition`, so that reaching it while walking
    /// other types doesn't build it.
    ///
    /// The reserved type is built later with [`Registry::define()`].
    pub(crate) fn reserve<D: ?Sized>(&mut self, name: &str, definition: &D) -> Result<(), Error> {
        self.claim(name, definition).map(drop)
    }

    /// Stores the built weak type of a claimed `name`.
    pub(crate) fn define(&mut self, name: &str, ty: impl Into<dynamic::Type>) {
        if let Some(entry) = self.types.get_mut(name) {
            entry.ty = Some(ty.into());
        }
    }

    /// Indicates whether a type with this name was registered, or is being
    /// registered right now.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns the names of the registered types, in registration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(ArcStr::as_str)
    }

    /// Consumes this registry, returning the built weak types.
    pub(crate) fn into_types(self) -> impl Iterator<Item = dynamic::Type> {
        self.types.into_values().filter_map(|entry| entry.ty)
    }
}

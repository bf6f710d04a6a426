//! Field definitions shared by objects and interfaces.

use std::{
    any::{Any, TypeId},
    sync::{Arc, OnceLock},
};

use arcstr::ArcStr;
use async_graphql::dynamic::{FieldValue, TypeRef};

use crate::{
    description::trimmed,
    error::{Error, FieldError, FieldResult},
    schema::registry::Registry,
    types::{
        args::{ArgsConfig, ErasedArgs, duplicate_name},
        base::{GraphQLType, OutputType},
    },
};

type Thunk<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Type of a field, either known up front or supplied lazily.
pub(crate) enum FieldType<T> {
    Direct(T),
    Deferred { thunk: Thunk<T>, ty: OnceLock<T> },
}

impl<T: GraphQLType> FieldType<T> {
    /// Returns the type, evaluating a deferred supplier on first access only.
    pub(crate) fn get(&self) -> &T {
        match self {
            Self::Direct(ty) => ty,
            Self::Deferred { thunk, ty } => ty.get_or_init(|| thunk()),
        }
    }

    pub(crate) fn into_nullable(self) -> FieldType<T::Nullable> {
        match self {
            Self::Direct(ty) => FieldType::Direct(ty.nullable()),
            Self::Deferred { thunk, .. } => FieldType::Deferred {
                thunk: Box::new(move || thunk().nullable()),
                ty: OnceLock::new(),
            },
        }
    }
}

/// Configuration of a field of type `T`, taking arguments `A`.
pub struct FieldConfig<T, A = ()> {
    pub(crate) name: ArcStr,
    pub(crate) ty: FieldType<T>,
    pub(crate) args: A,
    pub(crate) description: Option<ArcStr>,
    pub(crate) deprecation_reason: Option<ArcStr>,
}

impl<T: GraphQLType> FieldConfig<T> {
    /// Declares a field named `name` of the provided type.
    pub fn new(name: impl Into<ArcStr>, ty: T) -> Self {
        Self::with_type(name, FieldType::Direct(ty))
    }

    /// Declares a field named `name` whose type is supplied by `thunk`.
    ///
    /// The thunk is evaluated at most once, and not before the owning type is
    /// assembled into a schema. This allows a field to refer to its own type,
    /// or to types declared after it.
    pub fn deferred<F>(name: impl Into<ArcStr>, thunk: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::with_type(
            name,
            FieldType::Deferred {
                thunk: Box::new(thunk),
                ty: OnceLock::new(),
            },
        )
    }

    fn with_type(name: impl Into<ArcStr>, ty: FieldType<T>) -> Self {
        Self {
            name: name.into(),
            ty,
            args: (),
            description: None,
            deprecation_reason: None,
        }
    }
}

impl<T, A> FieldConfig<T, A> {
    /// Sets the description of this field.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = trimmed(description);
        self
    }

    /// Marks this field as deprecated for the provided reason.
    #[must_use]
    pub fn deprecation_reason(mut self, reason: impl Into<ArcStr>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    /// Declares the arguments of this field, replacing any declared before.
    ///
    /// The resolver of the field receives their parsed values as a tuple.
    pub fn args<B: ArgsConfig>(self, args: B) -> FieldConfig<T, B> {
        FieldConfig {
            name: self.name,
            ty: self.ty,
            args,
            description: self.description,
            deprecation_reason: self.deprecation_reason,
        }
    }

    /// Returns the name of this field.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: GraphQLType, A> FieldConfig<T, A> {
    pub(crate) fn into_nullable(self) -> FieldConfig<T::Nullable, A> {
        FieldConfig {
            name: self.name,
            ty: self.ty.into_nullable(),
            args: self.args,
            description: self.description,
            deprecation_reason: self.deprecation_reason,
        }
    }
}

/// Type-erased output type of a field.
pub(crate) trait ErasedOutput: Send + Sync {
    fn weak_output_type(&self) -> TypeRef;

    fn register(&self, registry: &mut Registry) -> Result<(), Error>;

    fn value_type(&self) -> (TypeId, &'static str);

    fn resolve_any(&self, value: Box<dyn Any + Send>) -> FieldResult<Option<FieldValue<'static>>>;
}

impl<T: OutputType> ErasedOutput for FieldType<T> {
    fn weak_output_type(&self) -> TypeRef {
        self.get().weak_output_type()
    }

    fn register(&self, registry: &mut Registry) -> Result<(), Error> {
        self.get().register(registry)
    }

    fn value_type(&self) -> (TypeId, &'static str) {
        (TypeId::of::<T::Value>(), std::any::type_name::<T::Value>())
    }

    fn resolve_any(&self, value: Box<dyn Any + Send>) -> FieldResult<Option<FieldValue<'static>>> {
        let value = value.downcast::<T::Value>().map_err(|_| {
            FieldError::new(format!(
                "Resolver returned a value other than `{}`",
                std::any::type_name::<T::Value>(),
            ))
        })?;
        self.get().resolve_output(*value)
    }
}

/// Field of an object or an interface, without its resolver.
#[derive(Clone)]
pub(crate) struct FieldDef {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    pub(crate) deprecation_reason: Option<ArcStr>,
    pub(crate) ty: Arc<dyn ErasedOutput>,
    pub(crate) args: Arc<dyn ErasedArgs>,
}

impl FieldDef {
    /// Splits the provided configuration into a definition and the typed
    /// parts a resolver needs.
    ///
    /// Fails if an argument name repeats.
    pub(crate) fn from_config<T, A>(
        type_name: &ArcStr,
        config: FieldConfig<T, A>,
    ) -> Result<(Self, Arc<FieldType<T>>, Arc<A>), Error>
    where
        T: OutputType,
        A: ArgsConfig,
    {
        let FieldConfig {
            name,
            ty,
            args,
            description,
            deprecation_reason,
        } = config;

        if let Some(argument_name) = duplicate_name(&args) {
            return Err(Error::DuplicateArgument {
                type_name: type_name.clone(),
                field_name: name,
                argument_name,
            });
        }

        let ty = Arc::new(ty);
        let args = Arc::new(args);
        let def = Self {
            name,
            description,
            deprecation_reason,
            ty: Arc::clone(&ty) as Arc<dyn ErasedOutput>,
            args: Arc::clone(&args) as Arc<dyn ErasedArgs>,
        };
        Ok((def, ty, args))
    }
}

/// Fails if `name` is already among `existing` field names of the type
/// `type_name`.
pub(crate) fn ensure_unique<'a>(
    type_name: &ArcStr,
    mut existing: impl Iterator<Item = &'a ArcStr>,
    name: &ArcStr,
) -> Result<(), Error> {
    if existing.any(|n| n == name) {
        return Err(Error::DuplicateField {
            type_name: type_name.clone(),
            field_name: name.clone(),
        });
    }
    Ok(())
}

/// Returns a copy of `fields` extended with `field`, leaving the original
/// sequence intact.
pub(crate) fn appended<F>(fields: &[Arc<F>], field: F) -> Vec<Arc<F>> {
    fields
        .iter()
        .cloned()
        .chain(std::iter::once(Arc::new(field)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use crate::{FieldConfig, GraphQLType as _, integer_type, types::field::ErasedOutput as _};

    #[test]
    fn thunk_is_lazy_and_evaluated_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = {
            let calls = Arc::clone(&calls);
            FieldConfig::deferred("a", move || {
                calls.fetch_add(1, Ordering::SeqCst);
                integer_type()
            })
        };
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(config.ty.weak_output_type().to_string(), "Int!");
        assert_eq!(config.ty.weak_output_type().to_string(), "Int!");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn nullable_coercion_applies_to_thunks() {
        let config = FieldConfig::deferred("a", integer_type).into_nullable();

        assert_eq!(config.ty.get().weak_type().to_string(), "Int");
    }
}

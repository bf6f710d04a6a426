//! Adapter lifting engine types into the capability lattice.

use std::{fmt, marker::PhantomData, sync::Arc};

use arcstr::ArcStr;
use async_graphql::{
    Value,
    dynamic::{self, FieldValue, TypeRef},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{Error, FieldResult},
    schema::registry::Registry,
    types::{
        base::{BaseType, InputBase, OutputBase},
        marker::{Capability, InputOutput, IsInput, IsOutput, TypeCapability},
        nullable::{NonNull, Nullable},
    },
};

type BuildWeak = Arc<dyn Fn() -> dynamic::Type + Send + Sync>;

/// Type defined directly in the engine's own type system.
#[derive(Clone)]
pub enum WeakType {
    /// Built-in `Int` scalar.
    Int,

    /// Built-in `Float` scalar.
    Float,

    /// Built-in `String` scalar.
    String,

    /// Built-in `Boolean` scalar.
    Boolean,

    /// Built-in `ID` scalar.
    Id,

    /// Named type built by the engine's dynamic API.
    Custom {
        /// Name of the type.
        name: ArcStr,
        /// Capability inferred from the kind of the type.
        capability: TypeCapability,
        /// Builds a fresh weak definition for every schema using the type.
        build: BuildWeak,
    },
}

impl fmt::Debug for WeakType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom {
                name, capability, ..
            } => f
                .debug_struct("Custom")
                .field("name", name)
                .field("capability", capability)
                .finish_non_exhaustive(),
            builtin => f.write_str(builtin.name()),
        }
    }
}

impl WeakType {
    fn custom<T, F>(name: &str, capability: TypeCapability, build: F) -> Self
    where
        T: Into<dynamic::Type> + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            capability,
            build: Arc::new(move || build().into()),
        }
    }

    /// Wraps a custom scalar, usable both as input and as output.
    pub fn scalar<F>(build: F) -> Self
    where
        F: Fn() -> dynamic::Scalar + Send + Sync + 'static,
    {
        let name = build().type_name().to_owned();
        Self::custom(&name, TypeCapability::InputOutput, build)
    }

    /// Wraps an enum, usable both as input and as output.
    pub fn enumeration<F>(build: F) -> Self
    where
        F: Fn() -> dynamic::Enum + Send + Sync + 'static,
    {
        let name = build().type_name().to_owned();
        Self::custom(&name, TypeCapability::InputOutput, build)
    }

    /// Wraps an input object, usable only as input.
    pub fn input_object<F>(build: F) -> Self
    where
        F: Fn() -> dynamic::InputObject + Send + Sync + 'static,
    {
        let name = build().type_name().to_owned();
        Self::custom(&name, TypeCapability::Input, build)
    }

    /// Wraps an object, usable only as output.
    pub fn object<F>(build: F) -> Self
    where
        F: Fn() -> dynamic::Object + Send + Sync + 'static,
    {
        let name = build().type_name().to_owned();
        Self::custom(&name, TypeCapability::Output, build)
    }

    /// Wraps an interface, usable only as output.
    pub fn interface<F>(build: F) -> Self
    where
        F: Fn() -> dynamic::Interface + Send + Sync + 'static,
    {
        let name = build().type_name().to_owned();
        Self::custom(&name, TypeCapability::Output, build)
    }

    /// Wraps a union, usable only as output.
    pub fn union<F>(build: F) -> Self
    where
        F: Fn() -> dynamic::Union + Send + Sync + 'static,
    {
        let name = build().type_name().to_owned();
        Self::custom(&name, TypeCapability::Output, build)
    }

    /// Returns the name of this type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Int => TypeRef::INT,
            Self::Float => TypeRef::FLOAT,
            Self::String => TypeRef::STRING,
            Self::Boolean => TypeRef::BOOLEAN,
            Self::Id => TypeRef::ID,
            Self::Custom { name, .. } => name.as_str(),
        }
    }

    /// Infers the capability of this type from its kind.
    #[must_use]
    pub fn capability(&self) -> TypeCapability {
        match self {
            Self::Custom { capability, .. } => *capability,
            _ => TypeCapability::InputOutput,
        }
    }
}

/// Definition wrapping a [`WeakType`], with values of type `V` crossing the
/// boundary through `serde`.
pub struct Wrapped<V, C = InputOutput> {
    weak: WeakType,
    _marker: PhantomData<fn() -> (V, C)>,
}

/// Non-null wrapped engine type.
pub type WrappedType<V, C = InputOutput> = NonNull<Wrapped<V, C>>;

/// Nullable wrapped engine type.
pub type NullableWrappedType<V, C = InputOutput> = Nullable<Wrapped<V, C>>;

/// Built-in `Int` type.
pub type IntegerType = WrappedType<i32>;

/// Built-in `Float` type.
pub type FloatType = WrappedType<f64>;

/// Built-in `String` type.
pub type StringType = WrappedType<String>;

/// Built-in `Boolean` type.
pub type BooleanType = WrappedType<bool>;

/// Built-in `ID` type.
pub type IdType = WrappedType<String>;

impl<V, C> Wrapped<V, C> {
    /// Returns the wrapped engine type.
    pub fn weak(&self) -> &WeakType {
        &self.weak
    }
}

impl<V, C> BaseType for Wrapped<V, C>
where
    V: Send + Sync + 'static,
    C: Capability,
{
    type Value = V;

    fn name(&self) -> Option<&str> {
        Some(self.weak.name())
    }

    fn weak_base_type(&self) -> TypeRef {
        TypeRef::named(self.weak.name().to_owned())
    }

    fn capability(&self) -> TypeCapability {
        C::CAPABILITY
    }

    fn register(&self, registry: &mut Registry) -> Result<(), Error> {
        match &self.weak {
            // Wrappers of one `WeakType` share its builder, whatever their
            // capability and value type.
            WeakType::Custom { name, build, .. } => {
                registry.register_with(name, &**build, |_| Ok(build()))
            }
            _ => Ok(()),
        }
    }
}

impl<V, C> OutputBase for Wrapped<V, C>
where
    V: Serialize + Send + Sync + 'static,
    C: IsOutput,
{
    fn resolve_base(&self, value: V) -> FieldResult<FieldValue<'static>> {
        Ok(FieldValue::value(async_graphql::to_value(value)?))
    }
}

impl<V, C> InputBase for Wrapped<V, C>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
    C: IsInput,
{
    fn parse_base(&self, value: &Value) -> FieldResult<V> {
        let value = match (&self.weak, value) {
            // `ID` accepts integer input, representing it as a string.
            (WeakType::Id, Value::Number(n)) => Value::String(n.to_string()),
            (_, v) => v.clone(),
        };
        Ok(async_graphql::from_value(value)?)
    }

    fn base_input_value(&self, value: &V) -> FieldResult<Value> {
        Ok(async_graphql::to_value(value)?)
    }
}

/// Lifts an engine type into the capability lattice as capability `C`.
///
/// # Errors
///
/// With [`Error::Capability`] if the capability inferred from the kind of the
/// engine type does not cover `C`.
pub fn wrap_weak_type<V, C>(weak: WeakType) -> Result<WrappedType<V, C>, Error>
where
    V: Send + Sync + 'static,
    C: Capability,
{
    let inferred = weak.capability();
    if !inferred.includes(C::CAPABILITY) {
        return Err(Error::Capability {
            type_name: weak.name().into(),
            requested: C::CAPABILITY,
            inferred,
        });
    }
    Ok(builtin(weak))
}

fn builtin<V, C>(weak: WeakType) -> WrappedType<V, C> {
    NonNull::new(Wrapped {
        weak,
        _marker: PhantomData,
    })
}

/// Returns the built-in `Int` type.
#[must_use]
pub fn integer_type() -> IntegerType {
    builtin(WeakType::Int)
}

/// Returns the built-in `Float` type.
#[must_use]
pub fn float_type() -> FloatType {
    builtin(WeakType::Float)
}

/// Returns the built-in `String` type.
#[must_use]
pub fn string_type() -> StringType {
    builtin(WeakType::String)
}

/// Returns the built-in `Boolean` type.
#[must_use]
pub fn boolean_type() -> BooleanType {
    builtin(WeakType::Boolean)
}

/// Returns the built-in `ID` type.
#[must_use]
pub fn id_type() -> IdType {
    builtin(WeakType::Id)
}

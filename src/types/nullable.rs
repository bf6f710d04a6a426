use std::{fmt, sync::Arc};

use async_graphql::{Value, dynamic::FieldValue, dynamic::TypeRef};

use crate::{
    error::{Error, FieldError, FieldResult},
    schema::registry::Registry,
    types::{
        base::{BaseType, GraphQLType, InputBase, InputType, OutputBase, OutputType},
        marker::TypeCapability,
    },
};

/// Non-null form of a definition `D`.
///
/// This is the form every constructor returns. Its nullable sibling is
/// obtained with [`GraphQLType::nullable()`].
pub struct NonNull<D> {
    def: Arc<D>,
}

/// Nullable form of a definition `D`.
///
/// Shares its definition with the [`NonNull`] form it was obtained from.
pub struct Nullable<D> {
    def: Arc<D>,
}

impl<D> NonNull<D> {
    pub(crate) fn new(def: D) -> Self {
        Self { def: Arc::new(def) }
    }

    pub(crate) fn definition(&self) -> &D {
        &self.def
    }
}

// Implemented manually to omit redundant `D: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<D> Clone for NonNull<D> {
    fn clone(&self) -> Self {
        Self {
            def: Arc::clone(&self.def),
        }
    }
}

impl<D> Clone for Nullable<D> {
    fn clone(&self) -> Self {
        Self {
            def: Arc::clone(&self.def),
        }
    }
}

impl<D: BaseType> fmt::Debug for NonNull<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NonNull")
            .field(&self.weak_type().to_string())
            .finish()
    }
}

impl<D: BaseType> fmt::Debug for Nullable<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Nullable")
            .field(&self.weak_type().to_string())
            .finish()
    }
}

impl<D: BaseType> GraphQLType for NonNull<D> {
    type Inner = D::Value;
    type Value = D::Value;
    type Nullable = Nullable<D>;

    fn name(&self) -> Option<&str> {
        self.def.name()
    }

    fn weak_type(&self) -> TypeRef {
        TypeRef::NonNull(Box::new(self.def.weak_base_type()))
    }

    fn nullable(&self) -> Nullable<D> {
        Nullable {
            def: Arc::clone(&self.def),
        }
    }

    fn capability(&self) -> TypeCapability {
        self.def.capability()
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.def, &other.def)
    }

    fn register(&self, registry: &mut Registry) -> Result<(), Error> {
        self.def.register(registry)
    }
}

impl<D: BaseType> GraphQLType for Nullable<D> {
    type Inner = D::Value;
    type Value = Option<D::Value>;
    type Nullable = Self;

    fn name(&self) -> Option<&str> {
        self.def.name()
    }

    fn weak_type(&self) -> TypeRef {
        self.def.weak_base_type()
    }

    fn nullable(&self) -> Self {
        self.clone()
    }

    fn capability(&self) -> TypeCapability {
        self.def.capability()
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.def, &other.def)
    }

    fn register(&self, registry: &mut Registry) -> Result<(), Error> {
        self.def.register(registry)
    }
}

impl<D: OutputBase> OutputType for NonNull<D> {
    fn resolve_output(&self, value: D::Value) -> FieldResult<Option<FieldValue<'static>>> {
        self.def.resolve_base(value).map(Some)
    }
}

impl<D: OutputBase> OutputType for Nullable<D> {
    fn resolve_output(&self, value: Option<D::Value>) -> FieldResult<Option<FieldValue<'static>>> {
        value.map(|v| self.def.resolve_base(v)).transpose()
    }
}

impl<D: InputBase> InputType for NonNull<D> {
    fn parse_input(&self, value: Option<&Value>) -> FieldResult<D::Value> {
        match value {
            None | Some(Value::Null) => Err(FieldError::new(format!(
                "Expected a non-null value of type `{}`",
                self.weak_type(),
            ))),
            Some(v) => self.def.parse_base(v),
        }
    }

    fn to_input_value(&self, value: &D::Value) -> FieldResult<Value> {
        self.def.base_input_value(value)
    }
}

impl<D: InputBase> InputType for Nullable<D> {
    fn parse_input(&self, value: Option<&Value>) -> FieldResult<Option<D::Value>> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(v) => self.def.parse_base(v).map(Some),
        }
    }

    fn to_input_value(&self, value: &Option<D::Value>) -> FieldResult<Value> {
        value
            .as_ref()
            .map_or(Ok(Value::Null), |v| self.def.base_input_value(v))
    }
}

/// Returns the nullable form of the provided type.
///
/// Equivalent to calling [`GraphQLType::nullable()`], for declarations reading
/// better with a standalone function.
pub fn create_nullable_type<T: GraphQLType>(ty: &T) -> T::Nullable {
    ty.nullable()
}

#[cfg(test)]
mod tests {
    use crate::{GraphQLType as _, InputType as _, OutputType as _, Value, integer_type};

    #[test]
    fn nullable_is_stable() {
        let int = integer_type();

        assert!(int.nullable().ptr_eq(&int.nullable()));
    }

    #[test]
    fn nullable_is_idempotent() {
        let int = integer_type().nullable();

        assert!(int.nullable().ptr_eq(&int));
        assert!(int.nullable().nullable().ptr_eq(&int.nullable()));
    }

    #[test]
    fn forms_differ_only_in_weak_nullability() {
        let int = integer_type();

        assert_eq!(int.weak_type().to_string(), "Int!");
        assert_eq!(int.nullable().weak_type().to_string(), "Int");
        assert_eq!(int.name(), int.nullable().name());
    }

    #[test]
    fn null_handling_at_the_boundary() {
        let int = integer_type();

        assert!(int.parse_input(None).is_err());
        assert!(int.parse_input(Some(&Value::Null)).is_err());
        assert_eq!(int.nullable().parse_input(Some(&Value::Null)).ok(), Some(None));
        assert!(int.nullable().resolve_output(None).is_ok_and(|v| v.is_none()));
        assert_eq!(int.nullable().to_input_value(&None).ok(), Some(Value::Null));
    }
}

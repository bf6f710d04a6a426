use async_graphql::{Value, dynamic::FieldValue, dynamic::TypeRef};

use crate::{
    error::{Error, FieldResult},
    schema::registry::Registry,
    types::{
        base::{BaseType, GraphQLType, InputBase, InputType, OutputBase, OutputType},
        marker::TypeCapability,
        nullable::{NonNull, Nullable},
    },
};

/// List definition wrapping an item type `T`.
///
/// A list is usable as input or output exactly when its item type is.
pub struct List<T> {
    of_type: T,
}

/// Non-null list of `T`.
pub type ListType<T> = NonNull<List<T>>;

/// Nullable list of `T`.
pub type NullableListType<T> = Nullable<List<T>>;

impl<T: GraphQLType> List<T> {
    /// Returns the item type of this list.
    pub fn of_type(&self) -> &T {
        &self.of_type
    }
}

impl<T: GraphQLType> BaseType for List<T> {
    type Value = Vec<T::Value>;

    fn name(&self) -> Option<&str> {
        None
    }

    fn weak_base_type(&self) -> TypeRef {
        TypeRef::List(Box::new(self.of_type.weak_type()))
    }

    fn capability(&self) -> TypeCapability {
        self.of_type.capability()
    }

    fn register(&self, registry: &mut Registry) -> Result<(), Error> {
        self.of_type.register(registry)
    }
}

impl<T: OutputType> OutputBase for List<T> {
    fn resolve_base(&self, value: Vec<T::Value>) -> FieldResult<FieldValue<'static>> {
        let items = value
            .into_iter()
            .map(|v| {
                self.of_type
                    .resolve_output(v)
                    .map(|item| item.unwrap_or(FieldValue::NULL))
            })
            .collect::<FieldResult<Vec<_>>>()?;
        Ok(FieldValue::list(items))
    }
}

impl<T: InputType> InputBase for List<T> {
    fn parse_base(&self, value: &Value) -> FieldResult<Vec<T::Value>> {
        match value {
            Value::List(items) => items
                .iter()
                .map(|item| self.of_type.parse_input(Some(item)))
                .collect(),
            // Input coercion accepts a single item in place of a list.
            v => Ok(vec![self.of_type.parse_input(Some(v))?]),
        }
    }

    fn base_input_value(&self, value: &Vec<T::Value>) -> FieldResult<Value> {
        value
            .iter()
            .map(|v| self.of_type.to_input_value(v))
            .collect::<FieldResult<_>>()
            .map(Value::List)
    }
}

/// Creates a non-null list of the provided item type.
///
/// Lists compose, so `create_list_type(create_list_type(ty))` describes a list
/// of lists.
pub fn create_list_type<T: GraphQLType>(of_type: T) -> ListType<T> {
    NonNull::new(List { of_type })
}

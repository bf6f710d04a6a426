use async_graphql::{Value, dynamic::FieldValue, dynamic::TypeRef};

use crate::{
    error::{Error, FieldResult},
    schema::registry::Registry,
    types::marker::TypeCapability,
};

/// Primary trait of type descriptors.
///
/// Every descriptor exists in two forms sharing one definition: the non-null
/// form returned by constructors, and the nullable form reachable through
/// [`nullable()`](GraphQLType::nullable). Both forms expose the weak type the
/// engine uses to represent them.
pub trait GraphQLType: Clone + Send + Sync + 'static {
    /// Rust value of the underlying definition, regardless of nullability.
    type Inner: Send + Sync + 'static;

    /// Rust value of this exact form.
    ///
    /// Equals [`Inner`](GraphQLType::Inner) for non-null forms, and
    /// `Option<Inner>` for nullable ones.
    type Value: Send + Sync + 'static;

    /// Nullable form of this descriptor.
    type Nullable: GraphQLType<Inner = Self::Inner, Value = Option<Self::Inner>>;

    /// Name of the underlying definition, if it is a named type.
    fn name(&self) -> Option<&str>;

    /// Weak type the engine uses to refer to this descriptor.
    fn weak_type(&self) -> TypeRef;

    /// Returns the nullable form of this descriptor.
    ///
    /// Repeated calls return forms sharing the same definition, and calling
    /// it on a nullable form returns that form itself.
    fn nullable(&self) -> Self::Nullable;

    /// Capability of this descriptor.
    fn capability(&self) -> TypeCapability;

    /// Indicates whether both descriptors share the same definition and
    /// nullability.
    fn ptr_eq(&self, other: &Self) -> bool;

    /// Registers the named weak types this descriptor needs.
    ///
    /// # Errors
    ///
    /// If building any of these weak types fails.
    fn register(&self, registry: &mut Registry) -> Result<(), Error>;
}

/// Descriptor which may appear in a response.
pub trait OutputType: GraphQLType {
    /// Weak type of this descriptor in output position.
    fn weak_output_type(&self) -> TypeRef {
        self.weak_type()
    }

    /// Converts a resolved Rust value into the engine's value.
    ///
    /// [`None`] represents `null`.
    ///
    /// # Errors
    ///
    /// If the value cannot be represented by this type.
    fn resolve_output(&self, value: Self::Value) -> FieldResult<Option<FieldValue<'static>>>;
}

/// Descriptor which may be received from a client.
pub trait InputType: GraphQLType {
    /// Weak type of this descriptor in input position.
    fn weak_input_type(&self) -> TypeRef {
        self.weak_type()
    }

    /// Parses a value received from a client, [`None`] meaning an absent one.
    ///
    /// # Errors
    ///
    /// If the value cannot be represented by this type.
    fn parse_input(&self, value: Option<&Value>) -> FieldResult<Self::Value>;

    /// Converts a Rust value back into an input value, as needed for default
    /// values.
    ///
    /// # Errors
    ///
    /// If the value cannot be represented by this type.
    fn to_input_value(&self, value: &Self::Value) -> FieldResult<Value>;
}

/// Named or list definition shared by a [`NonNull`] form and a [`Nullable`]
/// form.
///
/// [`NonNull`]: crate::NonNull
/// [`Nullable`]: crate::Nullable
pub trait BaseType: Send + Sync + 'static {
    /// Rust value of this definition.
    type Value: Send + Sync + 'static;

    /// Name of this definition, if it is a named type.
    fn name(&self) -> Option<&str>;

    /// Nullable weak type of this definition.
    fn weak_base_type(&self) -> TypeRef;

    /// Capability of this definition.
    fn capability(&self) -> TypeCapability;

    /// Registers the named weak types of this definition.
    ///
    /// # Errors
    ///
    /// If building any of these weak types fails.
    fn register(&self, registry: &mut Registry) -> Result<(), Error>;
}

/// Definition which may appear in a response.
pub trait OutputBase: BaseType {
    /// Converts a resolved non-null Rust value into the engine's value.
    ///
    /// # Errors
    ///
    /// If the value cannot be represented by this definition.
    fn resolve_base(&self, value: Self::Value) -> FieldResult<FieldValue<'static>>;
}

/// Definition which may be received from a client.
pub trait InputBase: BaseType {
    /// Parses a non-null value received from a client.
    ///
    /// # Errors
    ///
    /// If the value cannot be represented by this definition.
    fn parse_base(&self, value: &Value) -> FieldResult<Self::Value>;

    /// Converts a Rust value back into a non-null input value.
    ///
    /// # Errors
    ///
    /// If the value cannot be represented by this definition.
    fn base_input_value(&self, value: &Self::Value) -> FieldResult<Value>;
}

/// Type-erased handle of a descriptor able to register itself.
pub(crate) trait Registrable: Send + Sync {
    fn register_into(&self, registry: &mut Registry) -> Result<(), Error>;
}

impl<T: GraphQLType> Registrable for T {
    fn register_into(&self, registry: &mut Registry) -> Result<(), Error> {
        self.register(registry)
    }
}

//! Errors of schema construction and execution.

use arcstr::ArcStr;
use derive_more::with_trait::Display;

use crate::types::marker::TypeCapability;

/// Error raised while constructing types or assembling a schema.
///
/// Every builder step either succeeds completely or returns one of these,
/// leaving its receiver untouched.
#[derive(Clone, Debug, Display, Eq, derive_more::with_trait::Error, PartialEq)]
pub enum Error {
    /// A composite type already declares a field with the same name.
    #[display("Type '{type_name}' already has a field named '{field_name}'.")]
    DuplicateField {
        /// Name of the object or interface type.
        type_name: ArcStr,
        /// Name of the colliding field.
        field_name: ArcStr,
    },

    /// Different definitions share a type name within one schema.
    ///
    /// Every builder step creates a new definition, so a schema may only use
    /// one of the types an object type builder produces.
    #[display("Schema contains more than one type named '{type_name}'.")]
    DuplicateType {
        /// Name of the type.
        type_name: ArcStr,
    },

    /// A field declares the same argument name twice.
    #[display("Field '{type_name}.{field_name}' already has an argument named '{argument_name}'.")]
    DuplicateArgument {
        /// Name of the type owning the field.
        type_name: ArcStr,
        /// Name of the field.
        field_name: ArcStr,
        /// Name of the repeated argument.
        argument_name: ArcStr,
    },

    /// An implementation lacks resolvers for some fields of an interface.
    #[display(
        "Type '{type_name}' does not implement field(s) {missing} of interface '{interface_name}'."
    )]
    IncompleteImplementation {
        /// Name of the implementing object type.
        type_name: ArcStr,
        /// Name of the interface.
        interface_name: ArcStr,
        /// Quoted and comma-separated names of the missing fields.
        missing: ArcStr,
    },

    /// An implementation supplies a resolver for a field its interface lacks.
    #[display(
        "Interface '{interface_name}' has no field named '{field_name}' for type '{type_name}' \
         to implement."
    )]
    UnknownImplementationField {
        /// Name of the implementing object type.
        type_name: ArcStr,
        /// Name of the interface.
        interface_name: ArcStr,
        /// Name of the unknown field.
        field_name: ArcStr,
    },

    /// An implementation resolver disagrees with its interface field on
    /// argument or return types.
    #[display(
        "Field '{type_name}.{field_name}' of interface '{interface_name}' expects `{expected}`, \
         but the implementation provides `{found}`."
    )]
    ImplementationMismatch {
        /// Name of the implementing object type.
        type_name: ArcStr,
        /// Name of the interface.
        interface_name: ArcStr,
        /// Name of the field.
        field_name: ArcStr,
        /// Rust type declared by the interface.
        expected: ArcStr,
        /// Rust type supplied by the implementation.
        found: ArcStr,
    },

    /// A wrapped engine type cannot serve the requested capability.
    #[display("Type '{type_name}' is {inferred}, so it cannot be used as {requested}.")]
    Capability {
        /// Name of the wrapped type.
        type_name: ArcStr,
        /// Capability asked for.
        requested: TypeCapability,
        /// Capability inferred from the engine type.
        inferred: TypeCapability,
    },

    /// A default argument value cannot be represented as an engine value.
    #[display("Default value of argument '{argument_name}' is invalid: {message}")]
    InvalidDefaultValue {
        /// Name of the argument.
        argument_name: ArcStr,
        /// Reason of the failure.
        message: ArcStr,
    },

    /// The engine rejected the assembled schema.
    #[display("Invalid schema: {message}")]
    Schema {
        /// Message reported by the engine.
        message: ArcStr,
    },
}

impl From<async_graphql::dynamic::SchemaError> for Error {
    fn from(e: async_graphql::dynamic::SchemaError) -> Self {
        Self::Schema {
            message: e.to_string().into(),
        }
    }
}

/// Error of a single field resolution.
///
/// Anything implementing [`Display`](std::fmt::Display) converts into it via
/// `?`, so resolvers may propagate their own errors directly.
pub type FieldError = async_graphql::Error;

/// Result of a single field resolution.
pub type FieldResult<T> = Result<T, FieldError>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn duplicate_field_names_type_and_field() {
        let e = Error::DuplicateField {
            type_name: "Foo".into(),
            field_name: "a".into(),
        };

        assert_eq!(e.to_string(), "Type 'Foo' already has a field named 'a'.");
    }

    #[test]
    fn incomplete_implementation_lists_missing_fields() {
        let e = Error::IncompleteImplementation {
            type_name: "Person".into(),
            interface_name: "Node".into(),
            missing: "'id', 'name'".into(),
        };

        assert_eq!(
            e.to_string(),
            "Type 'Person' does not implement field(s) 'id', 'name' of interface 'Node'.",
        );
    }
}

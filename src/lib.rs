#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

#[doc(hidden)]
pub use {futures, static_assertions as sa};

#[cfg(feature = "tracing")]
#[doc(hidden)]
pub use tracing;

#[doc(inline)]
pub use futures::future::BoxFuture;

/// Re-export of the underlying execution engine.
pub use async_graphql as engine;

#[doc(inline)]
pub use async_graphql::{Name, Response, Value, Variables, dynamic::TypeRef};

#[doc(hidden)]
#[macro_use]
pub mod macros;
mod description;
mod error;
mod executor;
mod schema;
mod types;

#[cfg(test)]
mod tests;

pub use crate::{
    description::{trim_description, trim_descriptions_in_config},
    error::{Error, FieldError, FieldResult},
    executor::{OperationInfo, OperationKind},
    schema::{
        Schema, SchemaConfig, create_schema,
        options::{Limits, SchemaOptions},
        registry::Registry,
    },
    types::{
        args::{ArgConfig, ArgsConfig},
        base::{BaseType, GraphQLType, InputBase, InputType, OutputBase, OutputType},
        containers::{List, ListType, NullableListType, create_list_type},
        enums::{
            Enum, EnumConfig, EnumType, EnumValueConfig, NullableEnumType, create_enum_type,
        },
        field::FieldConfig,
        interface::{
            Implementation, Interface, InterfaceConfig, InterfaceType, NullableInterfaceType,
            create_interface_type,
        },
        marker::{Capability, Input, InputOutput, IsInput, IsOutput, Output, TypeCapability},
        nullable::{NonNull, Nullable, create_nullable_type},
        object::{NullableObjectType, Object, ObjectConfig, ObjectType, create_object_type},
        scalars::{
            InputParsed, LiteralParsed, NullableScalarType, OutputOnly, Scalar, ScalarConfig,
            ScalarParsing, ScalarType, ValueParsed, create_scalar_type,
        },
        wrapped::{
            BooleanType, FloatType, IdType, IntegerType, NullableWrappedType, StringType,
            WeakType, Wrapped, WrappedType, boolean_type, float_type, id_type, integer_type,
            string_type, wrap_weak_type,
        },
    },
};

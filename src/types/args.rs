//! Typed field arguments.

use std::{any::TypeId, sync::Arc};

use arcstr::ArcStr;
use async_graphql::dynamic::{InputValue, ObjectAccessor};
use itertools::Itertools as _;

use crate::{
    description::trimmed,
    error::{Error, FieldResult},
    schema::registry::Registry,
    types::base::InputType,
};

type DefaultFn<V> = Arc<dyn Fn() -> V + Send + Sync>;

/// Configuration of a single argument of type `T`.
///
/// Only input types may be used here: an output-only `T` does not compile.
///
/// ```compile_fail
/// # use strong_graphql::{ArgConfig, ObjectConfig, create_object_type};
/// let foo = create_object_type::<(), ()>(ObjectConfig::new("Foo"));
/// let arg = ArgConfig::new("foo", foo);
/// ```
pub struct ArgConfig<T: InputType> {
    name: ArcStr,
    ty: T,
    description: Option<ArcStr>,
    default: Option<DefaultFn<T::Value>>,
}

impl<T: InputType> ArgConfig<T> {
    /// Declares an argument named `name` of the provided type.
    pub fn new(name: impl Into<ArcStr>, ty: T) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            default: None,
        }
    }

    /// Sets the description of this argument.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = trimmed(description);
        self
    }

    /// Sets the value used when a client omits this argument.
    #[must_use]
    pub fn default_value(mut self, value: T::Value) -> Self
    where
        T::Value: Clone,
    {
        self.default = Some(Arc::new(move || value.clone()));
        self
    }

    /// Returns the name of this argument.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn weak_arg(&self, registry: &mut Registry) -> Result<InputValue, Error> {
        self.ty.register(registry)?;

        let mut arg = InputValue::new(self.name.as_str(), self.ty.weak_input_type());
        if let Some(description) = &self.description {
            arg = arg.description(description.as_str());
        }
        if let Some(default) = &self.default {
            let value = self.ty.to_input_value(&default()).map_err(|e| {
                Error::InvalidDefaultValue {
                    argument_name: self.name.clone(),
                    message: e.message.into(),
                }
            })?;
            arg = arg.default_value(value);
        }
        Ok(arg)
    }

    fn parse(&self, args: &ObjectAccessor<'_>) -> FieldResult<T::Value> {
        match (args.get(&self.name), &self.default) {
            (Some(value), _) => self.ty.parse_input(Some(value.as_value())),
            (None, Some(default)) => Ok(default()),
            (None, None) => self.ty.parse_input(None),
        }
        .map_err(|mut e| {
            e.message = format!("Invalid value for argument \"{}\": {}", self.name, e.message);
            e
        })
    }
}

/// Set of arguments declared on a field.
///
/// Implemented for `()`, meaning no arguments, and for tuples of
/// [`ArgConfig`]s. A resolver receives [`ArgsConfig::Value`]: the tuple of
/// parsed argument values, in declaration order.
pub trait ArgsConfig: Send + Sync + 'static {
    /// Parsed values of these arguments.
    type Value: Send + 'static;

    /// Names of these arguments, in declaration order.
    fn names(&self) -> Vec<ArcStr>;

    /// Builds the engine's argument descriptors, registering the types they
    /// need.
    ///
    /// # Errors
    ///
    /// If an argument type fails to register, or a default value cannot be
    /// represented by its type.
    fn weak_args(&self, registry: &mut Registry) -> Result<Vec<InputValue>, Error>;

    /// Parses exactly the declared arguments out of the ones a client sent.
    ///
    /// # Errors
    ///
    /// If any declared argument cannot be parsed.
    fn parse(&self, args: &ObjectAccessor<'_>) -> FieldResult<Self::Value>;
}

impl ArgsConfig for () {
    type Value = ();

    fn names(&self) -> Vec<ArcStr> {
        vec![]
    }

    fn weak_args(&self, _: &mut Registry) -> Result<Vec<InputValue>, Error> {
        Ok(vec![])
    }

    fn parse(&self, _: &ObjectAccessor<'_>) -> FieldResult<()> {
        Ok(())
    }
}

macro_rules! impl_args_config_for_tuple {
    ($($T:ident => $idx:tt),+) => {
        impl<$($T: InputType),+> ArgsConfig for ($(ArgConfig<$T>,)+) {
            type Value = ($(<$T as crate::GraphQLType>::Value,)+);

            fn names(&self) -> Vec<ArcStr> {
                vec![$(self.$idx.name.clone()),+]
            }

            fn weak_args(&self, registry: &mut Registry) -> Result<Vec<InputValue>, Error> {
                Ok(vec![$(self.$idx.weak_arg(registry)?),+])
            }

            fn parse(&self, args: &ObjectAccessor<'_>) -> FieldResult<Self::Value> {
                Ok(($(self.$idx.parse(args)?,)+))
            }
        }
    };
}

impl_args_config_for_tuple!(A => 0);
impl_args_config_for_tuple!(A => 0, B => 1);
impl_args_config_for_tuple!(A => 0, B => 1, C => 2);
impl_args_config_for_tuple!(A => 0, B => 1, C => 2, D => 3);
impl_args_config_for_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4);
impl_args_config_for_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_args_config_for_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_args_config_for_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);
impl_args_config_for_tuple!(
    A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8
);
impl_args_config_for_tuple!(
    A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8, J => 9
);
impl_args_config_for_tuple!(
    A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8, J => 9, K => 10
);
impl_args_config_for_tuple!(
    A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8, J => 9, K => 10,
    L => 11
);

/// Type-erased [`ArgsConfig`], as stored on field definitions.
pub(crate) trait ErasedArgs: Send + Sync {
    fn arg_names(&self) -> Vec<ArcStr>;

    fn weak_input_values(&self, registry: &mut Registry) -> Result<Vec<InputValue>, Error>;

    fn parse_any(&self, args: &ObjectAccessor<'_>) -> FieldResult<Box<dyn std::any::Any + Send>>;

    fn value_type(&self) -> (TypeId, &'static str);
}

impl<A: ArgsConfig> ErasedArgs for A {
    fn arg_names(&self) -> Vec<ArcStr> {
        self.names()
    }

    fn weak_input_values(&self, registry: &mut Registry) -> Result<Vec<InputValue>, Error> {
        self.weak_args(registry)
    }

    fn parse_any(&self, args: &ObjectAccessor<'_>) -> FieldResult<Box<dyn std::any::Any + Send>> {
        Ok(Box::new(self.parse(args)?))
    }

    fn value_type(&self) -> (TypeId, &'static str) {
        (TypeId::of::<A::Value>(), std::any::type_name::<A::Value>())
    }
}

/// Returns the first argument name declared twice, if any.
pub(crate) fn duplicate_name(args: &dyn ErasedArgs) -> Option<ArcStr> {
    args.arg_names().into_iter().duplicates().next()
}

#[cfg(test)]
mod tests {
    use arcstr::ArcStr;

    use crate::{
        ArgConfig, ArgsConfig, GraphQLType as _, Registry, create_list_type, integer_type,
        string_type, types::args::duplicate_name,
    };

    #[test]
    fn keeps_argument_order() {
        let args = (
            ArgConfig::new("b", integer_type()),
            ArgConfig::new("a", string_type()),
            ArgConfig::new("c", create_list_type(integer_type())),
        );

        assert_eq!(
            args.names().iter().map(ArcStr::as_str).collect::<Vec<_>>(),
            ["b", "a", "c"],
        );
    }

    #[test]
    fn builds_weak_arguments() {
        let args = (
            ArgConfig::new("limit", integer_type()).default_value(10),
            ArgConfig::new("filter", string_type().nullable()).description("  Text. "),
        );

        let weak = args.weak_args(&mut Registry::new()).unwrap();

        assert_eq!(weak.len(), 2);
    }

    #[test]
    fn detects_duplicates() {
        let args = (
            ArgConfig::new("a", integer_type()),
            ArgConfig::new("a", string_type()),
        );

        assert_eq!(duplicate_name(&args).as_deref(), Some("a"));
        assert_eq!(duplicate_name(&()), None);
    }
}

//! Custom scalar types.

use std::{marker::PhantomData, sync::Arc};

use arcstr::ArcStr;
use async_graphql::{
    Value,
    dynamic::{self, FieldValue, TypeRef},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    description::trimmed,
    error::{Error, FieldError, FieldResult},
    schema::registry::Registry,
    types::{
        base::{BaseType, InputBase, OutputBase},
        marker::{Capability, InputOutput, IsInput, IsOutput, Output, TypeCapability},
        nullable::{NonNull, Nullable},
    },
};

type SerializeFn<V> = Arc<dyn Fn(&V) -> FieldResult<Value> + Send + Sync>;
type ParseFn<V> = Arc<dyn Fn(&Value) -> Option<V> + Send + Sync>;

/// Parsing state of a [`ScalarConfig`] with no parse functions.
#[derive(Clone, Copy, Debug)]
pub enum OutputOnly {}

/// Parsing state of a [`ScalarConfig`] with only `parse_value` supplied.
#[derive(Clone, Copy, Debug)]
pub enum ValueParsed {}

/// Parsing state of a [`ScalarConfig`] with only `parse_literal` supplied.
#[derive(Clone, Copy, Debug)]
pub enum LiteralParsed {}

/// Parsing state of a [`ScalarConfig`] with both parse functions supplied.
#[derive(Clone, Copy, Debug)]
pub enum InputParsed {}

/// Parsing state of a [`ScalarConfig`] complete enough to build a scalar.
#[diagnostic::on_unimplemented(
    message = "`parse_value` requires `parse_literal` and vice versa",
    label = "scalar has only one of `parse_value` and `parse_literal`"
)]
pub trait ScalarParsing {
    /// Capability of the built scalar.
    type Capability: Capability;
}

impl ScalarParsing for OutputOnly {
    type Capability = Output;
}

impl ScalarParsing for InputParsed {
    type Capability = InputOutput;
}

/// Configuration of a custom scalar with internal values of type `V`, and
/// external values of type `E`.
///
/// The parsing state `P` tracks which parse functions were supplied: a
/// scalar is output-only without any, and usable as input too with both.
pub struct ScalarConfig<V, E, P = OutputOnly> {
    name: ArcStr,
    description: Option<ArcStr>,
    specified_by_url: Option<ArcStr>,
    serialize: SerializeFn<V>,
    parse_value: Option<ParseFn<V>>,
    parse_literal: Option<ParseFn<V>>,
    _marker: PhantomData<fn(E) -> P>,
}

impl<V, E> ScalarConfig<V, E>
where
    V: 'static,
    E: Serialize + 'static,
{
    /// Starts a configuration of a scalar named `name`, converting internal
    /// values into external ones with `serialize`.
    pub fn new<F>(name: impl Into<ArcStr>, serialize: F) -> Self
    where
        F: Fn(&V) -> E + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            specified_by_url: None,
            serialize: Arc::new(move |v: &V| Ok(async_graphql::to_value(serialize(v))?)),
            parse_value: None,
            parse_literal: None,
            _marker: PhantomData,
        }
    }
}

impl<V, E, P> ScalarConfig<V, E, P> {
    /// Sets the description of the scalar.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = trimmed(description);
        self
    }

    /// Sets the URL of the specification the scalar follows.
    #[must_use]
    pub fn specified_by_url(mut self, url: impl Into<ArcStr>) -> Self {
        self.specified_by_url = Some(url.into());
        self
    }

    fn into_state<Q>(self) -> ScalarConfig<V, E, Q> {
        ScalarConfig {
            name: self.name,
            description: self.description,
            specified_by_url: self.specified_by_url,
            serialize: self.serialize,
            parse_value: self.parse_value,
            parse_literal: self.parse_literal,
            _marker: PhantomData,
        }
    }
}

fn value_parser<V, E, F>(parse: F) -> ParseFn<V>
where
    V: 'static,
    E: DeserializeOwned + 'static,
    F: Fn(E) -> Option<V> + Send + Sync + 'static,
{
    Arc::new(move |v: &Value| async_graphql::from_value(v.clone()).ok().and_then(&parse))
}

impl<V: 'static, E: DeserializeOwned + 'static> ScalarConfig<V, E, OutputOnly> {
    /// Parses external values received through variables.
    ///
    /// Returning [`None`] rejects the value.
    pub fn parse_value<F>(mut self, parse: F) -> ScalarConfig<V, E, ValueParsed>
    where
        F: Fn(E) -> Option<V> + Send + Sync + 'static,
    {
        self.parse_value = Some(value_parser(parse));
        self.into_state()
    }

    /// Parses literals written in a query document.
    ///
    /// Returning [`None`] rejects the literal.
    pub fn parse_literal<F>(mut self, parse: F) -> ScalarConfig<V, E, LiteralParsed>
    where
        F: Fn(&Value) -> Option<V> + Send + Sync + 'static,
    {
        self.parse_literal = Some(Arc::new(parse));
        self.into_state()
    }
}

impl<V, E> ScalarConfig<V, E, ValueParsed> {
    /// Parses literals written in a query document.
    ///
    /// Returning [`None`] rejects the literal.
    pub fn parse_literal<F>(mut self, parse: F) -> ScalarConfig<V, E, InputParsed>
    where
        F: Fn(&Value) -> Option<V> + Send + Sync + 'static,
    {
        self.parse_literal = Some(Arc::new(parse));
        self.into_state()
    }
}

impl<V: 'static, E: DeserializeOwned + 'static> ScalarConfig<V, E, LiteralParsed> {
    /// Parses external values received through variables.
    ///
    /// Returning [`None`] rejects the value.
    pub fn parse_value<F>(mut self, parse: F) -> ScalarConfig<V, E, InputParsed>
    where
        F: Fn(E) -> Option<V> + Send + Sync + 'static,
    {
        self.parse_value = Some(value_parser(parse));
        self.into_state()
    }
}

/// Custom scalar definition with values of type `V`.
pub struct Scalar<V, C> {
    name: ArcStr,
    description: Option<ArcStr>,
    specified_by_url: Option<ArcStr>,
    serialize: SerializeFn<V>,
    parse: Option<ParseFn<V>>,
    _capability: PhantomData<fn() -> C>,
}

/// Non-null custom scalar.
pub type ScalarType<V, C = InputOutput> = NonNull<Scalar<V, C>>;

/// Nullable custom scalar.
pub type NullableScalarType<V, C = InputOutput> = Nullable<Scalar<V, C>>;

impl<V, C> Scalar<V, C> {
    fn parse(&self, value: &Value) -> Option<V> {
        self.parse.as_ref().and_then(|parse| parse(value))
    }
}

impl<V, C> BaseType for Scalar<V, C>
where
    V: Send + Sync + 'static,
    C: Capability,
{
    type Value = V;

    fn name(&self) -> Option<&str> {
        Some(self.name.as_str())
    }

    fn weak_base_type(&self) -> TypeRef {
        TypeRef::named(self.name.to_string())
    }

    fn capability(&self) -> TypeCapability {
        C::CAPABILITY
    }

    fn register(&self, registry: &mut Registry) -> Result<(), Error> {
        registry.register_with(&self.name, self, |_| {
            let mut scalar = dynamic::Scalar::new(self.name.as_str());
            if let Some(description) = &self.description {
                scalar = scalar.description(description.as_str());
            }
            if let Some(url) = &self.specified_by_url {
                scalar = scalar.specified_by_url(url.as_str());
            }
            if let Some(parse) = &self.parse {
                let parse = Arc::clone(parse);
                scalar = scalar.validator(move |v| parse(v).is_some());
            }
            Ok(scalar)
        })
    }
}

impl<V, C> OutputBase for Scalar<V, C>
where
    V: Send + Sync + 'static,
    C: IsOutput,
{
    fn resolve_base(&self, value: V) -> FieldResult<FieldValue<'static>> {
        (self.serialize)(&value).map(FieldValue::value)
    }
}

impl<V, C> InputBase for Scalar<V, C>
where
    V: Send + Sync + 'static,
    C: IsInput,
{
    fn parse_base(&self, value: &Value) -> FieldResult<V> {
        self.parse(value).ok_or_else(|| {
            FieldError::new(format!(
                "Scalar '{}' cannot represent value: {value}",
                self.name,
            ))
        })
    }

    fn base_input_value(&self, value: &V) -> FieldResult<Value> {
        (self.serialize)(value)
    }
}

/// Tries external values first, and literals second.
fn either_parser<V: 'static>(value: ParseFn<V>, literal: ParseFn<V>) -> ParseFn<V> {
    Arc::new(move |v: &Value| value(v).or_else(|| literal(v)))
}

/// Creates a custom scalar from the provided configuration.
///
/// The scalar is output-only unless both `parse_value` and `parse_literal`
/// were supplied, in which case it is usable as input too. Supplying only one
/// of them does not compile:
///
/// ```compile_fail
/// # use strong_graphql::{ScalarConfig, create_scalar_type};
/// let half = create_scalar_type(
///     ScalarConfig::new("Half", |v: &i32| *v).parse_value(|v: i32| Some(v)),
/// );
/// ```
pub fn create_scalar_type<V, E, P>(config: ScalarConfig<V, E, P>) -> ScalarType<V, P::Capability>
where
    V: Send + Sync + 'static,
    P: ScalarParsing,
{
    let ScalarConfig {
        name,
        description,
        specified_by_url,
        serialize,
        parse_value,
        parse_literal,
        _marker,
    } = config;

    let parse = match (parse_value, parse_literal) {
        (Some(value), Some(literal)) => Some(either_parser(value, literal)),
        _ => None,
    };

    NonNull::new(Scalar {
        name,
        description,
        specified_by_url,
        serialize,
        parse,
        _capability: PhantomData,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use async_graphql::Value;

    use crate::{
        GraphQLType as _, InputType, Output, OutputType, ScalarConfig, ScalarType,
        TypeCapability, create_scalar_type,
    };

    pub(crate) fn output_only_scalar() -> ScalarType<u64, Output> {
        create_scalar_type(ScalarConfig::new("Counter", |v: &u64| v.to_string()))
    }

    /// Even integers, accepted as numbers in variables and as numbers or
    /// strings in literals.
    fn even_scalar() -> ScalarType<i64> {
        create_scalar_type(
            ScalarConfig::new("Even", |v: &i64| *v)
                .description("  An even integer.  ")
                .parse_value(|v: i64| (v % 2 == 0).then_some(v))
                .parse_literal(|v| match v {
                    Value::String(s) => s.parse().ok().filter(|v: &i64| v % 2 == 0),
                    _ => None,
                }),
        )
    }

    static_assertions::assert_not_impl_any!(ScalarType<u64, Output>: InputType);
    static_assertions::assert_impl_all!(ScalarType<i64>: InputType, OutputType);

    #[test]
    fn capability_follows_parse_functions() {
        assert_eq!(output_only_scalar().capability(), TypeCapability::Output);
        assert_eq!(even_scalar().capability(), TypeCapability::InputOutput);
    }

    #[test]
    fn tries_value_then_literal() {
        let even = even_scalar();

        assert_eq!(even.parse_input(Some(&Value::from(4))).ok(), Some(4));
        assert_eq!(
            even.parse_input(Some(&Value::String("6".into()))).ok(),
            Some(6),
        );
        assert!(even.parse_input(Some(&Value::from(3))).is_err());
        assert!(even.parse_input(Some(&Value::String("7".into()))).is_err());
    }

    #[test]
    fn serializes_into_external_form() {
        let resolved = output_only_scalar().resolve_output(42).unwrap().unwrap();

        assert_eq!(resolved.as_value(), Some(&Value::String("42".into())));
        assert_eq!(even_scalar().to_input_value(&8).ok(), Some(Value::from(8)));
    }
}

use arcstr::ArcStr;
use async_graphql::{
    Name, Value,
    dynamic::{self, FieldValue, TypeRef},
};
use indexmap::IndexMap;

use crate::{
    description::trimmed,
    error::{Error, FieldError, FieldResult},
    schema::registry::Registry,
    types::{
        base::{BaseType, InputBase, OutputBase},
        marker::TypeCapability,
        nullable::{NonNull, Nullable},
    },
};

/// Configuration of a single enum value.
#[derive(Clone, Debug)]
pub struct EnumValueConfig<V> {
    value: V,
    description: Option<ArcStr>,
    deprecation_reason: Option<ArcStr>,
}

impl<V> EnumValueConfig<V> {
    /// Represents `value` in Rust.
    pub fn new(value: V) -> Self {
        Self {
            value,
            description: None,
            deprecation_reason: None,
        }
    }

    /// Sets the description of this value.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = trimmed(description);
        self
    }

    /// Marks this value as deprecated for the provided reason.
    #[must_use]
    pub fn deprecation_reason(mut self, reason: impl Into<ArcStr>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }
}

/// Configuration of an enum with values of type `V`.
#[derive(Clone, Debug)]
pub struct EnumConfig<V> {
    name: ArcStr,
    description: Option<ArcStr>,
    values: IndexMap<ArcStr, EnumValueConfig<V>>,
}

impl<V> EnumConfig<V> {
    /// Starts a configuration of an enum named `name`, without any values.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: IndexMap::new(),
        }
    }

    /// Sets the description of the enum.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = trimmed(description);
        self
    }

    /// Adds a value with the symbolic name `name`.
    ///
    /// Values keep their declaration order. Repeating a name replaces the
    /// earlier value in place.
    #[must_use]
    pub fn value(mut self, name: impl Into<ArcStr>, value: EnumValueConfig<V>) -> Self {
        self.values.insert(name.into(), value);
        self
    }
}

/// Enum definition with values of type `V`.
///
/// Enums are always usable both as input and as output.
pub struct Enum<V> {
    config: EnumConfig<V>,
}

/// Non-null enum.
pub type EnumType<V> = NonNull<Enum<V>>;

/// Nullable enum.
pub type NullableEnumType<V> = Nullable<Enum<V>>;

impl<V: PartialEq> Enum<V> {
    fn name_of(&self, value: &V) -> FieldResult<&ArcStr> {
        self.config
            .values
            .iter()
            .find_map(|(name, v)| (v.value == *value).then_some(name))
            .ok_or_else(|| {
                FieldError::new(format!(
                    "Enum '{}' cannot represent the provided value",
                    self.config.name,
                ))
            })
    }

    /// Returns the symbolic names of this enum, in declaration order.
    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.config.values.keys().map(ArcStr::as_str)
    }
}

impl<V> BaseType for Enum<V>
where
    V: PartialEq + Clone + Send + Sync + 'static,
{
    type Value = V;

    fn name(&self) -> Option<&str> {
        Some(self.config.name.as_str())
    }

    fn weak_base_type(&self) -> TypeRef {
        TypeRef::named(self.config.name.to_string())
    }

    fn capability(&self) -> TypeCapability {
        TypeCapability::InputOutput
    }

    fn register(&self, registry: &mut Registry) -> Result<(), Error> {
        registry.register_with(&self.config.name, self, |_| {
            let mut weak = dynamic::Enum::new(self.config.name.as_str());
            if let Some(description) = &self.config.description {
                weak = weak.description(description.as_str());
            }
            for (name, value) in &self.config.values {
                let mut item = dynamic::EnumItem::new(name.as_str());
                if let Some(description) = &value.description {
                    item = item.description(description.as_str());
                }
                item = item.deprecation(value.deprecation_reason.as_deref());
                weak = weak.item(item);
            }
            Ok(weak)
        })
    }
}

impl<V> OutputBase for Enum<V>
where
    V: PartialEq + Clone + Send + Sync + 'static,
{
    fn resolve_base(&self, value: V) -> FieldResult<FieldValue<'static>> {
        Ok(FieldValue::value(self.base_input_value(&value)?))
    }
}

impl<V> InputBase for Enum<V>
where
    V: PartialEq + Clone + Send + Sync + 'static,
{
    fn parse_base(&self, value: &Value) -> FieldResult<V> {
        let name = match value {
            Value::Enum(name) => name.as_str(),
            Value::String(name) => name.as_str(),
            v => {
                return Err(FieldError::new(format!(
                    "Enum '{}' cannot represent non-enum value: {v}",
                    self.config.name,
                )));
            }
        };
        self.config
            .values
            .get(name)
            .map(|v| v.value.clone())
            .ok_or_else(|| {
                FieldError::new(format!(
                    "Value '{name}' does not exist in enum '{}'",
                    self.config.name,
                ))
            })
    }

    fn base_input_value(&self, value: &V) -> FieldResult<Value> {
        Ok(Value::Enum(Name::new(self.name_of(value)?)))
    }
}

/// Creates an enum from the provided configuration.
pub fn create_enum_type<V>(config: EnumConfig<V>) -> EnumType<V>
where
    V: PartialEq + Clone + Send + Sync + 'static,
{
    NonNull::new(Enum { config })
}

#[cfg(test)]
mod tests {
    use async_graphql::{Name, Value};

    use crate::{
        EnumConfig, EnumType, EnumValueConfig, GraphQLType as _, InputType as _, OutputType as _,
        TypeCapability, create_enum_type,
    };

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Episode {
        NewHope,
        Empire,
        Jedi,
    }

    fn episode_type() -> EnumType<Episode> {
        create_enum_type(
            EnumConfig::new("Episode")
                .value("NEW_HOPE", EnumValueConfig::new(Episode::NewHope))
                .value(
                    "EMPIRE",
                    EnumValueConfig::new(Episode::Empire).description("Released in 1980."),
                )
                .value(
                    "JEDI",
                    EnumValueConfig::new(Episode::Jedi).deprecation_reason("Ewoks."),
                ),
        )
    }

    #[test]
    fn is_input_and_output() {
        assert_eq!(episode_type().capability(), TypeCapability::InputOutput);
    }

    #[test]
    fn keeps_declaration_order() {
        let episode = episode_type();

        assert_eq!(
            episode.definition().value_names().collect::<Vec<_>>(),
            ["NEW_HOPE", "EMPIRE", "JEDI"],
        );
    }

    #[test]
    fn maps_values_to_names_and_back() {
        let episode = episode_type();

        let resolved = episode.resolve_output(Episode::Empire).unwrap().unwrap();
        assert_eq!(
            resolved.as_value(),
            Some(&Value::Enum(Name::new("EMPIRE"))),
        );
        assert_eq!(
            episode
                .parse_input(Some(&Value::Enum(Name::new("JEDI"))))
                .ok(),
            Some(Episode::Jedi),
        );
        assert_eq!(
            episode
                .parse_input(Some(&Value::String("NEW_HOPE".into())))
                .ok(),
            Some(Episode::NewHope),
        );
        assert!(
            episode
                .parse_input(Some(&Value::Enum(Name::new("PHANTOM"))))
                .is_err()
        );
    }
}

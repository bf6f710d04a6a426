//! Interface types, and resolvers objects supply when implementing them.

use std::{
    any::{Any, TypeId, type_name},
    future::{self, Future},
    sync::Arc,
};

use arcstr::ArcStr;
use async_graphql::dynamic::{self, FieldValue, InterfaceField, TypeRef};
use futures::{FutureExt as _, future::BoxFuture};
use indexmap::IndexMap;

use crate::{
    description::trimmed,
    error::{Error, FieldError, FieldResult},
    schema::registry::Registry,
    types::{
        args::ArgsConfig,
        base::{BaseType, OutputBase, OutputType},
        field::{FieldConfig, FieldDef, appended, ensure_unique},
        marker::TypeCapability,
        nullable::{NonNull, Nullable},
    },
};

type ResolveTypeFn<V> = Arc<dyn Fn(&V) -> ArcStr + Send + Sync>;

/// Configuration of an interface type with values of type `V`.
pub struct InterfaceConfig<V> {
    name: ArcStr,
    description: Option<ArcStr>,
    resolve_type: Option<ResolveTypeFn<V>>,
}

impl<V> InterfaceConfig<V> {
    /// Starts a configuration of an interface type named `name`.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            resolve_type: None,
        }
    }

    /// Sets the description of the interface type.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = trimmed(description);
        self
    }

    /// Sets the function naming the concrete object type of a value.
    ///
    /// Without it, resolving a value of this interface type is a field error.
    #[must_use]
    pub fn resolve_type<F, N>(mut self, resolve_type: F) -> Self
    where
        F: Fn(&V) -> N + Send + Sync + 'static,
        N: Into<ArcStr>,
    {
        self.resolve_type = Some(Arc::new(move |v: &V| resolve_type(v).into()));
        self
    }
}

/// Interface definition with values of type `V`.
///
/// Interface fields carry no resolvers: every object type implementing the
/// interface supplies its own with an [`Implementation`].
pub struct Interface<V> {
    name: ArcStr,
    description: Option<ArcStr>,
    fields: Vec<Arc<FieldDef>>,
    resolve_type: Option<ResolveTypeFn<V>>,
}

/// Non-null interface type.
pub type InterfaceType<V> = NonNull<Interface<V>>;

/// Nullable interface type.
pub type NullableInterfaceType<V> = Nullable<Interface<V>>;

impl<V> Interface<V> {
    pub(crate) fn type_name(&self) -> &ArcStr {
        &self.name
    }

    pub(crate) fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().map(AsRef::as_ref)
    }

    fn field_names(&self) -> impl Iterator<Item = &ArcStr> {
        self.fields.iter().map(|f| &f.name)
    }
}

impl<V: Send + Sync + 'static> BaseType for Interface<V> {
    type Value = V;

    fn name(&self) -> Option<&str> {
        Some(self.name.as_str())
    }

    fn weak_base_type(&self) -> TypeRef {
        TypeRef::named(self.name.to_string())
    }

    fn capability(&self) -> TypeCapability {
        TypeCapability::Output
    }

    fn register(&self, registry: &mut Registry) -> Result<(), Error> {
        registry.register_with(&self.name, self, |registry| {
            let mut interface = dynamic::Interface::new(self.name.as_str());
            if let Some(description) = &self.description {
                interface = interface.description(description.as_str());
            }
            for field in &self.fields {
                field.ty.register(registry)?;

                let mut weak =
                    InterfaceField::new(field.name.as_str(), field.ty.weak_output_type());
                for arg in field.args.weak_input_values(registry)? {
                    weak = weak.argument(arg);
                }
                if let Some(description) = &field.description {
                    weak = weak.description(description.as_str());
                }
                if let Some(reason) = &field.deprecation_reason {
                    weak = weak.deprecation(Some(reason.as_str()));
                }
                interface = interface.field(weak);
            }
            Ok(interface)
        })
    }
}

impl<V: Send + Sync + 'static> OutputBase for Interface<V> {
    fn resolve_base(&self, value: V) -> FieldResult<FieldValue<'static>> {
        let resolve_type = self.resolve_type.as_ref().ok_or_else(|| {
            FieldError::new(format!(
                "Interface '{}' cannot resolve the type of its values",
                self.name,
            ))
        })?;
        let object_name = resolve_type(&value);
        Ok(FieldValue::owned_any(value).with_type(object_name.to_string()))
    }
}

impl<V: Send + Sync + 'static> InterfaceType<V> {
    /// Returns the name of this interface type.
    pub fn name(&self) -> &str {
        &self.definition().name
    }

    /// Returns the names of the fields of this interface type, in declaration
    /// order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.definition().field_names().map(ArcStr::as_str)
    }

    fn add_field<T: OutputType, A: ArgsConfig>(
        &self,
        config: FieldConfig<T, A>,
    ) -> Result<Self, Error> {
        let def = self.definition();
        ensure_unique(&def.name, def.field_names(), &config.name)?;

        let (field, _, _) = FieldDef::from_config(&def.name, config)?;
        Ok(NonNull::new(Interface {
            name: def.name.clone(),
            description: def.description.clone(),
            fields: appended(&def.fields, field),
            resolve_type: def.resolve_type.clone(),
        }))
    }

    /// Declares a nullable field.
    ///
    /// # Errors
    ///
    /// If a field with the same name exists already, or an argument name
    /// repeats.
    pub fn field<T, A>(&self, config: FieldConfig<T, A>) -> Result<Self, Error>
    where
        T: OutputType,
        T::Nullable: OutputType,
        A: ArgsConfig,
    {
        self.add_field(config.into_nullable())
    }

    /// Declares a non-null field.
    ///
    /// # Errors
    ///
    /// If a field with the same name exists already, or an argument name
    /// repeats.
    pub fn field_non_null<T: OutputType, A: ArgsConfig>(
        &self,
        config: FieldConfig<T, A>,
    ) -> Result<Self, Error> {
        self.add_field(config)
    }

    /// Applies `extend` to this interface type.
    ///
    /// # Errors
    ///
    /// If `extend` fails.
    pub fn extend<F>(&self, extend: F) -> Result<Self, Error>
    where
        F: FnOnce(Self) -> Result<Self, Error>,
    {
        extend(self.clone())
    }
}

/// Creates an interface type without any fields, from the provided
/// configuration.
pub fn create_interface_type<V: Send + Sync + 'static>(
    config: InterfaceConfig<V>,
) -> InterfaceType<V> {
    NonNull::new(Interface {
        name: config.name,
        description: config.description,
        fields: vec![],
        resolve_type: config.resolve_type,
    })
}

pub(crate) type ErasedResolveFn<S, Ctx> = Arc<
    dyn Fn(&S, Box<dyn Any + Send>, &Ctx) -> BoxFuture<'static, FieldResult<Box<dyn Any + Send>>>
        + Send
        + Sync,
>;

pub(crate) struct ImplementationEntry<S, Ctx> {
    pub(crate) args_type: (TypeId, &'static str),
    pub(crate) value_type: (TypeId, &'static str),
    pub(crate) resolve: ErasedResolveFn<S, Ctx>,
}

/// Resolvers of interface fields, supplied by an object type with source
/// values `S` and context `Ctx` when implementing the interface.
///
/// Each resolver receives the parsed arguments of its field as a tuple, and
/// returns the value of the field: an [`Option`] for nullable fields. Both
/// are checked against the interface field in
/// [`ObjectType::implement()`](crate::ObjectType::implement).
///
/// ```rust
/// # use strong_graphql::{
/// #     FieldConfig, Implementation, InterfaceConfig, ObjectConfig, create_interface_type,
/// #     create_object_type, string_type,
/// # };
/// struct Droid {
///     name: String,
/// }
///
/// # fn main() -> Result<(), strong_graphql::Error> {
/// let character = create_interface_type::<Droid>(
///     InterfaceConfig::new("Character").resolve_type(|_: &Droid| "Droid"),
/// )
/// .field(FieldConfig::new("name", string_type()))?;
///
/// let droid = create_object_type::<Droid, ()>(ObjectConfig::new("Droid")).implement(
///     &character,
///     Implementation::new().resolve("name", |droid: &Droid, (): (), _: &()| {
///         Ok(Some(droid.name.clone()))
///     }),
/// )?;
///
/// assert_eq!(droid.field_names().collect::<Vec<_>>(), ["name"]);
/// # Ok(())
/// # }
/// ```
pub struct Implementation<S, Ctx = ()> {
    entries: IndexMap<ArcStr, ImplementationEntry<S, Ctx>>,
}

impl<S, Ctx> Default for Implementation<S, Ctx> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<S: 'static, Ctx: 'static> Implementation<S, Ctx> {
    /// Creates an empty set of resolvers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies the resolver of the interface field `name`.
    ///
    /// Supplying one twice replaces the earlier resolver.
    #[must_use]
    pub fn resolve<A, V, F>(self, name: impl Into<ArcStr>, resolve: F) -> Self
    where
        A: Send + 'static,
        V: Send + 'static,
        F: Fn(&S, A, &Ctx) -> FieldResult<V> + Send + Sync + 'static,
    {
        self.resolve_async(name, move |source, args, context| {
            future::ready(resolve(source, args, context))
        })
    }

    /// Supplies the asynchronous resolver of the interface field `name`.
    ///
    /// Supplying one twice replaces the earlier resolver.
    #[must_use]
    pub fn resolve_async<A, V, F, Fut>(mut self, name: impl Into<ArcStr>, resolve: F) -> Self
    where
        A: Send + 'static,
        V: Send + 'static,
        F: Fn(&S, A, &Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FieldResult<V>> + Send + 'static,
    {
        let resolve: ErasedResolveFn<S, Ctx> = Arc::new(
            move |source: &S, args: Box<dyn Any + Send>, context: &Ctx| {
                let Ok(args) = args.downcast::<A>() else {
                    return future::ready(Err(FieldError::new(format!(
                        "Arguments are not `{}`",
                        type_name::<A>(),
                    ))))
                    .boxed();
                };
                resolve(source, *args, context)
                    .map(|v| v.map(|v| Box::new(v) as Box<dyn Any + Send>))
                    .boxed()
            },
        );
        self.entries.insert(
            name.into(),
            ImplementationEntry {
                args_type: (TypeId::of::<A>(), type_name::<A>()),
                value_type: (TypeId::of::<V>(), type_name::<V>()),
                resolve,
            },
        );
        self
    }

    pub(crate) fn contains(&self, name: &ArcStr) -> bool {
        self.entries.contains_key(name)
    }

    pub(crate) fn into_entries(self) -> IndexMap<ArcStr, ImplementationEntry<S, Ctx>> {
        self.entries
    }
}

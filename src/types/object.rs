//! Object types and their immutable builder.

use std::{
    future::{self, Future},
    sync::{Arc, OnceLock},
};

use arcstr::ArcStr;
use async_graphql::{
    Response, ServerError, Variables,
    dynamic::{self, FieldFuture, FieldValue, ObjectAccessor, TypeRef},
};
use futures::{FutureExt as _, future::BoxFuture};
use itertools::Itertools as _;

use crate::{
    description::trimmed,
    error::{Error, FieldResult},
    executor::{OperationScope, RootHook, context_data, operation_kind},
    schema::{Schema, SchemaConfig, create_schema, registry::Registry},
    types::{
        args::ArgsConfig,
        base::{BaseType, OutputBase, OutputType, Registrable},
        field::{FieldConfig, FieldDef, appended, ensure_unique},
        interface::{Implementation, InterfaceType},
        marker::TypeCapability,
        nullable::{NonNull, Nullable},
    },
};

type ResolveFn<S, Ctx> = Arc<
    dyn Fn(&S, &Ctx, &ObjectAccessor<'_>) -> BoxFuture<'static, FieldResult<Option<FieldValue<'static>>>>
        + Send
        + Sync,
>;

struct ObjectField<S, Ctx> {
    def: FieldDef,
    resolve: ResolveFn<S, Ctx>,
}

#[derive(Clone)]
struct ImplementedInterface {
    name: ArcStr,
    ty: Arc<dyn Registrable>,
}

/// Configuration of an object type.
#[derive(Clone, Debug)]
pub struct ObjectConfig {
    name: ArcStr,
    description: Option<ArcStr>,
}

impl ObjectConfig {
    /// Starts a configuration of an object type named `name`.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Sets the description of the object type.
    #[must_use]
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = trimmed(description);
        self
    }
}

/// Object definition resolving fields out of source values of type `S`,
/// given a context of type `Ctx`.
pub struct Object<S, Ctx = ()> {
    name: ArcStr,
    description: Option<ArcStr>,
    fields: Vec<Arc<ObjectField<S, Ctx>>>,
    interfaces: Vec<ImplementedInterface>,
    schema: OnceLock<Result<Schema<S, Ctx>, Error>>,
}

/// Non-null object type.
pub type ObjectType<S, Ctx = ()> = NonNull<Object<S, Ctx>>;

/// Nullable object type.
pub type NullableObjectType<S, Ctx = ()> = Nullable<Object<S, Ctx>>;

impl<S, Ctx> Object<S, Ctx>
where
    S: Send + Sync + 'static,
    Ctx: Send + Sync + 'static,
{
    fn successor(
        &self,
        fields: Vec<Arc<ObjectField<S, Ctx>>>,
        interfaces: Vec<ImplementedInterface>,
    ) -> ObjectType<S, Ctx> {
        NonNull::new(Self {
            name: self.name.clone(),
            description: self.description.clone(),
            fields,
            interfaces,
            schema: OnceLock::new(),
        })
    }

    fn field_names(&self) -> impl Iterator<Item = &ArcStr> {
        self.fields.iter().map(|f| &f.def.name)
    }

    /// Builds the weak object, wrapping every resolver with `hook` when this
    /// is a schema root.
    pub(crate) fn build_weak(
        &self,
        registry: &mut Registry,
        hook: Option<&RootHook<S, Ctx>>,
    ) -> Result<dynamic::Object, Error> {
        let mut object = dynamic::Object::new(self.name.as_str());
        if let Some(description) = &self.description {
            object = object.description(description.as_str());
        }

        for field in &self.fields {
            field.def.ty.register(registry)?;

            let ty = field.def.ty.weak_output_type();
            let nullable = !matches!(ty, TypeRef::NonNull(_));
            let resolve = Arc::clone(&field.resolve);
            let hook = hook.cloned();
            let mut weak = dynamic::Field::new(field.def.name.as_str(), ty, move |ctx| {
                let resolve = Arc::clone(&resolve);
                let hook = hook.clone();
                FieldFuture::new(async move {
                    let resolved = async {
                        let source = ctx.parent_value.try_downcast_ref::<S>()?;
                        let context = context_data::<Ctx>(&ctx)?;
                        if let Some(hook) = hook {
                            let scope = ctx.data::<OperationScope>()?;
                            let kind = operation_kind(&ctx);
                            hook.before_field(source, context, kind, scope).await?;
                        }
                        resolve(source, context, &ctx.args).await
                    }
                    .await;

                    // Errors propagating to the engine fail the whole parent
                    // object, so a nullable field only nulls itself.
                    match resolved {
                        Err(e) if nullable => {
                            ctx.add_error(ctx.set_error_path(e.into_server_error(ctx.item.pos)));
                            Ok(None)
                        }
                        resolved => resolved,
                    }
                })
            });
            for arg in field.def.args.weak_input_values(registry)? {
                weak = weak.argument(arg);
            }
            if let Some(description) = &field.def.description {
                weak = weak.description(description.as_str());
            }
            if let Some(reason) = &field.def.deprecation_reason {
                weak = weak.deprecation(Some(reason.as_str()));
            }
            object = object.field(weak);
        }

        for interface in &self.interfaces {
            interface.ty.register_into(registry)?;
            object = object.implement(interface.name.as_str());
        }

        Ok(object)
    }
}

impl<S, Ctx> BaseType for Object<S, Ctx>
where
    S: Send + Sync + 'static,
    Ctx: Send + Sync + 'static,
{
    type Value = S;

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
        registry.register_with(&self.name, self, |registry| self.build_weak(registry, None))
    }
}

impl<S, Ctx> OutputBase for Object<S, Ctx>
where
    S: Send + Sync + 'static,
    Ctx: Send + Sync + 'static,
{
    fn resolve_base(&self, value: S) -> FieldResult<FieldValue<'static>> {
        Ok(FieldValue::owned_any(value))
    }
}

impl<S, Ctx> ObjectType<S, Ctx>
where
    S: Send + Sync + 'static,
    Ctx: Send + Sync + 'static,
{
    /// Returns the name of this object type.
    pub fn name(&self) -> &str {
        &self.definition().name
    }

    /// Returns the names of the fields of this object type, in declaration
    /// order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.definition().field_names().map(ArcStr::as_str)
    }

    /// Returns the names of the interfaces this object type implements, in
    /// declaration order.
    pub fn interface_names(&self) -> impl Iterator<Item = &str> {
        self.definition()
            .interfaces
            .iter()
            .map(|i| i.name.as_str())
    }

    fn add_field<T, A, R>(&self, config: FieldConfig<T, A>, resolve: R) -> Result<Self, Error>
    where
        T: OutputType,
        A: ArgsConfig,
        R: Fn(&S, A::Value, &Ctx) -> BoxFuture<'static, FieldResult<T::Value>>
            + Send
            + Sync
            + 'static,
    {
        let def = self.definition();
        ensure_unique(&def.name, def.field_names(), &config.name)?;

        let (field, ty, args) = FieldDef::from_config(&def.name, config)?;
        let resolve: ResolveFn<S, Ctx> = Arc::new(
            move |source: &S, context: &Ctx, accessor: &ObjectAccessor<'_>| {
                let value = match args.parse(accessor) {
                    Ok(args) => resolve(source, args, context),
                    Err(e) => return future::ready(Err(e)).boxed(),
                };
                let ty = Arc::clone(&ty);
                async move { ty.get().resolve_output(value.await?) }.boxed()
            },
        );

        Ok(def.successor(
            appended(&def.fields, ObjectField { def: field, resolve }),
            def.interfaces.clone(),
        ))
    }

    /// Adds a nullable field, resolved by `resolve`.
    ///
    /// The provided type is made nullable, so `resolve` returns an [`Option`]
    /// of its value.
    ///
    /// # Errors
    ///
    /// If a field with the same name exists already, or an argument name
    /// repeats.
    pub fn field<T, A, F>(&self, config: FieldConfig<T, A>, resolve: F) -> Result<Self, Error>
    where
        T: OutputType,
        T::Nullable: OutputType,
        A: ArgsConfig,
        F: Fn(&S, A::Value, &Ctx) -> FieldResult<Option<T::Inner>> + Send + Sync + 'static,
    {
        self.add_field(config.into_nullable(), move |source, args, context| {
            future::ready(resolve(source, args, context)).boxed()
        })
    }

    /// Adds a non-null field, resolved by `resolve`.
    ///
    /// # Errors
    ///
    /// If a field with the same name exists already, or an argument name
    /// repeats.
    pub fn field_non_null<T, A, F>(
        &self,
        config: FieldConfig<T, A>,
        resolve: F,
    ) -> Result<Self, Error>
    where
        T: OutputType,
        A: ArgsConfig,
        F: Fn(&S, A::Value, &Ctx) -> FieldResult<T::Value> + Send + Sync + 'static,
    {
        self.add_field(config, move |source, args, context| {
            future::ready(resolve(source, args, context)).boxed()
        })
    }

    /// Adds a nullable field, resolved asynchronously by `resolve`.
    ///
    /// # Errors
    ///
    /// If a field with the same name exists already, or an argument name
    /// repeats.
    pub fn field_async<T, A, F, Fut>(
        &self,
        config: FieldConfig<T, A>,
        resolve: F,
    ) -> Result<Self, Error>
    where
        T: OutputType,
        T::Nullable: OutputType,
        A: ArgsConfig,
        F: Fn(&S, A::Value, &Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FieldResult<Option<T::Inner>>> + Send + 'static,
    {
        self.add_field(config.into_nullable(), move |source, args, context| {
            resolve(source, args, context).boxed()
        })
    }

    /// Adds a non-null field, resolved asynchronously by `resolve`.
    ///
    /// # Errors
    ///
    /// If a field with the same name exists already, or an argument name
    /// repeats.
    pub fn field_non_null_async<T, A, F, Fut>(
        &self,
        config: FieldConfig<T, A>,
        resolve: F,
    ) -> Result<Self, Error>
    where
        T: OutputType,
        A: ArgsConfig,
        F: Fn(&S, A::Value, &Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FieldResult<T::Value>> + Send + 'static,
    {
        self.add_field(config, move |source, args, context| {
            resolve(source, args, context).boxed()
        })
    }

    /// Implements `interface`, taking resolvers of its fields from
    /// `implementation`.
    ///
    /// Every interface field is copied onto this object type along with its
    /// type, arguments, description and deprecation reason.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateField`] if this object type already has a field of
    ///   the interface.
    /// - [`Error::IncompleteImplementation`] if `implementation` lacks
    ///   resolvers of some interface fields.
    /// - [`Error::UnknownImplementationField`] if `implementation` resolves a
    ///   field the interface does not declare.
    /// - [`Error::ImplementationMismatch`] if a resolver takes arguments or
    ///   returns values of types other than the interface field declares.
    pub fn implement(
        &self,
        interface: &InterfaceType<S>,
        implementation: Implementation<S, Ctx>,
    ) -> Result<Self, Error> {
        let def = self.definition();
        let interface_def = interface.definition();
        let interface_name = interface_def.type_name();

        for field in interface_def.fields() {
            ensure_unique(&def.name, def.field_names(), &field.name)?;
        }

        let missing = interface_def
            .fields()
            .filter(|f| !implementation.contains(&f.name))
            .map(|f| format!("'{}'", f.name))
            .join(", ");
        if !missing.is_empty() {
            return Err(Error::IncompleteImplementation {
                type_name: def.name.clone(),
                interface_name: interface_name.clone(),
                missing: missing.into(),
            });
        }

        let mut entries = implementation.into_entries();
        let mut fields = def.fields.clone();
        for field in interface_def.fields() {
            let Some(entry) = entries.shift_remove(&field.name) else {
                continue;
            };

            for (expected, found) in [
                (field.args.value_type(), entry.args_type),
                (field.ty.value_type(), entry.value_type),
            ] {
                if expected.0 != found.0 {
                    return Err(Error::ImplementationMismatch {
                        type_name: def.name.clone(),
                        interface_name: interface_name.clone(),
                        field_name: field.name.clone(),
                        expected: expected.1.into(),
                        found: found.1.into(),
                    });
                }
            }

            let (ty, args, resolve_entry) = (
                Arc::clone(&field.ty),
                Arc::clone(&field.args),
                entry.resolve,
            );
            let resolve: ResolveFn<S, Ctx> = Arc::new(
                move |source: &S, context: &Ctx, accessor: &ObjectAccessor<'_>| {
                    let value = match args.parse_any(accessor) {
                        Ok(args) => resolve_entry(source, args, context),
                        Err(e) => return future::ready(Err(e)).boxed(),
                    };
                    let ty = Arc::clone(&ty);
                    async move { ty.resolve_any(value.await?) }.boxed()
                },
            );
            fields.push(Arc::new(ObjectField {
                def: field.clone(),
                resolve,
            }));
        }

        if let Some(field_name) = entries.into_keys().next() {
            return Err(Error::UnknownImplementationField {
                type_name: def.name.clone(),
                interface_name: interface_name.clone(),
                field_name,
            });
        }

        __strong_graphql_trace_debug!(
            "Type `{}` implements interface `{}`",
            def.name,
            interface_name
        );

        let mut interfaces = def.interfaces.clone();
        interfaces.push(ImplementedInterface {
            name: interface_name.clone(),
            ty: Arc::new(interface.clone()),
        });
        Ok(def.successor(fields, interfaces))
    }

    /// Applies `extend` to this object type.
    ///
    /// Useful for declaring groups of fields in reusable functions.
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

    /// Executes `query` against a schema having this object type as its query
    /// root.
    ///
    /// The schema is built on the first call and reused afterwards. Failures
    /// to build it are reported as errors of the response.
    pub async fn execute(&self, query: impl Into<String>, value: S, context: Ctx) -> Response {
        self.execute_with(query, value, context, Variables::default(), None)
            .await
    }

    /// Executes `query` with the provided variables against a schema having
    /// this object type as its query root.
    ///
    /// A document with several operations requires `operation_name`.
    pub async fn execute_with(
        &self,
        query: impl Into<String>,
        value: S,
        context: Ctx,
        variables: Variables,
        operation_name: Option<&str>,
    ) -> Response {
        let schema = self
            .definition()
            .schema
            .get_or_init(|| create_schema(SchemaConfig::new(self.clone())));
        match schema {
            Ok(schema) => {
                schema
                    .execute_with(query, value, context, variables, operation_name)
                    .await
            }
            Err(e) => Response::from_errors(vec![ServerError::new(e.to_string(), None)]),
        }
    }
}

/// Creates an object type without any fields, from the provided
/// configuration.
pub fn create_object_type<S, Ctx>(config: ObjectConfig) -> ObjectType<S, Ctx>
where
    S: Send + Sync + 'static,
    Ctx: Send + Sync + 'static,
{
    NonNull::new(Object {
        name: config.name,
        description: config.description,
        fields: vec![],
        interfaces: vec![],
        schema: OnceLock::new(),
    })
}

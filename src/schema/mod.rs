//! Schema assembly and execution.

pub mod options;
pub mod registry;

use std::{
    fmt,
    future::{self, Future},
    marker::PhantomData,
    sync::Arc,
};

use async_graphql::{
    Request, Response, Variables,
    dynamic::{self, DynamicRequestExt as _, FieldValue},
};
use futures::FutureExt as _;
use itertools::Itertools as _;

use crate::{
    error::{Error, FieldResult},
    executor::{OnExecuteFn, OperationInfo, OperationScopeExtension, RootHook},
    schema::{options::SchemaOptions, registry::Registry},
    types::{
        base::{GraphQLType, Registrable},
        object::ObjectType,
    },
};

/// Configuration of a schema whose roots resolve source values of type `S`
/// given a context of type `Ctx`.
///
/// The query root and the mutation root share both types, so a single value
/// and context serve whichever operation a request executes.
pub struct SchemaConfig<S, Ctx = ()> {
    query: ObjectType<S, Ctx>,
    mutation: Option<ObjectType<S, Ctx>>,
    on_execute: Option<OnExecuteFn<S, Ctx>>,
    types: Vec<Arc<dyn Registrable>>,
    options: SchemaOptions,
}

impl<S, Ctx> SchemaConfig<S, Ctx>
where
    S: Send + Sync + 'static,
    Ctx: Send + Sync + 'static,
{
    /// Starts a configuration of a schema with the provided query root.
    pub fn new(query: ObjectType<S, Ctx>) -> Self {
        Self {
            query,
            mutation: None,
            on_execute: None,
            types: vec![],
            options: SchemaOptions::default(),
        }
    }

    /// Sets the mutation root.
    #[must_use]
    pub fn mutation(mut self, mutation: ObjectType<S, Ctx>) -> Self {
        self.mutation = Some(mutation);
        self
    }

    /// Sets the hook called once at the start of every operation, before any
    /// root field resolves.
    ///
    /// If the hook fails, every root field of the operation resolves to an
    /// error carrying its message.
    #[must_use]
    pub fn on_execute<F>(self, on_execute: F) -> Self
    where
        F: Fn(&S, &Ctx, &OperationInfo) -> FieldResult<()> + Send + Sync + 'static,
    {
        self.on_execute_async(move |source, context, info| {
            future::ready(on_execute(source, context, info))
        })
    }

    /// Sets the asynchronous hook called once at the start of every operation,
    /// before any root field resolves.
    ///
    /// If the hook fails, every root field of the operation resolves to an
    /// error carrying its message.
    #[must_use]
    pub fn on_execute_async<F, Fut>(mut self, on_execute: F) -> Self
    where
        F: Fn(&S, &Ctx, &OperationInfo) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FieldResult<()>> + Send + 'static,
    {
        self.on_execute = Some(Arc::new(
            move |source: &S, context: &Ctx, info: &OperationInfo| {
                on_execute(source, context, info).boxed()
            },
        ));
        self
    }

    /// Adds a type to the schema, even if no root reaches it.
    ///
    /// Needed for object types reachable only through an interface.
    #[must_use]
    pub fn register<T: GraphQLType>(mut self, ty: T) -> Self {
        self.types.push(Arc::new(ty));
        self
    }

    /// Sets the engine options.
    #[must_use]
    pub fn options(mut self, options: SchemaOptions) -> Self {
        self.options = options;
        self
    }
}

/// Executable schema whose roots resolve source values of type `S` given a
/// context of type `Ctx`.
pub struct Schema<S, Ctx = ()> {
    schema: dynamic::Schema,
    _marker: PhantomData<fn(S, Ctx)>,
}

// Implemented manually to omit redundant `S: Clone` and `Ctx: Clone` trait
// bounds, imposed by `#[derive(Clone)]`.
impl<S, Ctx> Clone for Schema<S, Ctx> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S, Ctx> fmt::Debug for Schema<S, Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").finish_non_exhaustive()
    }
}

impl<S, Ctx> Schema<S, Ctx>
where
    S: Send + Sync + 'static,
    Ctx: Send + Sync + 'static,
{
    /// Executes `query`, resolving its root fields out of `value`.
    pub async fn execute(&self, query: impl Into<String>, value: S, context: Ctx) -> Response {
        self.execute_with(query, value, context, Variables::default(), None)
            .await
    }

    /// Executes `query` with the provided variables, resolving its root
    /// fields out of `value`.
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
        let mut request = Request::new(query).variables(variables).data(context);
        if let Some(name) = operation_name {
            request = request.operation_name(name);
        }
        let request = request.root_value(FieldValue::owned_any(value));

        let response = __strong_graphql_instrument_trace!(
            self.schema.execute(request),
            "execute"
        )
        .await;

        __strong_graphql_trace!("Executed with {} error(s)", response.errors.len());

        response
    }

    /// Returns the schema of the underlying engine.
    #[must_use]
    pub fn weak_schema(&self) -> &dynamic::Schema {
        &self.schema
    }

    /// Returns the schema in the GraphQL schema definition language.
    #[must_use]
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }
}

/// Builds an executable schema from the provided configuration.
///
/// Every type reachable from the roots, and every type registered explicitly,
/// is built exactly once. Deferred field types are evaluated here.
///
/// # Errors
///
/// - [`Error::DuplicateType`] if different definitions share a type name.
/// - [`Error::Schema`] if the engine rejects the resulting schema.
/// - Any error of building a deferred field type.
pub fn create_schema<S, Ctx>(config: SchemaConfig<S, Ctx>) -> Result<Schema<S, Ctx>, Error>
where
    S: Send + Sync + 'static,
    Ctx: Send + Sync + 'static,
{
    let SchemaConfig {
        query,
        mutation,
        on_execute,
        types,
        options,
    } = config;

    // Roots are reserved first, so they get wrapped with the hook even when
    // other types reach them through fields.
    let mut registry = Registry::new();
    let roots = [Some(&query), mutation.as_ref()];
    for root in roots.iter().flatten() {
        registry.reserve(root.name(), root.definition())?;
    }
    for root in roots.into_iter().flatten().dedup_by(|a, b| a.ptr_eq(b)) {
        let hook = on_execute
            .as_ref()
            .map(|f| RootHook::new(Arc::clone(f), root.name().into()));
        let weak = root.definition().build_weak(&mut registry, hook.as_ref())?;
        registry.define(root.name(), weak);
    }
    for ty in &types {
        ty.register_into(&mut registry)?;
    }

    __strong_graphql_trace_debug!(
        "Building schema with {} type(s)",
        registry.type_names().count()
    );

    let mut builder =
        dynamic::Schema::build(query.name(), mutation.as_ref().map(|m| m.name()), None);
    for ty in registry.into_types() {
        builder = builder.register(ty);
    }
    builder = options.apply(builder);
    if on_execute.is_some() {
        builder = builder.extension(OperationScopeExtension);
    }

    Ok(Schema {
        schema: builder.finish()?,
        _marker: PhantomData,
    })
}

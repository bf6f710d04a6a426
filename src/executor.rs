//! Per-operation execution state, and the `on_execute` hook running once at
//! the start of every operation.

use std::{
    any::Any,
    fmt,
    sync::{Arc, OnceLock},
};

use arcstr::ArcStr;
use async_graphql::{
    Request, ServerResult,
    dynamic::ResolverContext,
    parser::types::OperationType,
    extensions::{Extension, ExtensionContext, ExtensionFactory, NextPrepareRequest},
};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt as _, Shared};

use crate::error::{FieldError, FieldResult};

/// Kind of an executed operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperationKind {
    /// `query` operation, or a shorthand selection set.
    Query,

    /// `mutation` operation.
    Mutation,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        })
    }
}

/// Information about the operation being executed, passed to the
/// `on_execute` hook.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperationInfo {
    /// Kind of the operation.
    pub kind: OperationKind,

    /// Name of the root object type the operation selects from.
    pub root_type: ArcStr,

    /// Name of the operation, if the request names one.
    pub operation_name: Option<ArcStr>,
}

pub(crate) type OnExecuteFn<S, Ctx> =
    Arc<dyn Fn(&S, &Ctx, &OperationInfo) -> BoxFuture<'static, FieldResult<()>> + Send + Sync>;

type Outcome = Shared<BoxFuture<'static, FieldResult<()>>>;

/// State of a single operation, stored in the data of its request.
pub(crate) struct OperationScope {
    operation_name: Option<ArcStr>,
    outcome: OnceLock<Outcome>,
}

impl OperationScope {
    fn new(operation_name: Option<&str>) -> Self {
        Self {
            operation_name: operation_name.map(ArcStr::from),
            outcome: OnceLock::new(),
        }
    }

    /// Returns the shared outcome of `start`, calling it only for the first
    /// root field of the operation.
    fn run_once<F>(&self, start: F) -> Outcome
    where
        F: FnOnce() -> BoxFuture<'static, FieldResult<()>>,
    {
        self.outcome.get_or_init(|| start().shared()).clone()
    }
}

/// `on_execute` hook wrapping the fields of a root object type.
///
/// A single object type may serve as both the query and the mutation root, so
/// the kind of the operation is only known while executing it.
pub(crate) struct RootHook<S, Ctx> {
    on_execute: OnExecuteFn<S, Ctx>,
    root_type: ArcStr,
}

// Implemented manually to omit redundant `S: Clone` and `Ctx: Clone` trait
// bounds, imposed by `#[derive(Clone)]`.
impl<S, Ctx> Clone for RootHook<S, Ctx> {
    fn clone(&self) -> Self {
        Self {
            on_execute: Arc::clone(&self.on_execute),
            root_type: self.root_type.clone(),
        }
    }
}

impl<S, Ctx> RootHook<S, Ctx> {
    pub(crate) fn new(on_execute: OnExecuteFn<S, Ctx>, root_type: ArcStr) -> Self {
        Self {
            on_execute,
            root_type,
        }
    }

    /// Runs the hook once per operation, before any root field resolves.
    ///
    /// Every root field of the operation awaits the same outcome, so a failed
    /// hook fails all of them.
    pub(crate) fn before_field(
        &self,
        source: &S,
        context: &Ctx,
        kind: OperationKind,
        scope: &OperationScope,
    ) -> Outcome {
        scope.run_once(|| {
            let info = OperationInfo {
                kind,
                root_type: self.root_type.clone(),
                operation_name: scope.operation_name.clone(),
            };

            __strong_graphql_trace!(
                "Running `on_execute` hook of {} `{}`",
                info.kind,
                info.root_type
            );

            let outcome = (self.on_execute)(source, context, &info);
            let outcome = async move {
                let outcome = outcome.await;
                if let Err(e) = &outcome {
                    __strong_graphql_trace_warn!("`on_execute` hook failed: {}", e.message);
                }
                outcome
            };
            __strong_graphql_instrument_trace!(outcome, "on_execute").boxed()
        })
    }
}

/// Engine extension preparing the [`OperationScope`] of every request.
pub(crate) struct OperationScopeExtension;

impl ExtensionFactory for OperationScopeExtension {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(Self)
    }
}

#[async_trait]
impl Extension for OperationScopeExtension {
    async fn prepare_request(
        &self,
        ctx: &ExtensionContext<'_>,
        request: Request,
        next: NextPrepareRequest<'_>,
    ) -> ServerResult<Request> {
        let scope = OperationScope::new(request.operation_name.as_deref());
        next.run(ctx, request.data(scope)).await
    }
}

/// Returns the kind of the operation `ctx` belongs to.
pub(crate) fn operation_kind(ctx: &ResolverContext<'_>) -> OperationKind {
    match ctx.query_env.operation.node.ty {
        OperationType::Mutation => OperationKind::Mutation,
        OperationType::Query | OperationType::Subscription => OperationKind::Query,
    }
}

/// Returns the context of type `Ctx` the operation executes with.
///
/// `()` needs no request data, so nested types without a context resolve
/// under any schema.
pub(crate) fn context_data<'a, Ctx>(ctx: &ResolverContext<'a>) -> FieldResult<&'a Ctx>
where
    Ctx: Send + Sync + 'static,
{
    if let Some(context) = ctx.data_opt::<Ctx>() {
        return Ok(context);
    }
    (&() as &(dyn Any + Send + Sync))
        .downcast_ref::<Ctx>()
        .ok_or_else(|| {
            FieldError::new(format!(
                "Operation context is not `{}`",
                std::any::type_name::<Ctx>(),
            ))
        })
}

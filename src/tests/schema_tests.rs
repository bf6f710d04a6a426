use std::{
    future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use arcstr::ArcStr;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::fixtures::{Foo, foo_type, nullable_root};
use crate::{
    Error, FieldConfig, FieldError, GraphQLType, Limits, ObjectConfig, ObjectType, OperationInfo,
    OperationKind, SchemaConfig, SchemaOptions, Variables, create_object_type, create_schema,
    integer_type,
};

#[tokio::test]
async fn on_execute_runs_once_per_operation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = create_schema(SchemaConfig::new(nullable_root("Query").unwrap()).on_execute({
        let calls = Arc::clone(&calls);
        move |_, _, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }))
    .unwrap();

    for expected in 1..=2 {
        let response = schema.execute("{ a b c }", Foo::default(), ()).await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"a": 1, "b": 2, "c": 3}),
        );
        assert_eq!(calls.load(Ordering::SeqCst), expected);
    }
}

#[tokio::test]
async fn on_execute_is_scoped_to_operation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = create_schema(
        SchemaConfig::new(nullable_root("Query").unwrap()).on_execute_async({
            let calls = Arc::clone(&calls);
            move |_, _, _| {
                let calls = Arc::clone(&calls);
                async move {
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }
        }),
    )
    .unwrap();

    let (first, second) = futures::future::join(
        schema.execute("{ a b }", Foo::default(), ()),
        schema.execute("{ b c }", Foo::default(), ()),
    )
    .await;

    assert!(first.errors.is_empty(), "{:?}", first.errors);
    assert!(second.errors.is_empty(), "{:?}", second.errors);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn on_execute_receives_root_context_and_operation() {
    fn root(name: &str) -> ObjectType<Foo, &'static str> {
        create_object_type::<Foo, &'static str>(ObjectConfig::new(name))
            .field(FieldConfig::new("a", integer_type()), |foo, (), _| {
                Ok(Some(foo.a))
            })
            .and_then(|ty| {
                ty.field(FieldConfig::new("b", integer_type()), |foo, (), _| {
                    Ok(Some(foo.b))
                })
            })
            .unwrap()
    }

    let infos = Arc::new(Mutex::new(vec![]));
    let schema = create_schema(
        SchemaConfig::new(root("Query"))
            .mutation(root("Mutation"))
            .on_execute({
                let infos = Arc::clone(&infos);
                move |foo: &Foo, ctx: &&'static str, info: &OperationInfo| {
                    infos.lock().unwrap().push((foo.a, *ctx, info.clone()));
                    Ok(())
                }
            }),
    )
    .unwrap();

    let response = schema
        .execute_with(
            "query Fetch { a } mutation Change { b }",
            Foo {
                a: 7,
                ..Foo::default()
            },
            "ctx",
            Variables::default(),
            Some("Change"),
        )
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap(), json!({"b": 2}));

    let response = schema.execute("{ a b }", Foo::default(), "other").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    assert_eq!(
        *infos.lock().unwrap(),
        [
            (
                7,
                "ctx",
                OperationInfo {
                    kind: OperationKind::Mutation,
                    root_type: "Mutation".into(),
                    operation_name: Some("Change".into()),
                },
            ),
            (
                1,
                "other",
                OperationInfo {
                    kind: OperationKind::Query,
                    root_type: "Query".into(),
                    operation_name: None,
                },
            ),
        ],
    );
}

#[tokio::test]
async fn on_execute_failure_fails_every_root_field() {
    for schema in [
        create_schema(
            SchemaConfig::new(nullable_root("Query").unwrap())
                .on_execute(|_, _, _| Err(FieldError::new("Not allowed"))),
        ),
        create_schema(
            SchemaConfig::new(nullable_root("Query").unwrap())
                .on_execute_async(|_, _, _| future::ready(Err(FieldError::new("Not allowed")))),
        ),
    ] {
        let response = schema
            .unwrap()
            .execute("{ a b c }", Foo::default(), ())
            .await;

        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"a": null, "b": null, "c": null}),
        );
        assert_eq!(response.errors.len(), 3);
        assert!(response.errors.iter().all(|e| e.message == "Not allowed"));
    }
}

#[tokio::test]
async fn on_execute_failure_fails_mutations() {
    let schema = create_schema(
        SchemaConfig::new(nullable_root("Query").unwrap())
            .mutation(nullable_root("Mutation").unwrap())
            .on_execute(|_, _, info| match info.kind {
                OperationKind::Query => Ok(()),
                OperationKind::Mutation => Err(FieldError::new("Read only")),
            }),
    )
    .unwrap();

    let response = schema
        .execute("mutation { a b c }", Foo::default(), ())
        .await;
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({"a": null, "b": null, "c": null}),
    );
    assert_eq!(response.errors.len(), 3);

    let response = schema.execute("{ a b c }", Foo::default(), ()).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
}

#[tokio::test]
async fn applies_options() {
    let query = || nullable_root("Query").unwrap();
    let introspection = "{ __schema { queryType { name } } }";

    let schema = create_schema(SchemaConfig::new(query())).unwrap();
    let response = schema.execute(introspection, Foo::default(), ()).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({"__schema": {"queryType": {"name": "Query"}}}),
    );

    let schema = create_schema(SchemaConfig::new(query()).options(SchemaOptions {
        introspection: false,
        ..SchemaOptions::default()
    }))
    .unwrap();
    let response = schema.execute(introspection, Foo::default(), ()).await;
    assert!(!response.errors.is_empty());

    let schema = create_schema(SchemaConfig::new(foo_type().unwrap()).options(SchemaOptions {
        limits: Limits {
            depth: Some(0),
            ..Limits::default()
        },
        ..SchemaOptions::default()
    }))
    .unwrap();
    let response = schema.execute("{ a }", Foo::default(), ()).await;
    assert!(!response.errors.is_empty());
}

#[tokio::test]
async fn executes_with_variables() {
    let schema = create_schema(SchemaConfig::new(foo_type().unwrap())).unwrap();

    let response = schema
        .execute_with(
            "query Pick($skip: Boolean!) { a b @skip(if: $skip) }",
            Foo::default(),
            (),
            Variables::from_json(json!({"skip": true})),
            None,
        )
        .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap(), json!({"a": 1}));
}

#[test]
fn renders_roots_in_sdl() {
    let schema = create_schema(
        SchemaConfig::new(nullable_root("Query").unwrap())
            .mutation(nullable_root("Mutation").unwrap()),
    )
    .unwrap();

    let sdl = schema.sdl();

    assert!(sdl.contains("type Query"), "{sdl}");
    assert!(sdl.contains("type Mutation"), "{sdl}");
}

#[tokio::test]
async fn on_execute_wraps_roots_reachable_from_each_other() {
    let mutation = nullable_root("Mutation").unwrap();
    let query = nullable_root("Query")
        .unwrap()
        .field_non_null(FieldConfig::new("m", mutation.clone()), |foo, (), _| {
            Ok(foo.clone())
        })
        .unwrap();

    let kinds = Arc::new(Mutex::new(vec![]));
    let schema = create_schema(SchemaConfig::new(query).mutation(mutation).on_execute({
        let kinds = Arc::clone(&kinds);
        move |_, _, info| {
            kinds.lock().unwrap().push(info.kind);
            Ok(())
        }
    }))
    .unwrap();

    let response = schema
        .execute("mutation { a b c }", Foo::default(), ())
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({"a": 1, "b": 2, "c": 3}),
    );

    let response = schema.execute("{ m { a } }", Foo::default(), ()).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({"m": {"a": 1}}),
    );

    assert_eq!(
        *kinds.lock().unwrap(),
        [OperationKind::Mutation, OperationKind::Query],
    );
}

#[tokio::test]
async fn on_execute_reports_kind_of_shared_root() {
    let root = nullable_root("Root").unwrap();
    let infos = Arc::new(Mutex::new(vec![]));
    let schema = create_schema(SchemaConfig::new(root.clone()).mutation(root).on_execute({
        let infos = Arc::clone(&infos);
        move |_, _, info: &OperationInfo| {
            infos.lock().unwrap().push((info.kind, info.root_type.clone()));
            Ok(())
        }
    }))
    .unwrap();

    for query in ["mutation { a }", "{ a }"] {
        let response = schema.execute(query, Foo::default(), ()).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
    }

    assert_eq!(
        *infos.lock().unwrap(),
        [
            (OperationKind::Mutation, ArcStr::from("Root")),
            (OperationKind::Query, ArcStr::from("Root")),
        ],
    );
}

#[test]
fn rejects_distinct_types_sharing_a_name() {
    let inner = create_object_type::<Foo, ()>(ObjectConfig::new("Query"))
        .field(FieldConfig::new("x", integer_type()), |_, (), _| Ok(None))
        .unwrap();
    let query = nullable_root("Query")
        .unwrap()
        .field_non_null(FieldConfig::new("other", inner), |foo, (), _| {
            Ok(foo.clone())
        })
        .unwrap();

    let err = create_schema(SchemaConfig::new(query)).err().unwrap();

    assert_eq!(
        err,
        Error::DuplicateType {
            type_name: "Query".into(),
        },
    );
    assert_eq!(
        err.to_string(),
        "Schema contains more than one type named 'Query'.",
    );
}

#[test]
fn rejects_several_generations_of_a_type() {
    let foo = foo_type().unwrap();
    let extended = foo
        .field(FieldConfig::new("d", integer_type()), |_, (), _| Ok(None))
        .unwrap();
    let query = create_object_type::<Foo, ()>(ObjectConfig::new("Query"))
        .field_non_null(FieldConfig::new("foo", foo.clone()), |foo, (), _| {
            Ok(foo.clone())
        })
        .and_then(|ty| {
            ty.field_non_null(FieldConfig::new("extended", extended), |foo, (), _| {
                Ok(foo.clone())
            })
        })
        .unwrap();

    assert_eq!(
        create_schema(SchemaConfig::new(query)).err(),
        Some(Error::DuplicateType {
            type_name: "Foo".into(),
        }),
    );

    let shared = create_object_type::<Foo, ()>(ObjectConfig::new("Query"))
        .field_non_null(FieldConfig::new("first", foo.clone()), |foo, (), _| {
            Ok(foo.clone())
        })
        .and_then(|ty| {
            ty.field_non_null(FieldConfig::new("second", foo.nullable()), |foo, (), _| {
                Ok(Some(foo.clone()))
            })
        })
        .unwrap();

    assert!(create_schema(SchemaConfig::new(shared)).is_ok());
}

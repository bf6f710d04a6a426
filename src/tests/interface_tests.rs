use std::future;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::fixtures::{
    Character, character_implementation, character_type, droid_type, human_type,
};
use crate::{
    Error, FieldConfig, FieldError, Implementation, ObjectConfig, SchemaConfig,
    create_list_type, create_object_type, create_schema, integer_type, string_type,
};

#[tokio::test]
async fn resolves_interface_values_to_objects() {
    let character = character_type().unwrap();
    let query = create_object_type::<(), ()>(ObjectConfig::new("Query"))
        .field_non_null(
            FieldConfig::new("heroes", create_list_type(character.clone())),
            |_, (), _| Ok(Character::heroes()),
        )
        .unwrap();
    let schema = create_schema(
        SchemaConfig::new(query)
            .register(human_type(&character).unwrap())
            .register(droid_type(&character).unwrap()),
    )
    .unwrap();

    let response = schema
        .execute(
            r#"{
                heroes {
                    __typename
                    name
                    greeting(loud: true)
                    ... on Human { homePlanet }
                    ... on Droid { primaryFunction }
                }
            }"#,
            (),
            (),
        )
        .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({
            "heroes": [
                {
                    "__typename": "Human",
                    "name": "Luke Skywalker",
                    "greeting": "HELLO, I AM LUKE SKYWALKER",
                    "homePlanet": "Tatooine",
                },
                {
                    "__typename": "Droid",
                    "name": "R2-D2",
                    "greeting": "HELLO, I AM R2-D2",
                    "primaryFunction": "Astromech",
                },
            ],
        }),
    );
}

#[tokio::test]
async fn copies_interface_fields_onto_objects() {
    let character = character_type().unwrap();
    let human = human_type(&character).unwrap();

    assert_eq!(
        human.field_names().collect::<Vec<_>>(),
        ["name", "greeting", "homePlanet"],
    );
    assert_eq!(human.interface_names().collect::<Vec<_>>(), ["Character"]);

    let response = human
        .execute(
            "{ name greeting }",
            Character::heroes().swap_remove(0),
            (),
        )
        .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({"name": "Luke Skywalker", "greeting": "Hello, I am Luke Skywalker"}),
    );
}

#[test]
fn rejects_incomplete_implementation() {
    let character = character_type().unwrap();

    let err = create_object_type::<Character, ()>(ObjectConfig::new("Human"))
        .implement(&character, Implementation::new())
        .err()
        .unwrap();

    assert_eq!(
        err,
        Error::IncompleteImplementation {
            type_name: "Human".into(),
            interface_name: "Character".into(),
            missing: "'name', 'greeting'".into(),
        },
    );
    assert_eq!(
        err.to_string(),
        "Type 'Human' does not implement field(s) 'name', 'greeting' of interface \
         'Character'.",
    );
}

#[test]
fn rejects_unknown_implementation_fields() {
    let character = character_type().unwrap();

    let err = create_object_type::<Character, ()>(ObjectConfig::new("Human"))
        .implement(
            &character,
            character_implementation()
                .resolve("age", |_: &Character, (): (), _: &()| Ok(Some(42))),
        )
        .err()
        .unwrap();

    assert_eq!(
        err,
        Error::UnknownImplementationField {
            type_name: "Human".into(),
            interface_name: "Character".into(),
            field_name: "age".into(),
        },
    );
}

#[test]
fn rejects_mismatching_resolvers() {
    let character = character_type().unwrap();

    let err = create_object_type::<Character, ()>(ObjectConfig::new("Human"))
        .implement(
            &character,
            character_implementation()
                .resolve("name", |c: &Character, (): (), _: &()| Ok(c.name().to_owned())),
        )
        .err()
        .unwrap();

    assert!(
        matches!(
            &err,
            Error::ImplementationMismatch { field_name, expected, found, .. }
                if field_name == "name"
                    && expected.contains("Option")
                    && !found.contains("Option"),
        ),
        "{err}",
    );

    let err = create_object_type::<Character, ()>(ObjectConfig::new("Human"))
        .implement(
            &character,
            character_implementation().resolve(
                "greeting",
                |_: &Character, (): (), _: &()| Ok(String::new()),
            ),
        )
        .err()
        .unwrap();

    assert!(
        matches!(
            &err,
            Error::ImplementationMismatch { field_name, .. } if field_name == "greeting",
        ),
        "{err}",
    );
}

#[test]
fn rejects_fields_colliding_with_interface() {
    let character = character_type().unwrap();

    let err = create_object_type::<Character, ()>(ObjectConfig::new("Human"))
        .field(FieldConfig::new("name", string_type()), |_, (), _| Ok(None))
        .unwrap()
        .implement(&character, character_implementation())
        .err()
        .unwrap();

    assert_eq!(
        err,
        Error::DuplicateField {
            type_name: "Human".into(),
            field_name: "name".into(),
        },
    );

    let err = human_type(&character)
        .unwrap()
        .field(FieldConfig::new("greeting", integer_type()), |_, (), _| {
            Ok(None)
        })
        .err()
        .unwrap();

    assert_eq!(
        err,
        Error::DuplicateField {
            type_name: "Human".into(),
            field_name: "greeting".into(),
        },
    );
}

#[tokio::test]
async fn supports_async_implementations() {
    let character = character_type().unwrap();
    let droid = create_object_type::<Character, ()>(ObjectConfig::new("Droid"))
        .implement(
            &character,
            Implementation::new()
                .resolve_async("name", |c: &Character, (): (), _: &()| {
                    let name = c.name().to_owned();
                    async move { Ok(Some(name)) }
                })
                .resolve_async("greeting", |_: &Character, (_,): (bool,), _: &()| {
                    future::ready(Err::<String, _>(FieldError::new("Beep")))
                }),
        )
        .unwrap();

    let response = droid
        .execute("{ name greeting }", Character::heroes().swap_remove(1), ())
        .await;

    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "Beep");
}

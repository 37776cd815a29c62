use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use super::*;

const BLOG: &str = r#"{
    "models": [
        {
            "name": "User",
            "documentation": "A person",
            "fields": [
                { "name": "id", "kind": "scalar", "type": "Int", "isRequired": true, "isId": true,
                  "hasDefaultValue": true, "default": { "name": "autoincrement", "args": [] } },
                { "name": "email", "kind": "scalar", "type": "String", "isRequired": true, "isUnique": true },
                { "name": "score", "kind": "scalar", "type": "Float", "isRequired": true,
                  "hasDefaultValue": true, "default": 1.5 },
                { "name": "role", "kind": "enum", "type": "Role", "isRequired": true,
                  "hasDefaultValue": true, "default": "USER" },
                { "name": "posts", "kind": "object", "type": "Post", "isList": true,
                  "relationName": "PostToUser" }
            ]
        },
        {
            "name": "Post",
            "fields": [
                { "name": "id", "kind": "scalar", "type": "String", "isRequired": true, "isId": true },
                { "name": "author", "kind": "object", "type": "User", "isRequired": true,
                  "relationName": "PostToUser" },
                { "name": "authorId", "kind": "scalar", "type": "Int", "isRequired": true, "isReadOnly": true }
            ]
        }
    ],
    "enums": [
        { "name": "Role", "values": [{ "name": "USER" }, { "name": "ADMIN", "documentation": "Superuser" }] }
    ]
}"#;

#[test]
fn deserialize_dmmf_like_snapshot() {
    let datamodel = Datamodel::from_json_str(BLOG).unwrap();
    let user = datamodel.entity("User").unwrap();

    assert_eq!(user.documentation.as_deref(), Some("A person"));
    assert_eq!(
        user.scalar_fields().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        vec!["id", "email", "score", "role"]
    );
    assert_eq!(
        user.relation_fields().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        vec!["posts"]
    );
    assert!(user.has_list_relations());
    assert!(user.has_numeric_fields());
    assert!(datamodel.output_types.is_empty());
}

#[test]
fn default_values() {
    let datamodel = Datamodel::from_json_str(BLOG).unwrap();
    let user = datamodel.entity("User").unwrap();

    let id = user.field("id").unwrap();
    assert!(id.is_auto_generated());
    assert!(!id.is_writable());
    assert_eq!(id.literal_default(), None);

    assert_eq!(
        user.field("score").unwrap().literal_default(),
        Some(&Literal::Float(1.5))
    );
    assert_eq!(
        user.field("role").unwrap().literal_default(),
        Some(&Literal::String("USER".into()))
    );
}

#[test]
fn opposite_relation_field() {
    let datamodel = Datamodel::from_json_str(BLOG).unwrap();
    let user = datamodel.entity("User").unwrap();
    let post = datamodel.entity("Post").unwrap();

    let author = datamodel
        .opposite_relation_field(user, user.field("posts").unwrap())
        .unwrap();
    assert_eq!(author.name, "author");

    let posts = datamodel
        .opposite_relation_field(post, post.field("author").unwrap())
        .unwrap();
    assert_eq!(posts.name, "posts");
    assert!(!post.field("authorId").unwrap().is_writable());
}

#[test]
fn self_relation_pairs_with_the_other_field() {
    let datamodel = Datamodel::from_json_value(serde_json::json!({
        "models": [{
            "name": "User",
            "fields": [
                { "name": "id", "kind": "scalar", "type": "String", "isRequired": true, "isId": true },
                { "name": "following", "kind": "object", "type": "User", "isList": true, "relationName": "UserFollows" },
                { "name": "followers", "kind": "object", "type": "User", "isList": true, "relationName": "UserFollows" }
            ]
        }]
    }))
    .unwrap();
    let user = datamodel.entity("User").unwrap();
    let following = user.field("following").unwrap();

    assert!(following.is_self_relation("User"));
    assert_eq!(
        datamodel
            .opposite_relation_field(user, following)
            .map(|f| f.name.as_str()),
        Some("followers")
    );
}

#[test]
fn lone_self_relation_field_is_unpaired() {
    let datamodel = Datamodel::from_json_value(serde_json::json!({
        "models": [{
            "name": "Category",
            "fields": [
                { "name": "id", "kind": "scalar", "type": "Int", "isRequired": true, "isId": true },
                { "name": "parent", "kind": "object", "type": "Category", "relationName": "Tree" }
            ]
        }]
    }))
    .unwrap();
    let category = datamodel.entity("Category").unwrap();
    let parent = category.field("parent").unwrap();

    assert!(parent.is_self_relation("Category"));
    assert_eq!(datamodel.opposite_relation_field(category, parent), None);
}

#[test]
fn scalar_kind_names() {
    for kind in ScalarKind::ALL {
        assert_eq!(kind.name().parse::<ScalarKind>(), Ok(kind));
    }
    assert_eq!("Geometry".parse::<ScalarKind>(), Err(()));
    assert!(ScalarKind::Decimal.is_numeric());
    assert!(ScalarKind::DateTime.is_ordered());
    assert!(!ScalarKind::Json.is_ordered());
}

#[test]
fn duplicate_models_are_rejected() {
    let result = Datamodel::from_json_value(serde_json::json!({
        "models": [
            { "name": "User", "fields": [] },
            { "name": "User", "fields": [] }
        ]
    }));
    assert_matches!(result, Err(SchemaError::DuplicateModel(name)) if name == "User");
}

use nestgql_schema::Datamodel;

/// Users, articles, tags and comments. `User` relates to itself through `following` and
/// `followers`.
pub const BLOG: &str = include_str!("../fixtures/blog.json");

/// One entity with a field of every scalar kind.
pub const DUMMY: &str = include_str!("../fixtures/dummy.json");

#[track_caller]
pub fn blog() -> Datamodel {
    load(BLOG)
}

#[track_caller]
pub fn dummy() -> Datamodel {
    load(DUMMY)
}

#[track_caller]
fn load(json: &str) -> Datamodel {
    match Datamodel::from_json_str(json) {
        Ok(datamodel) => datamodel,
        Err(error) => panic!("invalid fixture: {error}"),
    }
}

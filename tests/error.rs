use std::path::PathBuf;

use karma::error::{exit_codes, EntityKind, JsonError};
use karma::Error;

#[test]
fn exit_codes_follow_error_class() {
    let user = [
        Error::InvalidConfig("x".to_string()),
        Error::InvalidArgument("x".to_string()),
        Error::not_found(EntityKind::Task, "t1"),
        Error::DuplicateId {
            kind: EntityKind::Perspective,
            id: "inbox".to_string(),
        },
    ];
    for err in &user {
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR, "{err}");
    }

    assert_eq!(
        Error::NoDefaultPerspective("ws".to_string()).exit_code(),
        exit_codes::PRECONDITION_FAILED
    );
    assert_eq!(
        Error::LockFailed(PathBuf::from("tasks.json.lock")).exit_code(),
        exit_codes::OPERATION_FAILED
    );
    let io = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
    assert_eq!(io.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn json_error_carries_details() {
    let err = Error::DuplicateId {
        kind: EntityKind::Project,
        id: "home".to_string(),
    };
    let value = serde_json::to_value(JsonError::from(&err)).expect("json");

    assert_eq!(value["error"], "Duplicate Project id: home");
    assert_eq!(value["code"], 2);
    assert_eq!(value["details"]["kind"], "project");
    assert_eq!(value["details"]["id"], "home");
}

#[test]
fn json_error_omits_missing_details() {
    let err = Error::OperationFailed("boom".to_string());
    let value = serde_json::to_value(JsonError::from(&err)).expect("json");

    assert_eq!(value["code"], 4);
    assert!(value.get("details").is_none());
}

#[test]
fn failure_exit_codes_are_distinct_and_nonzero() {
    let codes = [
        exit_codes::USER_ERROR,
        exit_codes::PRECONDITION_FAILED,
        exit_codes::OPERATION_FAILED,
    ];
    assert!(codes.iter().all(|&code| code != 0));
    assert!(codes[0] != codes[1] && codes[1] != codes[2] && codes[0] != codes[2]);
}

use std::collections::HashSet;
use tempfile::TempDir;
use uservault_core::password::MIN_HASH_ITERATIONS;
use uservault_core::{
    AuthenticatedDataService, DataEntry, Database, Field, PasswordHasher, PutOutcome,
    ServiceConfig, ServiceError, ValidationError,
};
use uservault_core::model::validation::{
    DATA_NAME_MAX_CHARS, DATA_VALUE_MAX_BYTES, PASSWORD_MAX_BYTES,
};

fn service() -> (TempDir, AuthenticatedDataService) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("vault.db"), uservault_core::db::DEFAULT_BUSY_TIMEOUT)
        .unwrap();
    (
        dir,
        AuthenticatedDataService::new(db, PasswordHasher::new(MIN_HASH_ITERATIONS)),
    )
}

#[test]
fn register_same_username_twice_conflicts() {
    let (_dir, service) = service();

    service.register("alice", "pw1").unwrap();
    let err = service.register("alice", "pw2").unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(err.status_code(), 409);
}

#[test]
fn login_rejects_bad_credentials_generically() {
    let (_dir, service) = service();
    let id = service.register("alice", "pw1").unwrap();

    assert_eq!(service.login("alice", "pw1").unwrap(), id);

    let wrong = service.login("alice", "wrong").unwrap_err();
    let unknown = service.login("nobody", "pw1").unwrap_err();
    assert!(matches!(wrong, ServiceError::Auth));
    assert!(matches!(unknown, ServiceError::Auth));
    assert_eq!(wrong.to_string(), unknown.to_string());
    assert_eq!(wrong.status_code(), 401);
}

#[test]
fn put_then_overwrite_then_get_returns_latest() {
    let (_dir, service) = service();
    service.register("alice", "pw1").unwrap();

    assert_eq!(
        service.put("alice", "pw1", "score", "10").unwrap(),
        PutOutcome::Created
    );
    assert_eq!(
        service.put("alice", "pw1", "score", "12").unwrap(),
        PutOutcome::Updated
    );

    let entry = service.get("alice", "pw1", "score").unwrap();
    assert_eq!(
        entry,
        DataEntry {
            data_name: "score".to_string(),
            data_value: "12".to_string(),
        }
    );
}

#[test]
fn get_entry_serializes_with_wire_field_names() {
    let (_dir, service) = service();
    service.register("alice", "pw1").unwrap();
    service.put("alice", "pw1", "score", "10").unwrap();

    let entry = service.get("alice", "pw1", "score").unwrap();
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "dataName": "score", "dataValue": "10" })
    );
}

#[test]
fn get_missing_name_is_not_found() {
    let (_dir, service) = service();
    service.register("alice", "pw1").unwrap();

    let err = service.get("alice", "pw1", "missing").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn data_operations_require_valid_password() {
    let (_dir, service) = service();
    service.register("alice", "pw1").unwrap();
    service.put("alice", "pw1", "score", "10").unwrap();

    assert!(matches!(
        service.put("alice", "nope", "score", "99").unwrap_err(),
        ServiceError::Auth
    ));
    assert!(matches!(
        service.get("alice", "nope", "score").unwrap_err(),
        ServiceError::Auth
    ));
    assert_eq!(service.get("alice", "pw1", "score").unwrap().data_value, "10");
}

#[test]
fn list_names_reports_uploaded_names() {
    let (_dir, service) = service();
    service.register("alice", "pw1").unwrap();
    service.put("alice", "pw1", "score", "10").unwrap();
    service.put("alice", "pw1", "level", "2").unwrap();

    let names: HashSet<String> = service.list_names("alice").unwrap().into_iter().collect();
    let expected: HashSet<String> = ["score", "level"].into_iter().map(String::from).collect();
    assert_eq!(names, expected);
}

#[test]
fn delete_is_idempotent_and_get_then_misses() {
    let (_dir, service) = service();
    service.register("alice", "pw1").unwrap();
    service.put("alice", "pw1", "score", "10").unwrap();

    service.delete("alice", "score").unwrap();
    service.delete("alice", "score").unwrap();
    assert!(matches!(
        service.get("alice", "pw1", "score").unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[test]
fn delete_and_list_names_skip_password_but_need_known_user() {
    let (_dir, service) = service();
    service.register("alice", "pw1").unwrap();
    service.put("alice", "pw1", "score", "10").unwrap();

    assert_eq!(service.list_names("alice").unwrap(), vec!["score".to_string()]);
    service.delete("alice", "score").unwrap();
    assert!(service.list_names("alice").unwrap().is_empty());

    let unknown_delete = service.delete("ghost", "score").unwrap_err();
    let unknown_list = service.list_names("ghost").unwrap_err();
    assert!(matches!(unknown_delete, ServiceError::NotFound(_)));
    assert!(matches!(unknown_list, ServiceError::NotFound(_)));
    assert_eq!(unknown_list.status_code(), 404);
}

#[test]
fn same_name_is_isolated_between_accounts() {
    let (_dir, service) = service();
    service.register("alice", "pw1").unwrap();
    service.register("bob", "pw2").unwrap();
    service.put("alice", "pw1", "x", "v").unwrap();

    assert!(matches!(
        service.get("bob", "pw2", "x").unwrap_err(),
        ServiceError::NotFound(_)
    ));
    assert!(service.list_names("bob").unwrap().is_empty());
}

#[test]
fn validation_runs_before_storage() {
    let (_dir, service) = service();

    let err = service.register("", "pw").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::Missing(Field::Username))
    ));
    assert_eq!(err.status_code(), 400);

    assert!(matches!(
        service.register("alice", "").unwrap_err(),
        ServiceError::Validation(ValidationError::Missing(Field::Password))
    ));
    assert!(matches!(
        service.get("alice", "pw", "").unwrap_err(),
        ServiceError::Validation(ValidationError::Missing(Field::DataName))
    ));
    assert!(matches!(
        service.delete("alice", "bad\tname").unwrap_err(),
        ServiceError::Validation(ValidationError::ControlCharacter(Field::DataName))
    ));

    // Nothing reached storage.
    assert!(matches!(
        service.list_names("alice").unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[test]
fn size_limits_are_enforced_at_the_boundary() {
    let (_dir, service) = service();
    service.register("alice", "pw1").unwrap();

    let largest = "v".repeat(DATA_VALUE_MAX_BYTES);
    service.put("alice", "pw1", "blob", &largest).unwrap();
    assert_eq!(
        service.get("alice", "pw1", "blob").unwrap().data_value.len(),
        DATA_VALUE_MAX_BYTES
    );

    let err = service
        .put("alice", "pw1", "blob", &"v".repeat(DATA_VALUE_MAX_BYTES + 1))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::TooLong {
            field: Field::DataValue,
            ..
        })
    ));
    assert_eq!(err.status_code(), 400);
    assert_eq!(
        service.get("alice", "pw1", "blob").unwrap().data_value.len(),
        DATA_VALUE_MAX_BYTES
    );

    let longest_name = "n".repeat(DATA_NAME_MAX_CHARS);
    service.put("alice", "pw1", &longest_name, "1").unwrap();
    let err = service
        .put("alice", "pw1", &"n".repeat(DATA_NAME_MAX_CHARS + 1), "1")
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    let longest_password = "p".repeat(PASSWORD_MAX_BYTES);
    service.register("bob", &longest_password).unwrap();
    service.login("bob", &longest_password).unwrap();
    let err = service
        .register("carol", &"p".repeat(PASSWORD_MAX_BYTES + 1))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::TooLong {
            field: Field::Password,
            ..
        })
    ));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn from_config_bootstraps_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        db_path: dir.path().join("configured.db"),
        hash_iterations: MIN_HASH_ITERATIONS,
        ..ServiceConfig::default()
    };

    let service = AuthenticatedDataService::from_config(&config).unwrap();
    service.register("alice", "pw1").unwrap();

    assert!(config.db_path.exists());
    assert_eq!(service.database().path(), config.db_path.as_path());
}

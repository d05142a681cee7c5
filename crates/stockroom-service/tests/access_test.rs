//! Change-log behavior of user, role and permission services against PostgreSQL.

mod helpers;

use serde_json::json;

use helpers::{TestApp, detail};
use stockroom_core::error::ErrorKind;
use stockroom_entity::change_log::{Association, DiffType, Operation};
use stockroom_entity::role::CreateRole;
use stockroom_entity::user::{CreateUser, UpdateUser};
use stockroom_service::{MutationOptions, Viewer};

async fn role(app: &TestApp, options: &MutationOptions) -> i64 {
    app.services
        .roles
        .create(
            CreateRole {
                name: TestApp::unique("role"),
                description: None,
            },
            Some(options),
        )
        .await
        .expect("Failed to create role")
        .id
}

async fn user(app: &TestApp, options: &MutationOptions) -> i64 {
    app.services
        .users
        .create(
            CreateUser {
                username: TestApp::unique("user"),
                password_hash: "hash-one".to_string(),
            },
            Some(options),
        )
        .await
        .expect("Failed to create user")
        .id
}

#[tokio::test]
async fn test_password_hash_is_masked_for_generic_viewers() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let options = MutationOptions::actor(9);
    let user_id = user(&app, &options).await;
    app.services
        .users
        .update(
            user_id,
            UpdateUser {
                password_hash: Some("hash-two".to_string()),
                ..Default::default()
            },
            Some(&options),
        )
        .await
        .expect("update");

    let generic = app.trail_as(Viewer::Generic, Association::User, user_id).await;
    assert_eq!(generic.len(), 2);
    let masked = detail(&generic[1], "password_hash");
    assert_eq!(masked.old_value, Some(json!(app.config.audit.mask)));
    assert_eq!(masked.new_value, Some(json!(app.config.audit.mask)));
    assert!(detail(&generic[0], "username").new_value.is_some());

    let trusted = app.trail(Association::User, user_id).await;
    let revealed = detail(&trusted[1], "password_hash");
    assert_eq!(revealed.old_value, Some(json!("hash-one")));
    assert_eq!(revealed.new_value, Some(json!("hash-two")));
}

#[tokio::test]
async fn test_set_roles_links_and_unlinks() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let options = MutationOptions::actor(3);
    let user_id = user(&app, &options).await;
    let first = role(&app, &options).await;
    let second = role(&app, &options).await;

    app.services
        .users
        .set_roles(user_id, &[first, second], Some(&options))
        .await
        .expect("assign both");
    app.services
        .users
        .set_roles(user_id, &[second], Some(&options))
        .await
        .expect("keep second");

    assert_eq!(app.services.users.role_ids(user_id).await.expect("roles"), vec![second]);

    let trail = app.trail(Association::User, user_id).await;
    let ops: Vec<Operation> = trail.iter().map(|e| e.change_log.operation).collect();
    assert_eq!(
        ops,
        vec![Operation::Create, Operation::Link, Operation::Link, Operation::Unlink]
    );

    let unlink = &trail[3];
    assert_eq!(unlink.change_log.associations.user_id, Some(user_id));
    assert_eq!(unlink.change_log.associations.role_id, Some(first));
    assert_eq!(unlink.change_log.change_details, Some(json!({ "relation": "user_role" })));
    let role_detail = detail(unlink, "role_id");
    assert_eq!(role_detail.diff_type, DiffType::Removed);
    assert_eq!(role_detail.old_value, Some(json!(first)));
    assert_eq!(role_detail.new_value, None);

    let first_trail = app.trail(Association::Role, first).await;
    let ops: Vec<Operation> = first_trail.iter().map(|e| e.change_log.operation).collect();
    assert_eq!(ops, vec![Operation::Create, Operation::Link, Operation::Unlink]);
}

#[tokio::test]
async fn test_unknown_role_aborts_assignment() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let options = MutationOptions::actor(3);
    let user_id = user(&app, &options).await;

    let err = app
        .services
        .users
        .set_roles(user_id, &[i64::MAX], Some(&options))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(app.trail(Association::User, user_id).await.len(), 1);
}

#[tokio::test]
async fn test_role_with_users_cannot_be_deleted() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let options = MutationOptions::actor(6);
    let user_id = user(&app, &options).await;
    let role_id = role(&app, &options).await;
    app.services
        .users
        .add_role(user_id, role_id, Some(&options))
        .await
        .expect("assign");

    let err = app
        .services
        .roles
        .delete(role_id, Some(&options))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let ops: Vec<Operation> = app
        .trail(Association::Role, role_id)
        .await
        .iter()
        .map(|e| e.change_log.operation)
        .collect();
    assert_eq!(ops, vec![Operation::Create, Operation::Link]);
}

#[tokio::test]
async fn test_deleting_user_unlinks_roles_first() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let options = MutationOptions::actor(6);
    let user_id = user(&app, &options).await;
    let role_id = role(&app, &options).await;
    app.services
        .users
        .add_role(user_id, role_id, Some(&options))
        .await
        .expect("assign");

    app.services
        .users
        .delete(user_id, Some(&options))
        .await
        .expect("delete");

    let ops: Vec<Operation> = app
        .trail(Association::User, user_id)
        .await
        .iter()
        .map(|e| e.change_log.operation)
        .collect();
    assert_eq!(
        ops,
        vec![Operation::Create, Operation::Link, Operation::Unlink, Operation::Delete]
    );
}

#[tokio::test]
async fn test_bootstrap_is_idempotent() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };

    let first = app
        .services
        .bootstrap
        .populate_admin()
        .await
        .expect("first bootstrap");
    let second = app
        .services
        .bootstrap
        .populate_admin()
        .await
        .expect("second bootstrap");

    assert_eq!(second.role_id, first.role_id);
    assert_eq!(second.user_id, first.user_id);
    assert_eq!(second.permissions_created, 0);
    assert_eq!(second.permissions_granted, 0);
    assert!(!second.role_created && !second.user_created && !second.role_assigned);

    let granted = app
        .services
        .roles
        .permission_ids(first.role_id)
        .await
        .expect("grants");
    assert!(granted.len() >= 21);

    let trail = app.trail(Association::User, first.user_id).await;
    assert!(trail.iter().all(|e| e.change_log.changed_by.is_system()));
}

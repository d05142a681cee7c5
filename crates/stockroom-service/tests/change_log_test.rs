//! Change-log behavior of the inventory services against PostgreSQL.

mod helpers;

use serde_json::{Value, json};

use helpers::{TestApp, detail};
use stockroom_core::error::ErrorKind;
use stockroom_entity::category::CreateCategory;
use stockroom_entity::change_log::{Association, DiffType, Operation};
use stockroom_entity::item::{CreateItem, UnitType, UpdateItem};
use stockroom_service::MutationOptions;

fn pen(name: &str, department_id: i64) -> CreateItem {
    CreateItem {
        name: name.to_string(),
        quantity: 10,
        unit: UnitType::Unit,
        category_id: None,
        department_id,
    }
}

#[tokio::test]
async fn test_create_item_is_logged_with_actor() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let department_id = app.department().await;
    let name = TestApp::unique("Pen");

    let item = app
        .services
        .items
        .create(pen(&name, department_id), Some(&MutationOptions::actor(7)))
        .await
        .expect("create should succeed");

    let trail = app.trail(Association::Item, item.id).await;
    assert_eq!(trail.len(), 1);
    let entry = &trail[0];
    assert_eq!(entry.change_log.operation, Operation::Create);
    assert_eq!(entry.change_log.changed_by.get(), 7);
    assert_eq!(entry.change_log.associations.item_id, Some(item.id));

    let name_detail = detail(entry, "name");
    assert_eq!(name_detail.diff_type, DiffType::Added);
    assert_eq!(name_detail.old_value, None);
    assert_eq!(name_detail.new_value, Some(json!(name)));
    assert!(entry.details.iter().all(|d| d.diff_type == DiffType::Added));
}

#[tokio::test]
async fn test_identical_update_writes_nothing() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let department_id = app.department().await;
    let options = MutationOptions::actor(7);
    let item = app
        .services
        .items
        .create(pen(&TestApp::unique("Pen"), department_id), Some(&options))
        .await
        .expect("create should succeed");

    app.services
        .items
        .update(
            item.id,
            UpdateItem {
                quantity: Some(10),
                ..Default::default()
            },
            Some(&options),
        )
        .await
        .expect("update should succeed");

    assert_eq!(app.trail(Association::Item, item.id).await.len(), 1);
}

#[tokio::test]
async fn test_quantity_update_is_logged_as_changed() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let department_id = app.department().await;
    let options = MutationOptions::actor(3);
    let item = app
        .services
        .items
        .create(pen(&TestApp::unique("Pen"), department_id), Some(&options))
        .await
        .expect("create should succeed");

    app.services
        .items
        .update(
            item.id,
            UpdateItem {
                quantity: Some(12),
                ..Default::default()
            },
            Some(&options),
        )
        .await
        .expect("update should succeed");

    let trail = app.trail(Association::Item, item.id).await;
    assert_eq!(trail.len(), 2);
    let update = &trail[1];
    assert_eq!(update.change_log.operation, Operation::Update);

    let quantity = detail(update, "quantity");
    assert_eq!(quantity.diff_type, DiffType::Changed);
    assert_eq!(quantity.old_value, Some(json!(10)));
    assert_eq!(quantity.new_value, Some(json!(12)));
    assert!(update.details.iter().all(|d| d.field != "name"));
}

#[tokio::test]
async fn test_setting_and_clearing_category_is_link_then_unlink() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let department_id = app.department().await;
    let options = MutationOptions::actor(4);
    let category = app
        .services
        .categories
        .create(
            CreateCategory {
                name: TestApp::unique("Stationery"),
            },
            Some(&options),
        )
        .await
        .expect("category");
    let item = app
        .services
        .items
        .create(pen(&TestApp::unique("Pen"), department_id), Some(&options))
        .await
        .expect("item");

    let link = UpdateItem {
        category_id: Some(Some(category.id)),
        ..Default::default()
    };
    app.services
        .items
        .update(item.id, link, Some(&options))
        .await
        .expect("link");

    let unlink = UpdateItem {
        category_id: Some(None),
        ..Default::default()
    };
    app.services
        .items
        .update(item.id, unlink, Some(&options))
        .await
        .expect("unlink");

    let trail = app.trail(Association::Item, item.id).await;
    let ops: Vec<Operation> = trail.iter().map(|e| e.change_log.operation).collect();
    assert_eq!(ops, vec![Operation::Create, Operation::Link, Operation::Unlink]);

    let linked = detail(&trail[1], "category_id");
    assert_eq!(linked.old_value, None);
    assert_eq!(linked.new_value, Some(json!(category.id)));
    assert_eq!(
        trail[1].change_log.change_details,
        Some(json!({ "relation": "category_id", "related_id": category.id }))
    );

    let unlinked = detail(&trail[2], "category_id");
    assert_eq!(unlinked.diff_type, DiffType::Removed);
    assert_eq!(unlinked.old_value, Some(json!(category.id)));
    assert_eq!(unlinked.new_value, None);
}

#[tokio::test]
async fn test_guarded_delete_rolls_back_audit_rows() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let department_id = app.department().await;
    let options = MutationOptions::actor(5);
    let category = app
        .services
        .categories
        .create(
            CreateCategory {
                name: TestApp::unique("Tools"),
            },
            Some(&options),
        )
        .await
        .expect("category");
    let mut data = pen(&TestApp::unique("Hammer"), department_id);
    data.category_id = Some(category.id);
    app.services
        .items
        .create(data, Some(&options))
        .await
        .expect("item");

    let err = app
        .services
        .categories
        .delete(category.id, Some(&options))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let trail = app.trail(Association::Category, category.id).await;
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].change_log.operation, Operation::Create);
    assert!(app.services.categories.get(category.id).await.is_ok());
}

#[tokio::test]
async fn test_missing_actor_aborts_the_mutation() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let department_id = app.department().await;
    let name = TestApp::unique("Orphan");

    let err = app
        .services
        .items
        .create(pen(&name, department_id), Some(&MutationOptions::default()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingActor);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE name = $1")
        .bind(&name)
        .fetch_one(app.pool())
        .await
        .expect("count");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_internal_mutation_is_not_logged() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let department_id = app.department().await;

    let item = app
        .services
        .items
        .create(pen(&TestApp::unique("Quiet"), department_id), None)
        .await
        .expect("create should succeed");

    assert!(app.trail(Association::Item, item.id).await.is_empty());
}

#[tokio::test]
async fn test_soft_delete_is_logged_as_delete() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let department_id = app.department().await;
    let options = MutationOptions::actor(2);
    let item = app
        .services
        .items
        .create(pen(&TestApp::unique("Gone"), department_id), Some(&options))
        .await
        .expect("create");

    app.services
        .items
        .delete(item.id, Some(&options))
        .await
        .expect("delete");

    let trail = app.trail(Association::Item, item.id).await;
    assert_eq!(trail.len(), 2);
    let removed = &trail[1];
    assert_eq!(removed.change_log.operation, Operation::Delete);
    assert!(removed.details.iter().all(|d| d.diff_type == DiffType::Removed));
    assert_eq!(detail(removed, "quantity").old_value, Some(json!(10)));
    assert_eq!(detail(removed, "quantity").new_value, None::<Value>);
}

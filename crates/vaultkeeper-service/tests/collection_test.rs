//! Integration tests for bulk backup fetches.

mod helpers;

use vaultkeeper_core::error::ErrorKind;
use vaultkeeper_core::types::{FieldValue, Filters, ObjectVersion};
use vaultkeeper_entity::backup::{Backup, BackupList};
use vaultkeeper_service::{BackupObjectApi, BackupService};

use helpers::{memory_service, new_backup, user_ctx};

async fn seed(service: &BackupService) -> Vec<String> {
    let ctx = user_ctx();
    let mut ids = Vec::new();
    for (project, volume, host, status) in [
        ("p1", "v1", "host-a", "available"),
        ("p1", "v2", "host-b", "error"),
        ("p2", "v1", "host-a", "available"),
    ] {
        let mut backup = new_backup(project, volume);
        backup.set_host(Some(host)).expect("host");
        backup.set_status(Some(status)).expect("status");
        service.create(&ctx, &mut backup).await.expect("create");
        ids.push(backup.id().expect("id").to_string());
    }
    ids
}

fn ids(list: &BackupList) -> Vec<&str> {
    list.iter().filter_map(Backup::id).collect()
}

#[tokio::test]
async fn test_get_all_preserves_store_order() {
    let (service, _store) = memory_service();
    let created = seed(&service).await;

    let list = service.get_all(&user_ctx(), None).await.expect("get_all");
    assert_eq!(list.len(), 3);
    assert_eq!(ids(&list), created.iter().map(String::as_str).collect::<Vec<_>>());
    assert!(list.iter().all(|b| b.changes().is_empty()));
}

#[tokio::test]
async fn test_scoped_fetches() {
    let (service, _store) = memory_service();
    let created = seed(&service).await;
    let ctx = user_ctx();

    let by_host = service.get_all_by_host(&ctx, "host-a").await.expect("by host");
    assert_eq!(ids(&by_host), vec![created[0].as_str(), created[2].as_str()]);

    let by_volume = service
        .get_all_by_volume(&ctx, "v1", None)
        .await
        .expect("by volume");
    assert_eq!(by_volume.len(), 2);

    let mut filters = Filters::new();
    filters.insert("status".into(), "error".into());
    let by_project = service
        .get_all_by_project(&ctx, "p1", Some(&filters))
        .await
        .expect("by project");
    assert_eq!(ids(&by_project), vec![created[1].as_str()]);
    assert_eq!(by_project[0].host(), Some("host-b"));
}

#[tokio::test]
async fn test_null_filter_matches_unset_column() {
    let (service, _store) = memory_service();
    seed(&service).await;

    let mut filters = Filters::new();
    filters.insert("parent_id".into(), FieldValue::Null);
    let list = service
        .get_all(&user_ctx(), Some(&filters))
        .await
        .expect("get_all");
    assert_eq!(list.len(), 3);
}

#[tokio::test]
async fn test_unknown_filter_is_rejected() {
    let (service, _store) = memory_service();
    let mut filters = Filters::new();
    filters.insert("colour".into(), "blue".into());

    let err = service
        .get_all(&user_ctx(), Some(&filters))
        .await
        .expect_err("undeclared column");
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_fetched_list_serializes_for_older_peer() {
    let (service, _store) = memory_service();
    seed(&service).await;

    let list = service.get_all(&user_ctx(), None).await.expect("get_all");
    let wire = list.to_primitive(None).expect("wire");
    assert_eq!(wire.version, BackupList::VERSION);
    assert!(
        wire.data
            .objects
            .iter()
            .all(|o| o.data.contains_key("num_dependent_backups"))
    );

    let old = list[0]
        .to_primitive(Some(ObjectVersion::new(1, 0)))
        .expect("downgraded");
    assert!(!old.data.contains_key("num_dependent_backups"));
    assert_eq!(old.data.get("status"), Some(&FieldValue::from("available")));

    let back = BackupList::from_primitive(&wire).expect("from wire");
    assert_eq!(back, list);
}

//! End-to-end document lifecycle: upload, update, rollback, restrict, delete.

mod helpers;

use bytes::Bytes;

use docvault_core::types::pagination::PageRequest;
use docvault_database::store::{AccessLogFilter, DocumentStore};
use docvault_entity::audit::{AccessAction, AccessDecision};
use docvault_entity::document::DocumentStatus;
use docvault_service::{AccessSettingsUpdate, UpdateRequest};

const V1: &[u8] = b"%PDF-1.7 demand notice, amount due 1000";
const V2: &[u8] = b"%PDF-1.7 demand notice, amount due 1250 incl. fees";

fn update(content: &[u8], summary: &str) -> UpdateRequest {
    UpdateRequest {
        file_format: "application/pdf".to_string(),
        change_summary: summary.to_string(),
        content: Bytes::copy_from_slice(content),
    }
}

#[tokio::test]
async fn test_upload_creates_first_version_and_one_audit_entry() {
    let app = helpers::TestApp::new().await;
    let officer = helpers::legal_officer("officer-1");

    let outcome = app
        .vault
        .documents
        .upload(&officer, helpers::upload_request("Demand notice", V1, false))
        .await
        .unwrap();

    assert_eq!(outcome.document.current_version_number, 1);
    assert_eq!(outcome.document.status, DocumentStatus::Active);
    assert_eq!(outcome.version.version_number, 1);
    assert!(outcome.version.is_latest_version);
    assert!(!outcome.version.encrypted);
    assert!(outcome.version.change_summary.is_none());
    assert_eq!(outcome.version.content_hash, docvault_crypto::content_hash(V1));
    assert!(outcome.version.storage_ref.starts_with("local://"));

    let history = app
        .vault
        .audit
        .history(&outcome.document.document_id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(history.total_items, 1);
    assert_eq!(history.items[0].action, AccessAction::Update);
    assert_eq!(history.items[0].decision, AccessDecision::Allowed);
    assert_eq!(history.items[0].actor, "officer-1");
}

#[tokio::test]
async fn test_update_moves_latest_flag_and_keeps_history() {
    let app = helpers::TestApp::new().await;
    let officer = helpers::legal_officer("officer-1");
    let docs = &app.vault.documents;

    let uploaded = docs
        .upload(&officer, helpers::upload_request("Demand notice", V1, false))
        .await
        .unwrap();
    let id = uploaded.document.document_id.clone();

    let committed = docs
        .update(&officer, &id, update(V2, "Added late fees"))
        .await
        .unwrap();
    assert_eq!(committed.version.version_number, 2);
    assert_eq!(committed.document.current_version_number, 2);
    assert_eq!(committed.version.change_summary.as_deref(), Some("Added late fees"));

    let versions = app.store.all_versions(&id).await.unwrap();
    assert_eq!(versions.len(), 2);
    assert!(!versions[0].is_latest_version);
    assert!(versions[1].is_latest_version);
    assert_eq!(versions[0].content_hash, uploaded.version.content_hash);
    assert_eq!(versions[0].storage_ref, uploaded.version.storage_ref);

    let v1 = docs.retrieve(&officer, &id, Some(1)).await.unwrap();
    assert_eq!(v1.content.as_ref(), V1);
    let latest = docs.retrieve(&officer, &id, None).await.unwrap();
    assert_eq!(latest.content.as_ref(), V2);
    assert_eq!(latest.version.version_number, 2);
}

#[tokio::test]
async fn test_rollback_republishes_old_content_as_new_version() {
    let app = helpers::TestApp::new().await;
    let officer = helpers::legal_officer("officer-1");
    let docs = &app.vault.documents;

    let uploaded = docs
        .upload(&officer, helpers::upload_request("Demand notice", V1, false))
        .await
        .unwrap();
    let id = uploaded.document.document_id.clone();
    docs.update(&officer, &id, update(V2, "Added late fees"))
        .await
        .unwrap();

    let rolled = docs.rollback(&officer, &id, 1).await.unwrap();
    assert_eq!(rolled.version.version_number, 3);
    assert_eq!(rolled.version.change_summary.as_deref(), Some("Rollback to v1"));
    assert_eq!(rolled.version.content_hash, uploaded.version.content_hash);
    assert_ne!(rolled.version.storage_ref, uploaded.version.storage_ref);

    let v1 = app.store.find_version(&id, 1).await.unwrap().unwrap();
    assert!(!v1.is_latest_version);
    assert_eq!(v1.storage_ref, uploaded.version.storage_ref);
    assert_eq!(v1.content_hash, uploaded.version.content_hash);
    assert_eq!(v1.change_summary, None);

    let history = app.vault.audit.history(&id, &PageRequest::default()).await.unwrap();
    assert_eq!(history.items[0].action, AccessAction::Rollback);
    assert_eq!(history.items[0].decision, AccessDecision::Allowed);

    let latest = docs.retrieve(&officer, &id, None).await.unwrap();
    assert_eq!(latest.content.as_ref(), V1);
}

#[tokio::test]
async fn test_confidential_view_denied_for_unprivileged_role() {
    let app = helpers::TestApp::new().await;
    let officer = helpers::legal_officer("officer-1");
    let collector = helpers::collector("agent-7");
    let docs = &app.vault.documents;

    let uploaded = docs
        .upload(&officer, helpers::upload_request("Settlement", V1, false))
        .await
        .unwrap();
    let id = uploaded.document.document_id.clone();

    docs.retrieve(&collector, &id, None).await.unwrap();

    let updated = docs
        .update_access(
            &officer,
            &id,
            AccessSettingsUpdate {
                confidential: Some(true),
                access_permissions: None,
            },
        )
        .await
        .unwrap();
    assert!(updated.confidential_flag);

    let err = docs.retrieve(&collector, &id, None).await.unwrap_err();
    assert_eq!(err.kind, docvault_core::error::ErrorKind::AccessDenied);

    let denied = app
        .vault
        .audit
        .search(
            &AccessLogFilter {
                document_id: Some(id.clone()),
                decision: Some(AccessDecision::Denied),
                ..Default::default()
            },
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(denied.total_items, 1);
    assert_eq!(denied.items[0].actor, "agent-7");
    assert_eq!(denied.items[0].action, AccessAction::View);
    assert!(denied.items[0].reason.is_some());
}

#[tokio::test]
async fn test_delete_reports_partial_cleanup_across_backends() {
    let app = helpers::TestApp::new().await;
    let admin = helpers::admin("admin-1");
    let docs = &app.vault.documents;

    let uploaded = docs
        .upload(&admin, helpers::upload_request("Court order", V1, false))
        .await
        .unwrap();
    let id = uploaded.document.document_id.clone();
    docs.update(&admin, &id, update(V2, "Corrected case number"))
        .await
        .unwrap();

    app.vault.storage.set_default("s3").await.unwrap();
    let third = docs
        .update(&admin, &id, update(b"final order", "Final order"))
        .await
        .unwrap();
    assert!(third.version.storage_ref.starts_with("s3://"));

    let outcome = docs.delete(&admin, &id).await.unwrap();
    assert_eq!(outcome.document.status, DocumentStatus::Deleted);
    assert_eq!(outcome.cleanup.local_files_deleted, 2);
    assert_eq!(outcome.cleanup.remote_files_deleted, 0);
    assert_eq!(outcome.cleanup.files_not_found, 0);
    assert_eq!(outcome.cleanup.errors.len(), 1);
    assert!(outcome.cleanup.errors[0].contains("v3"));

    let stored = app.store.find_document(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, DocumentStatus::Deleted);

    let history = app.vault.audit.history(&id, &PageRequest::default()).await.unwrap();
    assert_eq!(history.items[0].action, AccessAction::Delete);
    assert_eq!(history.items[0].decision, AccessDecision::Allowed);
    assert!(history.items[0].reason.is_some());
}

#[tokio::test]
async fn test_second_delete_reports_not_found() {
    let app = helpers::TestApp::new().await;
    let admin = helpers::admin("admin-1");
    let docs = &app.vault.documents;

    let uploaded = docs
        .upload(&admin, helpers::upload_request("Affidavit", V1, false))
        .await
        .unwrap();
    let id = uploaded.document.document_id.clone();
    docs.update(&admin, &id, update(V2, "Signed copy"))
        .await
        .unwrap();

    let first = docs.delete(&admin, &id).await.unwrap();
    assert_eq!(first.cleanup.local_files_deleted, 2);
    assert!(first.cleanup.is_complete());

    let second = docs.delete(&admin, &id).await.unwrap();
    assert_eq!(second.document.status, DocumentStatus::Deleted);
    assert_eq!(second.cleanup.local_files_deleted, 0);
    assert_eq!(second.cleanup.files_not_found, 2);
    assert!(second.cleanup.is_complete());
}

#[tokio::test]
async fn test_deleted_document_is_not_readable() {
    let app = helpers::TestApp::new().await;
    let admin = helpers::admin("admin-1");
    let docs = &app.vault.documents;

    let uploaded = docs
        .upload(&admin, helpers::upload_request("Agreement", V1, false))
        .await
        .unwrap();
    let id = uploaded.document.document_id.clone();
    docs.delete(&admin, &id).await.unwrap();

    let err = docs.retrieve(&admin, &id, None).await.unwrap_err();
    assert_eq!(err.kind, docvault_core::error::ErrorKind::NotFound);

    let err = docs
        .update(&admin, &id, update(V2, "Too late"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, docvault_core::error::ErrorKind::NotFound);
}

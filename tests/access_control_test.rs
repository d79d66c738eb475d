//! Access decisions and their audit trail.

mod helpers;

use bytes::Bytes;

use docvault_core::error::ErrorKind;
use docvault_core::types::pagination::PageRequest;
use docvault_entity::audit::{AccessAction, AccessDecision};
use docvault_entity::document::DocumentId;
use docvault_service::{AccessSettingsUpdate, RequestContext, UpdateRequest};
use docvault_service::document::DOCUMENT_NOT_FOUND;

#[tokio::test]
async fn test_unlisted_role_is_denied_and_logged_once() {
    let app = helpers::TestApp::new().await;
    let officer = helpers::legal_officer("officer-1");
    let outsider = RequestContext::new("vendor-3", ["Field Agent"]);

    let uploaded = app
        .vault
        .documents
        .upload(&officer, helpers::upload_request("KYC pack", b"kyc", false))
        .await
        .unwrap();
    let id = uploaded.document.document_id;

    let err = app
        .vault
        .documents
        .download(&outsider, &id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccessDenied);

    let history = app.vault.audit.history(&id, &PageRequest::default()).await.unwrap();
    assert_eq!(history.total_items, 2);
    assert_eq!(history.items[0].decision, AccessDecision::Denied);
    assert_eq!(history.items[0].action, AccessAction::Download);
}

#[tokio::test]
async fn test_confidential_delete_requires_admin() {
    let app = helpers::TestApp::new().await;
    let officer = helpers::legal_officer("officer-1");
    let admin = helpers::admin("admin-1");

    let uploaded = app
        .vault
        .documents
        .upload(&officer, helpers::upload_request("Sealed order", b"sealed", true))
        .await
        .unwrap();
    let id = uploaded.document.document_id;
    assert!(uploaded.version.encrypted);

    let err = app.vault.documents.delete(&officer, &id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccessDenied);

    let outcome = app.vault.documents.delete(&admin, &id).await.unwrap();
    assert_eq!(outcome.cleanup.local_files_deleted, 1);
}

#[tokio::test]
async fn test_privileged_role_without_permission_is_denied() {
    let app = helpers::TestApp::new().await;
    let officer = helpers::legal_officer("officer-1");
    let compliance = RequestContext::new("auditor-2", ["Compliance"]);

    let uploaded = app
        .vault
        .documents
        .upload(&officer, helpers::upload_request("Evidence", b"exhibit A", true))
        .await
        .unwrap();

    let err = app
        .vault
        .documents
        .get_metadata(&compliance, &uploaded.document.document_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccessDenied);
}

#[tokio::test]
async fn test_unknown_document_is_logged_as_denied() {
    let app = helpers::TestApp::new().await;
    let officer = helpers::legal_officer("officer-1");
    let id: DocumentId = "LDR-20240101-9999".parse().unwrap();

    let err = app.vault.documents.retrieve(&officer, &id, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let history = app.vault.audit.history(&id, &PageRequest::default()).await.unwrap();
    assert_eq!(history.total_items, 1);
    assert_eq!(history.items[0].decision, AccessDecision::Denied);
    assert_eq!(history.items[0].reason.as_deref(), Some(DOCUMENT_NOT_FOUND));
}

#[tokio::test]
async fn test_invalid_upload_is_rejected_without_audit_entry() {
    let app = helpers::TestApp::new().await;
    let officer = helpers::legal_officer("officer-1");

    let mut request = helpers::upload_request("", b"content", false);
    request.document_name = "   ".to_string();
    let err = app.vault.documents.upload(&officer, request).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let oversized = helpers::upload_request(
        "Huge scan",
        &vec![0u8; helpers::TEST_MAX_UPLOAD as usize + 1],
        false,
    );
    let err = app.vault.documents.upload(&officer, oversized).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    assert_eq!(app.store.access_log_len().await, 0);
}

#[tokio::test]
async fn test_uploader_must_hold_a_granted_role() {
    let app = helpers::TestApp::new().await;
    let outsider = RequestContext::new("vendor-3", ["Field Agent"]);

    let err = app
        .vault
        .documents
        .upload(&outsider, helpers::upload_request("Notice", b"n", false))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccessDenied);
    assert_eq!(app.store.access_log_len().await, 1);
}

#[tokio::test]
async fn test_malformed_update_from_outsider_is_denied_before_validation() {
    let app = helpers::TestApp::new().await;
    let officer = helpers::legal_officer("officer-1");
    let outsider = RequestContext::new("vendor-3", ["Outsider"]);
    let docs = &app.vault.documents;

    let id = docs
        .upload(&officer, helpers::upload_request("Notice", b"n", false))
        .await
        .unwrap()
        .document
        .document_id;

    let blank = UpdateRequest {
        file_format: "application/pdf".to_string(),
        change_summary: "  ".to_string(),
        content: Bytes::from_static(b"n2"),
    };
    let err = docs.update(&outsider, &id, blank).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccessDenied);

    let empty = AccessSettingsUpdate {
        confidential: None,
        access_permissions: None,
    };
    let err = docs.update_access(&outsider, &id, empty).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccessDenied);

    let history = app.vault.audit.history(&id, &PageRequest::default()).await.unwrap();
    assert_eq!(history.total_items, 3);
    for entry in &history.items[..2] {
        assert_eq!(entry.decision, AccessDecision::Denied);
        assert_eq!(entry.action, AccessAction::Update);
    }
}

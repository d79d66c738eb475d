//! Batch uploads with partial failure.

mod helpers;

use docvault_core::error::ErrorKind;

#[tokio::test]
async fn test_bulk_upload_reports_each_item() {
    let app = helpers::TestApp::new().await;
    let officer = helpers::legal_officer("officer-1");

    let mut no_roles = helpers::upload_request("Orphan", b"x", false);
    no_roles.access_permissions = vec![" ".to_string()];
    let mut long_name = helpers::upload_request("n", b"y", false);
    long_name.document_name = "n".repeat(101);

    let result = app
        .vault
        .documents
        .bulk_upload(
            &officer,
            vec![
                helpers::upload_request("Notice A", b"a", false),
                no_roles,
                helpers::upload_request("Notice B", b"b", true),
                long_name,
            ],
        )
        .await;

    assert_eq!(result.succeeded.len(), 2);
    assert_eq!(result.failed.len(), 2);
    assert_eq!(result.failed[0].index, 1);
    assert_eq!(result.failed[0].kind, ErrorKind::Validation);
    assert_eq!(result.failed[1].index, 3);
    assert_eq!(result.failed[1].kind, ErrorKind::Validation);

    let names: Vec<&str> = result
        .succeeded
        .iter()
        .map(|o| o.document.document_name.as_str())
        .collect();
    assert_eq!(names, vec!["Notice A", "Notice B"]);
    assert_ne!(
        result.succeeded[0].document.document_id,
        result.succeeded[1].document.document_id
    );
    assert!(result.succeeded[1].version.encrypted);
}

#[tokio::test]
async fn test_document_ids_follow_daily_sequence() {
    let app = helpers::TestApp::in_memory().await;
    let officer = helpers::legal_officer("officer-1");

    let result = app
        .vault
        .documents
        .bulk_upload(
            &officer,
            (0..3)
                .map(|i| helpers::upload_request(&format!("Doc {i}"), b"c", false))
                .collect(),
        )
        .await;

    let today = chrono::Utc::now().date_naive().format("%Y%m%d").to_string();
    for (i, outcome) in result.succeeded.iter().enumerate() {
        let id = outcome.document.document_id.as_str();
        assert_eq!(id, format!("LDR-{today}-{:04}", i + 1));
    }
}

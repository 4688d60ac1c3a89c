//! File storage tests against a mock storage endpoint.

use httpmock::prelude::*;
use jiff::Timestamp;
use jiff::tz::TimeZone;
use revault_storage::{ContentType, FileStorage, GcsClient, GcsConfig};
use serde_json::{Value, json};

const BUCKET: &str = "revault-files";
const BUCKET_PATH: &str = "/storage/v1/b/revault-files";
const OBJECTS_PATH: &str = "/storage/v1/b/revault-files/o";
const UPLOAD_PATH: &str = "/upload/storage/v1/b/revault-files/o";
const IAM_PATH: &str = "/storage/v1/b/revault-files/iam";

fn storage(server: &MockServer) -> FileStorage {
    let config = GcsConfig::new(BUCKET).with_endpoint(server.base_url());
    FileStorage::new(GcsClient::connect_anonymous(config))
}

fn bucket_json() -> Value {
    json!({
        "id": BUCKET,
        "name": BUCKET,
        "projectNumber": "123456789",
        "metageneration": "1",
        "location": "US",
        "storageClass": "STANDARD",
        "etag": "CAE=",
        "locationType": "multi-region"
    })
}

fn object_json(name: &str, content_type: &str) -> Value {
    json!({
        "id": format!("{BUCKET}/{name}/1"),
        "selfLink": format!("https://www.googleapis.com/storage/v1/b/{BUCKET}/o/{name}"),
        "mediaLink": format!("https://storage.googleapis.com/download/storage/v1/b/{BUCKET}/o/{name}"),
        "name": name,
        "bucket": BUCKET,
        "generation": "1",
        "metageneration": "1",
        "contentType": content_type,
        "cacheControl": "public, max-age=31536000",
        "size": "9",
        "crc32c": "4waSgw==",
        "metadata": { "originalName": "report.pdf" }
    })
}

fn error_json(code: u16, message: &str, reason: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "errors": [{ "domain": "global", "message": message, "reason": reason }],
            "message": message
        }
    })
}

fn today() -> String {
    Timestamp::now().to_zoned(TimeZone::UTC).date().to_string()
}

#[tokio::test]
async fn test_check_connectivity() {
    let server = MockServer::start_async().await;
    let bucket = server
        .mock_async(|when, then| {
            when.method(GET).path(BUCKET_PATH);
            then.status(200).json_body(bucket_json());
        })
        .await;

    assert!(storage(&server).check_connectivity().await);
    bucket.assert_async().await;
}

#[tokio::test]
async fn test_check_connectivity_missing_bucket() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(BUCKET_PATH);
            then.status(404).json_body(error_json(404, "Not Found", "notFound"));
        })
        .await;

    assert!(!storage(&server).check_connectivity().await);
}

#[tokio::test]
async fn test_upload_research_paper() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(BUCKET_PATH);
            then.status(200).json_body(bucket_json());
        })
        .await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(UPLOAD_PATH)
                .query_param("uploadType", "multipart")
                .body_contains(r#""contentType":"application/pdf""#)
                .body_contains(r#""cacheControl":"public, max-age=31536000""#)
                .body_contains(r#""crc32c":"4waSgw==""#)
                .body_contains(r#""documentType":"research-paper""#)
                .body_contains(r#""originalName":"report.pdf""#)
                .body_contains("123456789");
            then.status(200)
                .json_body(object_json("papers/2024-01-15/report-x.pdf", "application/pdf"));
        })
        .await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(GET).path_contains(OBJECTS_PATH).path_contains("report-");
            then.status(200)
                .json_body(object_json("papers/2024-01-15/report-x.pdf", "application/pdf"));
        })
        .await;

    let result = storage(&server)
        .upload_research_paper(b"123456789".to_vec(), "report.pdf")
        .await
        .unwrap();

    let prefix = format!("papers/{}/report-", today());
    assert!(result.key.starts_with(&prefix), "unexpected key {}", result.key);
    assert!(result.key.ends_with(".pdf"));
    assert_eq!(
        result.url,
        format!("https://storage.googleapis.com/revault-files/{}", result.key)
    );
    assert_eq!(result.size, 9);
    assert_eq!(result.content_type, ContentType::Pdf);

    upload.assert_async().await;
    // existence check and metadata fetch
    lookup.assert_hits_async(2).await;
}

#[tokio::test]
async fn test_upload_profile_picture() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(BUCKET_PATH);
            then.status(200).json_body(bucket_json());
        })
        .await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(UPLOAD_PATH)
                .body_contains(r#""contentType":"image/png""#)
                .body_contains(r#""userId":"u123""#)
                .body_contains(r#""originalName":"avatar.PNG""#);
            then.status(200)
                .json_body(object_json("profiles/u123/avatar-x.PNG", "image/png"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains(OBJECTS_PATH).path_contains("avatar-");
            then.status(200)
                .json_body(object_json("profiles/u123/avatar-x.PNG", "image/png"));
        })
        .await;

    let result = storage(&server)
        .upload_profile_picture(vec![0x89, b'P', b'N', b'G'], "avatar.PNG", "u123")
        .await
        .unwrap();

    assert!(result.key.starts_with("profiles/u123/avatar-"));
    assert!(result.key.ends_with(".PNG"));
    assert_eq!(result.content_type, ContentType::Png);
    assert!(
        result
            .url
            .starts_with("https://storage.googleapis.com/revault-files/profiles/u123/")
    );
    upload.assert_async().await;
}

#[tokio::test]
async fn test_uploads_get_distinct_keys() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(BUCKET_PATH);
            then.status(200).json_body(bucket_json());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(UPLOAD_PATH);
            then.status(200)
                .json_body(object_json("profiles/u1/same-x.png", "image/png"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains(OBJECTS_PATH);
            then.status(200)
                .json_body(object_json("profiles/u1/same-x.png", "image/png"));
        })
        .await;

    let storage = storage(&server);
    let first = storage
        .upload_profile_picture(b"a".to_vec(), "same.png", "u1")
        .await
        .unwrap();
    let second = storage
        .upload_profile_picture(b"a".to_vec(), "same.png", "u1")
        .await
        .unwrap();

    assert_ne!(first.key, second.key);
}

#[tokio::test]
async fn test_upload_requires_connectivity() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(BUCKET_PATH);
            then.status(403).json_body(error_json(403, "Forbidden", "forbidden"));
        })
        .await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST).path(UPLOAD_PATH);
            then.status(200).json_body(object_json("unused", "application/pdf"));
        })
        .await;

    let error = storage(&server)
        .upload_research_paper(b"%PDF".to_vec(), "report.pdf")
        .await
        .unwrap_err();

    assert!(error.is_connectivity_error());
    assert!(
        error
            .to_string()
            .starts_with("Failed to upload research paper: ")
    );
    upload.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_upload_verification_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(BUCKET_PATH);
            then.status(200).json_body(bucket_json());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(UPLOAD_PATH);
            then.status(200)
                .json_body(object_json("papers/2024-01-15/report-x.pdf", "application/pdf"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains(OBJECTS_PATH);
            then.status(404).json_body(error_json(404, "No such object", "notFound"));
        })
        .await;

    let error = storage(&server)
        .upload_research_paper(b"%PDF".to_vec(), "report.pdf")
        .await
        .unwrap_err();

    assert!(matches!(
        error.root(),
        revault_storage::Error::UploadVerification { .. }
    ));
    assert!(
        error
            .to_string()
            .starts_with("Failed to upload research paper: Upload verification failed")
    );
}

#[tokio::test]
async fn test_upload_rejects_invalid_user_id() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(BUCKET_PATH);
            then.status(200).json_body(bucket_json());
        })
        .await;

    let error = storage(&server)
        .upload_profile_picture(b"a".to_vec(), "a.png", "../etc")
        .await
        .unwrap_err();

    assert!(error.is_invalid_request());
    assert!(
        error
            .to_string()
            .starts_with("Failed to upload profile picture: ")
    );
}

#[tokio::test]
async fn test_delete_profile_picture() {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path_contains(OBJECTS_PATH)
                .path_contains("u123")
                .path_contains("avatar-abc.png");
            then.status(204);
        })
        .await;

    assert!(
        storage(&server)
            .delete_profile_picture("u123", "avatar-abc.png")
            .await
    );
    delete.assert_async().await;
}

#[tokio::test]
async fn test_delete_missing_profile_picture_returns_false() {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path_contains("missing.png");
            then.status(404).json_body(error_json(404, "No such object", "notFound"));
        })
        .await;

    assert!(
        !storage(&server)
            .delete_profile_picture("u123", "missing.png")
            .await
    );
    delete.assert_async().await;
}

#[tokio::test]
async fn test_list_files_follows_pages() {
    let server = MockServer::start_async().await;
    // Registered first so it wins over the unrestricted first-page mock.
    let second_page = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(OBJECTS_PATH)
                .query_param("prefix", "profiles/")
                .query_param("pageToken", "page-2");
            then.status(200).json_body(json!({
                "items": [object_json("profiles/u2/b.png", "image/png")]
            }));
        })
        .await;
    let first_page = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(OBJECTS_PATH)
                .query_param("prefix", "profiles/");
            then.status(200).json_body(json!({
                "items": [object_json("profiles/u1/a.png", "image/png")],
                "nextPageToken": "page-2"
            }));
        })
        .await;

    let storage = storage(&server);
    storage.list_files_with_prefix("profiles/").await;

    first_page.assert_async().await;
    second_page.assert_async().await;

    let objects = storage
        .client()
        .object_operations()
        .list_objects(BUCKET, Some("profiles/"))
        .await
        .unwrap();
    let keys: Vec<&str> = objects.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["profiles/u1/a.png", "profiles/u2/b.png"]);
}

#[tokio::test]
async fn test_list_files_swallows_errors() {
    let server = MockServer::start_async().await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET).path(OBJECTS_PATH);
            then.status(500).json_body(error_json(500, "Backend Error", "backendError"));
        })
        .await;

    storage(&server).list_files().await;
    list.assert_async().await;
}

#[tokio::test]
async fn test_create_bucket_if_not_exists_creates_public_bucket() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(BUCKET_PATH);
            then.status(404).json_body(error_json(404, "Not Found", "notFound"));
        })
        .await;
    let insert = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/storage/v1/b")
                .query_param("project", "revault-system")
                .body_contains(r#""name":"revault-files""#)
                .body_contains(r#""location":"US""#)
                .body_contains(r#""storageClass":"STANDARD""#)
                .body_contains(r#""enabled":true"#);
            then.status(200).json_body(bucket_json());
        })
        .await;
    let get_policy = server
        .mock_async(|when, then| {
            when.method(GET).path(IAM_PATH);
            then.status(200)
                .json_body(json!({ "version": 1, "bindings": [], "etag": "CAE=" }));
        })
        .await;
    let set_policy = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(IAM_PATH)
                .body_contains(r#""role":"roles/storage.objectViewer""#)
                .body_contains(r#""members":["allUsers"]"#)
                .body_contains(r#""etag":"CAE=""#);
            then.status(200).json_body(json!({
                "version": 1,
                "bindings": [{ "role": "roles/storage.objectViewer", "members": ["allUsers"] }],
                "etag": "CAI="
            }));
        })
        .await;

    storage(&server).create_bucket_if_not_exists().await.unwrap();

    insert.assert_async().await;
    get_policy.assert_async().await;
    set_policy.assert_async().await;
}

#[tokio::test]
async fn test_create_bucket_failure_is_classified() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(BUCKET_PATH);
            then.status(404).json_body(error_json(404, "Not Found", "notFound"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/storage/v1/b");
            then.status(404)
                .json_body(error_json(404, "Project not found", "notFound"));
        })
        .await;
    let set_policy = server
        .mock_async(|when, then| {
            when.method(PUT).path(IAM_PATH);
            then.status(200)
                .json_body(json!({ "version": 1, "bindings": [], "etag": "CAE=" }));
        })
        .await;

    let error = storage(&server).create_bucket_if_not_exists().await.unwrap_err();

    assert!(error.is_not_found());
    assert_eq!(error.kind(), "not_found");
    assert_eq!(error.status_code(), Some(404));
    assert!(error.to_string().starts_with("Failed to create bucket: "));
    set_policy.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_create_bucket_if_not_exists_is_noop_for_existing_bucket() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(BUCKET_PATH);
            then.status(200).json_body(bucket_json());
        })
        .await;
    let insert = server
        .mock_async(|when, then| {
            when.method(POST).path("/storage/v1/b");
            then.status(200).json_body(bucket_json());
        })
        .await;

    storage(&server).create_bucket_if_not_exists().await.unwrap();
    insert.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_make_bucket_public_propagates_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(IAM_PATH);
            then.status(200)
                .json_body(json!({ "version": 1, "bindings": [], "etag": "CAE=" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path(IAM_PATH);
            then.status(403).json_body(error_json(403, "Forbidden", "forbidden"));
        })
        .await;

    let error = storage(&server).make_bucket_public().await.unwrap_err();

    assert_eq!(error.status_code(), Some(403));
    assert!(
        error
            .to_string()
            .starts_with("Failed to make bucket public: ")
    );
}

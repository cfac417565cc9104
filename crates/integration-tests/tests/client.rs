//! Integration tests for the HTTP client adapter: credentials, request
//! headers, error normalization and response envelopes.

use std::time::Duration;

use portfolio_console::{ApiClient, ApiError, CredentialSource};
use portfolio_integration_tests::{Collection, MockBackend, VALID_TOKEN, project_json};
use reqwest::Method;
use secrecy::SecretString;
use serde_json::json;
use url::Url;

// ============================================================================
// Credentials & Headers
// ============================================================================

#[tokio::test]
async fn test_bearer_token_attached_when_present() {
    let backend = MockBackend::start().await;
    let console = backend.authenticated_console();

    console.projects().fetch_all(&()).await.unwrap();

    let request = backend.last_request().unwrap();
    assert_eq!(
        request.authorization.as_deref(),
        Some(format!("Bearer {VALID_TOKEN}").as_str())
    );
}

#[tokio::test]
async fn test_no_authorization_header_without_credential() {
    let backend = MockBackend::start().await;
    let console = backend.console(CredentialSource::None);

    console.projects().fetch_all(&()).await.unwrap();

    assert!(backend.last_request().unwrap().authorization.is_none());
}

#[tokio::test]
async fn test_token_file_is_read_on_every_request() {
    let backend = MockBackend::start().await;
    let path = std::env::temp_dir().join(format!("folio-it-token-{}", uuid::Uuid::new_v4()));
    let console = backend.console(CredentialSource::File(path.clone()));

    console.certifications().fetch_all(&()).await.unwrap();
    assert!(backend.last_request().unwrap().authorization.is_none());

    tokio::fs::write(&path, "rotated-token\n").await.unwrap();
    console.certifications().fetch_all(&()).await.unwrap();
    assert_eq!(
        backend.last_request().unwrap().authorization.as_deref(),
        Some("Bearer rotated-token")
    );

    tokio::fs::remove_file(&path).await.unwrap();
}

#[tokio::test]
async fn test_each_request_carries_a_fresh_request_id() {
    let backend = MockBackend::start().await;
    let console = backend.authenticated_console();

    console.projects().fetch_all(&()).await.unwrap();
    console.projects().fetch_all(&()).await.unwrap();

    let ids: Vec<String> = backend
        .requests()
        .into_iter()
        .map(|request| request.request_id.unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_base_path_prefix_is_kept() {
    let backend = MockBackend::start().await;
    let base = backend.url().join("/backend").unwrap();
    let client = ApiClient::new(
        base,
        CredentialSource::Static(SecretString::from(VALID_TOKEN)),
        Duration::from_secs(5),
    )
    .unwrap();

    let err = client
        .request::<serde_json::Value>(Method::GET, &["api", "projects"], &[], None)
        .await
        .unwrap_err();

    assert_eq!(backend.last_request().unwrap().path, "/backend/api/projects");
    assert_eq!(err, ApiError::NotFound("Route not found".to_string()));
}

// ============================================================================
// Error Normalization
// ============================================================================

#[tokio::test]
async fn test_unauthorized_message_comes_from_body() {
    let backend = MockBackend::start().await;
    backend.require_token();
    let console = backend.console(CredentialSource::None);

    let err = console.projects().fetch_all(&()).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Unauthorized {
            status: 401,
            message: "No token provided".to_string(),
        }
    );
    assert_eq!(err.to_string(), "No token provided");
}

#[tokio::test]
async fn test_error_string_field_is_used() {
    let backend = MockBackend::start().await;
    backend.fail_next(Method::GET, "/api/projects", 500, &json!({"error": "Database offline"}));
    let console = backend.authenticated_console();

    let err = console.projects().fetch_all(&()).await.unwrap_err();

    assert_eq!(err.message(), "Database offline");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_nested_error_message_is_used() {
    let backend = MockBackend::start().await;
    backend.fail_next(
        Method::GET,
        "/api/certifications",
        503,
        &json!({"error": {"message": "Maintenance window"}}),
    );
    let console = backend.authenticated_console();

    let err = console.certifications().fetch_all(&()).await.unwrap_err();

    assert_eq!(err.message(), "Maintenance window");
}

#[tokio::test]
async fn test_first_validation_error_is_used() {
    let backend = MockBackend::start().await;
    backend.fail_next(
        Method::POST,
        "/api/contacts/add-contact",
        422,
        &json!({"errors": [{"msg": "Email already submitted"}, {"msg": "Ignored"}]}),
    );
    let console = backend.authenticated_console();
    let input = portfolio_core::ContactInput {
        name: "Ada".to_string(),
        email: portfolio_core::Email::parse("ada@example.com").unwrap(),
        phone: None,
        company_name: None,
        company_website: None,
        message: "Hello".to_string(),
    };

    let err = console.contacts().create(&input).await.unwrap_err();

    assert_eq!(err, ApiError::Validation("Email already submitted".to_string()));
}

#[tokio::test]
async fn test_message_takes_priority_over_error() {
    let backend = MockBackend::start().await;
    backend.fail_next(
        Method::GET,
        "/api/projects",
        500,
        &json!({"message": "Primary", "error": "Secondary"}),
    );
    let console = backend.authenticated_console();

    let err = console.projects().fetch_all(&()).await.unwrap_err();

    assert_eq!(err.message(), "Primary");
}

#[tokio::test]
async fn test_unstructured_body_falls_back_to_status_line() {
    let backend = MockBackend::start().await;
    backend.fail_next_raw(Method::GET, "/api/projects", 502, "<html>Bad Gateway</html>");
    let console = backend.authenticated_console();

    let err = console.projects().fetch_all(&()).await.unwrap_err();

    assert_eq!(err.message(), "Request failed with status code 502");
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(
        Url::parse(&format!("http://{addr}")).unwrap(),
        CredentialSource::None,
        Duration::from_secs(2),
    )
    .unwrap();
    let console = portfolio_console::Console::new(client);

    let err = console.projects().fetch_all(&()).await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(ref message) if !message.is_empty()));
    assert_eq!(console.projects().error(), Some(err));
}

// ============================================================================
// Envelopes
// ============================================================================

#[tokio::test]
async fn test_wrapped_responses_are_unwrapped() {
    let backend = MockBackend::start().await;
    backend.seed(Collection::Projects, vec![project_json("p1", "Folio")]);
    backend.wrap_responses();
    let console = backend.authenticated_console();

    console.projects().fetch_all(&()).await.unwrap();

    let items = console.projects().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Folio");
}

#[tokio::test]
async fn test_undecodable_success_body_is_a_decode_error() {
    let backend = MockBackend::start().await;
    backend.seed(Collection::Projects, vec![json!({"unexpected": true})]);
    let console = backend.authenticated_console();

    let err = console.projects().fetch_all(&()).await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}

//! HTTP contract tests against a mock service.
//!
//! These cover the request/response wiring the unit tests cannot: auth
//! short-circuiting, the idempotent-read retry policy, the chat
//! continuation state machine, and catalog pagination.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use codealive_client::{
    CodeAliveClient, Conversation, DataSourceRef, Error, SearchMode, SearchRequest,
};

fn client_for(server: &MockServer) -> CodeAliveClient {
    CodeAliveClient::builder()
        .base_url(server.uri())
        .api_key("test-key")
        .retry_backoff(Duration::from_millis(1))
        .build()
        .unwrap()
}

fn refs(names: &[&str]) -> Vec<DataSourceRef> {
    names
        .iter()
        .map(|name| DataSourceRef::parse(name).unwrap())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_returns_ordered_matches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("Query", "authentication flow"))
        .and(query_param("Mode", "auto"))
        .and(query_param("IncludeContent", "false"))
        .and(query_param("Names", "my-repo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "location": {
                        "path": "src/auth/mod.rs",
                        "range": {"start": {"line": 12}, "end": {"line": 40}}
                    },
                    "score": 0.92,
                    "snippet": "fn authenticate() {}"
                },
                {"filePath": "src/session.rs", "startLine": 7, "score": 0.61}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = SearchRequest::new("authentication flow", refs(&["my-repo"]));
    let response = client.search().run(&request).await.unwrap();

    assert_eq!(response.matches.len(), 2);
    assert_eq!(response.matches[0].path(), Some("src/auth/mod.rs"));
    assert_eq!(response.matches[0].lines(), Some((12, Some(40))));
    assert_eq!(response.matches[1].path(), Some("src/session.rs"));
    assert!(response.matches.iter().all(|m| !m.path().unwrap().is_empty()));
}

#[tokio::test]
async fn search_without_credential_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = CodeAliveClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap();
    let request = SearchRequest::new("foo", refs(&["my-repo"]));
    let err = client.search().run(&request).await.unwrap_err();

    assert!(matches!(err, Error::NoCredential));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn search_retries_transient_failures_within_bound() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .named("transient failures")
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": [{"filePath": "a.rs"}]})),
        )
        .expect(1)
        .named("recovery")
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = SearchRequest::new("foo", refs(&["my-repo"]));
    let response = client.search().run(&request).await.unwrap();

    assert_eq!(response.matches.len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn search_gives_up_after_retry_bound() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3) // initial attempt + two retries
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = SearchRequest::new("foo", refs(&["my-repo"]));
    let err = client.search().run(&request).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn search_maps_401_to_authentication_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "invalid API key"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = SearchRequest::new("foo", refs(&["my-repo"]));
    let err = client.search().run(&request).await.unwrap_err();

    assert!(matches!(err, Error::AuthenticationFailed(ref m) if m.contains("invalid API key")));
}

#[tokio::test]
async fn search_maps_404_to_data_source_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "unknown name"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = SearchRequest::new("foo", refs(&["typo-repo"]));
    let err = client.search().run(&request).await.unwrap_err();

    assert!(matches!(err, Error::DataSourceNotFound(ref name) if name.contains("typo-repo")));
}

#[tokio::test]
async fn search_rejects_unparseable_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(1) // malformed bodies are not a retry target
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = SearchRequest::new("foo", refs(&["my-repo"]));
    let err = client.search().run(&request).await.unwrap_err();

    assert!(matches!(err, Error::MalformedResponse(_)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_fresh_then_continuing() {
    let server = MockServer::start().await;
    // Fresh turn: names present, no conversationId.
    Mock::given(method("POST"))
        .and(path("/api/chat/completions"))
        .and(body_partial_json(json!({
            "stream": false,
            "names": ["my-repo"],
            "messages": [{"role": "user", "content": "What does X do?"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "conv_1",
            "choices": [{"message": {"role": "assistant", "content": "X parses tokens."}}],
            "dataSources": ["my-repo"]
        })))
        .expect(1)
        .named("fresh turn")
        .mount(&server)
        .await;
    // Continuation: token present.
    Mock::given(method("POST"))
        .and(path("/api/chat/completions"))
        .and(body_partial_json(json!({"conversationId": "conv_1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "conv_1",
            "choices": [{"message": {"role": "assistant", "content": "Y validates them."}}],
            "dataSources": ["my-repo"]
        })))
        .expect(1)
        .named("continuation turn")
        .mount(&server)
        .await;

    let client = client_for(&server);
    let sources = refs(&["my-repo"]);

    let first = client
        .chat()
        .ask("What does X do?", &sources, None)
        .await
        .unwrap();
    assert_eq!(first.answer, "X parses tokens.");
    assert!(!first.conversation.id.as_str().is_empty());
    assert_eq!(first.conversation.data_sources, sources);

    let second = client
        .chat()
        .ask("And Y?", &sources, Some(&first.conversation))
        .await
        .unwrap();
    assert_eq!(second.answer, "Y validates them.");
    assert_eq!(second.conversation.id, first.conversation.id);
}

#[tokio::test]
async fn chat_mismatched_sources_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let conversation = Conversation {
        id: codealive_client::ConversationId::new("conv_1"),
        data_sources: refs(&["my-repo"]),
    };

    let err = client
        .chat()
        .ask("And Z?", &refs(&["other-repo"]), Some(&conversation))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DataSourceMismatch { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn chat_bare_token_mismatch_detected_from_echoed_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "conv_9",
            "choices": [{"message": {"role": "assistant", "content": "..."}}],
            "dataSources": ["my-repo"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    // Resumed from a bare --continue token: the original set is unknown
    // locally, so the echoed set is the arbiter.
    let resumed = Conversation::resumed("conv_9");
    let err = client
        .chat()
        .ask("And Z?", &refs(&["other-repo"]), Some(&resumed))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DataSourceMismatch { ref expected, .. } if expected == "my-repo"));
}

#[tokio::test]
async fn chat_expired_continuation_is_distinct_from_other_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/completions"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "conversation not found"})),
        )
        .expect(1) // continuations are never retried
        .mount(&server)
        .await;

    let client = client_for(&server);
    let resumed = Conversation::resumed("conv_gone");
    let err = client
        .chat()
        .ask("still there?", &[], Some(&resumed))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ExpiredConversation));
}

#[tokio::test]
async fn chat_without_token_or_sources_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.chat().ask("hello?", &[], None).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn chat_response_without_token_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "answer"}}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .chat()
        .ask("q", &refs(&["my-repo"]), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse(_)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Data-source catalog
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn datasources_flat_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/alive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "my-repo", "type": "Repository", "state": "Alive"},
            {"name": "platform-team", "type": "Workspace", "state": "Alive"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let sources = client.datasources().list(true).await.unwrap();

    assert_eq!(sources.len(), 2);
    assert!(!sources[0].is_workspace());
    assert!(sources[1].is_workspace());
}

#[tokio::test]
async fn datasources_drains_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/all"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"name": "a"}, {"name": "b"}],
            "nextPageToken": "p2"
        })))
        .expect(1)
        .named("first page")
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/all"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"name": "c"}]
        })))
        .expect(1)
        .named("second page")
        .mount(&server)
        .await;

    let client = client_for(&server);
    let sources = client.datasources().list(false).await.unwrap();

    let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Explore
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn explore_unknown_tag_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .explore()
        .run("frobnicate", "anything", &refs(&["my-repo"]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnknownWorkflow(ref tag) if tag == "frobnicate"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn explore_understand_sequences_search_then_chat() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("Query", "rate limiting"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"filePath": "src/limiter.rs", "startLine": 3}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat/completions"))
        .and(body_partial_json(json!({"names": ["my-repo"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "conv_7",
            "choices": [{"message": {"role": "assistant", "content": "Token bucket per route."}}],
            "dataSources": ["my-repo"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = client
        .explore()
        .run("understand", "rate limiting", &refs(&["my-repo"]))
        .await
        .unwrap();

    assert_eq!(report.tag, "understand");
    assert_eq!(report.steps.len(), 2);
    assert_eq!(
        report.conversation_id.as_ref().map(|id| id.as_str()),
        Some("conv_7")
    );
}

#[tokio::test]
async fn explore_pattern_searches_in_deep_mode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("Mode", "deep"))
        .and(query_param("IncludeContent", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "conv_8",
            "choices": [{"message": {"role": "assistant", "content": "Comparison."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = client
        .explore()
        .run("pattern", "error handling", &refs(&["my-repo"]))
        .await
        .unwrap();

    assert_eq!(report.steps.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Mode budgets
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deep_mode_gets_extended_timeout_budget() {
    let client = CodeAliveClient::builder()
        .api_key("k")
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap();

    assert_eq!(
        client.timeout_for(SearchMode::Fast),
        Duration::from_secs(30)
    );
    assert!(client.timeout_for(SearchMode::Deep) >= Duration::from_secs(90));
}

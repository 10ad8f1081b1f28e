use abtest_client::{
    ApiError, BaselineKey, ClientConfig, ExperimentApi, HttpExperimentApi, LaunchError,
    LaunchService,
};
use abtest_model::{FunnelStage, Persona, SegmentKey, TestType};
use abtest_test_utils::{hero, sample_config, sample_config_json, wizard_at_review};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpExperimentApi {
    HttpExperimentApi::new(&ClientConfig::new().with_base_url(server.uri())).unwrap()
}

fn parent_decision_hero() -> BaselineKey {
    BaselineKey::new(Persona::Parent, FunnelStage::Decision, TestType::Hero)
}

#[tokio::test]
async fn test_content_items_by_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/content"))
        .and(query_param("type", "card_order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "c-1", "title": "Program cards", "type": "card_order", "isActive": true }
        ])))
        .mount(&mock_server)
        .await;

    let items = client(&mock_server)
        .content_items(TestType::CardOrder)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id.as_str(), "c-1");
    assert!(items[0].is_active);
    assert_eq!(items[0].persona, None);
}

#[tokio::test]
async fn test_combinations_keep_only_segments_with_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ab-tests/combinations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "persona": "student", "funnelStage": "awareness", "contentCount": 3 },
            { "persona": "donor", "funnelStage": "retention", "contentCount": 0 }
        ])))
        .mount(&mock_server)
        .await;

    let availability = client(&mock_server).available_combinations().await.unwrap();
    assert_eq!(availability.len(), 1);
    assert!(availability.contains(SegmentKey::new(Persona::Student, FunnelStage::Awareness)));
    assert!(!availability.contains(SegmentKey::new(Persona::Donor, FunnelStage::Retention)));
}

#[tokio::test]
async fn test_baseline_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ab-tests/baseline"))
        .and(query_param("persona", "parent"))
        .and(query_param("funnelStage", "decision"))
        .and(query_param("testType", "hero"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "configuration": { "headline": "Find your school" }
        })))
        .mount(&mock_server)
        .await;

    let baseline = client(&mock_server)
        .baseline(parent_decision_hero())
        .await
        .unwrap();
    assert_eq!(baseline, Some(hero("Find your school")));
}

#[tokio::test]
async fn test_baseline_missing_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ab-tests/baseline"))
        .and(query_param("persona", "parent"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "no baseline" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/ab-tests/baseline"))
        .and(query_param("persona", "donor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&mock_server)
        .await;

    let api = client(&mock_server);
    assert_eq!(api.baseline(parent_decision_hero()).await.unwrap(), None);

    let donor = BaselineKey::new(Persona::Donor, FunnelStage::Decision, TestType::Hero);
    assert_eq!(api.baseline(donor).await.unwrap(), None);
}

#[tokio::test]
async fn test_baseline_of_wrong_shape_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ab-tests/baseline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "configuration": { "cards": ["a", "b"] }
        })))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .baseline(parent_decision_hero())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_active_tests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ab-tests/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "t-9",
                "name": "Hero copy",
                "type": "hero",
                "variants": [
                    { "id": "v-a", "name": "Control (Original)", "isControl": true },
                    { "id": "v-b", "name": "Variant B" }
                ]
            }
        ])))
        .mount(&mock_server)
        .await;

    let tests = client(&mock_server).active_tests().await.unwrap();
    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0].test_type, TestType::Hero);
    assert_eq!(tests[0].variants.len(), 2);
    assert!(!tests[0].variants[1].is_control);
}

#[tokio::test]
async fn test_create_posts_wire_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ab-tests"))
        .and(body_json(sample_config_json()))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": "t-42", "status": "active" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let created = client(&mock_server)
        .create_test(&sample_config())
        .await
        .unwrap();
    assert_eq!(created.id.as_str(), "t-42");
    assert_eq!(created.status, "active");
}

#[tokio::test]
async fn test_client_error_carries_server_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ab-tests"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "name already used" })),
        )
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .create_test(&sample_config())
        .await
        .unwrap_err();
    match err {
        ApiError::Client { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "name already used");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_keeps_draft_for_resubmit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ab-tests"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let service = LaunchService::new(client(&mock_server));
    let mut wizard = wizard_at_review("Retry me");

    for _ in 0..2 {
        let err = service.launch(&mut wizard).await.unwrap_err();
        match err {
            LaunchError::Api(ApiError::Server { status, ref message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(wizard.draft().name, "Retry me");
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let config = ClientConfig::new()
        .with_base_url("http://127.0.0.1:9")
        .with_timeout_secs(2);
    let api = HttpExperimentApi::new(&config).unwrap();

    let err = api.active_tests().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(err.is_retryable());
}

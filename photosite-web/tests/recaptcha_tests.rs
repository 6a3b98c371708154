//! reCAPTCHA siteverify client against a mock verification service

use photosite_common::config::RecaptchaSettings;
use photosite_web::contact::{RecaptchaClient, TokenVerifier, VerifyError};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> RecaptchaClient {
    RecaptchaClient::new(&RecaptchaSettings {
        secret: "site-secret".to_string(),
        threshold: 0.5,
        verify_url: format!("{}/recaptcha/api/siteverify", server.uri()),
    })
    .expect("Failed to create client")
}

#[tokio::test]
async fn test_posts_secret_and_token_and_returns_score() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/recaptcha/api/siteverify"))
        .and(body_string_contains("secret=site-secret"))
        .and(body_string_contains("response=client-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "score": 0.7,
            "action": "contact"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let score = client(&server).verify("client-token").await.unwrap();
    assert!((score - 0.7).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_unsuccessful_answer_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "error-codes": ["timeout-or-duplicate"]
        })))
        .mount(&server)
        .await;

    let err = client(&server).verify("stale").await.unwrap_err();
    match err {
        VerifyError::Rejected(codes) => assert_eq!(codes, vec!["timeout-or-duplicate"]),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_non_200_status_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).verify("token").await.unwrap_err();
    assert!(matches!(err, VerifyError::Status(500)));
}

#[tokio::test]
async fn test_malformed_body_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).verify("token").await.unwrap_err();
    assert!(matches!(err, VerifyError::Parse(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let settings = RecaptchaSettings {
        secret: "site-secret".to_string(),
        threshold: 0.5,
        verify_url: "http://127.0.0.1:1/siteverify".to_string(),
    };
    let err = RecaptchaClient::new(&settings)
        .unwrap()
        .verify("token")
        .await
        .unwrap_err();
    assert!(matches!(err, VerifyError::Network(_)));
}

//! Integration tests for the Cognito password sign-in
//!
//! The local responder plays the user pool's `InitiateAuth` endpoint.

use agentcore_chat::ChatError;
use agentcore_chat::auth::{AuthSession, CognitoPasswordProvider, CredentialProvider};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use common::serve_once;

mod common;

const AMZ_JSON: &str = "application/x-amz-json-1.1";

fn fake_id_token(claims: &str) -> String {
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
        URL_SAFE_NO_PAD.encode(claims)
    )
}

fn provider(url: String) -> CognitoPasswordProvider {
    CognitoPasswordProvider::with_endpoint(url, "client-123".to_string())
}

mod sign_in_tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_sign_in_caches_tokens() {
        let id_token = fake_id_token(r#"{"name":"Ada Lovelace","email":"ada@example.com"}"#);
        let body = format!(
            r#"{{"AuthenticationResult":{{"AccessToken":"access-1","IdToken":"{id_token}","TokenType":"Bearer"}}}}"#
        );
        let (url, server) = serve_once("200 OK", AMZ_JSON, body).await;
        let provider = provider(url);

        provider.sign_in("ada", "hunter2").await.unwrap();

        let captured = server.await.unwrap();
        assert!(captured.head.starts_with("POST "));
        assert_eq!(
            captured.header("x-amz-target"),
            Some("AWSCognitoIdentityProviderService.InitiateAuth")
        );
        assert_eq!(captured.header("content-type"), Some(AMZ_JSON));
        let sent: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(sent["AuthFlow"], "USER_PASSWORD_AUTH");
        assert_eq!(sent["ClientId"], "client-123");
        assert_eq!(sent["AuthParameters"]["USERNAME"], "ada");
        assert_eq!(sent["AuthParameters"]["PASSWORD"], "hunter2");

        let session = provider.fetch_session().await.unwrap();
        assert_eq!(session.access_token.as_deref(), Some("access-1"));
        assert_eq!(session.id_token.as_deref(), Some(id_token.as_str()));
        assert_eq!(provider.user_name().await, "Ada Lovelace");

        provider.sign_out().await.unwrap();
        assert_eq!(provider.fetch_session().await.unwrap(), AuthSession::default());
    }

    #[tokio::test]
    async fn test_email_used_when_name_claim_missing() {
        let id_token = fake_id_token(r#"{"email":"ada@example.com"}"#);
        let body = format!(
            r#"{{"AuthenticationResult":{{"AccessToken":"access-2","IdToken":"{id_token}"}}}}"#
        );
        let (url, server) = serve_once("200 OK", AMZ_JSON, body).await;
        let provider = provider(url);

        provider.sign_in("ada", "pw").await.unwrap();
        server.await.unwrap();

        assert_eq!(provider.user_name().await, "ada@example.com");
    }

    #[tokio::test]
    async fn test_rejected_credentials_report_service_message() {
        let (url, server) = serve_once(
            "400 Bad Request",
            AMZ_JSON,
            r#"{"__type":"NotAuthorizedException","message":"Incorrect username or password."}"#,
        )
        .await;
        let provider = provider(url);

        let err = provider.sign_in("ada", "wrong").await.unwrap_err();
        server.await.unwrap();

        assert_eq!(
            err,
            ChatError::Auth("Sign-in failed: Incorrect username or password.".to_string())
        );
        assert!(!provider.fetch_session().await.unwrap().is_signed_in());
    }

    #[tokio::test]
    async fn test_error_type_used_without_message() {
        let (url, server) = serve_once(
            "400 Bad Request",
            AMZ_JSON,
            r#"{"__type":"UserNotFoundException"}"#,
        )
        .await;
        let provider = provider(url);

        let err = provider.sign_in("ghost", "pw").await.unwrap_err();
        server.await.unwrap();

        assert_eq!(err.to_string(), "Sign-in failed: UserNotFoundException");
    }

    #[tokio::test]
    async fn test_challenge_response_is_rejected() {
        let (url, server) = serve_once(
            "200 OK",
            AMZ_JSON,
            r#"{"ChallengeName":"NEW_PASSWORD_REQUIRED","Session":"opaque"}"#,
        )
        .await;
        let provider = provider(url);

        let err = provider.sign_in("ada", "temp").await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, ChatError::Auth(_)));
        assert!(err.to_string().contains("NEW_PASSWORD_REQUIRED"));
        assert!(!provider.fetch_session().await.unwrap().is_signed_in());
    }
}

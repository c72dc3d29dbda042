use http::{HeaderMap, StatusCode, Version};

use crate::config::GateConfig;
use crate::cookie::extract_session_token;
use crate::storage::{SessionToken, StorageError, ValidationOutcome};

use super::redirect::redirect_status;
use super::types::{GateDecision, GateScope};

/// Run the gate for one request.
///
/// A disabled scope lets everything through without looking at cookies. An
/// enabled scope redirects when the session cookie is missing or the store
/// rejects it, answers 500 when the store cannot be reached, and continues only
/// on a positive answer. A failed backend call is never retried.
#[tracing::instrument(skip_all, fields(cookie = %scope.config().cookie_name))]
pub async fn evaluate(scope: &GateScope, headers: &HeaderMap, version: Version) -> GateDecision {
    let config = scope.config();

    if !config.enabled {
        return GateDecision::Continue { identity: None };
    }

    let Some(token) = extract_session_token(headers, &config.cookie_name) else {
        return redirect(config, version);
    };

    match validate_with_deadline(scope, &token).await {
        ValidationOutcome::Valid { identity } => {
            tracing::debug!(has_identity = identity.is_some(), "Session accepted");
            GateDecision::Continue { identity }
        }
        ValidationOutcome::Invalid => {
            tracing::debug!("Session rejected by backend");
            redirect(config, version)
        }
        ValidationOutcome::BackendError(e) => {
            tracing::error!(backend = %scope.validator().describe(), error = %e, "Session backend failure");
            GateDecision::ServerError(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn validate_with_deadline(scope: &GateScope, token: &SessionToken) -> ValidationOutcome {
    let validator = scope.validator();

    let Some(limit) = scope.config().backend_timeout else {
        return validator.validate(token).await;
    };

    match tokio::time::timeout(limit, validator.validate(token)).await {
        Ok(outcome) => outcome,
        Err(_) => ValidationOutcome::BackendError(StorageError::Timeout {
            backend: validator.describe(),
            timeout_ms: limit.as_millis(),
        }),
    }
}

fn redirect(config: &GateConfig, version: Version) -> GateDecision {
    let status = redirect_status(version);
    tracing::debug!(%status, location = %config.redirect_target, "Redirecting to login");
    GateDecision::Redirect {
        status,
        location: config.redirect_target.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CapturedLogs, MockValidator, enabled_config};
    use http::HeaderValue;
    use http::header::COOKIE;
    use std::time::Duration;

    fn cookie_headers(line: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(line).unwrap());
        headers
    }

    fn expected_redirect(status: StatusCode) -> GateDecision {
        GateDecision::Redirect {
            status,
            location: "/auth".to_string(),
        }
    }

    #[tokio::test]
    async fn test_disabled_scope_continues_without_backend() {
        let mock = MockValidator::unreachable();
        let config = GateConfig {
            enabled: false,
            ..enabled_config()
        };
        let scope = GateScope::with_validator(config, mock.clone());

        let decision = evaluate(&scope, &HeaderMap::new(), Version::HTTP_11).await;

        assert_eq!(decision, GateDecision::Continue { identity: None });
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_cookie_redirects_without_backend() {
        let mock = MockValidator::valid(None);
        let scope = GateScope::with_validator(enabled_config(), mock.clone());

        let decision = evaluate(&scope, &cookie_headers("other=abc"), Version::HTTP_11).await;

        assert_eq!(decision, expected_redirect(StatusCode::TEMPORARY_REDIRECT));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_cookie_redirects_even_when_backend_is_down() {
        let mock = MockValidator::unreachable();
        let scope = GateScope::with_validator(enabled_config(), mock.clone());

        let decision = evaluate(&scope, &HeaderMap::new(), Version::HTTP_10).await;

        assert_eq!(decision, expected_redirect(StatusCode::FOUND));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_valid_session_continues() {
        let mock = MockValidator::valid(Some("alice"));
        let scope = GateScope::with_validator(enabled_config(), mock.clone());

        let decision = evaluate(&scope, &cookie_headers("ra_cookie=abc123"), Version::HTTP_11).await;

        assert_eq!(
            decision,
            GateDecision::Continue {
                identity: Some("alice".to_string())
            }
        );
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.seen_tokens(), vec![b"abc123".to_vec()]);
    }

    #[tokio::test]
    async fn test_invalid_session_redirects() {
        let mock = MockValidator::invalid();
        let scope = GateScope::with_validator(enabled_config(), mock.clone());

        let decision = evaluate(&scope, &cookie_headers("ra_cookie=expired"), Version::HTTP_11).await;

        assert_eq!(decision, expected_redirect(StatusCode::TEMPORARY_REDIRECT));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_session_old_client_gets_302() {
        let scope = GateScope::with_validator(enabled_config(), MockValidator::invalid());

        let decision = evaluate(&scope, &cookie_headers("ra_cookie=expired"), Version::HTTP_10).await;

        assert_eq!(decision, expected_redirect(StatusCode::FOUND));
    }

    #[tokio::test]
    async fn test_backend_error_is_server_error_without_retry() {
        let mock = MockValidator::unreachable();
        let scope = GateScope::with_validator(enabled_config(), mock.clone());

        let decision = evaluate(&scope, &cookie_headers("ra_cookie=abc123"), Version::HTTP_11).await;

        assert_eq!(
            decision,
            GateDecision::ServerError(StatusCode::INTERNAL_SERVER_ERROR)
        );
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_custom_cookie_name_and_target() {
        let mock = MockValidator::invalid();
        let config = GateConfig {
            cookie_name: "sid".to_string(),
            redirect_target: "https://login.example.com/".to_string(),
            ..enabled_config()
        };
        let scope = GateScope::with_validator(config, mock.clone());

        let decision = evaluate(
            &scope,
            &cookie_headers("ra_cookie=ignored; sid=tok9"),
            Version::HTTP_2,
        )
        .await;

        assert_eq!(
            decision,
            GateDecision::Redirect {
                status: StatusCode::TEMPORARY_REDIRECT,
                location: "https://login.example.com/".to_string(),
            }
        );
        assert_eq!(mock.seen_tokens(), vec![b"tok9".to_vec()]);
    }

    #[tokio::test]
    async fn test_slow_backend_past_deadline_is_server_error() {
        let mock = MockValidator::valid(None).with_delay(Duration::from_millis(200));
        let config = GateConfig {
            backend_timeout: Some(Duration::from_millis(20)),
            ..enabled_config()
        };
        let scope = GateScope::with_validator(config, mock);

        let decision = evaluate(&scope, &cookie_headers("ra_cookie=abc123"), Version::HTTP_11).await;

        assert_eq!(
            decision,
            GateDecision::ServerError(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }

    #[tokio::test]
    async fn test_backend_within_deadline_continues() {
        let mock = MockValidator::valid(None).with_delay(Duration::from_millis(5));
        let config = GateConfig {
            backend_timeout: Some(Duration::from_secs(5)),
            ..enabled_config()
        };
        let scope = GateScope::with_validator(config, mock);

        let decision = evaluate(&scope, &cookie_headers("ra_cookie=abc123"), Version::HTTP_11).await;

        assert_eq!(decision, GateDecision::Continue { identity: None });
    }

    #[tokio::test]
    async fn test_backend_error_is_logged_with_backend_and_error_text() {
        let (logs, _guard) = CapturedLogs::install();
        let scope = GateScope::with_validator(enabled_config(), MockValidator::unreachable());

        evaluate(&scope, &cookie_headers("ra_cookie=abc123"), Version::HTTP_11).await;

        let errors = logs.errors();
        assert_eq!(errors.len(), 1, "{}", logs.contents());
        assert!(errors[0].contains("backend=mock:0"), "{}", errors[0]);
        assert!(
            errors[0].contains("error connecting to backend server mock:0: Connection refused"),
            "{}",
            errors[0]
        );
        assert!(!errors[0].contains("abc123"), "{}", errors[0]);
    }

    #[tokio::test]
    async fn test_invalid_session_is_not_logged_as_error() {
        let (logs, _guard) = CapturedLogs::install();
        let scope = GateScope::with_validator(enabled_config(), MockValidator::invalid());

        evaluate(&scope, &cookie_headers("ra_cookie=expired"), Version::HTTP_11).await;

        assert!(logs.errors().is_empty(), "{}", logs.contents());
        assert!(logs.contents().contains("Session rejected by backend"));
    }

    #[tokio::test]
    async fn test_redis_refused_is_logged_with_address() {
        let (logs, _guard) = CapturedLogs::install();
        let config = GateConfig {
            backend: crate::config::BackendConfig::Redis {
                host: "127.0.0.1".to_string(),
                port: 1,
            },
            backend_timeout: Some(Duration::from_secs(10)),
            ..enabled_config()
        };
        let scope = GateScope::from_config(config).unwrap();

        evaluate(&scope, &cookie_headers("ra_cookie=tok1"), Version::HTTP_11).await;

        let errors = logs.errors();
        assert_eq!(errors.len(), 1, "{}", logs.contents());
        assert!(errors[0].contains("backend=127.0.0.1:1"), "{}", errors[0]);
        assert!(
            errors[0].contains("error connecting to backend server 127.0.0.1:1"),
            "{}",
            errors[0]
        );
    }

    #[tokio::test]
    async fn test_redis_backend_refused_is_server_error() {
        let config = GateConfig {
            backend: crate::config::BackendConfig::Redis {
                host: "127.0.0.1".to_string(),
                port: 1,
            },
            backend_timeout: Some(Duration::from_secs(10)),
            ..enabled_config()
        };
        let scope = GateScope::from_config(config).unwrap();

        let decision = evaluate(&scope, &cookie_headers("ra_cookie=tok1"), Version::HTTP_11).await;

        assert_eq!(
            decision,
            GateDecision::ServerError(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }
}

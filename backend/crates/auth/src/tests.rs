//! Router-level tests for the Auth Gate
//!
//! Everything runs against the in-process doubles; two clones of the same
//! repository stand for two fleet members sharing one store.

#[cfg(test)]
mod gate_tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use axum::response::Response;
    use axum::routing::any;
    use axum::{Router, middleware};
    use kernel::id::IdentityId;
    use tower::ServiceExt;

    use crate::application::codec::SessionCodec;
    use crate::application::csrf::CsrfGuard;
    use crate::application::{AuthConfig, IssueSessionUseCase, IssuedSession};
    use crate::domain::repository::SessionRepository;
    use crate::domain::session::SessionRecord;
    use crate::infra::memory::{MemoryIdentityDirectory, MemorySessionRepository};
    use crate::presentation::middleware::{AuthGateState, require_session};
    use crate::presentation::router::auth_router;

    type Memory = AuthGateState<MemorySessionRepository, MemoryIdentityDirectory>;

    struct Fixture {
        sessions: MemorySessionRepository,
        directory: MemoryIdentityDirectory,
        config: Arc<AuthConfig>,
        state: Memory,
        hits: Arc<AtomicUsize>,
    }

    impl Fixture {
        fn new() -> Self {
            let sessions = MemorySessionRepository::new();
            let directory = MemoryIdentityDirectory::new();
            let config = Arc::new(AuthConfig::development());
            let state = AuthGateState::new(
                Arc::new(sessions.clone()),
                Arc::new(directory.clone()),
                config.clone(),
            );
            Self {
                sessions,
                directory,
                config,
                state,
                hits: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Auth routes plus one protected route counting its invocations
        fn app(&self) -> Router {
            let hits = self.hits.clone();
            let protected = Router::new()
                .route(
                    "/protected",
                    any(move || {
                        let hits = hits.clone();
                        async move {
                            hits.fetch_add(1, Ordering::SeqCst);
                            "ok"
                        }
                    }),
                )
                .route_layer(middleware::from_fn_with_state(
                    self.state.clone(),
                    require_session::<MemorySessionRepository, MemoryIdentityDirectory>,
                ));

            Router::new()
                .nest("/api/auth", auth_router(self.state.clone()))
                .merge(protected)
        }

        async fn issue(&self, identity_id: IdentityId) -> IssuedSession {
            self.directory.insert(identity_id).await;
            IssueSessionUseCase::new(Arc::new(self.sessions.clone()), self.config.clone())
                .execute(identity_id, BTreeMap::new())
                .await
                .unwrap()
        }

        fn cookie(&self, sealed: &str) -> String {
            format!("{}={}", self.config.session_cookie_name, sealed)
        }

        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    fn request(method: Method, uri: &str, cookie: Option<&str>, csrf: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(csrf) = csrf {
            builder = builder.header("x-csrf-token", csrf);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_no_cookie_is_unauthenticated() {
        let fx = Fixture::new();

        let response = fx
            .app()
            .oneshot(request(Method::GET, "/api/auth/session", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_valid_session_reports_status_and_csrf() {
        let fx = Fixture::new();
        let identity_id = IdentityId::new();
        let issued = fx.issue(identity_id).await;

        let response = fx
            .app()
            .oneshot(request(
                Method::GET,
                "/api/auth/session",
                Some(&fx.cookie(&issued.sealed_cookie)),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-csrf-token").unwrap(),
            issued.csrf_token.as_str()
        );
        let body = json(response).await;
        assert_eq!(body["identityId"], identity_id.to_string());
        assert_eq!(body["sessionId"], issued.record.session_id.to_string());
    }

    #[tokio::test]
    async fn test_tampered_cookie_is_rejected() {
        let fx = Fixture::new();
        let issued = fx.issue(IdentityId::new()).await;
        let other = SessionCodec::new([7u8; 32]).seal(&issued.record.session_id);

        let response = fx
            .app()
            .oneshot(request(
                Method::GET,
                "/protected",
                Some(&fx.cookie(&other)),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(fx.hits(), 0);
    }

    #[tokio::test]
    async fn test_expired_session_still_in_store_is_rejected() {
        let fx = Fixture::new();
        let identity_id = IdentityId::new();
        fx.directory.insert(identity_id).await;

        let record = SessionRecord::new(
            identity_id,
            chrono::Duration::seconds(-1),
            CsrfGuard::new_secret(),
            BTreeMap::new(),
        );
        let sealed = SessionCodec::new(fx.config.session_secret).seal(&record.session_id);
        fx.sessions.insert_raw(record).await;

        let response = fx
            .app()
            .oneshot(request(Method::GET, "/protected", Some(&fx.cookie(&sealed)), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(fx.hits(), 0);
        // Rejection evicts the stale record
        assert_eq!(fx.sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_mutating_request_without_csrf_never_reaches_handler() {
        let fx = Fixture::new();
        let issued = fx.issue(IdentityId::new()).await;
        let cookie = fx.cookie(&issued.sealed_cookie);

        let missing = fx
            .app()
            .oneshot(request(Method::POST, "/protected", Some(&cookie), None))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::FORBIDDEN);
        assert_eq!(json(missing).await["code"], "CSRF_MISMATCH");

        let wrong = fx
            .app()
            .oneshot(request(Method::DELETE, "/protected", Some(&cookie), Some("nope")))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::FORBIDDEN);
        assert_eq!(fx.hits(), 0);

        let ok = fx
            .app()
            .oneshot(request(
                Method::POST,
                "/protected",
                Some(&cookie),
                Some(&issued.csrf_token),
            ))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(fx.hits(), 1);
    }

    #[tokio::test]
    async fn test_safe_methods_skip_csrf() {
        let fx = Fixture::new();
        let issued = fx.issue(IdentityId::new()).await;

        let response = fx
            .app()
            .oneshot(request(
                Method::GET,
                "/protected",
                Some(&fx.cookie(&issued.sealed_cookie)),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(fx.hits(), 1);
    }

    #[tokio::test]
    async fn test_csrf_rejection_leaves_activity_untouched() {
        let fx = Fixture::new();
        let issued = fx.issue(IdentityId::new()).await;
        let cookie = fx.cookie(&issued.sealed_cookie);
        let session_id = issued.record.session_id;
        let before = issued.record.last_seen_at;

        for csrf in [None, Some("nope")] {
            let response = fx
                .app()
                .oneshot(request(Method::POST, "/protected", Some(&cookie), csrf))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        let record = fx.sessions.load(&session_id).await.unwrap().unwrap();
        assert_eq!(record.last_seen_at, before);
    }

    #[tokio::test]
    async fn test_admitted_request_records_activity() {
        let fx = Fixture::new();
        let issued = fx.issue(IdentityId::new()).await;
        let session_id = issued.record.session_id;
        let before = issued.record.last_seen_at;
        tokio::time::sleep(Duration::from_millis(5)).await;

        let response = fx
            .app()
            .oneshot(request(
                Method::GET,
                "/protected",
                Some(&fx.cookie(&issued.sealed_cookie)),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let touched = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let record = fx.sessions.load(&session_id).await.unwrap().unwrap();
                if record.last_seen_at > before {
                    return record;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(touched.expires_at, issued.record.expires_at);
    }

    #[tokio::test]
    async fn test_csrf_token_of_another_session_is_rejected() {
        let fx = Fixture::new();
        let identity_id = IdentityId::new();
        let first = fx.issue(identity_id).await;
        let second = fx.issue(identity_id).await;

        let response = fx
            .app()
            .oneshot(request(
                Method::POST,
                "/protected",
                Some(&fx.cookie(&first.sealed_cookie)),
                Some(&second.csrf_token),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(fx.hits(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_closed() {
        let fx = Fixture::new();
        let issued = fx.issue(IdentityId::new()).await;
        fx.sessions.set_unreachable(true);

        let response = fx
            .app()
            .oneshot(request(
                Method::GET,
                "/protected",
                Some(&fx.cookie(&issued.sealed_cookie)),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(json(response).await["code"], "UPSTREAM_UNAVAILABLE");
        assert_eq!(fx.hits(), 0);
    }

    #[tokio::test]
    async fn test_session_of_deleted_identity_is_rejected() {
        let fx = Fixture::new();
        let identity_id = IdentityId::new();
        let issued = fx.issue(identity_id).await;
        fx.directory.remove(&identity_id).await;

        let response = fx
            .app()
            .oneshot(request(
                Method::GET,
                "/protected",
                Some(&fx.cookie(&issued.sealed_cookie)),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(fx.hits(), 0);
    }

    #[tokio::test]
    async fn test_sign_out_destroys_session_and_clears_cookies() {
        let fx = Fixture::new();
        let issued = fx.issue(IdentityId::new()).await;
        let cookie = fx.cookie(&issued.sealed_cookie);

        let response = fx
            .app()
            .oneshot(request(
                Method::POST,
                "/api/auth/signout",
                Some(&cookie),
                Some(&issued.csrf_token),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cleared: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(cleared.iter().all(|c| c.contains("Max-Age=0")));
        assert_eq!(cleared.len(), 2);

        assert!(
            fx.sessions
                .load(&issued.record.session_id)
                .await
                .unwrap()
                .is_none()
        );

        let after = fx
            .app()
            .oneshot(request(Method::GET, "/protected", Some(&cookie), None))
            .await
            .unwrap();
        assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sign_out_all_revokes_every_session() {
        let fx = Fixture::new();
        let identity_id = IdentityId::new();
        let first = fx.issue(identity_id).await;
        let _second = fx.issue(identity_id).await;
        let _other = fx.issue(IdentityId::new()).await;

        let response = fx
            .app()
            .oneshot(request(
                Method::POST,
                "/api/auth/signout/all",
                Some(&fx.cookie(&first.sealed_cookie)),
                Some(&first.csrf_token),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["sessionsRevoked"], 2);
        assert_eq!(fx.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_session_visible_from_another_member() {
        let fx = Fixture::new();
        let issued = fx.issue(IdentityId::new()).await;

        // Second member: its own handles onto the same shared store
        let member_b = AuthGateState::new(
            Arc::new(fx.sessions.clone()),
            Arc::new(fx.directory.clone()),
            fx.config.clone(),
        );
        let app_b = Router::new().nest("/api/auth", auth_router(member_b));

        let response = app_b
            .oneshot(request(
                Method::GET,
                "/api/auth/csrf",
                Some(&fx.cookie(&issued.sealed_cookie)),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["csrfToken"], issued.csrf_token);
    }
}

#[cfg(test)]
mod repository_tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, Utc};
    use kernel::id::{IdentityId, SessionId};

    use crate::application::csrf::CsrfGuard;
    use crate::domain::repository::SessionRepository;
    use crate::domain::session::SessionRecord;
    use crate::error::AuthError;
    use crate::infra::memory::MemorySessionRepository;

    fn record(identity_id: IdentityId) -> SessionRecord {
        SessionRecord::new(
            identity_id,
            Duration::hours(1),
            CsrfGuard::new_secret(),
            BTreeMap::from([("user_agent".to_string(), "test".to_string())]),
        )
    }

    #[tokio::test]
    async fn test_create_then_load_round_trips() {
        let repo = MemorySessionRepository::new();
        let rec = record(IdentityId::new());
        repo.create(&rec).await.unwrap();

        let loaded = repo.load(&rec.session_id).await.unwrap().unwrap();
        assert_eq!(loaded, rec);
        assert_eq!(loaded.attribute("user_agent"), Some("test"));
    }

    #[tokio::test]
    async fn test_destroy_then_load_is_absent() {
        let repo = MemorySessionRepository::new();
        let rec = record(IdentityId::new());
        repo.create(&rec).await.unwrap();

        assert!(repo.destroy(&rec.session_id).await.unwrap());
        assert!(repo.load(&rec.session_id).await.unwrap().is_none());
        assert!(!repo.destroy(&rec.session_id).await.unwrap());
        assert!(repo.load(&SessionId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_touch_keeps_absolute_expiry() {
        let repo = MemorySessionRepository::new();
        let rec = record(IdentityId::new());
        repo.create(&rec).await.unwrap();

        let later = Utc::now() + Duration::minutes(5);
        repo.touch(&rec.session_id, later).await.unwrap();

        let loaded = repo.load(&rec.session_id).await.unwrap().unwrap();
        assert_eq!(loaded.last_seen_at, later);
        assert_eq!(loaded.expires_at, rec.expires_at);
    }

    #[tokio::test]
    async fn test_destroy_all_only_touches_one_identity() {
        let repo = MemorySessionRepository::new();
        let alice = IdentityId::new();
        let bob = IdentityId::new();
        for _ in 0..3 {
            repo.create(&record(alice)).await.unwrap();
        }
        repo.create(&record(bob)).await.unwrap();

        assert_eq!(repo.destroy_all_for_identity(&alice).await.unwrap(), 3);
        assert_eq!(repo.destroy_all_for_identity(&alice).await.unwrap(), 0);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_unreachable_store_errors() {
        let repo = MemorySessionRepository::new();
        repo.set_unreachable(true);

        let err = repo.load(&SessionId::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_evict_expired() {
        let repo = MemorySessionRepository::new();
        let identity_id = IdentityId::new();
        let expired = SessionRecord::new(
            identity_id,
            Duration::seconds(-5),
            CsrfGuard::new_secret(),
            BTreeMap::new(),
        );
        repo.insert_raw(expired).await;
        repo.create(&record(identity_id)).await.unwrap();

        assert_eq!(repo.evict_expired().await, 1);
        assert_eq!(repo.len().await, 1);
    }
}

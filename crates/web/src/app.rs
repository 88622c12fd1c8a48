use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::features::{competitions, contributors, entries, genres, health, results, users, votes};
use crate::state::AppState;

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(health::routes::routes())
        .merge(genres::routes::routes(state.clone()))
        .merge(competitions::routes::routes(state.clone()))
        .merge(entries::routes::routes(state.clone()))
        .merge(contributors::routes::routes())
        .merge(votes::routes::routes())
        .merge(results::routes::routes())
        .merge(users::routes::routes(state))
}

/// The API router with CORS and request tracing, without Swagger UI.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .nest("/api", api_routes(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::{Duration, Utc};
    use sqlx::postgres::PgPoolOptions;
    use storage::Database;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::jwt::JwtKeys;
    use crate::middleware::auth::ApiKeys;

    const API_KEY: &str = "test-admin-key";

    fn test_state() -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/unused")
            .expect("lazy pool");

        AppState {
            db: Database::from_pool(pool),
            api_keys: ApiKeys::from_comma_separated(API_KEY),
            jwt: JwtKeys::new("test-secret", 1),
        }
    }

    async fn send(request: Request<Body>) -> StatusCode {
        router(test_state())
            .oneshot(request)
            .await
            .expect("router response")
            .status()
    }

    fn request(method: &str, uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn test_admin_routes_require_credentials() {
        for (method, uri) in [
            ("POST", "/api/admin/genres"),
            ("POST", "/api/admin/competitions"),
            ("DELETE", "/api/admin/competitions/00000000-0000-0000-0000-000000000000"),
            ("PUT", "/api/admin/entries/00000000-0000-0000-0000-000000000000/status"),
            ("POST", "/api/admin/users"),
        ] {
            assert_eq!(
                send(request(method, uri, None)).await,
                StatusCode::UNAUTHORIZED,
                "{method} {uri}"
            );
        }
    }

    #[tokio::test]
    async fn test_admin_routes_reject_unknown_tokens() {
        let status = send(request("POST", "/api/admin/genres", Some("Bearer not-a-key"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let status = send(request("POST", "/api/admin/genres", Some("Basic abc"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_key_reaches_the_handler() {
        // no JSON content type, so the body extractor answers instead of auth
        let status = send(request(
            "POST",
            "/api/admin/genres",
            Some(&format!("Bearer {API_KEY}")),
        ))
        .await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_user_endpoints_require_a_user_token() {
        assert_eq!(send(request("GET", "/api/votes", None)).await, StatusCode::UNAUTHORIZED);
        assert_eq!(send(request("GET", "/api/users/me", None)).await, StatusCode::UNAUTHORIZED);

        // an admin key is not a user account
        let status = send(request("GET", "/api/votes", Some(&format!("Bearer {API_KEY}")))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let (token, _) = JwtKeys::new("test-secret", 1)
            .sign(Uuid::new_v4(), Utc::now() - Duration::days(1))
            .unwrap();

        let status = send(request("GET", "/api/users/me", Some(&format!("Bearer {token}")))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        assert_eq!(send(request("GET", "/api/nope", None)).await, StatusCode::NOT_FOUND);
    }
}

use axum::{Json, Router, routing::get};
use storage::Database;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use crate::ApiDoc;
use crate::features::{health, leaderboard, scores};

pub fn router(db: Database) -> Router {
    let api = Router::new()
        .nest("/scores", scores::routes::routes())
        .nest("/leaderboard", leaderboard::routes::routes());

    Router::new()
        .merge(health::routes::routes())
        .nest("/api", api)
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(CorsLayer::permissive())
        .with_state(db)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use storage::{
        config::{ConnectTarget, ListLimits, PoolConfig, StoreConfig},
        ranking::RankingPolicy,
    };
    use tower::ServiceExt;

    use super::*;

    fn unreachable_db() -> Database {
        Database::new(&StoreConfig {
            target: ConnectTarget {
                host: "127.0.0.1".to_string(),
                port: 1,
                ..ConnectTarget::default()
            },
            pool: PoolConfig {
                min_connections: 0,
                max_connections: 1,
                acquire_timeout: Duration::from_millis(200),
            },
            limits: ListLimits::default(),
            ranking: RankingPolicy::HIGHER_IS_BETTER,
        })
        .unwrap()
    }

    async fn send(request: Request<Body>) -> StatusCode {
        router(unreachable_db())
            .oneshot(request)
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_degrades_when_store_is_down() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        assert_eq!(send(request).await, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected_without_store() {
        let request = Request::post("/api/scores")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"user_name":"  ","result":10}"#))
            .unwrap();
        assert_eq!(send(request).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_result_is_json_bad_request() {
        for body in [
            r#"{"user_name":"mario","result":"abc"}"#,
            r#"{"user_name":"mario","result":1.5}"#,
            r#"{"user_name":"mario"}"#,
            r#"{"user_name":"mario","result":"#,
        ] {
            let request = Request::post("/api/scores")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap();
            let response = router(unreachable_db()).oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(
                response.headers()[header::CONTENT_TYPE],
                "application/json",
                "{body}"
            );
        }
    }

    #[tokio::test]
    async fn test_store_outage_maps_to_service_unavailable() {
        let request = Request::get("/api/scores?limit=5").body(Body::empty()).unwrap();
        assert_eq!(send(request).await, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_conflicting_ranking_override_is_bad_request() {
        let request = Request::get("/api/leaderboard?aggregate=max&direction=asc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(request).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let request = Request::get("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(request).await, StatusCode::OK);
    }
}

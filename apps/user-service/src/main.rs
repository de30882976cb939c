//! User Service - REST API for user management

use axum::Router;
use axum_helpers::server::{
    CleanupCoordinator, close_database, create_production_app, create_router, health_router,
};
use core_config::tracing::{init_tracing, install_color_eyre};
use migration::Migrator;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

/// REST routes plus docs, middleware, /health and /ready
async fn build_app(state: &AppState) -> eyre::Result<Router> {
    let api_routes = api::routes(state);
    let router = create_router::<openapi::ApiDoc>(api_routes, &state.config.server).await?;

    Ok(router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone())))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first so startup failures are reported with context
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = match config.database.clone() {
        Some(database) => {
            info!("Connecting to PostgreSQL");
            let db = database::postgres::connect_from_config_with_retry(database, None)
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;
            database::postgres::run_migrations::<Migrator>(&db, config.app.name).await?;
            Some(db)
        }
        None => None,
    };

    let state = AppState { config, db };
    let app = build_app(&state).await?;

    let mut cleanup = CleanupCoordinator::new();
    if let Some(db) = state.db.clone() {
        cleanup.add_task("postgres", close_database(db, "postgres"));
    }

    let shutdown_timeout = state.config.shutdown_timeout;
    info!(
        "Starting {} v{} on port {}",
        state.config.app.name, state.config.app.version, state.config.server.port
    );

    create_production_app(
        app,
        &state.config.server,
        shutdown_timeout,
        cleanup.run(shutdown_timeout),
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("User Service shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{Environment, app_info, server::ServerConfig};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::time::Duration;
    use test_utils::TestDatabase;
    use tower::ServiceExt;

    fn state(db: Option<database::postgres::DatabaseConnection>) -> AppState {
        AppState {
            config: Config {
                app: app_info!(),
                database: None,
                server: ServerConfig::default(),
                environment: Environment::Development,
                shutdown_timeout: Duration::from_secs(1),
            },
            db,
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_api_docs_served() {
        let app = build_app(&state(None)).await.unwrap();

        let (status, body) = get(app, "/v3/api-docs").await;
        assert_eq!(status, StatusCode::OK);

        let doc: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(doc["info"]["title"], "User Service API");
        assert_eq!(doc["info"]["version"], "1.0");
        assert!(doc["paths"].get("/users/read/{id}").is_some());
        assert!(doc["paths"].get("/users").is_some());
    }

    #[tokio::test]
    async fn test_swagger_ui_served() {
        let app = build_app(&state(None)).await.unwrap();

        let (status, _) = get(app, "/swagger-ui/index.html").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_reports_service_name() {
        let app = build_app(&state(None)).await.unwrap();

        let (status, body) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);

        let health: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["name"], "user_service");
    }

    #[tokio::test]
    async fn test_ready_without_database() {
        let app = build_app(&state(None)).await.unwrap();

        let (status, body) = get(app, "/ready").await;
        assert_eq!(status, StatusCode::OK);

        let ready: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(ready["status"], "ready");
    }

    #[tokio::test]
    async fn test_ready_with_database() {
        let db = TestDatabase::new().await;
        let app = build_app(&state(Some(db.connection()))).await.unwrap();

        let (status, body) = get(app, "/ready").await;
        assert_eq!(status, StatusCode::OK);

        let ready: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(ready["database"], "connected");
    }

    #[tokio::test]
    async fn test_users_routes_mounted() {
        let app = build_app(&state(None)).await.unwrap();

        let (status, body) = get(app.clone(), "/users").await;
        assert_eq!(status, StatusCode::OK);
        let list: Value = serde_json::from_slice(&body).unwrap();
        assert!(list["_embedded"]["userResponseList"].is_array());

        let (status, _) = get(app, "/users/read/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = build_app(&state(None)).await.unwrap();

        let (status, body) = get(app, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let error: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["error"], "NOT_FOUND");
    }
}

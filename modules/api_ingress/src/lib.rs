//! HTTP host for a compiled API: mounts the bound CRUD routes next to `/health`,
//! `/openapi.json` and `/docs`, wraps them in the standard middleware stack and
//! serves until cancelled.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use apikit::api::{into_router, BoundRoute};
use apikit::CompiledApi;
use arc_swap::ArcSwap;
use axum::response::Json;
use axum::{middleware::from_fn, routing::get, Router};
use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
pub mod web;

pub use config::ApiIngressConfig;
pub use web::placeholder_handlers;

/// Owns the HTTP server for one compiled API.
pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    /// Serialized document served at `/openapi.json`.
    openapi: ArcSwap<Value>,
    /// Bound routes waiting to be mounted by the next `build_router`.
    routes: Mutex<Vec<BoundRoute>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            openapi: ArcSwap::from_pointee(Value::Null),
            routes: Mutex::new(Vec::new()),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    pub fn set_config(&self, config: ApiIngressConfig) {
        self.config.store(Arc::new(config));
    }

    /// Publish `api`'s document and queue its bound routes.
    pub fn mount(&self, api: &CompiledApi, routes: Vec<BoundRoute>) -> Result<()> {
        let document =
            serde_json::to_value(&api.document).context("failed to serialize OpenAPI document")?;
        self.openapi.store(Arc::new(document));
        tracing::info!(routes = routes.len(), "mounted compiled API");
        *self.routes.lock() = routes;
        Ok(())
    }

    pub fn openapi_json(&self) -> Arc<Value> {
        self.openapi.load_full()
    }

    /// Build the router from the mounted routes. The route list is consumed.
    pub fn build_router(&self) -> Router {
        let config = self.get_config();
        let routes = std::mem::take(&mut *self.routes.lock());
        tracing::debug!(routes = routes.len(), "building router");

        let document = self.openapi_json();
        let mut router = into_router(routes)
            .route("/health", get(web::health_check))
            .route(
                "/openapi.json",
                get(move || {
                    let document = document.clone();
                    async move { Json((*document).clone()) }
                }),
            );
        if config.enable_docs {
            router = router.route("/docs", get(web::serve_docs));
        }

        // Each call wraps the previous ones, so the order below is innermost first.
        // Outermost: SetRequestId -> PropagateRequestId -> extensions/span
        // -> problem stamp -> Trace -> Timeout -> CORS -> BodyLimit.
        let x_request_id = request_id::header();
        router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes));
        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        if config.request_timeout_sec > 0 {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_sec,
            )));
        }
        router
            .layer(request_id::create_trace_layer())
            .layer(from_fn(request_id::stamp_problem_request_id))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    /// Bind, serve, and shut down gracefully when `cancel` fires.
    pub async fn serve(self: Arc<Self>, cancel: CancellationToken) -> Result<()> {
        let cfg = self.get_config();
        let addr: SocketAddr = cfg
            .bind_addr
            .parse()
            .with_context(|| format!("invalid bind address '{}'", cfg.bind_addr))?;

        let router = self.build_router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!(%addr, "HTTP server bound");

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully");
        };
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")
    }
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID, CORS)
//! - Serve the frontend bundle for every unmatched path
//! - Bind to a plain TCP listener or a TLS listener
//! - Drain in-flight requests on shutdown

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cluster::ResourceLister;
use crate::config::ConsoleConfig;
use crate::http::plugin::{self, Frontend, PluginSettings};
use crate::http::request::{ProxyPath, PROXY_PREFIX};
use crate::http::response::ApiResponse;
use crate::observability::metrics;
use crate::proxy::{ProxyRouter, RouteKey, UpstreamSettings};
use crate::registry::Registry;

/// Served with caching disabled so console upgrades take effect on reload.
const PLUGIN_ENTRY: &str = "/plugin-entry.js";

/// Grace period for in-flight requests once shutdown is requested.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub proxies: Arc<ProxyRouter>,
    pub frontend: Arc<Frontend>,
}

/// HTTP server for the console backend.
pub struct HttpServer {
    router: Router,
    config: ConsoleConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ConsoleConfig, lister: Arc<dyn ResourceLister>) -> Self {
        let registry = Registry::new(lister);
        let proxies = Arc::new(ProxyRouter::new(
            registry.clone(),
            UpstreamSettings::from(&config.upstream),
            config.upstream.cache_capacity,
        ));

        let settings = PluginSettings::load(config.frontend.plugin_config_path.as_deref());
        let request_timeout = settings
            .timeout()
            .unwrap_or(Duration::from_secs(config.timeouts.request_secs));

        let state = AppState {
            registry,
            proxies,
            frontend: Arc::new(Frontend {
                features: config.frontend.features.clone(),
                settings,
            }),
        };

        let router = Self::build_router(&config.frontend.static_path, request_timeout, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(static_path: &Path, request_timeout: Duration, state: AppState) -> Router {
        Router::new()
            .route("/health", get(plugin::health))
            .route("/features", get(plugin::features))
            .route("/config", get(plugin::config))
            .route("/api/v1/list-tempo-resources", get(list_tempo_resources))
            .route(PROXY_PREFIX, any(proxy_handler))
            .route("/proxy/", any(proxy_handler))
            .route("/proxy/{*rest}", any(proxy_handler))
            .fallback_service(ServeDir::new(static_path))
            .with_state(state)
            .layer(middleware::from_fn(disable_entry_caching))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server listening");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server behind TLS on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server listening");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drain.graceful_shutdown(Some(DRAIN_TIMEOUT));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service_with_connect_info::<SocketAddr>())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }
}

/// Lists every multi-tenant Tempo instance in the cluster.
async fn list_tempo_resources(State(state): State<AppState>) -> Response {
    match state.registry.list_instances().await {
        Ok(instances) => ApiResponse::success(instances).into_response(),
        Err(e) if e.is_not_found() => {
            tracing::warn!(error = %e, "Tempo CRDs are not installed");
            ApiResponse::error(Some("TempoCRDNotFound"), &e).into_response_with(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list Tempo resources");
            ApiResponse::error(None, &e).into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Forwards `/proxy/{namespace}/{name}/{tenant}/...` to the matching instance.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let path = ProxyPath::parse(request.uri().path());
    let key = RouteKey::new(&path.namespace, &path.name, &path.tenant);

    let response = match state.proxies.route(&key, &path.rest, request, client_addr).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    metrics::record_request(response.status().as_u16(), start);
    response
}

async fn disable_entry_caching(request: Request, next: Next) -> Response {
    let is_entry = request.uri().path().starts_with(PLUGIN_ENTRY);
    let mut response = next.run(request).await;

    if is_entry {
        let headers = response.headers_mut();
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    }
    response
}

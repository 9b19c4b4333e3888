//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all dispatch handler
//! - Wire up middleware (CORS, timeout, request ID, tracing)
//! - Dispatch to the open relay or the named-route table
//! - Forward named routes upstream and shape their responses
//! - Record per-request metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{OpenRelayConfig, RelayConfig};
use crate::error::{ProxyResult, SetupError};
use crate::http::request::{request_id, UuidRequestId};
use crate::http::{cors, relay, response};
use crate::observability::metrics;
use crate::routing::{QueryParams, ResponseFormat, RouteSpec, RouteTable};
use crate::upstream::{session_token, OutboundRequest, UpstreamClient};

/// Application state injected into handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub upstream: UpstreamClient,
    pub relay: Arc<OpenRelayConfig>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given (validated) configuration.
    pub fn new(config: RelayConfig) -> Result<Self, SetupError> {
        let table = Arc::new(RouteTable::from_config(&config.routes, &config.upstream)?);
        let upstream = UpstreamClient::new(&config.upstream)?;

        let state = AppState {
            table,
            upstream,
            relay: Arc::new(config.relay.clone()),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let routes = Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        // Preflight is answered outside the request-ID layers so it carries
        // only the CORS header set.
        cors::apply(
            routes
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId)),
        )
    }

    /// The fully-layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.routes.prefix,
            relay_enabled = self.config.relay.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: relay path, named route, or the 404 listing.
async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();
    let (parts, _body) = request.into_parts();
    let request_id = request_id(&parts.headers).to_string();
    let path = parts.uri.path();
    let query = parts.uri.query();
    let method = &parts.method;

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Handling request"
    );

    let (route_name, result) = if state.relay.enabled && path == state.relay.path {
        (
            "relay",
            relay::relay(&state.upstream, &state.relay, method, &parts.headers, query).await,
        )
    } else if let Some(route) = state.table.lookup(path) {
        (
            route.name,
            forward(&state, route, method, &parts.headers, query).await,
        )
    } else {
        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        metrics::record_request("unknown", method.as_str(), 404, start);
        return response::not_found(state.table.available());
    };

    let response = result.unwrap_or_else(|e| {
        tracing::warn!(
            request_id = %request_id,
            route = route_name,
            error = %e,
            "Request failed"
        );
        e.into_response()
    });

    metrics::record_request(route_name, method.as_str(), response.status().as_u16(), start);
    response
}

/// Plan, send and shape a named-route request.
async fn forward(
    state: &AppState,
    route: &'static RouteSpec,
    method: &Method,
    headers: &HeaderMap,
    query: Option<&str>,
) -> ProxyResult<Response> {
    let params = QueryParams::parse(query);
    let target = (route.plan)(&params)?;
    let url = state.table.upstream_url(&target);
    let outbound_headers = state
        .upstream
        .identity()
        .api_headers(headers, session_token(headers, &params));

    let outbound = match &target.form {
        Some(fields) => OutboundRequest::form_post(url, outbound_headers, fields),
        None => OutboundRequest::passthrough(method.clone(), url, outbound_headers),
    };

    let upstream = state.upstream.send(route.name, outbound).await?;
    let body = upstream.bytes().await?;

    match route.format {
        ResponseFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(&body)?;
            Ok(response::json(value))
        }
        ResponseFormat::Xml => Ok(response::xml(body)),
    }
}

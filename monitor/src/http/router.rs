use alloc::sync::Arc;
use core::{net::SocketAddr, time::Duration};

use axum::{
    Router,
    body::Body,
    extract::connect_info::IntoMakeServiceWithConnectInfo,
    http::{
        Request, StatusCode,
        header::{AUTHORIZATION, COOKIE},
    },
    middleware::{self as ax_middleware},
    routing::{self, any},
};
use tower::ServiceBuilder;
use tower_http::{
    ServiceBuilderExt as _, request_id::MakeRequestUuid, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::{
    app::AppState,
    http::{api, auth, middleware::secure_headers_middleware, websocket},
};

/// Creates the application router by merging public and private routes.
///
/// Public routes are the session endpoints (login, logout, check).
/// Private routes are the API and the WebSocket channel, protected by the auth middleware.
pub(crate) fn create_app_router(auth_runtime: &Arc<auth::Runtime>) -> Router<AppState> {
    let public = auth::routes();

    let private = Router::new()
        .nest("/api", api::routes())
        .route("/ws", any(websocket::ws_handler))
        .route_layer(ax_middleware::from_fn_with_state(
            auth::LayerState {
                auth: auth_runtime.clone(),
            },
            auth::require,
        ));

    public.merge(private)
}

/// The router with state and the middleware stack applied.
pub(crate) fn create_router(app_state: AppState) -> Router<()> {
    let middleware_stack = ServiceBuilder::new()
        .sensitive_headers([AUTHORIZATION, COOKIE])
        .set_x_request_id(MakeRequestUuid)
        .propagate_x_request_id()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(ax_middleware::from_fn(secure_headers_middleware));

    create_app_router(&app_state.auth)
        .with_state(app_state)
        .fallback(routing::any(|req: Request<Body>| async move {
            tracing::warn!(method = %req.method(), uri = %req.uri(), "Unhandled request");
            StatusCode::NOT_FOUND
        }))
        .layer(middleware_stack)
}

pub(crate) fn create_app(
    app_state: AppState,
) -> IntoMakeServiceWithConnectInfo<Router<()>, SocketAddr> {
    create_router(app_state).into_make_service_with_connect_info::<SocketAddr>()
}

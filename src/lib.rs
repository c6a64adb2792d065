pub mod auth;
pub mod binding;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::repository::Repository;
use crate::state::AppState;

/// Build the complete router for a repository
pub fn app<R: Repository>(state: AppState<R>) -> Router {
    let config = state.config.clone();

    let protected = Router::new()
        .merge(root_routes::<R>())
        .merge(node_routes::<R>())
        .merge(property_routes::<R>())
        .merge(query_routes::<R>())
        .merge(user_routes::<R>())
        .merge(group_routes::<R>())
        .merge(system_routes::<R>())
        .route_layer(axum::middleware::from_fn(middleware::basic_auth_middleware));

    let mut router = Router::new()
        .merge(public_routes::<R>())
        .merge(protected)
        .with_state(state);

    if config.api.enable_cors {
        router = router.layer(cors_layer(&config));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn public_routes<R: Repository>() -> Router<AppState<R>> {
    use handlers::public;

    Router::new()
        .route("/hello", get(public::hello_get::<R>))
        .route("/health", get(public::health_get::<R>))
}

fn root_routes<R: Repository>() -> Router<AppState<R>> {
    use handlers::protected;

    Router::new().route("/", get(protected::root_get::<R>))
}

fn node_routes<R: Repository>() -> Router<AppState<R>> {
    use handlers::protected;

    let nodes = || {
        get(protected::nodes_get::<R>)
            .post(protected::nodes_post::<R>)
            .put(protected::nodes_put::<R>)
            .delete(protected::nodes_delete::<R>)
    };

    // The wildcard needs at least one character, so the root gets explicit routes
    Router::new()
        .route("/nodes", nodes())
        .route("/nodes/", nodes())
        .route("/nodes/*path", nodes())
}

fn property_routes<R: Repository>() -> Router<AppState<R>> {
    use handlers::protected;

    let properties = || {
        get(protected::properties_get::<R>)
            .post(protected::properties_post::<R>)
            .put(protected::properties_put::<R>)
            .delete(protected::properties_delete::<R>)
    };

    Router::new()
        .route("/properties", properties())
        .route("/properties/", properties())
        .route("/properties/*path", properties())
}

fn query_routes<R: Repository>() -> Router<AppState<R>> {
    use handlers::protected;

    let query = || get(protected::query_get::<R>).post(protected::query_post::<R>);

    Router::new()
        .route("/query", query())
        .route("/query/", query())
}

fn user_routes<R: Repository>() -> Router<AppState<R>> {
    use handlers::protected;

    Router::new()
        .route("/users", get(protected::users_list::<R>).post(protected::users_post::<R>))
        .route("/users/me", get(protected::users_me::<R>))
        .route(
            "/users/:username",
            get(protected::users_get::<R>).delete(protected::users_delete::<R>),
        )
        .route("/users/:username/groups", get(protected::users_groups::<R>))
}

fn group_routes<R: Repository>() -> Router<AppState<R>> {
    use handlers::protected;

    Router::new()
        .route("/groups", get(protected::groups_list::<R>).post(protected::groups_post::<R>))
        .route(
            "/groups/:name",
            get(protected::groups_get::<R>).delete(protected::groups_delete::<R>),
        )
}

fn system_routes<R: Repository>() -> Router<AppState<R>> {
    use handlers::protected;

    Router::new()
        .route("/system/properties", get(protected::system_properties::<R>))
        .route("/system/versions", get(protected::system_versions::<R>))
        .route("/system/hardware", get(protected::system_hardware::<R>))
        .route("/system/runtime", get(protected::system_runtime::<R>))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION]);

    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

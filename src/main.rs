mod admin;
mod admin_routes;
mod admin_templates;
mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod models;
mod routes;
mod templates;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{catalog::Catalog, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Catalog,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/movie/{slug}", get(routes::movie_detail))
        .route("/review/{id}", post(routes::add_review))
        .route("/rating", post(routes::add_rating))
        .route("/contact", get(routes::contact_page).post(routes::add_contact))
        .nest("/admin", admin_routes::router(state.clone()))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,kinoteka=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(&config.database_url).await?;
    let catalog = Catalog::new(db);

    let state = Arc::new(AppState { config: config.clone(), catalog });
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::{net::SocketAddr, sync::Arc};

    use axum::{Router, extract::connect_info::MockConnectInfo};

    use crate::{AppState, catalog::Catalog, config::Config};

    pub fn test_app(catalog: Catalog) -> (Arc<AppState>, Router) {
        let config = Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            database_url: String::new(),
            admin_token: "test-admin-token".to_string(),
            media_base_url: "/media".to_string(),
        };
        let state = Arc::new(AppState { config: Arc::new(config), catalog });
        let app = crate::app(state.clone())
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
        (state, app)
    }
}

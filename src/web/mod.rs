//! HTTP API
//!
//! JSON endpoints for hosts, musics, program details and radio programs,
//! all wrapped in the [`ApiResponse`] envelope. `handlers` holds one module
//! per resource, `responses` the envelope and the error-to-status mapping,
//! `middleware` the per-request logging.

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::{IpAddr, SocketAddr};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{
    config::{Config, WebConfig},
    database::Database,
    repositories::{HostRepository, MusicRepository, ProgramDetailsRepository},
    services::{
        EntityService, HostService, MusicService, ProgramDetailsService, SqliteRadioProgramService,
    },
};

pub mod handlers;
pub mod middleware;
pub mod responses;

pub use responses::{handle_error, handle_result, ApiResponse};

/// Router bound to the configured listen address
pub struct WebServer {
    router: Router,
    bind: SocketAddr,
}

fn listen_addr(web: &WebConfig) -> Result<SocketAddr> {
    let ip: IpAddr = web
        .host
        .parse()
        .with_context(|| format!("invalid listen address '{}'", web.host))?;
    Ok(SocketAddr::new(ip, web.port))
}

impl WebServer {
    pub fn new(config: &Config, database: Database) -> Result<Self> {
        Ok(Self {
            router: create_router(AppState::new(database)),
            bind: listen_addr(&config.web)?,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Serve until Ctrl-C
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .with_context(|| format!("binding {}", self.bind))?;
        info!("Accepting connections on {}", listener.local_addr()?);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutdown requested");
            })
            .await?;
        Ok(())
    }
}

/// Create the router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api_v1_routes())
        // outermost layer runs first
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(middleware::request_logging_middleware))
        .with_state(state)
}

fn api_v1_routes() -> Router<AppState> {
    use handlers::{hosts, musics, program_details, radio_programs};

    Router::new()
        // Hosts
        .route("/hosts", get(hosts::list_hosts).post(hosts::create_host))
        .route("/hosts/:id", get(hosts::get_host).delete(hosts::delete_host))
        // Musics
        .route("/musics", get(musics::list_musics).post(musics::create_music))
        .route("/musics/:id", get(musics::get_music).delete(musics::delete_music))
        // Program details
        .route(
            "/program-details",
            get(program_details::list_program_details).post(program_details::create_program_details),
        )
        .route(
            "/program-details/:id",
            get(program_details::get_program_details).delete(program_details::delete_program_details),
        )
        // Radio programs
        .route(
            "/radio-programs",
            get(radio_programs::list_radio_programs).post(radio_programs::create_radio_program),
        )
        .route("/radio-programs/on-air", get(radio_programs::list_on_air))
        .route(
            "/radio-programs/:id",
            get(radio_programs::get_radio_program)
                .put(radio_programs::update_radio_program)
                .delete(radio_programs::delete_radio_program),
        )
        .route(
            "/radio-programs/:id/musics",
            post(radio_programs::add_music_to_radio_program),
        )
}

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub hosts: HostService,
    pub musics: MusicService,
    pub program_details: ProgramDetailsService,
    pub radio_programs: SqliteRadioProgramService,
}

impl AppState {
    pub fn new(database: Database) -> Self {
        Self {
            hosts: EntityService::new(HostRepository::new(database.pool())),
            musics: EntityService::new(MusicRepository::new(database.pool())),
            program_details: EntityService::new(ProgramDetailsRepository::new(database.pool())),
            radio_programs: SqliteRadioProgramService::from_database(&database),
            database,
        }
    }
}

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{routing::get, Router};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;

mod email;
mod error;
mod export;
mod generator;
mod models;
mod narrative;
mod render;
mod routes;
mod scheduler;
mod store;
#[cfg(test)]
mod testing;
mod trends;

use crate::email::{Notifier, ResendMailer};
use crate::export::LocalExporter;
use crate::generator::ReportService;
use crate::store::{DataStore, PgStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub reports: Arc<ReportService>,
    pub notifier: Arc<Notifier>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    store::init_db(&pool).await?;

    let resend_api_key = env::var("RESEND_API_KEY")?;
    let report_dir = env::var("REPORT_DIR").unwrap_or_else(|_| "reports".into());
    let base_url =
        env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "https://vitalsignguardian.com".into());

    let store: Arc<dyn DataStore> = Arc::new(PgStore::new(pool));
    let notifier = Arc::new(Notifier::new(
        Arc::new(ResendMailer::new(resend_api_key)),
        base_url,
    ));
    let reports = Arc::new(ReportService::new(
        store.clone(),
        Arc::new(LocalExporter::new(report_dir)),
        notifier.clone(),
    ));

    let state = AppState {
        store,
        reports,
        notifier,
    };

    let app = Router::new()
        .merge(routes::reports::routes(state.clone()))
        .merge(routes::notifications::routes(state))
        .route("/health", get(|| async { "✅ Backend up" }));

    let addr = SocketAddr::from(([0, 0, 0, 0], 3050));
    tracing::info!("🧠 Report service running at {}", addr);

    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}

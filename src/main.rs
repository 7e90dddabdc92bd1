//! storefront server binary

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use storefront::config::Settings;
use storefront::email::{self, EmailSender};
use storefront::jobs::ExpirySweeper;
use storefront::{observability, router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init()?;

    let settings = Settings::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let sender: Arc<dyn EmailSender> = Arc::from(email::backend_from(&settings.email));
    let state = AppState::new(settings, pool, sender)?;

    if state.settings().scheduler.enabled {
        let sweeper = ExpirySweeper::from_settings(&state.settings().scheduler)?;
        tokio::spawn(sweeper.run());
    }

    let addr = state.settings().server.bind_addr();
    let app = router::build(state);

    tracing::info!(%addr, "storefront listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

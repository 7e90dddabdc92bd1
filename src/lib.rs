//! storefront: a small e-commerce/CMS backend
//!
//! JSON HTTP API for a storefront site: OAuth login against a third-party
//! provider, user profiles, shopping carts, orders with an expiry sweeper,
//! a product/service catalog, blog/project content with hosted images,
//! quotation requests, a visitor counter and admin reports.
//!
//! # Architecture
//!
//! Every route handler follows the same shape: validate the typed request,
//! run one or two queries against the shared [`sqlx::PgPool`], map failures
//! into [`error::AppError`], return JSON. Outbound calls (OAuth provider,
//! image host, email provider) live behind small clients in [`oauth`],
//! [`images`] and [`email`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use storefront::{config::Settings, email, state::AppState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     storefront::observability::init()?;
//!
//!     let settings = Settings::load()?;
//!     let pool = sqlx::PgPool::connect(&settings.database.url).await?;
//!     sqlx::migrate!("./migrations").run(&pool).await?;
//!
//!     let sender = email::backend_from(&settings.email);
//!     let state = AppState::new(settings, pool, Arc::from(sender))?;
//!     let app = storefront::router::build(state.clone());
//!
//!     let listener = tokio::net::TcpListener::bind(state.settings().server.bind_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod handlers;
pub mod images;
pub mod jobs;
pub mod models;
pub mod oauth;
pub mod observability;
pub mod router;
pub mod state;

#[cfg(test)]
pub mod testing;

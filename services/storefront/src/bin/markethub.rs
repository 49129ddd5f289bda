//! services/storefront/src/bin/markethub.rs
//!
//! Boots the client state against the configured API, loads the catalog and
//! reports what is persisted, then tears everything down.

use storefront_lib::{config::Config, error::ClientError, state::AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting MarketHub client...");

    // --- 2. Build the Client State ---
    let app = AppState::init(&config)?;

    // --- 3. Load the Catalog ---
    let products = app.catalog.products().await;
    info!(count = products.len(), "Catalog loaded");

    // --- 4. Report Persisted State ---
    match app.session.current_user() {
        Some(user) => info!(username = %user.username, role = ?user.role, "Active session"),
        None => info!("No active session"),
    }
    let badges = *app.badges().borrow();
    info!(
        cart_lines = badges.cart_lines,
        wishlist = badges.wishlist,
        subtotal = app.cart.subtotal(),
        "Cart state"
    );

    app.shutdown().await;
    Ok(())
}

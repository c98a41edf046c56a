mod app;
mod auth;
mod categories;
mod config;
mod error;
mod state;
mod users;
mod uuid_bin;
mod vendors;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "farmers_market=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = state::AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&state.db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    if let (Some(email), Some(password)) = (
        state.config.bootstrap_email.clone(),
        state.config.bootstrap_password.clone(),
    ) {
        users::store::ensure_bootstrap_user(state.users.as_ref(), &email, &password).await?;
    }

    let app = app::build_app(state);
    app::serve(app).await
}

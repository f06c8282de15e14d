use pricewise::{app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "pricewise=debug,axum=info,tower_http=info".to_string());
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

    let app_state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    tracing::info!(
        distance_weight = app_state.options.distance_weight,
        best_value_radius_km = app_state.options.best_value_radius_km,
        "comparison options loaded"
    );
    tracing::info!(
        freshness = %app_state.location.freshness,
        timeout = ?app_state.location.timeout,
        max_failures = app_state.location.max_failures,
        "location policy loaded"
    );

    app::serve(app::build_app(app_state)).await
}

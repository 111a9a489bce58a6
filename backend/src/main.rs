use std::sync::Arc;
use backend::{build_rocket, config::Config, moderator_from_config, queries::PgStore};
use shuttle_runtime::CustomError;
use sqlx::PgPool;
use tracing::info;

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🚀 Starting Idea Poll server");

    let config = Config::from_secrets(&secret_store);

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(CustomError::new)?;

    info!("📋 Migrations complete");

    let store = Arc::new(PgStore::new(pool));
    let rocket = build_rocket(store, moderator_from_config(&config), &config);

    Ok(rocket.into())
}

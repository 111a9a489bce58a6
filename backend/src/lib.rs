pub mod config;
pub mod processor;
pub mod routes;
pub mod store;
pub mod queries;
pub mod moderation;
pub mod cors;
pub mod error;
pub mod utils;
pub mod rate_limiter;
pub mod catchers;
pub use shared::user_info;
pub use shared::{models::*, error::*, user_info::*};

use std::sync::Arc;
use rocket::{catchers, routes, Build, Rocket};

use config::Config;
use moderation::{LocalModerator, ModerationGate, Moderator, PerspectiveModerator};
use processor::PollProcessor;
use rate_limiter::RateLimiter;
use routes::AppState;
use store::PollStore;

pub fn moderator_from_config(config: &Config) -> Arc<dyn Moderator> {
    match &config.perspective_api_key {
        Some(key) => Arc::new(PerspectiveModerator::new(config.perspective_url.clone(), key.clone())),
        None => Arc::new(LocalModerator),
    }
}

/// Assembles the HTTP service around `store`.
pub fn build_rocket(store: Arc<dyn PollStore>, moderator: Arc<dyn Moderator>, config: &Config) -> Rocket<Build> {
    let gate = ModerationGate::new(moderator, config.toxicity_threshold);
    let processor = PollProcessor::new(store, gate, config.vote_max_attempts)
        .with_poll_limiter(RateLimiter::new(config.create_poll_limit, config.create_poll_window_minutes));

    rocket::build()
        .attach(cors::CORS::new(config.allowed_origin.clone()))
        .manage(AppState { processor })
        .mount(
            "/api",
            routes![
                routes::list_polls,
                routes::get_poll,
                routes::create_poll,
                routes::cast_vote,
                routes::all_options,
            ],
        )
        .register(
            "/",
            catchers![
                catchers::bad_request,
                catchers::unauthorized,
                catchers::not_found,
                catchers::conflict,
                catchers::unprocessable,
                catchers::too_many_requests,
                catchers::internal_error,
            ],
        )
}

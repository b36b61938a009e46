pub mod config;
pub mod cors;
pub mod logic;
pub mod routes;
pub mod ticker;

use std::sync::Arc;

use dashmap::DashMap;
use rocket::{
    Build, Rocket,
    fairing::{Fairing, Info, Kind},
    routes,
};
use tracing::{info, warn};

use crate::{
    config::ServerConfig,
    cors::create_cors,
    logic::Games,
    routes::{create_game, load_game, save_game, websocket_handler},
    ticker::start_ticker,
};

struct TickerFairing;

#[rocket::async_trait]
impl Fairing for TickerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Game Ticker",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        match (rocket.state::<Games>(), rocket.state::<ServerConfig>()) {
            (Some(games), Some(config)) => {
                info!("Starting ticker for game management");
                tokio::spawn(start_ticker(games.clone(), config.clone()));
            }
            _ => warn!("Failed to get games state for the ticker"),
        }
        Ok(rocket)
    }
}

pub fn build(config: ServerConfig) -> Rocket<Build> {
    let games: Games = Arc::new(DashMap::new());

    let mut rocket = rocket::build();
    match create_cors(&config) {
        Ok(cors) => rocket = rocket.attach(cors),
        Err(error) => warn!("CORS disabled, invalid configuration: {}", error),
    }

    rocket
        .attach(TickerFairing)
        .manage(games)
        .manage(config)
        .mount(
            "/",
            routes![create_game, websocket_handler, save_game, load_game],
        )
}

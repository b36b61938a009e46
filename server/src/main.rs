use minesweeper_server::config::ServerConfig;
use rocket::{Build, Rocket};
use tracing::info;

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    tracing_subscriber::fmt::init();
    info!("🚀 Starting Minesweeper server");

    let config = ServerConfig::from_env();
    info!("📊 Loaded configuration: {:?}", config);

    let rocket = minesweeper_server::build(config);
    info!("📡 Endpoints: POST /create, GET /ws, GET /games/<id>/save, POST /games/<id>/load");

    rocket
}

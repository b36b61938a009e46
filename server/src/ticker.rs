use std::time::{Duration, Instant};

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::{config::ServerConfig, logic::Games};

/// Frame loop for every hosted game: ticks each engine once per interval and
/// periodically drops games nobody has touched for a while.
pub async fn start_ticker(games: Games, config: ServerConfig) {
    let mut interval = time::interval(config.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_cleanup = Instant::now();

    info!(
        "Started game ticker: frame every {:?}, cleanup every {:?}, inactive timeout: {:?}",
        config.tick_interval, config.cleanup_interval, config.inactive_timeout
    );

    loop {
        interval.tick().await;
        tick_games(&games).await;

        if last_cleanup.elapsed() >= config.cleanup_interval {
            cleanup_games(&games, config.inactive_timeout);
            last_cleanup = Instant::now();
        }
    }
}

async fn tick_games(games: &Games) {
    let handles: Vec<_> = games.iter().map(|entry| entry.value().clone()).collect();

    for game in handles {
        // Games locked by a player action get their frame on the next tick.
        if let Ok(mut game) = game.try_lock() {
            game.tick().await;
        }
    }
}

fn cleanup_games(games: &Games, inactive_timeout: Duration) {
    let mut games_to_remove = Vec::new();

    for entry in games.iter() {
        if let Ok(game) = entry.value().try_lock() {
            if game.should_cleanup(inactive_timeout) {
                games_to_remove.push(entry.key().clone());
            }
        }
    }

    let removed_count = games_to_remove.len();
    for game_id in games_to_remove {
        games.remove(&game_id);
        debug!("Cleaned up game: {}", game_id);
    }

    if removed_count > 0 {
        info!("Cleaned up {} inactive games", removed_count);
    }
}

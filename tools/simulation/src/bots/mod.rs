//! Built-in competitor population
//!
//! Bots are ordinary strategies. Their randomness is derived from
//! `(seed, tick)` on every call, so a bot holds no mutable state and the
//! same seed replays the same quotes.

pub mod liquidity;
pub mod noise;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use types::ids::{CompetitorId, Tick};

use crate::config::BotConfig;
use crate::strategy::Strategy;

pub use liquidity::{LiquidityBot, LiquidityBotConfig};
pub use noise::{NoiseTrader, NoiseTraderConfig};

const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// RNG for one bot at one tick
pub(crate) fn tick_rng(seed: u64, tick: Tick) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed ^ tick.value().wrapping_add(1).wrapping_mul(SEED_MIX))
}

/// Instantiate the configured bots, each with its own seed derived from
/// the master seed and its position in the list
pub fn build_bots(bots: &[BotConfig], seed: u64) -> Vec<(CompetitorId, Arc<dyn Strategy>)> {
    bots.iter()
        .enumerate()
        .map(|(i, bot)| {
            let bot_seed = seed.wrapping_add((i as u64 + 1).wrapping_mul(SEED_MIX)).rotate_left(17);
            let id = CompetitorId::new(bot.name());
            let strategy: Arc<dyn Strategy> = match bot {
                BotConfig::Liquidity(c) => Arc::new(LiquidityBot::new(c.clone(), bot_seed)),
                BotConfig::Noise(c) => Arc::new(NoiseTrader::new(c.clone(), bot_seed)),
            };
            (id, strategy)
        })
        .collect()
}

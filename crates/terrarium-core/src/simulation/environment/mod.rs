//! Environment driver
//!
//! Publishes the day phase, wind, clouds, rain and temperature that physics and
//! biology read during the rest of the tick.

mod day_cycle;
mod temperature;
mod weather;

pub use day_cycle::DayCycle;
pub use temperature::TemperatureModel;
pub use weather::{Weather, cloud_rows};

use crate::config::EnvironmentConfig;
use crate::world::{WorldRng, WorldState};

pub struct Environment;

impl Environment {
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        config: &EnvironmentConfig,
        rng: &mut R,
    ) {
        DayCycle::advance(&mut world.forcing, config);
        let drops = Weather::update(world, config, rng);
        TemperatureModel::update(world, config);

        log::trace!(
            "Environment tick {}: phase={:.3} daylight={:.2} raining={} drops={}",
            world.tick(),
            world.forcing.phase,
            world.forcing.daylight,
            world.forcing.raining,
            drops
        );
    }
}

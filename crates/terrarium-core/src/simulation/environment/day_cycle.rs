use crate::config::EnvironmentConfig;
use crate::world::Forcing;
use crate::world::forcing::daylight_for_phase;

pub struct DayCycle;

impl DayCycle {
    /// Advance the day phase by one tick and recompute daylight
    pub fn advance(forcing: &mut Forcing, config: &EnvironmentConfig) {
        let step = 1.0 / config.day_length.max(1) as f32;
        forcing.phase = (forcing.phase + step).fract();
        forcing.daylight = daylight_for_phase(forcing.phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_day_returns_to_start() {
        let config = EnvironmentConfig {
            day_length: 100,
            ..EnvironmentConfig::default()
        };
        let mut forcing = Forcing::new(8, 8, 0.0, 12.0);
        for _ in 0..50 {
            DayCycle::advance(&mut forcing, &config);
        }
        assert!((forcing.phase - 0.5).abs() < 1e-3);
        assert!(forcing.daylight > 0.99);

        for _ in 0..50 {
            DayCycle::advance(&mut forcing, &config);
        }
        assert!(forcing.phase < 1e-3 || forcing.phase > 1.0 - 1e-3);
        assert!(forcing.daylight < 0.01);
    }

    #[test]
    fn test_phase_stays_in_range() {
        let config = EnvironmentConfig {
            day_length: 7,
            ..EnvironmentConfig::default()
        };
        let mut forcing = Forcing::new(8, 8, 0.9, 12.0);
        for _ in 0..100 {
            DayCycle::advance(&mut forcing, &config);
            assert!((0.0..1.0).contains(&forcing.phase));
            assert!((0.0..=1.0).contains(&forcing.daylight));
        }
    }
}

//! Stuck-counter escalation
//!
//! Cells that fail to move bump a saturating counter in their metadata. The
//! ladder maps that counter to progressively more forceful behavior.

use crate::config::PhysicsConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Escalation {
    Normal,
    /// Always attempt horizontal spread
    Loosen,
    /// Move into any free neighbor
    Force,
    /// Give up and change type
    Convert,
}

/// Thresholds, checked from the top
#[derive(Clone, Debug)]
pub struct StuckLadder {
    steps: Vec<(u8, Escalation)>,
}

impl StuckLadder {
    pub fn new(mut steps: Vec<(u8, Escalation)>) -> Self {
        steps.sort_by(|a, b| b.0.cmp(&a.0));
        Self { steps }
    }

    /// Ladder for water cells
    pub fn fluid(config: &PhysicsConfig) -> Self {
        Self::new(vec![
            (config.loosen_threshold, Escalation::Loosen),
            (config.force_threshold, Escalation::Force),
            (config.convert_threshold, Escalation::Convert),
        ])
    }

    /// Ladder for falling solids
    pub fn gravity(config: &PhysicsConfig) -> Self {
        Self::new(vec![(config.gravity_force_threshold, Escalation::Force)])
    }

    pub fn action(&self, stuck: u8) -> Escalation {
        self.steps
            .iter()
            .find(|(threshold, _)| stuck >= *threshold)
            .map(|(_, escalation)| *escalation)
            .unwrap_or(Escalation::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluid_ladder() {
        let ladder = StuckLadder::fluid(&PhysicsConfig::default());
        assert_eq!(ladder.action(0), Escalation::Normal);
        assert_eq!(ladder.action(3), Escalation::Normal);
        assert_eq!(ladder.action(4), Escalation::Loosen);
        assert_eq!(ladder.action(8), Escalation::Force);
        assert_eq!(ladder.action(59), Escalation::Force);
        assert_eq!(ladder.action(60), Escalation::Convert);
        assert_eq!(ladder.action(255), Escalation::Convert);
    }

    #[test]
    fn test_gravity_ladder() {
        let ladder = StuckLadder::gravity(&PhysicsConfig::default());
        assert_eq!(ladder.action(5), Escalation::Normal);
        assert_eq!(ladder.action(6), Escalation::Force);
        assert!(ladder.action(200) < Escalation::Convert);
    }

    #[test]
    fn test_escalation_ordering() {
        assert!(Escalation::Normal < Escalation::Loosen);
        assert!(Escalation::Loosen < Escalation::Force);
        assert!(Escalation::Force < Escalation::Convert);
    }
}

//! Z stop generation for the alternating sweep.

use herbot_common::config::ScanConfig;

/// Direction of one traversal of the Z range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDirection {
    Up,
    Down,
}

impl SweepDirection {
    #[inline]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// Z range and spacing of the stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPlan {
    pub z_min_mm: i32,
    pub z_max_mm: i32,
    pub z_step_mm: u32,
}

impl SweepPlan {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            z_min_mm: config.z_min_mm,
            z_max_mm: config.z_max_mm,
            z_step_mm: config.z_step_mm,
        }
    }

    /// Stops of one pass. Up walks `z_min, z_min+step, … ≤ z_max`; down walks
    /// `z_max, z_max-step, … ≥ z_min`, so both ends of the range are always
    /// reached from the pass that starts there.
    pub fn pass(&self, direction: SweepDirection) -> Vec<i32> {
        if self.z_step_mm == 0 || self.z_max_mm < self.z_min_mm {
            return Vec::new();
        }
        let step = self.z_step_mm as usize;
        match direction {
            SweepDirection::Up => (self.z_min_mm..=self.z_max_mm).step_by(step).collect(),
            SweepDirection::Down => (self.z_min_mm..=self.z_max_mm)
                .rev()
                .step_by(step)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(z_min_mm: i32, z_max_mm: i32, z_step_mm: u32) -> SweepPlan {
        SweepPlan {
            z_min_mm,
            z_max_mm,
            z_step_mm,
        }
    }

    #[test]
    fn default_passes() {
        let plan = SweepPlan::from_config(&ScanConfig::default());
        assert_eq!(
            plan.pass(SweepDirection::Up),
            vec![0, 100, 200, 300, 400, 500, 600, 700]
        );
        assert_eq!(
            plan.pass(SweepDirection::Down),
            vec![700, 600, 500, 400, 300, 200, 100, 0]
        );
    }

    #[test]
    fn uneven_range_starts_each_pass_at_its_end() {
        let plan = plan(0, 250, 100);
        assert_eq!(plan.pass(SweepDirection::Up), vec![0, 100, 200]);
        assert_eq!(plan.pass(SweepDirection::Down), vec![250, 150, 50]);
    }

    #[test]
    fn single_stop_range() {
        let plan = plan(300, 300, 50);
        assert_eq!(plan.pass(SweepDirection::Up), vec![300]);
        assert_eq!(plan.pass(SweepDirection::Down), vec![300]);
    }

    #[test]
    fn degenerate_plans_are_empty() {
        assert!(plan(0, 100, 0).pass(SweepDirection::Up).is_empty());
        assert!(plan(200, 100, 10).pass(SweepDirection::Down).is_empty());
    }

    #[test]
    fn direction_alternates() {
        assert_eq!(SweepDirection::Up.flipped(), SweepDirection::Down);
        assert_eq!(SweepDirection::Down.flipped().flipped(), SweepDirection::Down);
    }
}

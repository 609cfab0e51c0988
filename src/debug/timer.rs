use instant::Instant;

/// Which phase of the simulation tick is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SystemPhase {
    SpatialSync = 0,
    Perception = 1,
    Behavior = 2,
    Movement = 3,
}

impl SystemPhase {
    pub const ALL: [SystemPhase; 4] = [
        Self::SpatialSync,
        Self::Perception,
        Self::Behavior,
        Self::Movement,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::SpatialSync => "Spatial",
            Self::Perception => "Perception",
            Self::Behavior => "Behavior",
            Self::Movement => "Movement",
        }
    }
}

/// Per-system timing with exponential moving average smoothing.
pub struct SystemTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; 4],
    /// Timestamp when `begin()` was called.
    start: Instant,
}

const EMA_ALPHA: f64 = 0.1;

impl Default for SystemTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; 4],
            start: Instant::now(),
        }
    }

    /// Call before a system runs.
    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Call after a system finishes. Records elapsed time for `phase`.
    pub fn end(&mut self, phase: SystemPhase) {
        let elapsed_us = self.start.elapsed().as_secs_f64() * 1_000_000.0;
        self.record(phase, elapsed_us);
    }

    fn record(&mut self, phase: SystemPhase, elapsed_us: f64) {
        let idx = phase as usize;
        self.durations_us[idx] =
            self.durations_us[idx] * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    pub fn get(&self, phase: SystemPhase) -> f64 {
        self.durations_us[phase as usize]
    }

    /// Sum of all phase durations (microseconds).
    pub fn total_us(&self) -> f64 {
        self.durations_us.iter().sum()
    }

    /// One-line breakdown for the periodic stats log.
    pub fn summary(&self) -> String {
        SystemPhase::ALL
            .iter()
            .map(|&phase| format!("{} {:.0}us", phase.label(), self.get(phase)))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_moves_toward_samples() {
        let mut timers = SystemTimers::new();
        timers.record(SystemPhase::Perception, 100.0);
        assert!((timers.get(SystemPhase::Perception) - 10.0).abs() < 1e-9);
        timers.record(SystemPhase::Perception, 100.0);
        assert!((timers.get(SystemPhase::Perception) - 19.0).abs() < 1e-9);
        assert_eq!(timers.get(SystemPhase::Movement), 0.0);
        assert!((timers.total_us() - 19.0).abs() < 1e-9);
    }

    #[test]
    fn summary_names_every_phase() {
        let summary = SystemTimers::new().summary();
        for phase in SystemPhase::ALL {
            assert!(summary.contains(phase.label()));
        }
    }
}

use std::time::{Duration, Instant};

/// Counts frames per simulated second and how long they took on the wall clock.
pub struct FpsCounter {
    count: u32,
    simulated: f32,
    last_reset: Instant,
}

impl Default for FpsCounter {
    fn default() -> Self {
        FpsCounter {
            count: 0,
            simulated: 0.0,
            last_reset: Instant::now(),
        }
    }
}

#[derive(Debug)]
pub struct Stats {
    pub frames: u32,
    pub time_per_frame: Duration,
}

impl FpsCounter {
    /// Records a frame that advanced the simulation by `dt` seconds. Yields stats once a full simulated second has
    /// gone by.
    pub fn on_frame(&mut self, dt: f32) -> Option<Stats> {
        self.count += 1;
        self.simulated += dt;

        if self.simulated < 1.0 {
            return None;
        }

        let stats = Stats {
            frames: self.count,
            time_per_frame: self.last_reset.elapsed() / self.count,
        };

        self.count = 0;
        self.simulated -= 1.0;
        self.last_reset = Instant::now();

        Some(stats)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reports_each_simulated_second() {
        let mut counter = FpsCounter::default();

        for _ in 0..3 {
            assert!(counter.on_frame(0.25).is_none());
        }
        assert_eq!(counter.on_frame(0.25).unwrap().frames, 4);

        assert!(counter.on_frame(0.5).is_none());
        assert_eq!(counter.on_frame(0.5).unwrap().frames, 2);
    }
}

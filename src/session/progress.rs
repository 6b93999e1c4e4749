use crate::protocol::ProgressStart;

/// Progress of the currently-reporting analysis layer
///
/// The backend does not guarantee it will send exactly `total` update
/// messages (items may be skipped or merged server-side), so progress is a
/// running fractional sum with the display clamped, never an exact count.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerProgress {
    layer: u32,
    total: u32,
    accumulated: f64,
}

impl LayerProgress {
    /// Start tracking a new layer with accumulation reset to zero
    pub fn new(start: ProgressStart) -> Self {
        Self {
            layer: start.layer,
            total: start.total,
            accumulated: 0.0,
        }
    }

    /// Position of the layer in the traversal (1-based)
    pub fn layer(&self) -> u32 {
        self.layer
    }

    /// Add completed work units.
    ///
    /// Updates arriving with a zero total, or carrying negative or
    /// non-finite unit counts, are stray messages and are ignored.
    pub fn apply(&mut self, units: f64) {
        if self.total == 0 || !units.is_finite() || units < 0.0 {
            return;
        }
        self.accumulated += units / self.total as f64;
    }

    /// Displayed percentage: `min(ceil(accumulated * 100), 100)`
    pub fn percent(&self) -> u8 {
        let percent = (self.accumulated * 100.0).ceil();
        percent.clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(layer: u32, total: u32) -> LayerProgress {
        LayerProgress::new(ProgressStart { layer, total })
    }

    #[test]
    fn test_four_unit_updates_reach_exactly_100() {
        let mut progress = start(1, 4);
        for _ in 0..4 {
            progress.apply(1.0);
        }
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_percent_rounds_up() {
        let mut progress = start(1, 3);
        progress.apply(1.0);
        // 1/3 => 33.33..% rounds up to 34.
        assert_eq!(progress.percent(), 34);
    }

    #[test]
    fn test_overshoot_is_clamped() {
        let mut progress = start(1, 2);
        for _ in 0..5 {
            progress.apply(1.0);
        }
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_percent_never_decreases() {
        let mut progress = start(1, 7);
        let mut last = progress.percent();
        for units in [1.0, 0.5, 2.0, 0.0, 1.5, 3.0, 1.0] {
            progress.apply(units);
            let current = progress.percent();
            assert!(current >= last);
            assert!(current <= 100);
            last = current;
        }
    }

    #[test]
    fn test_stray_updates_ignored() {
        let mut progress = start(1, 4);
        progress.apply(-1.0);
        progress.apply(f64::NAN);
        progress.apply(f64::INFINITY);
        assert_eq!(progress.percent(), 0);
    }

    #[test]
    fn test_zero_total_never_advances() {
        let mut progress = start(1, 0);
        progress.apply(1.0);
        assert_eq!(progress.percent(), 0);
    }

    #[test]
    fn test_new_layer_resets_accumulation() {
        let mut progress = start(1, 2);
        progress.apply(2.0);
        assert_eq!(progress.percent(), 100);

        let fresh = LayerProgress::new(ProgressStart { layer: 2, total: 2 });
        assert_eq!(fresh.percent(), 0);
        assert_eq!(fresh.layer(), 2);
    }
}

/// How often the callback fires while the combo stays held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Retrigger {
    /// Fire once when both buttons transition into held-together.
    #[default]
    RisingEdge,
    /// Fire on every poll tick where both buttons are held.
    EveryTick,
}

/// Per-device combo state evaluated once per poll tick.
#[derive(Debug, Default)]
pub struct ComboDetector {
    held: bool,
}

impl ComboDetector {
    /// Feeds one tick of button state and reports whether the callback
    /// should fire.
    pub fn evaluate(
        &mut self,
        hotkey: bool,
        start: bool,
        retrigger: Retrigger,
    ) -> bool {
        let both = hotkey && start;
        let fire = match retrigger {
            Retrigger::RisingEdge => both && !self.held,
            Retrigger::EveryTick => both,
        };
        self.held = both;
        fire
    }

    pub fn reset(&mut self) {
        self.held = false;
    }
}

/// Bounded pool of detector state buffers.
///
/// Buffers are recycled when sessions close to avoid allocation churn on the
/// poll path; returning a buffer to a full pool drops it.
pub struct DetectorPool {
    free: Vec<ComboDetector>,
    capacity: usize,
}

impl DetectorPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns a reset buffer, allocating only when the pool is empty.
    pub fn get(&mut self) -> ComboDetector {
        let mut detector = self.free.pop().unwrap_or_default();
        detector.reset();
        detector
    }

    pub fn put(&mut self, detector: ComboDetector) {
        if self.free.len() < self.capacity {
            self.free.push(detector);
        }
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rising_edge_fires_once_per_hold() {
        let mut detector = ComboDetector::default();
        assert!(!detector.evaluate(true, false, Retrigger::RisingEdge));
        assert!(detector.evaluate(true, true, Retrigger::RisingEdge));
        assert!(!detector.evaluate(true, true, Retrigger::RisingEdge));
        assert!(!detector.evaluate(false, true, Retrigger::RisingEdge));
        assert!(detector.evaluate(true, true, Retrigger::RisingEdge));
    }

    #[test]
    fn every_tick_fires_while_held() {
        let mut detector = ComboDetector::default();
        assert!(detector.evaluate(true, true, Retrigger::EveryTick));
        assert!(detector.evaluate(true, true, Retrigger::EveryTick));
        assert!(!detector.evaluate(false, true, Retrigger::EveryTick));
    }

    #[test]
    fn single_button_never_fires() {
        let mut detector = ComboDetector::default();
        for retrigger in [Retrigger::RisingEdge, Retrigger::EveryTick] {
            assert!(!detector.evaluate(true, false, retrigger));
            assert!(!detector.evaluate(false, true, retrigger));
            assert!(!detector.evaluate(false, false, retrigger));
        }
    }

    #[test]
    fn reset_rearms_the_edge() {
        let mut detector = ComboDetector::default();
        assert!(detector.evaluate(true, true, Retrigger::RisingEdge));
        detector.reset();
        assert!(detector.evaluate(true, true, Retrigger::RisingEdge));
    }

    #[test]
    fn pool_is_bounded() {
        let mut pool = DetectorPool::new(2);
        assert_eq!(pool.available(), 0);
        pool.put(ComboDetector::default());
        pool.put(ComboDetector::default());
        pool.put(ComboDetector::default());
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn pooled_buffer_comes_back_reset() {
        let mut pool = DetectorPool::new(2);
        let mut used = pool.get();
        assert!(used.evaluate(true, true, Retrigger::RisingEdge));
        pool.put(used);
        let mut recycled = pool.get();
        assert!(recycled.evaluate(true, true, Retrigger::RisingEdge));
    }
}

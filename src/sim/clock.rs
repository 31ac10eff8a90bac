/// A market clock that counts ticks up to a fixed horizon.
///
/// # Examples
///
/// ```
/// use tariff_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(3);
/// assert_eq!(clock.now(), 0);
/// assert_eq!(clock.tick(), Some(0));
/// assert_eq!(clock.now(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    /// Next tick to hand out
    current: usize,
    /// Tick count at which the clock stops
    total: usize,
}

impl Clock {
    /// Creates a clock that will hand out ticks `0..total`.
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The tick to execute (starting from 0)
    /// * `None` - If the horizon has been reached
    pub fn tick(&mut self) -> Option<usize> {
        if self.current < self.total {
            let tick = self.current;
            self.current += 1;
            Some(tick)
        } else {
            None
        }
    }

    /// Number of ticks handed out so far.
    pub fn now(&self) -> usize {
        self.current
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick() {
        let mut clock = Clock::new(2);
        assert_eq!(clock.tick(), Some(0));
        assert_eq!(clock.tick(), Some(1));
        assert_eq!(clock.tick(), None);
        assert!(clock.is_finished());
    }

    #[test]
    fn test_monotonic_now() {
        let mut clock = Clock::new(5);
        let mut last = clock.now();
        while clock.tick().is_some() {
            assert!(clock.now() > last);
            last = clock.now();
        }
        assert_eq!(last, 5);
    }

    #[test]
    fn test_empty_clock() {
        let mut clock = Clock::new(0);
        assert!(clock.is_finished());
        assert_eq!(clock.tick(), None);
    }
}

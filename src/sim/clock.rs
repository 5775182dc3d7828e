/// An hour clock that tracks steps over a fixed horizon.
///
/// Each tick yields the hour index together with its calendar position
/// (day index and hour of day), so the driver knows when a new day starts.
///
/// # Examples
///
/// ```
/// use hybrid_dispatch::sim::clock::HourClock;
///
/// let mut clock = HourClock::new(26);
/// let mut midnights = Vec::new();
///
/// clock.run(|tick| {
///     if tick.is_midnight() {
///         midnights.push(tick.hour);
///     }
/// });
/// assert_eq!(midnights, vec![0, 24]);
/// ```
#[derive(Debug, Clone)]
pub struct HourClock {
    /// Next hour to hand out
    current: usize,
    /// Total hours in the horizon
    total: usize,
}

/// Calendar position of one simulated hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub hour: usize,
    pub day: usize,
    pub hour_of_day: u32,
}

impl Tick {
    pub fn at(hour: usize) -> Self {
        Self {
            hour,
            day: hour / 24,
            hour_of_day: (hour % 24) as u32,
        }
    }

    /// First hour of a calendar day.
    pub fn is_midnight(&self) -> bool {
        self.hour_of_day == 0
    }
}

impl HourClock {
    /// Creates a new clock covering `total` hours.
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    /// Advances the clock by one hour.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The hour being entered (starting from 0)
    /// * `None` - If the horizon is exhausted
    pub fn tick(&mut self) -> Option<Tick> {
        if self.current < self.total {
            let tick = Tick::at(self.current);
            self.current += 1;
            Some(tick)
        } else {
            None
        }
    }

    /// Hours not yet handed out.
    pub fn remaining(&self) -> usize {
        self.total - self.current
    }

    /// Runs a function for each remaining hour.
    pub fn run(&mut self, mut f: impl FnMut(Tick)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }
}

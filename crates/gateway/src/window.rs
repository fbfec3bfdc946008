//! Candle aggregation window
//!
//! Bounded, monotonically ordered rolling history of bars for one kline
//! subscription. Each incoming bar resolves to a strict three-way ordering
//! decision against the current last bar; ties favor replacement over
//! append or ignore.

use hermes_core::Bar;
use log::debug;

/// Outcome of applying one incoming bar to the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// First bar accepted into an empty window
    Opened,
    /// Strictly newer bar appended; oldest evicted if over capacity
    Appended,
    /// Same datetime as the last bar: replaced wholesale in place
    Replaced,
    /// Older than the last bar: dropped (duplicate retransmission)
    Ignored,
}

impl WindowEvent {
    /// Whether the subscription handler should be notified
    pub fn notifies(&self) -> bool {
        !matches!(self, WindowEvent::Ignored)
    }
}

/// Rolling bar window with a fixed capacity.
///
/// Invariants: bar datetimes are strictly increasing, the length never
/// exceeds capacity, and the last element is the most recently accepted
/// timestamp.
#[derive(Debug)]
pub struct CandleWindow {
    bars: Vec<Bar>,
    capacity: usize,
}

impl CandleWindow {
    /// Create an empty window. Capacity is validated at subscribe time;
    /// the window itself assumes it is at least one.
    pub fn new(capacity: usize) -> Self {
        Self {
            bars: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Apply one incoming bar and report the transition taken.
    pub fn apply(&mut self, bar: Bar) -> WindowEvent {
        let last_datetime = match self.bars.last() {
            None => {
                self.bars.push(bar);
                return WindowEvent::Opened;
            }
            Some(last) => last.datetime,
        };

        if bar.datetime > last_datetime {
            self.bars.push(bar);
            if self.bars.len() > self.capacity {
                self.bars.remove(0);
            }
            WindowEvent::Appended
        } else if bar.datetime == last_datetime {
            let last = self.bars.len() - 1;
            self.bars[last] = bar;
            WindowEvent::Replaced
        } else {
            debug!(
                "kline {} predates window tail {}, ignored",
                bar.datetime, last_datetime
            );
            WindowEvent::Ignored
        }
    }

    /// Seed the window from the initial synchronous history fetch.
    ///
    /// Runs every historical bar through [`CandleWindow::apply`], so the
    /// seeded history obeys the same ordering rule as live updates and the
    /// first live bar needs no special case.
    pub fn seed(&mut self, bars: Vec<Bar>) {
        for bar in bars {
            self.apply(bar);
        }
    }
}

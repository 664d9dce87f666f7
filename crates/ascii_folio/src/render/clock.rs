use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Roughly one display refresh at 60 Hz.
pub const REPAINT_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequestId(u64);

type FrameCallback = Box<dyn FnOnce(u64)>;

#[derive(Default)]
struct ClockState {
    tick: u64,
    next_id: u64,
    pending: Vec<(FrameRequestId, FrameCallback)>,
}

/// Single-threaded repaint clock.
///
/// Callbacks requested with [`request_frame`](Self::request_frame) run once,
/// on the next [`advance`](Self::advance). A callback that requests another
/// frame while running is deferred to the following advance, so a loop can
/// never run twice in one tick.
#[derive(Clone, Default)]
pub struct RepaintClock {
    state: Rc<RefCell<ClockState>>,
}

impl RepaintClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_frame(&self, callback: impl FnOnce(u64) + 'static) -> FrameRequestId {
        let mut state = self.state.borrow_mut();
        let id = FrameRequestId(state.next_id);
        state.next_id += 1;
        state.pending.push((id, Box::new(callback)));
        id
    }

    /// Drops a pending callback. Returns `false` if it already ran or was
    /// never scheduled.
    pub fn cancel_frame(&self, id: FrameRequestId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.pending.len();
        state.pending.retain(|(pending, _)| *pending != id);
        state.pending.len() != before
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.state.borrow().tick
    }

    /// Runs one tick and returns how many callbacks fired.
    pub fn advance(&self) -> usize {
        let (tick, due) = {
            let mut state = self.state.borrow_mut();
            state.tick += 1;
            (state.tick, std::mem::take(&mut state.pending))
        };

        let count = due.len();
        for (_, callback) in due {
            callback(tick);
        }
        count
    }
}

/// Wall-clock cadence used when driving a clock in real time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    /// Display repaint cadence.
    #[default]
    Repaint,
    /// Fixed timer, as used by the page overlay.
    Interval { millis: u64 },
}

impl Pacing {
    pub fn interval(self) -> Duration {
        match self {
            Pacing::Repaint => REPAINT_INTERVAL,
            Pacing::Interval { millis } => Duration::from_millis(millis.max(1)),
        }
    }
}

/// Advances `clock` at `pacing` until `duration` has passed or nothing is
/// left to run. Returns the number of ticks.
pub fn drive_for(clock: &RepaintClock, pacing: Pacing, duration: Duration) -> u64 {
    let interval = pacing.interval();
    let start = Instant::now();
    let mut ticks = 0;

    while start.elapsed() < duration && clock.pending() > 0 {
        let frame_start = Instant::now();
        clock.advance();
        ticks += 1;

        if let Some(rest) = interval.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }

    ticks
}

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::clock::{FrameRequestId, RepaintClock};
use super::source::GridSource;
use super::target::DisplayTarget;
use crate::ascii::grid::CharacterGrid;
use crate::image_pipeline::loader::ProduceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// No source attached yet.
    Idle,
    /// Source attached, waiting for the view to become visible once.
    Armed,
    /// Sampling and publishing every tick.
    Running,
    /// Detached. Terminal.
    Stopped,
    /// A placeholder was published after an unrecoverable source error.
    /// Settled; `stop()` still moves it to Stopped.
    Degraded,
}

/// When an attached loop starts ticking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
    /// Start on attach.
    #[default]
    Immediate,
    /// Arm on attach, start on first visibility.
    ViewportLazy,
}

/// Literal text published in place of rendered frames.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placeholders {
    /// Shown once while the source is not ready yet. Empty disables it.
    pub loading: String,
    pub load_failure: String,
    pub pixel_access: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self { loading: "...".into(), load_failure: "[?]".into(), pixel_access: "[ICON]".into() }
    }
}

impl Placeholders {
    /// Text shown for `err`.
    pub fn for_error(&self, err: &ProduceError) -> &str {
        match err {
            ProduceError::NotReady => &self.loading,
            ProduceError::AssetLoad { .. } => &self.load_failure,
            ProduceError::PixelAccess(_) => &self.pixel_access,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoopSettings {
    pub activation: Activation,
    pub placeholders: Placeholders,
}

pub(crate) struct LoopCore {
    state: LoopState,
    settings: LoopSettings,
    source: Option<Box<dyn GridSource>>,
    clock: RepaintClock,
    target: DisplayTarget,
    pending: Option<FrameRequestId>,
    published: bool,
}

/// Creates render loops bound to a clock and a display target.
pub struct RenderLoop;

impl RenderLoop {
    /// A loop in [`LoopState::Idle`]; nothing ticks until a source is attached.
    pub fn new(clock: &RepaintClock, target: &DisplayTarget, settings: LoopSettings) -> RenderHandle {
        let core = LoopCore {
            state: LoopState::Idle,
            settings,
            source: None,
            clock: clock.clone(),
            target: target.clone(),
            pending: None,
            published: false,
        };
        RenderHandle { core: Rc::new(RefCell::new(core)) }
    }

    /// Creates a loop and attaches `source` straight away.
    pub fn start(
        clock: &RepaintClock,
        target: &DisplayTarget,
        settings: LoopSettings,
        source: impl GridSource + 'static,
    ) -> RenderHandle {
        let handle = Self::new(clock, target, settings);
        handle.attach(source);
        handle
    }
}

/// Owner of a running loop. Dropping the handle stops the loop.
pub struct RenderHandle {
    core: Rc<RefCell<LoopCore>>,
}

impl RenderHandle {
    pub fn state(&self) -> LoopState {
        self.core.borrow().state
    }

    /// Attaches the grid source. Only valid from [`LoopState::Idle`]; returns
    /// `false` otherwise.
    pub fn attach(&self, source: impl GridSource + 'static) -> bool {
        let activation = {
            let mut core = self.core.borrow_mut();
            if core.state != LoopState::Idle {
                warn!("ignoring source attach in state {:?}", core.state);
                return false;
            }
            core.source = Some(Box::new(source));
            core.settings.activation
        };

        match activation {
            Activation::Immediate => begin_running(&self.core),
            Activation::ViewportLazy => {
                self.core.borrow_mut().state = LoopState::Armed;
                debug!("render loop armed");
            },
        }
        true
    }

    /// Visibility change reported by the view.
    ///
    /// An armed loop starts on its first visible report. A running loop stops
    /// when hidden and stays stopped.
    pub fn set_visible(&self, visible: bool) {
        let state = self.state();
        match (state, visible) {
            (LoopState::Armed, true) => begin_running(&self.core),
            (LoopState::Running, false) => stop_core(&self.core),
            _ => {},
        }
    }

    /// Cancels the pending tick and releases the source. Idempotent.
    pub fn stop(&self) {
        stop_core(&self.core);
    }
}

impl Drop for RenderHandle {
    fn drop(&mut self) {
        stop_core(&self.core);
    }
}

fn begin_running(core: &Rc<RefCell<LoopCore>>) {
    let target = core.borrow().target.clone();
    target.claim(core);

    core.borrow_mut().state = LoopState::Running;
    debug!("render loop running");
    schedule(core);
}

fn schedule(core: &Rc<RefCell<LoopCore>>) {
    let weak: Weak<RefCell<LoopCore>> = Rc::downgrade(core);
    let clock = core.borrow().clock.clone();
    let id = clock.request_frame(move |tick| {
        if let Some(core) = weak.upgrade() {
            run_tick(&core, tick);
        }
    });
    core.borrow_mut().pending = Some(id);
}

fn run_tick(core: &Rc<RefCell<LoopCore>>, tick: u64) {
    let (outcome, target) = {
        let mut guard = core.borrow_mut();
        guard.pending = None;
        if guard.state != LoopState::Running {
            return;
        }
        let Some(source) = guard.source.as_mut() else {
            return;
        };
        let outcome = source.next_grid(tick);
        (outcome, guard.target.clone())
    };

    let keep_running = match outcome {
        Ok(grid) => {
            core.borrow_mut().published = true;
            target.publish(grid);
            true
        },
        Err(err) if err.is_transient() => {
            let placeholder = {
                let mut guard = core.borrow_mut();
                let text = guard.settings.placeholders.for_error(&err).to_owned();
                if guard.published || text.is_empty() {
                    None
                } else {
                    guard.published = true;
                    Some(CharacterGrid::from_text(&text))
                }
            };
            if let Some(grid) = placeholder {
                target.publish(grid);
            }
            true
        },
        Err(err) => {
            warn!("render loop degraded: {err}");
            let text = {
                let mut guard = core.borrow_mut();
                guard.state = LoopState::Degraded;
                guard.source = None;
                guard.settings.placeholders.for_error(&err).to_owned()
            };
            target.publish(CharacterGrid::from_text(&text));
            false
        },
    };

    // The listener may have stopped the loop while publishing.
    if keep_running && core.borrow().state == LoopState::Running {
        schedule(core);
    }
}

pub(crate) fn stop_core(core: &Rc<RefCell<LoopCore>>) {
    let mut guard = core.borrow_mut();
    if guard.state == LoopState::Stopped {
        return;
    }

    if let Some(id) = guard.pending.take() {
        guard.clock.cancel_frame(id);
    }
    guard.source = None;
    debug!("render loop stopped from {:?}", guard.state);
    guard.state = LoopState::Stopped;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    impl GridSource for Counter {
        fn next_grid(&mut self, tick: u64) -> Result<CharacterGrid, ProduceError> {
            Ok(CharacterGrid::from_text(&tick.to_string()))
        }
    }

    #[test]
    fn idle_until_attached() {
        let clock = RepaintClock::new();
        let target = DisplayTarget::new();
        let handle = RenderLoop::new(&clock, &target, LoopSettings::default());
        assert_eq!(handle.state(), LoopState::Idle);
        assert_eq!(clock.pending(), 0);

        assert!(handle.attach(Counter));
        assert_eq!(handle.state(), LoopState::Running);
        assert!(!handle.attach(Counter));
    }

    #[test]
    fn publishes_once_per_tick() {
        let clock = RepaintClock::new();
        let target = DisplayTarget::new();
        let _handle = RenderLoop::start(&clock, &target, LoopSettings::default(), Counter);

        for _ in 0..4 {
            clock.advance();
            assert_eq!(clock.pending(), 1);
        }
        assert_eq!(target.publish_count(), 4);
        assert_eq!(target.latest_text().as_deref(), Some("4"));
    }

    #[test]
    fn dropping_the_handle_stops_the_loop() {
        let clock = RepaintClock::new();
        let target = DisplayTarget::new();
        drop(RenderLoop::start(&clock, &target, LoopSettings::default(), Counter));

        assert_eq!(clock.pending(), 0);
        clock.advance();
        assert_eq!(target.publish_count(), 0);
    }

    #[test]
    fn listener_can_stop_the_loop_mid_publish() {
        let clock = RepaintClock::new();
        let target = DisplayTarget::new();
        let handle = Rc::new(RenderLoop::start(&clock, &target, LoopSettings::default(), Counter));

        let weak = Rc::downgrade(&handle);
        target.on_publish(move |_| {
            if let Some(handle) = weak.upgrade() {
                handle.stop();
            }
        });

        clock.advance();
        assert_eq!(handle.state(), LoopState::Stopped);
        assert_eq!(clock.pending(), 0);
        clock.advance();
        assert_eq!(target.publish_count(), 1);
    }
}

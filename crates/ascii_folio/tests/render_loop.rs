use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use ascii_folio::image_pipeline::resize::TargetSize;
use ascii_folio::render::{Activation, LoopSettings, SampledSource};
use ascii_folio::{
    AssetProducer, BlockSampler, CharacterGrid, DisplayTarget, GlyphRamp, GridSource, ImagePrep,
    LoopState, ProduceError, RenderLoop, RepaintClock, SamplerOptions,
};

/// Publishes the tick number and counts how often it was asked.
struct Ticker {
    calls: Rc<Cell<u32>>,
}

impl GridSource for Ticker {
    fn next_grid(&mut self, tick: u64) -> Result<CharacterGrid, ProduceError> {
        self.calls.set(self.calls.get() + 1);
        Ok(CharacterGrid::from_text(&tick.to_string()))
    }
}

fn ticker() -> (Ticker, Rc<Cell<u32>>) {
    let calls = Rc::new(Cell::new(0));
    (Ticker { calls: calls.clone() }, calls)
}

struct Failing(ProduceError);

impl GridSource for Failing {
    fn next_grid(&mut self, _tick: u64) -> Result<CharacterGrid, ProduceError> {
        Err(self.0.clone())
    }
}

/// Not ready for the first `pending` ticks.
struct SlowStart {
    pending: u32,
}

impl GridSource for SlowStart {
    fn next_grid(&mut self, _tick: u64) -> Result<CharacterGrid, ProduceError> {
        if self.pending > 0 {
            self.pending -= 1;
            return Err(ProduceError::NotReady);
        }
        Ok(CharacterGrid::from_text("ready"))
    }
}

#[test]
fn stop_guarantees_no_further_publishes() {
    let clock = RepaintClock::new();
    let target = DisplayTarget::new();
    let (source, calls) = ticker();
    let handle = RenderLoop::start(&clock, &target, LoopSettings::default(), source);

    for _ in 0..3 {
        clock.advance();
    }
    assert_eq!(target.publish_count(), 3);

    handle.stop();
    assert_eq!(handle.state(), LoopState::Stopped);
    for _ in 0..10 {
        clock.advance();
    }
    assert_eq!(target.publish_count(), 3);
    assert_eq!(calls.get(), 3);

    handle.stop();
    assert_eq!(handle.state(), LoopState::Stopped);
}

#[test]
fn restarting_on_a_target_stops_the_previous_loop() {
    let clock = RepaintClock::new();
    let target = DisplayTarget::new();
    let (first, first_calls) = ticker();
    let (second, second_calls) = ticker();

    let old = RenderLoop::start(&clock, &target, LoopSettings::default(), first);
    clock.advance();
    let new = RenderLoop::start(&clock, &target, LoopSettings::default(), second);

    assert_eq!(old.state(), LoopState::Stopped);
    assert_eq!(new.state(), LoopState::Running);
    for _ in 0..5 {
        clock.advance();
    }

    assert_eq!(first_calls.get(), 1);
    assert_eq!(second_calls.get(), 5);
    assert_eq!(target.publish_count(), 6);
    assert_eq!(clock.pending(), 1);
}

#[test]
fn lazy_loops_wait_for_visibility() {
    let clock = RepaintClock::new();
    let target = DisplayTarget::new();
    let settings =
        LoopSettings { activation: Activation::ViewportLazy, ..LoopSettings::default() };
    let (source, calls) = ticker();
    let handle = RenderLoop::start(&clock, &target, settings, source);

    assert_eq!(handle.state(), LoopState::Armed);
    clock.advance();
    handle.set_visible(false);
    assert_eq!(handle.state(), LoopState::Armed);
    assert_eq!(calls.get(), 0);

    handle.set_visible(true);
    assert_eq!(handle.state(), LoopState::Running);
    clock.advance();
    clock.advance();
    assert_eq!(target.latest_text().as_deref(), Some("3"));

    handle.set_visible(false);
    assert_eq!(handle.state(), LoopState::Stopped);
    handle.set_visible(true);
    assert_eq!(handle.state(), LoopState::Stopped);
}

#[test]
fn hard_errors_settle_on_a_placeholder() {
    for (error, expected) in [
        (ProduceError::AssetLoad { path: "logo.png".into(), reason: "gone".into() }, "[?]"),
        (ProduceError::PixelAccess("tainted".into()), "[ICON]"),
    ] {
        let clock = RepaintClock::new();
        let target = DisplayTarget::new();
        let handle = RenderLoop::start(&clock, &target, LoopSettings::default(), Failing(error));

        clock.advance();
        assert_eq!(handle.state(), LoopState::Degraded);
        assert_eq!(target.latest_text().as_deref(), Some(expected));

        clock.advance();
        assert_eq!(target.publish_count(), 1);
        assert_eq!(clock.pending(), 0);

        handle.stop();
        assert_eq!(handle.state(), LoopState::Stopped);
    }
}

#[test]
fn not_ready_shows_loading_once_then_real_frames() {
    let clock = RepaintClock::new();
    let target = DisplayTarget::new();
    let handle =
        RenderLoop::start(&clock, &target, LoopSettings::default(), SlowStart { pending: 3 });

    for _ in 0..3 {
        clock.advance();
    }
    assert_eq!(handle.state(), LoopState::Running);
    assert_eq!(target.publish_count(), 1);
    assert_eq!(target.latest_text().as_deref(), Some("..."));

    clock.advance();
    assert_eq!(target.latest_text().as_deref(), Some("ready"));
}

#[test]
fn missing_asset_degrades_after_loading() {
    let clock = RepaintClock::new();
    let target = DisplayTarget::new();
    let producer =
        AssetProducer::spawn("/nonexistent/avatar.png", ImagePrep::circle(TargetSize::square(64)));
    let sampler = BlockSampler::new(GlyphRamp::standard(), SamplerOptions::default()).unwrap();
    let handle = RenderLoop::start(
        &clock,
        &target,
        LoopSettings::default(),
        SampledSource::new(producer, sampler),
    );

    for _ in 0..500 {
        clock.advance();
        if handle.state() != LoopState::Running {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }

    assert_eq!(handle.state(), LoopState::Degraded);
    assert_eq!(target.latest_text().as_deref(), Some("[?]"));
}

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::driver::{self, LoopCore};
use crate::ascii::grid::CharacterGrid;

type Listener = Box<dyn FnMut(&CharacterGrid)>;

#[derive(Default)]
struct TargetState {
    latest: Option<CharacterGrid>,
    publishes: u64,
    listener: Option<Listener>,
    owner: Option<Weak<RefCell<LoopCore>>>,
}

/// Where a render loop publishes its grids.
///
/// Holds the most recent grid and, optionally, a listener invoked on every
/// publish. At most one loop owns a target at a time: starting a loop on a
/// target stops whichever loop owned it before.
#[derive(Clone, Default)]
pub struct DisplayTarget {
    state: Rc<RefCell<TargetState>>,
}

impl DisplayTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the callback that displays each published grid, replacing
    /// any previous one.
    pub fn on_publish(&self, listener: impl FnMut(&CharacterGrid) + 'static) {
        self.state.borrow_mut().listener = Some(Box::new(listener));
    }

    pub fn publish(&self, grid: CharacterGrid) {
        // The listener runs without the target borrowed so it may read it back.
        let listener = {
            let mut state = self.state.borrow_mut();
            state.publishes += 1;
            state.latest = Some(grid);
            state.listener.take()
        };

        if let Some(mut listener) = listener {
            if let Some(grid) = self.state.borrow().latest.as_ref() {
                listener(grid);
            }
            let mut state = self.state.borrow_mut();
            if state.listener.is_none() {
                state.listener = Some(listener);
            }
        }
    }

    pub fn publish_count(&self) -> u64 {
        self.state.borrow().publishes
    }

    pub fn latest(&self) -> Option<CharacterGrid> {
        self.state.borrow().latest.clone()
    }

    pub fn latest_text(&self) -> Option<String> {
        self.state.borrow().latest.as_ref().map(CharacterGrid::to_text)
    }

    /// Makes `core` the owner, stopping the previous owner if it is a
    /// different, still-live loop.
    pub(super) fn claim(&self, core: &Rc<RefCell<LoopCore>>) {
        let previous = self.state.borrow_mut().owner.replace(Rc::downgrade(core));
        if let Some(previous) = previous.and_then(|owner| owner.upgrade()) {
            if !Rc::ptr_eq(&previous, core) {
                driver::stop_core(&previous);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn publish_updates_latest_and_count() {
        let target = DisplayTarget::new();
        assert!(target.latest().is_none());
        target.publish(CharacterGrid::from_text("ab"));
        target.publish(CharacterGrid::from_text("cd"));
        assert_eq!(target.publish_count(), 2);
        assert_eq!(target.latest_text().as_deref(), Some("cd"));
    }

    #[test]
    fn listener_sees_each_grid() {
        let target = DisplayTarget::new();
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let reader = target.clone();
        target.on_publish(move |grid| {
            assert_eq!(reader.latest().as_ref(), Some(grid));
            counter.set(counter.get() + 1);
        });

        target.publish(CharacterGrid::from_text("x"));
        target.publish(CharacterGrid::from_text("y"));
        assert_eq!(seen.get(), 2);
    }
}

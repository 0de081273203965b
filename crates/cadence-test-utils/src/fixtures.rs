//! Recording fixtures for scheduler tests.
//!
//! - [`CallLog`]: shared log that wraps a [`Schedule`] with callbacks
//!   recording every update and completion under a label.
//! - [`RecordingListener`]: a [`ScheduleListener`] that records every
//!   registration and disposal.

use std::cell::RefCell;
use std::rc::Rc;

use cadence_engine::{Schedule, ScheduleHandle, ScheduleListener, WorkInfo, WorkStatus};

/// One recorded callback invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Update { label: &'static str, elapsed: f64 },
    Complete { label: &'static str },
}

/// Shared, cloneable log of callback invocations.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Rc<RefCell<Vec<Event>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach recording `on_update`/`on_complete` callbacks to `schedule`,
    /// replacing any it already had.
    pub fn recording(&self, label: &'static str, schedule: Schedule) -> Schedule {
        let updates = self.clone();
        let completions = self.clone();
        schedule
            .on_update(move |_, elapsed| updates.push(Event::Update { label, elapsed }))
            .on_complete(move |_| completions.push(Event::Complete { label }))
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    /// Every event so far, in order.
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Elapsed values passed to `label`'s update callback.
    pub fn updates(&self, label: &str) -> Vec<f64> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Update { label: l, elapsed } if *l == label => Some(*elapsed),
                _ => None,
            })
            .collect()
    }

    /// Number of times `label`'s completion callback fired.
    pub fn completions(&self, label: &str) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Complete { label: l } if *l == label))
            .count()
    }

    /// Labels whose update callback fired, in firing order.
    pub fn update_order(&self) -> Vec<&'static str> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Update { label, .. } => Some(*label),
                Event::Complete { .. } => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// One recorded listener notification.
#[derive(Clone, Debug, PartialEq)]
pub enum ListenerEvent {
    Registered(ScheduleHandle, WorkInfo),
    Unregistered(ScheduleHandle, WorkStatus),
}

/// [`ScheduleListener`] that appends to a shared log.
///
/// Clone it before installing; the clone kept by the test sees every
/// event the installed copy records.
#[derive(Clone, Debug, Default)]
pub struct RecordingListener(Rc<RefCell<Vec<ListenerEvent>>>);

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ListenerEvent> {
        self.0.borrow().clone()
    }

    /// Final statuses reported for `handle`.
    pub fn disposals_of(&self, handle: ScheduleHandle) -> Vec<WorkStatus> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ListenerEvent::Unregistered(h, status) if *h == handle => Some(*status),
                _ => None,
            })
            .collect()
    }

    /// Registration info recorded for `handle`.
    pub fn registration_of(&self, handle: ScheduleHandle) -> Option<WorkInfo> {
        self.0.borrow().iter().find_map(|e| match e {
            ListenerEvent::Registered(h, info) if *h == handle => Some(info.clone()),
            _ => None,
        })
    }
}

impl ScheduleListener for RecordingListener {
    fn on_register(&mut self, handle: ScheduleHandle, info: &WorkInfo) {
        self.0
            .borrow_mut()
            .push(ListenerEvent::Registered(handle, info.clone()));
    }

    fn on_unregister(&mut self, handle: ScheduleHandle, status: WorkStatus) {
        self.0
            .borrow_mut()
            .push(ListenerEvent::Unregistered(handle, status));
    }
}

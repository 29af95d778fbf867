//! The presentation surface the controllers drive.
//!
//! Controllers never print or read input directly; everything goes through
//! [`UiPorts`], so the same flows run against a terminal or a test double.

use std::sync::Mutex;

use crate::model::PlaceLabel;

/// The two busy-able controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Search,
    Locate,
}

impl Control {
    pub fn idle_label(self) -> &'static str {
        match self {
            Control::Search => "Search",
            Control::Locate => "Use my location",
        }
    }

    pub fn busy_label(self) -> &'static str {
        match self {
            Control::Search => "Searching...",
            Control::Locate => "Locating...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub enabled: bool,
    pub label: String,
}

impl ControlState {
    pub fn idle(control: Control) -> Self {
        Self {
            enabled: true,
            label: control.idle_label().to_string(),
        }
    }

    pub fn busy(control: Control) -> Self {
        Self {
            enabled: false,
            label: control.busy_label().to_string(),
        }
    }
}

/// What the recent-searches area should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecentView {
    Empty,
    Items(Vec<PlaceLabel>),
}

pub trait UiPorts: Send + Sync {
    fn input_value(&self) -> String;
    fn set_input_value(&self, value: &str);
    fn set_control(&self, control: Control, state: ControlState);
    fn set_output(&self, rendered: String);
    /// `None` hides the banner.
    fn set_error(&self, message: Option<String>);
    fn set_recent(&self, view: RecentView);
}

/// Puts a control into its busy state and restores it on drop, whichever
/// way the enclosing flow exits.
pub(crate) struct BusyGuard<'a> {
    ui: &'a dyn UiPorts,
    control: Control,
}

impl<'a> BusyGuard<'a> {
    pub(crate) fn enter(ui: &'a dyn UiPorts, control: Control) -> Self {
        ui.set_control(control, ControlState::busy(control));
        Self { ui, control }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.ui.set_control(self.control, ControlState::idle(self.control));
    }
}

/// Every call made against a [`RecordingUi`], in order.
///
/// Test support only; front ends implement [`UiPorts`] themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Input(String),
    Control(Control, ControlState),
    Output(String),
    Error(Option<String>),
    Recent(RecentView),
}

/// In-memory [`UiPorts`] that keeps the latest state plus a call log.
///
/// A test double for driving the controllers without a terminal. It is
/// public so integration tests and downstream front ends can use it.
#[derive(Debug, Default)]
pub struct RecordingUi {
    state: Mutex<RecordedState>,
}

#[derive(Debug, Default)]
struct RecordedState {
    input: String,
    events: Vec<UiEvent>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: &str) -> Self {
        let ui = Self::new();
        ui.lock().input = input.to_string();
        ui
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.lock().events.clone()
    }

    pub fn last_output(&self) -> Option<String> {
        self.lock().events.iter().rev().find_map(|e| match e {
            UiEvent::Output(s) => Some(s.clone()),
            _ => None,
        })
    }

    /// Current banner text, `None` when hidden.
    pub fn error(&self) -> Option<String> {
        self.lock().events.iter().rev().find_map(|e| match e {
            UiEvent::Error(msg) => Some(msg.clone()),
            _ => None,
        })?
    }

    pub fn control(&self, control: Control) -> Option<ControlState> {
        self.lock().events.iter().rev().find_map(|e| match e {
            UiEvent::Control(c, state) if *c == control => Some(state.clone()),
            _ => None,
        })
    }

    pub fn last_recent(&self) -> Option<RecentView> {
        self.lock().events.iter().rev().find_map(|e| match e {
            UiEvent::Recent(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordedState> {
        // A poisoned lock only means a test already panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, event: UiEvent) {
        self.lock().events.push(event);
    }
}

impl UiPorts for RecordingUi {
    fn input_value(&self) -> String {
        self.lock().input.clone()
    }

    fn set_input_value(&self, value: &str) {
        let mut state = self.lock();
        state.input = value.to_string();
        state.events.push(UiEvent::Input(value.to_string()));
    }

    fn set_control(&self, control: Control, state: ControlState) {
        self.push(UiEvent::Control(control, state));
    }

    fn set_output(&self, rendered: String) {
        self.push(UiEvent::Output(rendered));
    }

    fn set_error(&self, message: Option<String>) {
        self.push(UiEvent::Error(message));
    }

    fn set_recent(&self, view: RecentView) {
        self.push(UiEvent::Recent(view));
    }
}

use std::sync::Mutex;

use skylook_core::{
    Control, ControlState, OutputFormat, RecentView, UiPorts, render::render_recent,
};

/// [`UiPorts`] backed by stdout/stderr.
///
/// Weather output goes to stdout, everything transient (busy labels, the
/// error banner) to stderr so piping `skylook search` stays clean.
#[derive(Debug)]
pub struct TerminalUi {
    input: Mutex<String>,
    recent: Mutex<RecentView>,
    format: OutputFormat,
    echo_recent: bool,
}

impl TerminalUi {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            input: Mutex::new(String::new()),
            recent: Mutex::new(RecentView::Empty),
            format,
            echo_recent: false,
        }
    }

    /// Print the recent list every time it changes.
    pub fn echo_recent(mut self, echo: bool) -> Self {
        self.echo_recent = echo;
        self
    }

    pub fn recent(&self) -> RecentView {
        self.recent.lock().map(|v| v.clone()).unwrap_or(RecentView::Empty)
    }

    pub fn print_recent(&self) {
        println!("Recent searches:\n{}", render_recent(&self.recent(), self.format));
    }
}

impl UiPorts for TerminalUi {
    fn input_value(&self) -> String {
        self.input.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn set_input_value(&self, value: &str) {
        if let Ok(mut input) = self.input.lock() {
            *input = value.to_string();
        }
    }

    fn set_control(&self, control: Control, state: ControlState) {
        tracing::debug!(?control, enabled = state.enabled, label = %state.label, "control state");
        if !state.enabled {
            eprintln!("{}", state.label);
        }
    }

    fn set_output(&self, rendered: String) {
        println!("{rendered}");
    }

    fn set_error(&self, message: Option<String>) {
        if let Some(message) = message {
            eprintln!("error: {message}");
        }
    }

    fn set_recent(&self, view: RecentView) {
        if let Ok(mut recent) = self.recent.lock() {
            *recent = view;
        }
        if self.echo_recent {
            self.print_recent();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skylook_core::PlaceLabel;

    #[test]
    fn keeps_input_and_latest_recent_view() {
        let ui = TerminalUi::new(OutputFormat::Text);
        ui.set_input_value("Oslo");
        assert_eq!(ui.input_value(), "Oslo");

        let view = RecentView::Items(vec![PlaceLabel::new("Oslo, Norway").unwrap()]);
        ui.set_recent(view.clone());
        assert_eq!(ui.recent(), view);
    }
}

use serde::{Deserialize, Serialize};

/// Browser-level events the exam client reports. The monitor consumes typed
/// signals, not raw DOM events, so synthetic signals drive the same policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub(crate) enum ViolationSignal {
    TabHidden,
    FocusLost,
    ContextMenu,
    Copy,
    Paste,
    BlockedShortcut { key: String },
    FullscreenExited,
}

impl ViolationSignal {
    pub(crate) fn reason(&self) -> String {
        match self {
            ViolationSignal::TabHidden => "Tab switching detected".to_string(),
            ViolationSignal::FocusLost => "Window focus lost".to_string(),
            ViolationSignal::ContextMenu => "Right-click detected".to_string(),
            ViolationSignal::Copy => "Copy attempt detected".to_string(),
            ViolationSignal::Paste => "Paste attempt detected".to_string(),
            ViolationSignal::BlockedShortcut { key } => {
                format!("Keyboard shortcut (Ctrl+{}) blocked", key.to_uppercase())
            }
            ViolationSignal::FullscreenExited => "Fullscreen exited".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MonitorPhase {
    Armed,
    Warning,
    Terminal,
}

/// What a recorded violation means for the client: surface the warning, and
/// when `terminal` is set, start the undismissable auto-submit countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ViolationNotice {
    pub(crate) reason: String,
    pub(crate) count: u32,
    pub(crate) terminal: bool,
}

/// Escalation policy per active session: Armed -> Warning on each violation,
/// Terminal once the count reaches the threshold. Terminal is absorbing and
/// refuses further signals, so the persisted counter stops at the threshold.
#[derive(Debug, Clone)]
pub(crate) struct ViolationMonitor {
    threshold: u32,
    count: u32,
    phase: MonitorPhase,
}

impl ViolationMonitor {
    pub(crate) fn new(threshold: u32) -> Self {
        Self::resume(threshold, 0)
    }

    /// Rebuilds the monitor from a persisted violation count, e.g. after a
    /// reload of an in-flight session.
    pub(crate) fn resume(threshold: u32, count: u32) -> Self {
        let threshold = threshold.max(1);
        let phase = if count >= threshold { MonitorPhase::Terminal } else { MonitorPhase::Armed };
        Self { threshold, count, phase }
    }

    pub(crate) fn phase(&self) -> MonitorPhase {
        self.phase
    }

    pub(crate) fn count(&self) -> u32 {
        self.count
    }

    pub(crate) fn observe(&mut self, signal: &ViolationSignal) -> Option<ViolationNotice> {
        if self.phase == MonitorPhase::Terminal {
            return None;
        }

        self.count += 1;
        let terminal = self.count >= self.threshold;
        self.phase = if terminal { MonitorPhase::Terminal } else { MonitorPhase::Warning };

        Some(ViolationNotice { reason: signal.reason(), count: self.count, terminal })
    }

    /// Re-arms the monitor after a warning; a terminal warning cannot be
    /// dismissed. Dismissal happens in the exam client, not over the HTTP
    /// API; a rebuilt monitor recovers its phase from the persisted count
    /// via [`resume`](Self::resume).
    pub(crate) fn dismiss(&mut self) {
        if self.phase == MonitorPhase::Warning {
            self.phase = MonitorPhase::Armed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_violation_warns_without_terminating() {
        let mut monitor = ViolationMonitor::new(2);

        let notice = monitor.observe(&ViolationSignal::TabHidden).expect("notice");
        assert_eq!(notice.count, 1);
        assert!(!notice.terminal);
        assert_eq!(notice.reason, "Tab switching detected");
        assert_eq!(monitor.phase(), MonitorPhase::Warning);
    }

    #[test]
    fn threshold_violation_is_terminal() {
        let mut monitor = ViolationMonitor::new(2);
        monitor.observe(&ViolationSignal::Copy);

        let notice = monitor.observe(&ViolationSignal::FocusLost).expect("notice");
        assert_eq!(notice.count, 2);
        assert!(notice.terminal);
        assert_eq!(monitor.phase(), MonitorPhase::Terminal);
    }

    #[test]
    fn terminal_monitor_refuses_further_signals() {
        let mut monitor = ViolationMonitor::new(1);
        assert!(monitor.observe(&ViolationSignal::Paste).is_some());

        assert!(monitor.observe(&ViolationSignal::Paste).is_none());
        assert_eq!(monitor.count(), 1);
    }

    #[test]
    fn warning_is_dismissable_below_threshold() {
        let mut monitor = ViolationMonitor::new(3);
        monitor.observe(&ViolationSignal::ContextMenu);
        assert_eq!(monitor.phase(), MonitorPhase::Warning);

        monitor.dismiss();
        assert_eq!(monitor.phase(), MonitorPhase::Armed);
        assert_eq!(monitor.count(), 1);
    }

    #[test]
    fn terminal_warning_cannot_be_dismissed() {
        let mut monitor = ViolationMonitor::new(1);
        monitor.observe(&ViolationSignal::FullscreenExited);

        monitor.dismiss();
        assert_eq!(monitor.phase(), MonitorPhase::Terminal);
    }

    #[test]
    fn resume_past_threshold_is_terminal() {
        let monitor = ViolationMonitor::resume(2, 2);
        assert_eq!(monitor.phase(), MonitorPhase::Terminal);
    }

    #[test]
    fn blocked_shortcut_reason_names_the_key() {
        let signal = ViolationSignal::BlockedShortcut { key: "x".to_string() };
        assert_eq!(signal.reason(), "Keyboard shortcut (Ctrl+X) blocked");
    }

    #[test]
    fn signal_deserializes_from_tagged_json() {
        let signal: ViolationSignal =
            serde_json::from_str(r#"{"signal":"blocked_shortcut","key":"u"}"#).unwrap();
        assert_eq!(signal, ViolationSignal::BlockedShortcut { key: "u".to_string() });

        let simple: ViolationSignal = serde_json::from_str(r#"{"signal":"tab_hidden"}"#).unwrap();
        assert_eq!(simple, ViolationSignal::TabHidden);
    }
}

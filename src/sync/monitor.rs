//! # Connectivity Monitor
//!
//! Debounced online/offline transition detection for sync triggering.
//!
//! The monitor is a pure state machine: callers feed it samples of the
//! runtime's connectivity signal together with the current instant, and it
//! reports transitions. A restored connection is reported at most once per
//! debounce window, so a flapping link cannot fan out into a flood of
//! reconciliation triggers.

use std::time::{Duration, Instant};

/// Observed connectivity state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Online,
    Offline,
    /// No sample observed yet
    Unknown,
}

/// A state change worth acting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No actionable change
    None,
    /// Connectivity restored; trigger one reconciliation pass
    CameOnline,
    /// Connectivity lost
    WentOffline,
}

/// Debounced connectivity transition detector
#[derive(Debug)]
pub struct ConnectivityMonitor {
    status: NetworkStatus,
    debounce: Duration,
    last_online_report: Option<Instant>,
}

impl ConnectivityMonitor {
    pub fn new(debounce: Duration) -> Self {
        Self {
            status: NetworkStatus::Unknown,
            debounce,
            last_online_report: None,
        }
    }

    /// Feed one connectivity sample
    ///
    /// `now` is passed in rather than read from a clock so the debounce
    /// logic is testable; callers use `Instant::now()`.
    pub fn observe(&mut self, is_online: bool, now: Instant) -> Transition {
        match (self.status, is_online) {
            (NetworkStatus::Online, true) => Transition::None,
            (_, true) => {
                self.status = NetworkStatus::Online;
                let suppressed = self
                    .last_online_report
                    .map(|at| now.saturating_duration_since(at) < self.debounce)
                    .unwrap_or(false);
                if suppressed {
                    // Flicker: a pass was already triggered inside the window
                    Transition::None
                } else {
                    self.last_online_report = Some(now);
                    Transition::CameOnline
                }
            }
            (NetworkStatus::Offline, false) => Transition::None,
            (_, false) => {
                self.status = NetworkStatus::Offline;
                Transition::WentOffline
            }
        }
    }

    /// Last observed status
    pub fn status(&self) -> NetworkStatus {
        self.status
    }

    /// Whether the last sample was online
    pub fn is_online(&self) -> bool {
        matches!(self.status, NetworkStatus::Online)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> ConnectivityMonitor {
        ConnectivityMonitor::new(Duration::from_secs(2))
    }

    #[test]
    fn test_first_online_sample_triggers() {
        let mut monitor = monitor();
        let now = Instant::now();
        assert_eq!(monitor.observe(true, now), Transition::CameOnline);
        assert!(monitor.is_online());
    }

    #[test]
    fn test_steady_state_is_quiet() {
        let mut monitor = monitor();
        let now = Instant::now();
        monitor.observe(true, now);
        assert_eq!(monitor.observe(true, now + Duration::from_secs(5)), Transition::None);

        monitor.observe(false, now + Duration::from_secs(6));
        assert_eq!(
            monitor.observe(false, now + Duration::from_secs(7)),
            Transition::None
        );
    }

    #[test]
    fn test_offline_to_online_triggers_once() {
        let mut monitor = monitor();
        let now = Instant::now();

        monitor.observe(false, now);
        assert_eq!(
            monitor.observe(true, now + Duration::from_secs(10)),
            Transition::CameOnline
        );
        assert_eq!(
            monitor.observe(true, now + Duration::from_secs(11)),
            Transition::None
        );
    }

    #[test]
    fn test_flicker_within_debounce_is_coalesced() {
        let mut monitor = monitor();
        let now = Instant::now();

        assert_eq!(monitor.observe(true, now), Transition::CameOnline);

        // Rapid offline/online flapping inside the window: no extra trigger
        monitor.observe(false, now + Duration::from_millis(100));
        assert_eq!(
            monitor.observe(true, now + Duration::from_millis(200)),
            Transition::None
        );
        monitor.observe(false, now + Duration::from_millis(300));
        assert_eq!(
            monitor.observe(true, now + Duration::from_millis(400)),
            Transition::None
        );
    }

    #[test]
    fn test_trigger_fires_again_after_window() {
        let mut monitor = monitor();
        let now = Instant::now();

        assert_eq!(monitor.observe(true, now), Transition::CameOnline);
        monitor.observe(false, now + Duration::from_secs(1));
        assert_eq!(
            monitor.observe(true, now + Duration::from_secs(4)),
            Transition::CameOnline
        );
    }

    #[test]
    fn test_went_offline_is_reported() {
        let mut monitor = monitor();
        let now = Instant::now();
        monitor.observe(true, now);
        assert_eq!(
            monitor.observe(false, now + Duration::from_secs(1)),
            Transition::WentOffline
        );
    }
}

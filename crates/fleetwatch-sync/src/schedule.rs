//! ---
//! fw_section: "05-live-sync"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Timers backing the poll cadence and the debounce window."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{sleep, Instant, MissedTickBehavior, Sleep};

/// Fixed-cadence poll timer.
///
/// Missed ticks are delayed rather than burst, so a slow fetch never causes a
/// backlog of immediate re-fetches.
#[derive(Debug)]
pub struct PollTimer {
    interval: tokio::time::Interval,
}

impl PollTimer {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}

/// Re-armable quiet window for debounced reconciliation.
///
/// Arming (or re-arming) pushes the deadline a full window into the future;
/// the window only "elapses" once it has stayed armed for that long. While
/// disarmed it must not be polled (guard with [`QuietWindow::is_armed`]).
#[derive(Debug)]
pub struct QuietWindow {
    window: Duration,
    sleep: Pin<Box<Sleep>>,
    armed: bool,
}

impl QuietWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            sleep: Box::pin(sleep(window)),
            armed: false,
        }
    }

    /// Start (or restart) the quiet window from now.
    pub fn arm(&mut self) {
        self.sleep.as_mut().reset(Instant::now() + self.window);
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Resolves when the armed deadline passes.
    pub async fn elapsed(&mut self) {
        self.sleep.as_mut().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn rearming_pushes_the_deadline() {
        let mut window = QuietWindow::new(Duration::from_millis(100));
        window.arm();
        tokio::time::sleep(Duration::from_millis(50)).await;
        window.arm();

        let start = Instant::now();
        window.elapsed().await;
        // Full window from the re-arm, not the original arm.
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_timer_first_tick_is_immediate() {
        let mut timer = PollTimer::new(Duration::from_millis(200));
        let start = Instant::now();
        timer.tick().await;
        assert!(start.elapsed() < Duration::from_millis(1));
        timer.tick().await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}

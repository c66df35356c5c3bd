//! Raw key delivery with a settle delay before every press.

use core::time::Duration;
use std::sync::Arc;

use keypilot_core::{GuiDriver, Result};
use tokio::time::sleep;
use tracing::debug;

/// Sends keys to the application, pausing for the settle delay first.
#[derive(Clone)]
pub struct Keyboard {
    driver: Arc<dyn GuiDriver>,
    delay: Duration,
}

impl Keyboard {
    /// Keyboard over `driver`, waiting `delay` before each press.
    pub fn new(driver: Arc<dyn GuiDriver>, delay: Duration) -> Self {
        Self { driver, delay }
    }

    /// The settle delay.
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the settle delay, then press `key`.
    ///
    /// # Errors
    /// Returns an error if the driver cannot deliver the key.
    pub async fn press(&self, key: &str) -> Result<()> {
        sleep(self.delay).await;
        debug!(key, delay_ms = self.delay.as_millis(), "pressing key");
        self.driver.press_key(key).await
    }

    /// Press each key in order.
    ///
    /// # Errors
    /// Returns the first delivery error; later keys are not sent.
    pub async fn press_all<S: AsRef<str>>(&self, keys: &[S]) -> Result<()> {
        for key in keys {
            self.press(key.as_ref()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypilot_testkit::RecordingDriver;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_every_press_waits_for_the_delay() {
        let driver = Arc::new(RecordingDriver::list("commits", ["a", "b", "c"], 0));
        let keyboard = Keyboard::new(Arc::clone(&driver) as Arc<dyn GuiDriver>, Duration::from_millis(25));
        let start = Instant::now();
        keyboard.press_all(&["<down>", "<down>", "x"]).await.unwrap();

        let presses = driver.presses();
        assert_eq!(presses.len(), 3);
        let mut previous = start;
        for press in &presses {
            assert!(press.at.duration_since(previous) >= Duration::from_millis(25));
            previous = press.at;
        }
        assert_eq!(driver.selected(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_presses_immediately() {
        let driver = Arc::new(RecordingDriver::list("files", ["a"], 0));
        let keyboard = Keyboard::new(Arc::clone(&driver) as Arc<dyn GuiDriver>, Duration::ZERO);
        let start = Instant::now();
        keyboard.press("q").await.unwrap();
        assert_eq!(driver.presses()[0].at, start);
    }
}

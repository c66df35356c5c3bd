use async_trait::async_trait;

use crate::error::Result;
use crate::snapshot::ContextSnapshot;

/// Handle onto a running terminal UI application.
///
/// The harness only ever sees what the application has rendered. Reads go
/// through [`GuiDriver::current_context`], which must return the focused
/// region's name, kind, title, content, visible lines and selected index from
/// one render; splitting that into several calls would reintroduce the race
/// the poll loop exists to absorb.
#[async_trait]
pub trait GuiDriver: Send + Sync {
    /// Inject one key event. The application handles it on its own schedule.
    ///
    /// # Errors
    /// Returns [`crate::Error::Driver`] if the application is no longer reachable.
    async fn press_key(&self, key: &str) -> Result<()>;

    /// Read the focused region as last rendered.
    ///
    /// # Errors
    /// Returns [`crate::Error::Driver`] if the application is no longer reachable.
    async fn current_context(&self) -> Result<ContextSnapshot>;

    /// Out-of-band diagnostic message; has no effect on the application.
    fn log(&self, message: &str);
}

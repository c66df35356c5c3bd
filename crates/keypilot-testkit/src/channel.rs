//! Driver that runs the scripted application on its own task.
//!
//! Input and reads travel over a channel, and the application only redraws
//! on frame ticks. Reads therefore return the last rendered frame, which lags
//! behind the keys already sent, the same way a real terminal UI behaves.

use core::time::Duration;

use async_trait::async_trait;
use keypilot_core::{ContextSnapshot, Error, GuiDriver, Result};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

use crate::app::{ScriptedApp, Screen};

type Inspection = Box<dyn FnOnce(&ScriptedApp) + Send>;

enum Command {
    Key(String),
    Snapshot(oneshot::Sender<ContextSnapshot>),
    Log(String),
    Inspect(Inspection),
}

/// Rendering parameters for a [`ChannelDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// Time between redraws
    pub frame_interval: Duration,
    /// Terminal width in cells
    pub width: u16,
    /// Terminal height in cells
    pub height: u16,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            width: 80,
            height: 24,
        }
    }
}

/// [`GuiDriver`] backed by a [`ScriptedApp`] running on a background task.
pub struct ChannelDriver {
    commands: UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl ChannelDriver {
    /// Render `app` once and start its event loop.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if the initial frame cannot be rendered.
    pub fn spawn(mut app: ScriptedApp, options: DriverOptions) -> Result<Self> {
        let mut screen = Screen::new(options.width, options.height)?;
        let frame = screen.capture(&mut app)?;
        app.take_dirty();
        let (commands, receiver) = unbounded_channel();
        let task = tokio::spawn(run_app(app, screen, frame, receiver, options.frame_interval));
        Ok(Self { commands, task })
    }

    /// Run `inspect` against the live application state, bypassing the
    /// rendered frame.
    ///
    /// # Errors
    /// Returns [`Error::Driver`] if the application task has stopped.
    pub async fn inspect<T, F>(&self, inspect: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&ScriptedApp) -> T + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        self.send(Command::Inspect(Box::new(move |app| {
            drop(reply.send(inspect(app)));
        })))?;
        response.await.map_err(|_| stopped())
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| stopped())
    }
}

impl Drop for ChannelDriver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl GuiDriver for ChannelDriver {
    async fn press_key(&self, key: &str) -> Result<()> {
        self.send(Command::Key(key.to_owned()))
    }

    async fn current_context(&self) -> Result<ContextSnapshot> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        response.await.map_err(|_| stopped())
    }

    fn log(&self, message: &str) {
        drop(self.send(Command::Log(message.to_owned())));
    }
}

fn stopped() -> Error {
    Error::Driver("application is no longer running".to_owned())
}

async fn run_app(
    mut app: ScriptedApp,
    mut screen: Screen,
    mut frame: ContextSnapshot,
    mut commands: UnboundedReceiver<Command>,
    frame_interval: Duration,
) {
    let mut ticker = interval_at(Instant::now() + frame_interval, frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                match command {
                    Command::Key(key) => {
                        if let Err(error) = app.handle_key(&key) {
                            warn!(%error, "scripted app ignored key");
                            app.log(&format!("ignored key {key}"));
                        }
                    }
                    Command::Snapshot(reply) => drop(reply.send(frame.clone())),
                    Command::Log(message) => app.log(&message),
                    Command::Inspect(inspect) => inspect(&app),
                }
            }
            _ = ticker.tick() => {
                if app.take_dirty() {
                    match screen.capture(&mut app) {
                        Ok(next) => {
                            debug!(view = %next.view, "scripted app redrawn");
                            frame = next;
                        }
                        Err(error) => warn!(%error, "scripted app failed to render"),
                    }
                }
            }
        }
    }
}

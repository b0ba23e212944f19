//! Command dispatcher
//!
//! A single worker pops commands from the `CommandQueue` in priority order,
//! turns each into one or more control strings, frames them onto the audio
//! line and waits for playback to finish before taking the next command.
//!
//! Power and brightness are level-valued: repeating the current value is
//! dropped without touching the line. Interrupts and program loads are always
//! transmitted.

pub mod control;
pub mod state;


use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::queue::{Command, CommandQueue};
use crate::signal::{TimingConfig, Waveform};
use crate::sink::AudioSink;

pub use control::ControlString;
pub use state::{DeviceState, StateView};

/// Pause between halting the VM and rewinding it during a program load.
///
/// The receiver needs this long to process the halt before it accepts the
/// rewind. Tuned on hardware.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Name of the worker thread
pub const DISPATCH_THREAD_NAME: &str = "lsp-dispatch";

// How often `wait_idle` checks that the worker is still alive
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors raised while starting the dispatcher
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to spawn dispatcher thread: {0}")]
    Spawn(#[from] io::Error),

    #[error("Dispatcher thread stopped with work outstanding")]
    Stopped,
}

/// Owns the device state mirror and the audio sink.
pub struct Dispatcher {
    queue: CommandQueue,
    waveform: Waveform,
    sink: Box<dyn AudioSink>,
    state: DeviceState,
    view: StateView,
    settle_delay: Duration,
    transmissions: u64,
}

impl Dispatcher {
    /// Create a dispatcher for a strip assumed to be off at brightness 0.
    pub fn new(queue: CommandQueue, waveform: Waveform, sink: Box<dyn AudioSink>) -> Self {
        Self {
            queue,
            waveform,
            sink,
            state: DeviceState::default(),
            view: StateView::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            transmissions: 0,
        }
    }

    #[must_use]
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Publish state through an existing view instead of a private one.
    #[must_use]
    pub fn with_view(mut self, view: StateView) -> Self {
        view.publish(self.state);
        self.view = view;
        self
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn view(&self) -> StateView {
        self.view.clone()
    }

    /// Control strings written to the sink so far
    pub fn transmissions(&self) -> u64 {
        self.transmissions
    }

    /// Apply one command: suppress, transmit and update the mirror.
    pub fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::SetPower { is_on } => {
                if is_on == self.state.is_on {
                    log::debug!("Power already {}, skipping", if is_on { "on" } else { "off" });
                    return;
                }
                self.emit(&ControlString::power(is_on));
                self.state.is_on = is_on;
                self.view.publish(self.state);
            }
            Command::SetBrightness { level } => {
                if level == self.state.brightness {
                    log::debug!("Brightness already {}, skipping", level);
                    return;
                }
                self.emit(&ControlString::brightness(level));
                self.state.brightness = level;
                self.view.publish(self.state);
            }
            Command::RaiseInterrupt { vector, arg } => {
                self.emit(&ControlString::interrupt(vector, arg));
            }
            Command::LoadProgram { bytecode } => self.load_program(&bytecode),
        }
    }

    /// Halt, settle, rewind, write the program, then reset and resume.
    fn load_program(&mut self, bytecode: &[u8]) {
        log::info!("Loading program ({} bytes)", bytecode.len());

        self.emit(&ControlString::halt());
        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }
        self.emit(&ControlString::rewind());
        if bytecode.is_empty() {
            log::warn!("Empty program, VM will restart with its old code");
        } else {
            self.emit(&ControlString::program(bytecode));
        }
        self.emit(&ControlString::reset_and_resume());
    }

    fn emit(&mut self, control: &ControlString) {
        let frame = self.waveform.encode_bytes(control.as_bytes());
        log::debug!(
            "Sending {:?} on {} sink: {} samples, {:?}",
            control,
            self.sink.name(),
            frame.len(),
            frame.duration()
        );
        self.sink.write_and_drain(&frame);
        self.transmissions += 1;
    }

    /// Serve the queue forever.
    pub fn run(mut self) {
        log::info!(
            "Dispatcher running on {} sink{}",
            self.sink.name(),
            if self.sink.is_connected() { "" } else { " (not transmitting)" }
        );
        loop {
            let cmd = self.queue.pop_tracked();
            self.handle(cmd);
            self.queue.mark_done();
        }
    }

    /// Start the dispatcher on its own thread.
    ///
    /// `open_sink` runs on the new thread, since system audio handles
    /// generally cannot move between threads.
    ///
    /// # Errors
    /// `DispatchError::Spawn` if the thread cannot be created
    pub fn spawn<F>(
        queue: CommandQueue,
        waveform: Waveform,
        settle_delay: Duration,
        open_sink: F,
    ) -> Result<DispatcherHandle, DispatchError>
    where
        F: FnOnce(&TimingConfig) -> Box<dyn AudioSink> + Send + 'static,
    {
        let view = StateView::default();
        let worker_view = view.clone();
        let worker_queue = queue.clone();

        let thread = thread::Builder::new()
            .name(DISPATCH_THREAD_NAME.to_string())
            .spawn(move || {
                let sink = open_sink(waveform.timing());
                Dispatcher::new(worker_queue, waveform, sink)
                    .with_settle_delay(settle_delay)
                    .with_view(worker_view)
                    .run();
            })?;

        Ok(DispatcherHandle {
            queue,
            view,
            thread,
        })
    }
}

/// Handle on a spawned dispatcher.
pub struct DispatcherHandle {
    queue: CommandQueue,
    view: StateView,
    thread: JoinHandle<()>,
}

impl DispatcherHandle {
    pub fn view(&self) -> StateView {
        self.view.clone()
    }

    pub fn snapshot(&self) -> DeviceState {
        self.view.snapshot()
    }

    /// False only if the worker died
    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }

    /// Block until every pushed command has been transmitted.
    ///
    /// A program load that has started always runs through to its
    /// reset-and-resume before this returns.
    ///
    /// # Errors
    /// `DispatchError::Stopped` if the worker dies before the queue drains
    pub fn wait_idle(&self) -> Result<(), DispatchError> {
        loop {
            if self.queue.wait_idle_timeout(IDLE_POLL_INTERVAL) {
                return Ok(());
            }
            if !self.is_running() {
                return Err(DispatchError::Stopped);
            }
        }
    }
}

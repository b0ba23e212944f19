// Light strip controller library
// Serial-over-audio command transport for the light strip VM

pub mod cli;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod logging;
pub mod program;
pub mod propfile;
pub mod queue;
pub mod signal;
pub mod sink;

pub use cli::Cli;
pub use config::Options;
pub use console::{Console, Outcome, Reply, Request};
pub use dispatch::{DeviceState, Dispatcher, DispatcherHandle, StateView};
pub use logging::LogLevel;
pub use program::ProgramLibrary;
pub use queue::{Command, CommandKind, CommandQueue};
pub use signal::{Frame, TimingConfig, Waveform};
pub use sink::{AudioSink, SinkKind};

//! Line-oriented control surface.
//!
//! Each line is one request; every request is answered with the outcome and
//! the mirrored device state. Range checks live here, the queue and the
//! dispatcher trust the commands they are given.
//!
//! ```text
//! status
//! on | off
//! brightness <0-255>
//! interrupt <vector 0-3> [arg 0-65535]
//! load <program>
//! programs
//! ```

use serde::Serialize;

use crate::dispatch::{DeviceState, StateView};
use crate::program::{ProgramError, ProgramLibrary};
use crate::queue::{Command, CommandQueue};

/// Highest interrupt vector the strip's VM accepts
pub const MAX_INTERRUPT_VECTOR: u8 = 3;

/// Errors raised while parsing a request line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error("Empty request")]
    Empty,

    #[error("Unknown request: {0}")]
    UnknownRequest(String),

    #[error("Missing {argument} for {request}")]
    MissingArgument {
        request: &'static str,
        argument: &'static str,
    },

    #[error("Invalid {argument} {value:?}: {reason}")]
    InvalidArgument {
        argument: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unexpected argument {0:?}")]
    UnexpectedArgument(String),
}

/// A parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Status,
    Programs,
    Command(Command),
    LoadProgram(String),
}

/// Outcome of a request, with an HTTP-style status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    BadRequest,
    NotFound,
    LoadFailed,
    NotImplemented,
}

impl Outcome {
    pub fn status_code(self) -> u16 {
        match self {
            Outcome::Ok => 200,
            Outcome::BadRequest => 400,
            Outcome::NotFound => 404,
            Outcome::LoadFailed => 500,
            Outcome::NotImplemented => 501,
        }
    }
}

/// Answer to one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub outcome: Outcome,
    pub state: DeviceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub programs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    fn new(outcome: Outcome, state: DeviceState) -> Self {
        Self {
            outcome,
            state,
            programs: None,
            error: None,
        }
    }

    fn failed(outcome: Outcome, state: DeviceState, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(outcome, state)
        }
    }

    /// One-line JSON rendering
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
    }
}

fn parse_number<T: std::str::FromStr>(argument: &'static str, value: &str) -> Result<T, ConsoleError>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConsoleError::InvalidArgument {
        argument,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Parse one request line.
pub fn parse_request(line: &str) -> Result<Request, ConsoleError> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or(ConsoleError::Empty)?;

    let mut required = |request: &'static str, argument: &'static str| {
        words
            .next()
            .ok_or(ConsoleError::MissingArgument { request, argument })
    };

    let request = match verb.to_ascii_lowercase().as_str() {
        "status" => Request::Status,
        "programs" => Request::Programs,
        "on" => Request::Command(Command::SetPower { is_on: true }),
        "off" => Request::Command(Command::SetPower { is_on: false }),
        "brightness" => {
            let level = parse_number("brightness", required("brightness", "level")?)?;
            Request::Command(Command::SetBrightness { level })
        }
        "interrupt" => {
            let raw = required("interrupt", "vector")?;
            let vector: u8 = parse_number("vector", raw)?;
            if vector > MAX_INTERRUPT_VECTOR {
                return Err(ConsoleError::InvalidArgument {
                    argument: "vector",
                    value: raw.to_string(),
                    reason: format!("must be at most {}", MAX_INTERRUPT_VECTOR),
                });
            }
            let arg = match words.next() {
                Some(raw) => parse_number("arg", raw)?,
                None => 0,
            };
            Request::Command(Command::RaiseInterrupt { vector, arg })
        }
        "load" => Request::LoadProgram(required("load", "program")?.to_string()),
        other => return Err(ConsoleError::UnknownRequest(other.to_string())),
    };

    match words.next() {
        Some(extra) => Err(ConsoleError::UnexpectedArgument(extra.to_string())),
        None => Ok(request),
    }
}

/// Executes requests against the queue and reports the mirrored state.
#[derive(Clone)]
pub struct Console {
    queue: CommandQueue,
    library: ProgramLibrary,
    view: StateView,
}

impl Console {
    pub fn new(queue: CommandQueue, library: ProgramLibrary, view: StateView) -> Self {
        Self {
            queue,
            library,
            view,
        }
    }

    pub fn execute(&self, request: Request) -> Reply {
        match request {
            Request::Status => Reply::new(Outcome::Ok, self.view.snapshot()),
            Request::Programs => Reply {
                programs: Some(self.library.list()),
                ..Reply::new(Outcome::Ok, self.view.snapshot())
            },
            Request::Command(cmd) => {
                self.queue.push(cmd);
                Reply::new(Outcome::Ok, self.view.snapshot())
            }
            Request::LoadProgram(name) => match self.library.load(&name) {
                Ok(bytecode) => {
                    self.queue.push(Command::LoadProgram { bytecode });
                    Reply::new(Outcome::Ok, self.view.snapshot())
                }
                Err(err @ (ProgramError::NotFound(_) | ProgramError::InvalidName(_))) => {
                    Reply::failed(Outcome::NotFound, self.view.snapshot(), err)
                }
                Err(err @ ProgramError::Io { .. }) => {
                    log::warn!("{}", err);
                    Reply::failed(Outcome::LoadFailed, self.view.snapshot(), err)
                }
            },
        }
    }

    /// Parse and execute one line.
    pub fn handle_line(&self, line: &str) -> Reply {
        match parse_request(line) {
            Ok(request) => self.execute(request),
            Err(err) => {
                log::warn!("Rejected request {:?}: {}", line.trim(), err);
                let outcome = match err {
                    ConsoleError::UnknownRequest(_) => Outcome::NotImplemented,
                    _ => Outcome::BadRequest,
                };
                Reply::failed(outcome, self.view.snapshot(), err)
            }
        }
    }
}

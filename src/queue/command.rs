//! Commands accepted by the dispatcher.

use std::fmt;

/// A control request for the light strip.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch the strip on or off
    SetPower { is_on: bool },
    /// Set the output brightness
    SetBrightness { level: u8 },
    /// Raise interrupt `vector` (0..=3) on the strip's VM, passing `arg`
    RaiseInterrupt { vector: u8, arg: u16 },
    /// Replace the VM program with raw bytecode
    LoadProgram { bytecode: Vec<u8> },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::SetPower { .. } => CommandKind::SetPower,
            Self::SetBrightness { .. } => CommandKind::SetBrightness,
            Self::RaiseInterrupt { .. } => CommandKind::RaiseInterrupt,
            Self::LoadProgram { .. } => CommandKind::LoadProgram,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetPower { is_on } => write!(f, "SetPower({})", is_on),
            Self::SetBrightness { level } => write!(f, "SetBrightness({})", level),
            Self::RaiseInterrupt { vector, arg } => {
                write!(f, "RaiseInterrupt({}, {})", vector, arg)
            }
            // Program payloads can be hundreds of bytes
            Self::LoadProgram { bytecode } => write!(f, "LoadProgram({} bytes)", bytecode.len()),
        }
    }
}

/// Discriminant of `Command`, one queue slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(usize)]
pub enum CommandKind {
    SetPower = 0,
    SetBrightness = 1,
    RaiseInterrupt = 2,
    LoadProgram = 3,
}

impl CommandKind {
    /// Number of distinct kinds (and queue slots)
    pub const COUNT: usize = 4;

    /// Kinds in delivery order, highest priority first.
    pub const BY_PRIORITY: [CommandKind; Self::COUNT] = [
        CommandKind::LoadProgram,
        CommandKind::RaiseInterrupt,
        CommandKind::SetPower,
        CommandKind::SetBrightness,
    ];

    /// Numeric priority; larger is delivered first.
    pub const fn priority(self) -> u8 {
        match self {
            CommandKind::LoadProgram => 3,
            CommandKind::RaiseInterrupt => 2,
            CommandKind::SetPower => 1,
            CommandKind::SetBrightness => 0,
        }
    }

    pub(crate) const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::SetPower => "power",
            CommandKind::SetBrightness => "brightness",
            CommandKind::RaiseInterrupt => "interrupt",
            CommandKind::LoadProgram => "program",
        };
        f.write_str(name)
    }
}

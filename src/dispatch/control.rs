//! Control strings understood by the strip's line receiver.
//!
//! | String        | Meaning                              |
//! |---------------|--------------------------------------|
//! | `(` / `)`     | output on / off                      |
//! | `b<n>`        | brightness 0..=255                   |
//! | `I<v> <arg>`  | raise interrupt `v` with `arg`       |
//! | `[` / `]`     | halt / resume the VM                 |
//! | `r`           | rewind the program write index       |
//! | `w<n>`        | write one program byte               |
//! | `R`           | reset VM registers                   |

use std::fmt;

/// ASCII command ready to be framed onto the line.
#[derive(Clone, PartialEq, Eq)]
pub struct ControlString(String);

impl ControlString {
    pub fn power(is_on: bool) -> Self {
        Self(if is_on { "(" } else { ")" }.to_string())
    }

    pub fn brightness(level: u8) -> Self {
        Self(format!("b{}", level))
    }

    pub fn interrupt(vector: u8, arg: u16) -> Self {
        Self(format!("I{} {}", vector, arg))
    }

    pub fn halt() -> Self {
        Self("[".to_string())
    }

    pub fn rewind() -> Self {
        Self("r".to_string())
    }

    /// One `w<byte>` write per program byte, concatenated.
    pub fn program(bytecode: &[u8]) -> Self {
        let mut out = String::with_capacity(bytecode.len() * 4);
        for byte in bytecode {
            out.push('w');
            out.push_str(&byte.to_string());
        }
        Self(out)
    }

    pub fn reset_and_resume() -> Self {
        Self("R]".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ControlString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ControlString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 24;
        if self.0.len() > PREVIEW {
            write!(f, "{:?}...({} bytes)", &self.0[..PREVIEW], self.0.len())
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::logging::LogLevel;
use crate::propfile::parse_propfile_at;
use crate::signal::timing::{
    TimingConfig, TimingError, DEFAULT_BAUD_DIVISOR, DEFAULT_PHASE_OFFSET_DEGREES,
    DEFAULT_SAMPLE_RATE, DEFAULT_WAVES_PER_BIT,
};
use crate::sink::SinkKind;

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "lsp-ctrl.cfg";

/// Directory holding compiled programs unless configured otherwise
pub const DEFAULT_PROGRAM_DIR: &str = "../progs";

pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

/// Application options that can be set via CLI or config file
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    // Commandline-only options
    pub config_dir: Option<String>,

    // Commandline and config file options
    pub sample_rate: u32,
    pub baud_divisor: u32,
    pub waves_per_bit: u32,
    pub phase_offset_degrees: f64,
    pub settle_delay_ms: u64,
    pub program_dir: PathBuf,
    pub log_file: Option<String>,
    pub log_level: LogLevel,
    pub sink: SinkKind,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config_dir: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            baud_divisor: DEFAULT_BAUD_DIVISOR,
            waves_per_bit: DEFAULT_WAVES_PER_BIT,
            phase_offset_degrees: DEFAULT_PHASE_OFFSET_DEGREES,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            program_dir: PathBuf::from(DEFAULT_PROGRAM_DIR),
            log_file: None,
            log_level: LogLevel::Info,
            sink: SinkKind::Audio,
        }
    }
}

impl Options {
    /// Derive the line timing from these options.
    pub fn timing(&self) -> Result<TimingConfig, TimingError> {
        TimingConfig::derive(
            self.sample_rate,
            self.baud_divisor,
            self.waves_per_bit,
            self.phase_offset_degrees,
        )
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Apply one `key = value` entry.
    ///
    /// Unknown keys are logged and ignored.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key.to_ascii_lowercase().as_str() {
            "sample_rate" => self.sample_rate = parse_sample_rate(value)?,
            "baud_divisor" => {
                self.baud_divisor = parse_positive(value).context("Invalid baud_divisor")?
            }
            "waves_per_bit" => {
                self.waves_per_bit = parse_positive(value).context("Invalid waves_per_bit")?
            }
            "phase_offset" => self.phase_offset_degrees = parse_phase_offset(value)?,
            "settle_delay_ms" => {
                self.settle_delay_ms = value.parse().context("Invalid settle_delay_ms")?
            }
            "program_dir" => self.program_dir = PathBuf::from(value),
            "log_file" => {
                self.log_file = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            "log_level" => self.log_level = parse_log_level(value)?,
            "sink" => self.sink = parse_sink(value)?,
            _ => log::warn!("Unknown config key {:?} ignored", key),
        }
        Ok(())
    }
}

/// Load configuration from `lsp-ctrl.cfg` in `config_dir`.
///
/// A missing file yields the defaults.
///
/// # Errors
/// Fails if the file exists but cannot be read, or holds a malformed value.
pub fn load_config(config_dir: &Option<String>) -> Result<Options> {
    let mut opts = Options {
        config_dir: config_dir.clone(),
        ..Options::default()
    };

    let dir = config_dir.as_deref().unwrap_or(".");
    let path = Path::new(dir).join(CONFIG_FILE_NAME);
    if !path.is_file() {
        log::debug!("No config file at {}, using defaults", path.display());
        return Ok(opts);
    }

    parse_propfile_at::<anyhow::Error>(&path, &mut |key, value| {
        opts.apply(key, value)
            .with_context(|| format!("Bad value for {} in {}", key, path.display()))
    })
    .with_context(|| format!("Failed to load {}", path.display()))?;

    Ok(opts)
}

fn parse_positive(s: &str) -> Result<u32> {
    let value: u32 = s.trim().parse().context("Not a number")?;
    if value == 0 {
        bail!("Value must be positive");
    }
    Ok(value)
}

/// Parse an output sample rate in Hz
pub fn parse_sample_rate(s: &str) -> Result<u32> {
    const MIN_RATE: u32 = 8_000;
    const MAX_RATE: u32 = 192_000;

    let rate: u32 = s.trim().parse().context("Invalid sample rate")?;
    if !(MIN_RATE..=MAX_RATE).contains(&rate) {
        bail!("Sample rate out of range ({} to {} Hz)", MIN_RATE, MAX_RATE);
    }
    Ok(rate)
}

/// Parse a carrier phase offset in degrees
pub fn parse_phase_offset(s: &str) -> Result<f64> {
    let degrees: f64 = s.trim().parse().context("Invalid phase offset")?;
    if !(0.0..=360.0).contains(&degrees) {
        bail!("Phase offset out of range (0 to 360 degrees)");
    }
    Ok(degrees)
}

pub fn parse_log_level(s: &str) -> Result<LogLevel> {
    match LogLevel::from_name(s) {
        Some(level) => Ok(level),
        None => bail!(
            "Invalid log level: {}. Valid options: nothing, error, warning, info, debug, all, 0-5",
            s
        ),
    }
}

/// Parse a sink selection: `audio`, `null` or `raw:<path>`
pub fn parse_sink(s: &str) -> Result<SinkKind> {
    let s = s.trim();
    if let Some(path) = s.strip_prefix("raw:") {
        if path.is_empty() {
            bail!("Raw sink needs a file path (raw:<path>)");
        }
        return Ok(SinkKind::Raw(PathBuf::from(path)));
    }
    match s.to_lowercase().as_str() {
        "audio" | "default" => Ok(SinkKind::Audio),
        "null" | "none" | "mute" => Ok(SinkKind::Null),
        _ => bail!("Invalid sink: {}. Valid options: audio, null, raw:<path>", s),
    }
}

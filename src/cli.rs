use std::path::PathBuf;

use crate::config::{parse_log_level, parse_phase_offset, parse_sample_rate, Options};
use crate::logging::LogLevel;
use crate::sink::SinkKind;
use anyhow::Result;
use clap::Parser;

/// Light strip controller driving the strip over an audio line
#[derive(Parser, Debug, Default)]
#[command(name = "lsp-ctrl")]
#[command(version)]
#[command(
    about = "Light strip controller - sends commands to the strip as serial-over-audio",
    long_about = "Reads one request per line on stdin (status, on, off, brightness <n>, \
                  interrupt <vector> [arg], load <program>, programs) and answers each \
                  with a JSON line."
)]
pub struct Cli {
    /// Configuration directory path
    #[arg(short, long, value_name = "CONFIGDIR")]
    pub configdir: Option<String>,

    /// Output sample rate in Hz
    #[arg(short, long, value_name = "HZ", value_parser = parse_sample_rate)]
    pub rate: Option<u32>,

    /// Baud rate divisor (baud = rate / divisor)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub divisor: Option<u32>,

    /// Carrier waves per bit
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub waves: Option<u32>,

    /// Carrier phase offset in degrees
    #[arg(long, value_name = "DEGREES", value_parser = parse_phase_offset)]
    pub phase: Option<f64>,

    /// Pause between halt and rewind during a program load
    #[arg(long = "settle-ms", value_name = "MS")]
    pub settle_ms: Option<u64>,

    /// Directory of compiled programs
    #[arg(short, long, value_name = "DIR")]
    pub progs: Option<String>,

    /// Log file path
    #[arg(short, long, value_name = "FILE")]
    pub logfile: Option<String>,

    /// Log verbosity (nothing, error, warning, info, debug, all)
    #[arg(short, long, value_name = "LEVEL", value_parser = parse_log_level)]
    pub verbosity: Option<LogLevel>,

    /// Write raw little-endian PCM to a file instead of playing it
    #[arg(long = "raw-out", value_name = "FILE", conflicts_with = "mute")]
    pub raw_out: Option<String>,

    /// Do not transmit anything
    #[arg(short, long)]
    pub mute: bool,
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref config_dir) = self.configdir {
            opts.config_dir = Some(config_dir.clone());
        }

        if let Some(rate) = self.rate {
            opts.sample_rate = rate;
        }
        if let Some(divisor) = self.divisor {
            opts.baud_divisor = divisor;
        }
        if let Some(waves) = self.waves {
            opts.waves_per_bit = waves;
        }
        if let Some(phase) = self.phase {
            opts.phase_offset_degrees = phase;
        }
        if let Some(settle_ms) = self.settle_ms {
            opts.settle_delay_ms = settle_ms;
        }

        if let Some(ref progs) = self.progs {
            opts.program_dir = PathBuf::from(progs);
        }

        if let Some(ref log_file) = self.logfile {
            opts.log_file = Some(log_file.clone());
        }
        if let Some(verbosity) = self.verbosity {
            opts.log_level = verbosity;
        }

        if let Some(ref raw_out) = self.raw_out {
            opts.sink = SinkKind::Raw(PathBuf::from(raw_out));
        }
        if self.mute {
            opts.sink = SinkKind::Null;
        }

        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_no_flags_keeps_options() {
        let cli = Cli::default();
        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn test_merge_timing_options() {
        let cli = Cli::try_parse_from([
            "lsp-ctrl", "--rate", "48000", "--divisor", "8", "--waves", "2", "--phase", "45",
            "--settle-ms", "20",
        ])
        .unwrap();
        assert_eq!(cli.rate, Some(48_000));
        assert_eq!(cli.phase, Some(45.0));

        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts.sample_rate, 48_000);
        assert_eq!(opts.baud_divisor, 8);
        assert_eq!(opts.waves_per_bit, 2);
        assert_eq!(opts.phase_offset_degrees, 45.0);
        assert_eq!(opts.settle_delay_ms, 20);
        assert_eq!(opts.timing().unwrap().baud_rate(), 6_000);
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = Options {
            sink: SinkKind::Null,
            log_level: LogLevel::Error,
            ..Options::default()
        };
        let cli = Cli {
            raw_out: Some("line.raw".to_string()),
            verbosity: Some(LogLevel::Debug),
            ..Default::default()
        };

        let opts = cli.merge_into_options(config).unwrap();
        assert_eq!(opts.sink, SinkKind::Raw(PathBuf::from("line.raw")));
        assert_eq!(opts.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_mute_selects_null_sink() {
        let cli = Cli::try_parse_from(["lsp-ctrl", "-m"]).unwrap();
        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts.sink, SinkKind::Null);
    }

    #[test]
    fn test_verbosity_uses_level_names() {
        let cli = Cli::try_parse_from(["lsp-ctrl", "--verbosity", "warn"]).unwrap();
        assert_eq!(cli.verbosity, Some(LogLevel::Warning));
    }

    #[rstest]
    #[case(&["--rate", "fast"])]
    #[case(&["--rate", "1000000"])]
    #[case(&["--divisor", "0"])]
    #[case(&["--waves", "0"])]
    #[case(&["--phase", "400"])]
    #[case(&["--verbosity", "loud"])]
    #[case(&["--mute", "--raw-out", "x.raw"])]
    fn test_invalid_args_rejected(#[case] args: &[&str]) {
        let argv = std::iter::once("lsp-ctrl").chain(args.iter().copied());
        assert!(Cli::try_parse_from(argv).is_err(), "{:?} should be rejected", args);
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from(["lsp-ctrl", "--rate", "22050", "--settle-ms", "50", "--mute"])
            .unwrap();
        assert_eq!(cli.rate, Some(22_050));
        assert_eq!(cli.settle_ms, Some(50));
        assert!(cli.mute);
    }
}

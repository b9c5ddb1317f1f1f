//! Configuration and CLI argument handling

use clap::{Parser, ValueEnum};

/// Unit in which durations are typed at the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DurationUnit {
    Seconds,
    Minutes,
}

impl DurationUnit {
    /// Convert a typed amount to seconds, or `None` on overflow
    pub fn to_seconds(self, amount: u64) -> Option<u64> {
        match self {
            DurationUnit::Seconds => Some(amount),
            DurationUnit::Minutes => amount.checked_mul(60),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationUnit::Seconds => "seconds",
            DurationUnit::Minutes => "minutes",
        }
    }
}

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "multi-timer")]
#[command(about = "Run several named countdown timers side by side")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Unit for durations typed with `add`
    #[arg(short, long, value_enum, default_value = "seconds")]
    pub unit: DurationUnit,

    /// Duration used by `add` when none is given, in the chosen unit
    #[arg(short, long, default_value = "60")]
    pub default_duration: u64,

    /// Render snapshots and completions as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion() {
        assert_eq!(DurationUnit::Seconds.to_seconds(90), Some(90));
        assert_eq!(DurationUnit::Minutes.to_seconds(2), Some(120));
        assert_eq!(DurationUnit::Minutes.to_seconds(u64::MAX), None);
    }

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["multi-timer"]).unwrap();
        assert_eq!(config.unit, DurationUnit::Seconds);
        assert_eq!(config.default_duration, 60);
        assert!(!config.json);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_minutes_and_verbose() {
        let config = Config::try_parse_from(["multi-timer", "--unit", "minutes", "-v"]).unwrap();
        assert_eq!(config.unit, DurationUnit::Minutes);
        assert_eq!(config.log_level(), "debug");
    }
}

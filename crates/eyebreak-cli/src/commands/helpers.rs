//! Shared configuration arguments for CLI commands

use anyhow::Result;
use clap::Args;
use eyebreak_core::MonitorConfig;
use std::path::PathBuf;

/// Configuration file plus per-option overrides
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Seconds a visibility change must persist before it is trusted
    #[arg(long)]
    pub confirmation_window: Option<f64>,
    /// Seconds of continuous presence before a break is owed
    #[arg(long)]
    pub time_before_break: Option<f64>,
    /// Seconds of absence that satisfy an owed break
    #[arg(long)]
    pub break_time: Option<f64>,
    /// Maximum frames sampled per second
    #[arg(long)]
    pub frame_rate: Option<f64>,
    /// Suppress state-transition notifications
    #[arg(short, long)]
    pub quiet: bool,
}

impl ConfigArgs {
    /// Load the config file (if any) and apply command-line overrides
    pub fn resolve(&self) -> Result<MonitorConfig> {
        let config = MonitorConfig::load_or_default(self.config.as_deref())?;
        Ok(self.apply(config))
    }

    fn apply(&self, mut config: MonitorConfig) -> MonitorConfig {
        if let Some(v) = self.confirmation_window {
            config.confirmation_window = v;
        }
        if let Some(v) = self.time_before_break {
            config.time_before_break = v;
        }
        if let Some(v) = self.break_time {
            config.break_time = v;
        }
        if let Some(v) = self.frame_rate {
            config.frame_rate = v;
        }
        if self.quiet {
            config.debug = false;
        }
        config
    }
}

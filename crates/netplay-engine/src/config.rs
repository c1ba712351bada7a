//! Session configuration, validation, and error types.
//!
//! [`PlayConfig`] is the input for constructing a
//! [`GameSession`](crate::session::GameSession) or a bare
//! [`PacingController`](crate::pacing::PacingController).
//! [`validate()`](PlayConfig::validate) checks structural invariants at
//! startup so that the loop itself never has to.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

// ── QueueMode ─────────────────────────────────────────────────────

/// Queuing discipline shared by the outbound and inbound adapters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QueueMode {
    /// Capacity-one slots; a newer item replaces an unconsumed one. The
    /// loop sleeps to hold the configured step rate.
    #[default]
    SingleSlot,
    /// Unbounded FIFO queues; nothing is dropped. The loop waits for one
    /// action per step, bounded by the remaining run time.
    Streaming,
}

impl fmt::Display for QueueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleSlot => write!(f, "single-slot"),
            Self::Streaming => write!(f, "streaming"),
        }
    }
}

// ── ProbeConfig ───────────────────────────────────────────────────

/// Command run by the latency probe.
#[derive(Clone, Debug, PartialEq)]
pub enum ProbeCommand {
    /// `ping <host> -w <duration> -i <interval>`.
    Ping {
        /// Host to ping.
        host: String,
        /// Interval between echo requests.
        interval: Duration,
    },
    /// An arbitrary program, for hosts without `ping`.
    Custom {
        /// Program to execute.
        program: String,
        /// Arguments passed verbatim.
        args: Vec<String>,
    },
}

/// Configuration for the side-channel latency probe.
///
/// The probe's standard output is written to `ping.txt` in the results
/// directory, so a probe requires `results_dir` to be set.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeConfig {
    /// What to run.
    pub command: ProbeCommand,
    /// Seconds the probe outlives the run's time limit. Default: 4.
    pub extra_secs: u64,
}

impl ProbeConfig {
    /// Ping `host` every 200 ms.
    pub fn ping(host: impl Into<String>) -> Self {
        Self {
            command: ProbeCommand::Ping {
                host: host.into(),
                interval: Duration::from_millis(200),
            },
            extra_secs: 4,
        }
    }
}

// ── ConfigError ───────────────────────────────────────────────────

/// Errors detected during [`PlayConfig::validate()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `steps_per_second` is zero.
    InvalidStepRate,
    /// `time_limit_secs` is zero.
    InvalidTimeLimit,
    /// A probe is configured but there is no directory for its output.
    ProbeWithoutResultsDir,
    /// The probe's ping interval is zero.
    InvalidProbeInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStepRate => write!(f, "steps_per_second must be at least 1"),
            Self::InvalidTimeLimit => write!(f, "time_limit_secs must be at least 1"),
            Self::ProbeWithoutResultsDir => {
                write!(f, "latency probe requires results_dir to be set")
            }
            Self::InvalidProbeInterval => write!(f, "probe interval must be positive"),
        }
    }
}

impl Error for ConfigError {}

// ── PlayConfig ────────────────────────────────────────────────────

/// Complete configuration for one real-time run.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayConfig {
    /// Target simulation rate. Default: 20.
    pub steps_per_second: u32,
    /// Consecutive missing actions answered by repeating the previous
    /// action before falling back to the no-op. Default: 1.
    pub frame_skip_tolerance: u32,
    /// Run length in seconds; together with the rate it fixes the step
    /// budget. Default: 60.
    pub time_limit_secs: u32,
    /// Queuing discipline for both adapters. Default: single-slot.
    pub mode: QueueMode,
    /// Forward `render()` to the environment after every step.
    pub render: bool,
    /// Where to write `results.json` and `game_stats.json`. `None`
    /// disables persistence.
    pub results_dir: Option<PathBuf>,
    /// Optional side-channel latency probe.
    pub probe: Option<ProbeConfig>,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            steps_per_second: 20,
            frame_skip_tolerance: 1,
            time_limit_secs: 60,
            mode: QueueMode::SingleSlot,
            render: false,
            results_dir: None,
            probe: None,
        }
    }
}

impl PlayConfig {
    /// Check all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps_per_second == 0 {
            return Err(ConfigError::InvalidStepRate);
        }
        if self.time_limit_secs == 0 {
            return Err(ConfigError::InvalidTimeLimit);
        }
        if let Some(probe) = &self.probe {
            if self.results_dir.is_none() {
                return Err(ConfigError::ProbeWithoutResultsDir);
            }
            if let ProbeCommand::Ping { interval, .. } = &probe.command {
                if interval.is_zero() {
                    return Err(ConfigError::InvalidProbeInterval);
                }
            }
        }
        Ok(())
    }

    /// Step budget: `steps_per_second × time_limit_secs`.
    pub fn max_steps(&self) -> u64 {
        u64::from(self.steps_per_second) * u64::from(self.time_limit_secs)
    }

    /// Pacing interval for single-slot mode.
    ///
    /// Returns `Duration::ZERO` for a zero rate; `validate()` rejects that
    /// configuration before it can reach the loop.
    pub fn step_interval(&self) -> Duration {
        if self.steps_per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(1_000_000_000 / u64::from(self.steps_per_second))
    }

    /// Wall-clock length of the run.
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(u64::from(self.time_limit_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = PlayConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_steps(), 1200);
        assert_eq!(cfg.step_interval(), Duration::from_millis(50));
    }

    #[test]
    fn zero_rate_fails() {
        let cfg = PlayConfig {
            steps_per_second: 0,
            ..PlayConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidStepRate));
        assert_eq!(cfg.step_interval(), Duration::ZERO);
    }

    #[test]
    fn zero_time_limit_fails() {
        let cfg = PlayConfig {
            time_limit_secs: 0,
            ..PlayConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidTimeLimit));
    }

    #[test]
    fn probe_needs_results_dir() {
        let mut cfg = PlayConfig {
            probe: Some(ProbeConfig::ping("127.0.0.1")),
            ..PlayConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ProbeWithoutResultsDir));
        cfg.results_dir = Some(PathBuf::from("out"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_probe_interval_fails() {
        let cfg = PlayConfig {
            results_dir: Some(PathBuf::from("out")),
            probe: Some(ProbeConfig {
                command: ProbeCommand::Ping {
                    host: "localhost".into(),
                    interval: Duration::ZERO,
                },
                extra_secs: 4,
            }),
            ..PlayConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidProbeInterval));
    }

    #[test]
    fn scenario_budget() {
        let cfg = PlayConfig {
            steps_per_second: 10,
            time_limit_secs: 2,
            ..PlayConfig::default()
        };
        assert_eq!(cfg.max_steps(), 20);
        assert_eq!(cfg.step_interval(), Duration::from_millis(100));
        assert_eq!(cfg.time_limit(), Duration::from_secs(2));
    }

    #[test]
    fn mode_display() {
        assert_eq!(QueueMode::SingleSlot.to_string(), "single-slot");
        assert_eq!(QueueMode::Streaming.to_string(), "streaming");
    }
}

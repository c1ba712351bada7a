//! Side-channel latency probe.
//!
//! Runs `ping` (or a custom command) next to the session so that network
//! round-trip times can be compared with action lag afterwards. Output
//! goes to a file; the process is killed at session end if it is still
//! running.

use std::fs::File;
use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{ProbeCommand, ProbeConfig};

/// How the probe process ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeExit {
    /// Whether the process had to be killed.
    pub killed: bool,
    /// Exit code, if the process exited on its own with one.
    pub code: Option<i32>,
}

/// A running probe process.
#[derive(Debug)]
pub struct LatencyProbe {
    child: Child,
}

impl LatencyProbe {
    /// Start the probe for `run_length` plus the configured grace,
    /// writing its standard output to `output`.
    pub fn spawn(config: &ProbeConfig, run_length: Duration, output: &Path) -> io::Result<Self> {
        let lifetime = run_length.as_secs() + config.extra_secs;
        let mut cmd = match &config.command {
            ProbeCommand::Ping { host, interval } => {
                let mut cmd = Command::new("ping");
                cmd.arg(host)
                    .arg("-w")
                    .arg(lifetime.to_string())
                    .arg("-i")
                    .arg(format!("{:.3}", interval.as_secs_f64()));
                cmd
            }
            ProbeCommand::Custom { program, args } => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
        };
        let stdout = File::create(output)?;
        let child = cmd
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::null())
            .spawn()?;
        debug!(pid = child.id(), lifetime_secs = lifetime, "latency probe started");
        Ok(Self { child })
    }

    /// OS process id.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Kill the process if it is still alive and reap it.
    pub fn stop(mut self) -> ProbeExit {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                return ProbeExit {
                    killed: false,
                    code: status.code(),
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not poll latency probe"),
        }
        if let Err(e) = self.child.kill() {
            warn!(error = %e, "could not kill latency probe");
        }
        let code = self.child.wait().ok().and_then(|s| s.code());
        ProbeExit { killed: true, code }
    }
}

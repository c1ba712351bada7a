//! Thread wiring for a complete run.
//!
//! [`GameSession::run`] starts the optional latency probe, spawns the
//! transport loops on named threads, runs the pacing loop on the calling
//! thread, and then shuts down in phases:
//!
//! 1. The outbound stream is closed (the pacing loop does this when it
//!    stops) and the uplink thread is joined within a budget.
//! 2. The inbound side is closed and the downlink thread is joined if it
//!    finishes within a budget. A downlink still blocked in the network
//!    is left detached.
//! 3. The probe is killed if still alive.
//!
//! Results are written to the configured directory after shutdown.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use netplay_core::{Environment, ObservationCodec, TransportError};
use netplay_record::{RecordPaths, RunRecorder, PING_FILE};
use tracing::{info, warn};

use crate::config::PlayConfig;
use crate::error::PlayError;
use crate::pacing::{PacingController, RunReport};
use crate::probe::{LatencyProbe, ProbeExit};
use crate::transport::{Downlink, Uplink};

const UPLINK_JOIN_BUDGET: Duration = Duration::from_secs(1);
const DOWNLINK_JOIN_BUDGET: Duration = Duration::from_millis(200);

/// How the session's threads and probe were shut down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Total shutdown wall time in milliseconds.
    pub total_ms: u64,
    /// Time spent waiting for the uplink in milliseconds.
    pub uplink_ms: u64,
    /// Time spent waiting for the downlink in milliseconds.
    pub downlink_ms: u64,
    /// Whether the uplink thread was joined.
    pub uplink_joined: bool,
    /// Whether the downlink thread was joined (`false` means detached).
    pub downlink_joined: bool,
    /// Errors returned by the transport loops, and panics reported as
    /// disconnects.
    pub transport_errors: Vec<TransportError>,
    /// How the latency probe ended, if one ran.
    pub probe: Option<ProbeExit>,
}

/// Everything a finished session produced.
#[derive(Debug)]
pub struct SessionOutcome {
    /// The pacing loop's report.
    pub report: RunReport,
    /// Shutdown details.
    pub shutdown: SessionReport,
    /// Where results were written, if a results directory was set.
    pub record: Option<RecordPaths>,
}

/// A configured run waiting for its transport.
pub struct GameSession<E, C> {
    config: PlayConfig,
    env: E,
    codec: C,
}

impl<E, C> GameSession<E, C>
where
    E: Environment,
    C: ObservationCodec<E::Observation>,
{
    /// Bundle a configuration with its collaborators.
    pub fn new(config: PlayConfig, env: E, codec: C) -> Self {
        Self { config, env, codec }
    }

    /// The session's configuration.
    pub fn config(&self) -> &PlayConfig {
        &self.config
    }

    /// Run to completion against `uplink` and `downlink`.
    ///
    /// Blocks for at most the configured time limit plus the shutdown
    /// budgets. The transport threads are cleaned up before any pacing
    /// error is returned.
    pub fn run<U, D>(self, uplink: U, downlink: D) -> Result<SessionOutcome, PlayError>
    where
        U: Uplink,
        D: Downlink<E::Action>,
    {
        let Self { config, env, codec } = self;
        let (controller, frames, actions) = PacingController::new(config.clone(), env, codec)?;
        let closer = controller.inbound_closer();
        let recorder = config
            .results_dir
            .as_ref()
            .map(|dir| RunRecorder::new(dir.clone()));

        let probe = match (&config.probe, &recorder) {
            (Some(probe_config), Some(recorder)) => {
                std::fs::create_dir_all(recorder.dir()).map_err(PlayError::Probe)?;
                let output = recorder.dir().join(PING_FILE);
                Some(
                    LatencyProbe::spawn(probe_config, config.time_limit(), &output)
                        .map_err(PlayError::Probe)?,
                )
            }
            _ => None,
        };

        let uplink_handle = spawn_loop("netplay-uplink", move || {
            let mut uplink = uplink;
            uplink.run(frames)
        });
        let uplink_handle = match uplink_handle {
            Ok(handle) => handle,
            Err(e) => {
                closer.close();
                if let Some(probe) = probe {
                    probe.stop();
                }
                return Err(e);
            }
        };
        let downlink_handle = spawn_loop("netplay-downlink", move || {
            let mut downlink = downlink;
            downlink.run(actions)
        });
        let downlink_handle = match downlink_handle {
            Ok(handle) => handle,
            Err(e) => {
                // Dropping the controller closes the outbound stream.
                drop(controller);
                closer.close();
                let _ = uplink_handle.join();
                if let Some(probe) = probe {
                    probe.stop();
                }
                return Err(e);
            }
        };

        info!(mode = %config.mode, "session started");
        let result = controller.run();

        // Phase 1: outbound is closed; wait for the uplink to drain.
        let start = Instant::now();
        let mut shutdown = SessionReport::default();
        let uplink_finished = wait_finished(&uplink_handle, UPLINK_JOIN_BUDGET);
        shutdown.uplink_joined =
            join_loop("netplay-uplink", uplink_handle, uplink_finished, &mut shutdown);
        shutdown.uplink_ms = millis(start.elapsed());

        // Phase 2: close inbound, give the downlink a moment to notice.
        closer.close();
        let downlink_finished = wait_finished(&downlink_handle, DOWNLINK_JOIN_BUDGET);
        shutdown.downlink_joined = join_loop(
            "netplay-downlink",
            downlink_handle,
            downlink_finished,
            &mut shutdown,
        );
        shutdown.downlink_ms = millis(start.elapsed()).saturating_sub(shutdown.uplink_ms);

        // Phase 3: probe.
        shutdown.probe = probe.map(LatencyProbe::stop);
        shutdown.total_ms = millis(start.elapsed());

        let report = result?;
        let record = match &recorder {
            Some(recorder) => Some(recorder.save(report.summary(), report.outcomes())?),
            None => None,
        };
        if let Some(paths) = &record {
            info!(results = %paths.results.display(), "results written");
        }

        Ok(SessionOutcome {
            report,
            shutdown,
            record,
        })
    }
}

fn spawn_loop<F>(name: &str, body: F) -> Result<JoinHandle<Result<(), TransportError>>, PlayError>
where
    F: FnOnce() -> Result<(), TransportError> + Send + 'static,
{
    thread::Builder::new()
        .name(name.into())
        .spawn(body)
        .map_err(|e| PlayError::ThreadSpawn {
            reason: format!("{name}: {e}"),
        })
}

fn wait_finished<T>(handle: &JoinHandle<T>, budget: Duration) -> bool {
    let deadline = Instant::now() + budget;
    while !handle.is_finished() {
        if Instant::now() > deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
    true
}

/// Join `handle` if it has finished, recording its result. An unfinished
/// handle is dropped, which detaches the thread.
fn join_loop(
    name: &str,
    handle: JoinHandle<Result<(), TransportError>>,
    finished: bool,
    report: &mut SessionReport,
) -> bool {
    if !finished {
        warn!(thread = name, "transport loop did not stop; leaving it detached");
        return false;
    }
    match handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            warn!(thread = name, error = %e, "transport loop failed");
            report.transport_errors.push(e);
        }
        Err(_) => {
            warn!(thread = name, "transport loop panicked");
            report.transport_errors.push(TransportError::Disconnected {
                reason: format!("{name} panicked"),
            });
        }
    }
    true
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

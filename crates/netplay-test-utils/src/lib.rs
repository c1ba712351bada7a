//! Test utilities and mock collaborators for netplay development.
//!
//! Provides a configurable [`ScriptedEnv`] implementing
//! [`Environment`], and codecs implementing [`ObservationCodec`]
//! ([`PassthroughCodec`], [`FailingCodec`]). Record builders live in
//! [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use netplay_core::{
    CodecError, EncodedObservation, EnvError, Environment, ObservationCodec, StepInfo, Transition,
};
use smallvec::smallvec;

/// Shared, cloneable log of the actions an environment applied.
///
/// The environment moves into the code under test; keep a clone of its
/// log to inspect afterwards.
#[derive(Clone, Debug, Default)]
pub struct ActionLog(Arc<Mutex<Vec<u8>>>);

impl ActionLog {
    fn push(&self, action: u8) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action);
    }

    /// Copy of every action applied so far, in order.
    pub fn snapshot(&self) -> Vec<u8> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Deterministic environment with byte-vector observations and `u8`
/// actions.
///
/// Never terminates unless told to. The observation after step `n` of an
/// episode is `obs_len` copies of `n as u8`.
#[derive(Debug)]
pub struct ScriptedEnv {
    obs_len: usize,
    episode_len: Option<u64>,
    done_at: Vec<u64>,
    reward: f64,
    lives: Option<u32>,
    fail_on_step: Option<u64>,
    fail_on_reset: Option<u64>,
    steps: u64,
    episode_steps: u64,
    resets: u64,
    renders: u64,
    log: ActionLog,
}

impl ScriptedEnv {
    /// The no-op action.
    pub const NOOP: u8 = 0;

    pub fn new() -> Self {
        Self {
            obs_len: 16,
            episode_len: None,
            done_at: Vec::new(),
            reward: 0.0,
            lives: None,
            fail_on_step: None,
            fail_on_reset: None,
            steps: 0,
            episode_steps: 0,
            resets: 0,
            renders: 0,
            log: ActionLog::default(),
        }
    }

    /// Observation size in bytes.
    pub fn obs_len(mut self, n: usize) -> Self {
        self.obs_len = n;
        self
    }

    /// End every episode after `n` steps.
    pub fn done_every(mut self, n: u64) -> Self {
        self.episode_len = Some(n);
        self
    }

    /// Report `done` on the given zero-based global step indices.
    pub fn done_at(mut self, steps: &[u64]) -> Self {
        self.done_at = steps.to_vec();
        self
    }

    pub fn reward_per_step(mut self, reward: f64) -> Self {
        self.reward = reward;
        self
    }

    /// Report `lives` in every step's info.
    pub fn lives(mut self, lives: u32) -> Self {
        self.lives = Some(lives);
        self
    }

    /// Fail the step with this zero-based global index.
    pub fn fail_on_step(mut self, step: u64) -> Self {
        self.fail_on_step = Some(step);
        self
    }

    /// Fail the reset with this zero-based index.
    pub fn fail_on_reset(mut self, reset: u64) -> Self {
        self.fail_on_reset = Some(reset);
        self
    }

    /// Handle to the log of applied actions.
    pub fn action_log(&self) -> ActionLog {
        self.log.clone()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn resets(&self) -> u64 {
        self.resets
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    fn observation(&self) -> Vec<u8> {
        vec![self.episode_steps as u8; self.obs_len]
    }
}

impl Default for ScriptedEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for ScriptedEnv {
    type Observation = Vec<u8>;
    type Action = u8;

    fn reset(&mut self) -> Result<Vec<u8>, EnvError> {
        if self.fail_on_reset == Some(self.resets) {
            return Err(EnvError::ResetFailed {
                reason: format!("scripted failure on reset {}", self.resets),
            });
        }
        self.resets += 1;
        self.episode_steps = 0;
        Ok(self.observation())
    }

    fn step(&mut self, action: u8) -> Result<Transition<Vec<u8>>, EnvError> {
        let index = self.steps;
        if self.fail_on_step == Some(index) {
            return Err(EnvError::StepFailed {
                reason: format!("scripted failure on step {index}"),
            });
        }
        self.log.push(action);
        self.steps += 1;
        self.episode_steps += 1;
        let done = self.done_at.contains(&index)
            || self.episode_len.is_some_and(|n| self.episode_steps >= n);
        Ok(Transition {
            observation: self.observation(),
            reward: self.reward,
            done,
            info: StepInfo { lives: self.lives },
        })
    }

    fn noop_action(&self) -> u8 {
        Self::NOOP
    }

    fn render(&mut self) {
        self.renders += 1;
    }
}

/// Single-plane codec that copies the observation bytes unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughCodec;

impl ObservationCodec<Vec<u8>> for PassthroughCodec {
    fn encode(&self, observation: &Vec<u8>) -> Result<EncodedObservation, CodecError> {
        Ok(smallvec![observation.clone()])
    }

    fn decode(&self, planes: &EncodedObservation) -> Result<Vec<u8>, CodecError> {
        match planes.as_slice() {
            [plane] => Ok(plane.clone()),
            _ => Err(CodecError::PlaneCountMismatch {
                expected: 1,
                found: planes.len(),
            }),
        }
    }
}

/// Passthrough codec that fails every encode after the first `n`.
#[derive(Debug)]
pub struct FailingCodec {
    succeed: u64,
    calls: AtomicU64,
}

impl FailingCodec {
    pub fn after(n: u64) -> Self {
        Self {
            succeed: n,
            calls: AtomicU64::new(0),
        }
    }

    /// Encode attempts so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl ObservationCodec<Vec<u8>> for FailingCodec {
    fn encode(&self, observation: &Vec<u8>) -> Result<EncodedObservation, CodecError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if call >= self.succeed {
            return Err(CodecError::EncodeFailed {
                plane: Some(0),
                reason: format!("scripted failure on encode {call}"),
            });
        }
        PassthroughCodec.encode(observation)
    }

    fn decode(&self, planes: &EncodedObservation) -> Result<Vec<u8>, CodecError> {
        PassthroughCodec.decode(planes)
    }
}

//! Circuit breaker state tracking.
//!
//! # States
//! - Closed: calls pass through, outcomes recorded in a sliding window
//! - Open: calls fail fast without invoking the inner operation
//! - HalfOpen: exactly one probe call is admitted
//!
//! # State Transitions
//! ```text
//! Closed → Open: window has >= minimum_throughput samples and
//!                failure ratio >= failure_ratio
//! Open → HalfOpen: break_duration elapsed since opened_at
//! HalfOpen → Closed: probe succeeds (window cleared)
//! HalfOpen → Open: probe fails (opened_at reset)
//! HalfOpen → HalfOpen: probe abandoned (permit dropped unsettled);
//!                      the probe slot frees for the next caller
//! ```
//!
//! # Design Decisions
//! - One breaker per pipeline key, shared by every concurrent caller
//! - Single probe in HalfOpen; concurrent callers during the probe fail fast
//! - Admission is a permit whose `Drop` releases the probe slot, so a caller
//!   that cancels mid-attempt can never wedge the circuit in HalfOpen
//! - Window entries older than the sampling window are pruned on every
//!   mutation, so the ratio only ever reflects recent outcomes
//! - A single mutex guards phase + window; lost updates would corrupt the
//!   failure-ratio computation

use crate::error::CallError;
use crate::observability::metrics;
use crate::resilience::policy::PipelinePolicy;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

/// Circuit phase, observable for tests and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitPhase {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitPhase::Closed => "closed",
            CircuitPhase::Open => "open",
            CircuitPhase::HalfOpen => "half_open",
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    phase: CircuitPhase,
    /// Set while phase == Open.
    opened_at: Option<Instant>,
    /// Set while the HalfOpen probe is in flight.
    probe_in_flight: bool,
    /// Sliding window of (timestamp, success) outcomes.
    window: VecDeque<(Instant, bool)>,
}

/// Per-pipeline circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    pipeline: String,
    policy: PipelinePolicy,
    state: Mutex<BreakerState>,
}

/// Permission to run one attempt, handed out by
/// [`CircuitBreaker::try_acquire`].
///
/// The holder settles the permit with [`record_success`](Self::record_success)
/// or [`record_failure`](Self::record_failure). A permit dropped unsettled
/// (the attempt future was cancelled mid-flight) is not a window sample; if
/// it held the HalfOpen probe slot, the slot frees for the next caller.
#[must_use = "an unsettled permit records no outcome"]
pub struct AttemptPermit<'a> {
    breaker: &'a CircuitBreaker,
    is_probe: bool,
    settled: bool,
}

impl AttemptPermit<'_> {
    pub fn record_success(mut self) {
        self.settled = true;
        self.breaker.record_success();
    }

    pub fn record_failure(mut self) {
        self.settled = true;
        self.breaker.record_failure();
    }
}

impl Drop for AttemptPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.is_probe {
            self.breaker.release_probe();
        }
    }
}

impl CircuitBreaker {
    pub fn new(pipeline: impl Into<String>, policy: PipelinePolicy) -> Self {
        Self {
            pipeline: pipeline.into(),
            policy,
            state: Mutex::new(BreakerState {
                phase: CircuitPhase::Closed,
                opened_at: None,
                probe_in_flight: false,
                window: VecDeque::new(),
            }),
        }
    }

    /// Ask permission to run one attempt.
    ///
    /// Returns `CircuitOpen` without touching the inner operation when the
    /// circuit is Open (or a HalfOpen probe is already in flight).
    pub fn try_acquire(&self) -> Result<AttemptPermit<'_>, CallError> {
        let mut state = self.state.lock().expect("circuit breaker mutex poisoned");
        let is_probe = match state.phase {
            CircuitPhase::Closed => false,
            CircuitPhase::Open => {
                let opened_at = state.opened_at.unwrap_or_else(Instant::now);
                if opened_at.elapsed() >= self.policy.break_duration {
                    self.transition(&mut state, CircuitPhase::HalfOpen);
                    state.probe_in_flight = true;
                    true
                } else {
                    return Err(CallError::CircuitOpen {
                        pipeline: self.pipeline.clone(),
                    });
                }
            }
            CircuitPhase::HalfOpen => {
                if state.probe_in_flight {
                    return Err(CallError::CircuitOpen {
                        pipeline: self.pipeline.clone(),
                    });
                }
                state.probe_in_flight = true;
                true
            }
        };
        Ok(AttemptPermit {
            breaker: self,
            is_probe,
            settled: false,
        })
    }

    /// Record a successful attempt outcome.
    pub fn record_success(&self) {
        let mut state = self.state.lock().expect("circuit breaker mutex poisoned");
        match state.phase {
            CircuitPhase::Closed => {
                let now = Instant::now();
                state.window.push_back((now, true));
                self.prune(&mut state, now);
            }
            CircuitPhase::HalfOpen => {
                state.probe_in_flight = false;
                state.window.clear();
                state.opened_at = None;
                self.transition(&mut state, CircuitPhase::Closed);
            }
            // Outcome of an attempt admitted before the circuit opened.
            CircuitPhase::Open => {}
        }
    }

    /// Record a failed attempt outcome (including timeouts).
    pub fn record_failure(&self) {
        let mut state = self.state.lock().expect("circuit breaker mutex poisoned");
        match state.phase {
            CircuitPhase::Closed => {
                let now = Instant::now();
                state.window.push_back((now, false));
                self.prune(&mut state, now);
                if self.should_open(&state) {
                    state.opened_at = Some(now);
                    self.transition(&mut state, CircuitPhase::Open);
                }
            }
            CircuitPhase::HalfOpen => {
                state.probe_in_flight = false;
                state.opened_at = Some(Instant::now());
                self.transition(&mut state, CircuitPhase::Open);
            }
            CircuitPhase::Open => {}
        }
    }

    /// Current phase.
    pub fn phase(&self) -> CircuitPhase {
        self.state
            .lock()
            .expect("circuit breaker mutex poisoned")
            .phase
    }

    /// Free the probe slot when an admitted probe was abandoned without an
    /// outcome.
    fn release_probe(&self) {
        let mut state = self.state.lock().expect("circuit breaker mutex poisoned");
        if state.phase == CircuitPhase::HalfOpen && state.probe_in_flight {
            state.probe_in_flight = false;
            tracing::warn!(pipeline = %self.pipeline, "Probe abandoned, freeing the slot");
        }
    }

    fn prune(&self, state: &mut BreakerState, now: Instant) {
        while let Some(&(ts, _)) = state.window.front() {
            if now.duration_since(ts) > self.policy.sampling_window {
                state.window.pop_front();
            } else {
                break;
            }
        }
    }

    fn should_open(&self, state: &BreakerState) -> bool {
        let samples = state.window.len();
        if samples < self.policy.minimum_throughput as usize {
            return false;
        }
        let failures = state.window.iter().filter(|(_, ok)| !ok).count();
        failures as f64 / samples as f64 >= self.policy.failure_ratio
    }

    fn transition(&self, state: &mut BreakerState, to: CircuitPhase) {
        let from = state.phase;
        state.phase = to;
        tracing::warn!(
            pipeline = %self.pipeline,
            from = from.as_str(),
            to = to.as_str(),
            "Circuit phase transition"
        );
        metrics::record_circuit_transition(&self.pipeline, to.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast_policy() -> PipelinePolicy {
        PipelinePolicy {
            minimum_throughput: 4,
            failure_ratio: 0.5,
            sampling_window: Duration::from_secs(10),
            break_duration: Duration::from_millis(50),
            ..PipelinePolicy::default()
        }
    }

    #[test]
    fn test_stays_closed_below_minimum_throughput() {
        let breaker = CircuitBreaker::new("test", fast_policy());
        for _ in 0..3 {
            breaker.try_acquire().unwrap().record_failure();
        }
        assert_eq!(breaker.phase(), CircuitPhase::Closed);
    }

    #[test]
    fn test_opens_at_failure_ratio() {
        let breaker = CircuitBreaker::new("test", fast_policy());
        // 2 successes + 2 failures = 4 samples, ratio exactly 0.5.
        breaker.record_success();
        breaker.record_success();
        breaker.record_failure();
        assert_eq!(breaker.phase(), CircuitPhase::Closed);
        breaker.record_failure();
        assert_eq!(breaker.phase(), CircuitPhase::Open);
        assert!(breaker.try_acquire().is_err());
    }

    #[test]
    fn test_half_open_admits_single_probe() {
        let breaker = CircuitBreaker::new("test", fast_policy());
        for _ in 0..4 {
            breaker.record_failure();
        }
        assert_eq!(breaker.phase(), CircuitPhase::Open);

        std::thread::sleep(Duration::from_millis(60));

        // First caller gets the probe, second is rejected.
        let probe = breaker.try_acquire().unwrap();
        assert_eq!(breaker.phase(), CircuitPhase::HalfOpen);
        assert!(breaker.try_acquire().is_err());

        // Probe success closes the circuit and clears the window.
        probe.record_success();
        assert_eq!(breaker.phase(), CircuitPhase::Closed);
        breaker.record_failure();
        assert_eq!(breaker.phase(), CircuitPhase::Closed, "window was cleared");
    }

    #[test]
    fn test_failed_probe_reopens() {
        let breaker = CircuitBreaker::new("test", fast_policy());
        for _ in 0..4 {
            breaker.record_failure();
        }
        std::thread::sleep(Duration::from_millis(60));
        breaker.try_acquire().unwrap().record_failure();
        assert_eq!(breaker.phase(), CircuitPhase::Open);
        assert!(breaker.try_acquire().is_err(), "opened_at was reset");
    }

    #[test]
    fn test_abandoned_probe_frees_the_slot() {
        let breaker = CircuitBreaker::new("test", fast_policy());
        for _ in 0..4 {
            breaker.record_failure();
        }
        std::thread::sleep(Duration::from_millis(60));

        // A caller is admitted as the probe but drops the permit without an
        // outcome, as a cancelled attempt future does.
        let probe = breaker.try_acquire().unwrap();
        assert!(breaker.try_acquire().is_err());
        drop(probe);

        // The slot is free again; the next caller probes and can close.
        assert_eq!(breaker.phase(), CircuitPhase::HalfOpen);
        breaker.try_acquire().unwrap().record_success();
        assert_eq!(breaker.phase(), CircuitPhase::Closed);
    }
}

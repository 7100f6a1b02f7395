//! Baud-rate auto-detection
//!
//! Walks the candidate rates, pokes the receiver at each one and listens for
//! any sentence that validates and decodes. The link is put back at the
//! session's previous rate afterwards, whatever the result.

use crate::core::protocol::pmtk::{self, codes, BAUD_CANDIDATES, BIN_OFF};
use crate::core::session::{ReceiverError, ReceiverSession};
use crate::core::transport::Transport;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Probe timing and candidate list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Listen window per candidate
    #[serde(with = "millis")]
    pub window: Duration,
    /// Pause after reconfiguring the link
    #[serde(with = "millis")]
    pub settle: Duration,
    /// Pause after the binary-off packet
    #[serde(with = "millis")]
    pub bin_off_delay: Duration,
    /// Rates to try, in order
    pub candidates: Vec<u32>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(500),
            settle: Duration::from_millis(10),
            bin_off_delay: Duration::from_millis(20),
            candidates: BAUD_CANDIDATES.to_vec(),
        }
    }
}

impl ProbeConfig {
    /// Set the listen window
    #[must_use]
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Drop all delays, for simulated links
    #[must_use]
    pub fn without_delays(mut self) -> Self {
        self.settle = Duration::ZERO;
        self.bin_off_delay = Duration::ZERO;
        self
    }
}

/// Durations stored as integer milliseconds in config files
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Result of a probe run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProbeOutcome {
    /// Receiver answered at this rate
    Detected(u32),
    /// Every candidate timed out
    NotDetected,
}

impl ProbeOutcome {
    /// Detected rate, if any
    pub fn rate(self) -> Option<u32> {
        match self {
            Self::Detected(rate) => Some(rate),
            Self::NotDetected => None,
        }
    }
}

/// Find the rate the receiver is talking at.
///
/// Unsupported candidates are rejected before any I/O. The transport is
/// restored to the session's configured rate on every exit path that gets
/// that far; with no configured rate it stays at the last candidate.
pub fn detect(
    session: &mut ReceiverSession,
    transport: &mut dyn Transport,
    config: &ProbeConfig,
) -> Result<ProbeOutcome, ReceiverError> {
    for &rate in &config.candidates {
        pmtk::check_baud(rate)?;
    }

    let previous = session.baud_rate();
    let outcome = scan(session, transport, config);
    session.discard_partial();

    if let Some(rate) = previous {
        debug!("restoring link to {} baud", rate);
        transport.configure(rate)?;
    }
    outcome
}

fn scan(
    session: &mut ReceiverSession,
    transport: &mut dyn Transport,
    config: &ProbeConfig,
) -> Result<ProbeOutcome, ReceiverError> {
    for &rate in &config.candidates {
        debug!("probing at {} baud", rate);
        transport.configure(rate)?;
        sleep(config.settle);
        session.discard_partial();

        let started = Instant::now();
        session.write_raw(transport, &BIN_OFF)?;
        sleep(config.bin_off_delay);
        session.send_command(transport, codes::PMTK_TEST, None)?;

        while started.elapsed() < config.window {
            match session.poll(transport)? {
                Some(line) => {
                    if session.parse(&line).is_ok() {
                        info!("receiver detected at {} baud", rate);
                        return Ok(ProbeOutcome::Detected(rate));
                    }
                }
                None => std::thread::sleep(Duration::from_millis(1)),
            }
        }
    }

    warn!("no receiver answered on any of {} rates", config.candidates.len());
    Ok(ProbeOutcome::NotDetected)
}

fn sleep(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}

//! Integration tests for the polling cycle.
//!
//! These run the full query → decode → evaluate → schedule → send path
//! against a scripted in-memory transport and synthetic clock; no hardware
//! or sleeping involved.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chillerlink_control::{CommandScheduler, SafetyLimits, SafetyRule, SchedulerConfig};
use chillerlink_runner::poll::Poller;
use chillerlink_runner::transport::Transport;
use gree_protocol::{
    checksum, EncodeProfile, CONTROL_FRAME_LEN, CTRL_CAPACITY, FO_LIQUID_TEMP, FO_OPERATIONAL,
    FO_POWER, FO_POWER_ON_SENTINEL, FO_VAPOR_TEMP, LONG_STATUS_CLASS, LONG_STATUS_SUBTYPE,
    MAX_FRAME_LEN, STATUS_QUERY, SYNC_BYTE,
};

// ============================================================================
// Scripted Transport
// ============================================================================

/// Hands out pre-scripted read chunks and records every write.
struct ScriptedTransport {
    reads: VecDeque<Vec<u8>>,
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ScriptedTransport {
    fn new() -> (Self, Arc<Mutex<Vec<Vec<u8>>>>) {
        let writes = Arc::new(Mutex::new(Vec::new()));
        (
            ScriptedTransport {
                reads: VecDeque::new(),
                writes: writes.clone(),
            },
            writes,
        )
    }

    fn script(&mut self, chunk: Vec<u8>) {
        self.reads.push_back(chunk);
    }
}

impl Transport for ScriptedTransport {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reads.pop_front() {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Ok(0),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writes.lock().expect("not poisoned").push(bytes.to_vec());
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// A complete serial status frame carrying the given fixed-offset fields.
fn status_frame(vapor: u8, liquid: u8, operational: u8) -> Vec<u8> {
    let mut bytes = vec![0u8; MAX_FRAME_LEN];
    bytes[0] = SYNC_BYTE;
    bytes[1] = SYNC_BYTE;
    bytes[2] = LONG_STATUS_CLASS;
    bytes[3] = LONG_STATUS_SUBTYPE;
    bytes[FO_POWER] = FO_POWER_ON_SENTINEL;
    bytes[FO_VAPOR_TEMP] = vapor;
    bytes[FO_OPERATIONAL] = operational;
    bytes[FO_LIQUID_TEMP] = liquid;
    let last = bytes.len() - 1;
    bytes[last] = checksum(&bytes);
    bytes
}

fn at(secs: u64) -> Duration {
    Duration::from_secs(secs)
}

/// The 40-byte control frames among the recorded writes.
fn control_writes(writes: &Arc<Mutex<Vec<Vec<u8>>>>) -> Vec<Vec<u8>> {
    writes
        .lock()
        .expect("not poisoned")
        .iter()
        .filter(|w| w.len() == CONTROL_FRAME_LEN)
        .cloned()
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn query_written_every_cycle() {
    let (transport, writes) = ScriptedTransport::new();
    let mut poller = Poller::serial(transport, SafetyLimits::default());

    poller.poll_once(at(0)).expect("poll succeeds");
    poller.poll_once(at(1)).expect("poll succeeds");

    let writes = writes.lock().expect("not poisoned");
    assert_eq!(writes.len(), 2);
    assert!(writes.iter().all(|w| w == &STATUS_QUERY));
}

#[test]
fn status_decoded_and_safety_evaluated() {
    let (mut transport, _writes) = ScriptedTransport::new();
    transport.script(status_frame(30, 95, 128));
    let mut poller = Poller::serial(transport, SafetyLimits::default());

    let outcome = poller.poll_once(at(0)).expect("poll succeeds");
    let status = outcome.status.expect("status decoded");
    let fo = status.fixed_offset.expect("fixed offset fields");
    assert_eq!(fo.liquid_temp_c, 95);

    let verdict = outcome.verdict.expect("verdict present");
    assert!(!verdict.ok);
    assert!(verdict.violates(SafetyRule::LiquidTempOverLimit));
}

#[test]
fn garbage_before_sync_does_not_lose_the_frame() {
    let (mut transport, _writes) = ScriptedTransport::new();
    let frame = status_frame(25, 40, 100);
    // Noise, then the frame split across two reads.
    let mut first = vec![0x00, 0xFF, 0x13, 0x37];
    first.extend_from_slice(&frame[..100]);
    transport.script(first);
    transport.script(frame[100..].to_vec());

    let mut poller = Poller::serial(transport, SafetyLimits::default());

    let outcome = poller.poll_once(at(0)).expect("poll succeeds");
    assert!(outcome.status.is_none());

    let outcome = poller.poll_once(at(1)).expect("poll succeeds");
    let status = outcome.status.expect("frame recovered after resync");
    assert_eq!(
        status.fixed_offset.expect("fields").liquid_temp_c,
        40
    );
}

#[test]
fn corrupt_checksum_rejected_without_failing_the_cycle() {
    let (mut transport, _writes) = ScriptedTransport::new();
    let mut bad = status_frame(25, 40, 100);
    let last = bad.len() - 1;
    bad[last] ^= 0x55;
    transport.script(bad);

    let mut poller = Poller::serial(transport, SafetyLimits::default());
    let outcome = poller.poll_once(at(0)).expect("cycle must not error");
    assert!(outcome.status.is_none());
    assert_eq!(outcome.rejected, 1);
}

#[test]
fn scheduler_asserts_baseline_on_interval() {
    let (mut transport, writes) = ScriptedTransport::new();
    transport.script(status_frame(30, 45, 128));
    transport.script(status_frame(30, 45, 128));
    transport.script(status_frame(30, 45, 128));

    let scheduler = CommandScheduler::new(SchedulerConfig::default());
    let mut poller = Poller::serial(transport, SafetyLimits::default())
        .with_scheduler(scheduler, EncodeProfile::FixedOffset);

    let first = poller.poll_once(at(0)).expect("poll succeeds");
    assert!(first.sent.is_some(), "first tick asserts the baseline");

    let second = poller.poll_once(at(100)).expect("poll succeeds");
    assert!(second.sent.is_none(), "inside the re-assert interval");

    let third = poller.poll_once(at(301)).expect("poll succeeds");
    assert!(third.sent.is_some(), "interval elapsed");

    let controls = control_writes(&writes);
    assert_eq!(controls.len(), 2);
    for frame in &controls {
        assert_eq!(frame[frame.len() - 1], checksum(frame));
        // The baseline drives the compressor flat out.
        assert_eq!(frame[CTRL_CAPACITY], 0xFF);
    }
}

#[test]
fn overtemperature_triggers_fallback_once() {
    let (mut transport, writes) = ScriptedTransport::new();
    // Healthy, then three overheated statuses in a row.
    transport.script(status_frame(30, 45, 128));
    transport.script(status_frame(30, 95, 128));
    transport.script(status_frame(30, 96, 128));
    transport.script(status_frame(30, 97, 128));

    let scheduler = CommandScheduler::new(SchedulerConfig::default());
    let mut poller = Poller::serial(transport, SafetyLimits::default())
        .with_scheduler(scheduler, EncodeProfile::FixedOffset);

    poller.poll_once(at(0)).expect("baseline cycle");

    let fallback = poller.poll_once(at(10)).expect("fallback cycle");
    let sent = fallback.sent.expect("fallback issued");
    assert_eq!(sent.capacity, Some(0x40));

    // Mid-cooldown the continuing violation stays quiet.
    let quiet = poller.poll_once(at(20)).expect("cooldown cycle");
    assert!(quiet.sent.is_none());

    // Past the cooldown the still-present violation is a new onset.
    let again = poller.poll_once(at(41)).expect("post-cooldown cycle");
    assert_eq!(again.sent.expect("new onset").capacity, Some(0x40));

    let controls = control_writes(&writes);
    assert_eq!(controls.len(), 3, "baseline + two fallbacks");
    assert_eq!(controls[1][CTRL_CAPACITY], 0x40);
}

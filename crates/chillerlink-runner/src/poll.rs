//! The polling cycle.
//!
//! One cycle optionally writes the status query, drains whatever bytes the
//! transport has, runs the frames through decode → safety evaluation →
//! scheduling, and writes at most one control frame. All waiting happens
//! in the transport's read timeout and the caller's sleep between cycles;
//! the core pieces never block.

use std::io;
use std::time::Duration;

use chillerlink_control::{evaluate, CommandScheduler, SafetyLimits, SafetyVerdict};
use gree_protocol::{
    status_query, ControlIntent, DecodedStatus, EncodeProfile, FrameFormat, FrameReader, RawFrame,
};

use crate::transport::Transport;

/// What one polling cycle observed and did.
#[derive(Debug, Default)]
pub struct PollOutcome {
    /// The last status decoded this cycle, if any frame survived decode.
    pub status: Option<DecodedStatus>,
    /// The frame that status came from.
    pub frame: Option<RawFrame>,
    /// Safety verdict for that status.
    pub verdict: Option<SafetyVerdict>,
    /// The intent encoded and written this cycle, if the scheduler asked
    /// for one.
    pub sent: Option<ControlIntent>,
    /// Complete frames decoded this cycle.
    pub frames: usize,
    /// Frames rejected by checksum or layout.
    pub rejected: usize,
}

/// Drives query/read/decode/evaluate/schedule/write against one transport.
pub struct Poller<T: Transport> {
    transport: T,
    reader: FrameReader,
    limits: SafetyLimits,
    scheduler: Option<CommandScheduler>,
    encode_profile: EncodeProfile,
    send_query: bool,
}

impl<T: Transport> Poller<T> {
    /// A poller for the serial link: queries each cycle.
    pub fn serial(transport: T, limits: SafetyLimits) -> Self {
        Poller {
            transport,
            reader: FrameReader::new(FrameFormat::LengthPrefixed),
            limits,
            scheduler: None,
            encode_profile: EncodeProfile::FixedOffset,
            send_query: true,
        }
    }

    /// A poller for the push-based network feed: never queries.
    pub fn network(transport: T, limits: SafetyLimits) -> Self {
        Poller {
            transport,
            reader: FrameReader::new(FrameFormat::FixedLongStatus),
            limits,
            scheduler: None,
            encode_profile: EncodeProfile::FixedOffset,
            send_query: false,
        }
    }

    /// Attach a command scheduler; its intents are encoded and written at
    /// the end of each cycle.
    pub fn with_scheduler(mut self, scheduler: CommandScheduler, profile: EncodeProfile) -> Self {
        self.scheduler = Some(scheduler);
        self.encode_profile = profile;
        self
    }

    /// Run one cycle at the given monotonic time.
    pub fn poll_once(&mut self, now: Duration) -> io::Result<PollOutcome> {
        if self.send_query {
            self.transport.send(status_query())?;
        }

        let mut buf = [0u8; 512];
        loop {
            let n = self.transport.read_available(&mut buf)?;
            if n == 0 {
                break;
            }
            self.reader.push(&buf[..n]);
            if n < buf.len() {
                break;
            }
        }

        let mut outcome = PollOutcome::default();
        while let Some(frame) = self.reader.next_frame() {
            match DecodedStatus::from_frame(&frame) {
                Ok(status) => {
                    outcome.frames += 1;
                    outcome.status = Some(status);
                    outcome.frame = Some(frame);
                }
                Err(e) => {
                    outcome.rejected += 1;
                    tracing::debug!(error = %e, len = frame.len(), "frame rejected");
                }
            }
        }

        if let Some(status) = &outcome.status {
            let verdict = evaluate(status, &self.limits);
            if !verdict.ok {
                for violation in &verdict.violations {
                    tracing::warn!(%violation, "safety limit violated");
                }
            }

            if let Some(scheduler) = &mut self.scheduler {
                if let Some(intent) = scheduler.tick(now, &verdict, Some(status)) {
                    let frame = intent.encode(self.encode_profile);
                    self.transport.send(frame.as_bytes())?;
                    tracing::info!(frame = %hex::encode(frame.as_bytes()), "control sent");
                    outcome.sent = Some(intent);
                }
            }
            outcome.verdict = Some(verdict);
        }

        Ok(outcome)
    }

    /// Encode an intent with this poller's profile and write it out.
    pub fn send_intent(&mut self, intent: &ControlIntent) -> io::Result<()> {
        let frame = intent.encode(self.encode_profile);
        tracing::info!(frame = %hex::encode(frame.as_bytes()), "control sent");
        self.transport.send(frame.as_bytes())
    }

    /// Poll repeatedly until a status arrives, up to `attempts` cycles
    /// separated by `pause`.
    pub fn wait_for_status(
        &mut self,
        attempts: usize,
        pause: Duration,
        mut now: Duration,
    ) -> io::Result<Option<PollOutcome>> {
        for _ in 0..attempts {
            let outcome = self.poll_once(now)?;
            if outcome.status.is_some() {
                return Ok(Some(outcome));
            }
            std::thread::sleep(pause);
            now += pause;
        }
        Ok(None)
    }
}

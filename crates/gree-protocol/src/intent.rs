//! Control intents and command frame encoding.
//!
//! A [`ControlIntent`] is a sparse set of requested changes; unset fields
//! leave their wire positions untouched so unrelated bits in shared bytes
//! survive. Encoding is deterministic and always yields a 40-byte control
//! frame. Two placements exist for the intent fields, mirroring the decode
//! profiles; the caller selects one per target unit, the encoder never
//! guesses.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::frame::{checksum, RawFrame};
use crate::types::Mode;

/// Which field placement to encode with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodeProfile {
    /// Bit-packed placement, mirroring the bit-packed decode offsets.
    BitPacked,
    /// Direct byte placement at the control positions observed on this
    /// unit.
    FixedOffset,
}

/// A sparse set of requested changes to the unit's operating command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlIntent {
    /// Power on/off.
    pub power: Option<bool>,
    /// Operating mode.
    pub mode: Option<Mode>,
    /// Fan speed (masked to the profile's field width).
    pub fan_speed: Option<u8>,
    /// Compressor capacity modulation, full byte range.
    pub capacity: Option<u8>,
    /// Refrigerant flow / expansion valve, full byte range.
    pub flow: Option<u8>,
    /// Target temperature in celsius; clamped to [16, 30] when encoded.
    pub setpoint_c: Option<f64>,
    /// Vertical swing position nibble.
    pub swing_vertical: Option<u8>,
    /// Horizontal swing position nibble.
    pub swing_horizontal: Option<u8>,
    /// Turbo flag.
    pub turbo: Option<bool>,
    /// X-fan (coil drying) flag.
    pub xfan: Option<bool>,
    /// Display light flag.
    pub display_light: Option<bool>,
}

impl ControlIntent {
    /// An intent that requests nothing.
    pub fn none() -> Self {
        ControlIntent::default()
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == ControlIntent::default()
    }

    /// Encode into a checksummed 40-byte control frame.
    pub fn encode(&self, profile: EncodeProfile) -> RawFrame {
        let mut frame = [0u8; CONTROL_FRAME_LEN];
        frame[0] = SYNC_BYTE;
        frame[1] = SYNC_BYTE;
        frame[2] = CONTROL_DECLARED_LEN;
        frame[3] = FRAME_TYPE_CONTROL;

        if !self.is_empty() {
            frame[CTRL_UPDATE_FLAG] |= 0x01;
        }

        match profile {
            EncodeProfile::BitPacked => self.encode_bit_packed(&mut frame),
            EncodeProfile::FixedOffset => self.encode_fixed_offset(&mut frame),
        }

        frame[CONTROL_FRAME_LEN - 1] = checksum(&frame);
        RawFrame::from_buffer(frame.to_vec())
    }

    fn encode_bit_packed(&self, frame: &mut [u8; CONTROL_FRAME_LEN]) {
        if let Some(power) = self.power {
            frame[BP_POWER_MODE_FAN] =
                frame[BP_POWER_MODE_FAN] & 0x7F | if power { 0x80 } else { 0x00 };
        }
        if let Some(mode) = self.mode {
            frame[BP_POWER_MODE_FAN] = frame[BP_POWER_MODE_FAN] & 0x8F | (mode.bits() << 4);
        }
        if let Some(fan) = self.fan_speed {
            frame[BP_POWER_MODE_FAN] = frame[BP_POWER_MODE_FAN] & 0xFC | fan & 0x03;
        }
        if let Some(setpoint) = self.setpoint_c {
            let (nibble, half) = encode_setpoint(setpoint);
            frame[BP_SETPOINT] = frame[BP_SETPOINT] & 0x0F | nibble << 4;
            if half {
                frame[BP_HALF_DEGREE] |= 0x08;
            } else {
                frame[BP_HALF_DEGREE] &= !0x08;
            }
        }
        if let Some(turbo) = self.turbo {
            set_bit(&mut frame[BP_FEATURES], 4, turbo);
        }
        if let Some(display) = self.display_light {
            set_bit(&mut frame[BP_FEATURES], 3, display);
        }
        if let Some(xfan) = self.xfan {
            set_bit(&mut frame[BP_FEATURES], 0, xfan);
        }
        if let Some(swing_v) = self.swing_vertical {
            frame[BP_SWING] = frame[BP_SWING] & 0x0F | (swing_v & 0x0F) << 4;
        }
        if let Some(swing_h) = self.swing_horizontal {
            frame[BP_SWING] = frame[BP_SWING] & 0xF0 | swing_h & 0x0F;
        }
        // Capacity and flow have a single known placement, shared with the
        // fixed-offset profile.
        if let Some(capacity) = self.capacity {
            frame[CTRL_CAPACITY] = capacity;
        }
        if let Some(flow) = self.flow {
            frame[CTRL_FLOW] = flow;
        }
    }

    fn encode_fixed_offset(&self, frame: &mut [u8; CONTROL_FRAME_LEN]) {
        if let Some(power) = self.power {
            frame[CTRL_POWER] = if power { POWER_ON_BYTE } else { 0x00 };
        }
        if let Some(capacity) = self.capacity {
            frame[CTRL_CAPACITY] = capacity;
        }
        if let Some(flow) = self.flow {
            frame[CTRL_FLOW] = flow;
        }
        if let Some(mode) = self.mode {
            frame[CTRL_MODE] = mode.mode_byte();
        }
        if let Some(setpoint) = self.setpoint_c {
            let (nibble, _half) = encode_setpoint(setpoint);
            frame[CTRL_SETPOINT] = frame[CTRL_SETPOINT] & 0x0F | nibble << 4;
        }
        if let Some(fan) = self.fan_speed {
            frame[CTRL_FAN] = frame[CTRL_FAN] & !0x07 | fan & 0x07;
        }
        if self.swing_vertical.is_some()
            || self.swing_horizontal.is_some()
            || self.turbo.is_some()
            || self.xfan.is_some()
            || self.display_light.is_some()
        {
            // No known fixed-offset placement for these.
            log::debug!("swing/turbo/xfan/display have no fixed-offset placement; skipped");
        }
    }
}

/// Clamp a setpoint to the encodable range and bias-encode it. Returns the
/// 4-bit field value and whether the half-degree flag should be set.
fn encode_setpoint(celsius: f64) -> (u8, bool) {
    let clamped = celsius.clamp(SETPOINT_MIN_C, SETPOINT_MAX_C);
    let whole = clamped.floor();
    let half = clamped - whole >= 0.5;
    ((whole - SETPOINT_BIAS_C) as u8 & 0x0F, half)
}

fn set_bit(byte: &mut u8, bit: u8, value: bool) {
    if value {
        *byte |= 1 << bit;
    } else {
        *byte &= !(1 << bit);
    }
}

/// The fixed 5-byte status query frame.
pub fn status_query() -> &'static [u8] {
    &STATUS_QUERY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_frame_is_always_40_bytes_with_valid_checksum() {
        let intents = [
            ControlIntent::none(),
            ControlIntent {
                power: Some(true),
                ..Default::default()
            },
            ControlIntent {
                power: Some(true),
                mode: Some(Mode::Cool),
                fan_speed: Some(3),
                capacity: Some(0xFF),
                flow: Some(0xFF),
                setpoint_c: Some(18.0),
                swing_vertical: Some(2),
                swing_horizontal: Some(7),
                turbo: Some(true),
                xfan: Some(false),
                display_light: Some(true),
            },
        ];

        for profile in [EncodeProfile::BitPacked, EncodeProfile::FixedOffset] {
            for intent in &intents {
                let frame = intent.encode(profile);
                assert_eq!(frame.len(), CONTROL_FRAME_LEN);
                frame.validate_checksum().expect("checksum must hold");
                assert_eq!(frame.declared_len(), CONTROL_DECLARED_LEN);
                assert_eq!(frame.frame_type(), FRAME_TYPE_CONTROL);
            }
        }
    }

    #[test]
    fn empty_intent_leaves_update_flag_clear() {
        let frame = ControlIntent::none().encode(EncodeProfile::FixedOffset);
        assert_eq!(frame.as_bytes()[CTRL_UPDATE_FLAG], 0x00);

        let frame = ControlIntent {
            power: Some(true),
            ..Default::default()
        }
        .encode(EncodeProfile::FixedOffset);
        assert_eq!(frame.as_bytes()[CTRL_UPDATE_FLAG], 0x01);
    }

    #[test]
    fn in_range_setpoint_encodes_biased_nibble() {
        let frame = ControlIntent {
            power: Some(true),
            setpoint_c: Some(18.0),
            ..Default::default()
        }
        .encode(EncodeProfile::BitPacked);

        let bytes = frame.as_bytes();
        assert_eq!(bytes[CTRL_UPDATE_FLAG], 0x01);
        // 18 - 16 = 2 in the high nibble, no half-degree flag.
        assert_eq!(bytes[BP_SETPOINT] >> 4, 2);
        assert_eq!(bytes[BP_HALF_DEGREE] & 0x08, 0);
    }

    #[test]
    fn setpoint_clamps_to_range() {
        let low = ControlIntent {
            setpoint_c: Some(5.0),
            ..Default::default()
        }
        .encode(EncodeProfile::FixedOffset);
        assert_eq!(low.as_bytes()[CTRL_SETPOINT] >> 4, 0);

        let high = ControlIntent {
            setpoint_c: Some(45.0),
            ..Default::default()
        }
        .encode(EncodeProfile::FixedOffset);
        assert_eq!(high.as_bytes()[CTRL_SETPOINT] >> 4, 14);
    }

    #[test]
    fn half_degree_setpoint_sets_flag() {
        let frame = ControlIntent {
            setpoint_c: Some(21.5),
            ..Default::default()
        }
        .encode(EncodeProfile::BitPacked);

        let bytes = frame.as_bytes();
        assert_eq!(bytes[BP_SETPOINT] >> 4, 5);
        assert_eq!(bytes[BP_HALF_DEGREE] & 0x08, 0x08);
    }

    #[test]
    fn bit_packed_packs_power_mode_fan_into_one_byte() {
        let frame = ControlIntent {
            power: Some(true),
            mode: Some(Mode::Heat),
            fan_speed: Some(2),
            ..Default::default()
        }
        .encode(EncodeProfile::BitPacked);

        assert_eq!(frame.as_bytes()[BP_POWER_MODE_FAN], 0b1100_0010);
    }

    #[test]
    fn fixed_offset_places_direct_bytes() {
        let frame = ControlIntent {
            power: Some(true),
            mode: Some(Mode::Cool),
            capacity: Some(0x40),
            flow: Some(0x60),
            fan_speed: Some(5),
            ..Default::default()
        }
        .encode(EncodeProfile::FixedOffset);

        let bytes = frame.as_bytes();
        assert_eq!(bytes[CTRL_POWER], POWER_ON_BYTE);
        assert_eq!(bytes[CTRL_MODE], MODE_BYTE_COOL);
        assert_eq!(bytes[CTRL_CAPACITY], 0x40);
        assert_eq!(bytes[CTRL_FLOW], 0x60);
        assert_eq!(bytes[CTRL_FAN], 5);
    }

    #[test]
    fn unset_fields_do_not_perturb_shared_bytes() {
        // Setting only the fan must leave the power and mode bits of the
        // shared byte alone.
        let frame = ControlIntent {
            fan_speed: Some(1),
            ..Default::default()
        }
        .encode(EncodeProfile::BitPacked);
        assert_eq!(frame.as_bytes()[BP_POWER_MODE_FAN], 0x01);

        // Setting only the vertical swing must leave the horizontal nibble.
        let frame = ControlIntent {
            swing_vertical: Some(0xF),
            ..Default::default()
        }
        .encode(EncodeProfile::BitPacked);
        assert_eq!(frame.as_bytes()[BP_SWING], 0xF0);
    }

    #[test]
    fn status_query_bytes() {
        assert_eq!(status_query(), &[0x7E, 0x7E, 0x02, 0x02, 0x04]);
    }
}

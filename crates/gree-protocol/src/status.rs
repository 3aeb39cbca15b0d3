//! Status frame decoding.
//!
//! The published research on this protocol family disagrees about where
//! the interesting quantities live, so decoding is table-driven per
//! [`Profile`]: every profile applicable to a frame is applied, each
//! produced field group stays tagged with its profile, and values from
//! different profiles are never folded into one. Derived quantities
//! (differentials, unit conversions) are computed only from fields of the
//! same profile.

use serde::Serialize;

use crate::constants::*;
use crate::error::ProtocolError;
use crate::frame::RawFrame;
use crate::types::{
    bar_to_psi, fahrenheit_to_celsius, kpa_to_psi, CycleDirection, Mode, OperatingLevel, Profile,
    Sourced,
};

/// Fields decoded by the bit-packed (Daikin-derived) profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BitPackedStatus {
    /// Power bit at offset 8, bit 7.
    pub power_on: bool,
    /// 3-bit mode field; `None` when the bits hold an unknown value.
    pub mode: Option<Mode>,
    /// 2-bit fan speed (0 = auto, 3 = high).
    pub fan_speed: u8,
    /// Commanded setpoint in celsius, half-degree flag already applied.
    pub setpoint_c: f64,
    /// Vertical swing position nibble.
    pub swing_vertical: u8,
    /// Horizontal swing position nibble.
    pub swing_horizontal: u8,
    /// Turbo flag.
    pub turbo: bool,
    /// X-fan (coil drying) flag.
    pub xfan: bool,
    /// Display light flag.
    pub display_light: bool,
}

/// Fields decoded by the fixed-offset profile observed on this unit's
/// serial feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FixedOffsetStatus {
    /// Power state; the byte carries a sentinel value rather than a flag.
    pub power_on: bool,
    /// Vapor line / outdoor coil temperature in celsius.
    pub vapor_temp_c: i16,
    /// Operational byte.
    pub operational: u8,
    /// Liquid line / water heat exchanger temperature in celsius.
    pub liquid_temp_c: i16,
}

impl FixedOffsetStatus {
    /// Liquid minus vapor temperature in celsius.
    pub fn differential_c(&self) -> i16 {
        self.liquid_temp_c - self.vapor_temp_c
    }

    /// Cycle direction inferred from this profile's differential.
    pub fn cycle_direction(&self) -> CycleDirection {
        CycleDirection::from_differential_c(self.differential_c() as f64)
    }
}

/// Fields decoded from the 69-byte long-status frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LongStatus {
    /// Fan speed.
    pub fan_speed: u8,
    /// Fan enable flag.
    pub fan_enabled: bool,
    /// Compressor speed.
    pub compressor_speed: u8,
    /// Main refrigerant flow.
    pub flow_main: u8,
    /// Auxiliary flow 1.
    pub flow_aux1: u8,
    /// Auxiliary flow 2.
    pub flow_aux2: u8,
    /// Vapor line temperature in fahrenheit.
    pub vapor_temp_f: f64,
    /// Liquid line temperature in fahrenheit (scaled from the raw byte).
    pub liquid_temp_f: f64,
    /// Vapor line pressure in decibar, little-endian on the wire.
    pub vapor_pressure_decibar: u16,
    /// Liquid line pressure in kPa, little-endian on the wire.
    pub liquid_pressure_kpa: u16,
    /// System enable flag.
    pub system_enabled: bool,
    /// System mode byte.
    pub system_mode: u8,
}

impl LongStatus {
    /// Liquid minus vapor temperature in fahrenheit.
    pub fn differential_f(&self) -> f64 {
        self.liquid_temp_f - self.vapor_temp_f
    }

    /// Vapor line temperature converted to celsius.
    pub fn vapor_temp_c(&self) -> f64 {
        fahrenheit_to_celsius(self.vapor_temp_f)
    }

    /// Liquid line temperature converted to celsius.
    pub fn liquid_temp_c(&self) -> f64 {
        fahrenheit_to_celsius(self.liquid_temp_f)
    }

    /// Vapor line pressure in bar.
    pub fn vapor_pressure_bar(&self) -> f64 {
        self.vapor_pressure_decibar as f64 / 10.0
    }

    /// Vapor line pressure in psi.
    pub fn vapor_pressure_psi(&self) -> f64 {
        bar_to_psi(self.vapor_pressure_bar())
    }

    /// Liquid line pressure in psi.
    pub fn liquid_pressure_psi(&self) -> f64 {
        kpa_to_psi(self.liquid_pressure_kpa as f64)
    }

    /// Whether the system-mode byte matches a known high-performance code.
    /// The codes are not ordered by intensity, so this is a membership
    /// test, not a comparison.
    pub fn high_performance(&self) -> bool {
        HIGH_PERFORMANCE_MODE_CODES.contains(&self.system_mode)
    }

    /// Operating level classified from the drive speeds.
    pub fn operating_level(&self) -> OperatingLevel {
        OperatingLevel::classify(self.fan_speed, self.compressor_speed, self.system_enabled)
    }

    /// Cycle direction inferred from this profile's differential.
    pub fn cycle_direction(&self) -> CycleDirection {
        let diff_c = self.liquid_temp_c() - self.vapor_temp_c();
        CycleDirection::from_differential_c(diff_c)
    }
}

/// A status frame decoded by every applicable profile.
///
/// Each field group is `Some` only when its profile applied to the frame.
/// Quantities that more than one profile claims to know (power, liquid and
/// vapor temperatures) are exposed as per-profile readings; the caller
/// chooses, the decoder never does.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DecodedStatus {
    /// Bit-packed profile fields, when applicable.
    pub bit_packed: Option<BitPackedStatus>,
    /// Fixed-offset profile fields, when applicable.
    pub fixed_offset: Option<FixedOffsetStatus>,
    /// Long-status profile fields, when applicable.
    pub long_status: Option<LongStatus>,
}

impl DecodedStatus {
    /// Decode a frame with every applicable profile.
    ///
    /// The checksum is validated first; a mismatch fails the whole decode
    /// and no fields are produced. A frame no profile applies to is an
    /// [`ProtocolError::UnknownLayout`].
    pub fn from_frame(frame: &RawFrame) -> Result<Self, ProtocolError> {
        frame.validate_checksum()?;

        let status = DecodedStatus {
            bit_packed: decode_bit_packed(frame),
            fixed_offset: decode_fixed_offset(frame),
            long_status: decode_long_status(frame),
        };

        if status.is_empty() {
            return Err(ProtocolError::UnknownLayout {
                frame_type: frame.frame_type(),
                length: frame.len(),
            });
        }
        Ok(status)
    }

    /// Decode a frame with one explicitly chosen profile.
    pub fn from_frame_with(frame: &RawFrame, profile: Profile) -> Result<Self, ProtocolError> {
        frame.validate_checksum()?;

        let mut status = DecodedStatus::default();
        match profile {
            Profile::BitPacked => status.bit_packed = decode_bit_packed(frame),
            Profile::FixedOffset => status.fixed_offset = decode_fixed_offset(frame),
            Profile::LongStatus => status.long_status = decode_long_status(frame),
        }

        if status.is_empty() {
            return Err(ProtocolError::UnknownLayout {
                frame_type: frame.frame_type(),
                length: frame.len(),
            });
        }
        Ok(status)
    }

    /// Whether no profile produced any fields.
    pub fn is_empty(&self) -> bool {
        self.bit_packed.is_none() && self.fixed_offset.is_none() && self.long_status.is_none()
    }

    /// The profiles that produced fields for this status.
    pub fn profiles(&self) -> Vec<Profile> {
        let mut profiles = Vec::new();
        if self.bit_packed.is_some() {
            profiles.push(Profile::BitPacked);
        }
        if self.fixed_offset.is_some() {
            profiles.push(Profile::FixedOffset);
        }
        if self.long_status.is_some() {
            profiles.push(Profile::LongStatus);
        }
        profiles
    }

    /// Every power reading, one per profile that claims one.
    pub fn power_readings(&self) -> Vec<Sourced<bool>> {
        let mut readings = Vec::new();
        if let Some(bp) = &self.bit_packed {
            readings.push(Sourced::new(bp.power_on, Profile::BitPacked));
        }
        if let Some(fo) = &self.fixed_offset {
            readings.push(Sourced::new(fo.power_on, Profile::FixedOffset));
        }
        if let Some(ls) = &self.long_status {
            readings.push(Sourced::new(ls.system_enabled, Profile::LongStatus));
        }
        readings
    }

    /// Every liquid line temperature reading in celsius, tagged by profile.
    pub fn liquid_temp_readings_c(&self) -> Vec<Sourced<f64>> {
        let mut readings = Vec::new();
        if let Some(fo) = &self.fixed_offset {
            readings.push(Sourced::new(fo.liquid_temp_c as f64, Profile::FixedOffset));
        }
        if let Some(ls) = &self.long_status {
            readings.push(Sourced::new(ls.liquid_temp_c(), Profile::LongStatus));
        }
        readings
    }

    /// Every vapor line temperature reading in celsius, tagged by profile.
    pub fn vapor_temp_readings_c(&self) -> Vec<Sourced<f64>> {
        let mut readings = Vec::new();
        if let Some(fo) = &self.fixed_offset {
            readings.push(Sourced::new(fo.vapor_temp_c as f64, Profile::FixedOffset));
        }
        if let Some(ls) = &self.long_status {
            readings.push(Sourced::new(ls.vapor_temp_c(), Profile::LongStatus));
        }
        readings
    }
}

/// Whether a length-prefixed frame belongs to the status class. Status
/// responses carry the 0xFF class indicator in the length position or the
/// 0xE0 subtype; anything else (control echoes, queries) has no status
/// layout.
fn is_status_class(frame: &RawFrame) -> bool {
    frame.declared_len() == LONG_STATUS_CLASS || frame.frame_type() == LONG_STATUS_SUBTYPE
}

fn decode_bit_packed(frame: &RawFrame) -> Option<BitPackedStatus> {
    if frame.is_long_status() || !is_status_class(frame) {
        return None;
    }
    let bytes = frame.as_bytes();
    if bytes.len() <= BP_HALF_DEGREE {
        return None;
    }

    let packed = bytes[BP_POWER_MODE_FAN];
    let features = bytes[BP_FEATURES];
    let swing = bytes[BP_SWING];

    let mut setpoint_c = ((bytes[BP_SETPOINT] >> 4) & 0x0F) as f64 + SETPOINT_BIAS_C;
    if bytes[BP_HALF_DEGREE] >> 3 & 1 != 0 {
        setpoint_c += 0.5;
    }

    Some(BitPackedStatus {
        power_on: packed >> 7 & 1 != 0,
        mode: Mode::from_bits(packed >> 4 & 0x07),
        fan_speed: packed & 0x03,
        setpoint_c,
        swing_vertical: swing >> 4 & 0x0F,
        swing_horizontal: swing & 0x0F,
        turbo: features >> 4 & 1 != 0,
        xfan: features & 1 != 0,
        display_light: features >> 3 & 1 != 0,
    })
}

fn decode_fixed_offset(frame: &RawFrame) -> Option<FixedOffsetStatus> {
    if frame.is_long_status() || !is_status_class(frame) {
        return None;
    }
    let bytes = frame.as_bytes();
    if bytes.len() <= FO_LIQUID_TEMP {
        return None;
    }

    Some(FixedOffsetStatus {
        power_on: bytes[FO_POWER] == FO_POWER_ON_SENTINEL,
        vapor_temp_c: bytes[FO_VAPOR_TEMP] as i16,
        operational: bytes[FO_OPERATIONAL],
        liquid_temp_c: bytes[FO_LIQUID_TEMP] as i16,
    })
}

fn decode_long_status(frame: &RawFrame) -> Option<LongStatus> {
    if !frame.is_long_status() {
        return None;
    }
    let bytes = frame.as_bytes();

    Some(LongStatus {
        fan_speed: bytes[LS_FAN_SPEED],
        fan_enabled: bytes[LS_FAN_ENABLE] != 0,
        compressor_speed: bytes[LS_COMPRESSOR_SPEED],
        flow_main: bytes[LS_FLOW_MAIN],
        flow_aux1: bytes[LS_FLOW_AUX1],
        flow_aux2: bytes[LS_FLOW_AUX2],
        vapor_temp_f: bytes[LS_VAPOR_TEMP_F] as f64,
        liquid_temp_f: bytes[LS_LIQUID_TEMP_F] as f64 * LS_LIQUID_TEMP_SCALE,
        vapor_pressure_decibar: u16::from_le_bytes([
            bytes[LS_VAPOR_PRESSURE],
            bytes[LS_VAPOR_PRESSURE + 1],
        ]),
        liquid_pressure_kpa: u16::from_le_bytes([
            bytes[LS_LIQUID_PRESSURE],
            bytes[LS_LIQUID_PRESSURE + 1],
        ]),
        system_enabled: bytes[LS_SYSTEM_ENABLE] != 0,
        system_mode: bytes[LS_SYSTEM_MODE],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::checksum;

    /// Build a serial status frame (declared 0xFF, 258 bytes total) with
    /// the given byte positions patched in.
    fn serial_status_frame(patches: &[(usize, u8)]) -> RawFrame {
        let mut bytes = vec![0u8; MAX_FRAME_LEN];
        bytes[0] = SYNC_BYTE;
        bytes[1] = SYNC_BYTE;
        bytes[2] = LONG_STATUS_CLASS;
        bytes[3] = LONG_STATUS_SUBTYPE;
        for &(pos, value) in patches {
            bytes[pos] = value;
        }
        let last = bytes.len() - 1;
        bytes[last] = checksum(&bytes);
        RawFrame::from_bytes(bytes).expect("well formed")
    }

    /// Build a 69-byte network status frame with the given positions
    /// patched in.
    fn network_status_frame(patches: &[(usize, u8)]) -> RawFrame {
        let mut bytes = vec![0u8; LONG_STATUS_FRAME_LEN];
        bytes[0] = SYNC_BYTE;
        bytes[1] = SYNC_BYTE;
        bytes[2] = LONG_STATUS_CLASS;
        bytes[3] = LONG_STATUS_SUBTYPE;
        for &(pos, value) in patches {
            bytes[pos] = value;
        }
        let last = bytes.len() - 1;
        bytes[last] = checksum(&bytes);
        RawFrame::from_bytes(bytes).expect("well formed")
    }

    #[test]
    fn checksum_mismatch_yields_no_fields() {
        let good = serial_status_frame(&[(FO_LIQUID_TEMP, 50)]);
        let mut bytes = good.as_bytes().to_vec();
        let last = bytes.len() - 1;
        bytes[last] = bytes[last].wrapping_add(1);
        let bad = RawFrame::from_bytes(bytes).expect("well formed");

        let err = DecodedStatus::from_frame(&bad).expect_err("must fail");
        assert!(matches!(err, ProtocolError::ChecksumMismatch { .. }));
    }

    #[test]
    fn serial_frame_applies_both_serial_profiles() {
        let frame = serial_status_frame(&[
            (FO_POWER, FO_POWER_ON_SENTINEL),
            (FO_VAPOR_TEMP, 30),
            (FO_OPERATIONAL, 128),
            (FO_LIQUID_TEMP, 95),
        ]);

        let status = DecodedStatus::from_frame(&frame).expect("decodes");
        assert_eq!(
            status.profiles(),
            vec![Profile::BitPacked, Profile::FixedOffset]
        );

        let fo = status.fixed_offset.expect("fixed offset fields");
        assert!(fo.power_on);
        assert_eq!(fo.vapor_temp_c, 30);
        assert_eq!(fo.operational, 128);
        assert_eq!(fo.liquid_temp_c, 95);
        assert_eq!(fo.differential_c(), 65);
    }

    #[test]
    fn bit_packed_fields_decode() {
        // Power on, heat mode (4), fan 2 -> 0b1100_0010; setpoint 21.5C.
        let frame = serial_status_frame(&[
            (BP_POWER_MODE_FAN, 0b1100_0010),
            (BP_SETPOINT, 0x50),
            (BP_HALF_DEGREE, 0x08),
            (BP_SWING, 0x3A),
            (BP_FEATURES, 0b0001_1001),
        ]);

        let bp = DecodedStatus::from_frame(&frame)
            .expect("decodes")
            .bit_packed
            .expect("bit packed fields");
        assert!(bp.power_on);
        assert_eq!(bp.mode, Some(Mode::Heat));
        assert_eq!(bp.fan_speed, 2);
        assert_eq!(bp.setpoint_c, 21.5);
        assert_eq!(bp.swing_vertical, 3);
        assert_eq!(bp.swing_horizontal, 0xA);
        assert!(bp.turbo);
        assert!(bp.xfan);
        assert!(bp.display_light);
    }

    #[test]
    fn unknown_mode_bits_decode_as_none() {
        let frame = serial_status_frame(&[(BP_POWER_MODE_FAN, 0b0111_0000)]);
        let bp = DecodedStatus::from_frame(&frame)
            .expect("decodes")
            .bit_packed
            .expect("bit packed fields");
        assert_eq!(bp.mode, None);
    }

    #[test]
    fn network_frame_applies_long_status_only() {
        let frame = network_status_frame(&[
            (LS_FAN_SPEED, 80),
            (LS_FAN_ENABLE, 1),
            (LS_COMPRESSOR_SPEED, 78),
            (LS_FLOW_MAIN, 120),
            (LS_LIQUID_TEMP_F, 200),
            (LS_LIQUID_PRESSURE, 0x34),
            (LS_LIQUID_PRESSURE + 1, 0x12),
            (LS_SYSTEM_ENABLE, 1),
            (LS_SYSTEM_MODE, 163),
        ]);

        let status = DecodedStatus::from_frame(&frame).expect("decodes");
        assert_eq!(status.profiles(), vec![Profile::LongStatus]);

        let ls = status.long_status.expect("long status fields");
        assert_eq!(ls.fan_speed, 80);
        assert_eq!(ls.compressor_speed, 78);
        // 0x50 would collide with the fan speed; pressure is read LE from
        // its own offset pair.
        assert_eq!(ls.liquid_pressure_kpa, 0x1234);
        assert_eq!(ls.liquid_temp_f, 200.0 * LS_LIQUID_TEMP_SCALE);
        assert!(ls.high_performance());
        assert_eq!(ls.operating_level(), OperatingLevel::High);
    }

    #[test]
    fn high_performance_is_a_lookup_not_a_threshold() {
        // 200 is numerically above every high-performance code except 226,
        // yet is not itself a known code.
        let frame = network_status_frame(&[(LS_SYSTEM_MODE, 200), (LS_SYSTEM_ENABLE, 1)]);
        let ls = DecodedStatus::from_frame(&frame)
            .expect("decodes")
            .long_status
            .expect("long status fields");
        assert!(!ls.high_performance());

        for code in HIGH_PERFORMANCE_MODE_CODES {
            let frame = network_status_frame(&[(LS_SYSTEM_MODE, code), (LS_SYSTEM_ENABLE, 1)]);
            let ls = DecodedStatus::from_frame(&frame)
                .expect("decodes")
                .long_status
                .expect("long status fields");
            assert!(ls.high_performance(), "code {code} must classify high");
        }
    }

    #[test]
    fn control_frame_has_no_status_layout() {
        let mut bytes = vec![0u8; CONTROL_FRAME_LEN];
        bytes[0] = SYNC_BYTE;
        bytes[1] = SYNC_BYTE;
        bytes[2] = CONTROL_DECLARED_LEN;
        bytes[3] = FRAME_TYPE_CONTROL;
        let last = bytes.len() - 1;
        bytes[last] = checksum(&bytes);
        let frame = RawFrame::from_bytes(bytes).expect("well formed");

        let err = DecodedStatus::from_frame(&frame).expect_err("no layout");
        assert!(matches!(err, ProtocolError::UnknownLayout { .. }));
    }

    #[test]
    fn explicit_profile_selection() {
        let frame = serial_status_frame(&[(FO_LIQUID_TEMP, 40), (FO_VAPOR_TEMP, 10)]);

        let only_fo = DecodedStatus::from_frame_with(&frame, Profile::FixedOffset)
            .expect("fixed offset applies");
        assert!(only_fo.bit_packed.is_none());
        assert!(only_fo.fixed_offset.is_some());

        let err = DecodedStatus::from_frame_with(&frame, Profile::LongStatus)
            .expect_err("long status does not apply to serial frames");
        assert!(matches!(err, ProtocolError::UnknownLayout { .. }));
    }

    #[test]
    fn readings_stay_profile_tagged() {
        let frame = serial_status_frame(&[
            (FO_POWER, FO_POWER_ON_SENTINEL),
            (FO_VAPOR_TEMP, 12),
            (FO_LIQUID_TEMP, 44),
        ]);
        let status = DecodedStatus::from_frame(&frame).expect("decodes");

        let liquid = status.liquid_temp_readings_c();
        assert_eq!(liquid.len(), 1);
        assert_eq!(liquid[0].profile, Profile::FixedOffset);
        assert_eq!(liquid[0].value, 44.0);

        // Power is claimed by both serial profiles; both readings survive.
        let power = status.power_readings();
        assert_eq!(power.len(), 2);
        assert_eq!(power[0].profile, Profile::BitPacked);
        assert_eq!(power[1].profile, Profile::FixedOffset);
    }

    #[test]
    fn cycle_direction_from_fixed_offset() {
        let cooling = serial_status_frame(&[(FO_LIQUID_TEMP, 44), (FO_VAPOR_TEMP, 12)]);
        let fo = DecodedStatus::from_frame(&cooling)
            .expect("decodes")
            .fixed_offset
            .expect("fields");
        assert_eq!(fo.cycle_direction(), CycleDirection::Cool);

        let heating = serial_status_frame(&[(FO_LIQUID_TEMP, 10), (FO_VAPOR_TEMP, 25)]);
        let fo = DecodedStatus::from_frame(&heating)
            .expect("decodes")
            .fixed_offset
            .expect("fields");
        assert_eq!(fo.cycle_direction(), CycleDirection::Heat);
    }
}

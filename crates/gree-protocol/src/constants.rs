//! Protocol constants
//!
//! These constants define the frame geometry, byte offsets, and code values
//! used on the Gree-derived UART/network protocol. Offsets are indexed from
//! the start of the frame (sync marker included), matching the captures the
//! field tables were derived from.

// ============================================================================
// Frame Geometry
// ============================================================================

/// Both sync bytes have this value.
pub const SYNC_BYTE: u8 = 0x7E;
/// Every frame begins with this 2-byte marker.
pub const SYNC_MARKER: [u8; 2] = [0x7E, 0x7E];
/// Bytes not covered by the declared length: sync (2) plus the length byte.
pub const FRAME_OVERHEAD: usize = 3;
/// Total size of a control frame.
pub const CONTROL_FRAME_LEN: usize = 40;
/// Declared length carried by a control frame (type + body + checksum).
pub const CONTROL_DECLARED_LEN: u8 = 37;
/// Total size of the fixed long-status frame delivered on the network feed.
pub const LONG_STATUS_FRAME_LEN: usize = 69;
/// Frame-class indicator in the length position of a long-status frame.
pub const LONG_STATUS_CLASS: u8 = 0xFF;
/// Second class byte of a long-status frame (`7E 7E FF E0 ...`).
pub const LONG_STATUS_SUBTYPE: u8 = 0xE0;
/// Largest frame a declared length can describe (0xFF + overhead).
pub const MAX_FRAME_LEN: usize = 0xFF + FRAME_OVERHEAD;
/// Smallest complete frame: sync, length, type, checksum.
pub const MIN_FRAME_LEN: usize = 5;
/// The fixed status query command.
pub const STATUS_QUERY: [u8; 5] = [0x7E, 0x7E, 0x02, 0x02, 0x04];

// ============================================================================
// Frame Types
// ============================================================================

/// Control frame type byte.
pub const FRAME_TYPE_CONTROL: u8 = 0x01;
/// Status query frame type byte.
pub const FRAME_TYPE_STATUS_QUERY: u8 = 0x02;

// ============================================================================
// Control Frame Positions — fixed-offset encode profile
// ============================================================================

/// Update-present flag; set whenever any field is written.
pub const CTRL_UPDATE_FLAG: usize = 4;
/// Power control byte (0x80 = on, 0x00 = off).
pub const CTRL_POWER: usize = 5;
/// Compressor capacity modulation.
pub const CTRL_CAPACITY: usize = 6;
/// Refrigerant flow / expansion valve.
pub const CTRL_FLOW: usize = 7;
/// Heat/cool mode byte (reversing valve).
pub const CTRL_MODE: usize = 8;
/// Setpoint nibble position shared by both encode profiles.
pub const CTRL_SETPOINT: usize = 9;
/// Fan speed byte (low 3 bits).
pub const CTRL_FAN: usize = 19;

/// Power-on value for the fixed-offset power byte.
pub const POWER_ON_BYTE: u8 = 0x80;
/// Cool mode value for the fixed-offset mode byte.
pub const MODE_BYTE_COOL: u8 = 0x20;
/// Heat mode value for the fixed-offset mode byte.
pub const MODE_BYTE_HEAT: u8 = 0x10;
/// Auto mode value for the fixed-offset mode byte.
pub const MODE_BYTE_AUTO: u8 = 0x00;

// ============================================================================
// Bit-Packed Profile Positions (status and control share offsets)
// ============================================================================

/// Power bit 7, mode bits 6..4, fan bits 1..0.
pub const BP_POWER_MODE_FAN: usize = 8;
/// Setpoint in the high nibble, bias-encoded as `celsius - 16`.
pub const BP_SETPOINT: usize = 9;
/// Turbo bit 4, display light bit 3, x-fan bit 0.
pub const BP_FEATURES: usize = 10;
/// Swing vertical in the high nibble, horizontal in the low nibble.
pub const BP_SWING: usize = 12;
/// Half-degree setpoint flag at bit 3.
pub const BP_HALF_DEGREE: usize = 13;

// ============================================================================
// Fixed-Offset Profile Positions (status frames observed on this unit)
// ============================================================================

/// Power state byte; on is signalled by a sentinel value, not a bit.
pub const FO_POWER: usize = 10;
/// Sentinel value of [`FO_POWER`] meaning the unit is powered on.
pub const FO_POWER_ON_SENTINEL: u8 = 0xAA;
/// Vapor line / outdoor coil temperature, direct value in celsius.
pub const FO_VAPOR_TEMP: usize = 25;
/// Operational byte.
pub const FO_OPERATIONAL: usize = 31;
/// Liquid line / water heat exchanger temperature, direct value in celsius.
pub const FO_LIQUID_TEMP: usize = 64;

// ============================================================================
// Long-Status Profile Positions (69-byte network frame)
// ============================================================================

/// Fan speed.
pub const LS_FAN_SPEED: usize = 16;
/// Fan enable flag.
pub const LS_FAN_ENABLE: usize = 17;
/// Compressor speed.
pub const LS_COMPRESSOR_SPEED: usize = 18;
/// Main refrigerant flow.
pub const LS_FLOW_MAIN: usize = 21;
/// Auxiliary flow 1.
pub const LS_FLOW_AUX1: usize = 22;
/// Auxiliary flow 2.
pub const LS_FLOW_AUX2: usize = 23;
/// Vapor line temperature, direct value in fahrenheit.
pub const LS_VAPOR_TEMP_F: usize = 22;
/// Liquid line temperature in fahrenheit after scaling.
pub const LS_LIQUID_TEMP_F: usize = 56;
/// Scale factor applied to the raw liquid line byte.
pub const LS_LIQUID_TEMP_SCALE: f64 = 0.43;
/// Vapor line pressure, little-endian u16 in decibar.
pub const LS_VAPOR_PRESSURE: usize = 16;
/// Liquid line pressure, little-endian u16 in kPa.
pub const LS_LIQUID_PRESSURE: usize = 60;
/// System enable flag.
pub const LS_SYSTEM_ENABLE: usize = 39;
/// System mode byte, classified against [`HIGH_PERFORMANCE_MODE_CODES`].
pub const LS_SYSTEM_MODE: usize = 40;

/// System-mode codes observed during high-performance operation. Code values
/// are not ordered by intensity, so classification is a membership test.
pub const HIGH_PERFORMANCE_MODE_CODES: [u8; 6] = [97, 98, 99, 100, 163, 226];

// ============================================================================
// Setpoint Encoding
// ============================================================================

/// Lowest encodable setpoint in celsius.
pub const SETPOINT_MIN_C: f64 = 16.0;
/// Highest encodable setpoint in celsius.
pub const SETPOINT_MAX_C: f64 = 30.0;
/// Bias subtracted before packing the setpoint into its 4-bit field.
pub const SETPOINT_BIAS_C: f64 = 16.0;

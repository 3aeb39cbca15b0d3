//! Common types used in the protocol.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Operating mode carried in the bit-packed mode field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Automatic mode selection.
    Auto,
    /// Cooling.
    Cool,
    /// Dehumidify.
    Dry,
    /// Fan only.
    Fan,
    /// Heating.
    Heat,
}

impl Mode {
    /// Decode the 3-bit mode field. Values outside the known range yield
    /// `None` rather than a guessed mode.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Mode::Auto),
            1 => Some(Mode::Cool),
            2 => Some(Mode::Dry),
            3 => Some(Mode::Fan),
            4 => Some(Mode::Heat),
            _ => None,
        }
    }

    /// The 3-bit wire encoding of this mode.
    pub fn bits(self) -> u8 {
        match self {
            Mode::Auto => 0,
            Mode::Cool => 1,
            Mode::Dry => 2,
            Mode::Fan => 3,
            Mode::Heat => 4,
        }
    }

    /// The fixed-offset mode byte (reversing valve position). Only heat and
    /// cool have dedicated values on that profile; everything else maps to
    /// the auto byte.
    pub fn mode_byte(self) -> u8 {
        match self {
            Mode::Cool => MODE_BYTE_COOL,
            Mode::Heat => MODE_BYTE_HEAT,
            _ => MODE_BYTE_AUTO,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Auto => write!(f, "Auto"),
            Mode::Cool => write!(f, "Cool"),
            Mode::Dry => write!(f, "Dry"),
            Mode::Fan => write!(f, "Fan"),
            Mode::Heat => write!(f, "Heat"),
        }
    }
}

/// A named, fixed interpretation of byte offsets within a status frame.
///
/// The published decoders for this family of units disagree on where the
/// interesting quantities live; each interpretation is kept as its own
/// profile and values from different profiles are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profile {
    /// Bit-packed layout (Daikin-derived research).
    BitPacked,
    /// Direct byte offsets observed on this unit's serial feed.
    FixedOffset,
    /// The 69-byte network status frame.
    LongStatus,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::BitPacked => write!(f, "bit-packed"),
            Profile::FixedOffset => write!(f, "fixed-offset"),
            Profile::LongStatus => write!(f, "long-status"),
        }
    }
}

/// A value together with the profile that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sourced<T> {
    /// The decoded value.
    pub value: T,
    /// Which profile's field table produced it.
    pub profile: Profile,
}

impl<T> Sourced<T> {
    /// Tag a value with its source profile.
    pub fn new(value: T, profile: Profile) -> Self {
        Sourced { value, profile }
    }
}

/// Operating level classified from fan and compressor speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperatingLevel {
    /// System disabled.
    Off,
    /// Both drives above the high-run threshold.
    High,
    /// Both drives above the max threshold.
    Max,
    /// Both drives running below the max threshold.
    Low,
    /// Speeds do not match any known pattern.
    Unknown,
}

impl OperatingLevel {
    /// Classify from the long-status fan speed, compressor speed, and
    /// system-enable flag.
    pub fn classify(fan_speed: u8, compressor_speed: u8, enabled: bool) -> Self {
        if !enabled {
            OperatingLevel::Off
        } else if fan_speed >= 75 && compressor_speed >= 75 {
            OperatingLevel::High
        } else if fan_speed >= 50 && compressor_speed >= 50 {
            OperatingLevel::Max
        } else if fan_speed > 0 && compressor_speed > 0 {
            OperatingLevel::Low
        } else {
            OperatingLevel::Unknown
        }
    }
}

impl fmt::Display for OperatingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingLevel::Off => write!(f, "OFF"),
            OperatingLevel::High => write!(f, "HIGH/RUN"),
            OperatingLevel::Max => write!(f, "MAX"),
            OperatingLevel::Low => write!(f, "LOW"),
            OperatingLevel::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Direction of the refrigerant cycle inferred from the liquid-vapor
/// differential. A heat pump runs the liquid line cooler than the vapor
/// line; a chiller in cooling runs it considerably warmer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CycleDirection {
    /// Reversed cycle (heating).
    Heat,
    /// Normal cycle (cooling).
    Cool,
    /// Differential inside the ambiguous band.
    Unknown,
}

impl CycleDirection {
    /// Infer the cycle direction from a liquid-minus-vapor differential in
    /// celsius.
    pub fn from_differential_c(diff_c: f64) -> Self {
        if diff_c < 0.0 {
            CycleDirection::Heat
        } else if diff_c > 20.0 {
            CycleDirection::Cool
        } else {
            CycleDirection::Unknown
        }
    }
}

/// Convert celsius to fahrenheit.
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Convert fahrenheit to celsius.
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Convert bar to psi.
pub fn bar_to_psi(bar: f64) -> f64 {
    bar * 14.5038
}

/// Convert kPa to psi.
pub fn kpa_to_psi(kpa: f64) -> f64 {
    kpa * 0.145038
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_bits_round_trip() {
        for mode in [Mode::Auto, Mode::Cool, Mode::Dry, Mode::Fan, Mode::Heat] {
            assert_eq!(Mode::from_bits(mode.bits()), Some(mode));
        }
        assert_eq!(Mode::from_bits(5), None);
        assert_eq!(Mode::from_bits(7), None);
    }

    #[test]
    fn operating_level_thresholds() {
        assert_eq!(OperatingLevel::classify(80, 80, false), OperatingLevel::Off);
        assert_eq!(OperatingLevel::classify(80, 80, true), OperatingLevel::High);
        assert_eq!(OperatingLevel::classify(60, 55, true), OperatingLevel::Max);
        assert_eq!(OperatingLevel::classify(20, 10, true), OperatingLevel::Low);
        assert_eq!(OperatingLevel::classify(0, 0, true), OperatingLevel::Unknown);
    }

    #[test]
    fn cycle_direction_bands() {
        assert_eq!(CycleDirection::from_differential_c(-5.0), CycleDirection::Heat);
        assert_eq!(CycleDirection::from_differential_c(25.0), CycleDirection::Cool);
        assert_eq!(CycleDirection::from_differential_c(10.0), CycleDirection::Unknown);
    }
}

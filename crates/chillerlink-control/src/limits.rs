//! Safety limit configuration.

use serde::{Deserialize, Serialize};

/// Immutable operating bounds a status must stay within.
///
/// Loaded once at startup and passed explicitly into
/// [`evaluate`](crate::guard::evaluate); nothing in the process mutates
/// limits after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyLimits {
    /// Highest allowed liquid line temperature in celsius.
    pub max_liquid_temp_c: i16,
    /// Lowest allowed vapor line temperature in celsius.
    pub min_vapor_temp_c: i16,
    /// Largest allowed liquid-vapor differential in celsius.
    pub max_temp_diff_c: i16,
    /// Lowest allowed operational byte value.
    pub min_operational: u8,
    /// Highest allowed operational byte value.
    pub max_operational: u8,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        SafetyLimits {
            max_liquid_temp_c: 65,
            min_vapor_temp_c: -10,
            max_temp_diff_c: 60,
            min_operational: 10,
            max_operational: 255,
        }
    }
}

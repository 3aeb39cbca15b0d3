//! Pure safety evaluation of a decoded status against configured limits.

use std::fmt;

use gree_protocol::DecodedStatus;
use serde::Serialize;

use crate::limits::SafetyLimits;

/// The individual rules a status is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SafetyRule {
    /// Liquid line temperature above the configured maximum.
    LiquidTempOverLimit,
    /// Vapor line temperature below the configured minimum.
    VaporTempUnderLimit,
    /// Liquid-vapor differential above the configured maximum.
    DifferentialOverLimit,
    /// Operational byte outside the configured range.
    OperationalOutOfRange,
}

impl fmt::Display for SafetyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyRule::LiquidTempOverLimit => write!(f, "liquid temperature over limit"),
            SafetyRule::VaporTempUnderLimit => write!(f, "vapor temperature under limit"),
            SafetyRule::DifferentialOverLimit => write!(f, "temperature differential over limit"),
            SafetyRule::OperationalOutOfRange => write!(f, "operational value out of range"),
        }
    }
}

/// A single violated rule with the value that violated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// The rule that was violated.
    pub rule: SafetyRule,
    /// The observed value that broke the rule.
    pub observed: i32,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (observed {})", self.rule, self.observed)
    }
}

/// The outcome of evaluating one status against the limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyVerdict {
    /// True when no rule was violated.
    pub ok: bool,
    /// Every violated rule, in check order; never short-circuited so the
    /// caller sees the complete picture in one pass.
    pub violations: Vec<Violation>,
}

impl SafetyVerdict {
    /// A verdict with no violations.
    pub fn clean() -> Self {
        SafetyVerdict {
            ok: true,
            violations: Vec::new(),
        }
    }

    /// Whether a specific rule is among the violations.
    pub fn violates(&self, rule: SafetyRule) -> bool {
        self.violations.iter().any(|v| v.rule == rule)
    }
}

/// Evaluate a decoded status against the limits. Pure; no side effects.
///
/// The checks use the fixed-offset profile readings, the interpretation
/// the limits were calibrated against on this unit. A status without
/// those fields skips the corresponding checks rather than failing.
pub fn evaluate(status: &DecodedStatus, limits: &SafetyLimits) -> SafetyVerdict {
    let mut violations = Vec::new();

    if let Some(fo) = &status.fixed_offset {
        if fo.liquid_temp_c > limits.max_liquid_temp_c {
            violations.push(Violation {
                rule: SafetyRule::LiquidTempOverLimit,
                observed: fo.liquid_temp_c as i32,
            });
        }
        if fo.vapor_temp_c < limits.min_vapor_temp_c {
            violations.push(Violation {
                rule: SafetyRule::VaporTempUnderLimit,
                observed: fo.vapor_temp_c as i32,
            });
        }
        let diff = fo.differential_c().abs();
        if diff > limits.max_temp_diff_c {
            violations.push(Violation {
                rule: SafetyRule::DifferentialOverLimit,
                observed: diff as i32,
            });
        }
        if fo.operational < limits.min_operational || fo.operational > limits.max_operational {
            violations.push(Violation {
                rule: SafetyRule::OperationalOutOfRange,
                observed: fo.operational as i32,
            });
        }
    }

    SafetyVerdict {
        ok: violations.is_empty(),
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gree_protocol::{DecodedStatus, FixedOffsetStatus};

    fn status(vapor: i16, liquid: i16, operational: u8) -> DecodedStatus {
        DecodedStatus {
            fixed_offset: Some(FixedOffsetStatus {
                power_on: true,
                vapor_temp_c: vapor,
                operational,
                liquid_temp_c: liquid,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn in_bounds_status_is_ok() {
        let verdict = evaluate(&status(30, 45, 128), &SafetyLimits::default());
        assert!(verdict.ok);
        assert!(verdict.violations.is_empty());
    }

    #[test]
    fn overheated_liquid_line_is_flagged_with_observed_value() {
        // Vapor 30C, liquid 95C against a 65C limit.
        let verdict = evaluate(&status(30, 95, 128), &SafetyLimits::default());
        assert!(!verdict.ok);
        assert!(verdict.violates(SafetyRule::LiquidTempOverLimit));
        let violation = verdict
            .violations
            .iter()
            .find(|v| v.rule == SafetyRule::LiquidTempOverLimit)
            .expect("liquid violation present");
        assert_eq!(violation.observed, 95);
    }

    #[test]
    fn all_violations_reported_together() {
        // Vapor below minimum, liquid above maximum, differential over,
        // operational under range: all four at once.
        let limits = SafetyLimits::default();
        let verdict = evaluate(&status(-20, 90, 3), &limits);
        assert!(!verdict.ok);
        assert_eq!(verdict.violations.len(), 4);
        assert!(verdict.violates(SafetyRule::LiquidTempOverLimit));
        assert!(verdict.violates(SafetyRule::VaporTempUnderLimit));
        assert!(verdict.violates(SafetyRule::DifferentialOverLimit));
        assert!(verdict.violates(SafetyRule::OperationalOutOfRange));
    }

    #[test]
    fn differential_uses_magnitude() {
        // Heating runs the liquid line colder than vapor; a large negative
        // differential is just as out of bounds.
        let limits = SafetyLimits {
            max_temp_diff_c: 40,
            min_vapor_temp_c: -10,
            ..Default::default()
        };
        let verdict = evaluate(&status(60, 10, 128), &limits);
        assert!(verdict.violates(SafetyRule::DifferentialOverLimit));
    }

    #[test]
    fn status_without_fixed_offset_fields_skips_checks() {
        let verdict = evaluate(&DecodedStatus::default(), &SafetyLimits::default());
        assert!(verdict.ok);
    }
}

//! Console formatting for decoded statuses and verdicts.
//!
//! The core crates emit values, never text; everything printable lives
//! here.

use chillerlink_control::SafetyVerdict;
use gree_protocol::{celsius_to_fahrenheit, DecodedStatus};

/// Compact one-line summary for the monitor loop.
pub fn status_line(status: &DecodedStatus) -> String {
    if let Some(ls) = &status.long_status {
        return format!(
            "{:<8} F:{:3} C:{:3} flow:{:3}/{:3}/{:3} V:{:5.1}F L:{:5.1}F d:{:+5.1}F {:5.1}/{:5.0} psi{}",
            ls.operating_level().to_string(),
            ls.fan_speed,
            ls.compressor_speed,
            ls.flow_main,
            ls.flow_aux1,
            ls.flow_aux2,
            ls.vapor_temp_f,
            ls.liquid_temp_f,
            ls.differential_f(),
            ls.vapor_pressure_psi(),
            ls.liquid_pressure_psi(),
            if ls.high_performance() { " HP" } else { "" },
        );
    }

    let mut parts = Vec::new();
    if let Some(fo) = &status.fixed_offset {
        parts.push(format!(
            "power={} op={} vapor={}C liquid={}C diff={}C",
            if fo.power_on { "ON" } else { "OFF" },
            fo.operational,
            fo.vapor_temp_c,
            fo.liquid_temp_c,
            fo.differential_c(),
        ));
    }
    if let Some(bp) = &status.bit_packed {
        let mode = bp
            .mode
            .map(|m| m.to_string())
            .unwrap_or_else(|| "?".to_string());
        parts.push(format!(
            "mode={} fan={} set={}C",
            mode, bp.fan_speed, bp.setpoint_c
        ));
    }
    parts.join(" | ")
}

/// Multi-line detail block for the `status` command and the detailed
/// monitor view.
pub fn detailed_status(status: &DecodedStatus, verdict: Option<&SafetyVerdict>) -> String {
    let mut out = String::new();

    if let Some(bp) = &status.bit_packed {
        out.push_str("bit-packed profile:\n");
        let mode = bp
            .mode
            .map(|m| m.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        out.push_str(&format!(
            "  power: {}\n  mode: {}\n  fan speed: {}\n  setpoint: {} C\n  swing: V={} H={}\n",
            if bp.power_on { "ON" } else { "OFF" },
            mode,
            bp.fan_speed,
            bp.setpoint_c,
            bp.swing_vertical,
            bp.swing_horizontal,
        ));
    }

    if let Some(fo) = &status.fixed_offset {
        out.push_str("fixed-offset profile:\n");
        out.push_str(&format!(
            "  power: {}\n  vapor line: {} C ({:.1} F)\n  liquid line: {} C ({:.1} F)\n  differential: {} C\n  operational: {}\n  cycle: {:?}\n",
            if fo.power_on { "ON" } else { "OFF" },
            fo.vapor_temp_c,
            celsius_to_fahrenheit(fo.vapor_temp_c as f64),
            fo.liquid_temp_c,
            celsius_to_fahrenheit(fo.liquid_temp_c as f64),
            fo.differential_c(),
            fo.operational,
            fo.cycle_direction(),
        ));
    }

    if let Some(ls) = &status.long_status {
        out.push_str("long-status profile:\n");
        out.push_str(&format!(
            "  level: {}\n  fan/compressor: {}/{}\n  flow: {}/{}/{}\n  vapor line: {:.1} F\n  liquid line: {:.1} F\n  vapor pressure: {:.1} bar ({:.1} psi)\n  liquid pressure: {} kPa ({:.1} psi)\n  system mode: {} (high performance: {})\n",
            ls.operating_level(),
            ls.fan_speed,
            ls.compressor_speed,
            ls.flow_main,
            ls.flow_aux1,
            ls.flow_aux2,
            ls.vapor_temp_f,
            ls.liquid_temp_f,
            ls.vapor_pressure_bar(),
            ls.vapor_pressure_psi(),
            ls.liquid_pressure_kpa,
            ls.liquid_pressure_psi(),
            ls.system_mode,
            ls.high_performance(),
        ));
    }

    match verdict {
        Some(v) if v.ok => out.push_str("safety: OK\n"),
        Some(v) => {
            out.push_str("safety: VIOLATIONS\n");
            for violation in &v.violations {
                out.push_str(&format!("  - {violation}\n"));
            }
        }
        None => {}
    }

    out
}

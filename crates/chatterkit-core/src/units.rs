//! Spindle unit helpers
//!
//! Conversions between spindle speed (rev/min), cutting surface speed (m/min)
//! and the tooth-passing frequencies used by the stability model.
//! Lengths are millimetres throughout.

use std::f64::consts::PI;

/// Seconds per minute, for rev/min to Hz conversions
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Spindle speed for a surface speed
///
/// * `surface_speed` - Cutting speed Vc in m/min
/// * `diameter` - Tool diameter in mm
pub fn rpm_from_surface_speed(surface_speed: f64, diameter: f64) -> f64 {
    1000.0 * surface_speed / (PI * diameter)
}

/// Surface speed for a spindle speed
///
/// * `rpm` - Spindle speed in rev/min
/// * `diameter` - Tool diameter in mm
pub fn surface_speed_from_rpm(rpm: f64, diameter: f64) -> f64 {
    PI * diameter * rpm / 1000.0
}

/// Tooth-passing frequency in Hz
pub fn tooth_passing_frequency(rpm: f64, flutes: u32) -> f64 {
    rpm * f64::from(flutes) / SECONDS_PER_MINUTE
}

/// Tooth-passing angular frequency in rad/s
#[inline]
pub fn tooth_passing_angular_frequency(rpm: f64, flutes: u32) -> f64 {
    2.0 * PI * tooth_passing_frequency(rpm, flutes)
}

/// Spindle torque in N·m for a power in kW at a spindle speed
pub fn torque_from_power(power_kw: f64, rpm: f64) -> f64 {
    power_kw * 1000.0 * SECONDS_PER_MINUTE / (2.0 * PI * rpm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_surface_speed_round_trip() {
        // 12mm cutter at 300 m/min
        let rpm = rpm_from_surface_speed(300.0, 12.0);
        assert_relative_eq!(rpm, 7957.747, epsilon = 1e-3);
        assert_relative_eq!(surface_speed_from_rpm(rpm, 12.0), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tooth_passing_frequency() {
        // 4 flutes at 6000 rpm = 400 teeth per second
        assert_relative_eq!(tooth_passing_frequency(6000.0, 4), 400.0);
        assert_relative_eq!(
            tooth_passing_angular_frequency(6000.0, 4),
            800.0 * PI,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_torque_from_power() {
        // 10 kW at 10000 rpm is just under 9.55 N·m
        assert_relative_eq!(torque_from_power(10.0, 10000.0), 9.5493, epsilon = 1e-4);
    }
}

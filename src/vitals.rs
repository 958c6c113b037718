//! Simulated vitals telemetry.
//!
//! Stands in for a device feed in demos and tests; ranges match the
//! product's dashboard expectations.

use chrono::Utc;
use rand::Rng;
use serde::Serialize;

/// One point-in-time vitals reading.
#[derive(Debug, Clone, Serialize)]
pub struct VitalsReading {
    /// Beats per minute.
    pub heart_rate: u32,
    /// Systolic/diastolic, mmHg.
    pub blood_pressure: String,
    /// Degrees Fahrenheit, one decimal.
    pub temperature: f64,
    /// Blood oxygen saturation, percent.
    pub spo2: u32,
    /// Breaths per minute.
    pub respiration_rate: u32,
    /// Unix seconds.
    pub timestamp: i64,
}

/// Sample one simulated reading.
pub fn sample() -> VitalsReading {
    let mut rng = rand::thread_rng();
    let temperature: f64 = rng.gen_range(97.0..=99.5);

    VitalsReading {
        heart_rate: rng.gen_range(65..=100),
        blood_pressure: format!(
            "{}/{}",
            rng.gen_range(100..=120),
            rng.gen_range(60..=80)
        ),
        temperature: (temperature * 10.0).round() / 10.0,
        spo2: rng.gen_range(95..=100),
        respiration_rate: rng.gen_range(12..=20),
        timestamp: Utc::now().timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_stay_in_range() {
        for _ in 0..200 {
            let reading = sample();
            assert!((65..=100).contains(&reading.heart_rate));
            assert!((95..=100).contains(&reading.spo2));
            assert!((12..=20).contains(&reading.respiration_rate));
            assert!((97.0..=99.5).contains(&reading.temperature));

            let (systolic, diastolic) = reading.blood_pressure.split_once('/').unwrap();
            let systolic: u32 = systolic.parse().unwrap();
            let diastolic: u32 = diastolic.parse().unwrap();
            assert!((100..=120).contains(&systolic));
            assert!((60..=80).contains(&diastolic));
        }
    }

    #[test]
    fn temperature_is_rounded_to_one_decimal() {
        let reading = sample();
        let scaled = reading.temperature * 10.0;
        assert!((scaled - scaled.round()).abs() < 1e-9);
    }
}

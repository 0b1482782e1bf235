use anyhow::{bail, ensure};
use fieldcore::field::AnchorPosition;
use fieldcore::ingest::RawReading;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration for generating synthetic signal-strength records.
///
/// A single transmitter circles the surface; every anchor reports a
/// log-distance path-loss reading of it plus uniform jitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Received power at unit distance (dBm).
    pub reference_dbm: f64,
    pub path_loss_exponent: f64,
    /// Distances below this are clamped to keep readings finite.
    pub min_distance: f64,
    pub noise_dbm: f64,
    pub orbit_center: [f64; 2],
    pub orbit_radius: f64,
    /// Records per full lap of the orbit.
    pub orbit_period: u32,
    /// Probability that a record is emitted truncated.
    pub malformed_rate: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            reference_dbm: -70.0,
            path_loss_exponent: 2.0,
            min_distance: 0.05,
            noise_dbm: 2.0,
            orbit_center: [0.5, 0.5],
            orbit_radius: 0.35,
            orbit_period: 50,
            malformed_rate: 0.0,
            seed: 0,
        }
    }
}

/// Largest accepted jitter amplitude.
const MAX_NOISE_DBM: f64 = 100.0;

impl GeneratorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let [cx, cy] = self.orbit_center;
        let finite = [
            ("reference_dbm", self.reference_dbm),
            ("path_loss_exponent", self.path_loss_exponent),
            ("min_distance", self.min_distance),
            ("noise_dbm", self.noise_dbm),
            ("orbit_center.x", cx),
            ("orbit_center.y", cy),
            ("orbit_radius", self.orbit_radius),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            bail!("generator {name} must be finite, got {value}");
        }
        ensure!(
            (0.0..=MAX_NOISE_DBM).contains(&self.noise_dbm),
            "generator noise_dbm must lie in [0, {MAX_NOISE_DBM}], got {}",
            self.noise_dbm
        );
        ensure!(
            self.min_distance >= 0.0,
            "generator min_distance must not be negative, got {}",
            self.min_distance
        );
        ensure!(
            (0.0..=1.0).contains(&self.malformed_rate),
            "generator malformed_rate must lie in [0, 1], got {}",
            self.malformed_rate
        );
        Ok(())
    }
}

pub struct SignalGenerator {
    config: GeneratorConfig,
    anchors: Vec<AnchorPosition>,
    rng: StdRng,
    tick: u64,
}

impl SignalGenerator {
    pub fn new(config: GeneratorConfig, anchors: Vec<AnchorPosition>) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            anchors,
            rng,
            tick: 0,
        }
    }

    /// Transmitter position for the next record.
    pub fn transmitter(&self) -> (f64, f64) {
        let period = self.config.orbit_period.max(1) as f64;
        let phase = 2.0 * PI * (self.tick as f64 / period);
        let [cx, cy] = self.config.orbit_center;
        (
            cx + self.config.orbit_radius * phase.cos(),
            cy + self.config.orbit_radius * phase.sin(),
        )
    }

    pub fn next_reading(&mut self) -> RawReading {
        let (tx, ty) = self.transmitter();
        let jitter = self.config.noise_dbm;
        let values = self
            .anchors
            .iter()
            .map(|anchor| {
                let distance = ((anchor.x - tx).powi(2) + (anchor.y - ty).powi(2))
                    .sqrt()
                    .max(self.config.min_distance.max(f64::EPSILON));
                let mean = self.config.reference_dbm
                    - 10.0 * self.config.path_loss_exponent * distance.log10();
                let noise = if jitter > 0.0 {
                    self.rng.gen_range(-jitter..jitter)
                } else {
                    0.0
                };
                (mean + noise).round() as i64
            })
            .collect();
        self.tick += 1;
        RawReading::new(values)
    }

    /// Next record in wire form, occasionally truncated when `malformed_rate` is set.
    pub fn next_record(&mut self) -> String {
        let record = self.next_reading().encode();
        let rate = self.config.malformed_rate;
        if rate > 0.0 && self.rng.gen_bool(rate) {
            match record.rfind(',') {
                Some(cut) => record[..cut].to_string(),
                None => format!("{record},"),
            }
        } else {
            record
        }
    }
}

impl Iterator for SignalGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldcore::ingest::FrameParser;

    fn corners() -> Vec<AnchorPosition> {
        AnchorPosition::unit_square_corners()
    }

    #[test]
    fn generator_is_repeatable_for_a_seed() {
        let config = GeneratorConfig {
            seed: 13,
            ..Default::default()
        };
        let left: Vec<_> = SignalGenerator::new(config.clone(), corners()).take(20).collect();
        let right: Vec<_> = SignalGenerator::new(config, corners()).take(20).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn records_parse_into_one_value_per_anchor() {
        let parser = FrameParser::new(4);
        for record in SignalGenerator::new(GeneratorConfig::default(), corners()).take(50) {
            let reading = parser.parse(&record).unwrap();
            assert!(reading.as_slice().iter().all(|&v| (-100..=-30).contains(&v)));
        }
    }

    #[test]
    fn nearest_anchor_reads_strongest() {
        let config = GeneratorConfig {
            orbit_center: [0.9, 0.1],
            orbit_radius: 0.0,
            noise_dbm: 0.0,
            ..Default::default()
        };
        let reading = SignalGenerator::new(config, corners()).next_reading();
        let values = reading.as_slice();
        // Anchor 1 sits at (1, 0).
        assert!(values.iter().enumerate().all(|(i, &v)| i == 1 || v < values[1]));
    }

    #[test]
    fn validate_rejects_unusable_settings() {
        assert!(GeneratorConfig::default().validate().is_ok());
        let broken = [
            GeneratorConfig { noise_dbm: f64::INFINITY, ..Default::default() },
            GeneratorConfig { noise_dbm: -1.0, ..Default::default() },
            GeneratorConfig { reference_dbm: f64::NAN, ..Default::default() },
            GeneratorConfig { orbit_center: [0.5, f64::NEG_INFINITY], ..Default::default() },
            GeneratorConfig { min_distance: -0.1, ..Default::default() },
            GeneratorConfig { malformed_rate: 1.5, ..Default::default() },
            GeneratorConfig { malformed_rate: f64::NAN, ..Default::default() },
        ];
        for config in broken {
            assert!(config.validate().is_err(), "{config:?} accepted");
        }
    }

    #[test]
    fn malformed_records_fail_to_parse() {
        let config = GeneratorConfig {
            malformed_rate: 1.0,
            ..Default::default()
        };
        let parser = FrameParser::new(4);
        for record in SignalGenerator::new(config, corners()).take(10) {
            assert!(parser.parse(&record).is_err());
        }
    }
}

//! Scalar Kalman filter used to de-noise one signal-strength channel.
//!
//! Each update runs the random-walk model:
//!
//! ```text
//! p  = p + q
//! k  = p / (p + r)
//! x  = x + k (z - x)
//! p  = p (1 - k)
//! ```

use crate::prelude::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};

/// Tuning knobs for one channel estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorParams {
    /// Starting estimate.
    pub initial_value: f64,
    /// Trust in the model versus the measurement (q).
    pub process_noise: f64,
    /// Assumed sensor noise (r).
    pub measurement_noise: f64,
    /// Initial uncertainty (p0).
    pub estimate_error: f64,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            initial_value: -60.0,
            process_noise: 0.3,
            measurement_noise: 2.0,
            estimate_error: 1.0,
        }
    }
}

impl EstimatorParams {
    pub fn validate(&self) -> FieldResult<()> {
        if !self.initial_value.is_finite() {
            return Err(FieldError::Config(format!(
                "initial value must be finite, got {}",
                self.initial_value
            )));
        }
        if !(self.process_noise.is_finite() && self.process_noise > 0.0) {
            return Err(FieldError::Config(format!(
                "process noise must be positive, got {}",
                self.process_noise
            )));
        }
        if !(self.measurement_noise.is_finite() && self.measurement_noise > 0.0) {
            return Err(FieldError::Config(format!(
                "measurement noise must be positive, got {}",
                self.measurement_noise
            )));
        }
        if !(self.estimate_error.is_finite() && self.estimate_error >= 0.0) {
            return Err(FieldError::Config(format!(
                "estimate error must be non-negative, got {}",
                self.estimate_error
            )));
        }
        Ok(())
    }
}

/// Recursive estimator for a single channel.
#[derive(Debug, Clone)]
pub struct ChannelEstimator {
    estimate: f64,
    error_variance: f64,
    process_noise: f64,
    measurement_noise: f64,
    last_gain: f64,
    updates: u64,
}

impl ChannelEstimator {
    pub fn new(params: EstimatorParams) -> FieldResult<Self> {
        params.validate()?;
        Ok(Self {
            estimate: params.initial_value,
            error_variance: params.estimate_error,
            process_noise: params.process_noise,
            measurement_noise: params.measurement_noise,
            last_gain: 0.0,
            updates: 0,
        })
    }

    /// Folds one measurement into the estimate and returns the new estimate.
    pub fn update(&mut self, measurement: f64) -> f64 {
        self.error_variance += self.process_noise;
        let gain = self.error_variance / (self.error_variance + self.measurement_noise);
        self.estimate += gain * (measurement - self.estimate);
        self.error_variance *= 1.0 - gain;
        self.last_gain = gain;
        self.updates += 1;
        self.estimate
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    pub fn error_variance(&self) -> f64 {
        self.error_variance
    }

    /// Gain applied by the most recent update (0 before the first one).
    pub fn last_gain(&self) -> f64 {
        self.last_gain
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn update_matches_hand_computed_step() {
        let mut filter = ChannelEstimator::new(EstimatorParams::default()).unwrap();
        // p = 1.3, k = 1.3 / 3.3, x = -60 + k * (-50 + 60)
        let expected_gain = 1.3 / 3.3;
        let estimate = filter.update(-50.0);
        assert!((estimate - (-60.0 + expected_gain * 10.0)).abs() < 1e-12);
        assert!((filter.error_variance() - 1.3 * (1.0 - expected_gain)).abs() < 1e-12);
        assert_eq!(filter.updates(), 1);
    }

    #[test]
    fn construction_rejects_non_positive_noise() {
        let zero_r = EstimatorParams {
            measurement_noise: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            ChannelEstimator::new(zero_r),
            Err(FieldError::Config(_))
        ));

        let negative_q = EstimatorParams {
            process_noise: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            ChannelEstimator::new(negative_q),
            Err(FieldError::Config(_))
        ));

        let negative_p = EstimatorParams {
            estimate_error: -1.0,
            ..Default::default()
        };
        assert!(ChannelEstimator::new(negative_p).is_err());

        let nan_initial = EstimatorParams {
            initial_value: f64::NAN,
            ..Default::default()
        };
        assert!(ChannelEstimator::new(nan_initial).is_err());
    }

    #[test]
    fn repeated_measurement_converges() {
        let mut filter = ChannelEstimator::new(EstimatorParams::default()).unwrap();
        for _ in 0..500 {
            filter.update(-45.0);
        }
        let previous_variance = filter.error_variance();
        filter.update(-45.0);
        assert!((filter.error_variance() - previous_variance).abs() < 1e-12);
        assert!((filter.estimate() + 45.0).abs() < 1e-9);

        // Steady state solves p = (p + q) r / (p + q + r).
        let (q, r) = (0.3, 2.0);
        let p = filter.error_variance();
        assert!((p - (p + q) * r / (p + q + r)).abs() < 1e-9);
    }

    #[test]
    fn identical_inputs_are_bit_identical() {
        let measurements = [-60.0, -61.0, -59.0, -62.0, -58.0, -70.0, -44.0];
        let mut left = ChannelEstimator::new(EstimatorParams::default()).unwrap();
        let mut right = ChannelEstimator::new(EstimatorParams::default()).unwrap();
        for &m in &measurements {
            assert_eq!(left.update(m).to_bits(), right.update(m).to_bits());
        }
        assert_eq!(
            left.error_variance().to_bits(),
            right.error_variance().to_bits()
        );
    }

    proptest! {
        #[test]
        fn variance_stays_non_negative_and_gain_below_one(
            measurements in proptest::collection::vec(-120.0f64..20.0, 1..200),
            q in 0.001f64..10.0,
            r in 0.001f64..10.0,
            p0 in 0.0f64..50.0,
        ) {
            let params = EstimatorParams {
                initial_value: -60.0,
                process_noise: q,
                measurement_noise: r,
                estimate_error: p0,
            };
            let mut filter = ChannelEstimator::new(params).unwrap();
            for m in measurements {
                filter.update(m);
                prop_assert!(filter.error_variance() >= 0.0);
                prop_assert!(filter.last_gain() >= 0.0 && filter.last_gain() < 1.0);
            }
        }
    }
}

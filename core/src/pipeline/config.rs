use crate::estimation::EstimatorParams;
use crate::field::{AnchorPosition, ExtrapolationPolicy, FieldReconstructor, GridResolution};
use crate::prelude::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};

/// Everything the orchestrator needs before it can start.
///
/// The channel count is the number of anchors; every per-channel list must match it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub anchors: Vec<AnchorPosition>,
    pub estimators: Vec<EstimatorParams>,
    pub resolution: GridResolution,
    pub extrapolation: ExtrapolationPolicy,
    pub labels: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(
            AnchorPosition::unit_square_corners(),
            EstimatorParams::default(),
        )
    }
}

impl PipelineConfig {
    /// Uniform estimator tuning across all channels.
    pub fn new(anchors: Vec<AnchorPosition>, params: EstimatorParams) -> Self {
        let channels = anchors.len();
        Self {
            anchors,
            estimators: vec![params; channels],
            resolution: GridResolution::default(),
            extrapolation: ExtrapolationPolicy::default(),
            labels: default_labels(channels),
        }
    }

    pub fn with_resolution(mut self, resolution: GridResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_extrapolation(mut self, policy: ExtrapolationPolicy) -> Self {
        self.extrapolation = policy;
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn channels(&self) -> usize {
        self.anchors.len()
    }

    /// Checks the configuration without building the pipeline.
    pub fn validate(&self) -> FieldResult<()> {
        self.build_reconstructor().map(|_| ())
    }

    pub(crate) fn build_reconstructor(&self) -> FieldResult<FieldReconstructor> {
        let channels = self.channels();
        if channels == 0 {
            return Err(FieldError::EmptyInput);
        }
        if self.estimators.len() != channels {
            return Err(FieldError::Config(format!(
                "{} estimator settings for {} channels",
                self.estimators.len(),
                channels
            )));
        }
        if self.labels.len() != channels {
            return Err(FieldError::Config(format!(
                "{} labels for {} channels",
                self.labels.len(),
                channels
            )));
        }
        for (index, params) in self.estimators.iter().enumerate() {
            params.validate().map_err(|err| match err {
                FieldError::Config(msg) => FieldError::Config(format!("channel {index}: {msg}")),
                other => other,
            })?;
        }
        for anchor in &self.anchors {
            anchor.validate()?;
        }
        self.resolution.validate().map_err(|err| match err {
            FieldError::Reconstruction(msg) => FieldError::Config(msg),
            other => other,
        })?;
        FieldReconstructor::new(&self.anchors, self.resolution, self.extrapolation)
            .map_err(|err| FieldError::Config(format!("anchor layout: {err}")))
    }
}

/// `ESP1`, `ESP2`, ... after the receivers of the reference deployment.
pub fn default_labels(channels: usize) -> Vec<String> {
    (1..=channels).map(|n| format!("ESP{n}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.channels(), 4);
        assert_eq!(config.labels, vec!["ESP1", "ESP2", "ESP3", "ESP4"]);
        config.validate().unwrap();
    }

    #[test]
    fn zero_channels_is_empty_input() {
        let config = PipelineConfig::new(Vec::new(), EstimatorParams::default());
        assert!(matches!(config.validate(), Err(FieldError::EmptyInput)));
    }

    #[test]
    fn degenerate_layout_is_a_config_error() {
        let anchors = vec![
            AnchorPosition::new(0.0, 0.0),
            AnchorPosition::new(0.5, 0.0),
            AnchorPosition::new(1.0, 0.0),
        ];
        let config = PipelineConfig::new(anchors, EstimatorParams::default());
        assert!(matches!(config.validate(), Err(FieldError::Config(_))));

        let two = PipelineConfig::new(
            vec![AnchorPosition::new(0.0, 0.0), AnchorPosition::new(1.0, 1.0)],
            EstimatorParams::default(),
        );
        assert!(matches!(two.validate(), Err(FieldError::Config(_))));
    }

    #[test]
    fn per_channel_lists_must_match() {
        let mut config = PipelineConfig::default();
        config.estimators.pop();
        assert!(matches!(config.validate(), Err(FieldError::Config(_))));

        let config = PipelineConfig::default().with_labels(vec!["a".into()]);
        assert!(matches!(config.validate(), Err(FieldError::Config(_))));
    }

    #[test]
    fn bad_noise_is_rejected() {
        let mut config = PipelineConfig::default();
        config.estimators[2].measurement_noise = 0.0;
        match config.validate() {
            Err(FieldError::Config(msg)) => assert!(msg.contains("channel 2")),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let config = PipelineConfig::default().with_resolution(GridResolution::new(10, 0));
        assert!(matches!(config.validate(), Err(FieldError::Config(_))));
    }

    #[test]
    fn oversized_resolution_is_a_config_error() {
        let config =
            PipelineConfig::default().with_resolution(GridResolution::new(100_000_000_000, 10));
        assert!(matches!(config.validate(), Err(FieldError::Config(_))));
    }
}

use crate::generator::profile::GeneratorConfig;
use anyhow::{bail, Context};
use fieldcore::estimation::EstimatorParams;
use fieldcore::field::{AnchorPosition, ExtrapolationPolicy, GridResolution};
use fieldcore::pipeline::default_labels;
use fieldcore::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// One receiver per channel, in record order.
    pub anchors: Vec<AnchorPosition>,
    pub labels: Option<Vec<String>>,
    /// Tuning shared by every channel.
    pub estimator: EstimatorParams,
    /// Per-channel tuning, keyed by zero-based channel index.
    pub channel_estimators: BTreeMap<usize, EstimatorParams>,
    pub grid: GridResolution,
    pub extrapolation: ExtrapolationPolicy,
    /// Records buffered between the input thread and the pipeline.
    pub queue_capacity: usize,
    pub generator: GeneratorConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            anchors: AnchorPosition::unit_square_corners(),
            labels: None,
            estimator: EstimatorParams::default(),
            channel_estimators: BTreeMap::new(),
            grid: GridResolution::default(),
            extrapolation: ExtrapolationPolicy::default(),
            queue_capacity: 64,
            generator: GeneratorConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading monitor config {}", path_ref.display()))?;
        let config: MonitorConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing monitor config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn with_grid_overrides(mut self, rows: Option<usize>, cols: Option<usize>) -> Self {
        if let Some(rows) = rows {
            self.grid.rows = rows;
        }
        if let Some(cols) = cols {
            self.grid.cols = cols;
        }
        self
    }

    pub fn to_pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        self.generator.validate()?;
        let channels = self.anchors.len();
        if let Some(channel) = self
            .channel_estimators
            .keys()
            .find(|&&channel| channel >= channels)
        {
            bail!("estimator override for channel {channel}, but only {channels} anchors are configured");
        }

        let estimators = (0..channels)
            .map(|channel| {
                self.channel_estimators
                    .get(&channel)
                    .copied()
                    .unwrap_or(self.estimator)
            })
            .collect();

        Ok(PipelineConfig {
            anchors: self.anchors.clone(),
            estimators,
            resolution: self.grid,
            extrapolation: self.extrapolation,
            labels: self
                .labels
                .clone()
                .unwrap_or_else(|| default_labels(channels)),
        })
    }
}

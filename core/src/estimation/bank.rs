use crate::estimation::kalman::{ChannelEstimator, EstimatorParams};
use crate::ingest::RawReading;
use crate::prelude::{FieldError, FieldResult};

/// One estimator per channel, updated together from a single reading.
#[derive(Debug, Clone)]
pub struct EstimatorBank {
    channels: Vec<ChannelEstimator>,
}

impl EstimatorBank {
    pub fn new(params: &[EstimatorParams]) -> FieldResult<Self> {
        if params.is_empty() {
            return Err(FieldError::EmptyInput);
        }
        let channels = params
            .iter()
            .enumerate()
            .map(|(index, p)| {
                ChannelEstimator::new(*p).map_err(|err| match err {
                    FieldError::Config(msg) => FieldError::Config(format!("channel {index}: {msg}")),
                    other => other,
                })
            })
            .collect::<FieldResult<Vec<_>>>()?;
        Ok(Self { channels })
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Updates every channel and returns the smoothed vector.
    ///
    /// A reading of the wrong width is rejected before any channel is touched.
    pub fn update(&mut self, reading: &RawReading) -> FieldResult<Vec<f64>> {
        if reading.len() != self.channels.len() {
            return Err(FieldError::InvalidState(format!(
                "reading has {} channels, estimator bank has {}",
                reading.len(),
                self.channels.len()
            )));
        }
        Ok(self
            .channels
            .iter_mut()
            .zip(reading.measurements())
            .map(|(channel, measurement)| channel.update(measurement))
            .collect())
    }

    pub fn estimates(&self) -> Vec<f64> {
        self.channels.iter().map(ChannelEstimator::estimate).collect()
    }

    pub fn channel(&self, index: usize) -> Option<&ChannelEstimator> {
        self.channels.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelEstimator> {
        self.channels.iter()
    }
}

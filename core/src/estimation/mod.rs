pub mod bank;
pub mod kalman;

pub use bank::EstimatorBank;
pub use kalman::{ChannelEstimator, EstimatorParams};

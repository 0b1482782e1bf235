use crate::prelude::ParseError;
use serde::{Deserialize, Serialize};

/// One decoded record: a raw integer measurement per channel, in channel order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReading(Vec<i64>);

impl RawReading {
    pub fn new(values: Vec<i64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Measurements widened to `f64` for the estimators.
    pub fn measurements(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|&value| value as f64)
    }

    /// Canonical wire form, e.g. `-60,-61,-59,-62`.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn into_inner(self) -> Vec<i64> {
        self.0
    }
}

/// Validates and decodes comma-separated records into exactly `channels` integers.
#[derive(Debug, Clone, Copy)]
pub struct FrameParser {
    channels: usize,
}

impl FrameParser {
    pub fn new(channels: usize) -> Self {
        Self { channels }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn parse(&self, record: &str) -> Result<RawReading, ParseError> {
        let tokens: Vec<&str> = record.trim().split(',').map(str::trim).collect();
        if tokens.len() != self.channels {
            return Err(ParseError::TokenCount {
                expected: self.channels,
                found: tokens.len(),
            });
        }

        let values = tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                token.parse::<i64>().map_err(|_| ParseError::InvalidToken {
                    index,
                    token: (*token).to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RawReading(values))
    }
}

use std::fmt;
use std::ops::Range;

use crate::proto::command::Mode;
use crate::proto::conv::with_unit;
use crate::proto::{ProtoError, Result};

/// Position of the reading inside a `P0` answer.
pub const READING: Range<usize> = 0..12;

/// The reading field of a `P0` answer. What it measures depends on the
/// mode the instrument is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    raw: String,
}

impl Reading {
    pub fn from_response(raw: &str) -> Result<Self> {
        raw.get(READING)
            .map(|field| Self {
                raw: field.to_string(),
            })
            .ok_or_else(|| {
                ProtoError::Malformed(format!(
                    "answer of {} bytes is too short for a reading",
                    raw.len()
                ))
            })
    }

    /// Reading as sent, without padding.
    pub fn text(&self) -> &str {
        self.raw.trim()
    }

    pub fn value(&self) -> Result<f64> {
        self.text()
            .parse::<f64>()
            .map_err(|err| ProtoError::Malformed(format!("reading {:?}: {}", self.text(), err)))
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// A reading together with the mode it was taken in. The mode is unknown
/// when the instrument returns the reading only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub reading: Reading,
    pub mode: Option<Mode>,
}

impl Measurement {
    pub fn unit(&self) -> Option<&'static str> {
        self.mode.map(Mode::unit)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit() {
            Some(unit) => f.write_str(&with_unit(self.reading.text(), unit)),
            None => f.write_str(self.reading.text()),
        }
    }
}

//! Decoding of the status block returned by the `P0` query.
//!
//! The block is positional. After the 12 character reading follow
//! two-letter codes and single characters at fixed offsets:
//!
//! | Offset  | Field               |
//! |---------|---------------------|
//! | 12..14  | mode                |
//! | 14..16  | range               |
//! | 16..18  | autorange           |
//! | 18..20  | integration time    |
//! | 20..22  | continuous mode     |
//! | 22..24  | service request     |
//! | 25      | multiplexer channel |
//! | 27      | display             |
//! | 29      | latest pressed key  |

use std::fmt;
use std::ops::Range;

use tracing::trace;

use crate::proto::command::{Autorange, IntegrationTime, Mode, Setting};
use crate::proto::{ProtoError, Result};

/// Minimal length of a status line.
pub const STATUS_LEN: usize = 30;

const MODE: Range<usize> = 12..14;
const RANGE: Range<usize> = 14..16;
const AUTORANGE: Range<usize> = 16..18;
const INTEGRATION_TIME: Range<usize> = 18..20;
const CONTINUOUS: Range<usize> = 20..22;
const SRQ: Range<usize> = 22..24;
const CHANNEL: usize = 25;
const DISPLAY: usize = 27;
const KEY: usize = 29;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuous {
    Started,
    Stopped,
}

impl fmt::Display for Continuous {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Continuous::Started => f.write_str("started"),
            Continuous::Stopped => f.write_str("stopped"),
        }
    }
}

/// Whether the instrument raises a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRequest {
    With,
    Without,
}

impl fmt::Display for ServiceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceRequest::With => f.write_str("with"),
            ServiceRequest::Without => f.write_str("without"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Off,
    Input(u8),
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Off => f.write_str("off"),
            Channel::Input(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    On,
    Off,
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayState::On => f.write_str("on"),
            DisplayState::Off => f.write_str("off"),
        }
    }
}

/// Instrument state as reported by one status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub mode: Mode,
    /// Range code, passed through as sent by the instrument.
    pub range: String,
    pub autorange: Autorange,
    pub integration_time: IntegrationTime,
    pub continuous: Continuous,
    pub srq: ServiceRequest,
    pub channel: Channel,
    pub display: DisplayState,
    pub latest_key: char,
}

impl Status {
    pub fn decode(raw: &str) -> Result<Self> {
        let mode = Mode::from_code(field(raw, MODE)?)?;
        let range = field(raw, RANGE)?.to_string();
        let autorange = if field(raw, AUTORANGE)? == "A1" {
            Autorange::Enabled
        } else {
            Autorange::Disabled
        };
        let integration_time = IntegrationTime::from_code(field(raw, INTEGRATION_TIME)?)?;
        let continuous = if field(raw, CONTINUOUS)? == "S1" {
            Continuous::Started
        } else {
            Continuous::Stopped
        };
        let srq = if field(raw, SRQ)? == "Q0" {
            ServiceRequest::Without
        } else {
            ServiceRequest::With
        };
        let channel = match char_at(raw, CHANNEL)? {
            'O' => Channel::Off,
            c => c
                .to_digit(10)
                .map(|n| Channel::Input(n as u8))
                .ok_or_else(|| {
                    ProtoError::Malformed(format!("multiplexer channel is not a number: {:?}", c))
                })?,
        };
        let display_char = char_at(raw, DISPLAY)?;
        trace!(display = %display_char, "display field");
        let display = if display_char == '1' {
            DisplayState::On
        } else {
            DisplayState::Off
        };
        let latest_key = char_at(raw, KEY)?;

        Ok(Self {
            mode,
            range,
            autorange,
            integration_time,
            continuous,
            srq,
            channel,
            display,
            latest_key,
        })
    }

    /// Field names and their decoded labels, in status line order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("mode", self.mode.to_string()),
            ("range", self.range.clone()),
            ("autoranging", self.autorange.to_string()),
            ("integration time", self.integration_time.to_string()),
            ("continuous", self.continuous.to_string()),
            ("SRQ status", self.srq.to_string()),
            ("multiplexer channel", self.channel.to_string()),
            ("display mode", self.display.to_string()),
            ("latest pressed key", self.latest_key.to_string()),
        ]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.fields() {
            writeln!(f, "{}: {}", name, value)?;
        }
        Ok(())
    }
}

pub fn decode_status(raw: &str) -> Result<Status> {
    Status::decode(raw)
}

fn field(raw: &str, range: Range<usize>) -> Result<&str> {
    raw.get(range.clone()).ok_or_else(|| {
        ProtoError::Malformed(format!(
            "status line of {} bytes has no field at {:?}",
            raw.len(),
            range
        ))
    })
}

fn char_at(raw: &str, offset: usize) -> Result<char> {
    field(raw, offset..offset + 1)?
        .chars()
        .next()
        .ok_or_else(|| ProtoError::Malformed(format!("empty field at {}", offset)))
}

use std::{fmt, str::FromStr, time::Duration};

use super::{ProtoError, Result};

/// Status request. The answer carries the current reading followed by
/// the complete instrument state.
pub const STATUS_REQUEST: &str = "P0";

/// Highest primary address on a GPIB bus.
pub const MAX_GPIB_ADDRESS: u8 = 30;

#[derive(Debug, Clone)]
pub enum Command {
    Status,
    /// Forgets an outstanding query. Nothing goes on the wire.
    Abandon,
    SetMode(Mode),
    SetReturnMode(ReturnMode),
    SetAutorange(Autorange),
    SetIntegrationTime(IntegrationTime),
    // Serial-to-GPIB controller
    ControllerMode,
    ControllerAddress(u8),
    ControllerAuto(bool),
    ControllerRead,
}

impl Command {
    /// True for commands the instrument answers with a line.
    pub fn is_query(&self) -> bool {
        matches!(self, Command::Status)
    }
}

/// A symbolic instrument setting backed by a fixed table of
/// two-character codes.
pub trait Setting: Copy + PartialEq + 'static {
    const PROPERTY: &'static str;
    const ALL: &'static [Self];

    fn name(self) -> &'static str;
    fn code(self) -> &'static str;

    fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.name() == name)
            .ok_or_else(|| ProtoError::InvalidChoice {
                property: Self::PROPERTY,
                value: name.to_string(),
            })
    }

    fn from_code(code: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.code() == code)
            .ok_or_else(|| ProtoError::UnknownCode {
                field: Self::PROPERTY,
                code: code.to_string(),
            })
    }

    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.name()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    DirectVoltage,
    AlternatingVoltage,
    TwoWireResistance,
    FourWireResistance,
    DirectCurrent,
    AlternatingCurrent,
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl Mode {
    /// Unit symbol of readings taken in this mode.
    pub fn unit(self) -> &'static str {
        match self {
            Mode::DirectVoltage | Mode::AlternatingVoltage => "V",
            Mode::TwoWireResistance | Mode::FourWireResistance => "Ω",
            Mode::DirectCurrent | Mode::AlternatingCurrent => "A",
            Mode::Celsius => "°C",
            Mode::Fahrenheit => "°F",
            Mode::Kelvin => "K",
        }
    }
}

impl Setting for Mode {
    const PROPERTY: &'static str = "mode";
    const ALL: &'static [Self] = &[
        Mode::DirectVoltage,
        Mode::AlternatingVoltage,
        Mode::TwoWireResistance,
        Mode::FourWireResistance,
        Mode::DirectCurrent,
        Mode::AlternatingCurrent,
        Mode::Celsius,
        Mode::Fahrenheit,
        Mode::Kelvin,
    ];

    fn name(self) -> &'static str {
        match self {
            Mode::DirectVoltage => "direct voltage",
            Mode::AlternatingVoltage => "alternating voltage",
            Mode::TwoWireResistance => "2-wire resistance",
            Mode::FourWireResistance => "4-wire resistance",
            Mode::DirectCurrent => "direct current",
            Mode::AlternatingCurrent => "alternating current",
            Mode::Celsius => "celsius",
            Mode::Fahrenheit => "farenheit",
            Mode::Kelvin => "kelvin",
        }
    }

    fn code(self) -> &'static str {
        // Resistance codes use the letter O, not zero.
        match self {
            Mode::DirectVoltage => "VD",
            Mode::AlternatingVoltage => "VA",
            Mode::TwoWireResistance => "O2",
            Mode::FourWireResistance => "O4",
            Mode::DirectCurrent => "ID",
            Mode::AlternatingCurrent => "IA",
            Mode::Celsius => "TC",
            Mode::Fahrenheit => "TF",
            Mode::Kelvin => "TK",
        }
    }
}

impl FromStr for Mode {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fahrenheit" => Ok(Mode::Fahrenheit),
            _ => Self::from_name(s),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Controls whether a `P0` answer carries only the reading or the reading
/// and the status block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnMode {
    MeasurementOnly,
    MeasurementAndStatus,
}

impl Setting for ReturnMode {
    const PROPERTY: &'static str = "return mode";
    const ALL: &'static [Self] = &[ReturnMode::MeasurementOnly, ReturnMode::MeasurementAndStatus];

    fn name(self) -> &'static str {
        match self {
            ReturnMode::MeasurementOnly => "measurement only",
            ReturnMode::MeasurementAndStatus => "measurement and status",
        }
    }

    fn code(self) -> &'static str {
        match self {
            ReturnMode::MeasurementOnly => "L0",
            ReturnMode::MeasurementAndStatus => "L1",
        }
    }
}

impl FromStr for ReturnMode {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for ReturnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Autorange {
    Enabled,
    Disabled,
}

impl From<bool> for Autorange {
    fn from(value: bool) -> Self {
        if value {
            Autorange::Enabled
        } else {
            Autorange::Disabled
        }
    }
}

impl From<Autorange> for bool {
    fn from(value: Autorange) -> Self {
        value == Autorange::Enabled
    }
}

impl Setting for Autorange {
    const PROPERTY: &'static str = "autorange";
    const ALL: &'static [Self] = &[Autorange::Enabled, Autorange::Disabled];

    fn name(self) -> &'static str {
        match self {
            Autorange::Enabled => "enabled",
            Autorange::Disabled => "disabled",
        }
    }

    fn code(self) -> &'static str {
        match self {
            Autorange::Enabled => "A1",
            Autorange::Disabled => "A0",
        }
    }
}

impl FromStr for Autorange {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for Autorange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Integration time. Only three of the four instrument codes can be set;
/// the status block may still report `T2`, which reads as one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationTime {
    Ms100,
    S1,
    S10,
}

impl IntegrationTime {
    /// Label used in decoded status records.
    pub fn label(self) -> &'static str {
        match self {
            IntegrationTime::Ms100 => "100 ms",
            IntegrationTime::S1 => "1 s",
            IntegrationTime::S10 => "10 s",
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            IntegrationTime::Ms100 => Duration::from_millis(100),
            IntegrationTime::S1 => Duration::from_secs(1),
            IntegrationTime::S10 => Duration::from_secs(10),
        }
    }
}

impl Setting for IntegrationTime {
    const PROPERTY: &'static str = "integration time";
    const ALL: &'static [Self] = &[
        IntegrationTime::Ms100,
        IntegrationTime::S1,
        IntegrationTime::S10,
    ];

    fn name(self) -> &'static str {
        match self {
            IntegrationTime::Ms100 => "100ms",
            IntegrationTime::S1 => "1s",
            IntegrationTime::S10 => "10s",
        }
    }

    fn code(self) -> &'static str {
        match self {
            IntegrationTime::Ms100 => "T1",
            IntegrationTime::S1 => "T3",
            IntegrationTime::S10 => "T4",
        }
    }

    fn from_code(code: &str) -> Result<Self> {
        match code {
            "T1" => Ok(IntegrationTime::Ms100),
            "T2" | "T3" => Ok(IntegrationTime::S1),
            "T4" => Ok(IntegrationTime::S10),
            _ => Err(ProtoError::UnknownCode {
                field: Self::PROPERTY,
                code: code.to_string(),
            }),
        }
    }
}

impl FromStr for IntegrationTime {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for IntegrationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn mode_to_code(name: &str) -> Result<&'static str> {
    name.parse::<Mode>().map(Mode::code)
}

pub fn code_to_mode(code: &str) -> Result<&'static str> {
    Mode::from_code(code).map(Mode::name)
}

pub fn return_mode_to_code(name: &str) -> Result<&'static str> {
    name.parse::<ReturnMode>().map(ReturnMode::code)
}

pub fn autorange_to_code(name: &str) -> Result<&'static str> {
    name.parse::<Autorange>().map(Autorange::code)
}

pub fn integration_time_to_code(name: &str) -> Result<&'static str> {
    name.parse::<IntegrationTime>().map(IntegrationTime::code)
}

/// Decoded label of an integration time code, `T1` to `T4`.
pub fn code_to_integration_time(code: &str) -> Result<&'static str> {
    IntegrationTime::from_code(code).map(IntegrationTime::label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_table_is_a_bijection() {
        for mode in Mode::ALL {
            let code = mode_to_code(mode.name()).expect("known mode");
            assert_eq!(code_to_mode(code).expect("known code"), mode.name());
        }
        let mut codes: Vec<_> = Mode::ALL.iter().map(|m| m.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Mode::ALL.len());
    }

    #[test]
    fn resistance_codes_use_letter_o() {
        assert_eq!(mode_to_code("2-wire resistance").unwrap(), "O2");
        assert_eq!(mode_to_code("4-wire resistance").unwrap(), "O4");
        assert!(matches!(
            code_to_mode("02"),
            Err(ProtoError::UnknownCode { field: "mode", .. })
        ));
    }

    #[test]
    fn fahrenheit_keeps_instrument_label() {
        assert_eq!(code_to_mode("TF").unwrap(), "farenheit");
        assert_eq!(mode_to_code("farenheit").unwrap(), "TF");
        assert_eq!(mode_to_code("fahrenheit").unwrap(), "TF");
        assert!(Mode::names().contains(&"farenheit"));
        assert!(!Mode::names().contains(&"fahrenheit"));
    }

    #[test]
    fn unknown_mode_name_is_invalid_choice() {
        assert!(matches!(
            mode_to_code("frequency"),
            Err(ProtoError::InvalidChoice {
                property: "mode",
                ..
            })
        ));
    }

    #[test]
    fn autorange_bool_and_name_share_codes() {
        assert_eq!(Autorange::from(true).code(), autorange_to_code("enabled").unwrap());
        assert_eq!(Autorange::from(false).code(), autorange_to_code("disabled").unwrap());
        assert_eq!(autorange_to_code("enabled").unwrap(), "A1");
        assert!(bool::from(Autorange::Enabled));
        assert!(autorange_to_code("on").is_err());
    }

    #[test]
    fn return_mode_codes() {
        assert_eq!(return_mode_to_code("measurement only").unwrap(), "L0");
        assert_eq!(return_mode_to_code("measurement and status").unwrap(), "L1");
        assert_eq!(ReturnMode::from_code("L1").unwrap(), ReturnMode::MeasurementAndStatus);
    }

    #[test]
    fn integration_time_t2_is_decodable_but_not_settable() {
        assert_eq!(integration_time_to_code("100ms").unwrap(), "T1");
        assert_eq!(integration_time_to_code("1s").unwrap(), "T3");
        assert_eq!(integration_time_to_code("10s").unwrap(), "T4");
        assert_eq!(code_to_integration_time("T2").unwrap(), "1 s");
        assert_eq!(code_to_integration_time("T3").unwrap(), "1 s");
        assert!(IntegrationTime::ALL.iter().all(|t| t.code() != "T2"));
        assert!(matches!(
            code_to_integration_time("T5"),
            Err(ProtoError::UnknownCode { .. })
        ));
    }

    #[test]
    fn integration_time_outside_choices_is_rejected() {
        for value in ["2s", "100 ms", "1 s", ""] {
            assert!(matches!(
                value.parse::<IntegrationTime>(),
                Err(ProtoError::InvalidChoice {
                    property: "integration time",
                    ..
                })
            ));
        }
    }

    #[test]
    fn status_is_the_only_query() {
        assert!(Command::Status.is_query());
        assert!(!Command::SetMode(Mode::Kelvin).is_query());
        assert!(!Command::ControllerRead.is_query());
    }
}

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SbdfParseError {
    #[error("invalid hex number {0:?}")]
    InvalidNumber(String),

    #[error("{field} {value:#x} is out of range (max {max:#x})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("expected SSSS:BB:DD.F or BB:DD.F, got {0:?}")]
    Malformed(String),
}

/// PCI segment/bus/device/function.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Sbdf {
    pub segment: u16,
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl Sbdf {
    /// Checks the PCI ranges: device < 32, function < 8.
    pub fn new(segment: u16, bus: u8, device: u8, function: u8) -> Result<Self, SbdfParseError> {
        if device >= 32 {
            return Err(SbdfParseError::OutOfRange {
                field: "device",
                value: device.into(),
                max: 31,
            });
        }
        if function >= 8 {
            return Err(SbdfParseError::OutOfRange {
                field: "function",
                value: function.into(),
                max: 7,
            });
        }
        Ok(Self {
            segment,
            bus,
            device,
            function,
        })
    }

    /// Builds an SBDF from four separate hexadecimal fields (`seg bus dev func`).
    pub fn from_hex_parts(
        segment: &str,
        bus: &str,
        device: &str,
        function: &str,
    ) -> Result<Self, SbdfParseError> {
        Self::new(
            parse_hex(segment, "segment", u16::MAX.into())? as u16,
            parse_hex(bus, "bus", u8::MAX.into())? as u8,
            parse_hex(device, "device", u8::MAX.into())? as u8,
            parse_hex(function, "function", u8::MAX.into())? as u8,
        )
    }
}

fn parse_hex(raw: &str, field: &'static str, max: u32) -> Result<u32, SbdfParseError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    let value = u32::from_str_radix(digits, 16)
        .map_err(|_| SbdfParseError::InvalidNumber(raw.to_string()))?;
    if value > max {
        return Err(SbdfParseError::OutOfRange { field, value, max });
    }
    Ok(value)
}

/// Formats as the Linux sysfs device name, e.g. `0000:03:00.0`.
impl fmt::Display for Sbdf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:02x}:{:02x}.{:x}",
            self.segment, self.bus, self.device, self.function
        )
    }
}

impl FromStr for Sbdf {
    type Err = SbdfParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SbdfParseError::Malformed(s.to_string());

        let parts: Vec<&str> = s.split(':').collect();
        let (segment, bus, devfn) = match parts.as_slice() {
            [segment, bus, devfn] => (*segment, *bus, *devfn),
            [bus, devfn] => ("0", *bus, *devfn),
            _ => return Err(malformed()),
        };
        let (device, function) = devfn.split_once('.').ok_or_else(malformed)?;

        Self::from_hex_parts(segment, bus, device, function)
    }
}

//! Reply lines of the firmware's text protocol.

/// Identification string returned by `?`
pub const IDENTIFICATION: &str = "6x2 Antenna Switch SQ9NJE";

/// Parsed reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Error,
    Busy,
    /// Any other line (antenna number, names, mode, identification)
    Text(String),
}

impl Reply {
    /// Parse one reply line with its terminator already removed.
    pub fn parse(line: &str) -> Self {
        match line {
            "+OK" => Reply::Ok,
            "!ERR" => Reply::Error,
            "!BUSY" => Reply::Busy,
            other => Reply::Text(other.to_string()),
        }
    }

    /// Interpret the reply as an antenna number.
    pub fn antenna(&self) -> Option<u8> {
        match self {
            Reply::Text(text) => text.parse().ok(),
            _ => None,
        }
    }
}

/// Operating-mode flags as reported by `mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    pub antenna_swapping: bool,
    pub single_radio: bool,
}

impl Mode {
    /// Parse `swap=<0|1> single=<0|1>`.
    pub fn parse(reply: &Reply) -> Option<Self> {
        let Reply::Text(text) = reply else {
            return None;
        };
        let mut antenna_swapping = None;
        let mut single_radio = None;
        for field in text.split_whitespace() {
            match field.split_once('=')? {
                ("swap", value) => antenna_swapping = Some(value == "1"),
                ("single", value) => single_radio = Some(value == "1"),
                _ => return None,
            }
        }
        Some(Self {
            antenna_swapping: antenna_swapping?,
            single_radio: single_radio?,
        })
    }
}

//! Move command type and its text encodings

use core::fmt::{self, Write};

use heapless::String;

/// Leading byte of a move command
pub const MOVE_MARKER: u8 = b'M';

/// Longest encoded command line: `M,` + two i64 values + `,` + `\n`
pub const MAX_LINE_LEN: usize = 48;

/// Longest debug echo line: `Moving: ` + two i64 values + ` ` + `\r\n`
pub const ECHO_LINE_LEN: usize = 56;

/// Absolute step targets for both joints
///
/// `shoulder` drives the first (X) stepper, `elbow` the second (Y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveCommand {
    /// Shoulder target in steps
    pub shoulder: i64,
    /// Elbow target in steps
    pub elbow: i64,
}

impl MoveCommand {
    /// Create a move command
    pub const fn new(shoulder: i64, elbow: i64) -> Self {
        Self { shoulder, elbow }
    }

    /// Encode as the line a host sends, e.g. `M,1200,-800\n`
    pub fn encode(&self) -> Result<String<MAX_LINE_LEN>, fmt::Error> {
        let mut line = String::new();
        writeln!(line, "{}", self)?;
        Ok(line)
    }

    /// Debug echo line written back by the firmware when enabled
    pub fn echo_line(&self) -> Result<String<ECHO_LINE_LEN>, fmt::Error> {
        let mut line = String::new();
        write!(line, "Moving: {} {}\r\n", self.shoulder, self.elbow)?;
        Ok(line)
    }
}

impl fmt::Display for MoveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", MOVE_MARKER as char, self.shoulder, self.elbow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_host_format() {
        let line = MoveCommand::new(1200, -800).encode().unwrap();
        assert_eq!(line.as_str(), "M,1200,-800\n");
    }

    #[test]
    fn test_encode_extreme_values_fit() {
        let line = MoveCommand::new(i64::MIN, i64::MIN).encode().unwrap();
        assert!(line.starts_with("M,-9223372036854775808,"));
        assert!(line.ends_with('\n'));

        let echo = MoveCommand::new(i64::MIN, i64::MIN).echo_line().unwrap();
        assert!(echo.ends_with("\r\n"));
    }

    #[test]
    fn test_echo_line() {
        let echo = MoveCommand::new(500, -300).echo_line().unwrap();
        assert_eq!(echo.as_str(), "Moving: 500 -300\r\n");
    }

    #[test]
    fn test_default_is_origin() {
        assert_eq!(MoveCommand::default(), MoveCommand::new(0, 0));
    }
}

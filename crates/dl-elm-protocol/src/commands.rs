//! ELM327 AT commands and OBD-II request constants.

/// Full adapter reset.
pub const CMD_RESET: &str = "ATZ";

/// Command echo off.
pub const CMD_ECHO_OFF: &str = "ATE0";

/// Response headers off.
pub const CMD_HEADERS_OFF: &str = "ATH0";

/// Automatic OBD protocol selection.
pub const CMD_PROTOCOL_AUTO: &str = "ATSP0";

/// Initialization sequence, in the order the adapter expects it.
pub const INIT_SEQUENCE: [&str; 4] = [CMD_RESET, CMD_ECHO_OFF, CMD_HEADERS_OFF, CMD_PROTOCOL_AUTO];

/// Mode 09 PID 02 — vehicle identification number.
pub const CMD_READ_VIN: &str = "09 02";

/// Terminator appended to every command.
pub const COMMAND_TERMINATOR: char = '\r';

/// Prompt the adapter prints once a response batch is complete and it is
/// ready for the next command.
pub const PROMPT: char = '>';

/// Trouble-code request modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtcMode {
    /// Mode 03 — stored (confirmed) codes.
    Stored,
    /// Mode 07 — pending codes.
    Pending,
}

impl DtcMode {
    /// Command string sent to the adapter.
    pub fn command(self) -> &'static str {
        match self {
            Self::Stored => "03",
            Self::Pending => "07",
        }
    }

    /// Prefix of a data line answering this mode: the mode number plus 40,
    /// then a space.
    pub fn response_prefix(self) -> &'static str {
        match self {
            Self::Stored => "43 ",
            Self::Pending => "47 ",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Pending => "pending",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_sequence_order() {
        assert_eq!(INIT_SEQUENCE, ["ATZ", "ATE0", "ATH0", "ATSP0"]);
    }

    #[test]
    fn dtc_mode_response_prefixes() {
        assert_eq!(DtcMode::Stored.command(), "03");
        assert_eq!(DtcMode::Stored.response_prefix(), "43 ");
        assert_eq!(DtcMode::Pending.command(), "07");
        assert_eq!(DtcMode::Pending.response_prefix(), "47 ");
    }
}

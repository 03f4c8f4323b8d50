//! Line based commands read from stdin by the binary.

use {
    crate::{arguments::parse_token, domain::SwapDirection},
    alloy::primitives::Address,
    clap::ValueEnum,
};

pub const HELP: &str = "commands: token <n|address>, direction <paired-to-token|token-to-paired>, \
                        flip, amount <value>, refresh, swap, reset, switch, help, quit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Token(Address),
    Direction(SwapDirection),
    Flip,
    Amount(String),
    Refresh,
    Swap,
    Reset,
    Switch,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("{0}")]
    InvalidArgument(String),
}

impl Command {
    /// Parses one line of input. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let command = match name.to_lowercase().as_str() {
            "" => return Ok(None),
            "token" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("token"));
                }
                Self::Token(parse_token(rest).map_err(CommandError::InvalidArgument)?)
            }
            "direction" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("direction"));
                }
                Self::Direction(
                    SwapDirection::from_str(rest, true).map_err(CommandError::InvalidArgument)?,
                )
            }
            "flip" => Self::Flip,
            // An empty amount is allowed, it clears the input.
            "amount" => Self::Amount(rest.to_string()),
            "refresh" => Self::Refresh,
            "swap" => Self::Swap,
            "reset" => Self::Reset,
            "switch" => Self::Switch,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

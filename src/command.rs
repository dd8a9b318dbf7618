//! Command definitions
//!
//! Represents one operation against a settings store.

use crate::backend::Target;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Get,
    Set,
    Add,
    Delete,
    Wipe,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read the `index`-th value of a key
    Get { key: u16, index: usize },

    /// Replace all values of a key
    Set { key: u16, value: Vec<u8> },

    /// Add one more value to a key
    Add { key: u16, value: Vec<u8> },

    /// Delete one or all values of a key
    Delete { key: u16, target: Target },

    /// Remove every setting
    Wipe,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::Add { .. } => CommandType::Add,
            Command::Delete { .. } => CommandType::Delete,
            Command::Wipe => CommandType::Wipe,
        }
    }

    /// Whether the command changes the store
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::Get { .. })
    }
}

/// Result of a successful command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The value read by `Get`
    Value(Vec<u8>),

    /// The store was changed
    Done,
}

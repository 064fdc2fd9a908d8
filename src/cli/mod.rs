//! CLI-specific functionality for the gift redeemer
//!
//! This module contains argument parsing, text input handling and
//! configuration discovery.

pub mod args;
pub mod config;

pub use args::{Args, ExecutionMode, RedeemConfig, ScanConfig, TextInput};
pub use config::ConfigDiscovery;

use std::io::Read;

impl TextInput {
    /// Read the whole input as UTF-8 text
    pub fn read_to_string(&self) -> std::io::Result<String> {
        match self {
            TextInput::File(path) => std::fs::read_to_string(path),
            TextInput::Stdin => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }
}

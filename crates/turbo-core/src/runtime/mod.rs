//! Runtime detection and command execution
//!
//! This module provides:
//! - Node.js detection
//! - Allow-listed execution of template-declared commands

pub mod check;
pub mod command;

pub use check::{check_node, RuntimeInfo};
pub use command::{check_command, exec_command, parse_command_line};

#![deny(clippy::print_stdout)]

pub mod command_line;
pub mod fingerprint;
pub mod graph;

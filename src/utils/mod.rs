//! Shared filesystem, network, and tool-probe helpers.

pub mod fs;
pub mod http;
pub mod tools;

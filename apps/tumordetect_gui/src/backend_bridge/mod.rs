//! Backend worker: owns the tokio runtime and performs all network and disk IO.

pub mod commands;
pub mod runtime;

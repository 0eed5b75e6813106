// src/exec/mod.rs

//! Process-backed actions.

pub mod command;

pub use command::CommandAction;

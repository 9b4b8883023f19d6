// Presentation layer: the interactive session and its text output.

pub mod command;
pub mod render;
pub mod session;

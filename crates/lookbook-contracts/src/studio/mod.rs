mod command_parser;
mod command_registry;

pub use command_parser::{parse_command, ClearTarget, StudioCommand};
pub use command_registry::STUDIO_HELP_COMMANDS;

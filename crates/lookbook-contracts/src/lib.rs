//! Plain data shared by the lookbook engine and CLI: image assets, the style
//! preset catalog, the bounded result gallery, the session event log and the
//! interactive studio command parser.

pub mod assets;
pub mod events;
pub mod gallery;
pub mod presets;
pub mod studio;

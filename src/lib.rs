pub mod config;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod update;
pub mod version;

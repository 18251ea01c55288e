pub mod config;
pub mod contract;
pub mod logging;
pub mod lookup;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod runtime;
pub mod selection;

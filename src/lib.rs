#[cfg(feature = "png")]
pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod engine;
pub mod input;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod words;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, EngineConfig, SizingFunction};
pub use engine::{Engine, EngineError, Rect, Surface};
pub use theme::Theme;
pub use words::{Placement, WordStore};

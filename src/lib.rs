//! Styled force-directed diagrams of attributed graphs.
//!
//! A run imports a graph, prunes weakly connected nodes, derives node sizes,
//! colors and labels from attribute columns, lays the graph out with a force
//! simulation and writes the result as PNG or SVG. On `wasm32` the same pipeline
//! feeds an interactive canvas viewer instead.

pub mod bounds;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod io;
pub mod layout;
pub mod palette;
pub mod pipeline;
pub mod rank;
pub mod style;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod components;
#[cfg(target_arch = "wasm32")]
mod pages;

#[cfg(target_arch = "wasm32")]
pub use app::App;
pub use config::DiagramConfig;
pub use error::{DiagramError, Result};
pub use graph::Graph;

/// Install the `log` backend: `env_logger` at `info` unless `RUST_LOG` says
/// otherwise.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
	let env = env_logger::Env::default().default_filter_or("info");
	let _ = env_logger::Builder::from_env(env).try_init();
}

/// Initialize logging and panic hooks for the WASM target.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
	let _ = console_log::init_with_level(log::Level::Debug);
	console_error_panic_hook::set_once();
	log::info!("Logging initialized");
}

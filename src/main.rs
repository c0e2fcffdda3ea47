//! `force-diagram` binary: the CLI pipeline natively, the viewer on `wasm32`.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
	use std::process::ExitCode;

	use clap::Parser;
	use force_diagram::cli::Cli;
	use force_diagram::{DiagramConfig, pipeline};

	force_diagram::init_logging();
	let cli = match Cli::try_parse() {
		Ok(cli) => cli,
		Err(err) => {
			let _ = err.print();
			// --help and --version print to stdout and are not failures.
			return if err.use_stderr() {
				ExitCode::FAILURE
			} else {
				ExitCode::SUCCESS
			};
		}
	};
	match DiagramConfig::try_from(cli).and_then(|config| pipeline::run(&config)) {
		Ok(_) => ExitCode::SUCCESS,
		Err(err) => {
			log::error!("{err}");
			ExitCode::FAILURE
		}
	}
}

#[cfg(target_arch = "wasm32")]
fn main() {
	force_diagram::init_logging();
	leptos::mount::mount_to_body(force_diagram::App);
}

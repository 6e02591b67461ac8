use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default() | Effects::BOLD)
		.usage(AnsiColor::Green.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Yellow.on_default())
}

/// Builds the log filter from a `service.log_level` directive, falling back to `info`.
pub fn log_filter(directive: &str) -> EnvFilter {
	EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init_tracing(directive: &str) {
	// A second subscriber (tests, embedded use) keeps the first one.
	let _ = tracing_subscriber::fmt().with_env_filter(log_filter(directive)).try_init();
}

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Console + rolling-file logging setup (`spec.md` §6:
/// `logging/<name>.log`). `tracing-appender` rotates by calendar day
/// rather than by byte size, the nearest idiomatic equivalent to the
/// original's size-based rotation; see `DESIGN.md`.
pub struct Config {
	pub directory: PathBuf,
	pub file_name: String,
	pub filters: String,
}

/// Installs the global subscriber. The returned guard must be held for
/// the lifetime of the process — dropping it stops the background
/// flush of the non-blocking file writer.
pub fn init(config: &Config) -> anyhow::Result<WorkerGuard> {
	std::fs::create_dir_all(&config.directory)?;
	let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_name);
	let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

	let env_filter = EnvFilter::try_new(&config.filters).unwrap_or_else(|_| EnvFilter::new("info"));

	let console_layer = tracing_subscriber::fmt::layer().with_target(true);
	let file_layer = tracing_subscriber::fmt::layer()
		.with_writer(non_blocking)
		.with_ansi(false)
		.json();

	tracing_subscriber::registry()
		.with(env_filter)
		.with(console_layer)
		.with(file_layer)
		.try_init()?;

	Ok(guard)
}

mod error;
mod logging;
mod orchestrator;
mod scan;

use std::time::Duration;

use uc_cache::IdentityCache;
use uc_config::{Config, LabelCatalog};
use uc_identity::IdentityEnricher;

use orchestrator::Orchestrator;

const POLL_INTERVAL: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let config = Config::load()?;

	let _guard = logging::init(&logging::Config {
		directory: config.paths.logging_dir(),
		file_name: "unzipping.log".to_string(),
		filters: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
	})?;

	// The scratch unpack area is cleared at startup (`spec.md` §6); any
	// leftover contents from a prior run are stale.
	let archives = config.paths.archives();
	if archives.exists() {
		std::fs::remove_dir_all(&archives)?;
	}
	std::fs::create_dir_all(&archives)?;

	let catalog = LabelCatalog::load(&config.paths.config_workbook())?;
	let cache = IdentityCache::open(&config.paths.cache_db())?;
	let enricher = IdentityEnricher::new(&cache, &config.registry, &config.search)?;
	let orchestrator = Orchestrator {
		catalog: &catalog,
		config: &config,
		enricher: &enricher,
	};

	tracing::info!(input = %config.paths.input.display(), "unzipping started");

	loop {
		let workbooks = match scan::scan_workbooks(&config.paths.input) {
			Ok(paths) => paths,
			Err(err) => {
				tracing::error!(error = %err, "failed to scan input directory");
				tokio::time::sleep(POLL_INTERVAL).await;
				continue;
			}
		};

		for path in workbooks {
			match scan::is_stable(&path, scan::DEFAULT_STABILITY_GATE).await {
				Ok(true) => orchestrator.process(&path).await,
				Ok(false) => tracing::debug!(path = %path.display(), "workbook still being written, skipping"),
				Err(err) => tracing::error!(path = %path.display(), error = %err, "failed to stat workbook"),
			}
		}

		tokio::time::sleep(POLL_INTERVAL).await;
	}
}

//! trajmap - render trajectory scene files to map images

use tracing::{error, info};

use trajmap::job::run;
use trajmap::{init_tracing, log_error, Config};

fn main() -> anyhow::Result<()> {
    let (config, invocation) = Config::load()?;
    init_tracing(&config.log_level);

    info!("Starting trajmap v{}", env!("CARGO_PKG_VERSION"));

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let outcome = run(&config, &invocation).map_err(|e| {
        log_error(&e, "render");
        e
    })?;

    info!(
        layers = outcome.layers,
        map_bytes = outcome.map_bytes,
        colorbar = outcome.colorbar_bytes.is_some(),
        "Render finished: {}",
        invocation.output.display()
    );
    Ok(())
}

//! Grocer command line entry point.

use std::io;

use anyhow::{Context, Result};
use grocer::{
    logging,
    settings::Args,
    shell::{Session, SessionOptions},
    store::JsonStore,
};
use tracing::info;

fn main() -> Result<()> {
    // Help, version and usage errors are printed by clap with the right exit code.
    let settings = Args::load().unwrap_or_else(|err| err.exit()).resolve()?;

    logging::init(&settings.log_level, settings.log_format)?;

    let store = JsonStore::open(&settings.data_dir).with_context(|| {
        format!(
            "failed to open data directory {}",
            settings.data_dir.display()
        )
    })?;

    info!(
        dir = %store.dir().display(),
        currency = settings.currency.iso_alpha_code,
        "starting session"
    );

    let mut session = Session::open(
        &store,
        settings.currency,
        SessionOptions::from(&settings),
        &store,
        &store,
    )?;

    let stdin = io::stdin();
    let stdout = io::stdout();

    session.run(&mut stdin.lock(), &mut stdout.lock())?;

    Ok(())
}

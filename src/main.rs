//! Loads the translation catalog of a workspace and reports what was registered.
//!
//! Usage: `live-translations [WORKSPACE_ROOT] [CULTURE]`

use std::path::PathBuf;
use std::process::ExitCode;

use live_translations::WorkspaceLoader;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let root = args.next().map_or_else(|| PathBuf::from("."), PathBuf::from);
    let culture = args.next();

    let loader = match WorkspaceLoader::from_workspace(&root) {
        Ok(loader) => loader,
        Err(error) => {
            tracing::error!(%error, root = %root.display(), "Failed to load settings");
            return ExitCode::FAILURE;
        }
    };

    let mut catalog = match loader.load_catalog() {
        Ok(catalog) => catalog,
        Err(error) => {
            tracing::error!(%error, root = %root.display(), "Failed to load translations");
            return ExitCode::FAILURE;
        }
    };

    if let Some(culture) = culture
        && let Err(error) = catalog.set_current(&culture)
    {
        tracing::error!(%error, culture = %culture, "Failed to select culture");
        return ExitCode::FAILURE;
    }

    if let Ok(iter) = catalog.iter() {
        for (culture, translations) in iter {
            tracing::info!(culture, keys = translations.count().unwrap_or_default(), "Registered");
        }
    }
    if let Ok(Some(current)) = catalog.current_culture() {
        tracing::info!(current, "Current culture");
    }

    catalog.release();
    ExitCode::SUCCESS
}

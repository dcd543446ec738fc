mod app_logic;
mod core;
mod platform_layer;
mod ui_description_layer;

use crate::app_logic::{InstallationLogic, ui_constants};
use crate::core::{
    AppConfig, CatalogLoaderOperations, CoreCatalogLoader, CoreConfigManager, FileSessionStore,
    SessionStoreOperations, config, path_utils,
};
use crate::platform_layer::{ConsolePlatform, PlatformEventHandler};

use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

const LOG_FILE_NAME: &str = "walkup_gallery.log";

/*
 * Warnings and errors go to stderr so they do not interleave with the screen
 * output on stdout. Everything from debug up is also written to a log file in
 * the local config directory, when that directory can be resolved.
 */
fn initialize_logging() {
    let log_config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .build();
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    match path_utils::get_base_app_config_local_dir(ui_constants::APP_NAME)
        .map(|dir| dir.join(LOG_FILE_NAME))
    {
        Some(log_path) => match File::create(&log_path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, log_config, file)),
            Err(e) => eprintln!("Could not create log file {log_path:?}: {e}"),
        },
        None => eprintln!("Could not resolve a directory for the log file."),
    }

    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Failed to initialize logger: {e}");
    }
}

// The first command-line argument, if any, overrides the catalog path.
fn resolve_config() -> AppConfig {
    let config_manager = CoreConfigManager::new();
    let mut app_config = config::load_or_default(&config_manager, ui_constants::APP_NAME);
    if let Some(catalog_path) = std::env::args().nth(1) {
        app_config.catalog_path = PathBuf::from(catalog_path);
    }
    log::debug!("Main: Effective configuration: {app_config:?}");
    app_config
}

fn session_store_dir(app_config: &AppConfig) -> PathBuf {
    app_config
        .session_store_dir
        .clone()
        .or_else(|| path_utils::get_base_app_data_local_dir(ui_constants::APP_NAME))
        .unwrap_or_else(|| {
            log::warn!("Main: No data directory available, keeping the session store in '.'");
            PathBuf::from(".")
        })
}

fn main() -> ExitCode {
    initialize_logging();
    log::info!("Main: Starting {}.", ui_constants::APP_NAME);

    let app_config = resolve_config();

    let catalog_loader: Arc<dyn CatalogLoaderOperations> =
        Arc::new(CoreCatalogLoader::new(&app_config.catalog_path));
    let session_store: Arc<dyn SessionStoreOperations> =
        Arc::new(FileSessionStore::new(&session_store_dir(&app_config)));

    let logic: Arc<Mutex<dyn PlatformEventHandler>> = Arc::new(Mutex::new(InstallationLogic::new(
        catalog_loader,
        session_store,
        app_config.touch_drag_threshold,
    )));

    let mut platform = ConsolePlatform::new(&app_config.export_dir);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    match platform.run(logic, stdin.lock(), &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Main: Platform loop failed: {e}");
            ExitCode::FAILURE
        }
    }
}

//! Binary entry point
//!
//! Loads configuration, installs the logger, then runs the built-in bundles
//! once: start `watcher` and `greeter`, report what the watcher sees, stop
//! everything.

use crate::app::cli::args::Args;
use crate::app::cli::config::AppConfig;
use crate::builtin::{GreeterActivator, WatcherActivator, WatcherView};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::version;
use crate::framework::api::{FrameworkResult, Registry};

pub const WATCHER_BUNDLE: &str = "watcher";
pub const GREETER_BUNDLE: &str = "greeter";

/// Initialize application startup
pub fn startup() {
    let args = Args::parse_from_env();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let log_file = config
        .logging
        .file
        .as_ref()
        .map(|path| path.to_string_lossy().to_string());
    if let Err(e) = init_logging(
        config.logging.level.as_deref(),
        config.log_format(),
        log_file.as_deref(),
        config.use_color(),
    ) {
        eprintln!("Error: failed to initialise logging: {}", e);
        std::process::exit(1);
    }

    log::info!(
        "bundlekit {} starting (api {}, built {}, commit {})",
        env!("CARGO_PKG_VERSION"),
        version::api_version(),
        version::build_time(),
        version::git_hash()
    );
    log::debug!("Effective configuration: {:#?}", config);

    for line in run(&config) {
        println!("{}", line);
    }
}

fn load_config(args: &Args) -> FrameworkResult<AppConfig> {
    let mut config = AppConfig::load(args.config_file.as_deref())?;
    config.apply_args(args)?;
    Ok(config)
}

/// Run the demonstration and return the report lines
pub fn run(config: &AppConfig) -> Vec<String> {
    let registry = Registry::with_settings(config.framework.clone());
    let view = WatcherView::new();

    registry.start(WATCHER_BUNDLE, Box::new(WatcherActivator::new(view.clone())));
    registry.start(GREETER_BUNDLE, Box::new(GreeterActivator::default()));

    let mut report = Vec::new();
    for bundle in registry.bundles() {
        let headers = bundle.headers();
        report.push(format!(
            "{:<10} {:<8} {}",
            bundle.symbolic_name(),
            bundle.state(),
            headers.values().cloned().collect::<Vec<_>>().join(" | ")
        ));
    }

    match view.greetings("world") {
        Ok(greetings) => report.extend(greetings),
        Err(e) => log_error_with_context(&e, "Reading tracked greeters"),
    }

    registry.stop_all();
    report.extend(view.journal().into_iter().map(|entry| format!("watcher: {}", entry)));
    report
}

use log::LevelFilter;

/// Sets up env_logger for the generator.
///
/// Verbose runs log at debug level, otherwise only warnings and errors are shown
/// so they don't interleave with the progress output. `RUST_LOG` takes precedence.
pub fn init_logger(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .init();
}

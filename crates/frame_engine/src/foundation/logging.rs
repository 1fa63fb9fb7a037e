//! Logging utilities

/// Initialize the logging system with a default filter.
///
/// `RUST_LOG` takes precedence over `default_level` when it is set.
pub fn init_with_level(default_level: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(default_level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Initialize the logging system from the environment only
pub fn init() {
    init_with_level("info");
}

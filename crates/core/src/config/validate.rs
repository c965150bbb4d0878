use super::{
    types::{Config, MAX_WATCH_INTERVAL_SECS},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Link extension is a bare, non-empty extension
/// - Cache file is a single file name
/// - Proxy base URL is http(s)
/// - Watch interval is between 1 second and one year
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    let extension = &config.output.extension;
    if extension.is_empty() {
        return invalid("output.extension cannot be empty");
    }
    if extension.starts_with('.') || extension.contains(['/', '\\']) {
        return invalid("output.extension must be a bare extension like \"strm\"");
    }

    let cache_file = &config.output.cache_file;
    if cache_file.is_empty()
        || cache_file.contains(['/', '\\'])
        || cache_file == "."
        || cache_file == ".."
    {
        return invalid("output.cache_file must be a plain file name");
    }

    let base_url = &config.proxy.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return invalid("proxy.base_url must start with http:// or https://");
    }

    if config.watch.interval_secs == 0 {
        return invalid("watch.interval_secs cannot be 0");
    }
    if config.watch.interval_secs > MAX_WATCH_INTERVAL_SECS {
        return invalid("watch.interval_secs cannot exceed one year");
    }

    Ok(())
}

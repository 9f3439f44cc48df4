use env_logger::{Builder, Env, WriteStyle};
use log::{info, warn};
use std::fs::OpenOptions;
use std::path::Path;

/// Initialize the logging system.
///
/// Defaults to `info` (or `debug` when `verbose`), `RUST_LOG` overrides both.
/// When `log_file` is given, records are appended there instead of stderr.
pub fn initialize_logging(
    log_file: Option<&Path>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if verbose { "debug" } else { "info" };

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    builder
        .format_timestamp_secs()
        .format_module_path(true)
        .write_style(WriteStyle::Auto);

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder
            .write_style(WriteStyle::Never)
            .target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init()?;

    info!("Logging system initialized");
    Ok(())
}

/// Helper function to format sensitive data for logging
pub fn format_sensitive(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Structured log line for a credential resolution stage
pub fn log_credential_event(stage: &str, identifier: &str, success: bool, details: Option<&str>) {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    if success {
        info!(
            "Credential event: stage={}, identifier={}, success=true, timestamp={}, details={:?}",
            stage, identifier, timestamp, details
        );
    } else {
        warn!(
            "Credential event: stage={}, identifier={}, success=false, timestamp={}, details={:?}",
            stage, identifier, timestamp, details
        );
    }
}

/// Structured log line for a notification delivery attempt
pub fn log_delivery_event(path: &Path, recipient: &str, success: bool, details: Option<&str>) {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    if success {
        info!(
            "Delivery: file={}, to={}, success=true, timestamp={}, details={:?}",
            path.display(),
            format_sensitive(recipient),
            timestamp,
            details
        );
    } else {
        warn!(
            "Delivery: file={}, to={}, success=false, timestamp={}, details={:?}",
            path.display(),
            format_sensitive(recipient),
            timestamp,
            details
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sensitive_data_formatting() {
        assert_eq!(format_sensitive("password"), "pa***rd");
        assert_eq!(format_sensitive("key"), "***");
        assert_eq!(format_sensitive("alerts@example.com"), "al***om");
        assert_eq!(format_sensitive(""), "");
        // Multi-byte characters must not split
        assert_eq!(format_sensitive("ünïcødé"), "ün***dé");
    }

    #[test]
    fn test_logging_initialization() {
        let log_file = NamedTempFile::new().unwrap();

        let result = initialize_logging(Some(log_file.path()), false);

        // Another test may have installed the global logger first
        assert!(
            result.is_ok()
                || result
                    .unwrap_err()
                    .to_string()
                    .contains("already initialized")
        );
    }
}

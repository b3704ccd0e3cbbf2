//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use std::path::Path;
use tubely_core::Config;

/// Validate critical configuration values
///
/// Runs the config's own checks, then the ones that depend on the
/// filesystem: the temp directory must exist so staging cannot fail later.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    // Validate CORS configuration in production
    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    let temp_dir = config.temp_dir();
    if !Path::new(&temp_dir).is_dir() {
        return Err(anyhow::anyhow!(
            "TEMP_DIR {} does not exist or is not a directory",
            temp_dir.display()
        ));
    }

    if config.jwt_secret().len() < 32 {
        if config.is_production() {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long in production"
            ));
        }
        tracing::warn!("JWT_SECRET is shorter than 32 characters");
    }

    Ok(())
}

//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.thumbnails.size_precached == 0 {
            return Err(ConfigError::ValidationError(
                "thumbnails.size_precached must be > 0".into(),
            ));
        }
        if self.thumbnails.size_uncached < self.thumbnails.size_precached {
            return Err(ConfigError::ValidationError(
                "thumbnails.size_uncached must be >= thumbnails.size_precached".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnails.jpeg_quality) {
            return Err(ConfigError::ValidationError(
                "thumbnails.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_parallel_workers() {
        let mut config = Config::default();
        config.processing.parallel_workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("parallel_workers"));
    }

    #[test]
    fn test_validate_rejects_uncached_below_precached() {
        let mut config = Config::default();
        config.thumbnails.size_uncached = 1024;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("size_uncached"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_quality() {
        let mut config = Config::default();
        config.thumbnails.jpeg_quality = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jpeg_quality"));

        config.thumbnails.jpeg_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.limits.max_image_dimension = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_image_dimension"));
    }
}

//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_target(config, &mut result);
        Self::validate_pacing(config, &mut result);
        Self::validate_capture(config, &mut result);
        Self::validate_vocabulary(config, &mut result);

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }
        if config.browser.debug_port == 0 {
            result.add_error(ValidationError::new(
                "browser.debug_port",
                "Debug port cannot be 0",
            ));
        }
    }

    fn validate_target(config: &Config, result: &mut ValidationResult) {
        let target = &config.target;

        if target.domain_suffix.trim().is_empty() {
            result.add_error(ValidationError::new(
                "target.domain_suffix",
                "Domain suffix cannot be empty",
            ));
        }

        if target.path_prefix.is_empty() {
            result.add_error(ValidationError::new(
                "target.path_prefix",
                "Path prefix cannot be empty",
            ));
        } else if !target.path_prefix.starts_with('/') {
            result.add_error(ValidationError::new(
                "target.path_prefix",
                "Path prefix must start with '/'",
            ));
        }

        if target.entry_url.trim().is_empty() {
            result.add_error(ValidationError::new(
                "target.entry_url",
                "Entry URL cannot be empty",
            ));
        }

        if target.page_param.trim().is_empty() {
            result.add_error(ValidationError::new(
                "target.page_param",
                "Page parameter cannot be empty",
            ));
        }
    }

    fn validate_pacing(config: &Config, result: &mut ValidationResult) {
        let pacing = &config.pacing;

        if pacing.max_scroll_rounds == 0 {
            result.add_error(ValidationError::new(
                "pacing.max_scroll_rounds",
                "At least one scroll round is required",
            ));
        }

        if pacing.stable_rounds > pacing.max_scroll_rounds {
            result.add_warning(ValidationWarning::new(
                "pacing.stable_rounds",
                "Stable rounds exceed max scroll rounds; convergence will never stop early",
            ));
        }

        if pacing.post_click_ms < 200 {
            result.add_warning(ValidationWarning::new(
                "pacing.post_click_ms",
                "Post-click pacing below 200ms may outrun the page's own handlers",
            ));
        }
    }

    fn validate_capture(config: &Config, result: &mut ValidationResult) {
        let capture = &config.capture;

        if capture.max_logs == 0 {
            result.add_error(ValidationError::new(
                "capture.max_logs",
                "Log cap must be greater than 0",
            ));
        }

        if capture.max_visited_pages == 0 {
            result.add_error(ValidationError::new(
                "capture.max_visited_pages",
                "Visited page cap must be greater than 0",
            ));
        }

        if capture.title_max_chars == 0 {
            result.add_error(ValidationError::new(
                "capture.title_max_chars",
                "Title length must be greater than 0",
            ));
        }
    }

    fn validate_vocabulary(config: &Config, result: &mut ValidationResult) {
        if config.vocabulary.actions.iter().all(|a| a.trim().is_empty()) {
            result.add_error(ValidationError::new(
                "vocabulary.actions",
                "At least one action verb is required",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

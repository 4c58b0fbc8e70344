//! Result type alias for Sluice

use super::errors::SluiceError;

/// Result type alias for Sluice operations
///
/// # Examples
///
/// ```
/// use sluice::domain::result::Result;
/// use sluice::domain::errors::SluiceError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SluiceError::Configuration("missing source.uri".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SluiceError>;

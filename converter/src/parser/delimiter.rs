//! Delimiter auto-detection.

use crate::error::{ConvertError, ConvertResult};
use crate::models::Delimiter;

/// Detect the delimiter of a whole document.
///
/// Any semicolon anywhere selects [`Delimiter::Semicolon`], otherwise any comma
/// selects [`Delimiter::Comma`]. Semicolon wins so that decimal commas inside
/// semicolon-separated data do not flip the result.
///
/// # Example
/// ```
/// use csvjson::{detect_delimiter, Delimiter};
///
/// assert_eq!(detect_delimiter("price;qty\n1,50;2").unwrap(), Delimiter::Semicolon);
/// assert_eq!(detect_delimiter("a,b\n1,2").unwrap(), Delimiter::Comma);
/// assert!(detect_delimiter("just one column").is_err());
/// ```
pub fn detect_delimiter(content: &str) -> ConvertResult<Delimiter> {
    if content.contains(';') {
        Ok(Delimiter::Semicolon)
    } else if content.contains(',') {
        Ok(Delimiter::Comma)
    } else {
        Err(ConvertError::NoDelimiterDetected)
    }
}

//! Error types for format converters

/// Errors during serialization or unserialization
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Input is not well-formed for the format
    #[error("{format} syntax error: {message}")]
    Syntax { format: String, message: String },

    /// Value has no representation in the format
    #[error("{format} cannot represent value: {message}")]
    Unsupported { format: String, message: String },

    /// Input bytes are not valid UTF-8
    #[error("{format} input is not valid UTF-8: {source}")]
    Encoding {
        format: String,
        #[source]
        source: std::str::Utf8Error,
    },
}

impl ConvertError {
    /// Create syntax error for format
    pub fn syntax(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Syntax {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Create unsupported-value error for format
    pub fn unsupported(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unsupported {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Create encoding error for format
    pub fn encoding(format: impl Into<String>, source: std::str::Utf8Error) -> Self {
        Self::Encoding {
            format: format.into(),
            source,
        }
    }
}

/// Result type alias for converter operations
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Decode UTF-8 text, dropping a leading byte order mark
pub(crate) fn utf8<'a>(format: &str, bytes: &'a [u8]) -> ConvertResult<&'a str> {
    let text = std::str::from_utf8(bytes).map_err(|e| ConvertError::encoding(format, e))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display() {
        let err = ConvertError::syntax("json", "unexpected end");
        assert_eq!(err.to_string(), "json syntax error: unexpected end");
    }

    #[test]
    fn bom_is_stripped() {
        let bytes = "\u{feff}{}".as_bytes();
        assert_eq!(utf8("json", bytes).unwrap(), "{}");
        assert!(utf8("json", &[0xff, 0xfe]).is_err());
    }
}

use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The decoded value graph contains something outside the JSON model.
    UnsupportedType,
    /// `ancestor_at_depth` reached the root without finding the depth.
    DepthNotFound,
    /// A snapshot taken on one tree was restored on another.
    CursorMismatch,
    /// A query expression failed to compile.
    QuerySyntax,
    /// A node has no shape to reconstruct a JSON value from.
    UnsupportedContentType,
    /// The value nests deeper than the configured build limit.
    DepthLimitExceeded,
    /// The external JSON decoder rejected the input text.
    Decode,
}

#[derive(Debug, Clone, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn unsupported_type(type_name: impl AsRef<str>) -> Self {
        Self {
            kind: ErrorKind::UnsupportedType,
            message: format!("unsupported value type: {}", type_name.as_ref()),
        }
    }

    pub fn depth_not_found(depth: usize) -> Self {
        Self {
            kind: ErrorKind::DepthNotFound,
            message: format!("no ancestor at depth {depth}"),
        }
    }

    pub fn cursor_mismatch() -> Self {
        Self {
            kind: ErrorKind::CursorMismatch,
            message: "snapshot belongs to a different document".to_string(),
        }
    }

    pub fn query_syntax(expr: &str, reason: impl AsRef<str>) -> Self {
        Self {
            kind: ErrorKind::QuerySyntax,
            message: format!("invalid query `{expr}`: {}", reason.as_ref()),
        }
    }

    pub fn unsupported_content_type() -> Self {
        Self {
            kind: ErrorKind::UnsupportedContentType,
            message: "node has no content type to serialize".to_string(),
        }
    }

    pub fn depth_limit_exceeded(limit: usize) -> Self {
        Self {
            kind: ErrorKind::DepthLimitExceeded,
            message: format!("value nests deeper than {limit} levels"),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Decode,
            message: message.into(),
        }
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_query_syntax_message_names_expression() {
        let err = Error::query_syntax("//a[", "unexpected end of input");
        assert!(err.is(ErrorKind::QuerySyntax));
        assert_eq!(
            err.to_string(),
            "invalid query `//a[`: unexpected end of input"
        );
    }

    #[rstest::rstest]
    fn test_decode_from_serde_json() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind, ErrorKind::Decode);
    }
}

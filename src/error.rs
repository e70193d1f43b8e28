use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("missing element: #{0}")]
    MissingElement(String),
    #[error("dom error: {0}")]
    Dom(String),
    #[error("timer error: {0}")]
    Timer(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("type mismatch for {selector}: expected {expected}, actual {actual}")]
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    #[error(
        "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
    )]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

/// Failures reported by mocked platform capabilities. These never escape
/// the page; callers turn them into fallbacks or error toasts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("clipboard write rejected")]
    ClipboardRejected,
    #[error("copy command failed")]
    CopyCommandFailed,
    #[error("share aborted")]
    ShareAborted,
}

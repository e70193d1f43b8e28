//! Browser capabilities the page consumes but does not own: the async
//! clipboard, the legacy copy command, the share sheet and intersection
//! observation. Support is decided once, when the page is loaded.

use crate::error::PlatformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardSupport {
    Available,
    /// Present, but every write is rejected (permission denied).
    Rejecting,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareSupport {
    Available,
    /// Present, but every share is aborted.
    Failing,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyCopySupport {
    Works,
    Fails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformConfig {
    pub clipboard: ClipboardSupport,
    pub secure_context: bool,
    pub legacy_copy: LegacyCopySupport,
    pub share: ShareSupport,
    pub intersection_observer: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            clipboard: ClipboardSupport::Available,
            secure_context: true,
            legacy_copy: LegacyCopySupport::Works,
            share: ShareSupport::Missing,
            intersection_observer: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Capability<T> {
    Supported(T),
    Unsupported,
}

impl<T> Capability<T> {
    pub(crate) fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }

    fn as_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Supported(inner) => Some(inner),
            Self::Unsupported => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AsyncClipboard {
    rejects: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShareSheet {
    fails: bool,
}

#[derive(Debug)]
pub(crate) struct Platform {
    clipboard: Capability<AsyncClipboard>,
    legacy_copy_works: bool,
    share: Capability<ShareSheet>,
    pub(crate) intersection_observer: Capability<()>,
    clipboard_text: String,
    share_calls: Vec<SharePayload>,
    legacy_copy_attempts: usize,
}

impl Platform {
    pub(crate) fn resolve(config: &PlatformConfig) -> Self {
        // The async clipboard is only exposed to secure contexts.
        let clipboard = match (config.clipboard, config.secure_context) {
            (ClipboardSupport::Missing, _) | (_, false) => Capability::Unsupported,
            (ClipboardSupport::Available, true) => {
                Capability::Supported(AsyncClipboard { rejects: false })
            }
            (ClipboardSupport::Rejecting, true) => {
                Capability::Supported(AsyncClipboard { rejects: true })
            }
        };
        let share = match config.share {
            ShareSupport::Available => Capability::Supported(ShareSheet { fails: false }),
            ShareSupport::Failing => Capability::Supported(ShareSheet { fails: true }),
            ShareSupport::Missing => Capability::Unsupported,
        };
        let intersection_observer = if config.intersection_observer {
            Capability::Supported(())
        } else {
            Capability::Unsupported
        };
        Self {
            clipboard,
            legacy_copy_works: config.legacy_copy == LegacyCopySupport::Works,
            share,
            intersection_observer,
            clipboard_text: String::new(),
            share_calls: Vec::new(),
            legacy_copy_attempts: 0,
        }
    }

    /// `None` when the async clipboard is not exposed to the page.
    pub(crate) fn write_clipboard(&mut self, text: &str) -> Option<Result<(), PlatformError>> {
        let clipboard = self.clipboard.as_mut()?;
        if clipboard.rejects {
            return Some(Err(PlatformError::ClipboardRejected));
        }
        self.clipboard_text = text.to_string();
        Some(Ok(()))
    }

    /// Copies the current selection, as `document.execCommand('copy')` does.
    pub(crate) fn exec_copy(&mut self, selection: &str) -> Result<(), PlatformError> {
        self.legacy_copy_attempts += 1;
        if !self.legacy_copy_works {
            return Err(PlatformError::CopyCommandFailed);
        }
        self.clipboard_text = selection.to_string();
        Ok(())
    }

    /// `None` when the share sheet is not exposed to the page.
    pub(crate) fn share(&mut self, payload: SharePayload) -> Option<Result<(), PlatformError>> {
        let sheet = self.share.as_mut()?;
        let fails = sheet.fails;
        self.share_calls.push(payload);
        if fails {
            Some(Err(PlatformError::ShareAborted))
        } else {
            Some(Ok(()))
        }
    }

    pub(crate) fn clipboard_text(&self) -> &str {
        &self.clipboard_text
    }

    pub(crate) fn set_clipboard_text(&mut self, text: &str) {
        self.clipboard_text = text.to_string();
    }

    pub(crate) fn take_share_calls(&mut self) -> Vec<SharePayload> {
        std::mem::take(&mut self.share_calls)
    }

    pub(crate) fn legacy_copy_attempts(&self) -> usize {
        self.legacy_copy_attempts
    }
}

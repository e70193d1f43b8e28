//! Interaction layer of a search results page, driven against a
//! deterministic in-memory page: submit feedback, toasts, clipboard and
//! share helpers, scroll reveal and keyboard shortcuts.
//!
//! ```no_run
//! use search_page_ui::{Page, Result};
//!
//! fn run() -> Result<()> {
//!     let mut page = Page::from_html(
//!         "<form><input id='pwd' name='q'><button id='btn1'>Search</button></form>",
//!     )?;
//!     page.type_text("#pwd", "rust")?;
//!     page.click("#btn1")?;
//!     assert!(page.is_disabled("#btn1")?);
//!     Ok(())
//! }
//! ```

mod clipboard;
mod config;
mod debounce;
mod dom;
mod error;
mod html;
mod page;
mod platform;
mod reveal;
mod scheduler;
mod selector;
mod shortcuts;
mod submit;
mod toast;

pub use config::{ElementIds, PageConfig, RevealOptions, Timings};
pub use debounce::{DebounceId, DebouncedFn};
pub use error::{Error, PlatformError, Result};
pub use page::{FormSubmission, KeyStroke, Page, ScrollBlock, ScrollRequest};
pub use platform::{
    ClipboardSupport, LegacyCopySupport, PlatformConfig, SharePayload, ShareSupport,
};
pub use scheduler::PendingTimer;
pub use toast::{ToastId, ToastKind, ToastPhase};

#[cfg(test)]
mod tests;

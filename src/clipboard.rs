//! Copy-to-clipboard and share-sheet helpers. Both always end in user
//! feedback: a toast, or the share sheet itself.

use crate::dom::NodeId;
use crate::error::{PlatformError, Result};
use crate::page::Page;
use crate::platform::SharePayload;
use crate::toast::ToastKind;

pub(crate) const COPY_SUCCESS_MESSAGE: &str = "Link copied to clipboard!";
pub(crate) const COPY_FAILURE_MESSAGE: &str = "Failed to copy link";

impl Page {
    /// Copies `link`, preferring the async clipboard and falling back to the
    /// legacy copy command through an off-screen textarea.
    pub fn copy_link(&mut self, link: &str) -> Result<()> {
        match self.platform.write_clipboard(link) {
            Some(Ok(())) => {
                self.show_toast(COPY_SUCCESS_MESSAGE, ToastKind::Success)?;
                Ok(())
            }
            Some(Err(err)) => {
                log::debug!("async clipboard failed ({err}), using fallback copy");
                self.fallback_copy_text(link)
            }
            None => self.fallback_copy_text(link),
        }
    }

    fn fallback_copy_text(&mut self, text: &str) -> Result<()> {
        let textarea = self.dom.create_detached_element("textarea");
        self.dom.set_value(textarea, text)?;
        self.dom.style_set(textarea, "position", "fixed")?;
        self.dom.style_set(textarea, "left", "-999999px")?;
        self.dom.style_set(textarea, "top", "-999999px")?;
        let host = self.dom.body().unwrap_or(self.dom.root);
        self.dom.append_child(host, textarea)?;

        let outcome = self.copy_from_textarea(textarea);

        // The helper never outlives the copy attempt.
        if self.active_element == Some(textarea) {
            self.blur_node(textarea)?;
        }
        if self.selection.is_some_and(|(node, _, _)| node == textarea) {
            self.selection = None;
        }
        self.dom.remove_node(textarea)?;

        let (message, kind) = match outcome? {
            Ok(()) => (COPY_SUCCESS_MESSAGE, ToastKind::Success),
            Err(err) => {
                log::warn!("fallback copy failed: {err}");
                (COPY_FAILURE_MESSAGE, ToastKind::Error)
            }
        };
        self.show_toast(message, kind)?;
        Ok(())
    }

    fn copy_from_textarea(
        &mut self,
        textarea: NodeId,
    ) -> Result<std::result::Result<(), PlatformError>> {
        self.focus_node(textarea)?;
        self.select_all(textarea)?;
        let selected = self.selected_text();
        Ok(self.platform.exec_copy(&selected))
    }

    /// Opens the share sheet for a result, or copies the link when sharing
    /// is unavailable or fails.
    pub fn share_result(&mut self, title: &str, link: &str) -> Result<()> {
        let payload = SharePayload {
            title: format!("{title} - Wikipedia"),
            text: format!("Check out this Wikipedia article: {title}"),
            url: link.to_string(),
        };
        match self.platform.share(payload) {
            Some(Ok(())) => Ok(()),
            Some(Err(err)) => {
                log::debug!("share failed ({err}), copying link instead");
                self.copy_link(link)
            }
            None => self.copy_link(link),
        }
    }
}

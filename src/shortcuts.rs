//! Document keyboard shortcuts for the search input.

use crate::dom::NodeId;
use crate::error::Result;
use crate::page::{EventKind, EventState, Listener, Page};

impl Page {
    pub(crate) fn install_shortcuts(&mut self) {
        let input = self.dom.by_id(&self.config.ids.input);
        if input.is_none() {
            log::debug!("no search input, shortcuts only swallow Ctrl/Cmd+K");
        }
        let root = self.dom.root;
        self.listeners
            .add(root, EventKind::KeyDown, Listener::Shortcuts { input });
    }

    /// Ctrl/Cmd+K focuses the search input and selects its text; Escape
    /// inside the input clears and blurs it.
    pub(crate) fn on_shortcut_keydown(
        &mut self,
        input: Option<NodeId>,
        event: &mut EventState,
    ) -> Result<()> {
        let Some(key) = event.key.clone() else {
            return Ok(());
        };

        if (key.ctrl || key.meta) && key.key == "k" {
            event.prevent_default();
            if let Some(input) = input {
                self.focus_node(input)?;
                self.select_all(input)?;
            }
            return Ok(());
        }

        if key.key == "Escape" {
            if let Some(input) = input.filter(|input| self.active_element == Some(*input)) {
                self.dom.set_value(input, "")?;
                self.blur_node(input)?;
            }
        }
        Ok(())
    }
}

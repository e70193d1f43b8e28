//! The search trigger and its query input.
//!
//! An empty query shakes the input and keeps the page where it is. A
//! non-empty one puts the trigger into its busy state, reveals the loading
//! region and lets the default action (form submission) proceed.

use crate::config::PageConfig;
use crate::dom::{Dom, NodeId};
use crate::error::{Error, Result};
use crate::page::{EventKind, EventState, Listener, Page, ScrollBlock};
use crate::scheduler::TimerAction;

pub(crate) const SPINNER_HTML: &str =
    "<i class=\"fas fa-spinner fa-spin me-2\"></i><strong>Searching...</strong>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SubmitHandles {
    pub(crate) trigger: NodeId,
    pub(crate) input: NodeId,
    pub(crate) loading_region: Option<NodeId>,
    pub(crate) empty_region: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubmitController {
    pub(crate) handles: SubmitHandles,
    /// Trigger markup from before the busy state, restored on unload.
    idle_label: Option<String>,
}

/// Whitespace and line terminators as a browser's `String.prototype.trim`
/// sees them. Unlike `char::is_whitespace` this includes U+FEFF and
/// excludes U+0085.
fn is_query_space(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n'
            | '\u{000B}'
            | '\u{000C}'
            | '\r'
            | ' '
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn trim_query(raw: &str) -> &str {
    raw.trim_matches(is_query_space)
}

impl SubmitController {
    pub(crate) fn locate(dom: &Dom, config: &PageConfig) -> Result<Self> {
        let ids = &config.ids;
        let trigger = dom
            .by_id(&ids.trigger)
            .ok_or_else(|| Error::MissingElement(ids.trigger.clone()))?;
        let input = dom
            .by_id(&ids.input)
            .ok_or_else(|| Error::MissingElement(ids.input.clone()))?;
        Ok(Self {
            handles: SubmitHandles {
                trigger,
                input,
                loading_region: dom.by_id(&ids.loading_region),
                empty_region: dom.by_id(&ids.empty_region),
            },
            idle_label: None,
        })
    }
}

impl Page {
    pub(crate) fn install_submit_controller(&mut self) {
        let controller = match SubmitController::locate(&self.dom, &self.config) {
            Ok(controller) => controller,
            Err(err) => {
                log::warn!("search controls not bound: {err}");
                return;
            }
        };
        let SubmitHandles { trigger, input, .. } = controller.handles;
        let root = self.dom.root;
        self.listeners
            .add(trigger, EventKind::Click, Listener::SubmitClick);
        self.listeners.add(input, EventKind::Input, Listener::QueryInput);
        self.listeners
            .add(input, EventKind::KeyPress, Listener::EnterActivatesTrigger);
        self.listeners
            .add(input, EventKind::Focus, Listener::FocusContainer);
        self.listeners.add(input, EventKind::Blur, Listener::BlurContainer);
        self.listeners
            .add(root, EventKind::BeforeUnload, Listener::ResetBusyState);
        self.submit = Some(controller);
    }

    fn submit_handles(&self) -> Option<SubmitHandles> {
        self.submit.as_ref().map(|controller| controller.handles)
    }

    pub(crate) fn on_trigger_click(&mut self, event: &mut EventState) -> Result<()> {
        let Some(handles) = self.submit_handles() else {
            return Ok(());
        };
        let raw = self.dom.value(handles.input)?;
        let query = trim_query(&raw);
        log::debug!("search trigger clicked, query={query:?}");

        if query.is_empty() {
            log::debug!("empty query, blocking submission");
            self.dom.class_add(handles.input, "error-shake")?;
            self.focus_node(handles.input)?;
            let delay = self.config.timings.invalid_indicator_ms;
            self.schedule(delay, TimerAction::ClearInvalidIndicator(handles.input));
            event.prevent_default();
            return Ok(());
        }

        if let Some(region) = handles.loading_region {
            if self.dom.style_get(region, "display")? == "none" {
                log::debug!("revealing loading region");
                self.dom.style_set(region, "display", "block")?;
                self.dom.style_set(region, "opacity", "0")?;
                let delay = self.config.timings.loading_fade_ms;
                self.schedule(delay, TimerAction::FadeInLoading(region));
            }
        }

        if let Some(region) = handles.empty_region {
            if self.dom.style_get(region, "display")? == "block" {
                self.dom.style_set(region, "display", "none")?;
            }
        }

        self.enter_busy_state(handles.trigger)?;

        if let Some(region) = handles.loading_region {
            let delay = self.config.timings.scroll_delay_ms;
            self.schedule(
                delay,
                TimerAction::ScrollIntoView {
                    target: region,
                    block: ScrollBlock::Center,
                },
            );
        }
        Ok(())
    }

    fn enter_busy_state(&mut self, trigger: NodeId) -> Result<()> {
        let label = self.dom.inner_html(trigger)?;
        if let Some(controller) = self.submit.as_mut() {
            controller.idle_label.get_or_insert(label);
        }
        self.dom.class_add(trigger, "loading")?;
        self.dom.set_disabled(trigger, true)?;
        self.dom.set_inner_html(trigger, SPINNER_HTML)
    }

    pub(crate) fn clear_invalid_indicator(&mut self, input: NodeId) -> Result<()> {
        self.dom.class_remove(input, "error-shake")
    }

    pub(crate) fn on_query_input(&mut self) -> Result<()> {
        let Some(handles) = self.submit_handles() else {
            return Ok(());
        };
        self.dom.class_remove(handles.input, "error-shake")?;
        let has_content = !trim_query(&self.dom.value(handles.input)?).is_empty();
        self.dom.class_toggle(handles.input, "has-content", has_content)
    }

    pub(crate) fn on_query_keypress(&mut self, event: &mut EventState) -> Result<()> {
        let Some(handles) = self.submit_handles() else {
            return Ok(());
        };
        if event.key.as_ref().is_none_or(|key| key.key != "Enter") {
            return Ok(());
        }
        event.prevent_default();
        self.click_node(handles.trigger)
    }

    pub(crate) fn on_query_focus_change(&mut self, focused: bool) -> Result<()> {
        let Some(handles) = self.submit_handles() else {
            return Ok(());
        };
        let Some(container) = self.dom.parent_element(handles.input) else {
            return Ok(());
        };
        self.dom.class_toggle(container, "input-focused", focused)
    }

    pub(crate) fn on_before_unload(&mut self) -> Result<()> {
        let Some(handles) = self.submit_handles() else {
            return Ok(());
        };
        self.dom.class_remove(handles.trigger, "loading")?;
        self.dom.set_disabled(handles.trigger, false)?;
        let label = self
            .submit
            .as_mut()
            .and_then(|controller| controller.idle_label.take());
        if let Some(label) = label {
            self.dom.set_inner_html(handles.trigger, &label)?;
        }
        Ok(())
    }
}

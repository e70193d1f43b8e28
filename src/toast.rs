//! Transient notifications appended to the end of `<body>`.
//!
//! Each toast walks `Created -> Shown -> Hiding -> Removed` driven by a
//! single pending timer. Dismissing a toast cancels that timer and removes
//! the node at once.

use std::collections::{BTreeMap, VecDeque};

use crate::dom::NodeId;
use crate::error::Result;
use crate::page::Page;
use crate::scheduler::TimerAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
    Warning,
}

impl ToastKind {
    pub fn class_suffix(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Info => "fa-info-circle",
            Self::Success => "fa-check-circle",
            Self::Error => "fa-exclamation-circle",
            Self::Warning => "fa-exclamation-triangle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Created,
    Shown,
    Hiding,
    Removed,
}

#[derive(Debug, Clone)]
struct LiveToast {
    node: NodeId,
    phase: ToastPhase,
    timer_id: i64,
}

#[derive(Debug, Default)]
pub(crate) struct ToastManager {
    next_id: u64,
    live: BTreeMap<ToastId, LiveToast>,
    /// Creation order of live toasts, oldest first.
    order: VecDeque<ToastId>,
}

impl ToastManager {
    fn allocate(&mut self) -> ToastId {
        self.next_id += 1;
        ToastId(self.next_id)
    }

    fn forget(&mut self, id: ToastId) -> Option<LiveToast> {
        self.order.retain(|live| *live != id);
        self.live.remove(&id)
    }

    /// Forgets every live toast and hands back their nodes.
    pub(crate) fn drain(&mut self) -> Vec<NodeId> {
        self.order.clear();
        std::mem::take(&mut self.live)
            .into_values()
            .map(|toast| toast.node)
            .collect()
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl Page {
    /// Shows a transient message and returns a handle for [`Page::dismiss_toast`].
    pub fn show_toast(&mut self, message: &str, kind: ToastKind) -> Result<ToastId> {
        if let Some(cap) = self.config.max_toasts {
            while self.toasts.live_count() >= cap {
                let Some(oldest) = self.toasts.order.front().copied() else {
                    break;
                };
                self.dismiss_toast(oldest)?;
            }
        }

        let node = self.build_toast_node(message, kind)?;
        let host = self.dom.body().unwrap_or(self.dom.root);
        self.dom.append_child(host, node)?;

        let id = self.toasts.allocate();
        let show_ms = self.config.timings.toast_show_ms;
        let timer_id = self.schedule(show_ms, TimerAction::ToastTick(id));
        self.toasts.live.insert(
            id,
            LiveToast {
                node,
                phase: ToastPhase::Created,
                timer_id,
            },
        );
        self.toasts.order.push_back(id);
        log::debug!("toast {id:?} ({}) created: {message}", kind.class_suffix());
        Ok(id)
    }

    fn build_toast_node(&mut self, message: &str, kind: ToastKind) -> Result<NodeId> {
        let toast = self.dom.create_detached_element("div");
        self.dom.set_attr(
            toast,
            "class",
            &format!("toast-notification toast-{}", kind.class_suffix()),
        )?;

        let content = self.dom.create_detached_element("div");
        self.dom.set_attr(content, "class", "toast-content")?;
        self.dom.append_child(toast, content)?;

        let icon = self.dom.create_detached_element("i");
        self.dom
            .set_attr(icon, "class", &format!("fas {} me-2", kind.icon()))?;
        self.dom.append_child(content, icon)?;

        let span = self.dom.create_detached_element("span");
        self.dom.append_text(span, message)?;
        self.dom.append_child(content, span)?;
        Ok(toast)
    }

    /// Removes a toast immediately. Returns `false` for unknown or already
    /// removed toasts.
    pub fn dismiss_toast(&mut self, id: ToastId) -> Result<bool> {
        let Some(toast) = self.toasts.forget(id) else {
            return Ok(false);
        };
        self.cancel_timer(toast.timer_id);
        if self.dom.is_connected(toast.node) {
            self.dom.remove_node(toast.node)?;
        }
        log::debug!("toast {id:?} dismissed in phase {:?}", toast.phase);
        Ok(true)
    }

    pub fn toast_phase(&self, id: ToastId) -> ToastPhase {
        self.toasts
            .live
            .get(&id)
            .map(|toast| toast.phase)
            .unwrap_or(ToastPhase::Removed)
    }

    pub fn live_toasts(&self) -> Vec<ToastId> {
        self.toasts.order.iter().copied().collect()
    }

    pub(crate) fn advance_toast(&mut self, id: ToastId) -> Result<()> {
        let Some(toast) = self.toasts.live.get(&id).cloned() else {
            return Ok(());
        };
        let timings = self.config.timings;
        let next = match toast.phase {
            ToastPhase::Created => {
                self.dom.class_add(toast.node, "show")?;
                let visible_for = timings.toast_visible_ms - timings.toast_show_ms;
                Some((ToastPhase::Shown, visible_for))
            }
            ToastPhase::Shown => {
                self.dom.class_remove(toast.node, "show")?;
                Some((ToastPhase::Hiding, timings.toast_exit_ms))
            }
            ToastPhase::Hiding | ToastPhase::Removed => None,
        };

        match next {
            Some((phase, delay)) => {
                let timer_id = self.schedule(delay, TimerAction::ToastTick(id));
                if let Some(live) = self.toasts.live.get_mut(&id) {
                    live.phase = phase;
                    live.timer_id = timer_id;
                }
            }
            None => {
                self.toasts.forget(id);
                // The node may have been detached by other page code.
                if self.dom.is_connected(toast.node) {
                    self.dom.remove_node(toast.node)?;
                }
            }
        }
        Ok(())
    }
}

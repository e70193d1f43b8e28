use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::page::Page;
use crate::scheduler::TimerAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceId(pub(crate) u64);

pub type DebouncedFn = Box<dyn FnMut(&mut Page, &str) -> Result<()>>;

struct DebounceSlot {
    wait_ms: i64,
    callback: Option<DebouncedFn>,
    pending_timer: Option<i64>,
    pending_arg: Option<String>,
}

#[derive(Default)]
pub(crate) struct DebounceRegistry {
    next_id: u64,
    slots: HashMap<DebounceId, DebounceSlot>,
}

impl DebounceRegistry {
    pub(crate) fn disarm_all(&mut self) {
        for slot in self.slots.values_mut() {
            slot.pending_timer = None;
            slot.pending_arg = None;
        }
    }
}

impl fmt::Debug for DebounceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebounceRegistry")
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl Page {
    /// Wraps `callback` so that bursts of [`Page::call_debounced`] collapse
    /// into one invocation `wait_ms` after the last call.
    pub fn register_debounce<F>(&mut self, wait_ms: i64, callback: F) -> Result<DebounceId>
    where
        F: FnMut(&mut Page, &str) -> Result<()> + 'static,
    {
        if wait_ms < 0 {
            return Err(Error::Config("debounce wait must be non-negative".into()));
        }
        self.debouncers.next_id += 1;
        let id = DebounceId(self.debouncers.next_id);
        self.debouncers.slots.insert(
            id,
            DebounceSlot {
                wait_ms,
                callback: Some(Box::new(callback)),
                pending_timer: None,
                pending_arg: None,
            },
        );
        Ok(id)
    }

    pub fn call_debounced(&mut self, id: DebounceId, arg: &str) -> Result<()> {
        let (wait_ms, previous) = {
            let slot = self.debounce_slot(id)?;
            (slot.wait_ms, slot.pending_timer.take())
        };
        if let Some(timer_id) = previous {
            self.cancel_timer(timer_id);
        }
        let timer_id = self.schedule(wait_ms, TimerAction::Debounce(id));
        let slot = self.debounce_slot(id)?;
        slot.pending_timer = Some(timer_id);
        slot.pending_arg = Some(arg.to_string());
        Ok(())
    }

    /// Drops the pending call, if any. Returns whether one was dropped.
    pub fn cancel_debounce(&mut self, id: DebounceId) -> Result<bool> {
        let slot = self.debounce_slot(id)?;
        slot.pending_arg = None;
        let Some(timer_id) = slot.pending_timer.take() else {
            return Ok(false);
        };
        Ok(self.cancel_timer(timer_id))
    }

    fn debounce_slot(&mut self, id: DebounceId) -> Result<&mut DebounceSlot> {
        self.debouncers
            .slots
            .get_mut(&id)
            .ok_or_else(|| Error::Config(format!("unknown debounce handle {}", id.0)))
    }

    pub(crate) fn fire_debounce(&mut self, id: DebounceId) -> Result<()> {
        let (mut callback, arg) = {
            let Some(slot) = self.debouncers.slots.get_mut(&id) else {
                return Ok(());
            };
            slot.pending_timer = None;
            let Some(arg) = slot.pending_arg.take() else {
                return Ok(());
            };
            let Some(callback) = slot.callback.take() else {
                return Ok(());
            };
            (callback, arg)
        };
        // The callback is taken out while it runs so it can borrow the page.
        let outcome = callback(self, &arg);
        if let Some(slot) = self.debouncers.slots.get_mut(&id) {
            slot.callback = Some(callback);
        }
        outcome
    }
}

use crate::debounce::DebounceId;
use crate::dom::NodeId;
use crate::error::{Error, Result};
use crate::page::ScrollBlock;
use crate::toast::ToastId;

/// Deferred work. Each variant is one step of a behaviour that the page
/// resumes when the clock reaches `due_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TimerAction {
    ClearInvalidIndicator(NodeId),
    FadeInLoading(NodeId),
    ScrollIntoView { target: NodeId, block: ScrollBlock },
    ToastTick(ToastId),
    Debounce(DebounceId),
}

impl TimerAction {
    fn label(&self) -> &'static str {
        match self {
            Self::ClearInvalidIndicator(_) => "clear-invalid",
            Self::FadeInLoading(_) => "fade-in-loading",
            Self::ScrollIntoView { .. } => "scroll-into-view",
            Self::ToastTick(_) => "toast",
            Self::Debounce(_) => "debounce",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    order: i64,
    pub(crate) action: TimerAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
    pub label: &'static str,
}

#[derive(Debug)]
pub(crate) struct Scheduler {
    task_queue: Vec<ScheduledTask>,
    now_ms: i64,
    step_limit: usize,
    next_timer_id: i64,
    next_task_order: i64,
}

impl Scheduler {
    pub(crate) fn new(step_limit: usize) -> Self {
        Self {
            task_queue: Vec::new(),
            now_ms: 0,
            step_limit,
            next_timer_id: 1,
            next_task_order: 0,
        }
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub(crate) fn set_now_ms(&mut self, now_ms: i64) {
        self.now_ms = now_ms;
    }

    pub(crate) fn step_limit(&self) -> usize {
        self.step_limit
    }

    pub(crate) fn set_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::Timer(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.step_limit = max_steps;
        Ok(())
    }

    pub(crate) fn schedule(&mut self, delay_ms: i64, action: TimerAction) -> (i64, i64) {
        let delay_ms = delay_ms.max(0);
        let due_at = self.now_ms.saturating_add(delay_ms);
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            action,
        });
        (id, due_at)
    }

    pub(crate) fn clear(&mut self, id: i64) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != id);
        before != self.task_queue.len()
    }

    pub(crate) fn clear_all(&mut self) -> usize {
        let cleared = self.task_queue.len();
        self.task_queue.clear();
        cleared
    }

    pub(crate) fn len(&self) -> usize {
        self.task_queue.len()
    }

    pub(crate) fn pending(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                label: task.action.label(),
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    /// Removes and returns the earliest task due at or before `due_limit`
    /// (any task when `None`). Ties run in scheduling order.
    pub(crate) fn pop_next(&mut self, due_limit: Option<i64>) -> Option<ScheduledTask> {
        let idx = self.next_task_index(due_limit)?;
        Some(self.task_queue.remove(idx))
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    pub(crate) fn step_limit_error(&self, steps: usize, due_limit: Option<i64>) -> Error {
        let due_limit_desc = due_limit
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());
        let next_task_desc = self
            .next_task_index(due_limit)
            .and_then(|idx| self.task_queue.get(idx))
            .map(|task| {
                format!(
                    "id={},due_at={},order={},action={}",
                    task.id,
                    task.due_at,
                    task.order,
                    task.action.label()
                )
            })
            .unwrap_or_else(|| "none".into());

        Error::Timer(format!(
            "timer queue exceeded max task steps: limit={}, steps={steps}, now_ms={}, due_limit={}, pending_tasks={}, next_task={}",
            self.step_limit,
            self.now_ms,
            due_limit_desc,
            self.task_queue.len(),
            next_task_desc
        ))
    }
}

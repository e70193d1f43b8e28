use std::collections::{HashMap, VecDeque};

use crate::config::PageConfig;
use crate::debounce::DebounceRegistry;
use crate::dom::{Dom, NodeId, truncate_chars};
use crate::error::{Error, Result};
use crate::html::{ParseOutput, parse_html};
use crate::platform::{Platform, SharePayload};
use crate::reveal::{FadeInObserver, LayoutBox};
use crate::scheduler::{PendingTimer, ScheduledTask, Scheduler, TimerAction};
use crate::submit::SubmitController;
use crate::toast::ToastManager;

const STYLESHEET: &str = include_str!("styles.css");
pub(crate) const STYLESHEET_ID: &str = "search-page-ui-styles";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EventKind {
    Click,
    Input,
    KeyDown,
    KeyPress,
    Focus,
    Blur,
    BeforeUnload,
    Scroll,
}

impl EventKind {
    fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Input => "input",
            Self::KeyDown => "keydown",
            Self::KeyPress => "keypress",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::BeforeUnload => "beforeunload",
            Self::Scroll => "scroll",
        }
    }

    fn bubbles(self) -> bool {
        !matches!(self, Self::Focus | Self::Blur | Self::BeforeUnload)
    }
}

/// A key event as delivered to keydown/keypress listeners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStroke {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyStroke {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Keys that produce a legacy `keypress` event.
    fn produces_keypress(&self) -> bool {
        if self.ctrl || self.meta || self.alt {
            return false;
        }
        self.key == "Enter" || self.key.chars().count() == 1
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) kind: EventKind,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) key: Option<KeyStroke>,
    pub(crate) default_prevented: bool,
}

impl EventState {
    fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            key: None,
            default_prevented: false,
        }
    }

    pub(crate) fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Behaviours a component can attach to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Listener {
    SubmitClick,
    QueryInput,
    EnterActivatesTrigger,
    FocusContainer,
    BlurContainer,
    ResetBusyState,
    /// Document-level shortcuts bound to the search input found at load.
    Shortcuts { input: Option<NodeId> },
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<EventKind, Vec<Listener>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: EventKind, listener: Listener) {
        self.map
            .entry(node_id)
            .or_default()
            .entry(event)
            .or_default()
            .push(listener);
    }

    fn get(&self, node_id: NodeId, event: EventKind) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(&event))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn count(&self) -> usize {
        self.map
            .values()
            .flat_map(|events| events.values())
            .map(Vec::len)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: String,
    pub block: ScrollBlock,
    pub smooth: bool,
    /// Scroll offset after the request, unchanged when the target has no layout.
    pub scroll_y: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub form: String,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Viewport {
    pub(crate) scroll_y: i64,
    pub(crate) height: i64,
}

#[derive(Debug)]
struct TraceState {
    enabled: bool,
    events: bool,
    timers: bool,
    logs: VecDeque<String>,
    log_limit: usize,
    to_log: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            timers: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            to_log: true,
        }
    }
}

/// A loaded search results page with its interaction layer installed.
///
/// The page owns a DOM built from markup, a fake clock, and the mocked
/// platform capabilities. Nothing happens between calls: time moves only
/// through [`Page::advance_time`] and friends.
#[derive(Debug)]
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) scheduler: Scheduler,
    pub(crate) platform: Platform,
    pub(crate) config: PageConfig,
    pub(crate) active_element: Option<NodeId>,
    pub(crate) selection: Option<(NodeId, usize, usize)>,
    pub(crate) viewport: Viewport,
    pub(crate) layout: HashMap<NodeId, LayoutBox>,
    pub(crate) submit: Option<SubmitController>,
    pub(crate) toasts: ToastManager,
    pub(crate) reveal: Option<FadeInObserver>,
    pub(crate) debouncers: DebounceRegistry,
    scroll_requests: Vec<ScrollRequest>,
    form_submissions: Vec<FormSubmission>,
    trace: TraceState,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_config(html, PageConfig::default())
    }

    pub fn from_html_with_config(html: &str, config: PageConfig) -> Result<Self> {
        config.validate()?;
        let ParseOutput { dom } = parse_html(html)?;
        let mut page = Self {
            dom,
            listeners: ListenerStore::default(),
            scheduler: Scheduler::new(config.timer_step_limit),
            platform: Platform::resolve(&config.platform),
            viewport: Viewport {
                scroll_y: 0,
                height: config.viewport_height,
            },
            config,
            active_element: None,
            selection: None,
            layout: HashMap::new(),
            submit: None,
            toasts: ToastManager::default(),
            reveal: None,
            debouncers: DebounceRegistry::default(),
            scroll_requests: Vec::new(),
            form_submissions: Vec::new(),
            trace: TraceState::default(),
        };
        page.install()?;
        Ok(page)
    }

    fn install(&mut self) -> Result<()> {
        if self.config.inject_styles {
            self.inject_styles()?;
        }
        self.install_submit_controller();
        self.install_shortcuts();
        self.install_fade_in_observer()?;
        log::info!(
            "search page interactions initialised: submit={} reveal={} shortcuts=Ctrl+K (focus search), Escape (clear)",
            self.submit.is_some(),
            self.reveal.is_some()
        );
        Ok(())
    }

    fn inject_styles(&mut self) -> Result<()> {
        if self.dom.by_id(STYLESHEET_ID).is_some() {
            return Ok(());
        }
        let host = self.dom.head().unwrap_or(self.dom.root);
        let style = self.dom.create_detached_element("style");
        self.dom.set_attr(style, "id", STYLESHEET_ID)?;
        self.dom.append_text(style, STYLESHEET)?;
        self.dom.append_child(host, style)
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace.logs.drain(..).collect()
    }

    /// Mirror trace lines to `log::trace!` in addition to the in-memory log.
    pub fn set_trace_log_output(&mut self, enabled: bool) {
        self.trace.to_log = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace.events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace.timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Config(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace.log_limit = max_entries;
        while self.trace.logs.len() > self.trace.log_limit {
            self.trace.logs.pop_front();
        }
        Ok(())
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        self.scheduler.set_step_limit(max_steps)
    }

    // User actions.

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.click_node(target)
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_string();
        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }
        self.dom.set_value(target, text)?;
        self.dispatch_event(target, EventKind::Input)?;
        Ok(())
    }

    /// Presses a key with `selector` as the event target: keydown, then
    /// keypress for keys that produce one.
    pub fn press_key(&mut self, selector: &str, key: KeyStroke) -> Result<()> {
        let target = self.select_one(selector)?;
        self.press_key_on(target, key)
    }

    /// Presses a key on whatever currently has focus (the document when
    /// nothing does).
    pub fn key_down(&mut self, key: KeyStroke) -> Result<()> {
        let target = self.active_element.unwrap_or(self.dom.root);
        self.press_key_on(target, key)
    }

    fn press_key_on(&mut self, target: NodeId, key: KeyStroke) -> Result<()> {
        let keydown = self.dispatch_key_event(target, EventKind::KeyDown, &key)?;
        if keydown.default_prevented || !key.produces_keypress() {
            return Ok(());
        }
        let keypress = self.dispatch_key_event(target, EventKind::KeyPress, &key)?;
        if !keypress.default_prevented && key.key == "Enter" && self.is_text_input(target) {
            // Implicit submission.
            if let Some(form) = self.form_owner(target) {
                self.record_form_submission(form)?;
            }
        }
        Ok(())
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.focus_node(target)
    }

    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.blur_node(target)
    }

    /// Fires `beforeunload` and drops every pending timer, as navigating
    /// away does.
    pub fn unload(&mut self) -> Result<()> {
        let root = self.dom.root;
        self.dispatch_event(root, EventKind::BeforeUnload)?;
        let cleared = self.drop_pending_work()?;
        self.trace_timer_line(format!("[timer] unload cleared={cleared}"));
        Ok(())
    }

    pub fn scroll_to(&mut self, scroll_y: i64) -> Result<()> {
        self.viewport.scroll_y = scroll_y.clamp(0, self.max_scroll_y());
        let root = self.dom.root;
        self.dispatch_event(root, EventKind::Scroll)?;
        self.update_intersections()
    }

    pub fn set_viewport_height(&mut self, height: i64) -> Result<()> {
        if height <= 0 {
            return Err(Error::Config("viewport height must be positive".into()));
        }
        self.viewport.height = height;
        self.viewport.scroll_y = self.viewport.scroll_y.clamp(0, self.max_scroll_y());
        self.update_intersections()
    }

    /// Gives every element matching `selector` a vertical layout box in
    /// document coordinates.
    pub fn set_layout(&mut self, selector: &str, top: i64, height: i64) -> Result<()> {
        if height < 0 {
            return Err(Error::Config("layout height must be non-negative".into()));
        }
        let targets = self.dom.query_selector_all(selector)?;
        if targets.is_empty() {
            return Err(Error::SelectorNotFound(selector.to_string()));
        }
        for target in targets {
            self.layout.insert(target, LayoutBox { top, height });
        }
        self.update_intersections()
    }

    pub fn smooth_scroll_to_results(&mut self) -> Result<bool> {
        let selector = self.config.results_selector.clone();
        let Some(section) = self.dom.query_selector(&selector)? else {
            return Ok(false);
        };
        self.scroll_into_view(section, ScrollBlock::Start)?;
        Ok(true)
    }

    // Clock.

    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms()
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.scheduler.pending()
    }

    pub fn pending_timer_count(&self) -> usize {
        self.scheduler.len()
    }

    /// Drops every pending timer. Toasts waiting on a timer are removed and
    /// armed debounces are disarmed, since nothing would ever advance them.
    pub fn clear_all_timers(&mut self) -> Result<usize> {
        let cleared = self.drop_pending_work()?;
        self.trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        Ok(cleared)
    }

    fn drop_pending_work(&mut self) -> Result<usize> {
        let cleared = self.scheduler.clear_all();
        for node in self.toasts.drain() {
            if self.dom.is_connected(node) {
                self.dom.remove_node(node)?;
            }
        }
        self.debouncers.disarm_all();
        Ok(cleared)
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Timer(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.now_ms();
        let target = from.saturating_add(delta_ms);
        let ran = self.run_timers_until(target)?;
        self.trace_timer_line(format!(
            "[timer] advance delta_ms={delta_ms} from={from} to={target} ran_due={ran}"
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        let from = self.now_ms();
        if target_ms < from {
            return Err(Error::Timer(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={from})"
            )));
        }
        let ran = self.run_timers_until(target_ms)?;
        self.trace_timer_line(format!(
            "[timer] advance_to from={from} to={target_ms} ran_due={ran}"
        ));
        Ok(())
    }

    /// Runs every queued task, moving the clock forward to each due time.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.now_ms();
        let ran = self.run_timer_queue(None)?;
        self.trace_timer_line(format!(
            "[timer] flush from={from} to={} ran={ran}",
            self.now_ms()
        ));
        Ok(())
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let now = self.now_ms();
        self.run_timer_queue(Some(now))
    }

    // Tasks scheduled by a running task land in the same pass when due, and
    // the clock steps through each due time so nested delays stay relative.
    fn run_timers_until(&mut self, target_ms: i64) -> Result<usize> {
        let ran = self.run_timer_queue(Some(target_ms))?;
        self.scheduler.set_now_ms(target_ms);
        Ok(ran)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(task) = self.scheduler.pop_next(due_limit) {
            steps += 1;
            if steps > self.scheduler.step_limit() {
                return Err(self.scheduler.step_limit_error(steps, due_limit));
            }
            if task.due_at > self.scheduler.now_ms() {
                self.scheduler.set_now_ms(task.due_at);
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    pub(crate) fn schedule(&mut self, delay_ms: i64, action: TimerAction) -> i64 {
        let (id, due_at) = self.scheduler.schedule(delay_ms, action.clone());
        self.trace_timer_line(format!(
            "[timer] schedule id={id} due_at={due_at} delay_ms={delay_ms} action={action:?}"
        ));
        id
    }

    pub(crate) fn cancel_timer(&mut self, id: i64) -> bool {
        let removed = self.scheduler.clear(id);
        self.trace_timer_line(format!("[timer] clear id={id} removed={removed}"));
        removed
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.trace_timer_line(format!(
            "[timer] run id={} due_at={} now_ms={} action={:?}",
            task.id,
            task.due_at,
            self.now_ms(),
            task.action
        ));
        match task.action {
            TimerAction::ClearInvalidIndicator(input) => self.clear_invalid_indicator(input),
            TimerAction::FadeInLoading(region) => self.dom.style_set(region, "opacity", "1"),
            TimerAction::ScrollIntoView { target, block } => self.scroll_into_view(target, block),
            TimerAction::ToastTick(id) => self.advance_toast(id),
            TimerAction::Debounce(id) => self.fire_debounce(id),
        }
    }

    // Inspection.

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        self.check(selector, target, expected, actual)
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        self.check(selector, target, expected, actual)
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name)?;
        self.check(
            selector,
            target,
            &format!("{class_name}={expected}"),
            format!("{class_name}={actual}"),
        )
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    fn check(&self, selector: &str, target: NodeId, expected: &str, actual: String) -> Result<()> {
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.dom.class_contains(target, class_name)
    }

    pub fn is_disabled(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.disabled(target))
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    /// Inline style property, empty when unset.
    pub fn style(&self, selector: &str, property: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.style_get(target, property)
    }

    pub fn inner_html(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.inner_html(target)
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.dom.query_selector_all(selector)?.len())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    /// Id of the focused element, or its tag name when it has no id.
    pub fn active_element_id(&self) -> Option<String> {
        self.active_element.map(|node| self.node_label(node))
    }

    /// Selected character range of `selector`, if it holds the selection.
    pub fn selection(&self, selector: &str) -> Result<Option<(usize, usize)>> {
        let target = self.select_one(selector)?;
        Ok(self
            .selection
            .filter(|(node, _, _)| *node == target)
            .map(|(_, start, end)| (start, end)))
    }

    pub fn scroll_y(&self) -> i64 {
        self.viewport.scroll_y
    }

    pub fn take_scroll_requests(&mut self) -> Vec<ScrollRequest> {
        std::mem::take(&mut self.scroll_requests)
    }

    pub fn take_form_submissions(&mut self) -> Vec<FormSubmission> {
        std::mem::take(&mut self.form_submissions)
    }

    pub fn clipboard_text(&self) -> &str {
        self.platform.clipboard_text()
    }

    pub fn set_clipboard_text(&mut self, text: &str) {
        self.platform.set_clipboard_text(text);
    }

    pub fn take_share_calls(&mut self) -> Vec<SharePayload> {
        self.platform.take_share_calls()
    }

    pub fn legacy_copy_attempts(&self) -> usize {
        self.platform.legacy_copy_attempts()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.count()
    }

    // Internals shared by the behaviour modules.

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    pub(crate) fn node_label(&self, node: NodeId) -> String {
        if let Some(id) = self.dom.attr(node, "id") {
            if !id.is_empty() {
                return id;
            }
        }
        self.dom
            .tag_name(node)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("node-{}", node.0))
    }

    /// Runs a click as `element.click()` does: disabled controls ignore it,
    /// otherwise listeners run and the default activation follows unless
    /// prevented.
    pub(crate) fn click_node(&mut self, target: NodeId) -> Result<()> {
        if self.dom.disabled(target) {
            return Ok(());
        }
        let outcome = self.dispatch_event(target, EventKind::Click)?;
        if outcome.default_prevented {
            return Ok(());
        }
        if self.is_submit_control(target) {
            if let Some(form) = self.form_owner(target) {
                self.record_form_submission(form)?;
            }
        }
        Ok(())
    }

    pub(crate) fn focus_node(&mut self, node: NodeId) -> Result<()> {
        if self.dom.disabled(node) || !self.dom.is_connected(node) {
            return Ok(());
        }
        if self.active_element == Some(node) {
            return Ok(());
        }
        if let Some(current) = self.active_element {
            self.blur_node(current)?;
        }
        self.active_element = Some(node);
        self.dispatch_event(node, EventKind::Focus)?;
        Ok(())
    }

    pub(crate) fn blur_node(&mut self, node: NodeId) -> Result<()> {
        if self.active_element != Some(node) {
            return Ok(());
        }
        self.active_element = None;
        if self.selection.is_some_and(|(selected, _, _)| selected == node) {
            self.selection = None;
        }
        self.dispatch_event(node, EventKind::Blur)?;
        Ok(())
    }

    pub(crate) fn select_all(&mut self, node: NodeId) -> Result<()> {
        let len = self.dom.value(node)?.chars().count();
        self.selection = Some((node, 0, len));
        Ok(())
    }

    pub(crate) fn selected_text(&self) -> String {
        let Some((node, start, end)) = self.selection else {
            return String::new();
        };
        self.dom
            .value(node)
            .map(|value| value.chars().skip(start).take(end - start).collect())
            .unwrap_or_default()
    }

    pub(crate) fn scroll_into_view(&mut self, target: NodeId, block: ScrollBlock) -> Result<()> {
        let scroll_y = match self.layout.get(&target) {
            Some(layout) => {
                let wanted = match block {
                    ScrollBlock::Start => layout.top,
                    ScrollBlock::Center => {
                        layout.top + layout.height / 2 - self.viewport.height / 2
                    }
                };
                wanted.clamp(0, self.max_scroll_y())
            }
            None => self.viewport.scroll_y,
        };
        let request = ScrollRequest {
            target: self.node_label(target),
            block,
            smooth: true,
            scroll_y,
        };
        log::debug!("scroll into view: {request:?}");
        self.scroll_requests.push(request);
        if scroll_y != self.viewport.scroll_y {
            self.scroll_to(scroll_y)?;
        }
        Ok(())
    }

    fn max_scroll_y(&self) -> i64 {
        let document_height = self
            .layout
            .values()
            .map(|layout| layout.top + layout.height)
            .max()
            .unwrap_or(0)
            .max(self.viewport.height);
        document_height - self.viewport.height
    }

    pub(crate) fn dispatch_event(&mut self, target: NodeId, kind: EventKind) -> Result<EventState> {
        let event = EventState::new(kind, target);
        self.dispatch(event)
    }

    fn dispatch_key_event(
        &mut self,
        target: NodeId,
        kind: EventKind,
        key: &KeyStroke,
    ) -> Result<EventState> {
        let mut event = EventState::new(kind, target);
        event.key = Some(key.clone());
        self.dispatch(event)
    }

    fn dispatch(&mut self, mut event: EventState) -> Result<EventState> {
        let mut path = Vec::new();
        let mut cursor = Some(event.target);
        while let Some(node) = cursor {
            path.push(node);
            if !event.kind.bubbles() {
                break;
            }
            cursor = self.dom.parent(node);
        }

        for node in path {
            event.current_target = node;
            self.invoke_listeners(node, &mut event)?;
        }

        self.trace_event_done(&event);
        Ok(event)
    }

    fn invoke_listeners(&mut self, node_id: NodeId, event: &mut EventState) -> Result<()> {
        for listener in self.listeners.get(node_id, event.kind) {
            if self.trace.enabled {
                let target_label = self.node_label(event.target);
                let current_label = self.node_label(event.current_target);
                self.trace_event_line(format!(
                    "[event] {} target={} current={} listener={:?} default_prevented={}",
                    event.kind.name(),
                    target_label,
                    current_label,
                    listener,
                    event.default_prevented
                ));
            }
            self.run_listener(listener, event)?;
        }
        Ok(())
    }

    fn run_listener(&mut self, listener: Listener, event: &mut EventState) -> Result<()> {
        match listener {
            Listener::SubmitClick => self.on_trigger_click(event),
            Listener::QueryInput => self.on_query_input(),
            Listener::EnterActivatesTrigger => self.on_query_keypress(event),
            Listener::FocusContainer => self.on_query_focus_change(true),
            Listener::BlurContainer => self.on_query_focus_change(false),
            Listener::ResetBusyState => self.on_before_unload(),
            Listener::Shortcuts { input } => self.on_shortcut_keydown(input, event),
        }
    }

    fn is_text_input(&self, node: NodeId) -> bool {
        if self.dom.tag_name(node) != Some("input") {
            return false;
        }
        let kind = self
            .dom
            .attr(node, "type")
            .unwrap_or_else(|| "text".into())
            .to_ascii_lowercase();
        matches!(
            kind.as_str(),
            "text" | "search" | "email" | "url" | "tel" | "password" | "number"
        )
    }

    fn is_submit_control(&self, node: NodeId) -> bool {
        let kind = self.dom.attr(node, "type").map(|t| t.to_ascii_lowercase());
        match self.dom.tag_name(node) {
            Some("button") => kind.is_none_or(|kind| kind == "submit"),
            Some("input") => matches!(kind.as_deref(), Some("submit" | "image")),
            _ => false,
        }
    }

    fn form_owner(&self, node: NodeId) -> Option<NodeId> {
        if let Some(form_id) = self.dom.attr(node, "form") {
            return self
                .dom
                .by_id(&form_id)
                .filter(|form| self.dom.tag_name(*form) == Some("form"));
        }
        let mut cursor = self.dom.parent(node);
        while let Some(current) = cursor {
            if self.dom.tag_name(current) == Some("form") {
                return Some(current);
            }
            cursor = self.dom.parent(current);
        }
        None
    }

    fn record_form_submission(&mut self, form: NodeId) -> Result<()> {
        let mut fields = Vec::new();
        for control in self.dom.all_element_nodes() {
            if !matches!(self.dom.tag_name(control), Some("input" | "textarea" | "select")) {
                continue;
            }
            if self.form_owner(control) != Some(form) || self.dom.disabled(control) {
                continue;
            }
            let Some(name) = self.dom.attr(control, "name").filter(|name| !name.is_empty())
            else {
                continue;
            };
            fields.push((name, self.dom.value(control)?));
        }
        let submission = FormSubmission {
            form: self.node_label(form),
            fields,
        };
        log::debug!("form submitted: {submission:?}");
        self.form_submissions.push(submission);
        Ok(())
    }

    fn trace_event_done(&mut self, event: &EventState) {
        if !self.trace.enabled {
            return;
        }
        let target_label = self.node_label(event.target);
        self.trace_event_line(format!(
            "[event] done {} target={} default_prevented={}",
            event.kind.name(),
            target_label,
            event.default_prevented
        ));
    }

    fn trace_event_line(&mut self, line: String) {
        if self.trace.enabled && self.trace.events {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_timer_line(&mut self, line: String) {
        if self.trace.enabled && self.trace.timers {
            self.trace_line(line);
        }
    }

    fn trace_line(&mut self, line: String) {
        if self.trace.to_log {
            log::trace!("{line}");
        }
        if self.trace.logs.len() >= self.trace.log_limit {
            self.trace.logs.pop_front();
        }
        self.trace.logs.push_back(line);
    }
}

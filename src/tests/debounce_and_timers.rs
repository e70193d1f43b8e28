use std::cell::RefCell;
use std::rc::Rc;

use super::*;

fn recorder() -> (Rc<RefCell<Vec<String>>>, impl FnMut(&mut Page, &str) -> Result<()>) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    let callback = move |_: &mut Page, arg: &str| -> Result<()> {
        sink.borrow_mut().push(arg.to_string());
        Ok(())
    };
    (calls, callback)
}

#[test]
fn debounced_calls_collapse_to_the_last_argument() -> Result<()> {
    let mut page = search_page()?;
    let (calls, callback) = recorder();
    let id = page.register_debounce(300, callback)?;

    page.call_debounced(id, "r")?;
    page.advance_time(100)?;
    page.call_debounced(id, "ru")?;
    page.advance_time(100)?;
    page.call_debounced(id, "rust")?;

    page.advance_time(299)?;
    assert!(calls.borrow().is_empty());
    page.advance_time(1)?;
    assert_eq!(*calls.borrow(), vec!["rust".to_string()]);

    page.advance_time(1000)?;
    assert_eq!(calls.borrow().len(), 1);
    Ok(())
}

#[test]
fn cancelled_debounce_never_fires() -> Result<()> {
    let mut page = search_page()?;
    let (calls, callback) = recorder();
    let id = page.register_debounce(50, callback)?;

    page.call_debounced(id, "x")?;
    assert!(page.cancel_debounce(id)?);
    assert!(!page.cancel_debounce(id)?);
    page.flush()?;
    assert!(calls.borrow().is_empty());
    Ok(())
}

#[test]
fn debounced_callback_can_drive_the_page() -> Result<()> {
    let mut page = search_page()?;
    let id = page.register_debounce(200, |page: &mut Page, query: &str| {
        page.show_toast(&format!("Searching for {query}"), ToastKind::Info)?;
        Ok(())
    })?;
    page.call_debounced(id, "Rust")?;
    page.advance_time(200)?;
    page.assert_text(".toast-info span", "Searching for Rust")?;
    Ok(())
}

#[test]
fn debounce_can_be_rearmed_after_firing() -> Result<()> {
    let mut page = search_page()?;
    let (calls, callback) = recorder();
    let id = page.register_debounce(10, callback)?;
    page.call_debounced(id, "a")?;
    page.advance_time(10)?;
    page.call_debounced(id, "b")?;
    page.advance_time(10)?;
    assert_eq!(*calls.borrow(), vec!["a".to_string(), "b".to_string()]);
    Ok(())
}

#[test]
fn unknown_debounce_handle_is_an_error() -> Result<()> {
    let mut page = search_page()?;
    assert!(matches!(
        page.call_debounced(DebounceId(42), "x"),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        page.register_debounce(-1, |_: &mut Page, _: &str| Ok(())),
        Err(Error::Config(_))
    ));
    Ok(())
}

#[test]
fn time_cannot_move_backwards() -> Result<()> {
    let mut page = search_page()?;
    assert!(matches!(page.advance_time(-1), Err(Error::Timer(_))));
    page.advance_time(50)?;
    assert!(matches!(page.advance_time_to(49), Err(Error::Timer(_))));
    assert_eq!(page.now_ms(), 50);
    Ok(())
}

#[test]
fn run_due_timers_only_runs_what_is_due() -> Result<()> {
    let mut page = search_page()?;
    page.show_toast("hi", ToastKind::Info)?;
    assert_eq!(page.run_due_timers()?, 0);
    page.advance_time_to(5)?;
    assert_eq!(page.run_due_timers()?, 0);
    page.advance_time(5)?;
    page.assert_class(".toast-info", "show", true)?;
    Ok(())
}

#[test]
fn pending_timers_are_ordered_by_due_time() -> Result<()> {
    let mut page = search_page()?;
    page.type_text("#pwd", "Rust")?;
    page.click("#btn1")?;
    page.show_toast("late", ToastKind::Info)?;

    let pending = page
        .pending_timers()
        .into_iter()
        .map(|timer| (timer.due_at, timer.label))
        .collect::<Vec<_>>();
    assert_eq!(
        pending,
        vec![
            (10, "fade-in-loading"),
            (10, "toast"),
            (100, "scroll-into-view"),
        ]
    );
    Ok(())
}

#[test]
fn step_limit_stops_a_long_flush() -> Result<()> {
    let mut page = search_page()?;
    page.set_timer_step_limit(1)?;
    page.show_toast("a", ToastKind::Info)?;
    page.show_toast("b", ToastKind::Info)?;
    let err = page.flush().expect_err("two due tasks exceed a limit of one");
    match err {
        Error::Timer(msg) => assert!(msg.contains("exceeded max task steps")),
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
fn clear_all_timers_freezes_pending_work() -> Result<()> {
    let mut page = search_page()?;
    page.click("#btn1")?;
    assert_eq!(page.clear_all_timers()?, 1);
    page.advance_time(1000)?;
    page.assert_class("#pwd", "error-shake", true)?;
    Ok(())
}

#[test]
fn clearing_timers_removes_toasts_waiting_on_them() -> Result<()> {
    let mut page = search_page()?;
    let shown = page.show_toast("shown", ToastKind::Success)?;
    page.advance_time(10)?;
    let fresh = page.show_toast("fresh", ToastKind::Info)?;
    assert_eq!(page.toast_phase(shown), ToastPhase::Shown);
    assert_eq!(page.toast_phase(fresh), ToastPhase::Created);

    page.clear_all_timers()?;
    assert!(page.live_toasts().is_empty());
    assert_eq!(page.toast_phase(fresh), ToastPhase::Removed);
    assert_eq!(page.toast_phase(shown), ToastPhase::Removed);
    assert_eq!(page.count(".toast-notification")?, 0);

    page.advance_time(100_000)?;
    assert_eq!(page.count(".toast-notification")?, 0);
    Ok(())
}

#[test]
fn toast_cap_is_not_held_by_cleared_toasts() -> Result<()> {
    let mut page = search_page_with(PageConfig {
        max_toasts: Some(1),
        ..PageConfig::default()
    })?;
    let first = page.show_toast("first", ToastKind::Info)?;
    page.clear_all_timers()?;
    let second = page.show_toast("second", ToastKind::Info)?;
    assert_eq!(page.live_toasts(), vec![second]);
    assert_eq!(page.toast_phase(first), ToastPhase::Removed);

    page.advance_time(3300)?;
    assert_eq!(page.count(".toast-notification")?, 0);
    Ok(())
}

#[test]
fn clearing_timers_disarms_debounces() -> Result<()> {
    let mut page = search_page()?;
    let (calls, callback) = recorder();
    let id = page.register_debounce(50, callback)?;
    page.call_debounced(id, "stale")?;

    page.clear_all_timers()?;
    assert!(!page.cancel_debounce(id)?);
    page.advance_time(100)?;
    assert!(calls.borrow().is_empty());

    page.call_debounced(id, "fresh")?;
    page.advance_time(50)?;
    assert_eq!(*calls.borrow(), vec!["fresh".to_string()]);
    Ok(())
}

use super::*;

use crate::submit::SPINNER_HTML;

#[test]
fn empty_query_shakes_the_input_and_blocks_submission() -> Result<()> {
    let mut page = search_page()?;
    page.click("#btn1")?;

    page.assert_class("#pwd", "error-shake", true)?;
    assert_eq!(page.active_element_id().as_deref(), Some("pwd"));
    assert!(!page.is_disabled("#btn1")?);
    page.assert_class("#btn1", "loading", false)?;
    assert_eq!(page.style("#myDIV", "display")?, "none");
    assert!(page.take_form_submissions().is_empty());

    page.advance_time(599)?;
    page.assert_class("#pwd", "error-shake", true)?;
    page.advance_time(1)?;
    page.assert_class("#pwd", "error-shake", false)?;
    Ok(())
}

#[test]
fn whitespace_only_query_counts_as_empty() -> Result<()> {
    let mut page = search_page()?;
    page.type_text("#pwd", "   \t ")?;
    page.click("#btn1")?;

    page.assert_class("#pwd", "error-shake", true)?;
    assert!(!page.is_disabled("#btn1")?);
    assert!(page.take_form_submissions().is_empty());
    assert_eq!(page.style("#nss", "display")?, "block");
    Ok(())
}

#[test]
fn byte_order_mark_and_unicode_spaces_count_as_empty() -> Result<()> {
    for blank in ["\u{FEFF}", "\u{00A0}\u{2003}", "\u{2028}\u{3000}\u{FEFF}"] {
        let mut page = search_page()?;
        page.type_text("#pwd", blank)?;
        page.assert_class("#pwd", "has-content", false)?;
        page.click("#btn1")?;

        page.assert_class("#pwd", "error-shake", true)?;
        assert!(!page.is_disabled("#btn1")?);
        assert!(page.take_form_submissions().is_empty());
    }
    Ok(())
}

#[test]
fn next_line_character_is_a_real_query() -> Result<()> {
    let mut page = search_page()?;
    page.type_text("#pwd", "\u{0085}")?;
    page.assert_class("#pwd", "has-content", true)?;
    page.click("#btn1")?;

    page.assert_class("#pwd", "error-shake", false)?;
    assert!(page.is_disabled("#btn1")?);
    assert_eq!(page.take_form_submissions().len(), 1);
    Ok(())
}

#[test]
fn empty_query_feedback_is_repeatable() -> Result<()> {
    let mut page = search_page()?;
    page.click("#btn1")?;
    page.advance_time(600)?;
    page.click("#btn1")?;
    page.assert_class("#pwd", "error-shake", true)?;
    page.advance_time(600)?;
    page.assert_class("#pwd", "error-shake", false)?;
    Ok(())
}

#[test]
fn valid_query_enters_the_busy_state() -> Result<()> {
    let mut page = search_page()?;
    page.type_text("#pwd", "  Rust  ")?;
    page.click("#btn1")?;

    assert!(page.is_disabled("#btn1")?);
    page.assert_class("#btn1", "loading", true)?;
    assert_eq!(page.inner_html("#btn1")?, SPINNER_HTML);
    page.assert_text("#btn1", "Searching...")?;

    assert_eq!(page.style("#myDIV", "display")?, "block");
    assert_eq!(page.style("#myDIV", "opacity")?, "0");
    assert_eq!(page.style("#nss", "display")?, "none");

    page.advance_time(10)?;
    assert_eq!(page.style("#myDIV", "opacity")?, "1");
    Ok(())
}

#[test]
fn loading_region_is_scrolled_to_the_centre_after_a_delay() -> Result<()> {
    let mut page = search_page()?;
    page.set_layout("body", 0, 5000)?;
    page.set_layout("#myDIV", 2000, 200)?;
    page.type_text("#pwd", "Rust")?;
    page.click("#btn1")?;

    page.advance_time(99)?;
    assert!(page.take_scroll_requests().is_empty());
    page.advance_time(1)?;
    assert_eq!(
        page.take_scroll_requests(),
        vec![ScrollRequest {
            target: "myDIV".into(),
            block: ScrollBlock::Center,
            smooth: true,
            scroll_y: 1700,
        }]
    );
    assert_eq!(page.scroll_y(), 1700);
    Ok(())
}

#[test]
fn visible_loading_region_is_left_alone() -> Result<()> {
    let html = r#"
        <input id="pwd">
        <button id="btn1">Search</button>
        <div id="myDIV" style="display: block; opacity: 0.5;"></div>
    "#;
    let mut page = Page::from_html(html)?;
    page.type_text("#pwd", "Rust")?;
    page.click("#btn1")?;

    assert_eq!(page.style("#myDIV", "opacity")?, "0.5");
    let labels = page
        .pending_timers()
        .into_iter()
        .map(|timer| timer.label)
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["scroll-into-view"]);
    Ok(())
}

#[test]
fn second_click_on_busy_trigger_is_ignored() -> Result<()> {
    let mut page = search_page()?;
    page.type_text("#pwd", "Rust")?;
    page.click("#btn1")?;
    assert_eq!(page.take_form_submissions().len(), 1);
    let pending = page.pending_timer_count();

    page.click("#btn1")?;
    assert!(page.take_form_submissions().is_empty());
    assert_eq!(page.pending_timer_count(), pending);
    Ok(())
}

#[test]
fn optional_regions_may_be_absent() -> Result<()> {
    let mut page = Page::from_html("<input id='pwd'><button id='btn1'>Go</button>")?;
    page.type_text("#pwd", "Rust")?;
    page.click("#btn1")?;
    page.assert_class("#btn1", "loading", true)?;
    assert_eq!(page.pending_timer_count(), 0);
    Ok(())
}

#[test]
fn missing_input_binds_nothing() -> Result<()> {
    let mut page = Page::from_html("<button id='btn1'>Search</button>")?;
    page.click("#btn1")?;
    page.assert_class("#btn1", "loading", false)?;
    assert!(!page.is_disabled("#btn1")?);
    Ok(())
}

#[test]
fn typing_clears_the_shake_and_tracks_content() -> Result<()> {
    let mut page = search_page()?;
    page.click("#btn1")?;
    page.type_text("#pwd", "R")?;
    page.assert_class("#pwd", "error-shake", false)?;
    page.assert_class("#pwd", "has-content", true)?;

    page.type_text("#pwd", "   ")?;
    page.assert_class("#pwd", "has-content", false)?;
    Ok(())
}

#[test]
fn enter_in_the_input_acts_as_a_trigger_click() -> Result<()> {
    let mut page = search_page()?;
    page.type_text("#pwd", "Rust")?;
    page.press_key("#pwd", KeyStroke::new("Enter"))?;

    page.assert_class("#btn1", "loading", true)?;
    // One submission from the trigger click, none from implicit submission.
    assert_eq!(page.take_form_submissions().len(), 1);
    Ok(())
}

#[test]
fn enter_with_empty_query_shakes_instead_of_submitting() -> Result<()> {
    let mut page = search_page()?;
    page.press_key("#pwd", KeyStroke::new("Enter"))?;
    page.assert_class("#pwd", "error-shake", true)?;
    assert!(page.take_form_submissions().is_empty());
    Ok(())
}

#[test]
fn other_keys_do_not_activate_the_trigger() -> Result<()> {
    let mut page = search_page()?;
    page.type_text("#pwd", "Rust")?;
    page.press_key("#pwd", KeyStroke::new("a"))?;
    page.assert_class("#btn1", "loading", false)?;
    Ok(())
}

#[test]
fn focus_and_blur_mark_the_input_container() -> Result<()> {
    let mut page = search_page()?;
    page.focus("#pwd")?;
    page.assert_class(".search-box", "input-focused", true)?;
    page.blur("#pwd")?;
    page.assert_class(".search-box", "input-focused", false)?;
    Ok(())
}

#[test]
fn unload_resets_the_busy_trigger() -> Result<()> {
    let mut page = search_page()?;
    let idle_label = page.inner_html("#btn1")?;
    page.type_text("#pwd", "Rust")?;
    page.click("#btn1")?;

    page.unload()?;
    page.assert_class("#btn1", "loading", false)?;
    assert!(!page.is_disabled("#btn1")?);
    assert_eq!(page.inner_html("#btn1")?, idle_label);
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn duplicate_ids_bind_the_first_element_either_way() -> Result<()> {
    const DUPLICATED: &str = r#"
<html><head></head><body>
  <form id="search-form">
    <div class="box"><input id="pwd" name="query" value="first"></div>
    <div class="box"><input id="pwd" name="query" value="second"></div>
    <button id="btn1" type="submit">Search</button>
  </form>
</body></html>
"#;
    for inject_styles in [true, false] {
        let config = PageConfig {
            inject_styles,
            ..PageConfig::default()
        };
        let mut page = Page::from_html_with_config(DUPLICATED, config)?;
        page.assert_value("#pwd", "first")?;
        page.click("#btn1")?;
        let submissions = page.take_form_submissions();
        assert_eq!(submissions.len(), 1);
        assert!(page.is_disabled("#btn1")?);
    }
    Ok(())
}

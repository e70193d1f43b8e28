use super::*;

mod debounce_and_timers;
mod submit_controller;

const SEARCH_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Wiki search</title></head>
<body>
  <form id="search-form" action="/search" method="post">
    <div class="search-box">
      <input id="pwd" class="search-input" name="query" type="text">
      <button id="btn1" class="search-btn" type="submit"><i class="fas fa-search"></i> Search</button>
    </div>
  </form>
  <div id="myDIV" style="display: none;">Loading results</div>
  <div id="nss" style="display: block;">No searches yet</div>
  <section class="results-section">
    <div class="result-card" id="card1">Rust</div>
    <div class="result-card" id="card2">Ferris</div>
  </section>
</body>
</html>"#;

fn search_page() -> Result<Page> {
    Page::from_html(SEARCH_PAGE)
}

fn search_page_with(config: PageConfig) -> Result<Page> {
    Page::from_html_with_config(SEARCH_PAGE, config)
}

fn search_page_on(platform: PlatformConfig) -> Result<Page> {
    search_page_with(PageConfig {
        platform,
        ..PageConfig::default()
    })
}

#[test]
fn valid_query_submits_the_search_form() -> Result<()> {
    let mut page = search_page()?;
    page.type_text("#pwd", "Rust")?;
    page.click("#btn1")?;

    assert_eq!(
        page.take_form_submissions(),
        vec![FormSubmission {
            form: "search-form".into(),
            fields: vec![("query".into(), "Rust".into())],
        }]
    );
    page.assert_class("#btn1", "loading", true)?;
    Ok(())
}

#[test]
fn page_without_search_controls_still_loads() -> Result<()> {
    let mut page = Page::from_html("<main><p id='msg'>hello</p></main>")?;
    page.assert_text("#msg", "hello")?;
    // Only the document-level shortcut listener is bound.
    assert_eq!(page.listener_count(), 1);
    page.key_down(KeyStroke::new("k").with_ctrl())?;
    assert_eq!(page.active_element_id(), None);
    Ok(())
}

#[test]
fn invalid_config_is_rejected_at_load() {
    let mut config = PageConfig::default();
    config.timings.toast_exit_ms = -1;
    let err = search_page_with(config).expect_err("negative delay should be rejected");
    assert!(matches!(err, Error::Config(msg) if msg.contains("toast_exit_ms")));
}

#[test]
fn assertion_failure_carries_a_dom_snippet() -> Result<()> {
    let page = search_page()?;
    let err = page
        .assert_text("#nss", "Something else")
        .expect_err("text differs");
    match err {
        Error::AssertionFailed {
            selector,
            actual,
            dom_snippet,
            ..
        } => {
            assert_eq!(selector, "#nss");
            assert_eq!(actual, "No searches yet");
            assert!(dom_snippet.starts_with("<div id=\"nss\""));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
fn unknown_selector_is_reported() -> Result<()> {
    let mut page = search_page()?;
    assert_eq!(
        page.click("#missing"),
        Err(Error::SelectorNotFound("#missing".into()))
    );
    assert!(matches!(
        page.count("#pwd + button"),
        Err(Error::UnsupportedSelector(_))
    ));
    Ok(())
}

#[test]
fn typing_into_a_non_field_is_a_type_mismatch() -> Result<()> {
    let mut page = search_page()?;
    let err = page.type_text("#nss", "x").expect_err("div is not a field");
    assert!(matches!(err, Error::TypeMismatch { actual, .. } if actual == "div"));
    Ok(())
}

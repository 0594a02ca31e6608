use pulldown_cmark::{Event, Options, Parser, html};

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Create a `pulldown-cmark` parser with our default options enabled.
pub fn parser(source: &str) -> Parser<'_> {
    Parser::new_ext(source, options())
}

/// Parser events with raw HTML demoted to plain text.
///
/// Every consumer (HTML export, on-screen preview) goes through this so raw
/// HTML in the source is never passed through.
pub fn events(source: &str) -> impl Iterator<Item = Event<'_>> {
    parser(source).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    })
}

/// Render markdown to HTML.
pub fn render_html(source: &str) -> String {
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events(source));
    out
}

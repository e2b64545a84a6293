//! Markdown rendering for knowledge-base documents.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

/// Default excerpt length, in characters.
pub const EXCERPT_LEN: usize = 200;

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// Render a markdown body to HTML.
#[must_use]
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Plain text of a markdown body with markup stripped and whitespace
/// collapsed, cut to at most `max_chars` characters (an ellipsis marks a cut).
#[must_use]
pub fn excerpt(markdown: &str, max_chars: usize) -> String {
    let mut raw = String::new();
    let mut in_code_block = false;
    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(t) | Event::Code(t) if !in_code_block => raw.push_str(&t),
            Event::SoftBreak
            | Event::HardBreak
            | Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::TableCell,
            ) => raw.push(' '),
            _ => {}
        }
    }
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.chars().count() <= max_chars {
        return text;
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    if let Some(space) = cut.rfind(' ') {
        cut.truncate(space);
    }
    cut.push('…');
    cut
}

/// The first level-one heading, if any.
#[must_use]
pub fn title(markdown: &str) -> Option<String> {
    let mut in_h1 = false;
    let mut heading = String::new();
    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Start(Tag::Heading {
                level: pulldown_cmark::HeadingLevel::H1,
                ..
            }) => in_h1 = true,
            Event::End(TagEnd::Heading(pulldown_cmark::HeadingLevel::H1)) if in_h1 => {
                return Some(heading.trim().to_string()).filter(|h| !h.is_empty());
            }
            Event::Text(t) | Event::Code(t) if in_h1 => heading.push_str(&t),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_tables_and_emphasis() {
        let html = render_html("# Guide\n\n*hello*\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<h1>Guide</h1>"));
        assert!(html.contains("<em>hello</em>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn excerpt_strips_markup_and_code_blocks() {
        let md = "# Onboarding\n\nRead the **handbook** and `setup.sh`.\n\n```sh\nrm -rf /\n```\n";
        assert_eq!(excerpt(md, EXCERPT_LEN), "Onboarding Read the handbook and setup.sh.");
    }

    #[test]
    fn excerpt_cuts_on_word_boundary() {
        let md = "alpha beta gamma delta";
        assert_eq!(excerpt(md, 12), "alpha beta…");
        assert_eq!(excerpt(md, 100), md);
    }

    #[test]
    fn finds_first_h1() {
        assert_eq!(title("intro\n\n# Sales playbook\n\n# Other").as_deref(), Some("Sales playbook"));
        assert_eq!(title("## Only h2"), None);
    }
}

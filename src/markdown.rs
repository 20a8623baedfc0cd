//! Markdown to HTML for chat bubbles.
//!
//! The renderer walks comrak's AST itself instead of using comrak's HTML
//! formatter so individual elements can be overridden through
//! [`ElementRenderer`]. Rendering is pure and cheap enough to run on every
//! streamed fragment.

use comrak::adapters::SyntaxHighlighterAdapter;
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::plugins::syntect::SyntectAdapter;
use comrak::{Arena, ComrakOptions, parse_document};
use once_cell::sync::Lazy;

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options
});

static HIGHLIGHTER: Lazy<SyntectAdapter> =
    Lazy::new(|| SyntectAdapter::new(Some("base16-ocean.dark")));

/// Hooks for the elements chat bubbles style differently from plain HTML.
/// Every method has a default; override only what needs to change.
pub trait ElementRenderer {
    /// Fenced or indented code block. `language` is the first word of the
    /// fence info string, if any.
    fn code_block(&self, out: &mut String, language: Option<&str>, code: &str) {
        match language {
            Some(lang) => {
                out.push_str(&format!(
                    "<pre class=\"code-block\"><code class=\"language-{}\">",
                    escape_html(lang)
                ));
                out.push_str(&highlight(lang, code));
                out.push_str("</code></pre>\n");
            }
            None => {
                out.push_str("<pre><code>");
                out.push_str(&escape_html(code));
                out.push_str("</code></pre>\n");
            }
        }
    }

    fn inline_code(&self, out: &mut String, code: &str) {
        out.push_str("<code class=\"inline-code\">");
        out.push_str(&escape_html(code));
        out.push_str("</code>");
    }

    fn link_open(&self, out: &mut String, url: &str, title: &str) {
        out.push_str(&format!("<a href=\"{}\"", escape_url(url)));
        if !title.is_empty() {
            out.push_str(&format!(" title=\"{}\"", escape_html(title)));
        }
        out.push_str(" target=\"_blank\" rel=\"noopener noreferrer\">");
    }

    fn link_close(&self, out: &mut String) {
        out.push_str("</a>");
    }

    fn table_open(&self, out: &mut String) {
        out.push_str("<div class=\"table-scroll\"><table>\n");
    }

    fn table_close(&self, out: &mut String) {
        out.push_str("</table></div>\n");
    }

    fn block_quote_open(&self, out: &mut String) {
        out.push_str("<blockquote>\n");
    }

    fn block_quote_close(&self, out: &mut String) {
        out.push_str("</blockquote>\n");
    }

    fn heading_open(&self, out: &mut String, level: u8) {
        out.push_str(&format!("<h{level}>"));
    }

    fn heading_close(&self, out: &mut String, level: u8) {
        out.push_str(&format!("</h{level}>\n"));
    }
}

/// Stock element handling.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultElements;

impl ElementRenderer for DefaultElements {}

#[derive(Clone, Debug, Default)]
pub struct MarkdownRenderer<E = DefaultElements> {
    elements: E,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: ElementRenderer> MarkdownRenderer<E> {
    pub fn with_elements(elements: E) -> Self {
        Self { elements }
    }

    pub fn render(&self, markdown: &str) -> String {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &MARKDOWN_OPTIONS);
        let mut out = String::with_capacity(markdown.len() * 2);
        self.render_node(root, &mut out);
        out
    }

    fn render_children<'a>(&self, node: &'a AstNode<'a>, out: &mut String) {
        for child in node.children() {
            self.render_node(child, out);
        }
    }

    fn render_node<'a>(&self, node: &'a AstNode<'a>, out: &mut String) {
        let value = node.data.borrow().value.clone();
        let e = &self.elements;
        match value {
            NodeValue::Document => self.render_children(node, out),
            NodeValue::Paragraph => {
                if in_tight_list(node) {
                    self.render_children(node, out);
                } else {
                    out.push_str("<p>");
                    self.render_children(node, out);
                    out.push_str("</p>\n");
                }
            }
            NodeValue::Heading(heading) => {
                e.heading_open(out, heading.level);
                self.render_children(node, out);
                e.heading_close(out, heading.level);
            }
            NodeValue::BlockQuote => {
                e.block_quote_open(out);
                self.render_children(node, out);
                e.block_quote_close(out);
            }
            NodeValue::List(list) => {
                let tag = match list.list_type {
                    ListType::Bullet => "ul",
                    ListType::Ordered => "ol",
                };
                if tag == "ol" && list.start != 1 {
                    out.push_str(&format!("<ol start=\"{}\">\n", list.start));
                } else {
                    out.push_str(&format!("<{tag}>\n"));
                }
                self.render_children(node, out);
                out.push_str(&format!("</{tag}>\n"));
            }
            NodeValue::Item(_) => {
                out.push_str("<li>");
                self.render_children(node, out);
                out.push_str("</li>\n");
            }
            NodeValue::CodeBlock(block) => {
                let language = block
                    .info
                    .split_whitespace()
                    .next()
                    .filter(|lang| !lang.is_empty());
                e.code_block(out, language, &block.literal);
            }
            NodeValue::HtmlBlock(block) => {
                out.push_str("<p>");
                out.push_str(&escape_html(&block.literal));
                out.push_str("</p>\n");
            }
            NodeValue::ThematicBreak => out.push_str("<hr />\n"),
            NodeValue::Table(..) => {
                e.table_open(out);
                let mut body_open = false;
                for row in node.children() {
                    let is_header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
                    if is_header {
                        out.push_str("<thead>\n");
                        self.render_row(row, "th", out);
                        out.push_str("</thead>\n");
                    } else {
                        if !body_open {
                            out.push_str("<tbody>\n");
                            body_open = true;
                        }
                        self.render_row(row, "td", out);
                    }
                }
                if body_open {
                    out.push_str("</tbody>\n");
                }
                e.table_close(out);
            }
            NodeValue::Text(text) => out.push_str(&escape_html(&text)),
            NodeValue::SoftBreak => out.push('\n'),
            NodeValue::LineBreak => out.push_str("<br />\n"),
            NodeValue::Code(code) => e.inline_code(out, &code.literal),
            NodeValue::HtmlInline(raw) => out.push_str(&escape_html(&raw)),
            NodeValue::Emph => self.wrap("em", node, out),
            NodeValue::Strong => self.wrap("strong", node, out),
            NodeValue::Strikethrough => self.wrap("del", node, out),
            NodeValue::Link(link) => {
                e.link_open(out, &link.url, &link.title);
                self.render_children(node, out);
                e.link_close(out);
            }
            NodeValue::Image(link) => {
                let mut alt = String::new();
                collect_text(node, &mut alt);
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\" />",
                    escape_url(&link.url),
                    escape_html(&alt)
                ));
            }
            _ => self.render_children(node, out),
        }
    }

    fn render_row<'a>(&self, row: &'a AstNode<'a>, cell_tag: &str, out: &mut String) {
        out.push_str("<tr>\n");
        for cell in row.children() {
            out.push_str(&format!("<{cell_tag}>"));
            self.render_children(cell, out);
            out.push_str(&format!("</{cell_tag}>\n"));
        }
        out.push_str("</tr>\n");
    }

    fn wrap<'a>(&self, tag: &str, node: &'a AstNode<'a>, out: &mut String) {
        out.push_str(&format!("<{tag}>"));
        self.render_children(node, out);
        out.push_str(&format!("</{tag}>"));
    }
}

/// Render with the stock element handling.
pub fn render_markdown(markdown: &str) -> String {
    MarkdownRenderer::new().render(markdown)
}

fn in_tight_list<'a>(paragraph: &'a AstNode<'a>) -> bool {
    let Some(list) = paragraph.parent().and_then(|item| item.parent()) else {
        return false;
    };
    matches!(&list.data.borrow().value, NodeValue::List(list) if list.tight)
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(text) => out.push_str(text),
            NodeValue::Code(code) => out.push_str(&code.literal),
            _ => collect_text(child, out),
        }
    }
}

/// Syntax-highlighted HTML for `code`, falling back to escaped text.
pub fn highlight(language: &str, code: &str) -> String {
    let mut buffer = Vec::new();
    match HIGHLIGHTER.write_highlighted(&mut buffer, Some(language), code) {
        Ok(()) => String::from_utf8_lossy(&buffer).into_owned(),
        Err(err) => {
            tracing::debug!(language, error = %err, "highlighting failed");
            escape_html(code)
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut buffer = Vec::with_capacity(text.len());
    // Writes into a Vec are infallible.
    let _ = comrak::html::escape(&mut buffer, text.as_bytes());
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Attribute-safe `href`/`src` value. Script-capable schemes become empty.
pub fn escape_url(url: &str) -> String {
    if is_dangerous_url(url) {
        return String::new();
    }
    let mut buffer = Vec::with_capacity(url.len());
    let _ = comrak::html::escape_href(&mut buffer, url.as_bytes());
    String::from_utf8_lossy(&buffer).into_owned()
}

// Browsers drop whitespace and control characters inside a scheme before
// resolving it, so compare on the stripped form.
fn is_dangerous_url(url: &str) -> bool {
    let normalized: String = url
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace() && !ch.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    ["javascript:", "vbscript:", "file:", "data:"]
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_emphasis() {
        let html = render_markdown("# Title\n\nSome *soft* and **bold** ~~gone~~ text");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>soft</em>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn inline_code_differs_from_fenced_code() {
        let html = render_markdown("Use `cargo` here.\n\n```rust\nfn main() {}\n```\n");
        assert!(html.contains("<code class=\"inline-code\">cargo</code>"));
        assert!(html.contains("<pre class=\"code-block\"><code class=\"language-rust\">"));
    }

    #[test]
    fn fence_without_language_is_plain() {
        let html = render_markdown("```\n<b>raw</b>\n```\n");
        assert!(html.contains("<pre><code>&lt;b&gt;raw&lt;/b&gt;\n</code></pre>"));
    }

    #[test]
    fn links_open_in_new_tab() {
        let html = render_markdown("[docs](https://example.com \"Docs\")");
        assert!(html.contains(
            "<a href=\"https://example.com\" title=\"Docs\" target=\"_blank\" rel=\"noopener noreferrer\">docs</a>"
        ));
    }

    #[test]
    fn script_links_are_neutralised() {
        let html = render_markdown("[x](javascript:alert(1))");
        assert!(html.contains("href=\"\""));
        assert!(!html.contains("javascript"));
    }

    #[test]
    fn tables_are_wrapped_for_scrolling() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.starts_with("<div class=\"table-scroll\"><table>"));
        assert!(html.contains("<thead>\n<tr>\n<th>a</th>"));
        assert!(html.contains("<tbody>\n<tr>\n<td>1</td>"));
        assert!(html.trim_end().ends_with("</table></div>"));
    }

    #[test]
    fn tight_lists_have_no_paragraphs() {
        let html = render_markdown("- one\n- two\n\n3. three\n");
        assert!(html.contains("<ul>\n<li>one</li>\n<li>two</li>\n</ul>"));
        assert!(html.contains("<ol start=\"3\">"));
    }

    #[test]
    fn block_quotes() {
        let html = render_markdown("> quoted");
        assert_eq!(html, "<blockquote>\n<p>quoted</p>\n</blockquote>\n");
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render_markdown("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn partial_stream_renders() {
        let html = render_markdown("Here is code:\n\n```py\nprint(");
        assert!(html.contains("language-py"));
    }

    #[test]
    fn obfuscated_script_schemes_are_neutralised() {
        for source in [
            "[x](java&#9;script:alert(1))",
            "[x](JavaScript:alert(1))",
            "[x]( java&#10;script:alert(1))",
            "![x](java&#9;script:alert(1))",
            "![x](VB&#13;Script:msgbox(1))",
        ] {
            let html = render_markdown(source);
            assert!(!html.contains("script:"), "{source} rendered {html}");
        }
        let html = render_markdown("![x](java&#9;script:alert(1))");
        assert!(html.contains("<img src=\"\""));
    }

    #[test]
    fn control_characters_in_urls_are_percent_encoded() {
        let html = render_markdown("[x](https://a.example/a&#9;b \"t\\\"q\")");
        assert!(html.contains("href=\"https://a.example/a%09b\""));
        assert!(html.contains("title=\"t&quot;q\""));
    }

    struct PlainLinks;

    impl ElementRenderer for PlainLinks {
        fn link_open(&self, out: &mut String, url: &str, _title: &str) {
            out.push_str(&format!("<a href=\"{}\">", escape_html(url)));
        }
    }

    #[test]
    fn overriding_one_element_keeps_the_rest() {
        let renderer = MarkdownRenderer::with_elements(PlainLinks);
        let html = renderer.render("[a](https://a.example) `b`");
        assert!(html.contains("<a href=\"https://a.example\">a</a>"));
        assert!(html.contains("<code class=\"inline-code\">b</code>"));
    }
}

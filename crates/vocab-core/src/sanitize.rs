//! Notes sanitizing
//!
//! Notes are free-form markup typed by the user or pasted from elsewhere.
//! Before they are stored they pass through an allowlist: executable and
//! embedding elements are removed together with their content, unknown
//! elements are unwrapped to their text, and the surviving formatting
//! elements keep no attributes except a safe `href` on links.

use scraper::{ElementRef, Html, Node};

/// Removed along with everything inside them
const DROPPED: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "template",
    "noscript", "link", "meta", "base", "form", "input", "button", "textarea", "select", "svg",
    "math", "head", "title",
];

/// Kept as-is, minus attributes
const ALLOWED: &[&str] = &[
    "p", "br", "b", "strong", "i", "em", "u", "s", "strike", "del", "ins", "sub", "sup", "ul", "ol",
    "li", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "code", "pre", "span", "div", "a",
];

const VOID: &[&str] = &["br"];

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Strip unsafe markup, keeping benign formatting
pub fn sanitize_html(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(raw);
    let mut out = String::with_capacity(raw.len());
    write_children(fragment.root_element(), &mut out);
    out
}

fn write_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => escape_text(text, out),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(child, out);
                }
            }
            // comments, doctypes, processing instructions
            _ => {}
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();

    if DROPPED.contains(&name) {
        return;
    }
    if !ALLOWED.contains(&name) {
        write_children(element, out);
        return;
    }

    out.push('<');
    out.push_str(name);
    if name == "a" {
        if let Some(href) = element.value().attr("href").filter(|h| is_safe_href(h)) {
            out.push_str(" href=\"");
            escape_attr(href.trim(), out);
            out.push('"');
        }
    }
    out.push('>');

    if VOID.contains(&name) {
        return;
    }

    write_children(element, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Block elements that start on a new line when rendered as text
const BLOCKS: &[&str] = &[
    "p", "div", "li", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "ul", "ol",
];

/// Render stored notes as plain text for a terminal
///
/// Markup is dropped, block elements and `br` become line breaks, list
/// items get a `- ` bullet.
pub fn notes_to_text(notes: &str) -> String {
    let fragment = Html::parse_fragment(&sanitize_html(notes));
    let mut out = String::new();
    write_text(fragment.root_element(), &mut out);

    out.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let block = BLOCKS.contains(&name);
                if block {
                    out.push('\n');
                }
                if name == "li" {
                    out.push_str("- ");
                }
                if let Some(child) = ElementRef::wrap(child) {
                    write_text(child, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Relative links and http(s)/mailto are allowed; any other scheme is not
fn is_safe_href(href: &str) -> bool {
    // Browsers ignore whitespace and control characters inside a scheme
    let compact: String = href
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.find(':') {
        None => true,
        Some(colon) => {
            let before = &compact[..colon];
            if before.contains(['/', '?', '#']) {
                // the colon sits in a path or query, not a scheme
                return true;
            }
            SAFE_SCHEMES.contains(&before)
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(sanitize_html("el perro"), "el perro");
        assert_eq!(sanitize_html(""), "");
        assert_eq!(sanitize_html("   "), "");
    }

    #[test]
    fn test_benign_formatting_is_kept() {
        assert_eq!(
            sanitize_html("<p><strong>der</strong> Hund, <em>die</em> Hunde</p>"),
            "<p><strong>der</strong> Hund, <em>die</em> Hunde</p>"
        );
        assert_eq!(
            sanitize_html("<ol><li>one</li><li>two</li></ol>"),
            "<ol><li>one</li><li>two</li></ol>"
        );
        assert_eq!(sanitize_html("line<br>break"), "line<br>break");
    }

    #[test]
    fn test_scripts_are_removed_with_content() {
        assert_eq!(
            sanitize_html("<b>bold</b> <script>alert('x')</script>ok"),
            "<b>bold</b> ok"
        );
        assert_eq!(sanitize_html("<style>p { color: red }</style>text"), "text");
        assert_eq!(sanitize_html("<iframe src=\"https://evil\"></iframe>"), "");
    }

    #[test]
    fn test_attributes_are_stripped() {
        assert_eq!(
            sanitize_html("<p class=\"ql-align-center\" onclick=\"steal()\">hi</p>"),
            "<p>hi</p>"
        );
        assert_eq!(sanitize_html("<img src=x onerror=alert(1)>"), "");
    }

    #[test]
    fn test_unknown_elements_are_unwrapped() {
        assert_eq!(sanitize_html("<font color=red>rojo</font>"), "rojo");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            sanitize_html("<a href=\"https://example.com/?a=1&b=2\" target=\"_blank\">ref</a>"),
            "<a href=\"https://example.com/?a=1&amp;b=2\">ref</a>"
        );
        assert_eq!(sanitize_html("<a href=\"javascript:alert(1)\">x</a>"), "<a>x</a>");
        assert_eq!(sanitize_html("<a href=\" java\tscript:alert(1)\">x</a>"), "<a>x</a>");
        assert_eq!(
            sanitize_html("<a href=\"/words/perro\">x</a>"),
            "<a href=\"/words/perro\">x</a>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(sanitize_html("a &lt; b &amp; c"), "a &lt; b &amp; c");
        assert_eq!(sanitize_html("1 < 2"), "1 &lt; 2");
    }

    #[test]
    fn test_sanitizing_is_stable() {
        let once = sanitize_html("<p>x<script>y</script><a href=\"vbscript:z\">w</a></p>");
        assert_eq!(sanitize_html(&once), once);
    }

    #[test]
    fn test_notes_to_text() {
        assert_eq!(notes_to_text(""), "");
        assert_eq!(notes_to_text("<b>el</b> perro"), "el perro");
        assert_eq!(
            notes_to_text("<p>masculine</p><ul><li>el perro</li><li>los perros</li></ul>"),
            "masculine\n- el perro\n- los perros"
        );
        assert_eq!(notes_to_text("one<br>two<script>three</script>"), "one\ntwo");
        assert_eq!(notes_to_text("1 &lt; 2"), "1 < 2");
    }

    #[test]
    fn test_href_schemes() {
        assert!(is_safe_href("https://example.com"));
        assert!(is_safe_href("mailto:me@example.com"));
        assert!(is_safe_href("relative/path:with-colon"));
        assert!(!is_safe_href("data:text/html;base64,PHNjcmlwdD4="));
        assert!(!is_safe_href("JAVASCRIPT:alert(1)"));
    }
}

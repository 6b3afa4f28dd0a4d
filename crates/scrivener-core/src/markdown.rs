//! Theme-neutral HTML → Markdown conversion: DOM traversal with
//! per-element-kind handlers (headers, lists, code blocks, definition
//! lists, admonitions), followed by a whitespace-normalization pass.
//! Built on the `scraper` crate, which this workspace already depends on
//! for DOM queries elsewhere.

use scraper::node::Node as DomNode;
use scraper::{ElementRef, Html};

/// Convert an HTML fragment to Markdown using the universal cleanup +
/// per-element conversion rules shared by every structure processor.
#[must_use]
pub fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_fragment(html);
    let mut out = String::new();
    for node in document.tree.root().children() {
        convert_node(node, &mut out);
    }
    normalize_whitespace(&out)
}

/// Convert just the inner content of an already-located [`ElementRef`].
#[must_use]
pub fn element_to_markdown(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    convert_element(element, &mut out);
    normalize_whitespace(&out)
}

fn convert_node(node: ego_tree::NodeRef<'_, DomNode>, out: &mut String) {
    match node.value() {
        DomNode::Text(text) => out.push_str(text),
        DomNode::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                convert_element(element, out);
            }
        },
        _ => {},
    }
}

fn convert_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        convert_node(child, out);
    }
}

fn children_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    convert_children(element, &mut text);
    text.trim().to_string()
}

fn convert_element(element: ElementRef<'_>, out: &mut String) {
    let tag = element.value().name();

    if is_stripped(element) {
        return;
    }

    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<usize>().unwrap_or(1);
            let content = children_text(element);
            if !content.is_empty() {
                out.push_str(&format!("\n\n{} {}\n\n", "#".repeat(level), content));
            }
        },
        "p" => {
            let content = children_text(element);
            if !content.is_empty() {
                out.push_str(&format!("\n\n{content}\n\n"));
            }
        },
        "ul" => {
            out.push('\n');
            for li in element.children().filter_map(ElementRef::wrap).filter(|e| e.value().name() == "li") {
                out.push_str(&format!("- {}\n", children_text(li)));
            }
            out.push('\n');
        },
        "ol" => {
            out.push('\n');
            for (i, li) in element.children().filter_map(ElementRef::wrap).filter(|e| e.value().name() == "li").enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, children_text(li)));
            }
            out.push('\n');
        },
        "dl" => convert_definition_list(element, out),
        "pre" => convert_code_block(element, out),
        "code" => {
            let content = children_text(element);
            out.push_str(&format!("`{content}`"));
        },
        "strong" | "b" => out.push_str(&format!("**{}**", children_text(element))),
        "em" | "i" => out.push_str(&format!("*{}*", children_text(element))),
        "br" => out.push('\n'),
        "div" if has_class(element, "admonition") => convert_admonition(element, out),
        "a" => convert_children(element, out),
        _ => convert_children(element, out),
    }
}

fn convert_definition_list(dl: ElementRef<'_>, out: &mut String) {
    out.push('\n');
    let children: Vec<ElementRef<'_>> = dl.children().filter_map(ElementRef::wrap).collect();
    let mut i = 0;
    while i < children.len() {
        let node = children[i];
        if node.value().name() == "dt" {
            let term = children_text(node);
            let desc = children
                .get(i + 1)
                .filter(|n| n.value().name() == "dd")
                .map_or_else(String::new, |dd| children_text(*dd));
            out.push_str(&format!("**{term}**: {desc}\n"));
            i += if children.get(i + 1).is_some_and(|n| n.value().name() == "dd") { 2 } else { 1 };
        } else {
            i += 1;
        }
    }
    out.push('\n');
}

fn convert_code_block(pre: ElementRef<'_>, out: &mut String) {
    let code = pre.children().filter_map(ElementRef::wrap).find(|e| e.value().name() == "code");
    let (language, content) = code.map_or_else(
        || (None, children_text(pre)),
        |code_element| (detect_language(code_element).or_else(|| detect_language(pre)), children_text(code_element)),
    );
    let lang = language.unwrap_or_default();
    out.push_str(&format!("\n\n```{lang}\n{content}\n```\n\n"));
}

fn detect_language(element: ElementRef<'_>) -> Option<String> {
    let class = element.value().attr("class")?;
    class.split_whitespace().find_map(|token| {
        token
            .strip_prefix("language-")
            .or_else(|| token.strip_prefix("highlight-"))
            .map(str::to_string)
    })
}

fn convert_admonition(div: ElementRef<'_>, out: &mut String) {
    let title = div
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| has_class(*e, "admonition-title"))
        .map_or_else(|| "Note".to_string(), children_text);
    let body = div
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| !has_class(*e, "admonition-title"))
        .map(children_text)
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!("\n\n**{title}**: {body}\n\n"));
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().attr("class").is_some_and(|c| c.split_whitespace().any(|token| token == class))
}

fn is_stripped(element: ElementRef<'_>) -> bool {
    let name = element.value().name();
    matches!(name, "script" | "style" | "nav" | "aside")
        || (name == "a" && has_class(element, "headerlink"))
}

/// Collapse runs of 3+ blank lines to a single blank line and trim edges.
fn normalize_whitespace(markdown: &str) -> String {
    let mut out = String::new();
    let mut blank_run = 0;
    for line in markdown.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run <= 1 {
                out.push('\n');
            }
        } else {
            blank_run = 0;
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_headings_to_atx() {
        let md = html_to_markdown("<h2>Title</h2><p>Body</p>");
        assert!(md.contains("## Title"));
        assert!(md.contains("Body"));
    }

    #[test]
    fn converts_unordered_list_to_dashes() {
        let md = html_to_markdown("<ul><li>a</li><li>b</li></ul>");
        assert!(md.contains("- a"));
        assert!(md.contains("- b"));
    }

    #[test]
    fn fenced_code_block_detects_language_class() {
        let md = html_to_markdown(r#"<pre><code class="language-python">x = 1</code></pre>"#);
        assert!(md.contains("```python"));
        assert!(md.contains("x = 1"));
    }

    #[test]
    fn definition_list_renders_term_bold() {
        let md = html_to_markdown("<dl><dt>Name</dt><dd>a widget</dd></dl>");
        assert!(md.contains("**Name**: a widget"));
    }

    #[test]
    fn admonition_renders_title_and_body() {
        let md = html_to_markdown(
            r#"<div class="admonition"><p class="admonition-title">Warning</p><p>careful</p></div>"#,
        );
        assert!(md.contains("**Warning**: careful"));
    }

    #[test]
    fn headerlink_anchors_are_stripped() {
        let md = html_to_markdown(r#"<h2>Title<a class="headerlink" href="#title">#</a></h2>"#);
        assert!(md.contains("Title"));
        assert!(!md.contains('#') || md.matches('#').count() <= 2);
    }

    #[test]
    fn nav_and_aside_subtrees_are_dropped() {
        let md = html_to_markdown("<nav>Skip this</nav><p>Keep this</p>");
        assert!(!md.contains("Skip this"));
        assert!(md.contains("Keep this"));
    }
}

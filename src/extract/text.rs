//! Text helpers over parsed markup

use scraper::{ElementRef, Html, Node};

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of an element with its text nodes whitespace-joined
///
/// `<p>Fin<b>tech</b>\n  platform</p>` yields `Fin tech platform`; markup
/// boundaries always become a single space.
pub fn element_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text nodes of `element` that do not sit inside `excluded`
pub fn text_excluding(element: &ElementRef, excluded: &ElementRef) -> String {
    let excluded_id = excluded.id();
    let parts: Vec<&str> = element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let inside_excluded = node.ancestors().any(|a| a.id() == excluded_id);
            if inside_excluded {
                None
            } else {
                Some(text.trim())
            }
        })
        .filter(|t| !t.is_empty())
        .collect();

    collapse_whitespace(&parts.join(" "))
}

/// All text a reader would see: script, style and similar bodies are skipped
pub fn visible_text(document: &Html) -> String {
    let parts: Vec<&str> = document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| match a.value() {
                Node::Element(el) => HIDDEN_ELEMENTS.contains(&el.name()),
                _ => false,
            });
            if hidden {
                None
            } else {
                Some(&**text)
            }
        })
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    parts.join("\n")
}

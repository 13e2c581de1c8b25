//! Cleaning of HTML received from other people (rich descriptions of invitations)

use scraper::{ElementRef, Html};

use super::escape;

/// Elements that are kept. Other elements are replaced by their content
const SAFE_ELEMENTS: [&str; 36] = [
    "a", "b", "i", "u", "s", "em", "strong", "small", "big", "sub", "sup", "del", "ins", "font", "span", "div",
    "p", "br", "hr", "blockquote", "pre", "code", "ul", "ol", "li",
    "table", "thead", "tbody", "tr", "td", "th",
    "h1", "h2", "h3", "h4", "h5",
];

/// Elements that are removed along with their content
const DROPPED_ELEMENTS: [&str; 10] = ["script", "style", "iframe", "frame", "frameset", "object", "embed", "template", "noscript", "title"];

const SAFE_ATTRIBUTES: [&str; 7] = ["title", "colspan", "rowspan", "align", "color", "size", "face"];

const VOID_ELEMENTS: [&str; 2] = ["br", "hr"];

/// Keep the harmless part of an HTML fragment.
///
/// Scripts, styles and embedded frames are removed, and so are event handler attributes and links that do not point to the web or to a mail address.
pub fn sanitize_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    write_children(fragment.root_element(), &mut out);
    out
}

fn write_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(&escape(text));
        } else if let Some(child) = ElementRef::wrap(child) {
            write_element(child, out);
        }
        // comments and processing instructions are dropped
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if DROPPED_ELEMENTS.contains(&name) {
        return;
    }

    let keep = SAFE_ELEMENTS.contains(&name);
    if keep {
        out.push('<');
        out.push_str(name);
        for (attribute, value) in element.value().attrs() {
            let safe = SAFE_ATTRIBUTES.contains(&attribute)
                || (attribute == "href" && name == "a" && is_web_link(value));
            if safe {
                out.push_str(&format!(" {}=\"{}\"", attribute, escape(value)));
            }
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&name) {
            return;
        }
    }

    write_children(element, out);

    if keep {
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

fn is_web_link(href: &str) -> bool {
    match url::Url::parse(href.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "mailto"),
        Err(_) => false,
    }
}

//! Streaming HTML reference rewriting
//!
//! Pages are rewritten as they stream through `lol_html`: each matched
//! element/attribute pair is offered to a sink, which admits the URL to the
//! crawl and answers with the local form to write back. A sink answering
//! `None` leaves the attribute untouched.

use std::cell::RefCell;

use lol_html::html_content::Element;
use lol_html::{element, rewrite_str, HandlerResult, RewriteStrSettings};

/// Receives every URL found in a page and answers with its rewritten form.
pub trait UrlRewrite {
    /// Admits a raw reference and returns the replacement attribute value,
    /// or `None` to leave the attribute unchanged.
    fn rewrite_url(&mut self, raw: &str) -> Option<String>;
}

fn rewrite_attribute<S: UrlRewrite>(
    el: &mut Element,
    attribute: &str,
    sink: &RefCell<S>,
) -> HandlerResult {
    if let Some(value) = el.get_attribute(attribute) {
        if let Some(replacement) = sink.borrow_mut().rewrite_url(&value) {
            el.set_attribute(attribute, &replacement)?;
        }
    }
    Ok(())
}

/// Rewrites a `srcset` value: comma-separated `url descriptor` pairs, each
/// URL pushed through the sink. Parts without a descriptor are dropped.
pub fn rewrite_srcset<S: UrlRewrite>(value: &str, sink: &mut S) -> String {
    let mut parts = Vec::new();

    for part in value.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let Some((url, descriptor)) = part.split_once(' ') else {
            continue;
        };

        let url = url.trim();
        let descriptor = descriptor.trim();
        match sink.rewrite_url(url) {
            Some(replacement) => parts.push(format!("{} {}", replacement, descriptor)),
            None => parts.push(format!("{} {}", url, descriptor)),
        }
    }

    parts.join(",")
}

/// Streams a page through the attribute rewriter.
///
/// Handled references: `a[href]`, `link[href]`, `img[src]`, `script[src]`,
/// `iframe[src]`, `source[src]`, and `img[srcset]`. A rewriter failure
/// falls back to the original document so a malformed page never aborts
/// the crawl.
pub fn rewrite_html<S: UrlRewrite>(html: &str, sink: &RefCell<S>) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("a[href]", |el| rewrite_attribute(el, "href", sink)),
                element!("link[href]", |el| rewrite_attribute(el, "href", sink)),
                element!("img[src]", |el| rewrite_attribute(el, "src", sink)),
                element!("script[src]", |el| rewrite_attribute(el, "src", sink)),
                element!("iframe[src]", |el| rewrite_attribute(el, "src", sink)),
                element!("source[src]", |el| rewrite_attribute(el, "src", sink)),
                element!("img[srcset]", |el| {
                    if let Some(value) = el.get_attribute("srcset") {
                        let replacement = rewrite_srcset(&value, &mut *sink.borrow_mut());
                        el.set_attribute("srcset", &replacement)?;
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    );

    match result {
        Ok(rewritten) => rewritten,
        Err(error) => {
            tracing::warn!("HTML rewrite failed, keeping original body: {}", error);
            html.to_string()
        }
    }
}

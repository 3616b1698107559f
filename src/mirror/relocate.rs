//! Relocatable URL construction
//!
//! The mirror tree must open via `file://` without a web server, so every
//! rewritten reference becomes a relative path that climbs out of the
//! current page's directory and back down to the target file.

/// Cuts the query and fragment off a URL string.
pub fn strip_query_and_fragment(url: &str) -> &str {
    let url = url.split('?').next().unwrap_or(url);
    url.split('#').next().unwrap_or(url)
}

/// Applies the directory/index convention used throughout the mirror:
/// a trailing `/` gains `index.html`, and an extension-less final segment
/// gains `/index.html`.
pub fn apply_index_convention(url: &str) -> String {
    if url.ends_with('/') {
        return format!("{}index.html", url);
    }

    let last_segment = url.rsplit('/').next().unwrap_or("");
    if !last_segment.contains('.') {
        return format!("{}/index.html", url);
    }

    url.to_string()
}

/// Strips the output origin and one following slash, yielding the
/// root-relative form of an in-scope URL.
fn strip_origin(url: &str, origin: &str) -> Option<String> {
    let rest = url.strip_prefix(origin)?;
    Some(rest.strip_prefix('/').unwrap_or(rest).to_string())
}

/// Builds the on-disk form of a URL as referenced from `current_page`.
///
/// The target has its query and fragment removed and the index convention
/// applied, then the origin stripped. When `relocatable` is set, one `../`
/// per directory containing the current page's own file is prepended so
/// the reference resolves from the page's directory regardless of where
/// the mirror root sits.
///
/// URLs outside the output origin are returned with only the query/fragment
/// strip and index convention applied.
pub fn filesystem_url(url: &str, current_page: &str, origin: &str, relocatable: bool) -> String {
    let trimmed = strip_query_and_fragment(url);
    let resolved = apply_index_convention(trimmed);

    let target = match strip_origin(&resolved, origin) {
        Some(path) => path,
        None => return resolved,
    };

    if !relocatable {
        return target;
    }

    let page = match strip_origin(strip_query_and_fragment(current_page), origin) {
        Some(path) => path,
        None => return target,
    };

    if page.is_empty() || page == target {
        return target;
    }

    // Climb out of the directory the page's file actually lives in: the
    // index convention decides whether the page's final segment is a
    // directory (`about` -> `about/index.html`) or a flat file
    // (`post.html` stays beside its siblings).
    let page_file = apply_index_convention(&page);
    let depth = page_file.split('/').count() - 1;

    let mut relative = String::with_capacity(3 * depth + target.len());
    for _ in 0..depth {
        relative.push_str("../");
    }
    relative.push_str(&target);
    relative
}

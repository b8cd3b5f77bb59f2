//! Pagination envelope assembly with `next`/`previous` links.

use axum::http::Uri;
use jobgrid_models::{Page, PageRequest};
use serde::Serialize;

/// Slice a full ordered result set into a page and attach neighbour URLs
/// derived from the request URI (same path and query, `page` rewritten).
///
/// Handlers nested under a path prefix must pass the `OriginalUri`, not
/// the prefix-stripped one, or the links will not resolve.
pub fn paginate<T: Serialize>(items: Vec<T>, req: PageRequest, uri: &Uri) -> Page<T> {
    let mut page = Page::slice(items, req.page, req.per_page);
    if page.has_next(req.page, req.per_page) {
        page.next = Some(page_url(uri, req.page + 1));
    }
    if req.page > 1 {
        page.previous = Some(page_url(uri, req.page - 1));
    }
    page
}

/// Rebuild the request URI with the `page` query parameter replaced.
fn page_url(uri: &Uri, page: usize) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut saw_page = false;
    if let Some(query) = uri.query() {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == "page" {
                saw_page = true;
                serializer.append_pair("page", &page.to_string());
            } else {
                serializer.append_pair(&key, &value);
            }
        }
    }
    if !saw_page {
        serializer.append_pair("page", &page.to_string());
    }
    format!("{}?{}", uri.path(), serializer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_preserve_query() {
        let uri: Uri = "/api/jobs/?job_title=rust&page=2&jobs_per_page=10"
            .parse()
            .unwrap();
        let items: Vec<u32> = (0..35).collect();
        let page = paginate(items, PageRequest::new(2, 10), &uri);

        assert_eq!(page.count, 35);
        assert_eq!(page.results.len(), 10);
        let next = page.next.unwrap();
        assert!(next.contains("page=3"));
        assert!(next.contains("job_title=rust"));
        let previous = page.previous.unwrap();
        assert!(previous.contains("page=1"));
    }

    #[test]
    fn test_first_and_last_pages_have_no_dangling_links() {
        let uri: Uri = "/api/jobs/".parse().unwrap();
        let items: Vec<u32> = (0..5).collect();

        let page = paginate(items.clone(), PageRequest::new(1, 10), &uri);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());

        // Past-the-end page: empty results, correct count
        let page = paginate(items, PageRequest::new(3, 10), &uri);
        assert_eq!(page.count, 5);
        assert!(page.results.is_empty());
    }
}

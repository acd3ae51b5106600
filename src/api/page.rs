//! Purpose: Cursor pagination over list endpoints.
//! Exports: `ListRequest`, `ListResponse`, `Page`, `AutoPager`.
//! Role: Wraps one decoded list body and knows how to ask for the next one.
//! Invariants: A page is exhausted iff its `next_cursor` is null, absent or empty.
//! Invariants: Exhausted is terminal; `next_page` then returns `Ok(None)` without I/O.
//! Invariants: Follow-up requests reuse path and filters, replacing only `cursor`.
//! Notes: Strictly forward and pull-based; nothing is cached or prefetched.
#![allow(clippy::result_large_err)]

use super::client::{ApiResult, Client};
use crate::core::decode::{self, Decode, DecodeResult, ObjectDecoder};
use crate::core::meta::Metadata;
use serde_json::value::RawValue;
use std::collections::VecDeque;
use std::fmt;

const CURSOR_PARAM: &str = "cursor";

/// A list endpoint plus the filters to reissue it with.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ListRequest {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl ListRequest {
    pub fn new(segments: &[&str]) -> Self {
        Self {
            segments: segments.iter().map(|segment| segment.to_string()).collect(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_optional_query(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.with_query(key, value.to_string()),
            None => self,
        }
    }

    pub fn with_cursor(&self, cursor: &str) -> Self {
        let mut next = self.clone();
        next.query.retain(|(key, _)| key != CURSOR_PARAM);
        next.query.push((CURSOR_PARAM.to_string(), cursor.to_string()));
        next
    }

    pub fn segments(&self) -> Vec<&str> {
        self.segments.iter().map(String::as_str).collect()
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }
}

/// The `{"data": [...], "next_cursor": ...}` envelope.
#[derive(Clone, Debug)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<String>,
    pub meta: Metadata,
}

impl<T> ListResponse<T> {
    pub fn cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|cursor| !cursor.is_empty())
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor().is_none()
    }
}

impl<T: Decode> Decode for ListResponse<T> {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            data: object.required("data")?,
            next_cursor: object.optional("next_cursor")?,
            meta: object.finish(),
        })
    }
}

pub struct Page<T> {
    client: Client,
    request: ListRequest,
    response: ListResponse<T>,
}

impl<T: fmt::Debug> fmt::Debug for Page<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("request", &self.request)
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

impl<T: Decode> Page<T> {
    pub(crate) fn fetch(client: Client, request: ListRequest) -> ApiResult<Self> {
        let (status, body) = client.fetch_list_body(&request)?;
        let response: ListResponse<T> =
            decode::from_str(&body).map_err(|err| err.with_status(status))?;
        tracing::debug!(
            path = %request.segments().join("/"),
            items = response.data.len(),
            exhausted = response.is_exhausted(),
            "fetched page"
        );
        Ok(Self {
            client,
            request,
            response,
        })
    }

    /// Fetches the page after this one, or `None` once the chain is exhausted.
    pub fn next_page(&self) -> ApiResult<Option<Page<T>>> {
        let Some(cursor) = self.response.cursor() else {
            return Ok(None);
        };
        let request = self.request.with_cursor(cursor);
        Page::fetch(self.client.clone(), request).map(Some)
    }

    /// Iterates this page and every later one.
    pub fn into_auto_pager(self) -> AutoPager<T> {
        let next = match self.response.cursor() {
            Some(cursor) => PagerState::Next(self.request.with_cursor(cursor)),
            None => PagerState::Exhausted,
        };
        AutoPager {
            client: self.client,
            state: next,
            buffer: self.response.data.into(),
            current: None,
        }
    }
}

impl<T> Page<T> {
    pub fn items(&self) -> &[T] {
        &self.response.data
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.response.data.get(index)
    }

    pub fn len(&self) -> usize {
        self.response.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.response.data.is_empty()
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.response.cursor()
    }

    pub fn has_next_page(&self) -> bool {
        !self.response.is_exhausted()
    }

    pub fn request(&self) -> &ListRequest {
        &self.request
    }

    pub fn meta(&self) -> &Metadata {
        &self.response.meta
    }

    pub fn into_items(self) -> Vec<T> {
        self.response.data
    }
}

enum PagerState {
    Next(ListRequest),
    Exhausted,
}

/// Pull-based iteration over every item of a list, page by page.
///
/// Use either `advance` + `current`, or the `Iterator` impl; both consume the
/// same underlying stream.
pub struct AutoPager<T> {
    client: Client,
    state: PagerState,
    buffer: VecDeque<T>,
    current: Option<T>,
}

impl<T: Decode> AutoPager<T> {
    pub(crate) fn new(client: Client, request: ListRequest) -> Self {
        Self {
            client,
            state: PagerState::Next(request),
            buffer: VecDeque::new(),
            current: None,
        }
    }

    /// Moves to the next item, fetching pages as needed. Returns `false` at the end.
    pub fn advance(&mut self) -> ApiResult<bool> {
        self.fill()?;
        self.current = self.buffer.pop_front();
        Ok(self.current.is_some())
    }

    /// The item at the iteration position, set by the last `advance`.
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.buffer.is_empty() && matches!(self.state, PagerState::Exhausted)
    }

    /// Fetches until an item is buffered or the chain ends; empty pages are skipped.
    fn fill(&mut self) -> ApiResult<()> {
        while self.buffer.is_empty() {
            let PagerState::Next(request) = &self.state else {
                return Ok(());
            };
            let page = Page::<T>::fetch(self.client.clone(), request.clone())?;
            self.state = match page.response.cursor() {
                Some(cursor) => PagerState::Next(page.request.with_cursor(cursor)),
                None => PagerState::Exhausted,
            };
            self.buffer.extend(page.response.data);
        }
        Ok(())
    }
}

impl<T: Decode> Iterator for AutoPager<T> {
    type Item = ApiResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(err) = self.fill() {
            self.state = PagerState::Exhausted;
            return Some(Err(err));
        }
        self.buffer.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::{AutoPager, ListRequest, ListResponse, Page};
    use crate::api::client::Client;
    use crate::api::transport::{Request, Response, Transport};
    use crate::core::decode::{self, Decode, DecodeResult, ObjectDecoder};
    use crate::core::error::{Error, ErrorKind};
    use serde_json::value::RawValue;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct Item {
        id: String,
    }

    impl Decode for Item {
        const EXPECTED: &'static str = "object";

        fn decode(raw: &RawValue) -> DecodeResult<Self> {
            let mut object = ObjectDecoder::new(raw)?;
            let id = object.required("id")?;
            let _ = object.finish();
            Ok(Self { id })
        }
    }

    /// Serves list bodies keyed by the request's `cursor` value ("" for none).
    struct Pages {
        bodies: HashMap<String, String>,
        seen: Mutex<Vec<Request>>,
    }

    impl Pages {
        fn new(bodies: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                bodies: bodies
                    .iter()
                    .map(|(cursor, body)| (cursor.to_string(), body.to_string()))
                    .collect(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn cursors(&self) -> Vec<Option<String>> {
            self.seen
                .lock()
                .expect("lock")
                .iter()
                .map(|request| request.query_value("cursor"))
                .collect()
        }
    }

    impl Transport for Pages {
        fn execute(&self, request: &Request) -> Result<Response, Error> {
            self.seen.lock().expect("lock").push(request.clone());
            let cursor = request.query_value("cursor").unwrap_or_default();
            match self.bodies.get(&cursor) {
                Some(body) => Ok(Response::new(200, body.clone())),
                None => Ok(Response::new(
                    404,
                    r#"{"status":404,"type":"object_not_found_error","title":"no page"}"#,
                )),
            }
        }
    }

    fn client(pages: &Arc<Pages>) -> Client {
        Client::new("test_key")
            .with_base_url("http://127.0.0.1:9")
            .expect("base url")
            .with_transport(pages.clone())
            .with_max_retries(0)
    }

    const FIRST: &str = r#"{"data":[{"id":"a"},{"id":"b"},{"id":"c"}],"next_cursor":"cur_abc"}"#;
    const LAST: &str = r#"{"data":[{"id":"d"},{"id":"e"}],"next_cursor":null}"#;

    #[test]
    fn next_page_embeds_cursor_and_terminates() {
        let pages = Pages::new(&[("", FIRST), ("cur_abc", LAST)]);
        let client = client(&pages);
        let request = ListRequest::new(&["accounts"]).with_query("limit", "3");

        let first: Page<Item> = client.list(request).expect("first");
        assert_eq!(first.len(), 3);
        assert!(first.has_next_page());
        assert_eq!(first.next_cursor(), Some("cur_abc"));

        let second = first.next_page().expect("second").expect("page");
        assert_eq!(second.items()[0].id, "d");
        assert_eq!(second.len(), 2);
        assert!(!second.has_next_page());
        assert!(
            second
                .request()
                .query()
                .contains(&("limit".to_string(), "3".to_string()))
        );

        assert!(second.next_page().expect("end").is_none());
        assert_eq!(
            pages.cursors(),
            vec![None, Some("cur_abc".to_string())],
            "exhausted page must not issue another request"
        );
    }

    #[test]
    fn empty_list_is_exhausted() {
        let pages = Pages::new(&[("", r#"{"data": [], "next_cursor": null}"#)]);
        let page: Page<Item> = client(&pages).list(ListRequest::new(&["accounts"])).expect("page");
        assert!(page.is_empty());
        assert!(!page.has_next_page());
        assert!(page.next_page().expect("next").is_none());
    }

    #[test]
    fn undecodable_page_keeps_status_and_item_path() {
        let pages = Pages::new(&[("", r#"{"data":[{"name":"no id"}],"next_cursor":null}"#)]);
        let err = client(&pages)
            .list::<Item>(ListRequest::new(&["accounts"]))
            .expect_err("decode failure");
        assert_eq!(err.kind(), ErrorKind::MissingField);
        assert_eq!(err.field(), Some("data[0].id"));
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn page_debug_shows_request_and_items() {
        let pages = Pages::new(&[("", LAST)]);
        let page: Page<Item> = client(&pages).list(ListRequest::new(&["accounts"])).expect("page");
        let rendered = format!("{page:?}");
        assert!(rendered.starts_with("Page {"));
        assert!(rendered.contains("accounts"));
        assert!(rendered.contains("\"d\""));
        assert!(!rendered.contains("test_key"));
    }

    #[test]
    fn empty_cursor_string_counts_as_exhausted() {
        let response: ListResponse<Item> =
            decode::from_str(r#"{"data": [{"id": "x"}], "next_cursor": ""}"#).expect("decode");
        assert!(response.is_exhausted());
        assert_eq!(response.cursor(), None);
    }

    #[test]
    fn cursor_replaces_previous_cursor() {
        let request = ListRequest::new(&["transactions"])
            .with_query("cursor", "old")
            .with_query("account_id", "account_1");
        let next = request.with_cursor("new");
        assert_eq!(
            next.query(),
            &[
                ("account_id".to_string(), "account_1".to_string()),
                ("cursor".to_string(), "new".to_string()),
            ]
        );
    }

    #[test]
    fn auto_pager_walks_every_item_with_current() {
        let pages = Pages::new(&[("", FIRST), ("cur_abc", LAST)]);
        let mut pager: AutoPager<Item> =
            client(&pages).list_auto_paging(ListRequest::new(&["accounts"]));

        assert!(pager.current().is_none());
        let mut ids = Vec::new();
        while pager.advance().expect("advance") {
            ids.push(pager.current().expect("current").id.clone());
        }
        assert_eq!(ids, ["a", "b", "c", "d", "e"]);
        assert!(pager.current().is_none());
        assert!(pager.is_exhausted());
    }

    #[test]
    fn auto_pager_skips_empty_intermediate_pages() {
        let pages = Pages::new(&[
            ("", r#"{"data":[],"next_cursor":"cur_1"}"#),
            ("cur_1", r#"{"data":[{"id":"z"}],"next_cursor":null}"#),
        ]);
        let items = client(&pages)
            .list_auto_paging::<Item>(ListRequest::new(&["accounts"]))
            .collect::<Result<Vec<_>, _>>()
            .expect("items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "z");
    }

    #[test]
    fn iterator_stops_after_fetch_error() {
        let pages = Pages::new(&[("", r#"{"data":[{"id":"a"}],"next_cursor":"gone"}"#)]);
        let mut pager = client(&pages).list_auto_paging::<Item>(ListRequest::new(&["accounts"]));

        assert_eq!(pager.next().expect("first").expect("item").id, "a");
        let err = pager.next().expect("second").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(pager.next().is_none());
    }

    #[test]
    fn page_converts_into_auto_pager() {
        let pages = Pages::new(&[("", FIRST), ("cur_abc", LAST)]);
        let page: Page<Item> = client(&pages).list(ListRequest::new(&["accounts"])).expect("page");
        let ids = page
            .into_auto_pager()
            .map(|item| item.map(|item| item.id))
            .collect::<Result<Vec<_>, _>>()
            .expect("ids");
        assert_eq!(ids, ["a", "b", "c", "d", "e"]);
        assert_eq!(pages.cursors().len(), 2);
    }
}

//! Paginated retrieval of upstream JSON records.
//!
//! This module is the Fetcher stage of the pipeline. It knows nothing about
//! the shape of individual records; it only moves pages of
//! [`serde_json::Value`]s from an endpoint into memory.
//!
//! # Architecture
//!
//! - [`PageSource`]: core trait, "give me the page described by this query"
//! - [`HttpPager`]: reqwest-backed implementation for APIs that wrap each
//!   page in an object key (openFDA uses `results`)
//! - [`paginate`]: turns any [`PageSource`] into a lazy stream of batches
//! - [`collect_with_fallback`]: filtered query first, unfiltered "latest"
//!   query when the filtered one produced nothing
//!
//! # Termination
//!
//! A stream ends after an empty batch, a short batch (fewer items than
//! requested), once `max_records` is reached, or right after yielding a
//! [`FetchError`]. Batches are separated by a fixed delay.

use crate::error::FetchError;
use crate::utils::truncate_for_log;
use futures::stream::{self, Stream, StreamExt};
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// One page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: usize,
    pub skip: usize,
    /// Upstream search expression; `None` asks for the latest records.
    pub search: Option<String>,
}

/// Page size, record cap and inter-request delay for one pagination run.
#[derive(Debug, Clone, Copy)]
pub struct PagePlan {
    pub limit: usize,
    pub max_records: usize,
    pub delay: Duration,
}

/// Anything that can serve a page of raw records.
pub trait PageSource {
    /// Fetch the records described by `query`.
    ///
    /// An empty vector means the upstream has nothing more to give.
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<Value>, FetchError>;
}

/// [`PageSource`] over an HTTP endpoint speaking `limit`/`skip`/`search`.
#[derive(Debug)]
pub struct HttpPager<'a> {
    pub client: &'a Client,
    pub endpoint: &'a str,
    /// Key of the array holding the records in each response object.
    pub results_key: &'static str,
}

impl PageSource for HttpPager<'_> {
    #[instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint, skip = query.skip))]
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<Value>, FetchError> {
        let mut params = vec![
            ("limit", query.limit.to_string()),
            ("skip", query.skip.to_string()),
        ];
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }

        let mut body = get_json(self.client, self.endpoint, &params, &[]).await?;
        let batch = match body.get_mut(self.results_key).map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => {
                warn!(key = self.results_key, "Response has no results array; treating as empty");
                Vec::new()
            }
        };
        debug!(count = batch.len(), "Fetched page");
        Ok(batch)
    }
}

/// Single GET returning a parsed JSON body.
///
/// Non-2xx responses become [`FetchError::Status`]. Errors carry `url`
/// without its query string and transport errors have their own copy of the
/// request URL stripped, so credentials passed in `params` never reach the
/// logs.
#[instrument(level = "info", skip(client, params, headers))]
pub async fn get_json(
    client: &Client,
    url: &str,
    params: &[(&str, String)],
    headers: &[(&str, &str)],
) -> Result<Value, FetchError> {
    let t0 = Instant::now();
    let mut request = client.get(url).query(params);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = request.send().await.map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source: source.without_url(),
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(
            status = status.as_u16(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            body = %truncate_for_log(&body, 300),
            "Upstream returned an error status"
        );
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let bytes = response.bytes().await.map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source: source.without_url(),
    })?;
    debug!(
        bytes = bytes.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Fetched JSON"
    );
    serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}

struct PageCursor {
    skip: usize,
    done: bool,
}

/// Lazily walk the pages of `source`.
///
/// Each item is one non-empty batch. A failed request is yielded once as
/// `Err` and ends the stream; whether that is fatal is the caller's call.
pub fn paginate<'a, S: PageSource>(
    source: &'a S,
    search: Option<String>,
    plan: PagePlan,
) -> impl Stream<Item = Result<Vec<Value>, FetchError>> + 'a {
    stream::unfold(PageCursor { skip: 0, done: false }, move |mut cursor| {
        let search = search.clone();
        async move {
            if cursor.done || cursor.skip >= plan.max_records || plan.limit == 0 {
                return None;
            }
            if cursor.skip > 0 {
                sleep(plan.delay).await;
            }

            let limit = plan.limit.min(plan.max_records - cursor.skip);
            let query = PageQuery {
                limit,
                skip: cursor.skip,
                search,
            };
            match source.fetch_page(&query).await {
                Err(e) => {
                    cursor.done = true;
                    Some((Err(e), cursor))
                }
                Ok(batch) if batch.is_empty() => None,
                Ok(batch) => {
                    if batch.len() < limit {
                        cursor.done = true;
                    }
                    cursor.skip += limit;
                    Some((Ok(batch), cursor))
                }
            }
        }
    })
}

/// Drain a page stream, returning every record received and the error that
/// stopped it, if any.
pub async fn collect_pages<St>(pages: St) -> (Vec<Value>, Option<FetchError>)
where
    St: Stream<Item = Result<Vec<Value>, FetchError>>,
{
    let mut pages = std::pin::pin!(pages);
    let mut records = Vec::new();
    while let Some(page) = pages.next().await {
        match page {
            Ok(batch) => records.extend(batch),
            Err(e) => return (records, Some(e)),
        }
    }
    (records, None)
}

/// Fetch with `search`, falling back to the unfiltered latest records when
/// the filtered query produced nothing.
///
/// A failure after some records arrived keeps the partial result. The only
/// error returned is one from the fallback query when it, too, yielded no
/// records.
#[instrument(level = "info", skip(source, plan, fallback))]
pub async fn collect_with_fallback<S: PageSource>(
    source: &S,
    search: &str,
    plan: PagePlan,
    fallback: PagePlan,
) -> Result<Vec<Value>, FetchError> {
    let t0 = Instant::now();
    let (records, err) = collect_pages(paginate(source, Some(search.to_string()), plan)).await;

    if !records.is_empty() {
        if let Some(e) = err {
            warn!(error = %e, kept = records.len(), "Filtered fetch stopped early; keeping partial results");
        }
        info!(
            count = records.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Filtered fetch complete"
        );
        return Ok(records);
    }

    match err {
        Some(e) => warn!(error = %e, "Filtered fetch failed; falling back to latest"),
        None => warn!("Filtered fetch returned no records; falling back to latest"),
    }

    let (records, err) = collect_pages(paginate(source, None, fallback)).await;
    match err {
        Some(e) if records.is_empty() => Err(e),
        Some(e) => {
            warn!(error = %e, kept = records.len(), "Latest fetch stopped early; keeping partial results");
            Ok(records)
        }
        None => {
            info!(
                count = records.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Latest fetch complete"
            );
            Ok(records)
        }
    }
}

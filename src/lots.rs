use std::{collections::HashSet, time::Duration};

use crate::{error::FetchError, Listing, Target};

mod data;
pub use data::LotsPage;

/// Number of lots requested per page
pub const PAGE_LIMIT: usize = 100;

/// The `startTime`s of every lot seen so far, never pruned
#[derive(Debug, Default)]
pub struct KnownKeys {
    keys: HashSet<String>,
}

impl KnownKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, start_time: &str) -> bool {
        self.keys.contains(start_time)
    }

    /// Returns false if the key was already known
    pub fn insert(&mut self, start_time: String) -> bool {
        self.keys.insert(start_time)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// The result of one paginated pass over the lots endpoint
#[derive(Debug)]
pub struct Cycle {
    /// Lots not seen in any earlier cycle, in arrival order
    pub lots: Vec<Listing>,
    pub pages: usize,
    pub skipped: usize,
    /// Why the cycle ended before the last page, if it did
    pub stopped: Option<FetchError>,
}

pub struct Client {
    req_client: reqwest::Client,
    base_url: String,
    token: String,
}

impl Client {
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let req_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            req_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: api_token.into(),
        })
    }

    #[tracing::instrument(skip(self, target), fields(target = %target))]
    pub async fn load_page(&self, target: &Target, offset: usize) -> Result<LotsPage, FetchError> {
        let url = format!(
            "{}/{}/auction/{}/lots",
            self.base_url, target.region, target.item_id
        );

        let resp = self
            .req_client
            .get(&url)
            .query(&[("offset", offset), ("limit", PAGE_LIMIT)])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let raw_content = resp.bytes().await.map_err(FetchError::Body)?;

        let page: LotsPage = serde_json::from_slice(&raw_content)?;
        tracing::trace!(lots = page.lots.len(), total = ?page.total, "Loaded Page");

        Ok(page)
    }

    /// Pages through every lot of the target, keeping only the ones whose
    /// `startTime` is not in `known` yet.
    ///
    /// Any failure ends the cycle with whatever was collected up to that
    /// point, the next cycle is the retry.
    #[tracing::instrument(skip(self, target, known), fields(target = %target))]
    pub async fn fetch(&self, target: &Target, known: &mut KnownKeys) -> Cycle {
        let mut cycle = Cycle {
            lots: Vec::new(),
            pages: 0,
            skipped: 0,
            stopped: None,
        };

        let mut offset = 0;
        loop {
            cycle.pages += 1;

            let page = match self.load_page(target, offset).await {
                Ok(p) => p,
                Err(e) => {
                    tracing::error!(offset, "Loading Lots {}", e);
                    cycle.stopped = Some(e);
                    break;
                }
            };

            let count = page.lots.len();
            for lot in page.lots {
                if known.contains(&lot.start_time) {
                    cycle.skipped += 1;
                    continue;
                }

                known.insert(lot.start_time.clone());
                cycle.lots.push(lot);
            }

            tracing::debug!(offset, count, "Processed Page");

            if count < PAGE_LIMIT {
                break;
            }
            offset += PAGE_LIMIT;
        }

        cycle
    }
}

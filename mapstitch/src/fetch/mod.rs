//! Concurrent tile fetching.
//!
//! One batch per stitch: every tile of the grid gets a task on a `JoinSet`,
//! at most `max_concurrent` of them talk to the network at once (a semaphore
//! gates the HTTP call), and results are only looked at after every task has
//! settled. Nothing is retried and nothing is cancelled.
//!
//! Each task carries its `(slot, tile, url)` triple, so the mapping from a
//! response back to its grid cell never depends on completion order.
//!
//! Failure handling per tile:
//! - validator [`ValidationError::Reject`] → slot left empty
//! - validator-approved but not a 200 with a body → slot left empty
//! - undecodable body → slot left empty
//! - validator [`ValidationError::Abort`] → whole batch fails with
//!   [`StitchError::Validation`] once all tasks have finished

mod validator;

pub use validator::{DefaultValidator, TileValidator, ValidationError};

use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use crate::coord::TileCoord;
use crate::error::StitchError;
use crate::grid::TileGrid;
use crate::provider::{build_urls, AsyncHttpClient, ProviderTemplate};

/// One tile to fetch, tied to its slot in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    pub slot: usize,
    pub tile: TileCoord,
    pub url: String,
}

/// A decoded tile, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct TileImage {
    pub tile: TileCoord,
    pub url: String,
    pub image: DynamicImage,
}

/// Write-once result cell: `None` means the tile is absent.
pub type FetchSlot = Option<TileImage>;

/// Pairs every grid tile with its URL, in slot order.
pub fn plan_requests(grid: &TileGrid, template: &ProviderTemplate) -> Vec<TileRequest> {
    let urls = build_urls(template, grid.tiles());
    grid.tiles()
        .iter()
        .zip(urls)
        .enumerate()
        .map(|(slot, (tile, url))| TileRequest {
            slot,
            tile: *tile,
            url,
        })
        .collect()
}

enum TileOutcome {
    Image(TileImage),
    Absent,
    Abort { url: String, message: String },
}

/// Fetches and decodes tile batches.
pub struct TileFetcher<C, V> {
    client: Arc<C>,
    validator: Arc<V>,
    max_concurrent: usize,
}

impl<C, V> Clone for TileFetcher<C, V> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            validator: Arc::clone(&self.validator),
            max_concurrent: self.max_concurrent,
        }
    }
}

impl<C, V> TileFetcher<C, V>
where
    C: AsyncHttpClient + 'static,
    V: TileValidator + 'static,
{
    pub fn new(client: Arc<C>, validator: Arc<V>, max_concurrent: usize) -> Self {
        Self {
            client,
            validator,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Fetches every request and returns one slot per request, indexed by
    /// `TileRequest::slot`.
    ///
    /// Returns an error only if the validator aborts the batch (reported for
    /// the lowest aborted slot) or if the slot indices are not a permutation
    /// of `0..requests.len()`.
    #[instrument(skip_all, fields(tiles = requests.len()))]
    pub async fn fetch_all(&self, requests: Vec<TileRequest>) -> Result<Vec<FetchSlot>, StitchError> {
        check_slots(&requests)?;

        let started = Instant::now();
        let total = requests.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for request in requests {
            let client = Arc::clone(&self.client);
            let validator = Arc::clone(&self.validator);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let slot = request.slot;
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (slot, TileOutcome::Absent);
                };
                let outcome = fetch_one(client.as_ref(), validator.as_ref(), request).await;
                (slot, outcome)
            });
        }

        let mut slots: Vec<FetchSlot> = (0..total).map(|_| None).collect();
        let mut aborts: Vec<(usize, String, String)> = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, TileOutcome::Image(image))) => slots[slot] = Some(image),
                Ok((_, TileOutcome::Absent)) => {}
                Ok((slot, TileOutcome::Abort { url, message })) => {
                    aborts.push((slot, url, message));
                }
                Err(join_err) => {
                    warn!(error = %join_err, "Tile fetch task panicked");
                }
            }
        }

        let present = slots.iter().filter(|s| s.is_some()).count();
        debug!(
            present,
            absent = total - present,
            aborted = aborts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetching tiles complete"
        );

        if let Some((_, url, message)) = aborts.into_iter().min_by_key(|(slot, _, _)| *slot) {
            return Err(StitchError::Validation { url, message });
        }

        Ok(slots)
    }
}

async fn fetch_one<C, V>(client: &C, validator: &V, request: TileRequest) -> TileOutcome
where
    C: AsyncHttpClient,
    V: TileValidator,
{
    let started = Instant::now();
    let outcome = client.get(&request.url).await;
    debug!(
        url = %request.url,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Tile request settled"
    );

    match validator.validate(&request.url, &outcome) {
        Ok(()) => {}
        Err(ValidationError::Reject(reason)) => {
            warn!(url = %request.url, tile = %request.tile, reason = %reason, "Tile rejected");
            return TileOutcome::Absent;
        }
        Err(ValidationError::Abort(message)) => {
            warn!(url = %request.url, tile = %request.tile, reason = %message, "Tile aborted batch");
            return TileOutcome::Abort {
                url: request.url,
                message,
            };
        }
    }

    // Accepted by the validator, but no image data to use
    let response = match outcome {
        Ok(response) if response.status == 200 && !response.body.is_empty() => response,
        _ => return TileOutcome::Absent,
    };

    match image::load_from_memory(&response.body) {
        Ok(image) => TileOutcome::Image(TileImage {
            tile: request.tile,
            url: request.url,
            image,
        }),
        Err(e) => {
            let err = StitchError::Decode {
                url: request.url,
                message: e.to_string(),
            };
            warn!(tile = %request.tile, error = %err, "Tile left empty");
            TileOutcome::Absent
        }
    }
}

fn check_slots(requests: &[TileRequest]) -> Result<(), StitchError> {
    let mut seen = vec![false; requests.len()];
    for request in requests {
        match seen.get_mut(request.slot) {
            Some(taken) if !*taken => *taken = true,
            _ => {
                return Err(StitchError::InternalInvariant(format!(
                    "tile {} has slot {} outside 0..{} or shared with another tile",
                    request.tile,
                    request.slot,
                    requests.len()
                )))
            }
        }
    }
    Ok(())
}

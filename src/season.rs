//! Season selection with stale-load protection
//!
//! A dashboard re-loads standings whenever the selected season changes. Loads
//! take seconds because of request pacing, so a user switching seasons quickly
//! starts a new load while an older one is still running. [`SeasonView`] tags
//! every load with a generation number: starting a load cancels the previous
//! one, and a load that finishes after a newer one started is discarded
//! instead of overwriting newer state.

use futures::{Stream, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::pipeline::Pipeline;
use crate::provider::Provider;
use crate::standings::Standings;
use crate::{PaddockError, Result};

/// Standings of one season as published by a [`SeasonView`]
#[derive(Debug)]
pub struct SeasonSnapshot {
    pub year: u32,
    /// Load that produced this snapshot; increases with every selection
    pub generation: u64,
    pub standings: Standings,
}

/// Latest-selection-wins season loader
pub struct SeasonView<P> {
    pipeline: Pipeline<P>,
    generation: AtomicU64,
    in_flight: Mutex<CancellationToken>,
    published: watch::Sender<Option<Arc<SeasonSnapshot>>>,
}

impl<P: Provider> SeasonView<P> {
    pub fn new(pipeline: Pipeline<P>) -> Self {
        let (published, _) = watch::channel(None);
        Self {
            pipeline,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(CancellationToken::new()),
            published,
        }
    }

    pub fn pipeline(&self) -> &Pipeline<P> {
        &self.pipeline
    }

    /// Load `year` and publish its standings.
    ///
    /// Cancels any load still running. Returns [`PaddockError::Superseded`]
    /// when a later `select` call overtakes this one; the published snapshot
    /// is then left to the newer load.
    pub async fn select(&self, year: u32) -> Result<Arc<SeasonSnapshot>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            let previous = std::mem::replace(&mut *in_flight, token.clone());
            previous.cancel();
        }
        info!(year, generation, "Season selected");

        let standings = tokio::select! {
            _ = token.cancelled() => {
                debug!(year, generation, "Season load cancelled");
                return Err(PaddockError::Superseded { year, generation });
            }
            loaded = self.pipeline.season_standings(year) => loaded?,
        };

        let snapshot = Arc::new(SeasonSnapshot { year, generation, standings });
        let accepted = self.published.send_if_modified(|slot| {
            // Checked under the channel lock so publishes stay generation-ordered
            let newest = self.generation.load(Ordering::SeqCst) == generation;
            let newer_than_slot = slot.as_ref().is_none_or(|s| s.generation < generation);
            if newest && newer_than_slot {
                *slot = Some(Arc::clone(&snapshot));
                true
            } else {
                false
            }
        });

        if !accepted {
            debug!(year, generation, "Discarding stale season load");
            return Err(PaddockError::Superseded { year, generation });
        }

        info!(year, generation, drivers = snapshot.standings.drivers().len(), "Season published");
        Ok(snapshot)
    }

    /// Most recently published snapshot
    pub fn current(&self) -> Option<Arc<SeasonSnapshot>> {
        self.published.borrow().clone()
    }

    /// Receiver notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<SeasonSnapshot>>> {
        self.published.subscribe()
    }

    /// Published snapshots as a stream, starting with the current one if any
    pub fn updates(&self) -> impl Stream<Item = Arc<SeasonSnapshot>> + 'static {
        WatchStream::new(self.published.subscribe()).filter_map(|opt| async move { opt })
    }
}

impl<P> Drop for SeasonView<P> {
    fn drop(&mut self) {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner).cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipelineConfig;
    use crate::provider::Endpoint;
    use crate::providers::{Snapshot, SnapshotProvider};
    use crate::test_utils::{self, RecordingProvider};
    use std::time::Duration;

    fn two_seasons() -> Snapshot {
        let mut snapshot = test_utils::two_race_season();
        snapshot.meetings.push(test_utils::meeting(1201, 2025));
        snapshot.sessions.push(test_utils::session(20, 1201, "Race"));
        snapshot.drivers.push(test_utils::driver(81, 20, "Oscar PIASTRI", "McLaren"));
        snapshot.session_results.push(test_utils::result(81, 20, Some(1), 25.0));
        snapshot
    }

    #[tokio::test]
    async fn select_publishes_snapshot() {
        let pipeline =
            Pipeline::new(SnapshotProvider::new(two_seasons()), PipelineConfig::unpaced());
        let view = SeasonView::new(pipeline);
        let mut rx = view.subscribe();

        let snapshot = view.select(2024).await.unwrap();

        assert_eq!(snapshot.year, 2024);
        assert_eq!(snapshot.generation, 1);
        assert!(rx.has_changed().unwrap());
        let published = rx.borrow_and_update().clone().unwrap();
        assert_eq!(published.standings.drivers().len(), 3);
        assert_eq!(view.current().unwrap().year, 2024);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_selection_cancels_older_load() {
        // 2024 is slow to resolve, 2025 is fast
        let provider = RecordingProvider::new(SnapshotProvider::new(two_seasons()))
            .with_slow(Endpoint::Meetings { year: Some(2024) }, Duration::from_secs(10));
        let view = SeasonView::new(Pipeline::new(provider, PipelineConfig::unpaced()));

        let (older, newer) = tokio::join!(view.select(2024), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            view.select(2025).await
        });

        assert!(matches!(older, Err(PaddockError::Superseded { year: 2024, generation: 1 })));
        let newer = newer.unwrap();
        assert_eq!(newer.year, 2025);
        assert_eq!(view.current().unwrap().generation, 2);
        assert_eq!(view.current().unwrap().standings.drivers()[0].driver_number.0, 81);
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_snapshot() {
        let provider = RecordingProvider::new(SnapshotProvider::new(two_seasons()))
            .with_failure(Endpoint::Meetings { year: Some(2025) });
        let view = SeasonView::new(Pipeline::new(provider, PipelineConfig::unpaced()));

        view.select(2024).await.unwrap();
        let err = view.select(2025).await.unwrap_err();

        assert!(matches!(err, PaddockError::Status { .. }));
        assert_eq!(view.current().unwrap().year, 2024);
    }

    #[tokio::test]
    async fn updates_stream_yields_published_snapshots() {
        let pipeline =
            Pipeline::new(SnapshotProvider::new(two_seasons()), PipelineConfig::unpaced());
        let view = SeasonView::new(pipeline);
        let mut updates = Box::pin(view.updates());

        view.select(2025).await.unwrap();

        let first = updates.next().await.unwrap();
        assert_eq!(first.year, 2025);
    }
}

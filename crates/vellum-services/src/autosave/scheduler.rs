//! Debounced periodic autosave loop.
//!
//! The scheduler is one owned object: collaborators, cadence config, state,
//! and the timer task handle all live on the instance. `stop()` awaits the
//! timer task, so no save can fire after it returns. Save failures are
//! logged and never stop the timer; a full disk during editing must not
//! kill the safety net for when space frees up.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::autosave_target;
use super::snapshot::SnapshotProvider;
use crate::config::AutosaveConfig;

/// Collaborator that persists serialized snapshot bytes.
pub trait SnapshotSink: Send + Sync {
    fn write<'a>(&'a self, path: &'a Path, bytes: &'a [u8]) -> BoxFuture<'a, std::io::Result<()>>;
}

/// Production sink: plain filesystem writes, creating parent directories.
pub struct FsSink;

impl SnapshotSink for FsSink {
    fn write<'a>(&'a self, path: &'a Path, bytes: &'a [u8]) -> BoxFuture<'a, std::io::Result<()>> {
        Box::pin(async move {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, bytes).await
        })
    }
}

/// Live scheduler flags; a snapshot of this is exposed for the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerState {
    pub target_path: Option<PathBuf>,
    pub paused: bool,
    pub last_save_at: Option<DateTime<Utc>>,
    pub timer_active: bool,
}

enum SaveCause {
    Tick,
    Trigger,
}

struct Inner {
    sink: Arc<dyn SnapshotSink>,
    config: AutosaveConfig,
    provider: RwLock<Option<Arc<dyn SnapshotProvider>>>,
    state: RwLock<SchedulerState>,
}

struct TimerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

pub struct AutosaveScheduler {
    inner: Arc<Inner>,
    timer: Option<TimerHandle>,
}

impl AutosaveScheduler {
    pub fn new(sink: Arc<dyn SnapshotSink>, config: AutosaveConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                sink,
                config,
                provider: RwLock::new(None),
                state: RwLock::new(SchedulerState::default()),
            }),
            timer: None,
        }
    }

    /// Scheduler writing through the filesystem.
    pub fn with_fs_sink(config: AutosaveConfig) -> Self {
        Self::new(Arc::new(FsSink), config)
    }

    /// Arm the repeating timer. Restarting an armed scheduler replaces the
    /// previous timer deterministically.
    pub async fn start(
        &mut self,
        provider: Arc<dyn SnapshotProvider>,
        project_path: Option<&Path>,
    ) {
        self.stop().await;

        *self.inner.provider.write().await = Some(provider);
        let target = autosave_target(project_path);
        {
            let mut state = self.inner.state.write().await;
            state.target_path = Some(target.clone());
            state.timer_active = true;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let inner = Arc::clone(&self.inner);
        let period = self.inner.config.interval();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // the zeroth tick resolves immediately; the cadence starts one
            // period after start()
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        inner.save(SaveCause::Tick).await;
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        self.timer = Some(TimerHandle { shutdown_tx, task });
        info!("autosave armed, target {}", target.display());
    }

    /// Disarm the timer and clear state. No save fires after this returns.
    pub async fn stop(&mut self) {
        if let Some(TimerHandle { shutdown_tx, task }) = self.timer.take() {
            let _ = shutdown_tx.send(true);
            let _ = task.await;
        }
        *self.inner.provider.write().await = None;
        *self.inner.state.write().await = SchedulerState::default();
    }

    /// Suspend saves without touching the timer.
    pub async fn pause(&self) {
        self.inner.state.write().await.paused = true;
        debug!("autosave paused");
    }

    pub async fn resume(&self) {
        self.inner.state.write().await.paused = false;
        debug!("autosave resumed");
    }

    /// Save now, unless the last save is more recent than the debounce
    /// window, in which case this is a no-op.
    pub async fn trigger(&self) {
        self.inner.save(SaveCause::Trigger).await;
    }

    /// Recompute the write target (the project was saved under a new path).
    /// Timer cadence is untouched.
    pub async fn update_target_path(&self, project_path: Option<&Path>) {
        let target = autosave_target(project_path);
        let mut state = self.inner.state.write().await;
        if state.target_path.as_ref() != Some(&target) {
            debug!("autosave target now {}", target.display());
            state.target_path = Some(target);
        }
    }

    pub async fn state(&self) -> SchedulerState {
        self.inner.state.read().await.clone()
    }
}

impl Inner {
    async fn save(&self, cause: SaveCause) {
        // Reserve the save slot under the write lock: the paused flag,
        // debounce check, and last-save stamp are decided in one critical
        // section, so a tick and a trigger cannot both claim the same slot.
        let target = {
            let mut state = self.state.write().await;
            if state.paused {
                return;
            }
            let Some(target) = state.target_path.clone() else {
                return;
            };
            if let SaveCause::Trigger = cause {
                if let Some(last) = state.last_save_at {
                    let elapsed = Utc::now().signed_duration_since(last);
                    // a clock that went backwards counts as inside the window
                    let outside = elapsed
                        .to_std()
                        .map(|e| e >= self.config.debounce())
                        .unwrap_or(false);
                    if !outside {
                        debug!("trigger inside debounce window, skipping");
                        return;
                    }
                }
            }
            state.last_save_at = Some(Utc::now());
            target
        };

        let provider = match self.provider.read().await.clone() {
            Some(p) => p,
            None => return,
        };

        let snapshot = match provider.snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("snapshot provider failed: {err:#}");
                return;
            }
        };
        let bytes = match snapshot.to_json() {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("snapshot serialization failed: {}", err);
                return;
            }
        };

        match self.sink.write(&target, &bytes).await {
            Ok(()) => debug!("autosaved {} bytes to {}", bytes.len(), target.display()),
            Err(err) => warn!("autosave write to {} failed: {}", target.display(), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::snapshot::SessionSnapshot;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedProvider;

    impl SnapshotProvider for FixedProvider {
        fn snapshot(&self) -> anyhow::Result<SessionSnapshot> {
            Ok(SessionSnapshot::new("test", None, json!({"scenes": []})))
        }
    }

    struct FailingProvider;

    impl SnapshotProvider for FailingProvider {
        fn snapshot(&self) -> anyhow::Result<SessionSnapshot> {
            anyhow::bail!("document busy")
        }
    }

    /// Counts writes instead of touching the filesystem.
    #[derive(Default)]
    struct CountingSink {
        writes: AtomicUsize,
    }

    impl SnapshotSink for CountingSink {
        fn write<'a>(
            &'a self,
            _path: &'a Path,
            _bytes: &'a [u8],
        ) -> BoxFuture<'a, std::io::Result<()>> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(()) })
        }
    }

    fn config(interval_secs: f64, debounce_secs: f64) -> AutosaveConfig {
        AutosaveConfig {
            interval_secs,
            debounce_secs,
        }
    }

    #[tokio::test]
    async fn test_two_triggers_inside_window_write_once() {
        let sink = Arc::new(CountingSink::default());
        let mut scheduler = AutosaveScheduler::new(sink.clone(), config(3600.0, 5.0));
        scheduler
            .start(Arc::new(FixedProvider), Some(Path::new("/tmp/p.vlm")))
            .await;

        scheduler.trigger().await;
        scheduler.trigger().await;

        assert_eq!(sink.writes.load(Ordering::SeqCst), 1);
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_trigger_after_window_writes_again() {
        let sink = Arc::new(CountingSink::default());
        let mut scheduler = AutosaveScheduler::new(sink.clone(), config(3600.0, 0.05));
        scheduler
            .start(Arc::new(FixedProvider), Some(Path::new("/tmp/p.vlm")))
            .await;

        scheduler.trigger().await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        scheduler.trigger().await;

        assert_eq!(sink.writes.load(Ordering::SeqCst), 2);
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_periodic_ticks_save() {
        let sink = Arc::new(CountingSink::default());
        let mut scheduler = AutosaveScheduler::new(sink.clone(), config(0.05, 0.0));
        scheduler
            .start(Arc::new(FixedProvider), Some(Path::new("/tmp/p.vlm")))
            .await;

        tokio::time::sleep(Duration::from_millis(180)).await;
        scheduler.stop().await;

        let writes = sink.writes.load(Ordering::SeqCst);
        assert!(writes >= 2, "expected at least two periodic saves, got {writes}");
    }

    #[tokio::test]
    async fn test_no_save_fires_after_stop_returns() {
        let sink = Arc::new(CountingSink::default());
        let mut scheduler = AutosaveScheduler::new(sink.clone(), config(0.05, 0.0));
        scheduler
            .start(Arc::new(FixedProvider), Some(Path::new("/tmp/p.vlm")))
            .await;
        scheduler.stop().await;

        let at_stop = sink.writes.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(sink.writes.load(Ordering::SeqCst), at_stop);

        let state = scheduler.state().await;
        assert!(!state.timer_active);
        assert!(state.target_path.is_none());
    }

    #[tokio::test]
    async fn test_pause_suppresses_tick_and_trigger() {
        let sink = Arc::new(CountingSink::default());
        let mut scheduler = AutosaveScheduler::new(sink.clone(), config(0.05, 0.0));
        scheduler
            .start(Arc::new(FixedProvider), Some(Path::new("/tmp/p.vlm")))
            .await;
        scheduler.pause().await;

        tokio::time::sleep(Duration::from_millis(150)).await;
        scheduler.trigger().await;
        assert_eq!(sink.writes.load(Ordering::SeqCst), 0);

        scheduler.resume().await;
        scheduler.trigger().await;
        assert_eq!(sink.writes.load(Ordering::SeqCst), 1);
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_timer_alive() {
        let sink = Arc::new(CountingSink::default());
        let mut scheduler = AutosaveScheduler::new(sink.clone(), config(3600.0, 0.0));
        scheduler
            .start(Arc::new(FailingProvider), Some(Path::new("/tmp/p.vlm")))
            .await;

        scheduler.trigger().await;
        assert_eq!(sink.writes.load(Ordering::SeqCst), 0);
        assert!(scheduler.state().await.timer_active);
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_update_target_path_changes_target_only() {
        let sink = Arc::new(CountingSink::default());
        let mut scheduler = AutosaveScheduler::new(sink.clone(), config(3600.0, 0.0));
        scheduler
            .start(Arc::new(FixedProvider), Some(Path::new("/tmp/old.vlm")))
            .await;

        scheduler
            .update_target_path(Some(Path::new("/tmp/new.vlm")))
            .await;

        let state = scheduler.state().await;
        assert_eq!(state.target_path, Some(PathBuf::from("/tmp/new.vlm.autosave")));
        assert!(state.timer_active);
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_trigger_before_start_is_noop() {
        let sink = Arc::new(CountingSink::default());
        let scheduler = AutosaveScheduler::new(sink.clone(), config(3600.0, 0.0));
        scheduler.trigger().await;
        assert_eq!(sink.writes.load(Ordering::SeqCst), 0);
    }
}

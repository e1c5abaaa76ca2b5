//! Studio coordinator
//!
//! Owns the capture session, the zoom timeline, both zoom controls and the
//! export orchestrator, and drives the recording → normalizing → editing →
//! exporting lifecycle.

use super::session::CaptureSession;
use super::state::{Phase, RecordingState};
use crate::capture::CaptureDevice;
use crate::config::ZoomSettings;
use crate::export::orchestrator::ExportOrchestrator;
use crate::export::types::{Artifact, ExportConfig};
use crate::project::bundle::{read_bundle, write_bundle};
use crate::timeline::{CursorPosition, TimelineState, TimelineStore, ZoomEvent};
use crate::utils::error::{AppError, AppResult};
use crate::zoom::{ManualZoom, TemporaryZoom, TriggerKey, ZoomView};
use std::mem;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted as the studio moves through its lifecycle
#[derive(Debug, Clone)]
pub enum StudioEvent {
    /// Capture started
    Started,
    /// Capture paused
    Paused,
    /// Capture resumed
    Resumed,
    /// Capture stopped, normalization running
    Stopped,
    /// Normalized asset attached, editing available
    Ready { duration: f64 },
    /// Zoom event recorded during capture
    ZoomRecorded(ZoomEvent),
    /// Export finished; `ok` is false when it failed
    ExportFinished { id: Uuid, ok: bool },
    /// Error occurred
    Error(String),
}

enum Mode {
    Idle,
    Capturing(CaptureSession),
    Normalizing,
    Editing,
    Exporting(Uuid),
}

/// A pending export, detached from the studio so it can run without
/// borrowing it.
pub struct ExportJob {
    id: Uuid,
    source: Arc<[u8]>,
    config: ExportConfig,
    orchestrator: ExportOrchestrator,
}

impl ExportJob {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub async fn run(&self) -> AppResult<Artifact> {
        self.orchestrator.export(Arc::clone(&self.source), &self.config).await
    }
}

/// Completes a pending export when dropped, including on cancellation
struct ExportRelease<'a> {
    studio: &'a mut Studio,
    id: Uuid,
    ok: bool,
}

impl Drop for ExportRelease<'_> {
    fn drop(&mut self) {
        if !self.ok {
            tracing::warn!("Export {} ended without an artifact", self.id);
        }
        if let Err(e) = self.studio.complete_export(self.id, self.ok) {
            tracing::debug!("Export {} already released: {}", self.id, e);
        }
    }
}

/// Single controller for one recording workspace
pub struct Studio {
    mode: Mode,
    timeline: TimelineStore,
    temporary_zoom: TemporaryZoom,
    manual_zoom: ManualZoom,
    orchestrator: ExportOrchestrator,
    click_event_duration: f64,
    event_tx: broadcast::Sender<StudioEvent>,
}

impl Studio {
    pub fn new(orchestrator: ExportOrchestrator, zoom: &ZoomSettings) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            mode: Mode::Idle,
            timeline: TimelineStore::new(),
            temporary_zoom: TemporaryZoom::new(zoom.temporary_level, zoom.click_hold()),
            manual_zoom: ManualZoom::new(),
            orchestrator,
            click_event_duration: zoom.click_event_duration_secs,
            event_tx,
        }
    }

    /// Subscribe to studio events
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.event_tx.subscribe()
    }

    pub fn phase(&self) -> Phase {
        match self.mode {
            Mode::Idle => Phase::Idle,
            Mode::Capturing(_) => Phase::Capturing,
            Mode::Normalizing => Phase::Normalizing,
            Mode::Editing => Phase::Editing,
            Mode::Exporting(_) => Phase::Exporting,
        }
    }

    pub fn timeline(&self) -> &TimelineStore {
        &self.timeline
    }

    /// Id of the unresolved export, if any
    pub fn pending_export(&self) -> Option<Uuid> {
        match self.mode {
            Mode::Exporting(id) => Some(id),
            _ => None,
        }
    }

    pub fn recording_state(&self) -> RecordingState {
        match &self.mode {
            Mode::Capturing(session) => session.state(),
            _ => RecordingState::Idle,
        }
    }

    /// Whole seconds of active recording; zero when not capturing
    pub fn elapsed_secs(&self) -> u64 {
        match &self.mode {
            Mode::Capturing(session) => session.elapsed_secs(),
            _ => 0,
        }
    }

    fn emit(&self, event: StudioEvent) {
        let _ = self.event_tx.send(event);
    }

    fn session_mut(&mut self) -> AppResult<&mut CaptureSession> {
        match &mut self.mode {
            Mode::Capturing(session) => Ok(session),
            _ => Err(AppError::InvalidState("no active recording".to_string())),
        }
    }

    /// Start a new capture on `device`.
    ///
    /// Clears the previous timeline and zoom state first. Refused while a
    /// recording or an export is in progress.
    pub async fn start(&mut self, device: Box<dyn CaptureDevice>) -> AppResult<()> {
        match self.mode {
            Mode::Capturing(_) => {
                return Err(AppError::InvalidState("already recording".to_string()))
            }
            Mode::Exporting(id) => {
                tracing::warn!("Refusing to start a recording while export {} is pending", id);
                return Err(AppError::InvalidState(
                    "an export is still in progress".to_string(),
                ));
            }
            _ => {}
        }

        self.timeline.reset();
        self.temporary_zoom.clear();
        self.manual_zoom.reset();
        self.mode = Mode::Idle;

        let session = CaptureSession::start(device).await.inspect_err(|e| {
            self.emit(StudioEvent::Error(e.to_string()));
        })?;
        self.mode = Mode::Capturing(session);
        self.emit(StudioEvent::Started);
        Ok(())
    }

    pub async fn pause(&mut self) -> AppResult<()> {
        self.session_mut()?.pause().await?;
        self.emit(StudioEvent::Paused);
        Ok(())
    }

    pub async fn resume(&mut self) -> AppResult<()> {
        self.session_mut()?.resume().await?;
        self.emit(StudioEvent::Resumed);
        Ok(())
    }

    pub async fn toggle_pause(&mut self) -> AppResult<RecordingState> {
        let state = self.session_mut()?.toggle_pause().await?;
        self.emit(match state {
            RecordingState::Paused => StudioEvent::Paused,
            _ => StudioEvent::Resumed,
        });
        Ok(state)
    }

    /// Whether the capture device closed its stream on its own
    pub fn device_ended(&mut self) -> bool {
        match &mut self.mode {
            Mode::Capturing(session) => session.device_ended(),
            _ => false,
        }
    }

    /// Record a zoom event at the current elapsed time
    pub fn record_zoom(&mut self, at: CursorPosition, level: f64) -> AppResult<ZoomEvent> {
        let elapsed = match &self.mode {
            Mode::Capturing(session) => session.elapsed_secs(),
            _ => {
                return Err(AppError::InvalidState(
                    "zoom events are recorded only while capturing".to_string(),
                ))
            }
        };

        let event = self.timeline.record_zoom_trigger(
            at,
            elapsed as f64,
            level,
            self.click_event_duration,
        );
        self.emit(StudioEvent::ZoomRecorded(event.clone()));
        Ok(event)
    }

    /// Pointer trigger. While capturing this zooms temporarily and records
    /// one zoom event; otherwise it is ignored.
    pub fn click(&mut self, at: CursorPosition) -> Option<ZoomEvent> {
        if !matches!(self.mode, Mode::Capturing(_)) {
            return None;
        }
        self.temporary_zoom.click(at);
        let level = self.temporary_zoom.level();
        self.record_zoom(at, level).ok()
    }

    /// Keyboard trigger pressed. Zooms while held but records nothing.
    pub fn key_down(&mut self, key: TriggerKey, at: CursorPosition) -> bool {
        if !matches!(self.mode, Mode::Capturing(_)) {
            return false;
        }
        self.temporary_zoom.key_down(key, at)
    }

    pub fn key_up(&mut self, key: TriggerKey) -> bool {
        self.temporary_zoom.key_up(key)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.manual_zoom.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.manual_zoom.zoom_out()
    }

    pub fn reset_zoom(&mut self) -> f64 {
        self.manual_zoom.reset()
    }

    /// Multiplier currently applied to the preview
    pub fn effective_zoom(&self) -> f64 {
        if self.temporary_zoom.is_active() {
            self.temporary_zoom.level()
        } else {
            self.manual_zoom.level()
        }
    }

    pub fn zoom_view(&self) -> ZoomView {
        self.temporary_zoom.view()
    }

    pub fn temporary_zoom(&self) -> &TemporaryZoom {
        &self.temporary_zoom
    }

    /// Stop capture and normalize the recording.
    ///
    /// On success the normalized asset is attached and the studio is ready
    /// for editing. If normalization fails the whole session is discarded.
    pub async fn stop(&mut self) -> AppResult<()> {
        let session = match mem::replace(&mut self.mode, Mode::Normalizing) {
            Mode::Capturing(session) => session,
            other => {
                self.mode = other;
                return Err(AppError::InvalidState("no active recording".to_string()));
            }
        };

        self.temporary_zoom.clear();
        self.emit(StudioEvent::Stopped);

        let media = match session.stop().await {
            Ok(media) => media,
            Err(e) => return Err(self.abandon(e)),
        };

        tracing::info!(
            "Normalizing {} bytes via {}",
            media.bytes.len(),
            self.orchestrator.service_name()
        );
        let asset = match self.orchestrator.normalize(media.bytes).await {
            Ok(asset) => asset,
            Err(e) => return Err(self.abandon(e)),
        };

        let duration = media.duration_secs as f64;
        if let Err(e) = self.timeline.attach_asset(asset, duration) {
            return Err(self.abandon(e));
        }

        self.mode = Mode::Editing;
        self.emit(StudioEvent::Ready { duration });
        Ok(())
    }

    /// Drop all session state after a failed stop
    fn abandon(&mut self, error: AppError) -> AppError {
        tracing::error!("Discarding recording: {}", error);
        self.timeline.reset();
        self.mode = Mode::Idle;
        self.emit(StudioEvent::Error(error.to_string()));
        error
    }

    fn require_editable(&self) -> AppResult<()> {
        if self.timeline.has_asset() {
            Ok(())
        } else {
            Err(AppError::InvalidState("no recording to edit".to_string()))
        }
    }

    /// Replace an existing event. Unknown ids and invalid timing are ignored.
    pub fn update_event(&mut self, event: ZoomEvent) -> AppResult<bool> {
        self.require_editable()?;
        Ok(self.timeline.update(event))
    }

    pub fn delete_event(&mut self, id: Uuid) -> AppResult<Option<ZoomEvent>> {
        self.require_editable()?;
        Ok(self.timeline.delete(id))
    }

    /// Add an event while editing. Returns false for a duplicate id or
    /// invalid timing.
    pub fn add_event(&mut self, event: ZoomEvent) -> AppResult<bool> {
        self.require_editable()?;
        Ok(self.timeline.insert(event))
    }

    /// Reserve the studio for an export of the normalized asset
    pub fn begin_export(&mut self, config: ExportConfig) -> AppResult<ExportJob> {
        match self.mode {
            Mode::Editing => {}
            Mode::Exporting(id) => {
                return Err(AppError::InvalidState(format!(
                    "export {} is still in progress",
                    id
                )))
            }
            _ => return Err(AppError::InvalidState("no recording to export".to_string())),
        }

        let source = self
            .timeline
            .asset()
            .map(|asset| asset.shared_bytes())
            .ok_or_else(|| AppError::InvalidState("no recording to export".to_string()))?;

        let id = Uuid::new_v4();
        self.mode = Mode::Exporting(id);
        tracing::info!("Export {} started ({})", id, config.format);

        Ok(ExportJob {
            id,
            source,
            config,
            orchestrator: self.orchestrator.clone(),
        })
    }

    /// Release the studio after the export `id` resolved
    pub fn complete_export(&mut self, id: Uuid, ok: bool) -> AppResult<()> {
        match self.mode {
            Mode::Exporting(pending) if pending == id => {
                self.mode = Mode::Editing;
                self.emit(StudioEvent::ExportFinished { id, ok });
                Ok(())
            }
            _ => Err(AppError::InvalidState(format!("export {} is not pending", id))),
        }
    }

    /// Export the normalized asset. The timeline is left as it was whether
    /// or not the export succeeds.
    ///
    /// Dropping the returned future mid-export releases the studio as a
    /// failed export.
    pub async fn export(&mut self, config: ExportConfig) -> AppResult<Artifact> {
        let job = self.begin_export(config)?;
        let mut release = ExportRelease {
            studio: self,
            id: job.id(),
            ok: false,
        };
        let result = job.run().await;
        release.ok = result.is_ok();
        drop(release);
        result
    }

    /// Forget the current recording and return to idle
    pub fn discard(&mut self) -> AppResult<()> {
        match self.mode {
            Mode::Capturing(_) | Mode::Exporting(_) => Err(AppError::InvalidState(
                "cannot discard while recording or exporting".to_string(),
            )),
            _ => {
                self.timeline.reset();
                self.temporary_zoom.clear();
                self.manual_zoom.reset();
                self.mode = Mode::Idle;
                Ok(())
            }
        }
    }

    /// Save the edited recording as a bundle directory
    pub fn save_bundle(&self, path: &Path) -> AppResult<()> {
        self.require_editable()?;
        write_bundle(self.timeline.state(), path)?;
        tracing::info!("Saved session to {:?}", path);
        Ok(())
    }

    /// Replace the workspace with a saved bundle and enter editing
    pub fn open_bundle(&mut self, path: &Path) -> AppResult<()> {
        if matches!(self.mode, Mode::Capturing(_) | Mode::Exporting(_)) {
            return Err(AppError::InvalidState(
                "cannot open a session while recording or exporting".to_string(),
            ));
        }

        let TimelineState {
            asset,
            duration,
            zoom_events,
        } = read_bundle(path)?;
        let asset = asset.ok_or_else(|| {
            AppError::InvalidState("bundle has no recording".to_string())
        })?;

        self.discard()?;
        self.timeline.attach_asset(asset, duration)?;
        for event in zoom_events {
            self.timeline.insert(event);
        }
        self.mode = Mode::Editing;
        self.emit(StudioEvent::Ready { duration });
        tracing::info!("Opened session from {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::types::{ExportFormat, ExportQuality, TextOverlay};
    use crate::testing::{DeviceFeed, FakeTranscoder, ScriptedDevice};
    use std::time::Duration;
    use tempfile::tempdir;

    fn studio_with(fake: &Arc<FakeTranscoder>) -> Studio {
        Studio::new(
            ExportOrchestrator::new(fake.clone()),
            &ZoomSettings::default(),
        )
    }

    async fn start_recording(studio: &mut Studio) -> DeviceFeed {
        let device = ScriptedDevice::new();
        let feed = device.feed();
        studio.start(Box::new(device)).await.unwrap();
        feed
    }

    async fn advance_secs(secs: u64) {
        tokio::time::advance(Duration::from_secs(secs)).await;
    }

    fn at(x: f64, y: f64) -> CursorPosition {
        CursorPosition::new(x, y)
    }

    /// Record 3 zooms at 2s, 5s and 9s, stop at 10s
    async fn recorded_studio(fake: &Arc<FakeTranscoder>) -> Studio {
        let mut studio = studio_with(fake);
        let feed = start_recording(&mut studio).await;

        feed.push(b"chunk-0;");
        advance_secs(2).await;
        studio.record_zoom(at(10.0, 10.0), 2.0).unwrap();
        advance_secs(3).await;
        feed.push(b"chunk-1;");
        studio.record_zoom(at(50.0, 50.0), 2.0).unwrap();
        advance_secs(4).await;
        studio.record_zoom(at(90.0, 90.0), 3.0).unwrap();
        advance_secs(1).await;
        feed.push(b"chunk-2;");

        studio.stop().await.unwrap();
        studio
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_stop_normalize_end_to_end() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"normalized-mp4".to_vec()));
        let studio = recorded_studio(&fake).await;

        assert_eq!(studio.phase(), Phase::Editing);
        let timeline = studio.timeline();
        assert_eq!(timeline.len(), 3);

        let starts: Vec<f64> = timeline.events().iter().map(|e| e.start_time).collect();
        let levels: Vec<f64> = timeline.events().iter().map(|e| e.zoom_level).collect();
        assert_eq!(starts, vec![2.0, 5.0, 9.0]);
        assert_eq!(levels, vec![2.0, 2.0, 3.0]);

        let asset = timeline.asset().unwrap();
        assert_eq!(asset.bytes(), b"normalized-mp4");
        assert_eq!(asset.format(), ExportFormat::Mp4);
        assert_eq!(timeline.duration(), 10.0);

        // Chunks reach the normalization pass joined in capture order
        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(&requests[0].video[..], b"chunk-0;chunk-1;chunk-2;");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_export_preserves_timeline() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"normalized".to_vec()));
        let mut studio = recorded_studio(&fake).await;
        let before = studio.timeline().snapshot();

        fake.fail_next();
        let result = studio
            .export(ExportConfig::new(ExportFormat::Webm, ExportQuality::Low))
            .await;

        assert!(matches!(result, Err(AppError::ExportFailed(_))));
        assert_eq!(studio.timeline().snapshot(), before);
        assert!(studio
            .timeline()
            .asset()
            .unwrap()
            .same_asset(before.asset.as_ref().unwrap()));
        assert_eq!(studio.phase(), Phase::Editing);

        // The user may retry
        let artifact = studio
            .export(ExportConfig::new(ExportFormat::Webm, ExportQuality::Low))
            .await
            .unwrap();
        assert_eq!(artifact.file_name(), "screen-recording.webm");
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_reads_normalized_asset() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"normalized".to_vec()));
        let mut studio = recorded_studio(&fake).await;

        let config = ExportConfig::new(ExportFormat::Mp4, ExportQuality::Medium)
            .with_overlay(Some(TextOverlay::new("Demo", 10, 20)));
        studio.export(config).await.unwrap();

        let requests = fake.requests();
        let last = requests.last().unwrap();
        assert_eq!(&last.video[..], b"normalized");
        assert_eq!(last.quality, ExportQuality::Medium);
        assert_eq!(last.text_overlay, Some(TextOverlay::new("Demo", 10, 20)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_duration() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"out".to_vec()));
        let mut studio = studio_with(&fake);
        let feed = start_recording(&mut studio).await;
        feed.push(b"data");

        advance_secs(3).await;
        studio.pause().await.unwrap();
        assert!(feed.is_paused());
        assert_eq!(studio.recording_state(), RecordingState::Paused);

        advance_secs(5).await;
        assert_eq!(studio.elapsed_secs(), 3);

        studio.resume().await.unwrap();
        advance_secs(4).await;
        assert_eq!(studio.elapsed_secs(), 7);

        studio.stop().await.unwrap();
        assert!(feed.is_stopped());
        assert_eq!(studio.timeline().duration(), 7.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_normalization_failure_resets_session() {
        let fake = Arc::new(FakeTranscoder::failing());
        let mut studio = studio_with(&fake);
        let feed = start_recording(&mut studio).await;
        feed.push(b"data");
        advance_secs(2).await;
        studio.record_zoom(at(20.0, 20.0), 2.0).unwrap();

        let result = studio.stop().await;
        assert!(matches!(result, Err(AppError::ExportFailed(_))));
        assert_eq!(studio.phase(), Phase::Idle);
        assert_eq!(studio.timeline().snapshot(), TimelineState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_capture_fails_normalization() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"out".to_vec()));
        let mut studio = studio_with(&fake);
        start_recording(&mut studio).await;

        assert!(matches!(studio.stop().await, Err(AppError::ExportFailed(_))));
        assert!(fake.requests().is_empty());
        assert_eq!(studio.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_blocked_while_export_pending() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"out".to_vec()));
        let mut studio = recorded_studio(&fake).await;

        let job = studio
            .begin_export(ExportConfig::new(ExportFormat::Gif, ExportQuality::High))
            .unwrap();
        assert_eq!(studio.pending_export(), Some(job.id()));

        let result = studio.start(Box::new(ScriptedDevice::new())).await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert_eq!(studio.timeline().len(), 3);

        // A second export cannot overlap the first
        assert!(studio.begin_export(ExportConfig::baseline()).is_err());

        let artifact = job.run().await.unwrap();
        assert_eq!(artifact.format, ExportFormat::Gif);
        studio.complete_export(job.id(), true).unwrap();
        assert_eq!(studio.phase(), Phase::Editing);

        // Once resolved, a new session starts from a clean timeline
        start_recording(&mut studio).await;
        assert_eq!(studio.phase(), Phase::Capturing);
        assert!(studio.timeline().is_empty());
        assert!(!studio.timeline().has_asset());
        assert_eq!(studio.timeline().duration(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_export_releases_studio() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"normalized".to_vec()));
        let mut studio = recorded_studio(&fake).await;
        let mut events = studio.subscribe();
        let before = studio.timeline().snapshot();

        fake.stall_next();
        let export = studio.export(ExportConfig::new(ExportFormat::Mp4, ExportQuality::High));
        let timed_out = tokio::time::timeout(Duration::from_secs(30), export).await;
        assert!(timed_out.is_err());

        assert_eq!(studio.phase(), Phase::Editing);
        assert_eq!(studio.pending_export(), None);
        assert_eq!(studio.timeline().snapshot(), before);
        assert!(matches!(
            events.recv().await.unwrap(),
            StudioEvent::ExportFinished { ok: false, .. }
        ));

        // A new recording can start right away
        start_recording(&mut studio).await;
        assert_eq!(studio.phase(), Phase::Capturing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_are_normalized() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"out".to_vec()));
        let mut studio = recorded_studio(&fake).await;

        let mut edited = studio.timeline().events()[0].clone();
        edited.start_time = f64::NAN;
        assert!(!studio.update_event(edited.clone()).unwrap());

        edited.start_time = 4.0;
        edited.zoom_level = 0.5;
        assert!(studio.update_event(edited.clone()).unwrap());
        assert_eq!(studio.timeline().get(edited.id).unwrap().zoom_level, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_unknown_export() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"out".to_vec()));
        let mut studio = recorded_studio(&fake).await;
        let result = studio.complete_export(Uuid::new_v4(), true);
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_records_only_while_capturing() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"out".to_vec()));
        let mut studio = studio_with(&fake);

        assert!(studio.click(at(50.0, 50.0)).is_none());
        assert!(!studio.temporary_zoom().is_active());

        let feed = start_recording(&mut studio).await;
        feed.push(b"data");
        advance_secs(4).await;

        let event = studio.click(at(30.0, 40.0)).unwrap();
        assert_eq!(event.start_time, 4.0);
        assert_eq!(event.zoom_level, 2.0);
        assert_eq!(event.duration, 1.0);
        assert_eq!(event.cursor_position, at(30.0, 40.0));
        assert_eq!(studio.effective_zoom(), 2.0);

        // Clicks while paused still count
        studio.pause().await.unwrap();
        assert!(studio.click(at(60.0, 60.0)).is_some());
        assert_eq!(studio.timeline().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_zoom_without_recording() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"out".to_vec()));
        let mut studio = studio_with(&fake);
        assert!(!studio.key_down(TriggerKey::Z, at(10.0, 10.0)));

        start_recording(&mut studio).await;
        assert!(studio.key_down(TriggerKey::Z, at(10.0, 10.0)));
        assert_eq!(studio.effective_zoom(), 2.0);
        assert_eq!(studio.zoom_view().focus, at(10.0, 10.0));

        assert!(studio.key_up(TriggerKey::Z));
        assert_eq!(studio.effective_zoom(), 1.0);
        assert!(studio.timeline().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_effective_zoom_prefers_temporary() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"out".to_vec()));
        let mut studio = studio_with(&fake);
        start_recording(&mut studio).await;

        studio.zoom_in();
        studio.zoom_in();
        assert!((studio.effective_zoom() - 1.4).abs() < 1e-9);

        studio.key_down(TriggerKey::Space, at(0.0, 0.0));
        assert_eq!(studio.effective_zoom(), 2.0);
        studio.key_up(TriggerKey::Space);
        assert!((studio.effective_zoom() - 1.4).abs() < 1e-9);

        assert_eq!(studio.reset_zoom(), 1.0);
        assert_eq!(studio.effective_zoom(), 1.0);
    }

    #[tokio::test]
    async fn test_capture_denied_creates_no_session() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"out".to_vec()));
        let mut studio = studio_with(&fake);

        let result = studio.start(Box::new(ScriptedDevice::denied())).await;
        assert!(matches!(result, Err(AppError::CaptureDeviceDenied(_))));
        assert_eq!(studio.phase(), Phase::Idle);
        assert!(studio.pause().await.is_err());
        assert!(studio.stop().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_device_ended_then_stop() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"out".to_vec()));
        let mut studio = studio_with(&fake);
        let feed = start_recording(&mut studio).await;

        feed.push(b"only-chunk");
        assert!(!studio.device_ended());
        feed.end_stream();
        assert!(studio.device_ended());

        studio.stop().await.unwrap();
        assert_eq!(&fake.requests()[0].video[..], b"only-chunk");
    }

    #[tokio::test(start_paused = true)]
    async fn test_editing_requires_asset() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"out".to_vec()));
        let mut studio = studio_with(&fake);
        assert!(studio.delete_event(Uuid::new_v4()).is_err());

        let mut studio = recorded_studio(&fake).await;
        let mut event = studio.timeline().events()[0].clone();
        event.zoom_level = 3.0;
        assert!(studio.update_event(event.clone()).unwrap());

        let mut added = event.clone();
        added.id = Uuid::new_v4();
        added.start_time = 7.0;
        assert!(studio.add_event(added).unwrap());
        assert_eq!(studio.timeline().len(), 4);

        assert_eq!(studio.delete_event(event.id).unwrap().unwrap().id, event.id);
        assert_eq!(studio.timeline().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bundle_save_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session");
        let fake = Arc::new(FakeTranscoder::succeeding(b"normalized".to_vec()));

        let studio = recorded_studio(&fake).await;
        studio.save_bundle(&path).unwrap();

        let mut reopened = studio_with(&fake);
        reopened.open_bundle(&path).unwrap();
        assert_eq!(reopened.phase(), Phase::Editing);
        assert_eq!(reopened.timeline().snapshot(), studio.timeline().snapshot());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_are_broadcast() {
        let fake = Arc::new(FakeTranscoder::succeeding(b"out".to_vec()));
        let mut studio = studio_with(&fake);
        let mut events = studio.subscribe();

        let feed = start_recording(&mut studio).await;
        feed.push(b"data");
        studio.click(at(5.0, 5.0));
        studio.stop().await.unwrap();

        assert!(matches!(events.recv().await.unwrap(), StudioEvent::Started));
        assert!(matches!(events.recv().await.unwrap(), StudioEvent::ZoomRecorded(_)));
        assert!(matches!(events.recv().await.unwrap(), StudioEvent::Stopped));
        assert!(matches!(
            events.recv().await.unwrap(),
            StudioEvent::Ready { duration } if duration == 0.0
        ));
    }
}

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::config::SessionConfig;
use super::error::StartError;
use super::state::{SessionSnapshot, SessionStatus};
use crate::annotate::{Annotation, LexicalAnnotator};
use crate::audio::AudioSource;
use crate::auth::{AuthorizationDecision, AuthorizationState, PermissionProvider};
use crate::stt::{TranscriptionBackend, TranscriptUpdate};

/// A continuous transcription session with periodic lexical annotation
///
/// All session state lives inside a dedicated actor task; this handle turns
/// method calls into commands on the actor's inbox, so every mutation is
/// serialized no matter how many callers share the handle. Observable state
/// comes back out through a watch channel of [`SessionSnapshot`]s.
pub struct TranscriptionSession {
    session_id: String,
    commands: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

enum Command {
    RequestAuthorization,
    Start {
        reply: oneshot::Sender<Result<(), StartError>>,
    },
    Stop {
        reason: String,
        reply: oneshot::Sender<()>,
    },
}

impl TranscriptionSession {
    /// Create a session and spawn its actor
    ///
    /// The actor runs until every handle is dropped; an active recording is
    /// torn down on the way out.
    pub fn new(
        config: SessionConfig,
        source: Box<dyn AudioSource>,
        backend: Box<dyn TranscriptionBackend>,
        annotator: Box<dyn LexicalAnnotator>,
        permissions: Arc<dyn PermissionProvider>,
    ) -> Self {
        let session_id = config.session_id.clone();
        let (command_tx, command_rx) = mpsc::channel(100);
        let (decision_tx, decision_rx) = mpsc::channel(4);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::new(session_id.clone()));

        let actor = SessionActor {
            config,
            source,
            backend,
            annotator,
            permissions,
            commands: command_rx,
            decisions: decision_rx,
            decision_tx,
            snapshot: snapshot_tx,
            recording: None,
        };

        tokio::spawn(actor.run());

        info!("Created transcription session: {}", session_id);

        Self {
            session_id,
            commands: command_tx,
            snapshot_rx,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Ask for capture consent
    ///
    /// Fire-and-forget: the status moves to `Authorizing` and the decision
    /// lands in the observable state when the provider (or the authorization
    /// timeout) resolves.
    pub async fn request_authorization(&self) {
        if self
            .commands
            .send(Command::RequestAuthorization)
            .await
            .is_err()
        {
            warn!(
                "Session {} is closed; authorization request dropped",
                self.session_id
            );
        }
    }

    /// Begin recording
    ///
    /// Requires granted authorization and no active recording. On success the
    /// transcript and annotations are cleared, the status is `Recording`, and
    /// the first annotation pass runs immediately. A refused precondition
    /// leaves the session untouched; a resource failure lands it in
    /// `Stopped` with the failure as the reason.
    pub async fn start(&self) -> Result<(), StartError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.commands
            .send(Command::Start { reply: reply_tx })
            .await
            .map_err(|_| StartError::SessionClosed)?;

        reply_rx.await.map_err(|_| StartError::SessionClosed)?
    }

    /// Stop recording with the given reason
    ///
    /// Idempotent and safe in every state, including before the first
    /// `start()`. Always lands the status in `Stopped` with this reason (a
    /// repeat call just refreshes it), and returns only after teardown has
    /// completed, so a following `start()` cannot race the old recording.
    pub async fn stop(&self, reason: impl Into<String>) {
        let (reply_tx, reply_rx) = oneshot::channel();

        let sent = self
            .commands
            .send(Command::Stop {
                reason: reason.into(),
                reply: reply_tx,
            })
            .await;

        if sent.is_err() {
            // Actor already gone; nothing left to stop
            return;
        }

        reply_rx.await.ok();
    }

    /// Watch session state; the current snapshot is available immediately
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Current snapshot of the whole observable state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.snapshot_rx.borrow().status.clone()
    }

    pub fn transcript(&self) -> String {
        self.snapshot_rx.borrow().transcript.clone()
    }

    pub fn annotations(&self) -> Vec<Annotation> {
        self.snapshot_rx.borrow().annotations.clone()
    }
}

/// Everything live about one recording, owned by the actor
struct ActiveRecording {
    updates: mpsc::Receiver<TranscriptUpdate>,
    ticker: Interval,
    pump: JoinHandle<()>,
    last_update_at: Instant,
}

enum RecordingEvent {
    Update(TranscriptUpdate),
    UpdatesClosed,
    AnnotationTick,
    IdleTimeout,
}

enum Step {
    Command(Command),
    Decision(AuthorizationDecision),
    Recording(RecordingEvent),
    Closed,
}

/// Single writer for all session state
struct SessionActor {
    config: SessionConfig,
    source: Box<dyn AudioSource>,
    backend: Box<dyn TranscriptionBackend>,
    annotator: Box<dyn LexicalAnnotator>,
    permissions: Arc<dyn PermissionProvider>,
    commands: mpsc::Receiver<Command>,
    decisions: mpsc::Receiver<AuthorizationDecision>,
    decision_tx: mpsc::Sender<AuthorizationDecision>,
    snapshot: watch::Sender<SessionSnapshot>,
    recording: Option<ActiveRecording>,
}

impl SessionActor {
    async fn run(mut self) {
        debug!("Session actor started: {}", self.config.session_id);

        loop {
            let step = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => Step::Command(command),
                    None => Step::Closed,
                },
                Some(decision) = self.decisions.recv() => Step::Decision(decision),
                event = next_recording_event(&mut self.recording, self.config.backend_idle_timeout) => {
                    Step::Recording(event)
                }
            };

            match step {
                Step::Command(command) => self.handle_command(command).await,
                Step::Decision(decision) => self.handle_decision(decision),
                Step::Recording(event) => self.handle_recording_event(event).await,
                Step::Closed => break,
            }
        }

        // Every handle dropped; tear down whatever is still running
        self.shutdown_recording().await;

        debug!("Session actor stopped: {}", self.config.session_id);
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::RequestAuthorization => self.handle_request_authorization(),
            Command::Start { reply } => {
                let result = self.handle_start().await;
                let _ = reply.send(result);
            }
            Command::Stop { reason, reply } => {
                self.handle_stop(reason).await;
                let _ = reply.send(());
            }
        }
    }

    fn handle_request_authorization(&mut self) {
        info!(
            "Requesting capture authorization for session {}",
            self.config.session_id
        );

        self.update(|snapshot| {
            // A re-request while recording refreshes consent in the
            // background without disturbing the recording
            if !snapshot.status.is_recording() {
                snapshot.status = SessionStatus::Authorizing;
            }
        });

        let permissions = Arc::clone(&self.permissions);
        let decision_tx = self.decision_tx.clone();
        let timeout = self.config.authorization_timeout;

        // The provider may block on a prompt indefinitely; wait for it off
        // the actor and bound the wait when configured
        tokio::spawn(async move {
            let decision = match timeout {
                Some(limit) => {
                    match tokio::time::timeout(limit, permissions.request_authorization()).await {
                        Ok(decision) => decision,
                        Err(_) => AuthorizationDecision::Denied {
                            reason: format!("No authorization decision within {:?}", limit),
                        },
                    }
                }
                None => permissions.request_authorization().await,
            };

            let _ = decision_tx.send(decision).await;
        });
    }

    fn handle_decision(&mut self, decision: AuthorizationDecision) {
        let state: AuthorizationState = decision.into();

        match &state {
            AuthorizationState::Authorized => {
                info!("Capture authorized for session {}", self.config.session_id);
            }
            AuthorizationState::Denied { reason } => {
                warn!(
                    "Capture denied for session {}: {}",
                    self.config.session_id, reason
                );
            }
            AuthorizationState::Undetermined => {}
        }

        self.update(|snapshot| {
            // A late decision must not clobber Recording or Stopped
            if snapshot.status == SessionStatus::Authorizing {
                snapshot.status = match &state {
                    AuthorizationState::Authorized => SessionStatus::Authorized,
                    AuthorizationState::Denied { reason } => SessionStatus::Denied {
                        reason: reason.clone(),
                    },
                    AuthorizationState::Undetermined => SessionStatus::Authorizing,
                };
            }
            snapshot.authorization = state;
        });
    }

    async fn handle_start(&mut self) -> Result<(), StartError> {
        // Consent is checked before any resource is touched, so a refusal
        // leaves the session exactly as it was
        let authorization = self.snapshot.borrow().authorization.clone();
        match authorization {
            AuthorizationState::Authorized => {}
            AuthorizationState::Denied { reason } => {
                return Err(StartError::NotAuthorized { reason });
            }
            AuthorizationState::Undetermined => {
                return Err(StartError::NotAuthorized {
                    reason: "Authorization has not been granted".to_string(),
                });
            }
        }

        if self.recording.is_some() {
            return Err(StartError::AlreadyRecording);
        }

        info!("Starting recording for session {}", self.config.session_id);

        let mut frames = match self.source.open().await {
            Ok(frames) => frames,
            Err(e) => {
                let message = e.to_string();
                self.handle_stop(format!("Audio source failed: {}", message))
                    .await;
                return Err(StartError::AudioUnavailable(message));
            }
        };

        let stream = match self.backend.start(&self.config.session_id).await {
            Ok(stream) => stream,
            Err(e) => {
                let message = e.to_string();
                // The stop path only releases resources held by an
                // ActiveRecording; the source opened above is not in one
                // yet, so release it here or the next start finds it open
                if let Err(close_err) = self.source.close().await {
                    warn!("Failed to close audio source: {}", close_err);
                }
                self.handle_stop(format!("Transcription backend failed: {}", message))
                    .await;
                return Err(StartError::BackendUnavailable(message));
            }
        };

        // Pump frames source -> recognizer in arrival order; dropping the
        // sink signals end-of-audio to the backend
        let sink = stream.frames;
        let pump = tokio::spawn(async move {
            while let Some(frame) = frames.recv().await {
                if sink.send(frame).await.is_err() {
                    debug!("Frame sink closed; pump ending");
                    break;
                }
            }
        });

        // tokio's interval panics on a zero period; clamp rather than take
        // the configuration literally
        let period = self.config.annotation_period.max(Duration::from_millis(1));
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick resolves immediately, so an annotation pass runs as
        // soon as the recording is up

        self.recording = Some(ActiveRecording {
            updates: stream.updates,
            ticker,
            pump,
            last_update_at: Instant::now(),
        });

        self.update(|snapshot| {
            snapshot.status = SessionStatus::Recording;
            snapshot.transcript.clear();
            snapshot.annotations.clear();
            snapshot.started_at = Some(Utc::now());
        });

        info!("Recording started for session {}", self.config.session_id);

        Ok(())
    }

    async fn handle_stop(&mut self, reason: String) {
        if self.recording.is_some() {
            info!("Stopping session {}: {}", self.config.session_id, reason);
        } else {
            debug!(
                "Stop with no active recording for session {}: {}",
                self.config.session_id, reason
            );
        }

        self.shutdown_recording().await;

        // Stopped is always the landing state, even when nothing was
        // running; a repeat stop only refreshes the reason
        self.update(|snapshot| snapshot.status = SessionStatus::Stopped { reason });
    }

    /// Tear down the active recording, if any
    ///
    /// Returns with the annotation ticker disarmed, the frame pump gone, the
    /// source closed, and the backend cancelled. No recording callback can
    /// fire after this.
    async fn shutdown_recording(&mut self) {
        let Some(active) = self.recording.take() else {
            return;
        };

        // Ticker and update receiver die with `active`
        active.pump.abort();

        if let Err(e) = self.source.close().await {
            warn!("Failed to close audio source: {}", e);
        }
        if let Err(e) = self.backend.cancel().await {
            warn!("Failed to cancel transcription backend: {}", e);
        }
    }

    async fn handle_recording_event(&mut self, event: RecordingEvent) {
        match event {
            RecordingEvent::Update(update) => self.handle_update(update).await,
            RecordingEvent::UpdatesClosed => {
                warn!(
                    "Recognizer update stream closed for session {}",
                    self.config.session_id
                );
                self.handle_stop("Transcription backend became unavailable".to_string())
                    .await;
            }
            RecordingEvent::AnnotationTick => self.annotate_pass(),
            RecordingEvent::IdleTimeout => {
                warn!(
                    "Recognizer went silent for session {}",
                    self.config.session_id
                );
                self.handle_stop("Transcription backend stopped responding".to_string())
                    .await;
            }
        }
    }

    async fn handle_update(&mut self, update: TranscriptUpdate) {
        if let Some(active) = self.recording.as_mut() {
            active.last_update_at = Instant::now();
        }

        if let Some(text) = update.text {
            debug!(
                "Transcript update for session {} ({} chars, final={})",
                self.config.session_id,
                text.len(),
                update.is_final
            );
            // Full replacement, never an append
            self.update(|snapshot| snapshot.transcript = text);
        }

        if let Some(error) = update.error {
            self.handle_stop(error).await;
        } else if update.is_final {
            // One last pass so the annotations match the final text
            self.annotate_pass();
            self.handle_stop("Finished.".to_string()).await;
        }
    }

    fn annotate_pass(&mut self) {
        let transcript = self.snapshot.borrow().transcript.clone();
        let annotations = self.annotator.annotate(&transcript);

        debug!(
            "Annotation pass for session {}: {} tags",
            self.config.session_id,
            annotations.len()
        );

        // Wholesale replacement, even when nothing changed
        self.update(|snapshot| snapshot.annotations = annotations);
    }

    fn update(&self, mutate: impl FnOnce(&mut SessionSnapshot)) {
        self.snapshot.send_modify(mutate);
    }
}

/// Resolve the next event from the active recording, or park when idle
///
/// Every inner future is cancel-safe, so the caller can race this against
/// its inbox without losing updates or ticks.
async fn next_recording_event(
    recording: &mut Option<ActiveRecording>,
    idle_timeout: Option<Duration>,
) -> RecordingEvent {
    let Some(active) = recording.as_mut() else {
        return std::future::pending().await;
    };

    let idle_deadline = idle_timeout.map(|timeout| active.last_update_at + timeout);

    tokio::select! {
        update = active.updates.recv() => match update {
            Some(update) => RecordingEvent::Update(update),
            None => RecordingEvent::UpdatesClosed,
        },
        _ = active.ticker.tick() => RecordingEvent::AnnotationTick,
        _ = idle_sleep(idle_deadline) => RecordingEvent::IdleTimeout,
    }
}

async fn idle_sleep(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

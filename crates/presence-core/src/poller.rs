//! The recognition poll loop.
//!
//! A cooperative capture → submit → interpret → react cycle. One
//! iteration is [`Poller::tick`]; an async driver
//! ([`Poller::run_until_shutdown`]) owns all sleeping between
//! iterations. `tick` takes `&mut self`, so no two submissions for the
//! same poller can ever be in flight at once — result ordering matches
//! submission ordering by construction.
//!
//! State machine: `Idle → Capturing → AwaitingResult → {Idle |
//! Suspended} → Idle`, with `Stopped` terminal and reachable only via
//! teardown of the owning view.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::watch;

use crate::clock::Clock;
use crate::debounce::DebounceState;
use crate::types::{DetectedFace, Frame};

#[derive(Error, Debug)]
pub enum CaptureError {
    /// The stream has not produced its first frame yet.
    #[error("frame not ready")]
    NotReady,
    /// The camera device failed or went away.
    #[error("camera unavailable: {0}")]
    Device(String),
}

/// Source of encoded still frames, one per poll cycle.
pub trait FrameSource {
    fn capture(&mut self) -> Result<Frame, CaptureError>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        (**self).capture()
    }
}

#[derive(Error, Debug)]
pub enum RecognizeError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("remote error: {0}")]
    Remote(String),
}

/// The external recognition collaborator.
// The returned future is only ever polled on the owning task, never spawned.
#[allow(async_fn_in_trait)]
pub trait Recognizer {
    async fn recognize(&self, frame: &Frame) -> Result<Vec<DetectedFace>, RecognizeError>;
}

/// Sink for poller-driven UI transitions.
pub trait PollerEvents {
    /// A recognized identity passed the cooldown; surface a banner.
    fn recognized(&mut self, name: &str);
    /// Live annotations for every face in the last response, recognized
    /// or not. Untouched by the cooldown.
    fn overlay(&mut self, faces: &[DetectedFace]);
}

#[derive(Debug, Clone, Copy)]
pub struct PollerOptions {
    /// Minimum time between notifications for the same identity.
    pub cooldown: Duration,
    /// How long capture stays paused while a result banner is shown.
    pub display: Duration,
    /// Emit debounced notifications (home view).
    pub notify: bool,
    /// Emit per-frame overlay annotations (enrollment preview).
    pub overlay: bool,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(2000),
            display: Duration::from_millis(1000),
            notify: true,
            overlay: false,
        }
    }
}

/// Phase of the current poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerStatus {
    Idle,
    Capturing,
    AwaitingResult,
    /// Capture paused until the contained instant while a result is shown.
    Suspended(Instant),
    /// Terminal; entered only via teardown.
    Stopped,
}

#[derive(Error, Debug)]
pub enum PollError {
    /// Recognition is impossible without the camera; surfaced to the
    /// caller as a blocking error rather than retried.
    #[error("camera unavailable: {0}")]
    Device(String),
}

/// What the driver should do after one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Schedule the next iteration after this delay.
    Next(Duration),
    /// The loop was torn down; schedule nothing.
    Stopped,
}

pub struct Poller<S, R, C, E> {
    source: S,
    recognizer: R,
    clock: C,
    events: E,
    opts: PollerOptions,
    debounce: DebounceState,
    status: PollerStatus,
    shutdown: watch::Receiver<bool>,
}

impl<S, R, C, E> Poller<S, R, C, E>
where
    S: FrameSource,
    R: Recognizer,
    C: Clock,
    E: PollerEvents,
{
    pub fn new(
        source: S,
        recognizer: R,
        clock: C,
        events: E,
        opts: PollerOptions,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let debounce = DebounceState::new(opts.cooldown);
        Self {
            source,
            recognizer,
            clock,
            events,
            opts,
            debounce,
            status: PollerStatus::Idle,
            shutdown,
        }
    }

    pub fn status(&self) -> PollerStatus {
        self.status
    }

    fn torn_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Run exactly one iteration of the loop.
    ///
    /// Transient failures (`NotReady` capture, failed request) are
    /// swallowed and the next natural iteration serves as the retry; a
    /// dead camera is the only propagated error.
    pub async fn tick(&mut self) -> Result<Tick, PollError> {
        if self.torn_down() || self.status == PollerStatus::Stopped {
            self.status = PollerStatus::Stopped;
            return Ok(Tick::Stopped);
        }

        // While a banner is shown, no frame is captured and no request
        // is issued; just wait out the remaining suspension.
        if let PollerStatus::Suspended(until) = self.status {
            let now = self.clock.now();
            if now < until {
                return Ok(Tick::Next(until.duration_since(now)));
            }
            self.status = PollerStatus::Idle;
        }

        self.status = PollerStatus::Capturing;
        let frame = match self.source.capture() {
            Ok(frame) => frame,
            Err(CaptureError::NotReady) => {
                tracing::trace!("frame not ready; rescheduling");
                self.status = PollerStatus::Idle;
                return Ok(Tick::Next(Duration::ZERO));
            }
            Err(CaptureError::Device(msg)) => {
                self.status = PollerStatus::Stopped;
                return Err(PollError::Device(msg));
            }
        };

        self.status = PollerStatus::AwaitingResult;
        let result = self.recognizer.recognize(&frame).await;

        // The owning view may have torn us down during the round trip;
        // the result is discarded without any UI mutation.
        if self.torn_down() {
            self.status = PollerStatus::Stopped;
            return Ok(Tick::Stopped);
        }

        let faces = match result {
            Ok(faces) => faces,
            Err(err) => {
                tracing::warn!(error = %err, "recognition request failed; next cycle retries");
                self.status = PollerStatus::Idle;
                return Ok(Tick::Next(Duration::ZERO));
            }
        };

        if self.opts.overlay {
            self.events.overlay(&faces);
        }

        let mut notified = false;
        if self.opts.notify {
            let now = self.clock.now();
            for face in faces.iter().filter(|f| f.is_known()) {
                if self.debounce.should_notify(&face.name, now) {
                    tracing::info!(name = %face.name, "recognized");
                    self.events.recognized(&face.name);
                    notified = true;
                }
            }
        }

        if notified {
            self.status = PollerStatus::Suspended(self.clock.now() + self.opts.display);
            Ok(Tick::Next(self.opts.display))
        } else {
            self.status = PollerStatus::Idle;
            Ok(Tick::Next(Duration::ZERO))
        }
    }

    /// Drive the loop until the shutdown flag flips or the camera dies.
    ///
    /// No timeout is placed on the recognition request: a hung request
    /// delays the next iteration until it resolves or the loop is torn
    /// down. Known limitation.
    pub async fn run_until_shutdown(&mut self) -> Result<(), PollError> {
        loop {
            match self.tick().await? {
                Tick::Stopped => return Ok(()),
                Tick::Next(delay) if delay.is_zero() => tokio::task::yield_now().await,
                Tick::Next(delay) => {
                    let sleep = tokio::time::sleep(delay);
                    tokio::pin!(sleep);
                    // Wake early on teardown so the next tick observes it.
                    tokio::select! {
                        _ = &mut sleep => {}
                        _ = self.shutdown.changed() => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::ManualClock;
    use crate::types::BoundingBox;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    fn face(name: &str) -> DetectedFace {
        DetectedFace {
            name: name.into(),
            bbox: BoundingBox { x: 0.0, y: 0.0, width: 10.0, height: 10.0 },
            confidence: None,
        }
    }

    fn frame() -> Frame {
        Frame { data_url: "data:image/jpeg;base64,AAAA".into(), width: 4, height: 4 }
    }

    /// Scripted frame source; pops one result per capture.
    struct ScriptedSource {
        script: VecDeque<Result<Frame, CaptureError>>,
        captures: Rc<Cell<usize>>,
    }

    impl ScriptedSource {
        fn always_ready() -> Self {
            Self { script: VecDeque::new(), captures: Rc::new(Cell::new(0)) }
        }

        fn scripted(script: Vec<Result<Frame, CaptureError>>) -> Self {
            Self { script: script.into(), captures: Rc::new(Cell::new(0)) }
        }
    }

    impl FrameSource for ScriptedSource {
        fn capture(&mut self) -> Result<Frame, CaptureError> {
            self.captures.set(self.captures.get() + 1);
            self.script.pop_front().unwrap_or_else(|| Ok(frame()))
        }
    }

    /// Scripted recognizer; counts submissions, optionally flips the
    /// shutdown flag mid-flight to simulate teardown during a round trip.
    struct ScriptedRecognizer {
        script: RefCell<VecDeque<Result<Vec<DetectedFace>, RecognizeError>>>,
        submissions: Rc<Cell<usize>>,
        teardown_mid_flight: RefCell<Option<watch::Sender<bool>>>,
    }

    impl ScriptedRecognizer {
        fn returning(script: Vec<Result<Vec<DetectedFace>, RecognizeError>>) -> Self {
            Self {
                script: RefCell::new(script.into()),
                submissions: Rc::new(Cell::new(0)),
                teardown_mid_flight: RefCell::new(None),
            }
        }
    }

    impl Recognizer for ScriptedRecognizer {
        async fn recognize(&self, _frame: &Frame) -> Result<Vec<DetectedFace>, RecognizeError> {
            self.submissions.set(self.submissions.get() + 1);
            if let Some(tx) = self.teardown_mid_flight.borrow_mut().take() {
                let _ = tx.send(true);
            }
            self.script.borrow_mut().pop_front().unwrap_or_else(|| Ok(vec![]))
        }
    }

    /// Records everything surfaced to the UI layer.
    #[derive(Clone, Default)]
    struct Recorder {
        notices: Rc<RefCell<Vec<String>>>,
        overlays: Rc<RefCell<Vec<Vec<DetectedFace>>>>,
    }

    impl PollerEvents for Recorder {
        fn recognized(&mut self, name: &str) {
            self.notices.borrow_mut().push(name.to_string());
        }

        fn overlay(&mut self, faces: &[DetectedFace]) {
            self.overlays.borrow_mut().push(faces.to_vec());
        }
    }

    fn poller<const N: usize>(
        responses: [Result<Vec<DetectedFace>, RecognizeError>; N],
        opts: PollerOptions,
    ) -> (
        Poller<ScriptedSource, ScriptedRecognizer, ManualClock, Recorder>,
        ManualClock,
        Recorder,
        watch::Sender<bool>,
        Rc<Cell<usize>>,
    ) {
        let clock = ManualClock::new();
        let recorder = Recorder::default();
        let recognizer = ScriptedRecognizer::returning(responses.into());
        let submissions = recognizer.submissions.clone();
        let (tx, rx) = watch::channel(false);
        let poller = Poller::new(
            ScriptedSource::always_ready(),
            recognizer,
            clock.clone(),
            recorder.clone(),
            opts,
            rx,
        );
        (poller, clock, recorder, tx, submissions)
    }

    #[tokio::test]
    async fn test_single_notification_within_cooldown() {
        // Alice at t=0 and t=500ms: exactly one notification.
        let opts = PollerOptions { display: Duration::ZERO, ..Default::default() };
        let (mut poller, clock, recorder, _tx, _subs) =
            poller([Ok(vec![face("Alice")]), Ok(vec![face("Alice")])], opts);

        poller.tick().await.unwrap();
        clock.advance(Duration::from_millis(500));
        poller.tick().await.unwrap();

        assert_eq!(*recorder.notices.borrow(), vec!["Alice"]);
    }

    #[tokio::test]
    async fn test_renotifies_after_cooldown() {
        let opts = PollerOptions { display: Duration::ZERO, ..Default::default() };
        let (mut poller, clock, recorder, _tx, _subs) =
            poller([Ok(vec![face("Alice")]), Ok(vec![face("Alice")])], opts);

        poller.tick().await.unwrap();
        clock.advance(Duration::from_millis(2000));
        poller.tick().await.unwrap();

        assert_eq!(*recorder.notices.borrow(), vec!["Alice", "Alice"]);
    }

    #[tokio::test]
    async fn test_unknown_never_notifies() {
        let (mut poller, _clock, recorder, _tx, _subs) =
            poller([Ok(vec![face("Unknown")])], PollerOptions::default());

        let tick = poller.tick().await.unwrap();

        assert!(recorder.notices.borrow().is_empty());
        assert_eq!(tick, Tick::Next(Duration::ZERO));
        assert_eq!(poller.status(), PollerStatus::Idle);
    }

    #[tokio::test]
    async fn test_notification_suspends_for_display_duration() {
        let (mut poller, clock, _recorder, _tx, submissions) =
            poller([Ok(vec![face("Alice")])], PollerOptions::default());

        let tick = poller.tick().await.unwrap();
        assert_eq!(tick, Tick::Next(Duration::from_millis(1000)));
        assert!(matches!(poller.status(), PollerStatus::Suspended(_)));

        // Mid-suspension: no capture, no submission, just the remainder.
        clock.advance(Duration::from_millis(400));
        let tick = poller.tick().await.unwrap();
        assert_eq!(tick, Tick::Next(Duration::from_millis(600)));
        assert_eq!(submissions.get(), 1);

        // Suspension elapsed: capture resumes.
        clock.advance(Duration::from_millis(600));
        poller.tick().await.unwrap();
        assert_eq!(submissions.get(), 2);
    }

    #[tokio::test]
    async fn test_not_ready_reschedules_without_submitting() {
        let clock = ManualClock::new();
        let recognizer = ScriptedRecognizer::returning(vec![]);
        let submissions = recognizer.submissions.clone();
        let (_tx, rx) = watch::channel(false);
        let mut poller = Poller::new(
            ScriptedSource::scripted(vec![Err(CaptureError::NotReady), Ok(frame())]),
            recognizer,
            clock,
            Recorder::default(),
            PollerOptions::default(),
            rx,
        );

        let tick = poller.tick().await.unwrap();
        assert_eq!(tick, Tick::Next(Duration::ZERO));
        assert_eq!(submissions.get(), 0);

        poller.tick().await.unwrap();
        assert_eq!(submissions.get(), 1);
    }

    #[tokio::test]
    async fn test_request_failure_swallowed() {
        let (mut poller, _clock, recorder, _tx, _subs) = poller(
            [
                Err(RecognizeError::Network("connection refused".into())),
                Ok(vec![face("Alice")]),
            ],
            PollerOptions::default(),
        );

        let tick = poller.tick().await.unwrap();
        assert_eq!(tick, Tick::Next(Duration::ZERO));
        assert!(recorder.notices.borrow().is_empty());

        // The next natural iteration is the retry.
        poller.tick().await.unwrap();
        assert_eq!(*recorder.notices.borrow(), vec!["Alice"]);
    }

    #[tokio::test]
    async fn test_dead_camera_propagates() {
        let clock = ManualClock::new();
        let (_tx, rx) = watch::channel(false);
        let mut poller = Poller::new(
            ScriptedSource::scripted(vec![Err(CaptureError::Device("unplugged".into()))]),
            ScriptedRecognizer::returning(vec![]),
            clock,
            Recorder::default(),
            PollerOptions::default(),
            rx,
        );

        assert!(poller.tick().await.is_err());
        assert_eq!(poller.status(), PollerStatus::Stopped);
    }

    #[tokio::test]
    async fn test_teardown_stops_scheduling() {
        let (mut poller, _clock, _recorder, tx, submissions) =
            poller([Ok(vec![face("Alice")])], PollerOptions::default());

        tx.send(true).unwrap();
        let tick = poller.tick().await.unwrap();

        assert_eq!(tick, Tick::Stopped);
        assert_eq!(poller.status(), PollerStatus::Stopped);
        assert_eq!(submissions.get(), 0);
    }

    #[tokio::test]
    async fn test_result_after_teardown_discarded() {
        // Teardown lands while the request is in flight: the submission
        // completes, its result produces no UI mutation.
        let clock = ManualClock::new();
        let recorder = Recorder::default();
        let recognizer = ScriptedRecognizer::returning(vec![Ok(vec![face("Alice")])]);
        let submissions = recognizer.submissions.clone();
        let (tx, rx) = watch::channel(false);
        *recognizer.teardown_mid_flight.borrow_mut() = Some(tx);
        let mut poller = Poller::new(
            ScriptedSource::always_ready(),
            recognizer,
            clock,
            recorder.clone(),
            PollerOptions::default(),
            rx,
        );

        let tick = poller.tick().await.unwrap();

        assert_eq!(submissions.get(), 1);
        assert_eq!(tick, Tick::Stopped);
        assert!(recorder.notices.borrow().is_empty());
        assert!(recorder.overlays.borrow().is_empty());

        // Stopped is terminal.
        assert_eq!(poller.tick().await.unwrap(), Tick::Stopped);
        assert_eq!(submissions.get(), 1);
    }

    #[tokio::test]
    async fn test_overlay_ignores_cooldown() {
        let opts = PollerOptions { notify: false, overlay: true, ..Default::default() };
        let (mut poller, clock, recorder, _tx, _subs) = poller(
            [
                Ok(vec![face("Alice"), face("Unknown")]),
                Ok(vec![face("Alice")]),
            ],
            opts,
        );

        poller.tick().await.unwrap();
        clock.advance(Duration::from_millis(100));
        poller.tick().await.unwrap();

        // Every response annotated, recognized or not, no debouncing.
        let overlays = recorder.overlays.borrow();
        assert_eq!(overlays.len(), 2);
        assert_eq!(overlays[0].len(), 2);
        assert_eq!(overlays[1].len(), 1);
        assert!(recorder.notices.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_submissions_strictly_serialized() {
        // One submission per completed tick, never more: with three
        // responses queued, three ticks yield exactly three submissions
        // in script order.
        let opts = PollerOptions { display: Duration::ZERO, ..Default::default() };
        let (mut poller, clock, recorder, _tx, submissions) = poller(
            [
                Ok(vec![face("Alice")]),
                Ok(vec![face("Bob")]),
                Ok(vec![]),
            ],
            opts,
        );

        for expected in 1..=3 {
            poller.tick().await.unwrap();
            assert_eq!(submissions.get(), expected);
            clock.advance(Duration::from_millis(3000));
        }
        assert_eq!(*recorder.notices.borrow(), vec!["Alice", "Bob"]);
    }
}

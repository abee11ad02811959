//! Live recognition: a capture worker feeding annotated results to the caller.
//!
//! The worker thread owns the frame source for the whole session. It detects,
//! encodes and matches every face per frame, then hands the result over a
//! bounded channel. The calling thread consumes events until the worker ends,
//! which happens on [`StopSignal::request`], a capture failure, or the frame limit.

use facecat_core::annotate::annotate;
use facecat_core::pipeline::{self, FaceEncoder};
use facecat_core::{EuclideanMatcher, KnownFace, RecognizedFace};
use facecat_hw::FrameSource;
use image::RgbImage;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

const EVENT_QUEUE_DEPTH: usize = 2;

/// Messages sent from the capture worker to the consumer.
pub enum LiveEvent {
    Frame {
        sequence: u32,
        faces: Vec<RecognizedFace>,
        /// The frame with a box drawn around every face, when requested.
        annotated: Option<RgbImage>,
    },
    Ended(LiveEnd),
}

/// Why a live session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEnd {
    Stopped,
    FrameLimit,
    CaptureFailed(String),
    RecognitionFailed(String),
    ConsumerGone,
}

impl fmt::Display for LiveEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveEnd::Stopped => f.write_str("stopped"),
            LiveEnd::FrameLimit => f.write_str("frame limit reached"),
            LiveEnd::CaptureFailed(e) => write!(f, "capture failed: {e}"),
            LiveEnd::RecognitionFailed(e) => write!(f, "recognition failed: {e}"),
            LiveEnd::ConsumerGone => f.write_str("consumer gone"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LiveOptions {
    pub max_frames: Option<usize>,
    pub annotate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSummary {
    pub frames: usize,
    pub end: LiveEnd,
}

#[derive(Default)]
struct StopState {
    listening: AtomicBool,
    stopped: AtomicBool,
}

/// Clone-safe stop flag shared between the interrupt handler and a live session.
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<StopState>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask a running session to stop. Returns false when no session is listening.
    pub fn request(&self) -> bool {
        if self.inner.listening.load(Ordering::SeqCst) {
            self.inner.stopped.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    fn arm(&self) {
        self.inner.stopped.store(false, Ordering::SeqCst);
        self.inner.listening.store(true, Ordering::SeqCst);
    }

    fn disarm(&self) {
        self.inner.listening.store(false, Ordering::SeqCst);
    }
}

/// Run a live session until it ends, calling `on_event` for every event.
///
/// Must not be called from inside an async context: the consumer side blocks
/// on the channel.
pub fn run<S, E, F>(
    source: &mut S,
    encoder: &mut E,
    gallery: &[KnownFace],
    stop: &StopSignal,
    options: &LiveOptions,
    mut on_event: F,
) -> std::io::Result<LiveSummary>
where
    S: FrameSource + Send,
    E: FaceEncoder + Send,
    F: FnMut(&LiveEvent),
{
    stop.arm();
    let (tx, mut rx) = mpsc::channel::<LiveEvent>(EVENT_QUEUE_DEPTH);

    let result = std::thread::scope(|scope| {
        let worker = std::thread::Builder::new()
            .name("facecat-live".into())
            .spawn_scoped(scope, move || capture_loop(source, encoder, gallery, stop, options, tx))?;

        tracing::info!(known = gallery.len(), "live recognition started");

        let mut frames = 0usize;
        let mut end = LiveEnd::ConsumerGone;
        while let Some(event) = rx.blocking_recv() {
            match &event {
                LiveEvent::Frame { .. } => frames += 1,
                LiveEvent::Ended(reason) => end = reason.clone(),
            }
            on_event(&event);
        }

        if worker.join().is_err() {
            end = LiveEnd::RecognitionFailed("capture worker panicked".into());
        }
        Ok(LiveSummary { frames, end })
    });

    stop.disarm();
    if let Ok(summary) = &result {
        tracing::info!(frames = summary.frames, end = ?summary.end, "live recognition ended");
    }
    result
}

/// Prints recognized names as they change and keeps the snapshot file current.
pub struct LiveReporter<W> {
    out: W,
    snapshot: Option<PathBuf>,
    last_labels: Vec<String>,
}

impl<W: Write> LiveReporter<W> {
    pub fn new(out: W, snapshot: Option<PathBuf>) -> Self {
        Self {
            out,
            snapshot,
            last_labels: Vec::new(),
        }
    }

    pub fn handle(&mut self, event: &LiveEvent) -> std::io::Result<()> {
        match event {
            LiveEvent::Frame {
                sequence,
                faces,
                annotated,
            } => {
                if let (Some(path), Some(image)) = (&self.snapshot, annotated) {
                    if let Err(e) = image.save(path) {
                        tracing::warn!(path = %path.display(), error = %e, "failed to write snapshot");
                    }
                }
                let labels: Vec<String> = faces.iter().map(|f| f.label().to_string()).collect();
                if labels != self.last_labels {
                    if labels.is_empty() {
                        writeln!(self.out, "frame {sequence}: no faces")?;
                    } else {
                        writeln!(self.out, "frame {sequence}: {}", labels.join(", "))?;
                    }
                    self.last_labels = labels;
                }
            }
            LiveEvent::Ended(end) => writeln!(self.out, "live recognition {end}")?,
        }
        self.out.flush()
    }
}

/// Capture, recognize and forward frames until told to stop or the source fails.
fn capture_loop<S, E>(
    source: &mut S,
    encoder: &mut E,
    gallery: &[KnownFace],
    stop: &StopSignal,
    options: &LiveOptions,
    tx: mpsc::Sender<LiveEvent>,
) where
    S: FrameSource,
    E: FaceEncoder,
{
    let matcher = EuclideanMatcher::default();
    let mut sent = 0usize;

    let end = loop {
        if stop.is_stopped() {
            break LiveEnd::Stopped;
        }
        if options.max_frames.is_some_and(|max| sent >= max) {
            break LiveEnd::FrameLimit;
        }

        let frame = match source.next_frame() {
            Ok(frame) => frame,
            Err(e) => break LiveEnd::CaptureFailed(e.to_string()),
        };
        if frame.is_dark {
            tracing::debug!(seq = frame.sequence, "skipping dark frame");
            continue;
        }

        let sequence = frame.sequence;
        let Some(image) = frame.into_rgb_image() else {
            break LiveEnd::CaptureFailed(format!("frame {sequence} does not match its dimensions"));
        };

        let faces = match pipeline::recognize(encoder, &matcher, &image, gallery) {
            Ok(faces) => faces,
            Err(e) => break LiveEnd::RecognitionFailed(e.to_string()),
        };
        tracing::trace!(seq = sequence, faces = faces.len(), "frame recognized");

        let annotated = options.annotate.then(|| {
            let mut image = image;
            annotate(&mut image, &faces);
            image
        });

        if tx
            .blocking_send(LiveEvent::Frame {
                sequence,
                faces,
                annotated,
            })
            .is_err()
        {
            return;
        }
        sent += 1;
    };

    let _ = tx.blocking_send(LiveEvent::Ended(end));
}

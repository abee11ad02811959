//! User-level flows over the store and the face encoder.

use crate::live::{self, LiveEvent, LiveOptions, LiveReporter, LiveSummary, StopSignal};
use crate::status::Status;
use anyhow::{Context, Result};
use facecat_core::pipeline::{self, FaceEncoder};
use facecat_core::{EuclideanMatcher, KnownFaces};
use facecat_hw::{Camera, FrameSource};
use facecat_store::{validate_name, FaceStore};
use std::io::Write;
use std::path::Path;

pub struct Catalog<E> {
    store: FaceStore,
    encoder: E,
    matcher: EuclideanMatcher,
}

impl<E: FaceEncoder> Catalog<E> {
    pub fn new(store: FaceStore, encoder: E) -> Self {
        Self {
            store,
            encoder,
            matcher: EuclideanMatcher::default(),
        }
    }

    /// Identify every face in the photo at `path`.
    pub fn identify(&mut self, path: &Path) -> Result<Status> {
        if self.store.is_empty() {
            return Ok(Status::NoKnownFaces);
        }

        let image = pipeline::load_for_identify(path).with_context(|| format!("failed to load {}", path.display()))?;
        let faces = pipeline::recognize(&mut self.encoder, &self.matcher, &image, self.store.known().as_slice())
            .context("recognition failed")?;
        if faces.is_empty() {
            return Ok(Status::NoFaceInUpload);
        }

        for face in &faces {
            tracing::debug!(label = face.label(), distance = ?face.result.distance, "face identified");
        }
        Ok(Status::Identified(faces.iter().map(|f| f.label().to_string()).collect()))
    }

    /// Enroll the first face in the photo at `path` under `name`.
    pub fn add(&mut self, name: &str, path: &Path) -> Result<Status> {
        let Ok(name) = validate_name(name) else {
            return Ok(Status::EmptyName);
        };

        let image = pipeline::load_for_enroll(path).with_context(|| format!("failed to load {}", path.display()))?;
        let Some(embedding) = pipeline::encode_first_face(&mut self.encoder, &image).context("encoding failed")? else {
            return Ok(Status::NoFaceInImage);
        };

        self.store.insert(name, &embedding).context("failed to store face")?;
        Ok(Status::Added(name.to_string()))
    }

    /// Remove every entry stored under `name`.
    pub fn delete(&mut self, name: &str) -> Result<Status> {
        let removed = self.store.delete(name).context("failed to delete face")?;
        Ok(Status::deleted(name, removed))
    }

    pub fn known(&self) -> &KnownFaces {
        self.store.known()
    }

    /// Run live recognition against the current catalog. Blocks until the session ends.
    pub fn live<S, F>(&mut self, source: &mut S, stop: &StopSignal, options: &LiveOptions, on_event: F) -> Result<LiveSummary>
    where
        S: FrameSource + Send,
        E: Send,
        F: FnMut(&LiveEvent),
    {
        live::run(source, &mut self.encoder, self.store.known().as_slice(), stop, options, on_event)
            .context("failed to start live capture")
    }

    /// Open the camera at `device`, run live recognition and release the camera on return.
    pub fn live_camera<W: Write>(
        &mut self,
        device: &str,
        stop: &StopSignal,
        options: &LiveOptions,
        reporter: &mut LiveReporter<W>,
    ) -> Result<LiveSummary>
    where
        E: Send,
    {
        let camera = Camera::open(device).with_context(|| format!("failed to open camera {device}"))?;
        let mut stream = camera.stream().context("failed to start camera stream")?;
        self.live(&mut stream, stop, options, |event| {
            if let Err(e) = reporter.handle(event) {
                tracing::warn!(error = %e, "failed to report live event");
            }
        })
    }

    pub fn close(self) -> Result<()> {
        self.store.close().context("failed to close face catalog")
    }

    #[cfg(test)]
    pub(crate) fn encoder(&self) -> &E {
        &self.encoder
    }
}

use crate::config::Config;
use facecat_core::{BoundingBox, Embedding, FaceEncoder, FaceEngine, PipelineError};
use image::RgbImage;

/// [`FaceEngine`] that loads its models on first use, once per process.
///
/// Commands that never reach a model (an empty catalog, a blank name, `list`)
/// start without touching the model files.
pub struct LazyEngine {
    scrfd_path: String,
    arcface_path: String,
    intra_threads: usize,
    engine: Option<FaceEngine>,
}

impl LazyEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            scrfd_path: config.scrfd_model_path(),
            arcface_path: config.arcface_model_path(),
            intra_threads: config.intra_threads,
            engine: None,
        }
    }

    fn engine(&mut self) -> Result<&mut FaceEngine, PipelineError> {
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => {
                tracing::info!(threads = self.intra_threads, "loading face models");
                FaceEngine::load(&self.scrfd_path, &self.arcface_path, self.intra_threads)?
            }
        };
        Ok(self.engine.insert(engine))
    }
}

impl FaceEncoder for LazyEngine {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<BoundingBox>, PipelineError> {
        self.engine()?.detect(image)
    }

    fn encode(&mut self, image: &RgbImage, face: &BoundingBox) -> Result<Embedding, PipelineError> {
        self.engine()?.encode(image, face)
    }
}

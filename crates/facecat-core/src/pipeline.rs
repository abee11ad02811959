//! Detect → encode → match orchestration.
//!
//! The pipeline only talks to the models through [`FaceEncoder`], so the
//! same flow runs against SCRFD + ArcFace ([`FaceEngine`]) or a test double.

use crate::detector::{DetectorError, FaceDetector};
use crate::matcher::Matcher;
use crate::recognizer::{FaceRecognizer, RecognizerError};
use crate::types::{BoundingBox, Embedding, KnownFace, RecognizedFace};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbImage};
use std::path::Path;
use thiserror::Error;

/// Canonical side length uploaded photos are resized to before identification.
pub const IDENTIFY_SIZE: u32 = 500;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("detector: {0}")]
    Detector(#[from] DetectorError),
    #[error("recognizer: {0}")]
    Recognizer(#[from] RecognizerError),
}

/// Face detection and embedding backend.
pub trait FaceEncoder {
    /// Locate faces, most confident first.
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<BoundingBox>, PipelineError>;

    /// Compute the embedding of one detected face.
    fn encode(&mut self, image: &RgbImage, face: &BoundingBox) -> Result<Embedding, PipelineError>;
}

/// SCRFD detector paired with the ArcFace recognizer.
pub struct FaceEngine {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl FaceEngine {
    pub fn load(scrfd_path: &str, arcface_path: &str, intra_threads: usize) -> Result<Self, PipelineError> {
        let detector = FaceDetector::load(scrfd_path, intra_threads)?;
        let recognizer = FaceRecognizer::load(arcface_path, intra_threads)?;
        tracing::info!(scrfd = scrfd_path, arcface = arcface_path, "face engine ready");
        Ok(Self { detector, recognizer })
    }
}

impl FaceEncoder for FaceEngine {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<BoundingBox>, PipelineError> {
        Ok(self.detector.detect(image)?)
    }

    fn encode(&mut self, image: &RgbImage, face: &BoundingBox) -> Result<Embedding, PipelineError> {
        Ok(self.recognizer.extract(image, face)?)
    }
}

/// Load a photo for identification: exact resize to
/// [`IDENTIFY_SIZE`]×[`IDENTIFY_SIZE`], converted to RGB8.
pub fn load_for_identify(path: &Path) -> Result<RgbImage, PipelineError> {
    let image = read_photo(path)?;
    Ok(image
        .resize_exact(IDENTIFY_SIZE, IDENTIFY_SIZE, FilterType::Triangle)
        .to_rgb8())
}

/// Load a photo for enrollment at its original size, converted to RGB8.
pub fn load_for_enroll(path: &Path) -> Result<RgbImage, PipelineError> {
    Ok(read_photo(path)?.to_rgb8())
}

/// Decode by content, falling back to the extension when the bytes are unrecognised.
fn read_photo(path: &Path) -> Result<DynamicImage, PipelineError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// Detect every face, embed each one and match it against `gallery`.
///
/// Faces are returned in detection order (most confident first).
pub fn recognize<E, M>(
    encoder: &mut E,
    matcher: &M,
    image: &RgbImage,
    gallery: &[KnownFace],
) -> Result<Vec<RecognizedFace>, PipelineError>
where
    E: FaceEncoder + ?Sized,
    M: Matcher + ?Sized,
{
    let locations = encoder.detect(image)?;
    let mut faces = Vec::with_capacity(locations.len());
    for location in locations {
        let embedding = encoder.encode(image, &location)?;
        let result = matcher.compare(&embedding, gallery);
        faces.push(RecognizedFace { location, result });
    }
    Ok(faces)
}

/// Embedding of the first detected face, or `None` when the image has no face.
pub fn encode_first_face<E>(encoder: &mut E, image: &RgbImage) -> Result<Option<Embedding>, PipelineError>
where
    E: FaceEncoder + ?Sized,
{
    let locations = encoder.detect(image)?;
    let Some(first) = locations.first() else {
        return Ok(None);
    };
    if locations.len() > 1 {
        tracing::debug!(faces = locations.len(), "several faces found, using the first");
    }
    encoder.encode(image, first).map(Some)
}

/// Scripted [`FaceEncoder`] for tests that must run without model files.
#[cfg(any(test, feature = "test-support"))]
pub mod testing {
    use super::*;

    /// Every entry in `faces` is "detected" in every image and encoded to its paired embedding.
    #[derive(Default)]
    pub struct ScriptedEncoder {
        pub faces: Vec<(BoundingBox, Embedding)>,
        pub detect_calls: usize,
        pub encode_calls: usize,
    }

    impl ScriptedEncoder {
        pub fn with_faces(faces: Vec<(BoundingBox, Embedding)>) -> Self {
            Self { faces, ..Self::default() }
        }

        /// Same as [`ScriptedEncoder::with_faces`] with embeddings given as raw vectors.
        pub fn with_vectors(faces: Vec<(BoundingBox, Vec<f32>)>) -> Self {
            Self::with_faces(faces.into_iter().map(|(b, v)| (b, Embedding::new(v))).collect())
        }
    }

    impl FaceEncoder for ScriptedEncoder {
        fn detect(&mut self, _image: &RgbImage) -> Result<Vec<BoundingBox>, PipelineError> {
            self.detect_calls += 1;
            Ok(self.faces.iter().map(|(b, _)| b.clone()).collect())
        }

        fn encode(&mut self, _image: &RgbImage, face: &BoundingBox) -> Result<Embedding, PipelineError> {
            self.encode_calls += 1;
            let (_, embedding) = self
                .faces
                .iter()
                .find(|(b, _)| b == face)
                .expect("encode called with a box that was never detected");
            Ok(embedding.clone())
        }
    }

    pub fn bbox(x: f32) -> BoundingBox {
        BoundingBox {
            x,
            y: 10.0,
            width: 40.0,
            height: 40.0,
            confidence: 0.9,
            landmarks: None,
        }
    }
}

//! facecat-core — Face detection, embedding and matching.
//!
//! Uses SCRFD for face detection and ArcFace for face embeddings,
//! both running via ONNX Runtime for CPU inference. Matching is a
//! Euclidean nearest-neighbour search with a fixed tolerance.

pub mod alignment;
pub mod annotate;
pub mod codec;
pub mod detector;
pub mod matcher;
pub mod pipeline;
pub mod recognizer;
pub mod types;

pub use codec::{decode_embedding, encode_embedding, CodecError};
pub use detector::FaceDetector;
pub use matcher::{EuclideanMatcher, Matcher, MATCH_TOLERANCE};
pub use pipeline::{FaceEncoder, FaceEngine, PipelineError};
pub use recognizer::FaceRecognizer;
pub use types::{BoundingBox, Embedding, KnownFace, KnownFaces, MatchResult, RecognizedFace, UNKNOWN};

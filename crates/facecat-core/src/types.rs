/// Sentinel label reported for a face that matches nobody in the catalog.
pub const UNKNOWN: &str = "Unknown";

/// Bounding box for a detected face, with optional facial landmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

impl BoundingBox {
    /// Integer pixel rectangle `(left, top, right, bottom)` clamped to an image of the given size.
    pub fn pixel_rect(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        if width == 0 || height == 0 {
            return None;
        }
        let max_x = (width - 1) as f32;
        let max_y = (height - 1) as f32;
        let left = self.x.clamp(0.0, max_x).round() as u32;
        let top = self.y.clamp(0.0, max_y).round() as u32;
        let right = (self.x + self.width).clamp(0.0, max_x).round() as u32;
        let bottom = (self.y + self.height).clamp(0.0, max_y).round() as u32;
        if right <= left || bottom <= top {
            return None;
        }
        Some((left, top, right, bottom))
    }
}

/// Face embedding vector (512-dimensional for ArcFace).
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
    /// Model version that produced this embedding (e.g., "w600k_r50").
    pub model_version: Option<String>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values,
            model_version: None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Compute Euclidean distance between two embeddings.
    pub fn euclidean_distance(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// A named face stored in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownFace {
    pub id: i64,
    pub name: String,
    pub embedding: Embedding,
    pub created_at: String,
}

/// Ordered in-memory mirror of the catalog table.
///
/// Entry `i` carries both the name and the encoding of row `i`, so the
/// name and encoding views can never drift apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnownFaces {
    faces: Vec<KnownFace>,
}

impl KnownFaces {
    pub fn new(faces: Vec<KnownFace>) -> Self {
        Self { faces }
    }

    pub fn as_slice(&self) -> &[KnownFace] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KnownFace> {
        self.faces.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.faces.iter().map(|f| f.name.as_str())
    }

    pub fn embeddings(&self) -> impl Iterator<Item = &Embedding> + '_ {
        self.faces.iter().map(|f| &f.embedding)
    }

    /// Number of entries stored under exactly `name`.
    pub fn count_named(&self, name: &str) -> usize {
        self.names().filter(|n| *n == name).count()
    }
}

impl<'a> IntoIterator for &'a KnownFaces {
    type Item = &'a KnownFace;
    type IntoIter = std::slice::Iter<'a, KnownFace>;

    fn into_iter(self) -> Self::IntoIter {
        self.faces.iter()
    }
}

/// Result of matching a query embedding against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Name of the accepted match, `None` when the face is unknown.
    pub name: Option<String>,
    /// Distance to the nearest catalog entry, `None` for an empty catalog.
    pub distance: Option<f32>,
    /// Gallery index of the nearest entry (accepted or not).
    pub index: Option<usize>,
}

impl MatchResult {
    pub fn unknown() -> Self {
        Self {
            name: None,
            distance: None,
            index: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.name.is_some()
    }

    /// The matched name, or [`UNKNOWN`].
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN)
    }
}

/// One detected face together with its identification.
#[derive(Debug, Clone)]
pub struct RecognizedFace {
    pub location: BoundingBox,
    pub result: MatchResult,
}

impl RecognizedFace {
    pub fn label(&self) -> &str {
        self.result.label()
    }
}

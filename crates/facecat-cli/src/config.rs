use std::path::{Path, PathBuf};

const SCRFD_MODEL: &str = "det_10g.onnx";
const ARCFACE_MODEL: &str = "w600k_r50.onnx";

/// CLI configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// V4L2 device used by `live` (default: /dev/video0).
    pub camera_device: String,
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
    /// Path to the SQLite catalog.
    pub db_path: PathBuf,
    /// ONNX Runtime intra-op threads per session.
    pub intra_threads: usize,
}

impl Config {
    /// Load configuration from `FACECAT_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".local/share")
            })
            .join("facecat");

        let model_dir = var("FACECAT_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("models"));
        let db_path = var("FACECAT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("faces.db"));

        Self {
            camera_device: var("FACECAT_CAMERA_DEVICE").unwrap_or_else(|| facecat_hw::DEFAULT_DEVICE.to_string()),
            model_dir,
            db_path,
            intra_threads: var("FACECAT_INTRA_THREADS")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(2),
        }
    }

    /// Path to the SCRFD detection model.
    pub fn scrfd_model_path(&self) -> String {
        model_path(&self.model_dir, SCRFD_MODEL)
    }

    /// Path to the ArcFace recognition model.
    pub fn arcface_model_path(&self) -> String {
        model_path(&self.model_dir, ARCFACE_MODEL)
    }
}

fn model_path(dir: &Path, file: &str) -> String {
    dir.join(file).to_string_lossy().into_owned()
}

//! Runtime settings read from the environment.

use std::path::PathBuf;

use photofeat::DEFAULT_MAX_EDGE;
use tracing::warn;

pub const MAX_EDGE_VAR: &str = "PHOTOFEAT_MAX_EDGE";
pub const FACE_MODEL_VAR: &str = "PHOTOFEAT_FACE_MODEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_edge: u32,
    pub face_model: PathBuf,
}

impl Config {
    /// Read settings from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`. Unparseable values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_EDGE_VAR) {
            match raw.trim().parse::<u32>() {
                Ok(edge) if edge > 0 => config.max_edge = edge,
                _ => warn!(
                    value = %raw,
                    default = config.max_edge,
                    "ignoring invalid {MAX_EDGE_VAR}"
                ),
            }
        }

        if let Some(raw) = lookup(FACE_MODEL_VAR) {
            if raw.trim().is_empty() {
                warn!("ignoring empty {FACE_MODEL_VAR}");
            } else {
                config.face_model = PathBuf::from(raw);
            }
        }

        config
    }

    /// Relative to the working directory. No model ships with the binary, so
    /// face detection stays off unless this file (or `PHOTOFEAT_FACE_MODEL`) exists.
    pub fn default_face_model() -> PathBuf {
        PathBuf::from("model/seeta_fd_frontal_v1.0.bin")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_edge: DEFAULT_MAX_EDGE,
            face_model: Self::default_face_model(),
        }
    }
}

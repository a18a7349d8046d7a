use std::fmt;

/// Which feature backends were negotiated for an extractor.
///
/// A missing capability does not fail extraction; the corresponding field is
/// filled with its neutral value instead (no faces, no saliency point, a score
/// of 5.0, a level horizon).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Face detection.
    pub faces: bool,
    /// Saliency peak.
    pub saliency: bool,
    /// Aesthetic scoring.
    pub aesthetic: bool,
    /// Horizon tilt.
    pub horizon: bool,
}

impl Capabilities {
    /// True when every backend is available.
    pub fn all(&self) -> bool {
        self.faces && self.saliency && self.aesthetic && self.horizon
    }

    /// Names of the capabilities that are not available.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("faces", self.faces),
            ("saliency", self.saliency),
            ("aesthetic", self.aesthetic),
            ("horizon", self.horizon),
        ]
        .into_iter()
        .filter_map(|(name, available)| (!available).then_some(name))
        .collect()
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |on: bool| if on { "on" } else { "off" };
        write!(
            f,
            "faces={} saliency={} aesthetic={} horizon={}",
            mark(self.faces),
            mark(self.saliency),
            mark(self.aesthetic),
            mark(self.horizon)
        )
    }
}

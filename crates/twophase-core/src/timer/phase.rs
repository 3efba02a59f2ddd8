use serde::{Deserialize, Serialize};

/// One of the two alternating intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    /// The phase that follows this one.
    pub fn opposite(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    pub fn is_work(self) -> bool {
        self == Phase::Work
    }

    pub fn from_is_work(is_work: bool) -> Self {
        if is_work {
            Phase::Work
        } else {
            Phase::Break
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::Break => "Break",
        }
    }

    /// Glyph shown in front of the indicator while the phase is running.
    pub fn icon(self) -> &'static str {
        match self {
            Phase::Work => "▶",
            Phase::Break => "☕",
        }
    }

    /// Message sent to the notification sink when this phase runs out.
    pub fn completion_message(self) -> &'static str {
        match self {
            Phase::Work => "Work session finished! Take a break.",
            Phase::Break => "Break finished! Back to work.",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

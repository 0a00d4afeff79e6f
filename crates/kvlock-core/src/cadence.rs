//! Retry cadence presets for the acquisition poll loop.

use std::time::Duration;

/// How aggressively an acquisition call polls the store while waiting.
///
/// The cadence is a closed set of fixed intervals; a contender sleeps for
/// one interval between consecutive set-if-absent attempts. The number of
/// attempts a call makes is its timeout budget divided by this interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RetryCadence {
    /// Poll every 10 ms.
    VeryQuick,
    /// Poll every 50 ms.
    Quick,
    /// Poll every 100 ms. The default.
    #[default]
    Normal,
    /// Poll every 500 ms.
    Slow,
    /// Poll every 1000 ms.
    VerySlow,
}

impl RetryCadence {
    /// Returns the fixed interval between successive acquisition attempts.
    pub fn interval(&self) -> Duration {
        match self {
            Self::VeryQuick => Duration::from_millis(10),
            Self::Quick => Duration::from_millis(50),
            Self::Normal => Duration::from_millis(100),
            Self::Slow => Duration::from_millis(500),
            Self::VerySlow => Duration::from_millis(1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_intervals() {
        assert_eq!(RetryCadence::VeryQuick.interval(), Duration::from_millis(10));
        assert_eq!(RetryCadence::Quick.interval(), Duration::from_millis(50));
        assert_eq!(RetryCadence::Normal.interval(), Duration::from_millis(100));
        assert_eq!(RetryCadence::Slow.interval(), Duration::from_millis(500));
        assert_eq!(RetryCadence::VerySlow.interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(RetryCadence::default(), RetryCadence::Normal);
    }
}

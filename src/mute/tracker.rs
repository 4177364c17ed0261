use std::collections::HashMap;

use crate::common::types::CandidateKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceChange {
    /// Same source as last observed; a redundant event.
    Unchanged,
    Changed { previous: Option<String> },
}

/// Last observed media source per candidate.
#[derive(Debug, Default)]
pub struct SourceTracker {
    sources: HashMap<CandidateKey, Option<String>>,
}

impl SourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `current` and reports whether it differs from the previous
    /// observation. The first observation of a candidate counts as a change.
    pub fn observe(&mut self, key: CandidateKey, current: Option<&str>) -> SourceChange {
        match self.sources.get(&key) {
            Some(last) if last.as_deref() == current => SourceChange::Unchanged,
            _ => {
                let previous = self
                    .sources
                    .insert(key, current.map(str::to_string))
                    .flatten();
                SourceChange::Changed { previous }
            }
        }
    }

    pub fn last(&self, key: CandidateKey) -> Option<&str> {
        self.sources.get(&key).and_then(|src| src.as_deref())
    }

    pub fn forget(&mut self, key: CandidateKey) {
        self.sources.remove(&key);
    }

    pub fn keys(&self) -> Vec<CandidateKey> {
        self.sources.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::NodeId;

    #[test]
    fn reports_each_transition_once() {
        let mut tracker = SourceTracker::new();
        let key = CandidateKey::Node(NodeId(2));

        assert_eq!(
            tracker.observe(key, Some("https://content.example/video.mp4")),
            SourceChange::Changed { previous: None }
        );
        assert_eq!(
            tracker.observe(key, Some("https://content.example/video.mp4")),
            SourceChange::Unchanged
        );
        assert_eq!(
            tracker.observe(key, Some("https://doubleclick.net/ad.mp4")),
            SourceChange::Changed {
                previous: Some("https://content.example/video.mp4".into())
            }
        );
        assert_eq!(tracker.last(key), Some("https://doubleclick.net/ad.mp4"));

        tracker.forget(key);
        assert!(tracker.last(key).is_none());
    }
}

use serde::Serialize;

/// Where an analysis request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisStage {
    Idle,
    Fetching,
    WaitingOnModel,
    Done,
    Error,
}

impl AnalysisStage {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisStage::Idle => "idle",
            AnalysisStage::Fetching => "fetching",
            AnalysisStage::WaitingOnModel => "waiting-on-model",
            AnalysisStage::Done => "done",
            AnalysisStage::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisStage::Done | AnalysisStage::Error)
    }

    /// Catalog key of the loading message shown while in this stage.
    pub fn message_key(self) -> Option<&'static str> {
        match self {
            AnalysisStage::Fetching => Some("analyze.loading.stages.fetch"),
            AnalysisStage::WaitingOnModel => Some("analyze.loading.stages.calculate"),
            _ => None,
        }
    }

    pub fn can_transition_to(self, next: AnalysisStage) -> bool {
        use AnalysisStage::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Idle, Error)
                | (Fetching, WaitingOnModel)
                | (Fetching, Error)
                | (WaitingOnModel, Done)
                | (WaitingOnModel, Error)
        )
    }
}

/// Receives stage transitions of one request.
pub trait StageObserver: Send + Sync {
    fn on_stage(&self, stage: AnalysisStage);
}

impl<F> StageObserver for F
where
    F: Fn(AnalysisStage) + Send + Sync,
{
    fn on_stage(&self, stage: AnalysisStage) {
        self(stage)
    }
}

/// Observer that ignores every transition.
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_stage(&self, _stage: AnalysisStage) {}
}

/// Tracks the current stage of one request and forwards transitions.
pub(crate) struct StageTracker<'a> {
    current: AnalysisStage,
    observer: &'a dyn StageObserver,
}

impl<'a> StageTracker<'a> {
    pub(crate) fn new(observer: &'a dyn StageObserver) -> Self {
        Self {
            current: AnalysisStage::Idle,
            observer,
        }
    }

    pub(crate) fn current(&self) -> AnalysisStage {
        self.current
    }

    pub(crate) fn advance(&mut self, next: AnalysisStage) {
        if !self.current.can_transition_to(next) {
            tracing::warn!(from = self.current.as_str(), to = next.as_str(), "analyze.stage.unexpected");
        }
        tracing::debug!(from = self.current.as_str(), to = next.as_str(), "analyze.stage");
        self.current = next;
        self.observer.on_stage(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn happy_path_transitions_are_allowed() {
        use AnalysisStage::*;
        assert!(Idle.can_transition_to(Fetching));
        assert!(Fetching.can_transition_to(WaitingOnModel));
        assert!(WaitingOnModel.can_transition_to(Done));
        assert!(!Done.can_transition_to(Fetching));
        assert!(!Idle.can_transition_to(Done));
        assert!(Done.is_terminal() && Error.is_terminal());
    }

    #[test]
    fn serializes_kebab_case() {
        let v = serde_json::to_value(AnalysisStage::WaitingOnModel).unwrap();
        assert_eq!(v, serde_json::json!("waiting-on-model"));
        assert_eq!(AnalysisStage::WaitingOnModel.as_str(), "waiting-on-model");
    }

    #[test]
    fn tracker_forwards_to_closure_observer() {
        let seen = Mutex::new(Vec::new());
        let observer = |stage: AnalysisStage| seen.lock().unwrap().push(stage);
        let mut tracker = StageTracker::new(&observer);
        tracker.advance(AnalysisStage::Fetching);
        tracker.advance(AnalysisStage::Error);
        assert_eq!(tracker.current(), AnalysisStage::Error);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![AnalysisStage::Fetching, AnalysisStage::Error]
        );
    }

    #[test]
    fn loading_messages_exist_only_for_active_stages() {
        assert!(AnalysisStage::Fetching.message_key().is_some());
        assert!(AnalysisStage::WaitingOnModel.message_key().is_some());
        assert!(AnalysisStage::Done.message_key().is_none());
    }
}

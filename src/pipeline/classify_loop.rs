use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::classify::classifier::{ClassScore, PoseClassifier};
use crate::classify::input::build_input;
use crate::pipeline::state::{KeypointSlot, PoseLabel, SharedState};

/// Called with the accepted label text whenever it changes.
pub type LabelHook = Box<dyn Fn(&str) + Send>;

pub fn noop_hook() -> LabelHook {
    Box::new(|_| {})
}

#[derive(Debug, Clone, Copy)]
pub struct ClassifySettings {
    /// Results below this confidence keep the previous label.
    pub acceptance_threshold: f32,
    /// Cadence of classification rounds.
    pub interval: Duration,
}

impl Default for ClassifySettings {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.70,
            interval: Duration::from_millis(1000),
        }
    }
}

/// Returns the top-ranked score when it clears the acceptance threshold.
/// The list is ranked by the classifier, so only the first entry is consulted.
pub fn accept_top(scores: &[ClassScore], threshold: f32) -> Option<&ClassScore> {
    let top = scores.first()?;
    if top.confidence >= threshold {
        Some(top)
    } else {
        None
    }
}

/// Confidence rounded to two decimals for the panel.
pub fn display_score(confidence: f32) -> f32 {
    (confidence * 100.0).round() / 100.0
}

/// Background classification worker.
///
/// Each round takes the latest published pose from the slot (an empty slot
/// skips the round without breaking cadence), classifies it, and on an
/// accepted result updates the shared label and fires the hook when the label
/// text changed. Change detection is seeded from the label already on the
/// shared state, so a restarted worker stays quiet until the label really
/// moves. Classification errors are logged and the loop continues.
///
/// The worker owns the classifier for its whole life; `stop` joins the thread
/// and hands the classifier back, so no round can run against a disposed one.
pub struct ClassifyWorker<C: PoseClassifier + Send + 'static> {
    running: Arc<AtomicBool>,
    handle: JoinHandle<C>,
}

impl<C: PoseClassifier + Send + 'static> ClassifyWorker<C> {
    pub fn spawn(
        mut classifier: C,
        slot: Arc<KeypointSlot>,
        state: Arc<SharedState>,
        settings: ClassifySettings,
        hook: LabelHook,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = thread::spawn(move || {
            let mut last_label: Option<String> = state.label().map(|l| l.label);

            while running_clone.load(Ordering::Relaxed) {
                if let Some(pose) = slot.take() {
                    let input = build_input(&pose);
                    match classifier.classify(&input) {
                        Ok(scores) => {
                            if let Some(top) = accept_top(&scores, settings.acceptance_threshold) {
                                state.set_label(PoseLabel {
                                    label: top.label.clone(),
                                    score: display_score(top.confidence),
                                });
                                if last_label.as_deref() != Some(top.label.as_str()) {
                                    hook(&top.label);
                                    last_label = Some(top.label.clone());
                                }
                            }
                        }
                        Err(e) => {
                            let err = anyhow::Error::from(e);
                            eprintln!("[classify] classification error: {err:#}");
                        }
                    }
                }

                sleep_while_running(&running_clone, settings.interval);
            }

            classifier
        });

        Self { running, handle }
    }

    /// Signals the worker, joins it and returns the classifier.
    pub fn stop(self) -> C {
        self.running.store(false, Ordering::Relaxed);
        match self.handle.join() {
            Ok(classifier) => classifier,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Chunked sleep so a stop request is picked up quickly.
fn sleep_while_running(running: &AtomicBool, total: Duration) {
    let chunk = Duration::from_millis(20);
    let deadline = Instant::now() + total;
    while running.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(chunk));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::input::check_input_len;
    use crate::error::PipelineError;
    use crate::pose::keypoint::{Keypoint, KeypointIndex, Pose};
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn score(label: &str, confidence: f32) -> ClassScore {
        ClassScore {
            label: label.to_string(),
            confidence,
        }
    }

    fn some_pose() -> Pose {
        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        keypoints[0] = Keypoint::new(0.4, 0.6, 0.9);
        Pose::new(keypoints)
    }

    struct FakeClassifier {
        calls: Arc<AtomicUsize>,
        script: Arc<Mutex<VecDeque<Result<Vec<ClassScore>, String>>>>,
    }

    impl FakeClassifier {
        fn new(script: Vec<Result<Vec<ClassScore>, String>>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let script = Arc::new(Mutex::new(VecDeque::from(script)));
            (
                Self {
                    calls: calls.clone(),
                    script,
                },
                calls,
            )
        }
    }

    impl PoseClassifier for FakeClassifier {
        fn input_len(&self) -> usize {
            2 * KeypointIndex::COUNT
        }

        fn classify(&mut self, input: &[f32]) -> Result<Vec<ClassScore>, PipelineError> {
            check_input_len(input, self.input_len())?;
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.lock().unwrap().pop_front() {
                Some(Ok(scores)) => Ok(scores),
                Some(Err(msg)) => Err(PipelineError::Classification(anyhow::anyhow!(msg))),
                None => Ok(vec![score("idle", 0.99)]),
            }
        }
    }

    fn test_settings() -> ClassifySettings {
        ClassifySettings {
            acceptance_threshold: 0.70,
            interval: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_accept_top_threshold_is_inclusive() {
        let scores = vec![score("tree", 0.69)];
        assert!(accept_top(&scores, 0.70).is_none());

        let scores = vec![score("tree", 0.70)];
        assert_eq!(accept_top(&scores, 0.70).unwrap().label, "tree");
    }

    #[test]
    fn test_accept_top_consults_first_ranked_entry() {
        let scores = vec![score("b", 0.9), score("c", 0.5), score("a", 0.3)];
        assert_eq!(accept_top(&scores, 0.70).unwrap().label, "b");
    }

    #[test]
    fn test_accept_top_tie_keeps_ranked_order() {
        let scores = vec![score("tree", 0.8), score("warrior", 0.8)];
        assert_eq!(accept_top(&scores, 0.70).unwrap().label, "tree");
    }

    #[test]
    fn test_accept_top_empty() {
        assert!(accept_top(&[], 0.0).is_none());
    }

    #[test]
    fn test_display_score_rounds_to_two_decimals() {
        assert_eq!(display_score(0.876), 0.88);
        assert_eq!(display_score(0.701), 0.7);
        assert_eq!(display_score(1.0), 1.0);
    }

    #[test]
    fn test_worker_skips_empty_slot() {
        let (classifier, calls) = FakeClassifier::new(vec![]);
        let slot = Arc::new(KeypointSlot::new());
        let state = Arc::new(SharedState::new());

        let worker =
            ClassifyWorker::spawn(classifier, slot, state.clone(), test_settings(), noop_hook());
        thread::sleep(Duration::from_millis(50));
        worker.stop();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(state.label().is_none());
    }

    #[test]
    fn test_worker_accepts_and_rounds() {
        let (classifier, _) = FakeClassifier::new(vec![Ok(vec![score("warrior", 0.876)])]);
        let slot = Arc::new(KeypointSlot::new());
        let state = Arc::new(SharedState::new());

        slot.publish(some_pose());
        let worker = ClassifyWorker::spawn(
            classifier,
            slot.clone(),
            state.clone(),
            test_settings(),
            noop_hook(),
        );
        thread::sleep(Duration::from_millis(50));
        worker.stop();

        let label = state.label().unwrap();
        assert_eq!(label.label, "warrior");
        assert_eq!(label.score, 0.88);
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_worker_below_threshold_keeps_previous_label() {
        let (classifier, _) = FakeClassifier::new(vec![
            Ok(vec![score("tree", 0.9)]),
            Ok(vec![score("warrior", 0.4)]),
        ]);
        let slot = Arc::new(KeypointSlot::new());
        let state = Arc::new(SharedState::new());

        slot.publish(some_pose());
        let worker = ClassifyWorker::spawn(
            classifier,
            slot.clone(),
            state.clone(),
            test_settings(),
            noop_hook(),
        );
        thread::sleep(Duration::from_millis(30));
        slot.publish(some_pose());
        thread::sleep(Duration::from_millis(30));
        worker.stop();

        assert_eq!(state.label().unwrap().label, "tree");
    }

    #[test]
    fn test_worker_survives_classification_error() {
        let (classifier, _) = FakeClassifier::new(vec![
            Err("backend down".to_string()),
            Ok(vec![score("tree", 0.9)]),
        ]);
        let slot = Arc::new(KeypointSlot::new());
        let state = Arc::new(SharedState::new());

        slot.publish(some_pose());
        let worker = ClassifyWorker::spawn(
            classifier,
            slot.clone(),
            state.clone(),
            test_settings(),
            noop_hook(),
        );
        thread::sleep(Duration::from_millis(30));
        slot.publish(some_pose());
        thread::sleep(Duration::from_millis(30));
        worker.stop();

        assert_eq!(state.label().unwrap().label, "tree");
    }

    #[test]
    fn test_hook_fires_only_on_label_change() {
        let (classifier, _) = FakeClassifier::new(vec![
            Ok(vec![score("tree", 0.9)]),
            Ok(vec![score("tree", 0.95)]),
            Ok(vec![score("warrior", 0.9)]),
        ]);
        let slot = Arc::new(KeypointSlot::new());
        let state = Arc::new(SharedState::new());
        let announced = Arc::new(Mutex::new(Vec::new()));
        let announced_clone = announced.clone();
        let hook: LabelHook = Box::new(move |label| {
            announced_clone.lock().unwrap().push(label.to_string());
        });

        slot.publish(some_pose());
        let worker =
            ClassifyWorker::spawn(classifier, slot.clone(), state.clone(), test_settings(), hook);
        thread::sleep(Duration::from_millis(30));
        slot.publish(some_pose());
        thread::sleep(Duration::from_millis(30));
        slot.publish(some_pose());
        thread::sleep(Duration::from_millis(30));
        worker.stop();

        assert_eq!(*announced.lock().unwrap(), vec!["tree", "warrior"]);
    }

    #[test]
    fn test_hook_not_refired_after_restart() {
        let (classifier, _) = FakeClassifier::new(vec![
            Ok(vec![score("tree", 0.9)]),
            Ok(vec![score("tree", 0.95)]),
            Ok(vec![score("warrior", 0.9)]),
        ]);
        let slot = Arc::new(KeypointSlot::new());
        let state = Arc::new(SharedState::new());
        let announced = Arc::new(Mutex::new(Vec::new()));

        let announced_clone = announced.clone();
        let hook: LabelHook = Box::new(move |label| {
            announced_clone.lock().unwrap().push(label.to_string());
        });
        slot.publish(some_pose());
        let worker = ClassifyWorker::spawn(
            classifier,
            slot.clone(),
            state.clone(),
            test_settings(),
            hook,
        );
        thread::sleep(Duration::from_millis(30));
        let classifier = worker.stop();

        // Fresh worker over the same shared state: the label it already
        // shows must not be re-announced.
        let announced_clone = announced.clone();
        let hook: LabelHook = Box::new(move |label| {
            announced_clone.lock().unwrap().push(label.to_string());
        });
        slot.publish(some_pose());
        let worker = ClassifyWorker::spawn(
            classifier,
            slot.clone(),
            state.clone(),
            test_settings(),
            hook,
        );
        thread::sleep(Duration::from_millis(30));
        slot.publish(some_pose());
        thread::sleep(Duration::from_millis(30));
        worker.stop();

        assert_eq!(*announced.lock().unwrap(), vec!["tree", "warrior"]);
    }

    #[test]
    fn test_no_rounds_after_stop() {
        let (classifier, calls) = FakeClassifier::new(vec![]);
        let slot = Arc::new(KeypointSlot::new());
        let state = Arc::new(SharedState::new());

        let worker =
            ClassifyWorker::spawn(classifier, slot.clone(), state, test_settings(), noop_hook());
        thread::sleep(Duration::from_millis(20));
        let classifier = worker.stop();
        let before = calls.load(Ordering::SeqCst);

        slot.publish(some_pose());
        thread::sleep(Duration::from_millis(30));
        assert_eq!(calls.load(Ordering::SeqCst), before);
        assert_eq!(classifier.input_len(), 34);
    }
}

//! Client-side polling of video generation tasks.
//!
//! [`TaskPoller`] queries a task's status on a fixed interval until the task
//! reaches a terminal state or the wall-clock budget runs out. The loop is an
//! explicit state machine: [`PollState::step`] is the pure transition and
//! [`TaskPoller::run`] drives it through an injected [`PollClock`].
//!
//! A failed status lookup ends the loop with that error. It is never
//! reported as a task failure.

use crate::client::Client;
use crate::error::{Error, Result};
use async_trait::async_trait;
use gateway_core::{ErrorCode, TaskStatus, VideoTask};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Polling cadence and budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay between consecutive polls
    pub interval: Duration,
    /// Wall-clock budget for the whole loop
    pub timeout: Duration,
}

impl PollerConfig {
    /// Default delay between polls
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
    /// Default budget
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

    /// Set the interval
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Time source for the poll loop.
#[async_trait]
pub trait PollClock: Send + Sync {
    /// Time elapsed since the clock's origin
    fn elapsed(&self) -> Duration;

    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real time, via tokio.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    /// Clock with its origin at now
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PollClock for TokioClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that only moves when slept on. Sleeps return immediately and are
/// recorded.
#[derive(Debug, Default)]
pub struct ManualClock {
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward without a sleep
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl PollClock for ManualClock {
    fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        self.advance(duration);
    }
}

/// Anything that can look up a task by id.
#[async_trait]
pub trait TaskStatusSource: Send + Sync {
    /// Current record for task `id`
    async fn task_status(&self, id: &str) -> Result<VideoTask>;
}

#[async_trait]
impl TaskStatusSource for Client {
    async fn task_status(&self, id: &str) -> Result<VideoTask> {
        self.video_status(id).await
    }
}

/// Poll loop state.
#[derive(Debug)]
pub enum PollState {
    /// Waiting for a terminal status
    Polling {
        /// Lookups completed so far
        polls: u32,
        /// Most recent non-terminal status
        last_status: Option<TaskStatus>,
    },
    /// The task reached a terminal status
    Finished {
        /// Lookups completed
        polls: u32,
        /// Final record
        task: VideoTask,
    },
    /// The budget ran out first
    TimedOut {
        /// Lookups completed
        polls: u32,
        /// Last observed status
        last_status: Option<TaskStatus>,
    },
    /// A lookup failed
    Failed(Error),
}

impl PollState {
    /// State before the first poll
    pub fn start() -> Self {
        Self::Polling {
            polls: 0,
            last_status: None,
        }
    }

    /// Whether the loop is over
    pub fn is_done(&self) -> bool {
        !matches!(self, Self::Polling { .. })
    }

    /// Apply one lookup result observed at `elapsed` since the loop started.
    ///
    /// Final states are absorbing: stepping them returns them unchanged.
    #[must_use]
    pub fn step(self, observation: Result<VideoTask>, elapsed: Duration, config: &PollerConfig) -> Self {
        let Self::Polling { polls, .. } = self else {
            return self;
        };
        let polls = polls + 1;

        match observation {
            Err(error) => Self::Failed(error),
            Ok(task) if task.status.is_none() => Self::Failed(Error::parse_error(format!(
                "task {} has no status string",
                task.id
            ))),
            Ok(task) if task.is_terminal() => Self::Finished { polls, task },
            Ok(task) if elapsed >= config.timeout => Self::TimedOut {
                polls,
                last_status: task.status,
            },
            Ok(task) => Self::Polling {
                polls,
                last_status: task.status,
            },
        }
    }
}

/// Result of a completed poll loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Terminal record: succeeded, failed or cancelled
    Finished {
        /// Final record
        task: VideoTask,
        /// Lookups performed
        polls: u32,
    },
    /// The budget elapsed before a terminal status
    TimedOut {
        /// Lookups performed
        polls: u32,
        /// Last observed status
        last_status: Option<TaskStatus>,
    },
}

impl PollOutcome {
    /// `TIMEOUT` for a timed-out loop
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Finished { .. } => None,
            Self::TimedOut { .. } => Some(ErrorCode::Timeout),
        }
    }

    /// Final record, if the task finished
    pub fn task(&self) -> Option<&VideoTask> {
        match self {
            Self::Finished { task, .. } => Some(task),
            Self::TimedOut { .. } => None,
        }
    }

    /// Lookups performed
    pub fn polls(&self) -> u32 {
        match self {
            Self::Finished { polls, .. } | Self::TimedOut { polls, .. } => *polls,
        }
    }
}

type StatusCallback = Arc<dyn Fn(&VideoTask) + Send + Sync>;

/// Drives [`PollState`] against a [`TaskStatusSource`].
pub struct TaskPoller<S> {
    source: S,
    config: PollerConfig,
    clock: Arc<dyn PollClock>,
    on_status: Option<StatusCallback>,
}

impl<S> fmt::Debug for TaskPoller<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskPoller")
            .field("config", &self.config)
            .field("on_status", &self.on_status.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: TaskStatusSource> TaskPoller<S> {
    /// Poller with default cadence on real time
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: PollerConfig::default(),
            clock: Arc::new(TokioClock::new()),
            on_status: None,
        }
    }

    /// Set cadence and budget
    #[must_use]
    pub fn with_config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use another clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn PollClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Call `callback` with every record observed
    #[must_use]
    pub fn on_status(mut self, callback: impl Fn(&VideoTask) + Send + Sync + 'static) -> Self {
        self.on_status = Some(Arc::new(callback));
        self
    }

    /// Poll task `id` until it finishes or the budget runs out.
    ///
    /// The first lookup happens immediately. The loop sleeps only between
    /// lookups.
    pub async fn run(&self, id: &str) -> Result<PollOutcome> {
        let origin = self.clock.elapsed();
        let mut state = PollState::start();

        loop {
            let observation = self.source.task_status(id).await;
            if let (Ok(task), Some(callback)) = (&observation, &self.on_status) {
                callback(task);
            }

            let elapsed = self.clock.elapsed().saturating_sub(origin);
            state = state.step(observation, elapsed, &self.config);

            match state {
                PollState::Polling { polls, ref last_status } => {
                    debug!(
                        task_id = id,
                        polls,
                        status = last_status.as_ref().map_or("none", TaskStatus::as_str),
                        "Task not finished"
                    );
                    self.clock.sleep(self.config.interval).await;
                }
                PollState::Finished { polls, task } => {
                    info!(task_id = id, polls, status = ?task.status, "Task finished");
                    return Ok(PollOutcome::Finished { task, polls });
                }
                PollState::TimedOut { polls, last_status } => {
                    warn!(
                        task_id = id,
                        polls,
                        timeout_secs = self.config.timeout.as_secs(),
                        "Task polling timed out"
                    );
                    return Ok(PollOutcome::TimedOut { polls, last_status });
                }
                PollState::Failed(error) => {
                    warn!(task_id = id, error = %error, "Task status lookup failed");
                    return Err(error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Replays scripted lookup results, then repeats the last status
    struct Scripted {
        script: Mutex<VecDeque<Result<VideoTask>>>,
        repeat: TaskStatus,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(statuses: &[&str], repeat: TaskStatus) -> Self {
            Self {
                script: Mutex::new(statuses.iter().map(|s| Ok(task(s))).collect()),
                repeat,
                calls: AtomicU32::new(0),
            }
        }

        fn push_record(self, record: serde_json::Value) -> Self {
            let task = VideoTask::from_value(&record).unwrap();
            self.script.lock().push_back(Ok(task));
            self
        }

        fn push_error(self, error: Error) -> Self {
            self.script.lock().push_back(Err(error));
            self
        }
    }

    #[async_trait]
    impl TaskStatusSource for Scripted {
        async fn task_status(&self, _id: &str) -> Result<VideoTask> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(task(self.repeat.as_str())))
        }
    }

    fn task(status: &str) -> VideoTask {
        VideoTask::from_value(&serde_json::json!({"id": "cgt-1", "status": status})).unwrap()
    }

    fn config() -> PollerConfig {
        PollerConfig::default()
    }

    #[test]
    fn test_default_cadence() {
        let config = PollerConfig::default();
        assert_eq!(config.interval, Duration::from_secs(10));
        assert_eq!(config.timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_step_transitions() {
        let state = PollState::start().step(Ok(task("queued")), Duration::ZERO, &config());
        assert!(matches!(
            state,
            PollState::Polling { polls: 1, last_status: Some(TaskStatus::Queued) }
        ));

        let state = state.step(Ok(task("succeeded")), Duration::from_secs(10), &config());
        assert!(matches!(state, PollState::Finished { polls: 2, .. }));

        // absorbing
        let state = state.step(Ok(task("running")), Duration::from_secs(20), &config());
        assert!(matches!(state, PollState::Finished { polls: 2, .. }));
    }

    #[test]
    fn test_step_timeout_only_on_non_terminal() {
        let late = Duration::from_secs(601);
        let state = PollState::start().step(Ok(task("running")), late, &config());
        assert!(matches!(state, PollState::TimedOut { polls: 1, .. }));

        let state = PollState::start().step(Ok(task("failed")), late, &config());
        assert!(matches!(state, PollState::Finished { .. }));
    }

    #[test]
    fn test_step_failure() {
        let state = PollState::start().step(Err(Error::api(500, "SERVER_ERROR")), Duration::ZERO, &config());
        assert!(state.is_done());
        assert!(matches!(state, PollState::Failed(_)));
    }

    #[test]
    fn test_step_missing_status_fails() {
        let record = VideoTask::from_value(&serde_json::json!({"id": "cgt-1"})).unwrap();
        let state = PollState::start().step(Ok(record), Duration::ZERO, &config());
        assert!(matches!(state, PollState::Failed(Error::ParseError { .. })));
    }

    #[tokio::test]
    async fn test_malformed_status_stops_loop() {
        let source = Scripted::new(&[], TaskStatus::Running)
            .push_record(serde_json::json!({"id": "cgt-1", "status": 7}));
        let clock = Arc::new(ManualClock::new());
        let poller = TaskPoller::new(source).with_clock(clock.clone());

        let err = poller.run("cgt-1").await.unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
        assert_eq!(poller.source.calls.load(Ordering::SeqCst), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_three_running_then_succeeded() {
        let source = Scripted::new(
            &["running", "running", "running", "succeeded"],
            TaskStatus::Succeeded,
        );
        let clock = Arc::new(ManualClock::new());
        let seen = Arc::new(AtomicU32::new(0));
        let seen_in_callback = Arc::clone(&seen);

        let poller = TaskPoller::new(source)
            .with_clock(clock.clone())
            .on_status(move |_| {
                seen_in_callback.fetch_add(1, Ordering::SeqCst);
            });
        let outcome = poller.run("cgt-1").await.unwrap();

        assert_eq!(outcome.polls(), 4);
        assert_eq!(outcome.task().and_then(|t| t.status.clone()), Some(TaskStatus::Succeeded));
        assert!(outcome.code().is_none());
        assert_eq!(poller.source.calls.load(Ordering::SeqCst), 4);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(10); 3]);
        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_immediate_terminal_never_sleeps() {
        let clock = Arc::new(ManualClock::new());
        let poller = TaskPoller::new(Scripted::new(&["cancelled"], TaskStatus::Cancelled))
            .with_clock(clock.clone());

        let outcome = poller.run("cgt-1").await.unwrap();
        assert_eq!(outcome.polls(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_timeout() {
        let clock = Arc::new(ManualClock::new());
        let poller = TaskPoller::new(Scripted::new(&[], TaskStatus::Running))
            .with_clock(clock.clone())
            .with_config(
                PollerConfig::default()
                    .with_interval(Duration::from_secs(10))
                    .with_timeout(Duration::from_secs(25)),
            );

        let outcome = poller.run("cgt-1").await.unwrap();
        assert_eq!(
            outcome,
            PollOutcome::TimedOut {
                polls: 4,
                last_status: Some(TaskStatus::Running)
            }
        );
        assert_eq!(outcome.code(), Some(ErrorCode::Timeout));
        assert_eq!(clock.sleeps().len(), 3);
    }

    #[tokio::test]
    async fn test_lookup_failure_stops_loop() {
        let source = Scripted::new(&["queued"], TaskStatus::Running)
            .push_error(Error::api(502, "SERVER_ERROR"));
        let clock = Arc::new(ManualClock::new());
        let poller = TaskPoller::new(source).with_clock(clock.clone());

        let err = poller.run("cgt-1").await.unwrap_err();
        assert_eq!(err.code(), Some("SERVER_ERROR"));
        assert_eq!(poller.source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(clock.sleeps().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_respects_interval() {
        let poller = TaskPoller::new(Scripted::new(&["running"], TaskStatus::Succeeded))
            .with_config(PollerConfig::default().with_interval(Duration::from_secs(10)));

        let start = tokio::time::Instant::now();
        let outcome = poller.run("cgt-1").await.unwrap();
        assert_eq!(outcome.polls(), 2);
        assert!(start.elapsed() >= Duration::from_secs(10));
    }
}

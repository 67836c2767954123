//! Task monitor: polls the task service until a task settles
//!
//! Each call to [`Scheduler::repeat`] opens a new session and voids every
//! earlier one. A session owns a [`SessionToken`]; responses are applied
//! only while the token is still current, so a slow reply from an
//! abandoned session can never overwrite newer state.

use std::future::Future;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::api::{DataQuery, TaskService};
use crate::types::{Task, TaskStatus, TransactionRecord};

/// Poll cadence while watching a single task
pub const TASK_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Poll cadence while watching the task list
pub const LIST_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Liveness of one monitoring session
#[derive(Debug, Clone)]
pub struct SessionToken {
    generation: u64,
    latest: Arc<AtomicU64>,
    live: Arc<AtomicBool>,
}

impl SessionToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False once the session was cancelled or superseded
    pub fn is_current(&self) -> bool {
        self.live.load(Ordering::Acquire) && self.latest.load(Ordering::Acquire) == self.generation
    }
}

/// One step of a repeating job. Returning `Break` ends the schedule.
pub trait Tick: Send + 'static {
    fn tick(&mut self, token: &SessionToken) -> impl Future<Output = ControlFlow<()>> + Send;
}

/// Owned handle to a running schedule. Dropping it cancels the schedule.
#[derive(Debug)]
pub struct TaskHandle {
    token: SessionToken,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Stop future ticks and void any response still in flight
    pub fn cancel(&self) {
        if self.token.live.swap(false, Ordering::AcqRel) {
            log::debug!("session {} cancelled", self.token.generation);
        }
        self.join.abort();
    }

    pub fn generation(&self) -> u64 {
        self.token.generation
    }

    pub fn is_live(&self) -> bool {
        self.token.is_current()
    }

    /// Whether the schedule loop has exited (terminal status or cancel)
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Hands out sessions; a new session supersedes all earlier ones
#[derive(Debug, Default)]
pub struct Scheduler {
    latest: Arc<AtomicU64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` now and then every `period` until it breaks or the
    /// session ends. Must be called from within a tokio runtime.
    pub fn repeat<T: Tick>(&self, period: Duration, mut job: T) -> TaskHandle {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        let token = SessionToken {
            generation,
            latest: Arc::clone(&self.latest),
            live: Arc::new(AtomicBool::new(true)),
        };

        let loop_token = token.clone();
        let join = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !loop_token.is_current() {
                    break;
                }
                if job.tick(&loop_token).await.is_break() {
                    break;
                }
            }
            log::debug!("session {} finished", loop_token.generation);
        });

        TaskHandle { token, join }
    }
}

/// Where a monitored task stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    #[default]
    Idle,
    Polling,
    Completed,
    Failed,
}

impl MonitorState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Latest consistent view of a task and (once completed) its records
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub generation: u64,
    pub state: MonitorState,
    pub task: Task,
    pub records: Option<Arc<Vec<TransactionRecord>>>,
}

/// Everything a monitor reports to its consumer
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Snapshot(Snapshot),
    TaskList { generation: u64, tasks: Vec<Task> },
    /// A fetch failed; the next tick retries on its own
    Error { generation: u64, message: String },
}

impl MonitorEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Snapshot(s) => s.generation,
            Self::TaskList { generation, .. } | Self::Error { generation, .. } => *generation,
        }
    }
}

type Sink = Arc<dyn Fn(MonitorEvent) + Send + Sync>;

fn emit(sink: &Sink, token: &SessionToken, event: MonitorEvent) {
    if token.is_current() {
        sink(event);
    } else {
        log::debug!("session {}: dropping stale event", token.generation);
    }
}

/// Polls one task; fetches its records once it completes
struct TaskPoll<S> {
    service: Arc<S>,
    task_id: u64,
    task: Option<Task>,
    records: Option<Arc<Vec<TransactionRecord>>>,
    sink: Sink,
}

impl<S: TaskService> TaskPoll<S> {
    fn error(&self, token: &SessionToken, message: String) {
        log::warn!("task {}: {}", self.task_id, message);
        emit(
            &self.sink,
            token,
            MonitorEvent::Error {
                generation: token.generation,
                message,
            },
        );
    }
}

impl<S: TaskService> Tick for TaskPoll<S> {
    async fn tick(&mut self, token: &SessionToken) -> ControlFlow<()> {
        let fetched = self.service.get_task(self.task_id).await;
        if !token.is_current() {
            return ControlFlow::Break(());
        }

        let fresh = match fetched {
            Ok(task) => task,
            Err(e) => {
                self.error(token, format!("failed to load task details: {e}"));
                return ControlFlow::Continue(());
            }
        };

        let task = match self.task.take() {
            Some(mut known) => {
                known.merge(fresh);
                known
            }
            None => fresh,
        };

        if task.status == TaskStatus::Completed && self.records.is_none() {
            let fetched = self
                .service
                .get_task_data(self.task_id, &DataQuery::default())
                .await;
            if !token.is_current() {
                return ControlFlow::Break(());
            }
            match fetched {
                Ok(data) => self.records = Some(Arc::new(data.data)),
                Err(e) => {
                    // Completed stays visible; records are retried on the next tick
                    emit(
                        &self.sink,
                        token,
                        MonitorEvent::Snapshot(Snapshot {
                            generation: token.generation,
                            state: MonitorState::Completed,
                            task: task.clone(),
                            records: None,
                        }),
                    );
                    self.task = Some(task);
                    self.error(token, format!("failed to load task data: {e}"));
                    return ControlFlow::Continue(());
                }
            }
        }

        let state = match task.status {
            TaskStatus::Completed => MonitorState::Completed,
            TaskStatus::Failed => MonitorState::Failed,
            TaskStatus::Pending | TaskStatus::InProgress => MonitorState::Polling,
        };
        if state.is_terminal() {
            log::info!("task {} settled as {}", self.task_id, task.status.label());
        }

        emit(
            &self.sink,
            token,
            MonitorEvent::Snapshot(Snapshot {
                generation: token.generation,
                state,
                task: task.clone(),
                records: self.records.clone(),
            }),
        );
        self.task = Some(task);

        if state.is_terminal() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Polls the task list indefinitely
struct ListPoll<S> {
    service: Arc<S>,
    sink: Sink,
}

impl<S: TaskService> Tick for ListPoll<S> {
    async fn tick(&mut self, token: &SessionToken) -> ControlFlow<()> {
        let fetched = self.service.list_tasks().await;
        if !token.is_current() {
            return ControlFlow::Break(());
        }
        let event = match fetched {
            Ok(tasks) => MonitorEvent::TaskList {
                generation: token.generation,
                tasks,
            },
            Err(e) => {
                log::warn!("task list: {e}");
                MonitorEvent::Error {
                    generation: token.generation,
                    message: format!("failed to load tasks: {e}"),
                }
            }
        };
        emit(&self.sink, token, event);
        ControlFlow::Continue(())
    }
}

/// Task monitor bound to one task service
pub struct TaskMonitor<S> {
    service: Arc<S>,
    scheduler: Scheduler,
    task_interval: Duration,
    list_interval: Duration,
}

impl<S: TaskService> TaskMonitor<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            scheduler: Scheduler::new(),
            task_interval: TASK_POLL_INTERVAL,
            list_interval: LIST_POLL_INTERVAL,
        }
    }

    pub fn with_intervals(mut self, task_interval: Duration, list_interval: Duration) -> Self {
        self.task_interval = task_interval;
        self.list_interval = list_interval;
        self
    }

    /// Watch a single task. Any earlier session from this monitor is voided.
    pub fn start<F>(&self, task_id: u64, on_event: F) -> TaskHandle
    where
        F: Fn(MonitorEvent) + Send + Sync + 'static,
    {
        log::info!("monitoring task {task_id}");
        let job = TaskPoll {
            service: Arc::clone(&self.service),
            task_id,
            task: None,
            records: None,
            sink: Arc::new(on_event),
        };
        self.scheduler.repeat(self.task_interval, job)
    }

    /// Watch the task list. Any earlier session from this monitor is voided.
    pub fn watch_list<F>(&self, on_event: F) -> TaskHandle
    where
        F: Fn(MonitorEvent) + Send + Sync + 'static,
    {
        log::info!("monitoring task list");
        let job = ListPoll {
            service: Arc::clone(&self.service),
            sink: Arc::new(on_event),
        };
        self.scheduler.repeat(self.list_interval, job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        dates, DataSource, FilterParams, NewTask, Platform, Result, SalesboardError, TaskData,
    };
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// In-memory service replaying a status script
    struct FakeService {
        statuses: Mutex<VecDeque<TaskStatus>>,
        task_calls: AtomicUsize,
        data_calls: AtomicUsize,
        list_calls: AtomicUsize,
        task_failures: AtomicUsize,
        data_failures: AtomicUsize,
        latency: Duration,
    }

    impl FakeService {
        fn new(statuses: &[TaskStatus]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                task_calls: AtomicUsize::new(0),
                data_calls: AtomicUsize::new(0),
                list_calls: AtomicUsize::new(0),
                task_failures: AtomicUsize::new(0),
                data_failures: AtomicUsize::new(0),
                latency: Duration::ZERO,
            }
        }

        fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        fn next_status(&self) -> TaskStatus {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.pop_front().unwrap()
            } else {
                *statuses.front().unwrap()
            }
        }

        fn task(id: u64, status: TaskStatus) -> Task {
            let ts = dates::parse_datetime("2025-01-01T00:00:00").unwrap();
            Task {
                id,
                name: format!("task {id}"),
                status,
                created_at: ts,
                updated_at: ts,
                filter_params: FilterParams::default(),
            }
        }

        fn take_failure(counter: &AtomicUsize) -> bool {
            counter
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    impl TaskService for FakeService {
        async fn list_tasks(&self) -> Result<Vec<Task>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Self::task(1, TaskStatus::Pending)])
        }

        async fn get_task(&self, id: u64) -> Result<Task> {
            self.task_calls.fetch_add(1, Ordering::SeqCst);
            let status = self.next_status();
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            if Self::take_failure(&self.task_failures) {
                return Err(SalesboardError::Status {
                    status: 503,
                    url: format!("/tasks/{id}"),
                });
            }
            Ok(Self::task(id, status))
        }

        async fn create_task(&self, spec: &NewTask) -> Result<Task> {
            spec.validate()?;
            Ok(Self::task(99, TaskStatus::Pending))
        }

        async fn get_task_data(&self, _id: u64, _query: &DataQuery) -> Result<TaskData> {
            self.data_calls.fetch_add(1, Ordering::SeqCst);
            if Self::take_failure(&self.data_failures) {
                return Err(SalesboardError::Parse("truncated body".into()));
            }
            Ok(TaskData {
                data: vec![TransactionRecord {
                    source: DataSource::SourceA,
                    category: "Books".into(),
                    brand: "Wiley".into(),
                    price: 20.0,
                    quantity: 3,
                    platform: Platform::Online,
                    purchase_date: dates::parse_datetime("2021-05-15").unwrap(),
                    rating: None,
                    location: None,
                }],
            })
        }
    }

    fn collector() -> (Arc<Mutex<Vec<MonitorEvent>>>, impl Fn(MonitorEvent) + Send + Sync) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        (events, move |e: MonitorEvent| sink.lock().unwrap().push(e))
    }

    fn snapshots(events: &Mutex<Vec<MonitorEvent>>) -> Vec<Snapshot> {
        events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                MonitorEvent::Snapshot(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    async fn wait(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    // ========== single task polling ==========

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_completed_then_stops() {
        use TaskStatus::*;
        let service = Arc::new(FakeService::new(&[Pending, InProgress, Completed]));
        let monitor = TaskMonitor::new(Arc::clone(&service));
        let (events, sink) = collector();

        let handle = monitor.start(5, sink);
        wait(30_000).await;

        assert_eq!(service.task_calls.load(Ordering::SeqCst), 3);
        assert_eq!(service.data_calls.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());

        let snaps = snapshots(&events);
        let states: Vec<MonitorState> = snaps.iter().map(|s| s.state).collect();
        assert_eq!(
            states,
            vec![
                MonitorState::Polling,
                MonitorState::Polling,
                MonitorState::Completed
            ]
        );
        let last = snaps.last().unwrap();
        assert_eq!(last.records.as_ref().map(|r| r.len()), Some(1));
        assert!(snaps[0].records.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_is_immediate() {
        let service = Arc::new(FakeService::new(&[TaskStatus::Pending]));
        let monitor = TaskMonitor::new(Arc::clone(&service));
        let (_events, sink) = collector();

        let _handle = monitor.start(1, sink);
        wait(10).await;
        assert_eq!(service.task_calls.load(Ordering::SeqCst), 1);

        wait(2_000).await;
        assert_eq!(service.task_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_task_stops_without_data_fetch() {
        use TaskStatus::*;
        let service = Arc::new(FakeService::new(&[Pending, Failed]));
        let monitor = TaskMonitor::new(Arc::clone(&service));
        let (events, sink) = collector();

        let _handle = monitor.start(2, sink);
        wait(20_000).await;

        assert_eq!(service.task_calls.load(Ordering::SeqCst), 2);
        assert_eq!(service.data_calls.load(Ordering::SeqCst), 0);
        let snaps = snapshots(&events);
        assert_eq!(snaps.last().unwrap().state, MonitorState::Failed);
        assert!(!events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, MonitorEvent::Error { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_error_reported_and_retried_next_tick() {
        use TaskStatus::*;
        let service = FakeService::new(&[Completed]);
        service.task_failures.store(1, Ordering::SeqCst);
        let service = Arc::new(service);
        let monitor = TaskMonitor::new(Arc::clone(&service));
        let (events, sink) = collector();

        let _handle = monitor.start(3, sink);
        wait(10).await;
        assert!(matches!(
            events.lock().unwrap().first(),
            Some(MonitorEvent::Error { .. })
        ));

        wait(10_000).await;
        assert_eq!(service.task_calls.load(Ordering::SeqCst), 2);
        assert_eq!(snapshots(&events).last().unwrap().state, MonitorState::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_fetch_failure_retried() {
        let service = FakeService::new(&[TaskStatus::Completed]);
        service.data_failures.store(1, Ordering::SeqCst);
        let service = Arc::new(service);
        let monitor = TaskMonitor::new(Arc::clone(&service));
        let (events, sink) = collector();

        let _handle = monitor.start(4, sink);
        wait(10_000).await;

        assert_eq!(service.data_calls.load(Ordering::SeqCst), 2);
        assert_eq!(service.task_calls.load(Ordering::SeqCst), 2);
        let snaps = snapshots(&events);
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].state, MonitorState::Completed);
        assert_eq!(snaps[0].task.status, TaskStatus::Completed);
        assert!(snaps[0].records.is_none());
        assert_eq!(snaps[1].state, MonitorState::Completed);
        assert!(snaps[1].records.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_status_shown_while_data_keeps_failing() {
        let service = FakeService::new(&[TaskStatus::InProgress, TaskStatus::Completed]);
        service.data_failures.store(1000, Ordering::SeqCst);
        let service = Arc::new(service);
        let monitor = TaskMonitor::new(Arc::clone(&service));
        let (events, sink) = collector();

        let handle = monitor.start(5, sink);
        wait(20_000).await;

        assert!(handle.is_live());
        assert!(service.data_calls.load(Ordering::SeqCst) > 1);
        let snaps = snapshots(&events);
        assert_eq!(snaps[0].task.status, TaskStatus::InProgress);
        let last = snaps.last().unwrap();
        assert_eq!(last.state, MonitorState::Completed);
        assert_eq!(last.task.status, TaskStatus::Completed);
        assert!(last.records.is_none());
        let errors = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, MonitorEvent::Error { .. }))
            .count();
        assert!(errors > 1);
    }

    // ========== cancellation and stale responses ==========

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_future_ticks() {
        let service = Arc::new(FakeService::new(&[TaskStatus::InProgress]));
        let monitor = TaskMonitor::new(Arc::clone(&service));
        let (events, sink) = collector();

        let handle = monitor.start(6, sink);
        wait(2_500).await;
        assert_eq!(service.task_calls.load(Ordering::SeqCst), 2);

        handle.cancel();
        assert!(!handle.is_live());
        let seen = events.lock().unwrap().len();

        wait(20_000).await;
        assert_eq!(service.task_calls.load(Ordering::SeqCst), 2);
        assert_eq!(events.lock().unwrap().len(), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_voids_in_flight_response() {
        let service = Arc::new(
            FakeService::new(&[TaskStatus::Completed]).with_latency(Duration::from_secs(1)),
        );
        let monitor = TaskMonitor::new(Arc::clone(&service));
        let (events, sink) = collector();

        let handle = monitor.start(7, sink);
        wait(500).await;
        assert_eq!(service.task_calls.load(Ordering::SeqCst), 1);
        handle.cancel();

        wait(5_000).await;
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(service.data_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_supersedes_old_one() {
        let service = Arc::new(
            FakeService::new(&[TaskStatus::InProgress]).with_latency(Duration::from_secs(3)),
        );
        let monitor = TaskMonitor::new(Arc::clone(&service));
        let (events, sink_a) = collector();
        let sink_b = {
            let events = Arc::clone(&events);
            move |e: MonitorEvent| events.lock().unwrap().push(e)
        };

        let first = monitor.start(1, sink_a);
        wait(1_000).await;
        let second = monitor.start(2, sink_b);
        assert!(!first.is_live());
        assert!(second.is_live());
        assert!(second.generation() > first.generation());

        wait(10_000).await;
        let snaps = snapshots(&events);
        assert!(!snaps.is_empty());
        assert!(snaps.iter().all(|s| s.task.id == 2));
        assert!(snaps.iter().all(|s| s.generation == second.generation()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels() {
        let service = Arc::new(FakeService::new(&[TaskStatus::Pending]));
        let monitor = TaskMonitor::new(Arc::clone(&service));
        let (_events, sink) = collector();

        {
            let _handle = monitor.start(8, sink);
            wait(10).await;
        }
        wait(10_000).await;
        assert_eq!(service.task_calls.load(Ordering::SeqCst), 1);
    }

    // ========== task list polling ==========

    #[tokio::test(start_paused = true)]
    async fn test_list_polls_every_five_seconds() {
        let service = Arc::new(FakeService::new(&[TaskStatus::Pending]));
        let monitor = TaskMonitor::new(Arc::clone(&service));
        let (events, sink) = collector();

        let _handle = monitor.watch_list(sink);
        wait(12_000).await;

        assert_eq!(service.list_calls.load(Ordering::SeqCst), 3);
        assert!(events
            .lock()
            .unwrap()
            .iter()
            .all(|e| matches!(e, MonitorEvent::TaskList { tasks, .. } if tasks.len() == 1)));
    }

    #[test]
    fn test_monitor_state_terminal() {
        assert!(!MonitorState::Idle.is_terminal());
        assert!(!MonitorState::Polling.is_terminal());
        assert!(MonitorState::Completed.is_terminal());
        assert!(MonitorState::Failed.is_terminal());
    }
}

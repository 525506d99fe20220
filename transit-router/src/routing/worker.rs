//! Background routing worker.
//!
//! A single dedicated thread owns the transit graph and the last label map.
//! Tasks arrive over a FIFO channel and are executed strictly in order;
//! results go back as events tagged with the session snapshot that asked for
//! them, so the coordinator can drop anything that has been superseded.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace, warn};

use crate::domain::{Network, StationId};
use crate::planner::{
    ActiveTransports, LabelMap, ProgressBatch, RouteCollection, RoutingConfig, SolveRequest,
    TransitGraph, compute_times, extract_routes, shortest_times,
};

/// Session inputs captured when a task is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Snapshot {
    /// Bumped by every reset; results from an earlier epoch are stale even
    /// when every selection matches.
    pub epoch: u64,
    pub start: Option<StationId>,
    pub end: Option<StationId>,
    pub active: ActiveTransports,
    pub blocked: HashSet<StationId>,
}

/// Work for the background thread.
pub(crate) enum Task {
    Rebuild {
        network: Arc<Network>,
        active: ActiveTransports,
    },
    ComputeTimes {
        snapshot: Arc<Snapshot>,
        source: StationId,
    },
    MakeRoutes {
        snapshot: Arc<Snapshot>,
        source: StationId,
        destination: StationId,
    },
    Shutdown,
}

/// Results from the background thread.
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    TimesStarted(Arc<Snapshot>),
    TimesProgress(Arc<Snapshot>, ProgressBatch),
    TimesFinished(Arc<Snapshot>),
    RoutesStarted(Arc<Snapshot>),
    RoutesFinished(Arc<Snapshot>, RouteCollection),
    /// Sent after every task, once all of its other events.
    Done,
}

/// Label map with the inputs it was computed from.
struct CachedLabels {
    generation: u64,
    blocked: HashSet<StationId>,
    labels: LabelMap,
}

impl CachedLabels {
    fn matches(&self, generation: u64, source: StationId, blocked: &HashSet<StationId>) -> bool {
        self.generation == generation && self.labels.source() == source && &self.blocked == blocked
    }
}

/// State owned by the worker thread.
struct RouteWorker {
    config: RoutingConfig,
    graph: TransitGraph,
    /// Incremented on every rebuild; label maps from older graphs are stale.
    generation: u64,
    labels: Option<CachedLabels>,
    events: UnboundedSender<WorkerEvent>,
    /// Set when the coordinator is dropped; queued tasks are then skipped.
    stopping: Arc<AtomicBool>,
}

impl RouteWorker {
    fn new(
        config: RoutingConfig,
        events: UnboundedSender<WorkerEvent>,
        stopping: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            graph: TransitGraph::default(),
            generation: 0,
            labels: None,
            events,
            stopping,
        }
    }

    fn run(mut self, mut tasks: UnboundedReceiver<Task>) {
        while let Some(task) = tasks.blocking_recv() {
            if self.stopping.load(Ordering::Acquire) {
                break;
            }
            match task {
                Task::Shutdown => break,
                Task::Rebuild { network, active } => self.rebuild(&network, &active),
                Task::ComputeTimes { snapshot, source } => self.compute_times(snapshot, source),
                Task::MakeRoutes {
                    snapshot,
                    source,
                    destination,
                } => self.make_routes(snapshot, source, destination),
            }
            self.emit(WorkerEvent::Done);
        }
        debug!("routing worker stopped");
    }

    fn emit(&self, event: WorkerEvent) {
        if self.events.send(event).is_err() {
            trace!("routing state dropped, discarding event");
        }
    }

    fn rebuild(&mut self, network: &Network, active: &ActiveTransports) {
        self.graph = TransitGraph::build(active, network);
        self.generation += 1;
        self.labels = None;
        debug!(
            generation = self.generation,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "transit graph rebuilt"
        );
    }

    fn compute_times(&mut self, snapshot: Arc<Snapshot>, source: StationId) {
        self.emit(WorkerEvent::TimesStarted(snapshot.clone()));

        let events = &self.events;
        let request = SolveRequest::new(source, &snapshot.blocked);
        let labels = compute_times(&self.graph, &request, self.config.batch_size(), |batch| {
            if events
                .send(WorkerEvent::TimesProgress(snapshot.clone(), batch))
                .is_err()
            {
                trace!("routing state dropped, discarding progress");
            }
        });

        self.labels = Some(CachedLabels {
            generation: self.generation,
            blocked: snapshot.blocked.clone(),
            labels,
        });
        self.emit(WorkerEvent::TimesFinished(snapshot));
    }

    fn make_routes(&mut self, snapshot: Arc<Snapshot>, source: StationId, destination: StationId) {
        self.emit(WorkerEvent::RoutesStarted(snapshot.clone()));

        let fresh = self
            .labels
            .as_ref()
            .is_some_and(|cached| cached.matches(self.generation, source, &snapshot.blocked));
        if !fresh {
            debug!(%source, "no matching label map, recomputing times");
            let labels = shortest_times(&self.graph, &SolveRequest::new(source, &snapshot.blocked));
            self.labels = Some(CachedLabels {
                generation: self.generation,
                blocked: snapshot.blocked.clone(),
                labels,
            });
        }

        let routes = match &self.labels {
            Some(cached) => extract_routes(
                &self.graph,
                &cached.labels,
                &destination,
                &snapshot.blocked,
                self.config.max_alternatives,
            ),
            None => RouteCollection::empty(),
        };
        self.emit(WorkerEvent::RoutesFinished(snapshot, routes));
    }
}

/// Coordinator-side handle to the worker thread.
pub(crate) struct WorkerHandle {
    tasks: UnboundedSender<Task>,
    events: UnboundedReceiver<WorkerEvent>,
    thread: Option<JoinHandle<()>>,
    /// Tasks submitted whose `Done` event has not been received yet.
    in_flight: usize,
    stopping: Arc<AtomicBool>,
}

impl WorkerHandle {
    /// Start the worker thread with an empty graph.
    ///
    /// If the thread cannot be started every submitted task is dropped with
    /// a warning.
    pub(crate) fn spawn(config: RoutingConfig) -> Self {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let stopping = Arc::new(AtomicBool::new(false));

        let worker = RouteWorker::new(config, event_tx, stopping.clone());
        let thread = std::thread::Builder::new()
            .name("routing-worker".into())
            .spawn(move || worker.run(task_rx))
            .inspect_err(|e| warn!(error = %e, "failed to start routing worker"))
            .ok();

        Self {
            tasks: task_tx,
            events: event_rx,
            thread,
            in_flight: 0,
            stopping,
        }
    }

    /// Queue a task behind everything submitted before it.
    pub(crate) fn submit(&mut self, task: Task) {
        if self.tasks.send(task).is_err() {
            warn!("routing worker has stopped, task dropped");
            return;
        }
        self.in_flight += 1;
    }

    /// Number of submitted tasks not yet finished.
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn track(&mut self, event: &WorkerEvent) {
        if matches!(event, WorkerEvent::Done) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
    }

    /// Next event if one is ready, without blocking.
    pub(crate) fn try_next(&mut self) -> Option<WorkerEvent> {
        let event = self.events.try_recv().ok()?;
        self.track(&event);
        Some(event)
    }

    /// Wait for the next event. Returns `None` once no task is in flight.
    pub(crate) async fn next(&mut self) -> Option<WorkerEvent> {
        if self.in_flight == 0 {
            return self.try_next();
        }
        match self.events.recv().await {
            Some(event) => {
                self.track(&event);
                Some(event)
            }
            None => {
                warn!("routing worker exited with tasks in flight");
                self.in_flight = 0;
                None
            }
        }
    }
}

/// Stops the worker and joins its thread.
///
/// Queued tasks are skipped, but a computation already running is finished
/// first, so dropping can block the owner for the length of one task.
impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.stopping.store(true, Ordering::Release);
        let _ = self.tasks.send(Task::Shutdown);
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("routing worker panicked");
        }
    }
}

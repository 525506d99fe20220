//! Routing session state.
//!
//! [`RoutingState`] holds what the user has selected (active transports,
//! start and end, blocked stations) and the last computed routes. Every
//! mutation only queues work on the background worker; results come back as
//! events which are delivered to listeners when the owner pumps them with
//! [`RoutingState::process_events`] or [`RoutingState::wait_idle`].
//!
//! A result is delivered only if the session still has the inputs it was
//! computed for. Anything else has been superseded and is dropped.

use std::sync::Arc;

use tracing::{debug, trace};

use super::blocked::BlockedStations;
use super::error::RoutingError;
use super::listener::{ListenerId, Listeners, RoutingListener};
use super::worker::{Snapshot, Task, WorkerEvent, WorkerHandle};
use crate::domain::{Network, StationId};
use crate::network::{LoadError, NetworkSource};
use crate::planner::{ActiveTransports, Route, RouteCollection, RoutingConfig};

/// The routing session: user selections, cached routes and listeners.
pub struct RoutingState {
    network: Arc<Network>,
    config: RoutingConfig,
    active: ActiveTransports,
    start: Option<StationId>,
    end: Option<StationId>,
    blocked: BlockedStations,
    /// Routes for the current start, end, active set and blocked set.
    routes: Option<RouteCollection>,
    listeners: Listeners,
    worker: WorkerHandle,
    /// The worker's graph no longer matches `active` or `network`.
    graph_stale: bool,
    /// Incremented by every reset so results queued before it are dropped.
    epoch: u64,
}

impl RoutingState {
    /// Create a session over a loaded network with no transport active.
    pub fn new(network: Arc<Network>, config: RoutingConfig) -> Self {
        let active = ActiveTransports::none(network.transport_count());
        let worker = WorkerHandle::spawn(config.clone());
        Self {
            network,
            config,
            active,
            start: None,
            end: None,
            blocked: BlockedStations::new(),
            routes: None,
            listeners: Listeners::default(),
            worker,
            graph_stale: true,
            epoch: 0,
        }
    }

    /// Load a network and create a session over it.
    ///
    /// On load failure no session (and no worker) is created.
    pub fn from_source(
        source: &impl NetworkSource,
        names: &[&str],
        config: RoutingConfig,
    ) -> Result<Self, LoadError> {
        let network = source.load_network(names)?;
        Ok(Self::new(Arc::new(network), config))
    }

    // ---- active transports ----

    /// Replace the active transports.
    ///
    /// Fails without changing anything if any id is out of range.
    pub fn set_active(&mut self, ids: &[usize]) -> Result<(), RoutingError> {
        let active = ActiveTransports::from_ids(ids.iter().copied(), self.network.transport_count())?;
        if active != self.active {
            self.active = active;
            self.graph_stale = true;
        }
        Ok(())
    }

    /// Activate a transport. Idempotent.
    pub fn add_active(&mut self, id: usize) -> Result<(), RoutingError> {
        if self.active.insert(id)? {
            self.graph_stale = true;
        }
        Ok(())
    }

    /// Deactivate a transport. Idempotent.
    ///
    /// Cached routes passing through the transport are invalidated.
    pub fn remove_active(&mut self, id: usize) -> Result<(), RoutingError> {
        if !self.active.remove(id)? {
            return Ok(());
        }
        self.graph_stale = true;
        let affected = self
            .routes
            .as_ref()
            .is_some_and(|routes| routes.routes().iter().any(|r| r.uses_transport(id)));
        if affected {
            debug!(transport = id, "deactivated transport used by cached routes");
            self.routes = None;
        }
        Ok(())
    }

    /// Returns true if the transport is active.
    pub fn is_active(&self, id: usize) -> bool {
        self.active.contains(id)
    }

    /// The active transport set.
    pub fn active(&self) -> &ActiveTransports {
        &self.active
    }

    // ---- endpoints ----

    fn check_station(&self, station: &StationId) -> Result<(), RoutingError> {
        if self.network.contains(station) {
            Ok(())
        } else {
            Err(RoutingError::UnknownStation(*station))
        }
    }

    /// Set (or clear) the start station and recompute.
    pub fn set_start(&mut self, station: Option<StationId>) -> Result<(), RoutingError> {
        if let Some(s) = &station {
            self.check_station(s)?;
        }
        if self.start != station {
            self.routes = None;
        }
        self.start = station;
        self.recompute();
        Ok(())
    }

    /// Set (or clear) the end station and recompute routes.
    pub fn set_end(&mut self, station: Option<StationId>) -> Result<(), RoutingError> {
        if let Some(s) = &station {
            self.check_station(s)?;
        }
        if self.end != station {
            self.routes = None;
        }
        self.end = station;
        self.make_routes();
        Ok(())
    }

    /// The start station.
    pub fn start(&self) -> Option<StationId> {
        self.start
    }

    /// The end station.
    pub fn end(&self) -> Option<StationId> {
        self.end
    }

    /// Returns true if a start station is selected.
    pub fn is_route_start_selected(&self) -> bool {
        self.start.is_some()
    }

    /// Returns true if an end station is selected.
    pub fn is_route_end_selected(&self) -> bool {
        self.end.is_some()
    }

    /// Routing through intermediate stations is not supported.
    pub fn add_via(&mut self, station: StationId) -> Result<(), RoutingError> {
        debug!(%station, "via point requested");
        Err(RoutingError::Unsupported("routing via intermediate stations"))
    }

    // ---- blocked stations ----

    /// Block a station and recompute. Blocking twice has no further effect
    /// on the set, but listeners are still notified.
    pub fn block_station(&mut self, station: StationId) -> Result<(), RoutingError> {
        self.check_station(&station)?;
        if !self.blocked.insert(station) {
            trace!(%station, "station already blocked");
        }
        self.blocked_changed();
        Ok(())
    }

    /// Unblock a station and recompute. Returns false if it was not blocked.
    pub fn unblock_station(&mut self, station: StationId) -> bool {
        let removed = self.blocked.remove(&station);
        self.blocked_changed();
        removed
    }

    fn blocked_changed(&mut self) {
        self.routes = None;
        self.recompute();
        self.listeners.notify(|l| l.on_blocked_stations_changed());
    }

    /// Returns true if the station is blocked.
    pub fn is_blocked(&self, station: &StationId) -> bool {
        self.blocked.contains(station)
    }

    /// Blocked stations in blocking order.
    pub fn blocked_stations(&self) -> &[StationId] {
        self.blocked.as_slice()
    }

    // ---- recomputation ----

    /// Rebuild the graph from scratch and recompute everything.
    pub fn reset_route(&mut self) {
        self.epoch += 1;
        self.graph_stale = true;
        self.routes = None;
        self.recompute();
    }

    /// Swap in new network data and reset.
    ///
    /// Selections that no longer name a station are dropped and the active
    /// set is clipped to the new transport count.
    pub fn replace_network(&mut self, network: Arc<Network>) {
        self.active = self.active.resized(network.transport_count());
        self.start = self.start.filter(|s| network.contains(s));
        self.end = self.end.filter(|s| network.contains(s));
        self.blocked.retain(|s| network.contains(s));
        self.network = network;
        self.reset_route();
    }

    fn recompute(&mut self) {
        if let Some(start) = self.start
            && self.is_active(start.transport)
        {
            self.calculate_times(start);
        }
        self.make_routes();
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::new(Snapshot {
            epoch: self.epoch,
            start: self.start,
            end: self.end,
            active: self.active.clone(),
            blocked: self.blocked.as_set().clone(),
        })
    }

    fn ensure_graph(&mut self) {
        if self.graph_stale {
            self.worker.submit(Task::Rebuild {
                network: self.network.clone(),
                active: self.active.clone(),
            });
            self.graph_stale = false;
        }
    }

    fn calculate_times(&mut self, source: StationId) {
        self.ensure_graph();
        let snapshot = self.snapshot();
        self.worker.submit(Task::ComputeTimes { snapshot, source });
    }

    fn make_routes(&mut self) {
        let (Some(source), Some(destination)) = (self.start, self.end) else {
            return;
        };
        if !self.is_active(source.transport) || !self.is_active(destination.transport) {
            debug!(%source, %destination, "endpoint transport inactive, not routing");
            return;
        }
        self.ensure_graph();
        let snapshot = self.snapshot();
        self.worker.submit(Task::MakeRoutes {
            snapshot,
            source,
            destination,
        });
    }

    // ---- routes ----

    /// Returns true if routes were found for the current selection.
    pub fn route_exists(&self) -> bool {
        self.routes.as_ref().is_some_and(|r| !r.is_empty())
    }

    /// The cached route collection, if computed for the current selection.
    pub fn routes(&self) -> Option<&RouteCollection> {
        self.routes.as_ref()
    }

    /// The selected route.
    pub fn current_route(&self) -> Option<&Route> {
        self.routes.as_ref()?.current_route()
    }

    /// Select the best route and notify listeners.
    pub fn show_best_route(&mut self) -> Result<(), RoutingError> {
        self.show_route(0)
    }

    /// Select a route by rank (0 is the best) and notify listeners.
    pub fn show_alternative_route(&mut self, index: usize) -> Result<(), RoutingError> {
        self.show_route(index)
    }

    fn show_route(&mut self, index: usize) -> Result<(), RoutingError> {
        let routes = self
            .routes
            .as_mut()
            .filter(|r| !r.is_empty())
            .ok_or(RoutingError::NoRoutes)?;
        let count = routes.len();
        let route = routes
            .select(index)
            .ok_or(RoutingError::RouteIndex { index, count })?;
        self.listeners.notify(|l| l.on_route_selected(route));
        Ok(())
    }

    /// Notify listeners of the selected route again, if there is one.
    pub fn update_route(&mut self) {
        if let Some(route) = self.routes.as_ref().and_then(|r| r.current_route()) {
            self.listeners.notify(|l| l.on_route_selected(route));
        }
    }

    /// Forget start, end and routes. Listeners are not notified.
    pub fn clear_route(&mut self) {
        self.start = None;
        self.end = None;
        self.routes = None;
    }

    // ---- listeners and events ----

    /// Register a listener. It receives only events dispatched from now on.
    pub fn add_listener(&mut self, listener: Box<dyn RoutingListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of queued tasks the worker has not finished.
    pub fn pending_tasks(&self) -> usize {
        self.worker.in_flight()
    }

    /// Deliver every event the worker has produced so far, without blocking.
    ///
    /// Returns the number of events handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.worker.try_next() {
            self.dispatch(event);
            handled += 1;
        }
        handled
    }

    /// Deliver events until every submitted task has finished.
    pub async fn wait_idle(&mut self) {
        while let Some(event) = self.worker.next().await {
            self.dispatch(event);
        }
    }

    /// True if times computed for `snapshot` still describe this session.
    /// The end station does not affect times.
    fn times_current(&self, snapshot: &Snapshot) -> bool {
        snapshot.epoch == self.epoch
            && snapshot.start == self.start
            && snapshot.active == self.active
            && snapshot.blocked == *self.blocked.as_set()
    }

    fn routes_current(&self, snapshot: &Snapshot) -> bool {
        snapshot.end == self.end && self.times_current(snapshot)
    }

    fn dispatch(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::TimesStarted(snapshot) => {
                trace!(start = ?snapshot.start, "computing times");
                self.listeners.notify(|l| l.on_computing_times_started());
            }
            WorkerEvent::TimesProgress(snapshot, batch) => {
                if self.times_current(&snapshot) {
                    self.listeners
                        .notify(|l| l.on_computing_times_progress(&batch.stations, &batch.times));
                } else {
                    trace!(settled = batch.len(), "dropping superseded progress");
                }
            }
            WorkerEvent::TimesFinished(snapshot) => {
                trace!(start = ?snapshot.start, "times computed");
                self.listeners.notify(|l| l.on_computing_times_finished());
            }
            WorkerEvent::RoutesStarted(snapshot) => {
                if self.routes_current(&snapshot) {
                    self.listeners.notify(|l| l.on_computing_routes_started());
                }
            }
            WorkerEvent::RoutesFinished(snapshot, routes) => {
                if !self.routes_current(&snapshot) {
                    debug!(routes = routes.len(), "discarding superseded routes");
                    return;
                }
                let routes = self.routes.insert(routes);
                self.listeners
                    .notify(|l| l.on_computing_routes_finished(routes.routes()));
            }
            WorkerEvent::Done => {}
        }
    }

    // ---- accessors ----

    /// The network being routed over.
    pub fn network(&self) -> &Arc<Network> {
        &self.network
    }

    /// The routing configuration.
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

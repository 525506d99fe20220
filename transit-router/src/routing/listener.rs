//! Listener registry for routing events.

use chrono::Duration;

use crate::domain::StationId;
use crate::planner::Route;

/// Receives routing events from [`RoutingState`](super::RoutingState).
///
/// Every method has an empty default so listeners only implement what they
/// display. Events are delivered on the thread that owns the routing state.
pub trait RoutingListener {
    /// A times computation has started.
    fn on_computing_times_started(&mut self) {}

    /// Stations newly settled by the running times computation.
    ///
    /// `stations` and `times` are parallel slices.
    fn on_computing_times_progress(&mut self, stations: &[StationId], times: &[Duration]) {
        let _ = (stations, times);
    }

    /// The times computation started last has finished.
    fn on_computing_times_finished(&mut self) {}

    /// Route extraction has started.
    fn on_computing_routes_started(&mut self) {}

    /// Routes are ready, best first. Empty if the destination is unreachable.
    fn on_computing_routes_finished(&mut self, routes: &[Route]) {
        let _ = routes;
    }

    /// A route was selected for display.
    fn on_route_selected(&mut self, route: &Route) {
        let _ = route;
    }

    /// The blocked station set was changed.
    fn on_blocked_stations_changed(&mut self) {}
}

/// Handle returned by listener registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registered listeners, notified in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<(ListenerId, Box<dyn RoutingListener>)>,
    next_id: u64,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Box<dyn RoutingListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn notify(&mut self, mut event: impl FnMut(&mut dyn RoutingListener)) {
        for (_, listener) in &mut self.entries {
            event(listener.as_mut());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Counter {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl RoutingListener for Counter {
        fn on_blocked_stations_changed(&mut self) {
            self.log.lock().unwrap().push(self.name);
        }
    }

    #[test]
    fn notifies_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::default();
        for name in ["first", "second", "third"] {
            listeners.add(Box::new(Counter {
                name,
                log: log.clone(),
            }));
        }

        listeners.notify(|l| l.on_blocked_stations_changed());

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn removed_listener_is_not_notified() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::default();
        let a = listeners.add(Box::new(Counter {
            name: "a",
            log: log.clone(),
        }));
        listeners.add(Box::new(Counter {
            name: "b",
            log: log.clone(),
        }));

        assert!(listeners.remove(a));
        assert!(!listeners.remove(a));
        assert_eq!(listeners.len(), 1);

        listeners.notify(|l| l.on_blocked_stations_changed());
        assert_eq!(*log.lock().unwrap(), vec!["b"]);
    }
}

//! Active-visit presence tracking.
//!
//! The banner must answer "does the displayed patient currently have an open
//! visit?" from two sources: a per-patient visit query, and a global
//! broadcast of visit-start/visit-end notifications. The direct query is
//! authoritative when it yields a visit. When it yields nothing the signal
//! cannot yet be trusted as "no visit" — the query may be stale relative to a
//! visit just started elsewhere in the application — so the tracker falls
//! back to the broadcast and follows its notifications instead.
//!
//! Everything here is single-threaded and callback-driven: evaluation and
//! notification handlers run one at a time on the thread driving the banner.
//! Mutual exclusion is structural (single owner per flag), so the types use
//! `Rc`/`Cell`/`RefCell` and are deliberately not `Send`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use banner_uuid::PatientUuid;
use fhir::VisitRecord;

/// Per-patient current-visit lookup, implemented by the storage layer.
///
/// A failed underlying lookup is expected to surface as `None` ("no visit as
/// currently known"), not as an error; the tracker then defers to the
/// broadcast stream.
pub trait VisitQuery {
    fn current_visit(&self, patient: &PatientUuid) -> Option<VisitRecord>;
}

type Handler = Rc<dyn Fn(Option<&VisitRecord>)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

/// Global, patient-agnostic broadcast of visit lifecycle notifications.
///
/// Each notification carries the started visit, or `None` when a visit
/// ended. Handlers are applied in subscription order and notifications in
/// emission order; no coalescing is performed.
///
/// Cloning shares the underlying subscriber registry.
#[derive(Clone, Default)]
pub struct VisitBroadcast {
    inner: Rc<RefCell<Registry>>,
}

impl VisitBroadcast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for subsequent notifications.
    ///
    /// The returned [`Subscription`] releases the registration when dropped;
    /// holding it is the only way to stay subscribed.
    #[must_use]
    pub fn subscribe(&self, handler: impl Fn(Option<&VisitRecord>) + 'static) -> Subscription {
        let mut registry = self.inner.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.push((id, Rc::new(handler)));
        tracing::debug!(subscription = id, "visit broadcast subscription opened");
        Subscription {
            registry: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver one notification to every current subscriber, in
    /// subscription order.
    pub fn publish(&self, visit: Option<&VisitRecord>) {
        // Snapshot the handlers first: a handler is allowed to subscribe or
        // unsubscribe re-entrantly without invalidating this delivery pass.
        let handlers: Vec<Handler> = self
            .inner
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler(visit);
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }
}

/// Handle for one broadcast registration.
///
/// Dropping the handle unsubscribes; [`Subscription::unsubscribe`] does the
/// same explicitly.
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    id: u64,
}

impl Subscription {
    /// Release the registration now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().handlers.retain(|(id, _)| *id != self.id);
            tracing::debug!(subscription = self.id, "visit broadcast subscription released");
        }
    }
}

/// Live, eventually-consistent "has active visit" signal for one patient.
///
/// The signal starts `false`. Each evaluation cycle (construction or
/// [`retarget`](Self::retarget)) first tears down any prior broadcast
/// subscription, then consults the per-patient query:
///
/// - a visit from the query sets the signal `true` immediately, and no
///   subscription is opened for that cycle;
/// - no visit from the query opens exactly one broadcast subscription, and
///   the signal then follows each notification (`true` when it carries a
///   visit, `false` when it does not), in receipt order.
///
/// When neither source produces information the signal keeps its last-set
/// value. Dropping the tracker releases the subscription; a notification
/// already in flight at that point writes nothing.
pub struct VisitPresenceTracker {
    patient: PatientUuid,
    has_active_visit: Rc<Cell<bool>>,
    subscription: Option<Subscription>,
}

impl VisitPresenceTracker {
    /// Create a tracker for `patient` and run the first evaluation cycle.
    pub fn new(patient: PatientUuid, query: &dyn VisitQuery, broadcast: &VisitBroadcast) -> Self {
        let mut tracker = Self {
            patient,
            has_active_visit: Rc::new(Cell::new(false)),
            subscription: None,
        };
        tracker.evaluate(query, broadcast);
        tracker
    }

    /// The patient this tracker currently follows.
    pub fn patient(&self) -> &PatientUuid {
        &self.patient
    }

    /// Current value of the presence signal.
    pub fn has_active_visit(&self) -> bool {
        self.has_active_visit.get()
    }

    /// True while this cycle holds a broadcast subscription.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Switch the tracker to a different patient and re-evaluate.
    ///
    /// The prior cycle's subscription is released before the new cycle
    /// starts, so no two subscriptions from one tracker are ever live at
    /// once. The signal keeps its last-set value until the new cycle learns
    /// otherwise.
    pub fn retarget(
        &mut self,
        patient: PatientUuid,
        query: &dyn VisitQuery,
        broadcast: &VisitBroadcast,
    ) {
        self.patient = patient;
        self.evaluate(query, broadcast);
    }

    /// Run one evaluation cycle against the current patient.
    pub fn evaluate(&mut self, query: &dyn VisitQuery, broadcast: &VisitBroadcast) {
        // Tear down the prior cycle before anything else may observe events.
        self.subscription = None;

        if query.current_visit(&self.patient).is_some() {
            // The direct query is authoritative and sufficient.
            self.has_active_visit.set(true);
            return;
        }

        let signal = Rc::downgrade(&self.has_active_visit);
        self.subscription = Some(broadcast.subscribe(move |visit| {
            // The tracker may have been torn down between the snapshot of
            // handlers and this call; a dead signal must not be written.
            if let Some(signal) = signal.upgrade() {
                signal.set(visit.is_some());
            }
        }));
    }
}

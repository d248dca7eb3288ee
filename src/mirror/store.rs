use std::rc::Rc;

use log::{debug, warn};

use super::event::{format_event, MirrorEvent};
use super::reduce::{self, ApplyError};
use super::snapshot::{CastMemberRef, MirrorState};
use super::subscriptions::{interest_changes, InterestChange};

pub type ListenerId = u32;

/// Holds the one current snapshot for a debug session. Events are applied
/// one at a time through `&mut self`; readers share the snapshot via `Rc`
/// and always observe a complete state, never a partially-applied one.
pub struct MirrorStore {
    current: Rc<MirrorState>,
    change_listeners: Vec<(ListenerId, Box<dyn Fn(&MirrorState)>)>,
    interest_listeners: Vec<(ListenerId, Box<dyn Fn(&InterestChange)>)>,
    listener_counter: ListenerId,
}

impl MirrorStore {
    pub fn new() -> MirrorStore {
        MirrorStore {
            current: Rc::new(MirrorState::default()),
            change_listeners: Vec::new(),
            interest_listeners: Vec::new(),
            listener_counter: 0,
        }
    }

    /// The current snapshot, O(1). Holders keep reading a consistent state
    /// even while newer events are applied.
    pub fn snapshot(&self) -> Rc<MirrorState> {
        Rc::clone(&self.current)
    }

    /// Applies one event. On success the new snapshot is published to
    /// change listeners, and any subscription interest transitions are
    /// published to interest listeners. On rejection the state is
    /// untouched and the diagnostic is logged.
    pub fn apply(&mut self, event: MirrorEvent) -> Result<(), ApplyError> {
        debug!("apply: {}", format_event(&event));
        let next = match reduce::apply(&self.current, event) {
            Ok(next) => next,
            Err(err) => {
                warn!("event rejected: {}", err);
                return Err(err);
            }
        };
        let transitions = interest_changes(
            &self.current.subscribed_member_tokens,
            &next.subscribed_member_tokens,
        );
        self.current = Rc::new(next);
        for (_, listener) in &self.change_listeners {
            listener(&self.current);
        }
        for transition in &transitions {
            for (_, listener) in &self.interest_listeners {
                listener(transition);
            }
        }
        Ok(())
    }

    /// Discards the whole mirror for a new debug session.
    pub fn reset(&mut self) {
        debug!("resetting mirror state");
        self.current = Rc::new(MirrorState::default());
        for (_, listener) in &self.change_listeners {
            listener(&self.current);
        }
    }

    pub fn on_change(&mut self, listener: impl Fn(&MirrorState) + 'static) -> ListenerId {
        let id = self.next_listener_id();
        self.change_listeners.push((id, Box::new(listener)));
        id
    }

    pub fn on_interest_change(
        &mut self,
        listener: impl Fn(&InterestChange) + 'static,
    ) -> ListenerId {
        let id = self.next_listener_id();
        self.interest_listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) {
        self.change_listeners.retain(|(listener_id, _)| *listener_id != id);
        self.interest_listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    /// Declares one unit of interest in a member's deep data under a
    /// caller-chosen token.
    pub fn subscribe_member(
        &mut self,
        member_ref: CastMemberRef,
        token: &str,
    ) -> Result<(), ApplyError> {
        self.apply(MirrorEvent::MemberSubscribed {
            member_ref,
            token: token.to_string(),
        })
    }

    pub fn unsubscribe_member(&mut self, token: &str) -> Result<(), ApplyError> {
        self.apply(MirrorEvent::MemberUnsubscribed {
            token: token.to_string(),
        })
    }

    fn next_listener_id(&mut self) -> ListenerId {
        self.listener_counter += 1;
        self.listener_counter
    }
}

impl Default for MirrorStore {
    fn default() -> MirrorStore {
        MirrorStore::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::mirror::snapshot::cast_member_ref;

    #[test]
    fn test_apply_publishes_new_snapshot() {
        let mut store = MirrorStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.on_change(move |state| sink.borrow_mut().push(state.current_frame));

        store.apply(MirrorEvent::FrameChanged(3)).unwrap();
        store.apply(MirrorEvent::FrameChanged(4)).unwrap();

        assert_eq!(*seen.borrow(), vec![3, 4]);
        assert_eq!(store.snapshot().current_frame, 4);
    }

    #[test]
    fn test_rejected_event_leaves_state_and_stays_silent() {
        let mut store = MirrorStore::new();
        let notified = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&notified);
        store.on_change(move |_| *sink.borrow_mut() += 1);

        let before = store.snapshot();
        store
            .apply(MirrorEvent::CastLibNameChanged {
                cast_number: 9,
                name: "nope".to_string(),
            })
            .unwrap_err();

        assert_eq!(*notified.borrow(), 0);
        assert!(Rc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn test_old_snapshots_survive_new_events() {
        let mut store = MirrorStore::new();
        store.apply(MirrorEvent::FrameChanged(3)).unwrap();
        let held = store.snapshot();
        store.apply(MirrorEvent::FrameChanged(8)).unwrap();

        assert_eq!(held.current_frame, 3);
        assert_eq!(store.snapshot().current_frame, 8);
    }

    #[test]
    fn test_interest_transitions_fire_on_edges_only() {
        let mut store = MirrorStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.on_interest_change(move |change| sink.borrow_mut().push(*change));

        let member = cast_member_ref(1, 5);
        store.subscribe_member(member, "a").unwrap();
        store.subscribe_member(member, "b").unwrap();
        store.unsubscribe_member("a").unwrap();
        store.unsubscribe_member("missing").unwrap();
        store.unsubscribe_member("b").unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![InterestChange::Gained(member), InterestChange::Lost(member)]
        );
    }

    #[test]
    fn test_remove_listener() {
        let mut store = MirrorStore::new();
        let notified = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&notified);
        let id = store.on_change(move |_| *sink.borrow_mut() += 1);

        store.apply(MirrorEvent::FrameChanged(2)).unwrap();
        store.remove_listener(id);
        store.apply(MirrorEvent::FrameChanged(3)).unwrap();

        assert_eq!(*notified.borrow(), 1);
    }

    #[test]
    fn test_reset_returns_to_initial_state() {
        let mut store = MirrorStore::new();
        store.apply(MirrorEvent::MovieLoaded { version: 1217 }).unwrap();
        store.apply(MirrorEvent::FrameChanged(30)).unwrap();

        store.reset();
        let state = store.snapshot();
        assert!(!state.movie_loaded);
        assert_eq!(state.current_frame, 1);
    }
}

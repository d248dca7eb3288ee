use thiserror::Error;

use super::event::MirrorEvent;
use super::snapshot::{CastMemberRef, MemberEntry, MemberSubscription, MirrorState};

/// Why an event was rejected. A rejected event leaves the state exactly
/// as it was; the store surfaces the diagnostic.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("cast library {0} is not mirrored")]
    UnknownCastLib(i32),
    #[error("cast member {0} is not mirrored")]
    UnknownMember(CastMemberRef),
}

/// Applies one event to a snapshot and returns the resulting snapshot.
/// Pure: the input state is never modified, replaying the same events in
/// the same order always yields the same result.
pub fn apply(state: &MirrorState, event: MirrorEvent) -> Result<MirrorState, ApplyError> {
    let mut next = state.clone();
    match event {
        MirrorEvent::CastListChanged(names) => {
            next.cast_names = names;
        }
        MirrorEvent::CastLibNameChanged { cast_number, name } => {
            // Cast libraries are 1-indexed
            let slot = (cast_number as usize)
                .checked_sub(1)
                .and_then(|index| next.cast_names.get_mut(index))
                .ok_or(ApplyError::UnknownCastLib(cast_number as i32))?;
            *slot = name;
        }
        MirrorEvent::CastMemberListChanged {
            cast_number,
            members,
        } => {
            let cast = next.cast_snapshots.entry(cast_number).or_default();
            cast.members = members
                .into_iter()
                .map(|(number, summary)| {
                    (
                        number,
                        MemberEntry {
                            summary,
                            snapshot: None,
                        },
                    )
                })
                .collect();
        }
        MirrorEvent::CastMemberChanged {
            member_ref,
            snapshot,
        } => {
            // Detailed snapshots merge into entries created by a prior
            // member-list push; the bridge never fabricates members here.
            if !member_ref.is_valid() {
                return Err(ApplyError::UnknownMember(member_ref));
            }
            let cast = next
                .cast_snapshots
                .get_mut(&(member_ref.cast_lib as u32))
                .ok_or(ApplyError::UnknownCastLib(member_ref.cast_lib))?;
            let entry = cast
                .members
                .get_mut(&(member_ref.cast_member as u32))
                .ok_or(ApplyError::UnknownMember(member_ref))?;
            entry.snapshot = Some(snapshot);
        }
        MirrorEvent::ScoreChanged(snapshot) => {
            next.score = Some(snapshot);
        }
        MirrorEvent::FrameChanged(frame) => {
            next.current_frame = frame;
        }
        MirrorEvent::ScopeListChanged(scopes) => {
            next.scopes = scopes;
            // Datum ids are scope-generation bound; cached payloads from
            // the previous generation would dangle.
            next.datum_snapshots.clear();
            next.script_instance_snapshots.clear();
        }
        MirrorEvent::ScriptErrorRaised(error) => {
            next.script_error = Some(error);
        }
        MirrorEvent::ScriptErrorCleared => {
            next.script_error = None;
        }
        MirrorEvent::BreakpointListChanged(breakpoints) => {
            next.breakpoints = breakpoints;
        }
        MirrorEvent::GlobalsChanged(globals) => {
            next.globals = globals;
        }
        MirrorEvent::TimeoutHandleSet { name, handle } => {
            next.timeout_handles.insert(name, handle);
        }
        MirrorEvent::TimeoutHandleRemoved { name } => {
            next.timeout_handles.remove(&name);
        }
        MirrorEvent::TimeoutHandlesCleared => {
            next.timeout_handles.clear();
        }
        MirrorEvent::DatumSnapshot { datum_id, datum } => {
            next.datum_snapshots.insert(datum_id, datum);
        }
        MirrorEvent::ScriptInstanceSnapshot { instance_id, datum } => {
            next.script_instance_snapshots.insert(instance_id, datum);
        }
        MirrorEvent::ChannelChanged { channel, snapshot } => {
            next.channel_snapshots.insert(channel, snapshot);
        }
        MirrorEvent::ChannelDisplayNameChanged {
            channel,
            display_name,
        } => {
            next.channel_snapshots.entry(channel).or_default().display_name = display_name;
        }
        MirrorEvent::MemberSubscribed { member_ref, token } => {
            next.subscribed_member_tokens
                .push(MemberSubscription { member_ref, token });
        }
        MirrorEvent::MemberUnsubscribed { token } => {
            next.subscribed_member_tokens
                .retain(|subscription| subscription.token != token);
        }
        MirrorEvent::MovieLoaded { .. } => {
            next.movie_loaded = true;
        }
        MirrorEvent::DebugMessage(message) => {
            next.debug_messages.push(message);
        }
    }
    Ok(next)
}

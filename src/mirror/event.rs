use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::snapshot::{
    Breakpoint, BridgeDatum, CastMemberRef, DatumId, MemberSnapshot, MemberSummary,
    ScoreSnapshot, ScoreSpriteSnapshot, ScriptErrorSnapshot, ScriptInstanceId, TimeoutHandle,
    VmScope,
};

/// One push from the VM bridge. Each variant mirrors one bridge callback;
/// applying an event through the reducer is the only way the mirrored
/// state changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MirrorEvent {
    CastListChanged(Vec<String>),
    CastLibNameChanged {
        cast_number: u32,
        name: String,
    },
    CastMemberListChanged {
        cast_number: u32,
        members: FxHashMap<u32, MemberSummary>,
    },
    CastMemberChanged {
        member_ref: CastMemberRef,
        snapshot: MemberSnapshot,
    },
    ScoreChanged(ScoreSnapshot),
    FrameChanged(u32),
    ScopeListChanged(Vec<VmScope>),
    ScriptErrorRaised(ScriptErrorSnapshot),
    ScriptErrorCleared,
    BreakpointListChanged(Vec<Breakpoint>),
    GlobalsChanged(FxHashMap<String, DatumId>),
    TimeoutHandleSet {
        name: String,
        handle: TimeoutHandle,
    },
    TimeoutHandleRemoved {
        name: String,
    },
    TimeoutHandlesCleared,
    DatumSnapshot {
        datum_id: DatumId,
        datum: BridgeDatum,
    },
    ScriptInstanceSnapshot {
        instance_id: ScriptInstanceId,
        datum: BridgeDatum,
    },
    ChannelChanged {
        channel: i16,
        snapshot: ScoreSpriteSnapshot,
    },
    ChannelDisplayNameChanged {
        channel: i16,
        display_name: String,
    },
    MemberSubscribed {
        member_ref: CastMemberRef,
        token: String,
    },
    MemberUnsubscribed {
        token: String,
    },
    MovieLoaded {
        version: u16,
    },
    DebugMessage(String),
}

/// Compact one-line rendering for diagnostics. Payload-heavy events only
/// print their keys, not their contents.
pub fn format_event(event: &MirrorEvent) -> String {
    match event {
        MirrorEvent::CastListChanged(names) => format!("CastListChanged({} casts)", names.len()),
        MirrorEvent::CastLibNameChanged { cast_number, name } => {
            format!("CastLibNameChanged({}, {})", cast_number, name)
        }
        MirrorEvent::CastMemberListChanged {
            cast_number,
            members,
        } => format!(
            "CastMemberListChanged({}, {} members)",
            cast_number,
            members.len()
        ),
        MirrorEvent::CastMemberChanged { member_ref, .. } => {
            format!("CastMemberChanged{}", member_ref)
        }
        MirrorEvent::ScoreChanged(..) => "ScoreChanged(..)".to_string(),
        MirrorEvent::FrameChanged(frame) => format!("FrameChanged({})", frame),
        MirrorEvent::ScopeListChanged(scopes) => {
            format!("ScopeListChanged({} scopes)", scopes.len())
        }
        MirrorEvent::ScriptErrorRaised(err) => format!("ScriptErrorRaised({})", err.message),
        MirrorEvent::ScriptErrorCleared => "ScriptErrorCleared".to_string(),
        MirrorEvent::BreakpointListChanged(breakpoints) => {
            format!("BreakpointListChanged({} breakpoints)", breakpoints.len())
        }
        MirrorEvent::GlobalsChanged(globals) => {
            format!("GlobalsChanged({} globals)", globals.len())
        }
        MirrorEvent::TimeoutHandleSet { name, handle } => {
            format!("TimeoutHandleSet({}, {})", name, handle)
        }
        MirrorEvent::TimeoutHandleRemoved { name } => format!("TimeoutHandleRemoved({})", name),
        MirrorEvent::TimeoutHandlesCleared => "TimeoutHandlesCleared".to_string(),
        MirrorEvent::DatumSnapshot { datum_id, .. } => format!("DatumSnapshot({})", datum_id),
        MirrorEvent::ScriptInstanceSnapshot { instance_id, .. } => {
            format!("ScriptInstanceSnapshot({})", instance_id)
        }
        MirrorEvent::ChannelChanged { channel, .. } => format!("ChannelChanged({})", channel),
        MirrorEvent::ChannelDisplayNameChanged {
            channel,
            display_name,
        } => format!("ChannelDisplayNameChanged({}, {})", channel, display_name),
        MirrorEvent::MemberSubscribed { member_ref, token } => {
            format!("MemberSubscribed({}, {})", member_ref, token)
        }
        MirrorEvent::MemberUnsubscribed { token } => format!("MemberUnsubscribed({})", token),
        MirrorEvent::MovieLoaded { version } => format!("MovieLoaded(v{})", version),
        MirrorEvent::DebugMessage(..) => "DebugMessage(..)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::snapshot::cast_member_ref;

    #[test]
    fn test_format_event() {
        assert_eq!(
            format_event(&MirrorEvent::FrameChanged(12)),
            "FrameChanged(12)"
        );
        assert_eq!(
            format_event(&MirrorEvent::MemberSubscribed {
                member_ref: cast_member_ref(1, 5),
                token: "inspector".to_string(),
            }),
            "MemberSubscribed((member 5 of castLib 1), inspector)"
        );
        assert_eq!(
            format_event(&MirrorEvent::TimeoutHandleRemoved {
                name: "blinker".to_string()
            }),
            "TimeoutHandleRemoved(blinker)"
        );
    }
}

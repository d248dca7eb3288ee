//! Client-side state mirror for the dirplayer VM debugger.
//!
//! The VM bridge pushes [`MirrorEvent`]s; the [`MirrorStore`] folds each
//! one into a fresh immutable [`MirrorState`] snapshot and notifies UI
//! readers that something changed. The mirror never talks back to the VM:
//! demand for expensive member data is declared through the subscription
//! ledger, and an external fetch collaborator reacts to the resulting
//! [`InterestChange`] notifications.

pub mod mirror;

pub use mirror::event::{format_event, MirrorEvent};
pub use mirror::reduce::{apply, ApplyError};
pub use mirror::snapshot::{
    cast_member_ref, Breakpoint, BridgeDatum, BridgeValue, CastMemberRef, CastSnapshot,
    ChannelInitSnapshot, DatumId, HandlerSnapshot, MemberEntry, MemberPayload, MemberSnapshot,
    MemberSubscription, MemberSummary, MirrorState, ScoreBehaviorRef, ScoreSnapshot,
    ScoreSpriteSnapshot, ScoreSpriteSpan, ScriptErrorSnapshot, ScriptInstanceId, ScriptSnapshot,
    SpriteInitData, TimeoutHandle, VmScope, INVALID_CAST_MEMBER_REF,
};
pub use mirror::store::{ListenerId, MirrorStore};
pub use mirror::subscriptions::InterestChange;

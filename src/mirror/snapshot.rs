use std::fmt::Display;

use fxhash::FxHashMap;
use nohash_hasher::IntMap;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a VM-side datum. Only valid within the scope
/// generation that produced it; the mirror compares it for equality and
/// never dereferences it.
pub type DatumId = usize;

/// Opaque identifier of a VM-side script instance.
pub type ScriptInstanceId = u32;

/// Opaque handle of a UI-scheduled timeout callback.
pub type TimeoutHandle = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastMemberRef {
    pub cast_lib: i32,
    pub cast_member: i32,
}

pub const INVALID_CAST_MEMBER_REF: CastMemberRef = CastMemberRef {
    cast_lib: -1,
    cast_member: -1,
};

pub fn cast_member_ref(cast_lib: i32, cast_member: i32) -> CastMemberRef {
    CastMemberRef {
        cast_lib,
        cast_member,
    }
}

impl CastMemberRef {
    pub fn is_valid(&self) -> bool {
        self.cast_lib > 0 && self.cast_member > 0
    }
}

impl Display for CastMemberRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(member {} of castLib {})",
            self.cast_member, self.cast_lib
        )
    }
}

/// Summary row from a member-list push. Cheap enough for the bridge to
/// stream for every member of a library at once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub member_kind: String,
    #[serde(rename = "scriptType", skip_serializing_if = "Option::is_none")]
    pub script_kind: Option<String>,
}

/// Detailed member snapshot, streamed only for subscribed members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSnapshot {
    pub number: u32,
    pub name: String,
    #[serde(flatten)]
    pub payload: MemberPayload,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MemberPayload {
    Field {
        text: String,
    },
    Text {
        text: String,
    },
    Script {
        script: ScriptSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    Bitmap {
        width: u16,
        height: u16,
        bit_depth: u8,
        reg_x: i16,
        reg_y: i16,
        palette_ref: String,
    },
    Palette {
        colors: Vec<(u8, u8, u8)>,
    },
    FilmLoop {
        width: u16,
        height: u16,
        score: Box<ScoreSnapshot>,
    },
    Other,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptSnapshot {
    pub name: String,
    pub script_type: String,
    pub handlers: Vec<HandlerSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandlerSnapshot {
    pub name: String,
    pub args: Vec<String>,
}

/// One member as the mirror knows it: the summary row is always present,
/// the detailed snapshot only after a CastMemberChanged merge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberEntry {
    pub summary: MemberSummary,
    pub snapshot: Option<MemberSnapshot>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CastSnapshot {
    pub members: FxHashMap<u32, MemberEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSnapshot {
    pub channel_count: u32,
    pub behavior_references: Vec<ScoreBehaviorRef>,
    pub sprite_spans: Vec<ScoreSpriteSpan>,
    pub channel_init_data: Vec<ChannelInitSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBehaviorRef {
    pub start_frame: u32,
    pub end_frame: u32,
    pub cast_lib: u16,
    pub cast_member: u16,
    pub channel_number: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSpriteSpan {
    pub channel_number: u16,
    pub start_frame: u32,
    pub end_frame: u32,
    pub member_ref: [u16; 2], // [cast_lib, cast_member]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInitSnapshot {
    pub frame_index: u32,
    pub channel_index: u16,
    pub channel_number: u16,
    pub init_data: SpriteInitData,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteInitData {
    pub sprite_type: u16,
    pub cast_lib: u16,
    pub cast_member: u16,
    pub width: i16,
    pub height: i16,
    pub loc_h: i16,
    pub loc_v: i16,
}

/// One frame of the VM call stack. Locals, stack and args hold datum ids
/// whose payloads arrive separately as DatumSnapshot events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VmScope {
    pub script_member_ref: CastMemberRef,
    pub handler_name: String,
    pub bytecode_index: u32,
    pub locals: FxHashMap<String, DatumId>,
    pub stack: Vec<DatumId>,
    pub args: Vec<DatumId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptErrorSnapshot {
    pub message: String,
    pub script_member_ref: Option<CastMemberRef>,
    pub handler_name: Option<String>,
    pub is_paused: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub script_name: String,
    pub handler_name: String,
    pub bytecode_index: usize,
}

/// Materialized value payload for one datum or script instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeDatum {
    pub debug_description: String,
    pub value: BridgeValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BridgeValue {
    Void,
    Int(i32),
    Float(f64),
    String(String),
    Symbol(String),
    List(Vec<DatumId>),
    PropList {
        properties: Vec<(String, DatumId)>,
        sorted: bool,
    },
    ScriptInstance {
        ancestor: Option<ScriptInstanceId>,
        properties: FxHashMap<String, DatumId>,
    },
    /// Any datum kind the inspector renders from the description alone
    /// (rects, points, refs into managers the mirror does not model).
    Opaque {
        kind: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSpriteSnapshot {
    pub display_name: String,
    pub member_ref: CastMemberRef,
    pub script_instance_list: Vec<ScriptInstanceId>,
    pub width: i32,
    pub height: i32,
    pub loc_h: i32,
    pub loc_v: i32,
    pub color: String,
    pub bg_color: String,
    pub ink: u32,
    pub blend: u32,
}

impl Default for ScoreSpriteSnapshot {
    fn default() -> ScoreSpriteSnapshot {
        ScoreSpriteSnapshot {
            display_name: String::new(),
            member_ref: INVALID_CAST_MEMBER_REF,
            script_instance_list: Vec::new(),
            width: 0,
            height: 0,
            loc_h: 0,
            loc_v: 0,
            color: String::new(),
            bg_color: String::new(),
            ink: 0,
            blend: 100,
        }
    }
}

/// One unit of interest in a member's deep data. The count of tokens per
/// member is its reference count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberSubscription {
    pub member_ref: CastMemberRef,
    pub token: String,
}

/// Complete mirrored state at one point in time. Owned by the store,
/// shared immutably with readers; every applied event produces a new one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MirrorState {
    pub cast_names: Vec<String>,
    pub cast_snapshots: FxHashMap<u32, CastSnapshot>,
    pub score: Option<ScoreSnapshot>,
    pub current_frame: u32,
    pub scopes: Vec<VmScope>,
    pub script_error: Option<ScriptErrorSnapshot>,
    pub breakpoints: Vec<Breakpoint>,
    pub globals: FxHashMap<String, DatumId>,
    pub timeout_handles: FxHashMap<String, TimeoutHandle>,
    pub datum_snapshots: IntMap<DatumId, BridgeDatum>,
    pub script_instance_snapshots: FxHashMap<ScriptInstanceId, BridgeDatum>,
    pub channel_snapshots: FxHashMap<i16, ScoreSpriteSnapshot>,
    pub subscribed_member_tokens: Vec<MemberSubscription>,
    pub movie_loaded: bool,
    pub debug_messages: Vec<String>,
}

impl Default for MirrorState {
    fn default() -> MirrorState {
        MirrorState {
            cast_names: Vec::new(),
            cast_snapshots: FxHashMap::default(),
            score: None,
            current_frame: 1,
            scopes: Vec::new(),
            script_error: None,
            breakpoints: Vec::new(),
            globals: FxHashMap::default(),
            timeout_handles: FxHashMap::default(),
            datum_snapshots: IntMap::default(),
            script_instance_snapshots: FxHashMap::default(),
            channel_snapshots: FxHashMap::default(),
            subscribed_member_tokens: Vec::new(),
            movie_loaded: false,
            debug_messages: Vec::new(),
        }
    }
}

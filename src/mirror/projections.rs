use itertools::Itertools;

use super::snapshot::{
    Breakpoint, BridgeDatum, CastMemberRef, DatumId, MemberEntry, MirrorState,
    ScoreSpriteSnapshot, ScriptInstanceId, VmScope,
};
use super::subscriptions;

/// Read-only queries over one snapshot. All of them are pure; absence
/// means "not yet mirrored", never a fault, and a read never creates an
/// entry.
impl MirrorState {
    pub fn member_by_identifier(
        &self,
        cast_number: u32,
        member_number: u32,
    ) -> Option<&MemberEntry> {
        self.cast_snapshots
            .get(&cast_number)?
            .members
            .get(&member_number)
    }

    pub fn member_by_ref(&self, member_ref: &CastMemberRef) -> Option<&MemberEntry> {
        if !member_ref.is_valid() {
            return None;
        }
        self.member_by_identifier(member_ref.cast_lib as u32, member_ref.cast_member as u32)
    }

    /// Case-insensitive name search across libraries, lowest library
    /// number first.
    pub fn member_by_name(&self, name: &str) -> Option<(CastMemberRef, &MemberEntry)> {
        let target = name.to_lowercase();
        for cast_number in self.cast_snapshots.keys().sorted() {
            let cast = &self.cast_snapshots[cast_number];
            let found = cast
                .members
                .iter()
                .filter(|(_, entry)| entry.summary.name.to_lowercase() == target)
                .sorted_by_key(|(number, _)| **number)
                .next();
            if let Some((member_number, entry)) = found {
                return Some((
                    CastMemberRef {
                        cast_lib: *cast_number as i32,
                        cast_member: *member_number as i32,
                    },
                    entry,
                ));
            }
        }
        None
    }

    pub fn cast_name(&self, cast_number: u32) -> Option<&str> {
        let index = (cast_number as usize).checked_sub(1)?;
        self.cast_names.get(index).map(|name| name.as_str())
    }

    /// Innermost frame of the call stack, if the VM is inside a handler.
    pub fn current_scope(&self) -> Option<&VmScope> {
        self.scopes.last()
    }

    /// All breakpoints when no filter is given, else exactly those whose
    /// script name matches, in list order.
    pub fn breakpoints_for_script(&self, script_name: Option<&str>) -> Vec<&Breakpoint> {
        match script_name {
            None => self.breakpoints.iter().collect(),
            Some(script_name) => self
                .breakpoints
                .iter()
                .filter(|breakpoint| breakpoint.script_name == script_name)
                .collect(),
        }
    }

    pub fn channel_snapshot(&self, channel: i16) -> Option<&ScoreSpriteSnapshot> {
        self.channel_snapshots.get(&channel)
    }

    pub fn global(&self, name: &str) -> Option<DatumId> {
        self.globals.get(name).copied()
    }

    pub fn datum(&self, datum_id: DatumId) -> Option<&BridgeDatum> {
        self.datum_snapshots.get(&datum_id)
    }

    pub fn script_instance(&self, instance_id: ScriptInstanceId) -> Option<&BridgeDatum> {
        self.script_instance_snapshots.get(&instance_id)
    }

    pub fn is_member_of_interest(&self, member_ref: &CastMemberRef) -> bool {
        subscriptions::is_member_of_interest(&self.subscribed_member_tokens, member_ref)
    }

    pub fn members_of_interest(&self) -> Vec<CastMemberRef> {
        subscriptions::members_of_interest(&self.subscribed_member_tokens)
    }
}

#[cfg(test)]
mod tests {
    use fxhash::FxHashMap;

    use crate::mirror::event::MirrorEvent;
    use crate::mirror::reduce::apply;
    use crate::mirror::snapshot::{
        cast_member_ref, Breakpoint, MemberSummary, MirrorState, VmScope,
    };

    fn summary(name: &str) -> MemberSummary {
        MemberSummary {
            name: name.to_string(),
            member_kind: "bitmap".to_string(),
            script_kind: None,
        }
    }

    fn with_members(state: &MirrorState, cast_number: u32, members: Vec<(u32, &str)>) -> MirrorState {
        apply(
            state,
            MirrorEvent::CastMemberListChanged {
                cast_number,
                members: members
                    .into_iter()
                    .map(|(number, name)| (number, summary(name)))
                    .collect(),
            },
        )
        .unwrap()
    }

    fn breakpoint(script_name: &str, bytecode_index: usize) -> Breakpoint {
        Breakpoint {
            script_name: script_name.to_string(),
            handler_name: "exitFrame".to_string(),
            bytecode_index,
        }
    }

    fn scope(handler_name: &str) -> VmScope {
        VmScope {
            script_member_ref: cast_member_ref(1, 1),
            handler_name: handler_name.to_string(),
            bytecode_index: 0,
            locals: FxHashMap::default(),
            stack: vec![],
            args: vec![],
        }
    }

    #[test]
    fn test_member_by_identifier_absent_is_none() {
        let state = MirrorState::default();
        assert!(state.member_by_identifier(1, 5).is_none());
        // The read must not fabricate the library as a side effect
        assert!(state.cast_snapshots.is_empty());

        let state = with_members(&state, 1, vec![(5, "logo")]);
        assert!(state.member_by_identifier(1, 5).is_some());
        assert!(state.member_by_identifier(1, 6).is_none());
        assert!(state.member_by_identifier(2, 5).is_none());
    }

    #[test]
    fn test_member_by_ref_guards_invalid_refs() {
        let state = with_members(&MirrorState::default(), 1, vec![(5, "logo")]);
        assert!(state.member_by_ref(&cast_member_ref(1, 5)).is_some());
        assert!(state.member_by_ref(&cast_member_ref(0, 5)).is_none());
        assert!(state.member_by_ref(&cast_member_ref(-1, -1)).is_none());
    }

    #[test]
    fn test_member_by_name_is_case_insensitive() {
        let mut state = with_members(&MirrorState::default(), 2, vec![(3, "Hero Sprite")]);
        state = with_members(&state, 1, vec![(9, "backdrop")]);

        let (member_ref, entry) = state.member_by_name("hero sprite").unwrap();
        assert_eq!(member_ref, cast_member_ref(2, 3));
        assert_eq!(entry.summary.name, "Hero Sprite");
        assert!(state.member_by_name("villain").is_none());
    }

    #[test]
    fn test_current_scope_is_innermost() {
        let state = MirrorState::default();
        assert!(state.current_scope().is_none());

        let state = apply(
            &state,
            MirrorEvent::ScopeListChanged(vec![scope("startMovie"), scope("enterFrame")]),
        )
        .unwrap();
        assert_eq!(state.current_scope().unwrap().handler_name, "enterFrame");
    }

    #[test]
    fn test_breakpoints_for_script_filter() {
        let state = apply(
            &MirrorState::default(),
            MirrorEvent::BreakpointListChanged(vec![
                breakpoint("foo", 0),
                breakpoint("bar", 4),
                breakpoint("foo", 9),
            ]),
        )
        .unwrap();

        let all = state.breakpoints_for_script(None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].script_name, "bar");

        let filtered = state.breakpoints_for_script(Some("foo"));
        assert_eq!(
            filtered.iter().map(|b| b.bytecode_index).collect::<Vec<_>>(),
            vec![0, 9]
        );
        assert!(state.breakpoints_for_script(Some("fo")).is_empty());
    }

    #[test]
    fn test_cast_name_lookup() {
        let state = apply(
            &MirrorState::default(),
            MirrorEvent::CastListChanged(vec!["Internal".to_string()]),
        )
        .unwrap();
        assert_eq!(state.cast_name(1), Some("Internal"));
        assert_eq!(state.cast_name(0), None);
        assert_eq!(state.cast_name(2), None);
    }
}

use fxhash::FxHashSet;
use itertools::Itertools;

use super::snapshot::{CastMemberRef, MemberSubscription};

/// Ledger transition the fetch collaborator acts on: start streaming a
/// member's deep data on Gained, stop on Lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterestChange {
    Gained(CastMemberRef),
    Lost(CastMemberRef),
}

/// A member is of interest iff at least one token references it.
pub fn is_member_of_interest(ledger: &[MemberSubscription], member_ref: &CastMemberRef) -> bool {
    ledger
        .iter()
        .any(|subscription| subscription.member_ref == *member_ref)
}

pub fn token_count(ledger: &[MemberSubscription], member_ref: &CastMemberRef) -> usize {
    ledger
        .iter()
        .filter(|subscription| subscription.member_ref == *member_ref)
        .count()
}

/// Unique members of interest, in first-subscription order.
pub fn members_of_interest(ledger: &[MemberSubscription]) -> Vec<CastMemberRef> {
    ledger
        .iter()
        .map(|subscription| subscription.member_ref)
        .unique()
        .collect()
}

/// Diffs two ledgers into the interest transitions between them. Token
/// churn on a member that stays referenced produces no transition.
pub fn interest_changes(
    before: &[MemberSubscription],
    after: &[MemberSubscription],
) -> Vec<InterestChange> {
    let before_set: FxHashSet<CastMemberRef> = before
        .iter()
        .map(|subscription| subscription.member_ref)
        .collect();
    let after_set: FxHashSet<CastMemberRef> = after
        .iter()
        .map(|subscription| subscription.member_ref)
        .collect();

    let mut changes = Vec::new();
    for member_ref in members_of_interest(after) {
        if !before_set.contains(&member_ref) {
            changes.push(InterestChange::Gained(member_ref));
        }
    }
    for member_ref in members_of_interest(before) {
        if !after_set.contains(&member_ref) {
            changes.push(InterestChange::Lost(member_ref));
        }
    }
    changes
}

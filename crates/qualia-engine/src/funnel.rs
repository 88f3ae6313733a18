// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stage resolution over a contact's qualification milestones.
//!
//! The milestones form a linear funnel with validation branches. Which
//! prompt runs next is decided by an ordered rule table evaluated
//! top-to-bottom, first match wins; each rule also names the milestone the
//! orchestrator commits once that stage's reply has been extracted and
//! delivered. Resolution is pure: no I/O, no model calls.

use qualia_core::types::{FunnelFlag, FunnelFlags, Stage};

/// Decision emitted by [`resolve_stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDecision {
    /// The stage prompt to run.
    pub stage: Stage,
    /// Milestone committed after the stage's reply is extracted and
    /// delivered. `None` for terminal and steady-state stages.
    pub commit: Option<FunnelFlag>,
    /// A second validation prompt that must run before replying, for
    /// stages whose candidate value needs a separate accept/reject pass.
    pub chained_validation: Option<Stage>,
}

struct Rule {
    matches: fn(&FunnelFlags) -> bool,
    stage: Stage,
    commit: Option<FunnelFlag>,
    chained_validation: Option<Stage>,
}

/// Ordered funnel rules. Later rules are only reachable when every
/// milestone the earlier rules tested is already true.
static RULES: &[Rule] = &[
    Rule {
        matches: |f| !f.greeted,
        stage: Stage::NewContact,
        commit: Some(FunnelFlag::Greeted),
        chained_validation: None,
    },
    Rule {
        matches: |f| f.greeted && !f.summary_requested,
        stage: Stage::TriageInProgress,
        commit: Some(FunnelFlag::SummaryRequested),
        chained_validation: None,
    },
    Rule {
        matches: |f| f.greeted && f.summary_requested && !f.summary_confirmed,
        stage: Stage::SummaryVerifier,
        commit: Some(FunnelFlag::SummaryConfirmed),
        chained_validation: Some(Stage::SummaryValidation),
    },
    Rule {
        matches: |f| {
            f.greeted
                && f.summary_requested
                && f.summary_confirmed
                && f.urgency_resolved
                && f.scheduling_offered
                && f.booking_offered
                && !f.booking_confirmed
        },
        stage: Stage::BookingValidation,
        commit: None,
        chained_validation: None,
    },
    Rule {
        matches: |f| {
            f.greeted
                && f.summary_requested
                && f.summary_confirmed
                && f.urgency_resolved
                && f.scheduling_offered
                && !f.booking_offered
        },
        stage: Stage::NameValidation,
        commit: Some(FunnelFlag::BookingOffered),
        chained_validation: None,
    },
    Rule {
        matches: |f| {
            f.greeted
                && f.summary_requested
                && f.summary_confirmed
                && f.urgency_resolved
                && !f.scheduling_offered
        },
        stage: Stage::UrgencyValidation,
        commit: Some(FunnelFlag::SchedulingOffered),
        chained_validation: None,
    },
    Rule {
        matches: |f| {
            f.greeted
                && f.summary_requested
                && f.summary_confirmed
                && !f.urgency_resolved
                && !f.scheduling_offered
                && !f.booking_offered
                && !f.booking_confirmed
        },
        stage: Stage::SummaryIncorporationValidation,
        commit: Some(FunnelFlag::UrgencyResolved),
        chained_validation: None,
    },
    Rule {
        matches: |f| {
            f.greeted
                && f.summary_requested
                && f.summary_confirmed
                && f.urgency_resolved
                && f.scheduling_offered
                && f.booking_offered
                && f.booking_confirmed
        },
        stage: Stage::StandardService,
        commit: None,
        chained_validation: None,
    },
];

/// Resolves the next stage for a milestone snapshot.
///
/// Returns `None` when no rule matches; the caller logs the unhandled
/// conversation shape and skips the model call entirely.
pub fn resolve_stage(flags: &FunnelFlags) -> Option<StageDecision> {
    RULES.iter().find(|rule| (rule.matches)(flags)).map(|rule| StageDecision {
        stage: rule.stage,
        commit: rule.commit,
        chained_validation: rule.chained_validation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(bits: [bool; 7]) -> FunnelFlags {
        FunnelFlags {
            greeted: bits[0],
            summary_requested: bits[1],
            summary_confirmed: bits[2],
            urgency_resolved: bits[3],
            scheduling_offered: bits[4],
            booking_offered: bits[5],
            booking_confirmed: bits[6],
        }
    }

    /// All 128 snapshots, via the bits of 0..128.
    fn all_snapshots() -> impl Iterator<Item = FunnelFlags> {
        (0u8..128).map(|n| flags(std::array::from_fn(|i| n & (1 << i) != 0)))
    }

    #[test]
    fn fresh_contact_resolves_to_new_contact() {
        let decision = resolve_stage(&FunnelFlags::default()).unwrap();
        assert_eq!(decision.stage, Stage::NewContact);
        assert_eq!(decision.commit, Some(FunnelFlag::Greeted));
        assert!(decision.chained_validation.is_none());
    }

    #[test]
    fn greeted_contact_moves_to_triage() {
        let decision = resolve_stage(&flags([true, false, false, false, false, false, false]))
            .unwrap();
        assert_eq!(decision.stage, Stage::TriageInProgress);
        assert_eq!(decision.commit, Some(FunnelFlag::SummaryRequested));
    }

    #[test]
    fn summary_verifier_requires_chained_validation() {
        let decision = resolve_stage(&flags([true, true, false, false, false, false, false]))
            .unwrap();
        assert_eq!(decision.stage, Stage::SummaryVerifier);
        assert_eq!(decision.commit, Some(FunnelFlag::SummaryConfirmed));
        assert_eq!(decision.chained_validation, Some(Stage::SummaryValidation));
    }

    #[test]
    fn confirmed_summary_moves_to_incorporation() {
        let decision = resolve_stage(&flags([true, true, true, false, false, false, false]))
            .unwrap();
        assert_eq!(decision.stage, Stage::SummaryIncorporationValidation);
        assert_eq!(decision.commit, Some(FunnelFlag::UrgencyResolved));
    }

    #[test]
    fn urgency_resolved_moves_to_urgency_validation() {
        let decision = resolve_stage(&flags([true, true, true, true, false, false, false]))
            .unwrap();
        assert_eq!(decision.stage, Stage::UrgencyValidation);
        assert_eq!(decision.commit, Some(FunnelFlag::SchedulingOffered));
    }

    #[test]
    fn scheduling_offered_moves_to_name_validation() {
        let decision = resolve_stage(&flags([true, true, true, true, true, false, false]))
            .unwrap();
        assert_eq!(decision.stage, Stage::NameValidation);
        assert_eq!(decision.commit, Some(FunnelFlag::BookingOffered));
    }

    #[test]
    fn booking_offered_moves_to_booking_validation_without_commit() {
        let decision = resolve_stage(&flags([true, true, true, true, true, true, false]))
            .unwrap();
        assert_eq!(decision.stage, Stage::BookingValidation);
        assert!(decision.commit.is_none());
    }

    #[test]
    fn full_funnel_reaches_standard_service() {
        let decision = resolve_stage(&flags([true, true, true, true, true, true, true]))
            .unwrap();
        assert_eq!(decision.stage, Stage::StandardService);
        assert!(decision.commit.is_none());
    }

    #[test]
    fn resolution_is_pure() {
        for snapshot in all_snapshots() {
            assert_eq!(resolve_stage(&snapshot), resolve_stage(&snapshot));
        }
    }

    #[test]
    fn only_degenerate_snapshots_are_unresolved() {
        // The funnel is monotonic, so the only snapshots without a stage
        // are those where a later milestone is set while urgency is not:
        // summary confirmed, urgency unresolved, and at least one of
        // scheduling/booking set. There are exactly 7 of those.
        let unresolved: Vec<FunnelFlags> = all_snapshots()
            .filter(|s| resolve_stage(s).is_none())
            .collect();
        assert_eq!(unresolved.len(), 7);
        for snapshot in unresolved {
            assert!(snapshot.greeted && snapshot.summary_requested && snapshot.summary_confirmed);
            assert!(!snapshot.urgency_resolved);
            assert!(
                snapshot.scheduling_offered
                    || snapshot.booking_offered
                    || snapshot.booking_confirmed
            );
        }
    }

    #[test]
    fn committing_each_decision_walks_the_whole_funnel() {
        let mut flags = FunnelFlags::default();
        let mut visited = Vec::new();

        // Walk the funnel by committing each decision's milestone.
        // BookingValidation commits nothing; booking confirmation is an
        // external action, simulated here.
        loop {
            let decision = resolve_stage(&flags).expect("funnel walk should always resolve");
            visited.push(decision.stage);
            match decision.commit {
                Some(flag) => flags.set(flag),
                None if decision.stage == Stage::BookingValidation => {
                    flags.set(FunnelFlag::BookingConfirmed);
                }
                None => break,
            }
        }

        assert_eq!(
            visited,
            vec![
                Stage::NewContact,
                Stage::TriageInProgress,
                Stage::SummaryVerifier,
                Stage::SummaryIncorporationValidation,
                Stage::UrgencyValidation,
                Stage::NameValidation,
                Stage::BookingValidation,
                Stage::StandardService,
            ]
        );
    }
}

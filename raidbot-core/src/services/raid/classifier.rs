// File: raidbot-core/src/services/raid/classifier.rs

use tracing::warn;

use raidbot_common::models::{ModerationAction, RaidDecision, MODERATION_TYPE};

/// Maps one moderation record onto a raid decision. Pure.
///
/// `unraid` cancels regardless of session state; a `raid` while a session is
/// already active is dropped. A `raid` with no usable target is ignored.
pub fn classify(action: &ModerationAction, session_active: bool) -> RaidDecision {
    if action.kind != MODERATION_TYPE {
        return RaidDecision::Ignore;
    }

    match action.action.as_str() {
        "unraid" => RaidDecision::CancelRaid,
        "raid" if session_active => RaidDecision::Ignore,
        "raid" => match action.target() {
            Some(handle) => RaidDecision::StartRaid {
                handle: handle.to_string(),
            },
            None => {
                warn!("Raid action arrived without a target: {:?}", action.args);
                RaidDecision::Ignore
            }
        },
        _ => RaidDecision::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raid(args: &[&str]) -> ModerationAction {
        ModerationAction::moderation("raid", args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn raid_while_idle_starts() {
        assert_eq!(
            classify(&raid(&["alice"]), false),
            RaidDecision::StartRaid { handle: "alice".into() }
        );
    }

    #[test]
    fn raid_while_active_is_ignored() {
        assert_eq!(classify(&raid(&["alice"]), true), RaidDecision::Ignore);
    }

    #[test]
    fn unraid_cancels_in_either_state() {
        let unraid = ModerationAction::moderation("unraid", vec!["alice".into()]);
        assert_eq!(classify(&unraid, true), RaidDecision::CancelRaid);
        assert_eq!(classify(&unraid, false), RaidDecision::CancelRaid);
    }

    #[test]
    fn foreign_type_is_ignored() {
        let action = ModerationAction::new("whisper", "raid", vec!["alice".into()]);
        assert_eq!(classify(&action, false), RaidDecision::Ignore);
        let action = ModerationAction::new("whisper", "unraid", vec![]);
        assert_eq!(classify(&action, true), RaidDecision::Ignore);
    }

    #[test]
    fn other_moderation_actions_are_ignored() {
        for name in ["ban", "timeout", "slow", "emoteonly"] {
            let action = ModerationAction::moderation(name, vec!["bob".into()]);
            assert_eq!(classify(&action, false), RaidDecision::Ignore);
        }
    }

    #[test]
    fn raid_without_target_is_ignored() {
        assert_eq!(classify(&raid(&[]), false), RaidDecision::Ignore);
        assert_eq!(classify(&raid(&[""]), false), RaidDecision::Ignore);
    }

    #[test]
    fn classification_is_deterministic() {
        let action = raid(&["alice"]);
        for active in [false, true] {
            assert_eq!(classify(&action, active), classify(&action, active));
        }
    }
}

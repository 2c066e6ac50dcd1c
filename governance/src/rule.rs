//! The session rule: timing of the session cycle, proposal caps, and the
//! weight thresholds for proposing and executing.
//!
//! A single rule is owned by each engine. It changes only through
//! `update_session_rule` (configurator) or the execution of an approved
//! `Resolution::UpdateSessionRule`.

use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};

const DAY_SECS: u64 = 24 * 3600;

/// Absolute ceiling for each of the three periods (≈ 10,000 years).
pub const MAX_PERIOD_SECS: u64 = 3_652_500 * DAY_SECS;

/// Ceiling for both proposal caps: a selection bitmask has 128 bits.
pub const MAX_PROPOSALS_CEILING: u32 = 128;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRule {
    /// Seconds between a session's campaign start and its vote start.
    pub campaign_period: u64,
    /// Seconds during which votes are accepted.
    pub voting_period: u64,
    /// Seconds after voting during which approved resolutions may execute.
    pub grace_period: u64,
    /// Shift of the session grid relative to the epoch.
    pub period_offset: u64,
    /// Proposal cap per session for ordinary proposers.
    pub max_proposals: u32,
    /// Proposal cap per session for operators.
    pub max_proposals_operator: u32,
    /// Minimum weight to define a proposal (operators bypass it).
    #[serde(with = "weight_text")]
    pub new_proposal_threshold: u128,
    /// Minimum weight to execute resolutions (operators bypass it).
    #[serde(with = "weight_text")]
    pub execute_resolution_threshold: u128,
}

impl Default for SessionRule {
    fn default() -> Self {
        Self {
            campaign_period: 5 * DAY_SECS,
            voting_period: 2 * DAY_SECS,
            grace_period: 7 * DAY_SECS,
            period_offset: 0,
            max_proposals: 10,
            max_proposals_operator: 25,
            new_proposal_threshold: 1,
            execute_resolution_threshold: 1,
        }
    }
}

impl SessionRule {
    /// Length of one full session cycle.
    pub fn session_period(&self) -> u64 {
        self.campaign_period
            .saturating_add(self.voting_period)
            .saturating_add(self.grace_period)
    }

    /// Proposal cap that applies to a caller with or without the operator role.
    pub fn proposal_cap(&self, operator: bool) -> u32 {
        if operator {
            self.max_proposals_operator
        } else {
            self.max_proposals
        }
    }

    /// Check every field against its absolute bounds.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        for (field, value) in [
            ("campaign_period", self.campaign_period),
            ("voting_period", self.voting_period),
            ("grace_period", self.grace_period),
        ] {
            if value == 0 || value > MAX_PERIOD_SECS {
                return Err(GovernanceError::PeriodOutOfBounds {
                    field,
                    value,
                    max: MAX_PERIOD_SECS,
                });
            }
        }
        let period = self.session_period();
        if self.period_offset >= period {
            return Err(GovernanceError::OffsetTooLarge {
                offset: self.period_offset,
                period,
            });
        }
        for (field, value) in [
            ("max_proposals", self.max_proposals),
            ("max_proposals_operator", self.max_proposals_operator),
        ] {
            if value == 0 || value > MAX_PROPOSALS_CEILING {
                return Err(GovernanceError::ProposalLimitOutOfBounds {
                    field,
                    value,
                    max: MAX_PROPOSALS_CEILING,
                });
            }
        }
        Ok(())
    }
}

/// Weights are written as decimal strings in text formats, since TOML
/// integers stop at `i64`. Plain integers are accepted on input too.
pub(crate) mod weight_text {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&value.to_string())
        } else {
            serializer.serialize_u128(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(WeightVisitor)
        } else {
            deserializer.deserialize_u128(WeightVisitor)
        }
    }

    struct WeightVisitor;

    impl<'de> Visitor<'de> for WeightVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer or decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(v as u128)
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(|_| E::custom(format!("negative weight {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.parse().map_err(|_| E::custom(format!("invalid weight {v:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_is_valid() {
        let rule = SessionRule::default();
        rule.validate().unwrap();
        assert_eq!(rule.session_period(), 14 * DAY_SECS);
    }

    #[test]
    fn zero_period_rejected() {
        let rule = SessionRule {
            voting_period: 0,
            ..SessionRule::default()
        };
        let err = rule.validate().unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::PeriodOutOfBounds {
                field: "voting_period",
                ..
            }
        ));
    }

    #[test]
    fn period_above_ceiling_rejected() {
        let rule = SessionRule {
            grace_period: MAX_PERIOD_SECS + 1,
            ..SessionRule::default()
        };
        assert!(matches!(
            rule.validate(),
            Err(GovernanceError::PeriodOutOfBounds {
                field: "grace_period",
                ..
            })
        ));
    }

    #[test]
    fn period_at_ceiling_accepted() {
        let rule = SessionRule {
            campaign_period: MAX_PERIOD_SECS,
            ..SessionRule::default()
        };
        rule.validate().unwrap();
    }

    #[test]
    fn offset_must_stay_inside_period() {
        let rule = SessionRule::default();
        let at_period = SessionRule {
            period_offset: rule.session_period(),
            ..rule.clone()
        };
        assert!(matches!(
            at_period.validate(),
            Err(GovernanceError::OffsetTooLarge { .. })
        ));
        let below = SessionRule {
            period_offset: rule.session_period() - 1,
            ..rule
        };
        below.validate().unwrap();
    }

    #[test]
    fn proposal_caps_bounded() {
        let rule = SessionRule {
            max_proposals_operator: MAX_PROPOSALS_CEILING + 1,
            ..SessionRule::default()
        };
        assert!(matches!(
            rule.validate(),
            Err(GovernanceError::ProposalLimitOutOfBounds {
                field: "max_proposals_operator",
                ..
            })
        ));
    }

    #[test]
    fn cap_depends_on_role() {
        let rule = SessionRule::default();
        assert_eq!(rule.proposal_cap(false), 10);
        assert_eq!(rule.proposal_cap(true), 25);
    }

    #[test]
    fn thresholds_round_trip_through_toml() {
        let rule = SessionRule {
            new_proposal_threshold: u128::MAX,
            ..SessionRule::default()
        };
        let text = toml::to_string(&rule).unwrap();
        let parsed: SessionRule = toml::from_str(&text).unwrap();
        assert_eq!(parsed, rule);
    }

    #[test]
    fn thresholds_accept_plain_integers() {
        let parsed: SessionRule = toml::from_str("execute_resolution_threshold = 500").unwrap();
        assert_eq!(parsed.execute_resolution_threshold, 500);
        assert_eq!(parsed.voting_period, 2 * DAY_SECS);
    }

    #[test]
    fn thresholds_survive_bincode() {
        let rule = SessionRule {
            execute_resolution_threshold: 7_000_101,
            ..SessionRule::default()
        };
        let bytes = bincode::serialize(&rule).unwrap();
        let back: SessionRule = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, rule);
    }
}

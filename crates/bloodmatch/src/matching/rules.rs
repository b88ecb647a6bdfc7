//! Truncation rules deciding how many ranked donors a request receives.

use crate::records::{BloodRequest, Urgency};

/// Rule name reported when the requested blood group has no table entry.
pub const NO_COMPATIBILITY_RULE: &str = "No compatibility rule";

/// A named cap on the number of donors returned for one urgency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRule {
    /// Name reported back to the caller as the rule that fired.
    pub name: &'static str,
    /// Urgency this rule applies to; `None` only for the default rule.
    pub urgency: Option<Urgency>,
    /// Maximum number of donors kept.
    pub limit: usize,
}

/// Urgency rules, checked in order.
pub static RULES: [MatchRule; 3] = [
    MatchRule {
        name: "High urgency: Top 10 donors",
        urgency: Some(Urgency::High),
        limit: 10,
    },
    MatchRule {
        name: "Medium urgency: Top 5 donors",
        urgency: Some(Urgency::Medium),
        limit: 5,
    },
    MatchRule {
        name: "Low urgency: Top 3 donors",
        urgency: Some(Urgency::Low),
        limit: 3,
    },
];

/// Fallback when no urgency rule matches.
pub static DEFAULT_RULE: MatchRule = MatchRule {
    name: "Default: Top 5 donors",
    urgency: None,
    limit: 5,
};

impl MatchRule {
    fn matches(&self, urgency: Option<Urgency>) -> bool {
        self.urgency.is_some() && self.urgency == urgency
    }

    /// Keep at most `limit` leading entries. Shorter lists pass through whole.
    #[must_use]
    pub fn apply<T>(&self, mut ranked: Vec<T>) -> Vec<T> {
        ranked.truncate(self.limit);
        ranked
    }
}

/// Pick the first rule whose urgency matches the request, else the default.
#[must_use]
pub fn select_rule(request: &BloodRequest) -> &'static MatchRule {
    let urgency = request.urgency();
    RULES
        .iter()
        .find(|rule| rule.matches(urgency))
        .unwrap_or(&DEFAULT_RULE)
}

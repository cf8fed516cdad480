//! Pure aggregation of the event set into dashboard-ready summaries.
//!
//! [`aggregate`] is a pure function of the current snapshot plus the member
//! registry: it never mutates its inputs and is recomputed from scratch on
//! every delivered snapshot. The result is independent of the input event
//! ordering.

use crate::event::{UsageEvent, period_ordinal};
use crate::member::{MemberId, MemberRegistry};
use std::collections::BTreeMap;

/// Usage count for one member, ranked on the dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberUsage {
    /// The member's identifier
    pub member_id: MemberId,
    /// The member's registry display name
    pub display_name: String,
    /// The member's display color hint
    pub color_tag: String,
    /// How many usage events credit this member
    pub count: usize,
}

/// Usage total for one period (year + month label).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodUsage {
    /// Period year
    pub year: i32,
    /// Period label (lowercase Spanish month name)
    pub label: String,
    /// Events recorded in this period
    pub count: usize,
}

/// Derived summary of the event set. Never persisted; recomputed per snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AggregateSnapshot {
    /// Per-member counts, sorted by count descending.
    ///
    /// Every registry member appears, at 0 if unused. Ties keep registry
    /// order (stable sort).
    pub ranking: Vec<MemberUsage>,
    /// Per-period totals in calendar order (year ascending, month ascending)
    pub per_period: Vec<PeriodUsage>,
    /// Grand total of events
    pub total: usize,
}

impl AggregateSnapshot {
    /// The most frequent user, if any events exist at all.
    #[must_use]
    pub fn top_member(&self) -> Option<&MemberUsage> {
        self.ranking.first().filter(|m| m.count > 0)
    }
}

/// Derives per-member and per-period counts from the event set.
///
/// Events are matched to members by `member_id`; events whose member is no
/// longer in the registry still count toward the grand total and their
/// period, but get no ranking row (their `member_name_snapshot` keeps the
/// history readable).
///
/// # Examples
///
/// ```
/// use llavero_core::aggregate::aggregate;
/// use llavero_core::member::MemberRegistry;
///
/// let registry = MemberRegistry::default_community();
/// let summary = aggregate(&[], &registry);
/// assert_eq!(summary.total, 0);
/// assert_eq!(summary.ranking.len(), registry.len());
/// assert!(summary.ranking.iter().all(|m| m.count == 0));
/// ```
#[must_use]
pub fn aggregate(events: &[UsageEvent], registry: &MemberRegistry) -> AggregateSnapshot {
    let mut ranking: Vec<MemberUsage> = registry
        .iter()
        .map(|member| MemberUsage {
            member_id: member.id.clone(),
            display_name: member.display_name.clone(),
            color_tag: member.color_tag.clone(),
            count: 0,
        })
        .collect();

    for event in events {
        if let Some(entry) = ranking.iter_mut().find(|m| m.member_id == event.member_id) {
            entry.count += 1;
        }
    }

    // Stable sort: ties keep registry order.
    ranking.sort_by(|a, b| b.count.cmp(&a.count));

    // Key by (year, month ordinal, label) so output order does not depend on
    // input order; unknown labels sort after the calendar months.
    let mut periods: BTreeMap<(i32, u32, String), usize> = BTreeMap::new();
    for event in events {
        let ordinal = period_ordinal(&event.period_label).unwrap_or(u32::MAX);
        *periods
            .entry((event.period_year, ordinal, event.period_label.clone()))
            .or_insert(0) += 1;
    }
    let per_period = periods
        .into_iter()
        .map(|((year, _, label), count)| PeriodUsage { year, label, count })
        .collect();

    AggregateSnapshot {
        ranking,
        per_period,
        total: events.len(),
    }
}

//! Turn a day's records into per-app durations, idle time and the most
//! frequent context switch.

#![allow(missing_docs)]

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::logger::jsonl::ActivityRecord;

/// An unordered pair of app names, stored with the smaller name first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SwitchPair {
    pub first: String,
    pub second: String,
}

impl SwitchPair {
    #[must_use]
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopSwitch {
    pub pair: SwitchPair,
    pub count: u64,
}

/// Aggregated usage for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    pub app_durations: BTreeMap<String, u64>,
    pub total_active_seconds: u64,
    pub idle_seconds: u64,
    pub top_switch: Option<TopSwitch>,
}

impl UsageSummary {
    /// Apps by duration, longest first; equal durations by name.
    #[must_use]
    pub fn ranked_apps(&self) -> Vec<(&str, u64)> {
        let mut apps: Vec<(&str, u64)> = self
            .app_durations
            .iter()
            .map(|(name, secs)| (name.as_str(), *secs))
            .collect();
        apps.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        apps
    }
}

/// Aggregate records in log order, weighting each observation by
/// `poll_interval_secs`.
///
/// Wake markers are ignored entirely. Idle observations add to the idle total
/// and never start or break a switch run. When several pairs share the top
/// count, the pair that reached it first in log order wins.
#[must_use]
pub fn aggregate(records: &[ActivityRecord], poll_interval_secs: u64) -> UsageSummary {
    let mut summary = UsageSummary::default();
    let mut switch_counts: HashMap<SwitchPair, u64> = HashMap::new();
    let mut prev_active: Option<&str> = None;

    for record in records {
        let ActivityRecord::Observation { app, idle, .. } = record else {
            continue;
        };

        if *idle {
            summary.idle_seconds += poll_interval_secs;
            continue;
        }

        *summary.app_durations.entry(app.clone()).or_insert(0) += poll_interval_secs;

        if let Some(prev) = prev_active.filter(|prev| *prev != app.as_str()) {
            let pair = SwitchPair::new(prev, app);
            let count = switch_counts.entry(pair.clone()).or_insert(0);
            *count += 1;
            let best = summary.top_switch.as_ref().map_or(0, |top| top.count);
            if *count > best {
                summary.top_switch = Some(TopSwitch { pair, count: *count });
            }
        }
        prev_active = Some(app.as_str());
    }

    summary.total_active_seconds = summary.app_durations.values().sum();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn obs(app: &str, idle: bool) -> ActivityRecord {
        ActivityRecord::observation(Utc::now(), app, idle)
    }

    fn active(apps: &[&str]) -> Vec<ActivityRecord> {
        apps.iter().map(|a| obs(a, false)).collect()
    }

    #[test]
    fn empty_log_is_all_zero() {
        assert_eq!(aggregate(&[], 5), UsageSummary::default());
    }

    #[test]
    fn alternating_apps_count_four_switches_for_one_pair() {
        let summary = aggregate(&active(&["A", "B", "A", "B", "A"]), 5);
        assert_eq!(
            summary.top_switch,
            Some(TopSwitch {
                pair: SwitchPair::new("A", "B"),
                count: 4,
            })
        );
        assert_eq!(summary.app_durations["A"], 15);
        assert_eq!(summary.app_durations["B"], 10);
        assert_eq!(summary.total_active_seconds, 25);
    }

    #[test]
    fn idle_between_same_app_is_not_a_switch() {
        let summary = aggregate(&[obs("A", false), obs("Idle", true), obs("A", false)], 5);
        assert_eq!(summary.top_switch, None);
        assert_eq!(summary.idle_seconds, 5);
        assert_eq!(summary.total_active_seconds, 10);
        assert!(!summary.app_durations.contains_key("Idle"));
    }

    #[test]
    fn idle_between_different_apps_is_one_switch() {
        let summary = aggregate(&[obs("A", false), obs("Idle", true), obs("B", false)], 5);
        assert_eq!(
            summary.top_switch,
            Some(TopSwitch {
                pair: SwitchPair::new("B", "A"),
                count: 1,
            })
        );
    }

    #[test]
    fn wake_markers_are_ignored() {
        let records = vec![
            obs("A", false),
            ActivityRecord::wake(Utc::now(), 600),
            obs("A", false),
            ActivityRecord::wake(Utc::now(), 60),
            obs("B", false),
        ];
        let summary = aggregate(&records, 5);
        assert_eq!(summary.total_active_seconds, 15);
        assert_eq!(summary.top_switch.map(|t| t.count), Some(1));
    }

    #[test]
    fn ties_go_to_the_pair_that_reached_the_count_first() {
        // {A,B} reaches 1 first, then {B,C} reaches 1.
        let summary = aggregate(&active(&["A", "B", "C"]), 5);
        assert_eq!(summary.top_switch.unwrap().pair, SwitchPair::new("A", "B"));
    }

    #[test]
    fn all_idle_has_no_active_time() {
        let summary = aggregate(&[obs("A", true), obs("B", true)], 5);
        assert_eq!(summary.total_active_seconds, 0);
        assert_eq!(summary.idle_seconds, 10);
        assert!(summary.app_durations.is_empty());
    }

    #[test]
    fn ranked_apps_orders_by_duration_then_name() {
        let summary = aggregate(&active(&["B", "A", "C", "C"]), 5);
        assert_eq!(summary.ranked_apps(), vec![("C", 10), ("A", 5), ("B", 5)]);
    }

    proptest! {
        #[test]
        fn single_app_totals_scale_with_ticks(n in 0usize..200, p in 1u64..120) {
            let records: Vec<_> = (0..n).map(|_| obs("X", false)).collect();
            let summary = aggregate(&records, p);
            prop_assert_eq!(summary.app_durations.get("X").copied().unwrap_or(0), n as u64 * p);
            prop_assert_eq!(summary.idle_seconds, 0);
            prop_assert_eq!(summary.top_switch, None);
        }

        #[test]
        fn every_observation_is_accounted_once(
            ticks in prop::collection::vec((0usize..4, any::<bool>()), 0..100),
            p in 1u64..60,
        ) {
            let names = ["A", "B", "C", "D"];
            let records: Vec<_> = ticks.iter().map(|(i, idle)| obs(names[*i], *idle)).collect();
            let summary = aggregate(&records, p);
            prop_assert_eq!(
                summary.total_active_seconds + summary.idle_seconds,
                records.len() as u64 * p
            );
            prop_assert_eq!(
                summary.total_active_seconds,
                summary.app_durations.values().sum::<u64>()
            );
        }

        #[test]
        fn switch_pairs_are_unordered(a in "[a-z]{1,6}", b in "[a-z]{1,6}") {
            prop_assert_eq!(SwitchPair::new(&a, &b), SwitchPair::new(&b, &a));
        }
    }
}

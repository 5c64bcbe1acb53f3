// Performance calculator
//
// Turns the latest vital samples into one weighted 0-100 score and folds the
// page view log into per-page traffic/performance rows.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::metrics::MetricKind;
use super::round_to;
use super::visitor::VisitorAnalytics;
use crate::collectors::{PageViewEntry, VitalSnapshot};
use crate::model::{RealPageData, TimeRange};
use crate::telemetry::VitalName;

/// Score weights; INP and FID share the interactivity slot, INP preferred
const WEIGHTS: [(&[VitalName], f64); 5] = [
    (&[VitalName::Fcp], 10.0),
    (&[VitalName::Lcp], 25.0),
    (&[VitalName::Cls], 25.0),
    (&[VitalName::Inp, VitalName::Fid], 30.0),
    (&[VitalName::Ttfb], 10.0),
];

pub struct PerformanceCalculator;

impl PerformanceCalculator {
    /// Map one metric value onto 0-100: 100 at or below the good threshold,
    /// falling linearly to 50 at the poor threshold, then to 0 at twice it.
    /// Only meaningful for lower-is-better metrics.
    pub fn metric_score(kind: MetricKind, value: f64) -> f64 {
        let t = kind.thresholds();
        if !value.is_finite() {
            return 0.0;
        }
        if value <= t.good {
            return 100.0;
        }
        if value <= t.poor {
            return 100.0 - 50.0 * (value - t.good) / (t.poor - t.good);
        }
        (50.0 - 50.0 * (value - t.poor) / t.poor).max(0.0)
    }

    /// Weighted score over the vitals present in `snapshot`.
    /// Missing vitals drop out of the weighting; no vitals at all scores 0.
    pub fn performance_score(snapshot: &VitalSnapshot) -> u8 {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for (candidates, weight) in WEIGHTS {
            let sample = candidates
                .iter()
                .find_map(|name| snapshot.get(name).map(|v| (MetricKind::from(*name), *v)));

            if let Some((kind, value)) = sample {
                weighted += weight * Self::metric_score(kind, value);
                total_weight += weight;
            }
        }

        if total_weight == 0.0 {
            return 0;
        }
        (weighted / total_weight).round().clamp(0.0, 100.0) as u8
    }

    /// Per-page rows for the views inside `range`, most viewed first.
    ///
    /// Pages without a reported load time use `fallback_load_ms`. Bounce rate
    /// is taken over the sessions that landed on the page.
    pub fn page_data(
        entries: &[PageViewEntry],
        range: TimeRange,
        now: u64,
        fallback_load_ms: f64,
    ) -> Vec<RealPageData> {
        let in_range: Vec<PageViewEntry> = entries
            .iter()
            .filter(|e| range.contains(e.timestamp, now))
            .cloned()
            .collect();

        #[derive(Default)]
        struct PageAcc<'a> {
            views: u64,
            visitors: HashSet<&'a str>,
            load_sum: f64,
            load_count: usize,
        }

        let mut pages: BTreeMap<&str, PageAcc<'_>> = BTreeMap::new();
        for entry in &in_range {
            let acc = pages.entry(entry.pathname.as_str()).or_default();
            acc.views += 1;
            acc.visitors.insert(VisitorAnalytics::session_key(entry));
            if let Some(load) = entry.load_time_ms {
                acc.load_sum += load;
                acc.load_count += 1;
            }
        }

        // (landings, bounces) per page
        let mut landings: HashMap<String, (usize, usize)> = HashMap::new();
        for session in VisitorAnalytics::group_sessions(&in_range) {
            let slot = landings.entry(session.landing_page.clone()).or_insert((0, 0));
            slot.0 += 1;
            if session.is_bounce() {
                slot.1 += 1;
            }
        }

        let mut rows: Vec<RealPageData> = pages
            .into_iter()
            .map(|(page, acc)| {
                let avg_load = if acc.load_count > 0 {
                    round_to(acc.load_sum / acc.load_count as f64, 0)
                } else {
                    fallback_load_ms
                };
                let bounce_rate = match landings.get(page) {
                    Some((landed, bounced)) if *landed > 0 => {
                        (100.0 * *bounced as f64 / *landed as f64).round() as u8
                    }
                    _ => 0,
                };
                RealPageData {
                    page: page.to_string(),
                    views: acc.views,
                    unique_visitors: acc.visitors.len() as u64,
                    avg_load_time_ms: avg_load,
                    bounce_rate,
                    status: MetricKind::PageLoad.status(avg_load),
                }
            })
            .collect();

        rows.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.page.cmp(&b.page)));
        rows
    }
}

use super::domain::{rep_name, CallRecord, DateRange, SourceFilter};
use super::filters::{filter_by_date_range, filter_by_sources};
use super::normalize::{month_key, month_label, month_start_back};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Call volume split by stage for one representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepCallStats {
    pub name: String,
    pub total: usize,
    pub hot: usize,
    pub warm: usize,
    pub cold: usize,
    pub lost: usize,
    pub ineligible: usize,
}

/// One bucket of the trailing hot-lead trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyHotCount {
    pub month: String,
    pub label: &'static str,
    pub count: usize,
}

/// Call-handling funnel health for the selected window, plus a fixed
/// six-month recent-history trend.
#[derive(Debug, Clone, Serialize)]
pub struct CallCenterDashboard {
    pub total_calls: usize,
    pub leakage: usize,
    pub hot_leads: usize,
    pub rep_stats: Vec<RepCallStats>,
    pub leakage_leads: Vec<CallRecord>,
    pub hot_leads_list: Vec<CallRecord>,
    pub lost_leads_list: Vec<CallRecord>,
    pub loss_reasons: BTreeMap<String, usize>,
    pub hot_by_source: BTreeMap<String, usize>,
    pub trend: Vec<MonthlyHotCount>,
}

/// Leakage statuses: nobody has followed up on these leads yet.
const LEAKAGE_STATUSES: [&str; 3] = ["new", "uncalled", "pending"];

fn is_leakage(record: &CallRecord) -> bool {
    let status = record
        .status
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    status.is_empty() || LEAKAGE_STATUSES.contains(&status.as_str())
}

fn stage_of(record: &CallRecord) -> &str {
    record.stage.as_deref().unwrap_or("").trim()
}

/// Reduces call-center activity to the funnel view. The drill-down lists
/// hold literal copies of the input rows; a record flagged both "Hot" and
/// "Lost" lands in both accounts, since the feeds carry that kind of
/// inconsistency and this layer tallies rather than validates.
pub fn call_center_dashboard(
    records: &[CallRecord],
    range: DateRange,
    sources: &SourceFilter,
    today: NaiveDate,
) -> CallCenterDashboard {
    let filtered = filter_by_sources(filter_by_date_range(records, range), sources);

    let mut leakage_leads = Vec::new();
    let mut hot_leads_list = Vec::new();
    let mut rep_order: Vec<RepCallStats> = Vec::new();
    let mut rep_index: HashMap<String, usize> = HashMap::new();

    for record in &filtered {
        if is_leakage(record) {
            leakage_leads.push((*record).clone());
        }

        let stage = stage_of(record);
        if stage == "Hot" {
            hot_leads_list.push((*record).clone());
        }

        let name = rep_name(&record.rep);
        let index = *rep_index.entry(name.to_string()).or_insert_with(|| {
            rep_order.push(RepCallStats {
                name: name.to_string(),
                total: 0,
                hot: 0,
                warm: 0,
                cold: 0,
                lost: 0,
                ineligible: 0,
            });
            rep_order.len() - 1
        });

        let stats = &mut rep_order[index];
        stats.total += 1;
        match stage {
            "Hot" => stats.hot += 1,
            "Warm" => stats.warm += 1,
            "Cold" => stats.cold += 1,
            "Lost" => stats.lost += 1,
            _ => stats.ineligible += 1,
        }
    }

    // Stable sort keeps first-appearance order between equal totals.
    let mut rep_stats = rep_order;
    rep_stats.sort_by(|a, b| b.total.cmp(&a.total));

    let mut lost_leads_list = Vec::new();
    let mut loss_reasons: BTreeMap<String, usize> = BTreeMap::new();
    for record in &filtered {
        let outcome = record.visa_outcome.as_deref().unwrap_or("").trim();
        if stage_of(record) == "Lost" || outcome == "Lost" {
            lost_leads_list.push((*record).clone());
            let reason = record
                .loss_reason
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .or_else(|| record.status.as_deref().filter(|s| !s.trim().is_empty()))
                .unwrap_or("Not Specified");
            *loss_reasons.entry(reason.to_string()).or_insert(0) += 1;
        }
    }

    let mut hot_by_source: BTreeMap<String, usize> = BTreeMap::new();
    for record in &hot_leads_list {
        *hot_by_source
            .entry(record.channel.label().to_string())
            .or_insert(0) += 1;
    }

    CallCenterDashboard {
        total_calls: filtered.len(),
        leakage: leakage_leads.len(),
        hot_leads: hot_leads_list.len(),
        rep_stats,
        leakage_leads,
        hot_leads_list,
        lost_leads_list,
        loss_reasons,
        hot_by_source,
        trend: hot_lead_trend(records, today),
    }
}

/// Six trailing calendar months ending at the evaluation month, computed
/// from the unfiltered record set. The caller's range and source filter do
/// not apply here: this is a fixed recent-history view.
fn hot_lead_trend(records: &[CallRecord], today: NaiveDate) -> Vec<MonthlyHotCount> {
    let mut buckets: Vec<MonthlyHotCount> = (0..6)
        .rev()
        .map(|back| {
            let month = month_start_back(today, back);
            MonthlyHotCount {
                month: month_key(month),
                label: month_label(month),
                count: 0,
            }
        })
        .collect();

    let index: HashMap<String, usize> = buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| (bucket.month.clone(), i))
        .collect();

    for record in records {
        let Some(date) = record.date else { continue };
        if stage_of(record) != "Hot" {
            continue;
        }
        if let Some(&i) = index.get(&month_key(date)) {
            buckets[i].count += 1;
        }
    }

    buckets
}

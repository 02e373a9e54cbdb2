use super::domain::{CallRecord, Channel, DateRange, LeadRecord, SourceFilter, SpendRecord};
use super::filters::{filter_by_date_range, filter_by_sources};
use super::normalize::{month_key, month_start_back};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Per-channel spend/lead aggregate. `cost` is spend over ALL tallied
/// leads, not qualified ones, even though some report labels read "cost per
/// qualified lead"; the computation is the contract, the label is not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub channel: String,
    pub spend: f64,
    pub leads: usize,
    pub qual_leads: i64,
    pub cost: f64,
}

/// Progress of the qualified-lead count against a fixed target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetProgress {
    pub actual: i64,
    pub target: i64,
    pub pct: f64,
}

impl TargetProgress {
    fn of(actual: i64, target: i64) -> Self {
        let pct = (actual as f64 / target as f64 * 100.0).min(100.0);
        Self {
            actual,
            target,
            pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadTargets {
    pub month: TargetProgress,
    pub quarter: TargetProgress,
    pub year: TargetProgress,
}

/// Trailing spend series; `labels` are `YYYY-MM` keys in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendTrend {
    pub labels: Vec<String>,
    pub spend: Vec<f64>,
}

/// Drill-down row of the reconciled lead table, tagged with the feed it
/// came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum CombinedLead {
    Marketing(LeadRecord),
    CallCenter(CallRecord),
}

impl CombinedLead {
    pub fn channel(&self) -> &Channel {
        match self {
            Self::Marketing(record) => &record.channel,
            Self::CallCenter(record) => &record.channel,
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        match self {
            Self::Marketing(record) => record.client_id.as_deref(),
            Self::CallCenter(record) => record.client_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketingDashboard {
    pub total_spend: f64,
    pub total_leads: usize,
    pub qualified_leads: i64,
    pub junk_leads: usize,
    pub cost_per_lead: f64,
    pub cost_per_qual_lead: f64,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub targets: LeadTargets,
    pub combined_leads: Vec<CombinedLead>,
    pub trend: SpendTrend,
}

fn non_empty_id(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().filter(|id| !id.is_empty())
}

fn is_disqualified(stage: &Option<String>) -> bool {
    let stage = stage.as_deref().unwrap_or("").trim().to_lowercase();
    stage == "disqualified" || stage == "unqualified"
}

/// Reconciles the two lead feeds into one deduplicated count and the
/// per-channel cost view.
///
/// The dedup walk is load-bearing for the financial KPIs and must keep its
/// exact shape. Marketing rows always tally into the leaderboard and the
/// drill-down table, but only the first sighting of a client identifier
/// counts toward the unique-lead KPI, and rows without an identifier never
/// do. Call-center rows are the opposite: without an identifier they are
/// discarded outright, and with a fresh one they count everywhere. That
/// asymmetry mirrors how the business actually runs the two feeds.
///
/// Disqualification is tallied per visited row, including marketing rows
/// with no identifier, so `qualified_leads` (unique minus disqualified) can
/// sit below a naive expectation or even go negative. That arithmetic is
/// intentional; do not clamp it.
pub fn marketing_dashboard(
    spend: &[SpendRecord],
    leads: &[LeadRecord],
    calls: Option<&[CallRecord]>,
    range: DateRange,
    sources: &SourceFilter,
    today: NaiveDate,
) -> MarketingDashboard {
    let filtered_spend = filter_by_sources(filter_by_date_range(spend, range), sources);
    let filtered_leads = filter_by_sources(filter_by_date_range(leads, range), sources);
    let filtered_calls = filter_by_sources(
        filter_by_date_range(calls.unwrap_or_default(), range),
        sources,
    );

    let mut seen: HashSet<String> = HashSet::new();
    let mut channel_order: Vec<Channel> = Vec::new();
    let mut tally: HashMap<Channel, usize> = HashMap::new();
    let mut disqualified_by_channel: HashMap<Channel, usize> = HashMap::new();
    let mut combined_leads: Vec<CombinedLead> = Vec::new();
    let mut unique_leads = 0usize;
    let mut disqualified = 0usize;

    fn note_channel(
        channel: &Channel,
        order: &mut Vec<Channel>,
        tally: &mut HashMap<Channel, usize>,
    ) {
        if !tally.contains_key(channel) {
            order.push(channel.clone());
        }
        *tally.entry(channel.clone()).or_insert(0) += 1;
    }

    for record in &filtered_leads {
        note_channel(&record.channel, &mut channel_order, &mut tally);
        combined_leads.push(CombinedLead::Marketing((*record).clone()));

        if let Some(id) = non_empty_id(&record.client_id) {
            if seen.insert(id.to_string()) {
                unique_leads += 1;
            }
        }

        if is_disqualified(&record.stage) {
            disqualified += 1;
            *disqualified_by_channel
                .entry(record.channel.clone())
                .or_insert(0) += 1;
        }
    }

    for record in &filtered_calls {
        let Some(id) = non_empty_id(&record.client_id) else {
            // Call-center rows are expected to always carry an identifier;
            // ones that do not are dropped from every account.
            continue;
        };
        if !seen.insert(id.to_string()) {
            continue;
        }

        unique_leads += 1;
        note_channel(&record.channel, &mut channel_order, &mut tally);
        combined_leads.push(CombinedLead::CallCenter((*record).clone()));

        if is_disqualified(&record.stage) {
            disqualified += 1;
            *disqualified_by_channel
                .entry(record.channel.clone())
                .or_insert(0) += 1;
        }
    }

    let total_spend: f64 = filtered_spend.iter().map(|record| record.amount).sum();

    let mut spend_by_channel: HashMap<Channel, f64> = HashMap::new();
    for record in &filtered_spend {
        if !tally.contains_key(&record.channel) && !spend_by_channel.contains_key(&record.channel)
        {
            channel_order.push(record.channel.clone());
        }
        *spend_by_channel.entry(record.channel.clone()).or_insert(0.0) += record.amount;
    }

    let mut leaderboard: Vec<LeaderboardEntry> = channel_order
        .iter()
        .map(|channel| {
            let leads = tally.get(channel).copied().unwrap_or(0);
            let spend = spend_by_channel.get(channel).copied().unwrap_or(0.0);
            let disq = disqualified_by_channel.get(channel).copied().unwrap_or(0);
            let cost = if leads > 0 { spend / leads as f64 } else { 0.0 };
            LeaderboardEntry {
                channel: channel.label().to_string(),
                spend,
                leads,
                qual_leads: leads as i64 - disq as i64,
                cost,
            }
        })
        .collect();
    leaderboard.sort_by(|a, b| b.spend.total_cmp(&a.spend));

    let qualified_leads = unique_leads as i64 - disqualified as i64;

    let cost_per_lead = if unique_leads > 0 {
        total_spend / unique_leads as f64
    } else {
        0.0
    };
    let cost_per_qual_lead = if qualified_leads > 0 {
        total_spend / qualified_leads as f64
    } else {
        0.0
    };

    MarketingDashboard {
        total_spend,
        total_leads: unique_leads,
        qualified_leads,
        junk_leads: disqualified,
        cost_per_lead,
        cost_per_qual_lead,
        leaderboard,
        targets: LeadTargets {
            month: TargetProgress::of(qualified_leads, 100),
            quarter: TargetProgress::of(qualified_leads, 300),
            year: TargetProgress::of(qualified_leads, 1200),
        },
        combined_leads,
        trend: spend_trend(&filtered_spend, today),
    }
}

/// Twelve trailing months of spend ending at the evaluation month, bucketed
/// from the already-filtered spend rows. Rows whose period falls outside
/// the window contribute nothing.
fn spend_trend(filtered_spend: &[&SpendRecord], today: NaiveDate) -> SpendTrend {
    let labels: Vec<String> = (0..12)
        .rev()
        .map(|back| month_key(month_start_back(today, back)))
        .collect();
    let index: HashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect();

    let mut spend = vec![0.0; labels.len()];
    for record in filtered_spend {
        let Some(period) = record.period else { continue };
        if let Some(&i) = index.get(month_key(period).as_str()) {
            spend[i] += record.amount;
        }
    }

    SpendTrend { labels, spend }
}

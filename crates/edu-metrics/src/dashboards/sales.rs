use super::domain::{rep_name, DateRange, PipelineStage, SalesRecord};
use super::filters::filter_by_date_range;
use super::normalize::month_key;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Pipeline load and in-period decisions for one representative.
///
/// `active` is a present-tense snapshot over the full record set; the
/// decision counts honor the reporting window. The `diff_*` fields are a
/// reserved period-over-period extension point: this module always emits
/// zero, and callers that own a comparison window overlay their own deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepPipelineStats {
    pub name: String,
    pub active: usize,
    pub completed: usize,
    pub approved: usize,
    pub rejected: usize,
    pub diff_completed: i64,
    pub diff_approved: i64,
    pub diff_rejected: i64,
}

/// Files sitting in one recognized stage, with SLA aging applied.
#[derive(Debug, Clone, Serialize)]
pub struct StageSlaStats {
    pub stage: PipelineStage,
    pub label: &'static str,
    pub count: usize,
    pub overdue: usize,
    pub target_days: i64,
    pub files: Vec<SalesRecord>,
}

/// One granted visa for the period's highlight list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisaGrant {
    pub name: String,
    pub rep: String,
    pub channel: String,
    pub date: Option<NaiveDate>,
}

/// Leads-vs-visas series over the months actually present in the feed,
/// truncated to the last twelve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineTrend {
    pub labels: Vec<String>,
    pub leads: Vec<usize>,
    pub visas: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesDashboard {
    pub rep_stats: Vec<RepPipelineStats>,
    pub stage_stats: Vec<StageSlaStats>,
    pub granted_list: Vec<VisaGrant>,
    pub success_rate: u32,
    pub approved_count: usize,
    pub rejected_count: usize,
    pub trend: PipelineTrend,
    pub total_active: usize,
    pub total_lost: usize,
    pub total_dropped: usize,
}

fn lowered(field: &Option<String>) -> String {
    field.as_deref().unwrap_or("").trim().to_lowercase()
}

fn is_approved(visa_outcome: &str) -> bool {
    visa_outcome == "approved" || visa_outcome == "granted"
}

fn is_rejected(visa_outcome: &str) -> bool {
    visa_outcome == "rejected" || visa_outcome == "refused"
}

/// Whole days a file has sat in its stage as of the evaluation date,
/// floored at zero. Files without a parseable start date age zero days.
fn stage_aging(record: &SalesRecord, today: NaiveDate) -> i64 {
    match record.stage_start.or(record.date) {
        Some(start) => (today - start).num_days().max(0),
        None => 0,
    }
}

/// Reduces the pipeline feed to throughput, staffing, and stage-bottleneck
/// views. Only the decision counts, the granted list, and the success rate
/// honor the reporting window; active load, stage buckets, the trend, and
/// the outcome totals are snapshots of the full set.
pub fn sales_dashboard(
    records: &[SalesRecord],
    range: DateRange,
    today: NaiveDate,
) -> SalesDashboard {
    let current = filter_by_date_range(records, range);

    let mut rep_order: Vec<RepPipelineStats> = Vec::new();
    let mut rep_index: HashMap<String, usize> = HashMap::new();

    let rep_entry = |name: &str,
                         order: &mut Vec<RepPipelineStats>,
                         index: &mut HashMap<String, usize>|
     -> usize {
        *index.entry(name.to_string()).or_insert_with(|| {
            order.push(RepPipelineStats {
                name: name.to_string(),
                active: 0,
                completed: 0,
                approved: 0,
                rejected: 0,
                diff_completed: 0,
                diff_approved: 0,
                diff_rejected: 0,
            });
            order.len() - 1
        })
    };

    // Active pipeline load is a point-in-time concept, so it scans the full
    // set regardless of the selected window.
    for record in records {
        let index = rep_entry(rep_name(&record.rep), &mut rep_order, &mut rep_index);
        if lowered(&record.outcome) == "in process" || lowered(&record.visa_outcome) == "pending" {
            rep_order[index].active += 1;
        }
    }

    let mut granted_list = Vec::new();
    let mut approved_count = 0usize;
    let mut rejected_count = 0usize;

    for record in &current {
        let index = rep_entry(rep_name(&record.rep), &mut rep_order, &mut rep_index);
        let visa_outcome = lowered(&record.visa_outcome);

        if is_approved(&visa_outcome) {
            rep_order[index].completed += 1;
            rep_order[index].approved += 1;
            approved_count += 1;
            granted_list.push(VisaGrant {
                name: record
                    .student_name
                    .clone()
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| "Unknown".to_string()),
                rep: rep_name(&record.rep).to_string(),
                channel: record.channel.label().to_string(),
                date: record.date,
            });
        } else if is_rejected(&visa_outcome) {
            rep_order[index].completed += 1;
            rep_order[index].rejected += 1;
            rejected_count += 1;
        }
    }

    let mut rep_stats = rep_order;
    rep_stats.sort_by(|a, b| b.active.cmp(&a.active));

    let stage_stats = stage_snapshot(records, today);

    let mut trend_buckets: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    let mut total_active = 0usize;
    let mut total_lost = 0usize;
    let mut total_dropped = 0usize;

    for record in records {
        match lowered(&record.outcome).as_str() {
            "in process" => total_active += 1,
            "lost" => total_lost += 1,
            "dropped" | "lacked" => total_dropped += 1,
            _ => {}
        }

        let Some(date) = record.date else { continue };
        let bucket = trend_buckets.entry(month_key(date)).or_insert((0, 0));
        bucket.0 += 1;
        if is_approved(&lowered(&record.visa_outcome)) {
            bucket.1 += 1;
        }
    }

    let month_count = trend_buckets.len();
    let trend_tail = trend_buckets.into_iter().skip(month_count.saturating_sub(12));
    let mut trend = PipelineTrend {
        labels: Vec::new(),
        leads: Vec::new(),
        visas: Vec::new(),
    };
    for (label, (leads, visas)) in trend_tail {
        trend.labels.push(label);
        trend.leads.push(leads);
        trend.visas.push(visas);
    }

    let decided = approved_count + rejected_count;
    let success_rate = if decided > 0 {
        (approved_count as f64 / decided as f64 * 100.0).round() as u32
    } else {
        0
    };

    SalesDashboard {
        rep_stats,
        stage_stats,
        granted_list,
        success_rate,
        approved_count,
        rejected_count,
        trend,
        total_active,
        total_lost,
        total_dropped,
    }
}

/// Buckets in-process files by recognized stage, in declaration order, with
/// every stage present even at zero count. Stage text that matches no
/// recognized name is silently excluded.
fn stage_snapshot(records: &[SalesRecord], today: NaiveDate) -> Vec<StageSlaStats> {
    let mut stages: Vec<StageSlaStats> = PipelineStage::ordered()
        .into_iter()
        .map(|stage| StageSlaStats {
            stage,
            label: stage.label(),
            count: 0,
            overdue: 0,
            target_days: stage.target_days(),
            files: Vec::new(),
        })
        .collect();

    for record in records {
        if lowered(&record.outcome) != "in process" {
            continue;
        }
        let Some(stage) = record
            .current_stage
            .as_deref()
            .and_then(PipelineStage::from_label)
        else {
            continue;
        };

        // `stages` was seeded from `ordered()`, which follows declaration
        // order, so the discriminant doubles as the index.
        let entry = &mut stages[stage as usize];
        entry.count += 1;
        if stage_aging(record, today) > entry.target_days {
            entry.overdue += 1;
        }
        entry.files.push(record.clone());
    }

    stages
}

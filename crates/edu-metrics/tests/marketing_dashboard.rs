use chrono::NaiveDate;
use edu_metrics::dashboards::{
    marketing_dashboard, CallRecord, Channel, CombinedLead, DateRange, LeadRecord, SourceFilter,
    SpendRecord,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn spend(period: NaiveDate, channel: &str, amount: f64) -> SpendRecord {
    SpendRecord {
        period: Some(period),
        channel: Channel::normalize(Some(channel)),
        amount,
    }
}

fn lead(day: NaiveDate, channel: &str, id: Option<&str>, stage: &str) -> LeadRecord {
    LeadRecord {
        date: Some(day),
        channel: Channel::normalize(Some(channel)),
        client_id: id.map(str::to_string),
        stage: (!stage.is_empty()).then(|| stage.to_string()),
        student_name: None,
    }
}

fn call(day: NaiveDate, channel: &str, id: Option<&str>, stage: &str) -> CallRecord {
    CallRecord {
        date: Some(day),
        channel: Channel::normalize(Some(channel)),
        client_id: id.map(str::to_string),
        status: None,
        stage: (!stage.is_empty()).then(|| stage.to_string()),
        rep: None,
        visa_outcome: None,
        loss_reason: None,
        student_name: None,
    }
}

fn year_2024() -> DateRange {
    DateRange::new(date(2024, 1, 1), date(2024, 12, 31))
}

fn all_sources() -> SourceFilter {
    SourceFilter::from_labels(["Facebook", "TikTok", "Walk-in", "Instagram", "Google", "Referral", "Unknown"])
}

fn dashboard_of(
    spend: &[SpendRecord],
    leads: &[LeadRecord],
    calls: Option<&[CallRecord]>,
) -> edu_metrics::dashboards::MarketingDashboard {
    marketing_dashboard(spend, leads, calls, year_2024(), &all_sources(), date(2024, 6, 30))
}

#[test]
fn duplicate_identifiers_dedupe_the_kpi_but_keep_tallying() {
    let leads = vec![
        lead(date(2024, 2, 1), "fb", Some("A"), ""),
        lead(date(2024, 2, 2), "google", Some("A"), ""),
    ];

    let dashboard = dashboard_of(&[], &leads, None);

    assert_eq!(dashboard.total_leads, 1, "unique KPI counts the id once");
    let tallied: usize = dashboard.leaderboard.iter().map(|e| e.leads).sum();
    assert_eq!(tallied, 2, "both rows still tally for the leaderboard");
    assert_eq!(dashboard.combined_leads.len(), 2);
}

#[test]
fn marketing_rows_without_identifier_tally_but_never_count() {
    let leads = vec![
        lead(date(2024, 2, 1), "fb", None, ""),
        lead(date(2024, 2, 2), "fb", Some("B"), ""),
    ];

    let dashboard = dashboard_of(&[], &leads, None);

    assert_eq!(dashboard.total_leads, 1);
    assert_eq!(dashboard.leaderboard[0].leads, 2);
    assert_eq!(dashboard.combined_leads.len(), 2);
}

#[test]
fn call_center_rows_without_identifier_are_discarded_entirely() {
    let calls = vec![
        call(date(2024, 2, 1), "fb", None, ""),
        call(date(2024, 2, 2), "fb", Some(""), ""),
    ];

    let dashboard = dashboard_of(&[], &[], Some(calls.as_slice()));

    assert_eq!(dashboard.total_leads, 0);
    assert!(dashboard.leaderboard.is_empty());
    assert!(dashboard.combined_leads.is_empty());
}

#[test]
fn call_center_rows_with_fresh_identifiers_merge_in_after_marketing() {
    let leads = vec![lead(date(2024, 2, 1), "fb", Some("A"), "")];
    let calls = vec![
        call(date(2024, 2, 2), "google", Some("A"), ""), // already seen
        call(date(2024, 2, 3), "google", Some("C"), ""),
    ];

    let dashboard = dashboard_of(&[], &leads, Some(calls.as_slice()));

    assert_eq!(dashboard.total_leads, 2);
    assert_eq!(dashboard.combined_leads.len(), 2);
    assert!(matches!(dashboard.combined_leads[0], CombinedLead::Marketing(_)));
    assert!(matches!(dashboard.combined_leads[1], CombinedLead::CallCenter(_)));

    let google = dashboard
        .leaderboard
        .iter()
        .find(|e| e.channel == "Google")
        .expect("google entry present");
    assert_eq!(google.leads, 1, "the already-seen call row did not tally");
}

#[test]
fn disqualification_is_tallied_per_visited_row_even_without_identifier() {
    let leads = vec![
        lead(date(2024, 2, 1), "fb", Some("A"), "Qualified"),
        lead(date(2024, 2, 2), "fb", None, "Disqualified"),
        lead(date(2024, 2, 3), "fb", None, "unqualified "),
    ];

    let dashboard = dashboard_of(&[], &leads, None);

    // One unique lead, two disqualified rows: the subtraction goes negative
    // and stays that way.
    assert_eq!(dashboard.total_leads, 1);
    assert_eq!(dashboard.junk_leads, 2);
    assert_eq!(dashboard.qualified_leads, -1);
    assert_eq!(dashboard.cost_per_qual_lead, 0.0, "no positive denominator");
}

#[test]
fn leaderboard_merges_spend_only_and_lead_only_channels() {
    let spend_rows = vec![
        spend(date(2024, 1, 1), "fb", 30000.0),
        spend(date(2024, 2, 1), "fb", 10000.0),
        spend(date(2024, 1, 1), "tiktok", 5000.0),
    ];
    let leads = vec![
        lead(date(2024, 1, 10), "fb", Some("A"), ""),
        lead(date(2024, 1, 11), "fb", Some("B"), ""),
        lead(date(2024, 1, 12), "google", Some("C"), ""),
    ];

    let dashboard = dashboard_of(&spend_rows, &leads, None);

    assert_eq!(dashboard.total_spend, 45000.0);

    let channels: Vec<&str> = dashboard
        .leaderboard
        .iter()
        .map(|e| e.channel.as_str())
        .collect();
    assert_eq!(channels, vec!["Facebook", "TikTok", "Google"], "sorted by spend");

    let facebook = &dashboard.leaderboard[0];
    assert_eq!(facebook.spend, 40000.0);
    assert_eq!(facebook.leads, 2);
    assert_eq!(facebook.cost, 20000.0);

    // Spend with zero leads yields cost 0, not a division blow-up.
    let tiktok = &dashboard.leaderboard[1];
    assert_eq!((tiktok.leads, tiktok.cost), (0, 0.0));

    // Leads with zero spend still appear.
    let google = &dashboard.leaderboard[2];
    assert_eq!((google.spend, google.leads), (0.0, 1));
}

#[test]
fn headline_costs_divide_by_unique_and_qualified_counts() {
    let spend_rows = vec![spend(date(2024, 1, 1), "fb", 60000.0)];
    let leads = vec![
        lead(date(2024, 1, 10), "fb", Some("A"), "Qualified"),
        lead(date(2024, 1, 11), "fb", Some("B"), "Disqualified"),
        lead(date(2024, 1, 12), "fb", Some("C"), ""),
    ];

    let dashboard = dashboard_of(&spend_rows, &leads, None);

    assert_eq!(dashboard.total_leads, 3);
    assert_eq!(dashboard.qualified_leads, 2);
    assert_eq!(dashboard.cost_per_lead, 20000.0);
    assert_eq!(dashboard.cost_per_qual_lead, 30000.0);
}

#[test]
fn targets_clamp_at_one_hundred_percent() {
    let leads: Vec<LeadRecord> = (0..150)
        .map(|i| lead(date(2024, 3, 1), "fb", Some(&format!("L{i}")), ""))
        .collect();

    let dashboard = dashboard_of(&[], &leads, None);

    assert_eq!(dashboard.targets.month.actual, 150);
    assert_eq!(dashboard.targets.month.pct, 100.0, "clamped");
    assert_eq!(dashboard.targets.quarter.pct, 50.0);
    assert_eq!(dashboard.targets.year.pct, 12.5);
}

#[test]
fn spend_trend_spans_twelve_months_ending_at_the_evaluation_month() {
    let spend_rows = vec![
        spend(date(2024, 6, 1), "fb", 1000.0),
        spend(date(2023, 7, 1), "fb", 400.0),
        spend(date(2023, 6, 1), "fb", 999.0), // just outside the window
    ];

    let dashboard = dashboard_of(&spend_rows, &[], None);

    assert_eq!(dashboard.trend.labels.len(), 12);
    assert_eq!(dashboard.trend.labels.first().map(String::as_str), Some("2023-07"));
    assert_eq!(dashboard.trend.labels.last().map(String::as_str), Some("2024-06"));
    assert_eq!(dashboard.trend.spend[0], 400.0);
    assert_eq!(dashboard.trend.spend[11], 1000.0);
    let total: f64 = dashboard.trend.spend.iter().sum();
    assert_eq!(total, 1400.0, "out-of-window spend contributes nothing");
}

#[test]
fn source_filter_gates_every_feed_consistently() {
    let spend_rows = vec![
        spend(date(2024, 1, 1), "fb", 1000.0),
        spend(date(2024, 1, 1), "google", 2000.0),
    ];
    let leads = vec![
        lead(date(2024, 1, 5), "fb", Some("A"), ""),
        lead(date(2024, 1, 6), "google", Some("B"), ""),
    ];
    let calls = vec![call(date(2024, 1, 7), "google", Some("C"), "")];

    let only_facebook = SourceFilter::from_labels(["Facebook"]);
    let dashboard = marketing_dashboard(
        &spend_rows,
        &leads,
        Some(calls.as_slice()),
        year_2024(),
        &only_facebook,
        date(2024, 6, 30),
    );

    assert_eq!(dashboard.total_spend, 1000.0);
    assert_eq!(dashboard.total_leads, 1);
    assert!(dashboard.leaderboard.iter().all(|e| e.channel == "Facebook"));
}

#[test]
fn empty_inputs_produce_a_well_formed_zero_result() {
    let dashboard = dashboard_of(&[], &[], None);

    assert_eq!(dashboard.total_spend, 0.0);
    assert_eq!(dashboard.total_leads, 0);
    assert_eq!(dashboard.qualified_leads, 0);
    assert_eq!(dashboard.cost_per_lead, 0.0);
    assert!(dashboard.leaderboard.is_empty());
    assert!(dashboard.combined_leads.is_empty());
    assert_eq!(dashboard.trend.labels.len(), 12);
}

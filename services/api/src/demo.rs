use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use edu_metrics::dashboards::{
    call_center_dashboard, executive_overview, marketing_dashboard, sales_dashboard,
    CallCenterDashboard, CallRecord, Channel, DateRange, ExecutiveOverview, LeadRecord,
    MarketingDashboard, SalesDashboard, SalesRecord, SourceFilter, Sourced, SpendRecord,
};
use edu_metrics::error::AppError;
use edu_metrics::feeds::{
    load_call_center_file, load_leads_file, load_sales_file, load_spend_file,
    parse_call_center_json, parse_leads_csv, parse_sales_json, parse_spend_csv, FeedError,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Marketing spend export (CSV)
    #[arg(long)]
    pub(crate) spend: Option<PathBuf>,
    /// Marketing lead export (CSV)
    #[arg(long)]
    pub(crate) leads: Option<PathBuf>,
    /// Call center export (JSON)
    #[arg(long)]
    pub(crate) calls: Option<PathBuf>,
    /// Sales pipeline export (JSON)
    #[arg(long)]
    pub(crate) sales: Option<PathBuf>,
    /// Start of the reporting window; requires --end
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// End of the reporting window; requires --start
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) end: Option<NaiveDate>,
    /// Evaluation date for aging and trends (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Restrict the marketing and call center views to these sources
    #[arg(long, value_delimiter = ',')]
    pub(crate) sources: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for aging and trends (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

struct FeedData {
    spend: Vec<SpendRecord>,
    leads: Vec<LeadRecord>,
    calls: Vec<CallRecord>,
    sales: Vec<SalesRecord>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        spend,
        leads,
        calls,
        sales,
        start,
        end,
        today,
        sources,
    } = args;

    let data = FeedData {
        spend: match spend {
            Some(path) => load_spend_file(&path)?,
            None => Vec::new(),
        },
        leads: match leads {
            Some(path) => load_leads_file(&path)?,
            None => Vec::new(),
        },
        calls: match calls {
            Some(path) => load_call_center_file(&path)?,
            None => Vec::new(),
        },
        sales: match sales {
            Some(path) => load_sales_file(&path)?,
            None => Vec::new(),
        },
    };

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let range = match (start, end) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        _ => all_time_range(today),
    };
    let filter = if sources.is_empty() {
        observed_sources(&data)
    } else {
        SourceFilter::from_labels(&sources)
    };

    render_dashboards(&data, range, &filter, today);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let data = FeedData {
        spend: parse_spend_csv(SAMPLE_SPEND_CSV)?,
        leads: parse_leads_csv(SAMPLE_LEADS_CSV)?,
        calls: parse_call_center_json(&serde_json::from_str(SAMPLE_CALLS_JSON).map_err(FeedError::from)?)?,
        sales: parse_sales_json(&serde_json::from_str(SAMPLE_SALES_JSON).map_err(FeedError::from)?)?,
    };

    println!("Growth dashboard demo (bundled sample data)\n");
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(today),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or(today),
    );
    let filter = observed_sources(&data);
    render_dashboards(&data, range, &filter, today);
    Ok(())
}

/// The "all time" preset the HTTP service also defaults to.
fn all_time_range(today: NaiveDate) -> DateRange {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(today);
    let end = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today);
    DateRange::new(start, end)
}

fn observed_sources(data: &FeedData) -> SourceFilter {
    let mut filter = SourceFilter::default();
    for channel in Channel::fixed() {
        filter.insert(channel);
    }
    for record in &data.spend {
        filter.insert(record.channel().clone());
    }
    for record in &data.leads {
        filter.insert(record.channel().clone());
    }
    for record in &data.calls {
        filter.insert(record.channel().clone());
    }
    for record in &data.sales {
        filter.insert(record.channel().clone());
    }
    filter
}

fn render_dashboards(data: &FeedData, range: DateRange, filter: &SourceFilter, today: NaiveDate) {
    println!(
        "Reporting window: {} -> {} (evaluated {})",
        range.start, range.end, today
    );

    let marketing = marketing_dashboard(
        &data.spend,
        &data.leads,
        Some(data.calls.as_slice()),
        range,
        filter,
        today,
    );
    let call_center = call_center_dashboard(&data.calls, range, filter, today);
    let sales = sales_dashboard(&data.sales, range, today);
    let overview = executive_overview(&marketing, &call_center, &sales);

    render_marketing(&marketing);
    render_call_center(&call_center);
    render_sales(&sales);
    render_overview(&overview);
}

fn render_marketing(dashboard: &MarketingDashboard) {
    println!("\nMarketing");
    println!(
        "- Spend {:.2} | {} leads ({} qualified, {} junk)",
        dashboard.total_spend, dashboard.total_leads, dashboard.qualified_leads, dashboard.junk_leads
    );
    println!(
        "- Cost per lead {:.2} | cost per qualified lead {:.2}",
        dashboard.cost_per_lead, dashboard.cost_per_qual_lead
    );
    println!(
        "- Monthly target: {}/{} qualified ({:.0}%)",
        dashboard.targets.month.actual, dashboard.targets.month.target, dashboard.targets.month.pct
    );
    println!("Source leaderboard:");
    for entry in &dashboard.leaderboard {
        println!(
            "  - {}: spend {:.2} | {} leads | {} qualified | {:.2} per qualified",
            entry.channel, entry.spend, entry.leads, entry.qual_leads, entry.cost
        );
    }
}

fn render_call_center(dashboard: &CallCenterDashboard) {
    println!("\nCall center");
    println!(
        "- {} calls | {} leaking | {} hot",
        dashboard.total_calls, dashboard.leakage, dashboard.hot_leads
    );
    println!("Representatives:");
    for rep in &dashboard.rep_stats {
        println!(
            "  - {}: {} calls | {} hot | {} warm | {} cold | {} lost | {} ineligible",
            rep.name, rep.total, rep.hot, rep.warm, rep.cold, rep.lost, rep.ineligible
        );
    }
    if !dashboard.loss_reasons.is_empty() {
        println!("Loss reasons:");
        for (reason, count) in &dashboard.loss_reasons {
            println!("  - {reason}: {count}");
        }
    }
    println!("Hot lead trend:");
    for point in &dashboard.trend {
        println!("  - {} ({}): {}", point.month, point.label, point.count);
    }
}

fn render_sales(dashboard: &SalesDashboard) {
    println!("\nSales pipeline");
    println!(
        "- {} active | {} approved | {} rejected | {}% success",
        dashboard.total_active, dashboard.approved_count, dashboard.rejected_count,
        dashboard.success_rate
    );
    println!("Stage load:");
    for stage in &dashboard.stage_stats {
        println!(
            "  - {}: {} files, {} past the {}-day target",
            stage.label, stage.count, stage.overdue, stage.target_days
        );
    }
    if dashboard.granted_list.is_empty() {
        println!("Visas granted this period: none");
    } else {
        println!("Visas granted this period:");
        for grant in &dashboard.granted_list {
            let when = grant
                .date
                .map(|date| date.to_string())
                .unwrap_or_else(|| "undated".to_string());
            println!("  - {} ({}) via {} on {}", grant.name, grant.rep, grant.channel, when);
        }
    }
}

fn render_overview(overview: &ExecutiveOverview) {
    println!("\nExecutive overview");
    println!(
        "- Spend {:.2} | {:.2} per qualified lead | {:.2} per visa",
        overview.total_spend, overview.cost_per_qual_lead, overview.acquisition_cost_per_visa
    );
    println!(
        "- {} hot leads | {} leaking | {} visas granted | {}% success",
        overview.hot_leads, overview.leakage, overview.visas_granted, overview.success_rate
    );
    if let Some(rep) = &overview.top_sales_rep {
        println!("- Top sales rep: {} ({} approvals)", rep.name, rep.value);
    }
    if let Some(rep) = &overview.top_caller {
        println!("- Top caller: {} ({} hot leads)", rep.name, rep.value);
    }
    if let Some(rep) = &overview.needs_support {
        println!("- Needs support: {} ({} approvals)", rep.name, rep.value);
    }
    println!("Growth trend:");
    for point in &overview.growth_trend {
        println!(
            "  - {}: spend {:.2} | {} visas",
            point.label, point.spend, point.visas
        );
    }
}

const SAMPLE_SPEND_CSV: &str = "\
Month,Source,Amount Spent (NPR)
2024-01-01,Facebook,45000
2024-01-01,Google,30000
2024-02-01,Facebook,52000
2024-02-01,TikTok,12000
2024-03-01,Google,28000
";

const SAMPLE_LEADS_CSV: &str = "\
Date,Source,Client ID,Stage,Student Name
2024-01-08,fb,ED-1001,Interested,Anjali Shrestha
2024-01-15,google,ED-1002,Disqualified,Bibek Karki
2024-02-02,fb,ED-1003,Applied,Sunita Rai
2024-02-18,tiktok,ED-1004,,Prakash Gurung
2024-03-05,walk,ED-1005,Interested,Mina Tamang
";

const SAMPLE_CALLS_JSON: &str = r#"{
  "data": [
    {"Date": "2024-01-20", "Source": "google", "Client ID": "ED-2001", "Status": "Interested", "Stage": "Hot", "Rep": "Asha", "Student Name": "Ramesh Adhikari"},
    {"Date": "2024-02-05", "Source": "fb", "Client ID": "ED-2002", "Status": "New", "Stage": "", "Rep": "Asha"},
    {"Date": "2024-02-12", "Source": "referral", "Client ID": "ED-2003", "Status": "Called", "Stage": "Warm", "Rep": "Binod"},
    {"Date": "2024-03-01", "Source": "google", "Client ID": "ED-2004", "Status": "Called", "Stage": "Lost", "Rep": "Binod", "Loss Reason": "Chose local college"}
  ]
}"#;

const SAMPLE_SALES_JSON: &str = r#"{
  "sales": [
    {"Date": "2024-01-25", "Source": "fb", "Client ID": "ED-1001", "Outcome": "Completed", "Visa Outcome": "Approved", "Sales Rep": "Dipesh", "Student Name": "Anjali Shrestha"},
    {"Date": "2024-02-20", "Source": "google", "Client ID": "ED-2001", "Outcome": "In Process", "Current Stage": "GTE Review", "Stage Start Date": "2024-02-22", "Sales Rep": "Ritika", "Student Name": "Ramesh Adhikari"},
    {"Date": "2024-03-02", "Source": "fb", "Client ID": "ED-1003", "Outcome": "In Process", "Current Stage": "Offer Pending", "Stage Start Date": "2024-03-04", "Sales Rep": "Dipesh", "Student Name": "Sunita Rai"},
    {"Date": "2024-03-10", "Source": "tiktok", "Client ID": "ED-1004", "Outcome": "Completed", "Visa Outcome": "Rejected", "Sales Rep": "Ritika", "Student Name": "Prakash Gurung"}
  ]
}"#;

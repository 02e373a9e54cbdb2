use super::call_center::CallCenterDashboard;
use super::marketing::MarketingDashboard;
use super::sales::SalesDashboard;
use serde::Serialize;
use std::collections::BTreeMap;

/// A representative called out on the executive view, with the count that
/// earned the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepHighlight {
    pub name: String,
    pub value: usize,
}

/// One month of the growth series: marketing spend joined against visa
/// outcomes on the `YYYY-MM` label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthPoint {
    pub label: String,
    pub spend: f64,
    pub visas: usize,
}

/// Cross-dashboard headline view for the executive surface.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveOverview {
    pub total_spend: f64,
    pub cost_per_qual_lead: f64,
    /// Total spend over visas approved in period; 0 when none were.
    pub acquisition_cost_per_visa: f64,
    pub hot_leads: usize,
    pub leakage: usize,
    pub visas_granted: usize,
    pub success_rate: u32,
    pub active_pipeline: usize,
    pub overdue_files: usize,
    pub top_sales_rep: Option<RepHighlight>,
    pub top_caller: Option<RepHighlight>,
    pub needs_support: Option<RepHighlight>,
    pub visas_by_source: BTreeMap<String, usize>,
    pub growth_trend: Vec<GrowthPoint>,
}

/// Composes the three dashboard results into the executive headline view.
/// Pure recombination: nothing here re-reads the raw records.
pub fn executive_overview(
    marketing: &MarketingDashboard,
    call_center: &CallCenterDashboard,
    sales: &SalesDashboard,
) -> ExecutiveOverview {
    let acquisition_cost_per_visa = if sales.approved_count > 0 {
        marketing.total_spend / sales.approved_count as f64
    } else {
        0.0
    };

    let active_pipeline = sales.rep_stats.iter().map(|rep| rep.active).sum();
    let overdue_files = sales.stage_stats.iter().map(|stage| stage.overdue).sum();

    // Highlight reducers keep the LAST extreme on ties, matching how the
    // executive view has always broken them.
    let mut top_sales_rep: Option<RepHighlight> = None;
    let mut needs_support: Option<RepHighlight> = None;
    for rep in &sales.rep_stats {
        if top_sales_rep
            .as_ref()
            .is_none_or(|best| rep.approved >= best.value)
        {
            top_sales_rep = Some(RepHighlight {
                name: rep.name.clone(),
                value: rep.approved,
            });
        }
        if needs_support
            .as_ref()
            .is_none_or(|worst| rep.approved <= worst.value)
        {
            needs_support = Some(RepHighlight {
                name: rep.name.clone(),
                value: rep.approved,
            });
        }
    }

    let mut top_caller: Option<RepHighlight> = None;
    for rep in &call_center.rep_stats {
        if top_caller.as_ref().is_none_or(|best| rep.hot >= best.value) {
            top_caller = Some(RepHighlight {
                name: rep.name.clone(),
                value: rep.hot,
            });
        }
    }

    let mut visas_by_source: BTreeMap<String, usize> = BTreeMap::new();
    for grant in &sales.granted_list {
        *visas_by_source.entry(grant.channel.clone()).or_insert(0) += 1;
    }

    let growth_trend = sales
        .trend
        .labels
        .iter()
        .zip(&sales.trend.visas)
        .map(|(label, &visas)| {
            let spend = marketing
                .trend
                .labels
                .iter()
                .position(|candidate| candidate == label)
                .map(|i| marketing.trend.spend[i])
                .unwrap_or(0.0);
            GrowthPoint {
                label: label.clone(),
                spend,
                visas,
            }
        })
        .collect();

    ExecutiveOverview {
        total_spend: marketing.total_spend,
        cost_per_qual_lead: marketing.cost_per_qual_lead,
        acquisition_cost_per_visa,
        hot_leads: call_center.hot_leads,
        leakage: call_center.leakage,
        visas_granted: sales.approved_count,
        success_rate: sales.success_rate,
        active_pipeline,
        overdue_files,
        top_sales_rep,
        top_caller,
        needs_support,
        visas_by_source,
        growth_trend,
    }
}

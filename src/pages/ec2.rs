use serde_json::Value;

use super::{attribute_text, bandwidth_clause};
use crate::pipeline::attributes::InstanceDetails;
use crate::pipeline::catalog::Category;
use crate::pipeline::pricing::NA;

fn na() -> Value {
    Value::String(NA.to_string())
}

/// One-sentence summary shown under the page title.
pub(crate) fn description(d: &InstanceDetails) -> String {
    let name = attribute_text(d, Category::Amazon, 1);
    let family_category = attribute_text(d, Category::Amazon, 2).to_lowercase();
    let cpus = attribute_text(d, Category::Compute, 0);
    let memory = attribute_text(d, Category::Compute, 1);
    let bandwidth = bandwidth_clause(d);

    format!(
        "The {name} instance is a {family_category} instance with {cpus} vCPUs, \
         {memory} GiB of memory{bandwidth}"
    )
}

/// Prices pre-selected into the page header: on-demand, spot, 1yr and 3yr
/// no-upfront reservations for us-east-1 Linux.
///
/// No us-east-1 Linux pricing at all means a custom instance of some kind;
/// a missing reservation usually means a previous generation.
pub(crate) fn initial_prices(d: &InstanceDetails) -> Vec<Value> {
    let Some(linux) = d.pricing.get("us-east-1", "linux") else {
        return vec![na(), na(), na(), na()];
    };

    let (yr1, yr3) = match (
        linux._1yr.get("Standard.noUpfront"),
        linux._3yr.get("Standard.noUpfront"),
    ) {
        (Some(a), Some(b)) => (a.clone(), b.clone()),
        _ => (na(), na()),
    };

    vec![
        linux.ondemand.clone(),
        linux.spot.clone().unwrap_or_else(na),
        yr1,
        yr3,
    ]
}

// ── Tests ──

use serde_json::Value;

use super::{attribute_text, bandwidth_clause};
use crate::pipeline::attributes::InstanceDetails;
use crate::pipeline::catalog::Category;
use crate::pipeline::pricing::NA;

fn na() -> Value {
    Value::String(NA.to_string())
}

/// The reference engine for the default price widget: Oracle for
/// memory-optimized types, PostgreSQL otherwise.
fn default_engine(instance_type: &str) -> &'static str {
    if instance_type.contains("mem") {
        "Oracle"
    } else {
        "PostgreSQL"
    }
}

pub(crate) fn description(d: &InstanceDetails) -> String {
    let name = attribute_text(d, Category::Amazon, 1);
    let family_category = attribute_text(d, Category::Amazon, 2).to_lowercase();
    let cpus = attribute_text(d, Category::Compute, 0);
    let memory = attribute_text(d, Category::Compute, 1);
    let bandwidth = bandwidth_clause(d);

    format!(
        "The {name} instance is in the {family_category} family and has {cpus} vCPUs, \
         {memory} GiB of memory{bandwidth}"
    )
}

/// On-demand plus 1yr/3yr partial-upfront reservations for us-east-1 on the
/// default engine. RDS has no spot market, so three slots instead of four.
pub(crate) fn initial_prices(d: &InstanceDetails, instance_type: &str) -> Vec<Value> {
    let engine = default_engine(instance_type);
    let Some(prices) = d.pricing.get("us-east-1", engine) else {
        return vec![na(), na(), na()];
    };

    let (yr1, yr3) = match (
        prices._1yr.get("Standard.partialUpfront"),
        prices._3yr.get("Standard.partialUpfront"),
    ) {
        (Some(a), Some(b)) => (a.clone(), b.clone()),
        _ => (na(), na()),
    };

    vec![prices.ondemand.clone(), yr1, yr3]
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InstanceRecord;
    use crate::pipeline::attributes::{map_attributes, MissingKeyPolicy};
    use crate::pipeline::catalog::AttributeCatalog;
    use crate::pipeline::Service;
    use serde_json::json;

    const SCHEMA: &str = "\
cloud_key,display_name,category,order,style,regex
instance_type,API Name,Amazon,1,,
pretty_name,Name,Amazon,2,,
instanceFamily,Instance Family,Amazon,3,,
vcpu,vCPUs,Compute,1,,
memory,Memory,Compute,2,,
networkPerformance,Network Performance,Networking,1,,
pricing,Pricing,Amazon,9,,
";

    fn details(v: serde_json::Value) -> InstanceDetails {
        let catalog = AttributeCatalog::from_reader(SCHEMA.as_bytes(), Service::Rds).unwrap();
        let i: InstanceRecord = serde_json::from_value(v).unwrap();
        map_attributes(Service::Rds, &i, &catalog, MissingKeyPolicy::Strict).unwrap()
    }

    fn db_r5_large(pricing: serde_json::Value) -> serde_json::Value {
        json!({
            "instance_type": "db.r5.large",
            "pretty_name": "R5 Memory Optimized Large",
            "instanceFamily": "Memory optimized",
            "vcpu": 2,
            "memory": 16,
            "networkPerformance": "10 Gigabit",
            "pricing": pricing,
        })
    }

    #[test]
    fn description_uses_family_phrasing() {
        let d = details(db_r5_large(json!({})));
        assert_eq!(
            description(&d),
            "The R5 Memory Optimized Large instance is in the memory optimized family \
             and has 2 vCPUs, 16 GiB of memory."
        );
    }

    #[test]
    fn default_engine_branches_on_mem_substring() {
        assert_eq!(default_engine("db.r5.large"), "PostgreSQL");
        assert_eq!(default_engine("db.x1.memory"), "Oracle");
    }

    #[test]
    fn initial_prices_use_postgres_partial_upfront() {
        // Engine code 14 is PostgreSQL.
        let d = details(db_r5_large(json!({
            "us-east-1": {
                "14": {
                    "ondemand": "0.29",
                    "reserved": {
                        "yrTerm1Standard.partialUpfront": "0.18",
                        "yrTerm3Standard.partialUpfront": "0.12",
                    },
                },
            },
        })));
        assert_eq!(
            initial_prices(&d, "db.r5.large"),
            vec![json!("0.29"), json!("0.18"), json!("0.12")]
        );
    }

    #[test]
    fn missing_region_means_three_na_slots() {
        let d = details(db_r5_large(json!({})));
        assert_eq!(initial_prices(&d, "db.r5.large"), vec![json!(NA); 3]);
    }
}

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::SiteError;
use crate::pipeline::Service;

/// One scraped instance: a bag of raw attributes keyed by `instance_type`.
///
/// Inputs are immutable after load except for the derived render fields
/// added by [`add_render_info`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl InstanceRecord {
    pub fn instance_type(&self) -> &str {
        self.fields
            .get("instance_type")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn vcpus(&self, service: Service) -> u32 {
        value_u32(self.get(service.vcpu_key()))
    }

    pub fn memory(&self) -> f64 {
        value_f64(self.get("memory"))
    }
}

pub fn load_instances(path: &Path) -> Result<Vec<InstanceRecord>> {
    info!("Loading data from {}...", path.display());
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading instance data {}", path.display()))?;
    let instances: Vec<InstanceRecord> = serde_json::from_str(&text)
        .with_context(|| format!("parsing instance data {}", path.display()))?;
    Ok(instances)
}

/// Region code -> display name. The process cannot run without it.
pub fn load_regions(path: &Path) -> crate::error::Result<BTreeMap<String, String>> {
    let file = fs::File::open(path).map_err(|e| SiteError::RegionCatalog {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_yaml::from_reader(file).map_err(|e| SiteError::RegionCatalog {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Community-contributed link annotations: a multi-document YAML stream of
/// `{instance_type: {links: [...]}}` documents, flattened to
/// `(instance_type, links)` pairs.
pub fn load_community(path: &Path) -> Result<Vec<(String, Value)>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading community contributions {}", path.display()))?;

    let mut docs = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&text) {
        let value = Value::deserialize(document)
            .with_context(|| format!("parsing community contributions {}", path.display()))?;
        let Some(obj) = value.as_object() else {
            continue;
        };
        if let Some((itype, body)) = obj.iter().next() {
            let links = body
                .get("links")
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()));
            docs.push((itype.clone(), links));
        }
    }
    Ok(docs)
}

/// Links for one instance type. Linear scan; fine at current data volumes.
pub fn community_links(instance_type: &str, docs: &[(String, Value)]) -> Value {
    for (itype, links) in docs {
        if itype == instance_type {
            return links.clone();
        }
    }
    Value::Array(Vec::new())
}

/// Network-performance texts in ascending display order; unknown texts rank
/// after all of these.
const NETWORK_RANK: &[&str] = &[
    "Very Low",
    "Low",
    "Low to Moderate",
    "Moderate",
    "High",
    "Up to 5 Gigabit",
    "Up to 10 Gigabit",
    "10 Gigabit",
    "12 Gigabit",
    "20 Gigabit",
    "Up to 25 Gigabit",
    "25 Gigabit",
    "50 Gigabit",
    "75 Gigabit",
    "100 Gigabit",
];

/// Add the derived fields the index templates sort and display by.
pub fn add_render_info(i: &mut InstanceRecord) {
    network_sort(i);
    add_cpu_detail(i);
}

fn network_sort(i: &mut InstanceRecord) {
    let perf = i
        .get("network_performance")
        .and_then(Value::as_str)
        .unwrap_or("");
    let rank = NETWORK_RANK
        .iter()
        .position(|p| *p == perf)
        .unwrap_or(NETWORK_RANK.len());
    let mut sort = rank * 2;
    if truthy(i.get("ebs_optimized")) {
        sort += 1;
    }
    i.set("network_sort", Value::from(sort as u64));
}

fn add_cpu_detail(i: &mut InstanceRecord) {
    let vcpu = i.get("vCPU").and_then(Value::as_f64);

    // Instances with variable/burstable ECU carry a non-numeric marker.
    let ecu_per_vcpu = match (i.get("ECU").and_then(Value::as_f64), vcpu) {
        (Some(ecu), Some(c)) if c != 0.0 => float_value(ecu / c),
        _ => Value::String("unknown".to_string()),
    };
    i.set("ECU_per_vcpu", ecu_per_vcpu);

    let memory_per_vcpu = match (i.get("memory").and_then(Value::as_f64), vcpu) {
        (Some(mem), Some(c)) if c != 0.0 => float_value((mem / c * 100.0).round() / 100.0),
        _ => Value::String("unknown".to_string()),
    };
    i.set("memory_per_vcpu", memory_per_vcpu);

    if i.get("physical_processor").is_some() {
        let cleaned = i
            .get("physical_processor")
            .and_then(Value::as_str)
            .unwrap_or("")
            .replace('*', "");
        i.set("physical_processor", Value::String(cleaned));

        for key in ["intel_avx", "intel_avx2", "intel_avx512", "intel_turbo"] {
            let flag = truthy(i.get(key));
            i.set(
                key,
                Value::String(if flag { "Yes".to_string() } else { String::new() }),
            );
        }
    }
}

fn float_value(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String("unknown".to_string()))
}

pub(crate) fn value_u32(v: Option<&Value>) -> u32 {
    match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0) as u32,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn value_f64(v: Option<&Value>) -> f64 {
    match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn truthy(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        _ => false,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> InstanceRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn network_sort_ranks_and_rewards_ebs() {
        let mut i = record(json!({
            "instance_type": "m5.large",
            "network_performance": "10 Gigabit",
            "ebs_optimized": true,
        }));
        add_render_info(&mut i);
        // rank 7, doubled, +1 for EBS optimization
        assert_eq!(i.get("network_sort"), Some(&json!(15)));

        let mut unknown = record(json!({
            "instance_type": "x1.odd",
            "network_performance": "Quantum",
        }));
        add_render_info(&mut unknown);
        assert_eq!(
            unknown.get("network_sort"),
            Some(&json!(NETWORK_RANK.len() * 2))
        );
    }

    #[test]
    fn cpu_detail_handles_burstable_ecu() {
        let mut i = record(json!({
            "instance_type": "t2.micro",
            "ECU": "variable",
            "vCPU": 1,
            "memory": 1.0,
        }));
        add_render_info(&mut i);
        assert_eq!(i.get("ECU_per_vcpu"), Some(&json!("unknown")));
        assert_eq!(i.get("memory_per_vcpu"), Some(&json!(1.0)));
    }

    #[test]
    fn memory_per_vcpu_is_rounded() {
        let mut i = record(json!({
            "instance_type": "r5.large",
            "ECU": 10,
            "vCPU": 3,
            "memory": 16.0,
        }));
        add_render_info(&mut i);
        assert_eq!(i.get("memory_per_vcpu"), Some(&json!(5.33)));
    }

    #[test]
    fn processor_cleanup_and_intel_flags() {
        let mut i = record(json!({
            "instance_type": "m5.large",
            "physical_processor": "Intel Xeon Platinum 8175*",
            "intel_avx": true,
            "intel_avx2": false,
            "intel_avx512": 1,
            "intel_turbo": null,
        }));
        add_render_info(&mut i);
        assert_eq!(
            i.get("physical_processor"),
            Some(&json!("Intel Xeon Platinum 8175"))
        );
        assert_eq!(i.get("intel_avx"), Some(&json!("Yes")));
        assert_eq!(i.get("intel_avx2"), Some(&json!("")));
        assert_eq!(i.get("intel_avx512"), Some(&json!("Yes")));
        assert_eq!(i.get("intel_turbo"), Some(&json!("")));
    }

    #[test]
    fn community_lookup_is_keyed_by_instance_type() {
        let docs = vec![
            ("m5.large".to_string(), json!([{ "title": "Benchmarks", "url": "https://example.com" }])),
            ("c5.large".to_string(), json!([])),
        ];
        let hit = community_links("m5.large", &docs);
        assert_eq!(hit.as_array().unwrap().len(), 1);
        let miss = community_links("t2.nano", &docs);
        assert_eq!(miss, json!([]));
    }

    #[test]
    fn shipped_metadata_loads() {
        let regions = load_regions(Path::new("meta/regions_aws.yaml")).unwrap();
        assert_eq!(
            regions.get("us-east-1").map(String::as_str),
            Some("US East (N. Virginia)")
        );

        let community = load_community(Path::new("meta/community_contributions.yaml")).unwrap();
        assert_eq!(
            community_links("m5.large", &community)
                .as_array()
                .unwrap()
                .len(),
            2
        );
        assert_eq!(community_links("db.r5.large", &community).as_array().unwrap().len(), 1);
    }

    #[test]
    fn numeric_fields_accept_strings() {
        let i = record(json!({ "instance_type": "db.r5.large", "vcpu": "2", "memory": "16" }));
        assert_eq!(i.vcpus(Service::Rds), 2);
        assert_eq!(i.memory(), 16.0);
    }
}

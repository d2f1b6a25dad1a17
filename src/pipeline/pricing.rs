use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::platforms::rds_engine_label;
use super::Service;
use crate::data::InstanceRecord;
use crate::error::Result;

/// Placeholder for any price slot that could not be resolved.
pub const NA: &str = "N/A";

fn na() -> Value {
    Value::String(NA.to_string())
}

/// EC2 pseudo-products carried in the pricing feed that are not purchasable
/// operating systems.
const BOOKKEEPING_CODES: &[&str] = &["ebs", "emr"];

/// Reserved-term source keys carry a 7-character prefix ("yrTerm1...",
/// "yrTerm3...") ahead of the plan name.
const TERM_PREFIX_LEN: usize = 7;

/// One OS/engine's display price slots. Every slot is always present; a
/// missing source field becomes the `"N/A"` sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsPrices {
    pub ondemand: Value,
    /// EC2 only; RDS has no spot market.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot: Option<Value>,
    pub _1yr: Value,
    pub _3yr: Value,
}

/// Display-ready pricing: region -> OS/engine -> slots.
///
/// EC2 entries stay keyed by OS code ("linux"); RDS engine codes are resolved
/// to display labels ("PostgreSQL") during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceTable(pub BTreeMap<String, BTreeMap<String, OsPrices>>);

impl PriceTable {
    pub fn oses(&self, region: &str) -> Option<&BTreeMap<String, OsPrices>> {
        self.0.get(region)
    }

    pub fn get(&self, region: &str, os: &str) -> Option<&OsPrices> {
        self.0.get(region).and_then(|m| m.get(os))
    }
}

/// Reshape the raw `region -> os -> {ondemand, spot_max, reserved}` feed into
/// the display table. Never fails: missing fields become sentinels, unknown
/// or internal product codes are skipped.
pub fn normalize(service: Service, raw: &Value) -> PriceTable {
    let mut table = BTreeMap::new();
    let Some(regions) = raw.as_object() else {
        return PriceTable(table);
    };

    for (region, per_os) in regions {
        let Some(per_os) = per_os.as_object() else {
            continue;
        };
        let entry: &mut BTreeMap<String, OsPrices> = table.entry(region.clone()).or_default();

        for (code, p) in per_os {
            let label = match service {
                Service::Ec2 => {
                    if BOOKKEEPING_CODES.contains(&code.as_str()) {
                        continue;
                    }
                    code.clone()
                }
                Service::Rds => {
                    // Codes longer than 3 chars are storage/management
                    // pseudo-products; unknown short codes are skipped too.
                    if code.len() > 3 {
                        continue;
                    }
                    match rds_engine_label(code) {
                        Some(label) => label.to_string(),
                        None => continue,
                    }
                }
            };

            let reserved = p.get("reserved").and_then(Value::as_object);
            entry.insert(
                label,
                OsPrices {
                    ondemand: p.get("ondemand").cloned().unwrap_or_else(na),
                    spot: match service {
                        Service::Ec2 => Some(p.get("spot_max").cloned().unwrap_or_else(na)),
                        Service::Rds => None,
                    },
                    _1yr: reserved_bucket(reserved, "Term1"),
                    _3yr: reserved_bucket(reserved, "Term3"),
                },
            );
        }
    }

    PriceTable(table)
}

/// Reserved plans matching a term, with the source-key prefix dropped.
/// A present-but-unmatched reserved map yields an empty bucket; only a
/// missing reserved map yields the sentinel.
fn reserved_bucket(reserved: Option<&Map<String, Value>>, term: &str) -> Value {
    match reserved {
        None => na(),
        Some(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| k.contains(term))
                .map(|(k, v)| (k.get(TERM_PREFIX_LEN..).unwrap_or("").to_string(), v.clone()))
                .collect(),
        ),
    }
}

/// Key-interning compressor for the pricing blob embedded in index pages.
///
/// Owns its index map and counter; construct one per call. Every object key
/// at every nesting level of `{instance_type -> pricing}` is replaced by a
/// small integer, and the key index is shipped alongside the data.
#[derive(Debug, Default)]
pub struct PricingCompressor {
    index: HashMap<String, usize>,
    next: usize,
}

impl PricingCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{"index": {key -> id}, "data": <compressed>}` as a JSON string.
    pub fn compress(mut self, instances: &[InstanceRecord]) -> Result<String> {
        let mut prices = Map::new();
        for i in instances {
            prices.insert(
                i.instance_type().to_string(),
                i.get("pricing").cloned().unwrap_or(Value::Null),
            );
        }
        let data = self.compress_value(&Value::Object(prices));

        let mut index = Map::new();
        let mut entries: Vec<(&String, &usize)> = self.index.iter().collect();
        entries.sort_by_key(|(_, id)| **id);
        for (key, id) in entries {
            index.insert(key.clone(), Value::from(*id));
        }

        Ok(serde_json::to_string(&serde_json::json!({
            "index": index,
            "data": data,
        }))?)
    }

    fn intern(&mut self, key: &str) -> usize {
        if let Some(id) = self.index.get(key) {
            return *id;
        }
        let id = self.next;
        self.index.insert(key.to_string(), id);
        self.next += 1;
        id
    }

    fn compress_value(&mut self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (self.intern(k).to_string(), self.compress_value(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

/// Inverse of [`PricingCompressor::compress`]: reproduces the original
/// `{instance_type -> pricing}` structure exactly.
pub fn decompress(blob: &str) -> Result<Value> {
    let parsed: Value = serde_json::from_str(blob)?;
    let mut names: HashMap<String, String> = HashMap::new();
    if let Some(index) = parsed.get("index").and_then(Value::as_object) {
        for (key, id) in index {
            if let Some(id) = id.as_u64() {
                names.insert(id.to_string(), key.clone());
            }
        }
    }
    let data = parsed.get("data").cloned().unwrap_or(Value::Null);
    Ok(expand(&data, &names))
}

fn expand(value: &Value, names: &HashMap<String, String>) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(id, v)| {
                    let key = names.get(id).cloned().unwrap_or_else(|| id.clone());
                    (key, expand(v, names))
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// `{instance_type -> availability_zones}` JSON for the index page, covering
/// only instances that carry both fields.
pub fn compress_instance_azs(instances: &[InstanceRecord]) -> Result<String> {
    let mut map = Map::new();
    for i in instances {
        if let (Some(itype), Some(azs)) = (
            i.get("instance_type").and_then(Value::as_str),
            i.get("availability_zones"),
        ) {
            map.insert(itype.to_string(), azs.clone());
        }
    }
    Ok(serde_json::to_string(&Value::Object(map))?)
}

// ── Tests ──

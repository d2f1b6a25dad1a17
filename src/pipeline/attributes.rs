use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::catalog::{AttributeCatalog, Category, RenderedAttribute};
use super::pricing::{self, PriceTable};
use super::Service;
use crate::data::InstanceRecord;
use crate::error::{Result, SiteError};

/// What to do when a raw key has no catalog entry.
///
/// The generic per-key loop runs Strict; the EC2 storage sub-attribute loop
/// always runs Permissive (keys absent there are intentionally
/// unrepresented). See DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingKeyPolicy {
    #[default]
    Strict,
    Permissive,
}

/// EC2 keys handled outside the generic mapping loop.
const EC2_SPECIAL_KEYS: &[&str] = &["pricing", "storage", "vpc"];

/// Display-ready attribute sections plus the pricing widget data for one
/// instance.
#[derive(Debug)]
pub struct InstanceDetails {
    sections: BTreeMap<Category, Vec<RenderedAttribute>>,
    pub pricing: PriceTable,
}

impl InstanceDetails {
    pub fn section(&self, category: Category) -> &[RenderedAttribute] {
        self.sections.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Template context: one key per section plus the Pricing widget.
    pub fn to_context(&self) -> Value {
        let mut out = Map::new();
        for (category, bucket) in &self.sections {
            out.insert(
                category.as_str().to_string(),
                serde_json::to_value(bucket).unwrap_or_default(),
            );
        }
        out.insert(
            "Pricing".to_string(),
            serde_json::to_value(&self.pricing).unwrap_or_default(),
        );
        Value::Object(out)
    }
}

/// Apply the attribute catalog to one instance's raw fields.
///
/// Every generic key binds a fresh descriptor copy into its category bucket;
/// buckets come out sorted ascending by `order`. The Pricing section is
/// populated from the price normalizer, not the generic loop.
pub fn map_attributes(
    service: Service,
    i: &InstanceRecord,
    catalog: &AttributeCatalog,
    policy: MissingKeyPolicy,
) -> Result<InstanceDetails> {
    let mut sections: BTreeMap<Category, Vec<RenderedAttribute>> = Category::sections(service)
        .iter()
        .map(|c| (*c, Vec::new()))
        .collect();

    for (key, value) in &i.fields {
        if service == Service::Ec2 && EC2_SPECIAL_KEYS.contains(&key.as_str()) {
            continue;
        }
        let descriptor = match catalog.get(key) {
            Some(d) => d,
            None => match policy {
                MissingKeyPolicy::Strict => {
                    return Err(SiteError::MissingDescriptor { key: key.clone() })
                }
                MissingKeyPolicy::Permissive => continue,
            },
        };

        // RDS maps its pricing key as a Coming Soon placeholder with the raw
        // blob blanked; the widget data comes from the normalizer below.
        let value = if service == Service::Rds && key == "pricing" {
            Value::Object(Map::new())
        } else {
            value.clone()
        };

        sections
            .entry(descriptor.category)
            .or_default()
            .push(descriptor.bind(value));
    }

    if service == Service::Ec2 {
        if let Some(sattrs) = i.get("storage").and_then(Value::as_object) {
            let bucket = sections.entry(Category::Storage).or_default();
            for (key, value) in sattrs {
                // Sub-attributes without a catalog entry are intentionally
                // unrepresented.
                if let Some(d) = catalog.get(key) {
                    bucket.push(d.bind(value.clone()));
                }
            }
        }
    }

    for bucket in sections.values_mut() {
        bucket.sort_by_key(|a| a.order);
    }

    let pricing = pricing::normalize(service, i.get("pricing").unwrap_or(&Value::Null));

    Ok(InstanceDetails { sections, pricing })
}

// ── Tests ──

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::Service;
use crate::error::{Result, SiteError};

/// Page section an attribute renders under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Compute,
    Networking,
    Storage,
    Amazon,
    /// Loaded and mapped, but hidden from the page.
    NotShown,
    /// RDS-only placeholder section.
    ComingSoon,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Compute" => Some(Category::Compute),
            "Networking" => Some(Category::Networking),
            "Storage" => Some(Category::Storage),
            "Amazon" => Some(Category::Amazon),
            "Not Shown" => Some(Category::NotShown),
            "Coming Soon" => Some(Category::ComingSoon),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Compute => "Compute",
            Category::Networking => "Networking",
            Category::Storage => "Storage",
            Category::Amazon => "Amazon",
            Category::NotShown => "Not Shown",
            Category::ComingSoon => "Coming Soon",
        }
    }

    /// Sections initialized for a service's detail pages, in display order.
    pub fn sections(service: Service) -> &'static [Category] {
        match service {
            Service::Ec2 => &[
                Category::Compute,
                Category::Networking,
                Category::Storage,
                Category::Amazon,
                Category::NotShown,
            ],
            Service::Rds => &[
                Category::Compute,
                Category::Networking,
                Category::Amazon,
                Category::NotShown,
                Category::ComingSoon,
            ],
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The raw key whose value is rewritten to `current`/`previous` when styled.
const CURRENT_GENERATION_KEY: &str = "currentGeneration";

/// RDS keys forced into the Coming Soon section regardless of the schema's
/// category column.
const RDS_PLACEHOLDER_KEYS: &[&str] = &["vpc", "storage", "pricing"];

/// Immutable display template for one raw attribute key.
///
/// The catalog is shared across instances; per-instance state lives in the
/// [`RenderedAttribute`] values produced by [`AttributeDescriptor::bind`].
#[derive(Debug)]
pub struct AttributeDescriptor {
    pub key: String,
    pub display_name: String,
    pub category: Category,
    pub order: i32,
    styled: bool,
    pattern: Option<Regex>,
}

impl AttributeDescriptor {
    /// Produce a fresh value-holder for one instance's attribute.
    ///
    /// Runs the extraction pattern (a non-match leaves the value unchanged)
    /// and resolves the style class for styled attributes.
    pub fn bind(&self, value: Value) -> RenderedAttribute {
        let mut value = value;
        if let Some(re) = &self.pattern {
            let text = value_text(&value);
            if let Some(m) = re.find(&text) {
                value = Value::String(m.as_str().to_string());
            }
        }

        let style = if self.styled {
            style_class(&self.key, &mut value)
        } else {
            String::new()
        };

        RenderedAttribute {
            cloud_key: self.key.clone(),
            display_name: self.display_name.clone(),
            category: self.category,
            order: self.order,
            style,
            value,
        }
    }
}

/// One display-ready attribute, owned by a single instance's page.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedAttribute {
    pub cloud_key: String,
    pub display_name: String,
    pub category: Category,
    pub order: i32,
    pub style: String,
    pub value: Value,
}

/// Key -> descriptor mapping loaded from a service's attribute-schema CSV.
#[derive(Debug, Default)]
pub struct AttributeCatalog {
    by_key: HashMap<String, AttributeDescriptor>,
}

impl AttributeCatalog {
    /// Columns: cloud_key, display_name, category, order, style, regex.
    const COLUMNS: usize = 6;

    pub fn load(path: &Path, service: Service) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, service)
    }

    pub fn from_reader<R: Read>(reader: R, service: Service) -> Result<Self> {
        let mut rows = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut by_key = HashMap::new();
        for record in rows.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            if record.len() != Self::COLUMNS {
                return Err(SiteError::schema(
                    line,
                    format!("expected {} columns, got {}", Self::COLUMNS, record.len()),
                ));
            }

            let key = record[0].to_string();
            let category_text = &record[2];
            let category = if service == Service::Rds && RDS_PLACEHOLDER_KEYS.contains(&&*key) {
                Category::ComingSoon
            } else {
                Category::parse(category_text).ok_or_else(|| {
                    SiteError::schema(line, format!("unknown category '{category_text}'"))
                })?
            };
            let order: i32 = record[3].trim().parse().map_err(|_| {
                SiteError::schema(line, format!("non-integer order '{}'", &record[3]))
            })?;
            let pattern = match record[5].trim() {
                "" => None,
                raw => Some(Regex::new(raw).map_err(|e| {
                    SiteError::schema(line, format!("invalid extraction pattern: {e}"))
                })?),
            };

            by_key.insert(
                key.clone(),
                AttributeDescriptor {
                    key,
                    display_name: record[1].to_string(),
                    category,
                    order,
                    styled: !record[4].trim().is_empty(),
                    pattern,
                },
            );
        }

        Ok(AttributeCatalog { by_key })
    }

    pub fn get(&self, key: &str) -> Option<&AttributeDescriptor> {
        self.by_key.get(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Stringify a JSON value the way the styling rules expect. JSON `null`
/// reads as "none" so it classifies as false-like.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "none".to_string(),
        other => other.to_string(),
    }
}

fn style_class(key: &str, value: &mut Value) -> String {
    let v = value_text(value).to_lowercase();

    // The current-generation flag rewrites its display value too.
    if key == CURRENT_GENERATION_KEY {
        if v == "yes" {
            *value = Value::String("current".to_string());
            return "value value-current".to_string();
        }
        if v == "no" {
            *value = Value::String("previous".to_string());
            return "value value-previous".to_string();
        }
    }

    match v.as_str() {
        "false" | "0" | "none" => "value value-false",
        "current" => "value value-current",
        "previous" => "value value-previous",
        _ => "value value-true",
    }
    .to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &str = "\
cloud_key,display_name,category,order,style,regex
vCPU,vCPUs,Compute,1,,
memory,Memory,Compute,2,,
network_performance,Network Performance,Networking,1,,
ebs_optimized,EBS Optimized,Networking,2,style,
physical_processor,Physical Processor,Compute,3,,Intel.*?v\\d
currentGeneration,Current Generation,Amazon,4,style,
";

    fn catalog() -> AttributeCatalog {
        AttributeCatalog::from_reader(SCHEMA.as_bytes(), Service::Ec2).unwrap()
    }

    #[test]
    fn loads_rows_and_skips_header() {
        let cat = catalog();
        assert_eq!(cat.len(), 6);
        let d = cat.get("vCPU").unwrap();
        assert_eq!(d.display_name, "vCPUs");
        assert_eq!(d.category, Category::Compute);
        assert_eq!(d.order, 1);
    }

    #[test]
    fn wrong_column_count_is_schema_error() {
        let bad = "cloud_key,display_name,category,order,style,regex\nvCPU,vCPUs,Compute\n";
        let err = AttributeCatalog::from_reader(bad.as_bytes(), Service::Ec2).unwrap_err();
        assert!(matches!(err, SiteError::Schema { .. }), "{err}");
    }

    #[test]
    fn bad_order_and_bad_category_are_schema_errors() {
        let bad = "cloud_key,display_name,category,order,style,regex\nvCPU,vCPUs,Compute,abc,,\n";
        assert!(AttributeCatalog::from_reader(bad.as_bytes(), Service::Ec2).is_err());

        let bad = "cloud_key,display_name,category,order,style,regex\nvCPU,vCPUs,Sideways,1,,\n";
        assert!(AttributeCatalog::from_reader(bad.as_bytes(), Service::Ec2).is_err());
    }

    #[test]
    fn rds_placeholder_keys_become_coming_soon() {
        let schema = "\
cloud_key,display_name,category,order,style,regex
storage,Storage,Compute,5,,
vcpu,vCPUs,Compute,1,,
";
        let cat = AttributeCatalog::from_reader(schema.as_bytes(), Service::Rds).unwrap();
        assert_eq!(cat.get("storage").unwrap().category, Category::ComingSoon);
        assert_eq!(cat.get("vcpu").unwrap().category, Category::Compute);
    }

    #[test]
    fn bind_returns_fresh_holders() {
        let cat = catalog();
        let d = cat.get("vCPU").unwrap();
        let a = d.bind(json!(2));
        let b = d.bind(json!(96));
        assert_eq!(a.value, json!(2));
        assert_eq!(b.value, json!(96));
    }

    #[test]
    fn extraction_pattern_replaces_on_match_only() {
        let cat = catalog();
        let d = cat.get("physical_processor").unwrap();
        let hit = d.bind(json!("Intel Xeon E5-2686 v4 (Broadwell)"));
        assert_eq!(hit.value, json!("Intel Xeon E5-2686 v4"));
        // No match leaves the value untouched, silently.
        let miss = d.bind(json!("AWS Graviton2"));
        assert_eq!(miss.value, json!("AWS Graviton2"));
    }

    #[test]
    fn style_classification() {
        let cat = catalog();
        let d = cat.get("ebs_optimized").unwrap();
        assert_eq!(d.bind(json!(false)).style, "value value-false");
        assert_eq!(d.bind(json!(0)).style, "value value-false");
        assert_eq!(d.bind(Value::Null).style, "value value-false");
        assert_eq!(d.bind(json!(true)).style, "value value-true");
        assert_eq!(d.bind(json!("current")).style, "value value-current");
        assert_eq!(d.bind(json!("previous")).style, "value value-previous");
        // Unstyled attributes carry no class at all.
        assert_eq!(cat.get("vCPU").unwrap().bind(json!(4)).style, "");
    }

    #[test]
    fn shipped_schemas_load() {
        let ec2 = AttributeCatalog::load(
            Path::new("meta/service_attributes_ec2.csv"),
            Service::Ec2,
        )
        .unwrap();
        assert!(ec2.get("vCPU").is_some());
        assert!(ec2.get("network_sort").is_some());

        let rds = AttributeCatalog::load(
            Path::new("meta/service_attributes_rds.csv"),
            Service::Rds,
        )
        .unwrap();
        assert_eq!(rds.get("pricing").unwrap().category, Category::ComingSoon);
        assert!(rds.get("ECU_per_vcpu").is_some());
    }

    #[test]
    fn current_generation_value_is_rewritten() {
        let cat = catalog();
        let d = cat.get("currentGeneration").unwrap();
        let yes = d.bind(json!("Yes"));
        assert_eq!(yes.style, "value value-current");
        assert_eq!(yes.value, json!("current"));
        let no = d.bind(json!("No"));
        assert_eq!(no.style, "value value-previous");
        assert_eq!(no.value, json!("previous"));
    }
}

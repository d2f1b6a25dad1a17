pub mod ec2;
pub mod rds;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde_json::{json, Value};
use tracing::error;

use crate::config::SiteConfig;
use crate::data::{self, InstanceRecord};
use crate::error::SiteError;
use crate::pipeline::attributes::{self, InstanceDetails, MissingKeyPolicy};
use crate::pipeline::availability::unavailable_instances;
use crate::pipeline::catalog::{AttributeCatalog, Category};
use crate::pipeline::family::{self, FamilyTables};
use crate::pipeline::Service;
use crate::render::Renderer;

/// One page that could not be rendered. The batch continues without it.
#[derive(Debug)]
pub struct RenderFailure {
    pub instance: String,
    pub trace: String,
}

enum PageOutcome {
    Written(PathBuf),
    Failed(RenderFailure),
}

/// Render every instance's detail page for a service.
///
/// Per-instance render failures are recorded and reported, never fatal.
/// Returns the paths of the pages actually written, for the sitemap.
#[allow(clippy::too_many_arguments)]
pub fn build_detail_pages(
    service: Service,
    instances: &[InstanceRecord],
    catalog: &AttributeCatalog,
    regions: &BTreeMap<String, String>,
    community: &[(String, Value)],
    renderer: &Renderer,
    cfg: &SiteConfig,
    policy: MissingKeyPolicy,
) -> Result<Vec<PathBuf>> {
    let subdir = cfg.detail_dir(service);
    fs::create_dir_all(&subdir)
        .with_context(|| format!("creating output directory {}", subdir.display()))?;

    let families = family::assemble(service, instances);

    let pb = ProgressBar::new(instances.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut written = Vec::new();
    let mut failures = Vec::new();
    for chunk in instances.chunks(500) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|i| {
                build_one(
                    service, i, catalog, &families, regions, community, renderer, &subdir, policy,
                )
            })
            .collect();
        for result in results {
            match result? {
                PageOutcome::Written(page) => written.push(page),
                PageOutcome::Failed(failure) => failures.push(failure),
            }
        }
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();

    for failure in &failures {
        error!("ERROR for {}: {}", failure.instance, failure.trace);
    }
    if !failures.is_empty() {
        println!(
            "{} of {} {} pages could not be rendered.",
            failures.len(),
            instances.len(),
            service.key()
        );
    }

    Ok(written)
}

#[allow(clippy::too_many_arguments)]
fn build_one(
    service: Service,
    i: &InstanceRecord,
    catalog: &AttributeCatalog,
    families: &FamilyTables,
    regions: &BTreeMap<String, String>,
    community: &[(String, Value)],
    renderer: &Renderer,
    subdir: &Path,
    policy: MissingKeyPolicy,
) -> crate::error::Result<PageOutcome> {
    let instance_type = i.instance_type();
    let page = subdir.join(format!("{instance_type}.html"));

    let details = attributes::map_attributes(service, i, catalog, policy)?;
    let family = families
        .family_of(instance_type)
        .unwrap_or_else(|| service.family_of(instance_type));
    let members = families.members(family);
    let variants = families.variant_group(service.variant_of(instance_type));
    let links = data::community_links(instance_type, community);
    let denylist = unavailable_instances(service, &details.pricing, regions);

    let (template, description, defaults) = match service {
        Service::Ec2 => (
            "instance-type",
            ec2::description(&details),
            ec2::initial_prices(&details),
        ),
        Service::Rds => (
            "instance-type-rds",
            rds::description(&details),
            rds::initial_prices(&details, instance_type),
        ),
    };

    let ctx = json!({
        "i": details.to_context(),
        "family": members,
        "description": description,
        "links": links,
        "unavailable": denylist,
        "defaults": defaults,
        "variants": variants,
        "service": service.key(),
    });

    match renderer.render_to(template, &ctx, &page) {
        Ok(()) => Ok(PageOutcome::Written(page)),
        Err(SiteError::Render { source, .. }) => Ok(PageOutcome::Failed(RenderFailure {
            instance: instance_type.to_string(),
            trace: source.to_string(),
        })),
        Err(other) => Err(other),
    }
}

/// Display text of the nth attribute in a section, or "" when absent.
pub(crate) fn attribute_text(d: &InstanceDetails, category: Category, idx: usize) -> String {
    d.section(category)
        .get(idx)
        .map(|a| match &a.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default()
}

/// Whole-number reading of an attribute value; text like "Low to Moderate"
/// is None.
pub(crate) fn attribute_int(d: &InstanceDetails, category: Category, idx: usize) -> Option<i64> {
    d.section(category).get(idx).and_then(|a| match &a.value {
        Value::Number(n) => n.as_f64().map(|f| f as i64),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// The description's trailing bandwidth clause, dropped for non-numeric
/// network-performance texts.
pub(crate) fn bandwidth_clause(d: &InstanceDetails) -> String {
    match attribute_int(d, Category::Networking, 0) {
        Some(n) => format!(" and {n} Gibps of bandwidth."),
        None => ".".to_string(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const EC2_SCHEMA: &str = "\
cloud_key,display_name,category,order,style,regex
instance_type,API Name,Amazon,1,,
pretty_name,Name,Amazon,2,,
family,Instance Family,Amazon,3,,
vCPU,vCPUs,Compute,1,,
memory,Memory,Compute,2,,
network_performance,Network Performance,Networking,1,,
";

    fn record(v: Value) -> InstanceRecord {
        serde_json::from_value(v).unwrap()
    }

    fn instances() -> Vec<InstanceRecord> {
        vec![
            record(json!({
                "instance_type": "m5.large",
                "pretty_name": "M5 General Purpose Large",
                "family": "General purpose",
                "vCPU": 2,
                "memory": 8,
                "network_performance": "10 Gigabit",
                "pricing": { "us-east-1": { "linux": { "ondemand": "0.096" } } },
            })),
            record(json!({
                "instance_type": "m5.xlarge",
                "pretty_name": "M5 General Purpose Extra Large",
                "family": "General purpose",
                "vCPU": 4,
                "memory": 16,
                "network_performance": "10 Gigabit",
                "pricing": {},
            })),
        ]
    }

    #[test]
    fn builds_pages_and_returns_their_paths() {
        let out = TempDir::new().unwrap();
        let cfg = SiteConfig {
            out_dir: out.path().to_path_buf(),
            ..SiteConfig::default()
        };
        let catalog =
            AttributeCatalog::from_reader(EC2_SCHEMA.as_bytes(), Service::Ec2).unwrap();
        let regions = BTreeMap::from([(
            "us-east-1".to_string(),
            "US East (N. Virginia)".to_string(),
        )]);
        let renderer = Renderer::new(Path::new("templates")).unwrap();

        let pages = build_detail_pages(
            Service::Ec2,
            &instances(),
            &catalog,
            &regions,
            &[],
            &renderer,
            &cfg,
            MissingKeyPolicy::Strict,
        )
        .unwrap();

        assert_eq!(pages.len(), 2);
        assert!(pages[0].ends_with("aws/ec2/m5.large.html"));
        let html = fs::read_to_string(&pages[0]).unwrap();
        assert!(html.contains("m5.large"));
        assert!(html.contains("M5 General Purpose Large"));
    }

    #[test]
    fn unknown_raw_key_fails_the_batch_on_the_strict_path() {
        let out = TempDir::new().unwrap();
        let cfg = SiteConfig {
            out_dir: out.path().to_path_buf(),
            ..SiteConfig::default()
        };
        let catalog =
            AttributeCatalog::from_reader(EC2_SCHEMA.as_bytes(), Service::Ec2).unwrap();
        let mut broken = instances();
        broken[0].set("mystery_field", json!(1));
        let renderer = Renderer::new(Path::new("templates")).unwrap();

        let result = build_detail_pages(
            Service::Ec2,
            &broken,
            &catalog,
            &BTreeMap::new(),
            &[],
            &renderer,
            &cfg,
            MissingKeyPolicy::Strict,
        );
        assert!(result.is_err());

        // The permissive policy drops the unknown key and renders anyway.
        let pages = build_detail_pages(
            Service::Ec2,
            &broken,
            &catalog,
            &BTreeMap::new(),
            &[],
            &renderer,
            &cfg,
            MissingKeyPolicy::Permissive,
        )
        .unwrap();
        assert_eq!(pages.len(), 2);
    }
}

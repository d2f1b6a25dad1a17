use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde_json::{json, Value};
use tracing::info;

use crate::config::SiteConfig;
use crate::data::InstanceRecord;
use crate::error::SiteError;
use crate::pipeline::pricing::{compress_instance_azs, PricingCompressor};
use crate::pipeline::Service;

/// Registered template names; each maps to `<templates_dir>/<name>.html.hbs`.
const TEMPLATES: &[&str] = &["index", "rds", "instance-type", "instance-type-rds", "about"];

/// Handlebars registry shared across the whole build. A missing template
/// file is fatal at construction time.
pub struct Renderer {
    hb: Handlebars<'static>,
}

impl Renderer {
    pub fn new(templates_dir: &Path) -> Result<Self> {
        let mut hb = Handlebars::new();
        hb.set_strict_mode(false);
        for name in TEMPLATES {
            let path = templates_dir.join(format!("{name}.html.hbs"));
            hb.register_template_file(name, &path)
                .with_context(|| format!("registering template {}", path.display()))?;
        }
        Ok(Renderer { hb })
    }

    pub fn render(&self, template: &str, ctx: &Value) -> crate::error::Result<String> {
        self.hb
            .render(template, ctx)
            .map_err(|e| SiteError::render(template, e))
    }

    /// Render into a file, creating parent directories as needed.
    pub fn render_to(&self, template: &str, ctx: &Value, dest: &Path) -> crate::error::Result<()> {
        let html = self.render(template, ctx)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, html)?;
        Ok(())
    }
}

pub fn generated_at() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Render a service's index page: the full instance table plus the
/// compressed pricing and availability-zone blobs the page scripts read.
pub fn render_index(
    service: Service,
    instances: &[InstanceRecord],
    renderer: &Renderer,
    cfg: &SiteConfig,
) -> Result<PathBuf> {
    let destination = cfg.index_file(service);
    info!("Rendering to {}...", destination.display());

    let pricing_json = PricingCompressor::new().compress(instances)?;
    let instance_azs_json = compress_instance_azs(instances)?;
    let ctx = json!({
        "instances": instances,
        "pricing_json": pricing_json,
        "instance_azs_json": instance_azs_json,
        "generated_at": generated_at(),
    });

    let template = match service {
        Service::Ec2 => "index",
        Service::Rds => "rds",
    };
    renderer.render_to(template, &ctx, &destination)?;
    Ok(destination)
}

pub fn about_page(renderer: &Renderer, cfg: &SiteConfig) -> Result<PathBuf> {
    let destination = cfg.about_file();
    info!("Rendering to {}...", destination.display());
    let ctx = json!({ "generated_at": generated_at() });
    renderer.render_to("about", &ctx, &destination)?;
    Ok(destination)
}

// ── Tests ──

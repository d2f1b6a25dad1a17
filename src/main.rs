mod config;
mod data;
mod error;
mod pages;
mod pipeline;
mod render;
mod sitemap;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use config::SiteConfig;
use pipeline::attributes::MissingKeyPolicy;
use pipeline::catalog::AttributeCatalog;
use pipeline::Service;
use render::Renderer;

#[derive(Parser)]
#[command(
    name = "instance-pages",
    about = "Static site generator for AWS instance pricing pages"
)]
struct Cli {
    #[command(flatten)]
    paths: PathArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PathArgs {
    /// Display metadata directory (attribute schemas, regions, community links)
    #[arg(long, default_value = "meta")]
    meta_dir: PathBuf,
    /// Handlebars template directory
    #[arg(long, default_value = "templates")]
    templates_dir: PathBuf,
    /// Output directory; scraped instances.json is read from here too
    #[arg(long, default_value = "www")]
    out_dir: PathBuf,
    /// Host prefix for sitemap URLs (empty for host-relative)
    #[arg(long, default_value = "")]
    host: String,
    /// Drop raw attributes missing from the catalog instead of failing
    #[arg(long)]
    permissive: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render both services, the about page, and the sitemap
    Build,
    /// Render EC2 detail pages and index only
    Ec2,
    /// Render RDS detail pages and index only
    Rds,
    /// Render the about page only
    About,
    /// Show dataset statistics without rendering
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let policy = if cli.paths.permissive {
        MissingKeyPolicy::Permissive
    } else {
        MissingKeyPolicy::Strict
    };
    let cfg = SiteConfig {
        meta_dir: cli.paths.meta_dir,
        templates_dir: cli.paths.templates_dir,
        out_dir: cli.paths.out_dir,
        host: cli.paths.host,
    };

    let result = match cli.command {
        Commands::Build => {
            let renderer = Renderer::new(&cfg.templates_dir)?;
            let mut pages = Vec::new();
            pages.extend(build_service(Service::Ec2, &cfg, &renderer, policy)?);
            pages.extend(build_service(Service::Rds, &cfg, &renderer, policy)?);
            pages.push(render::about_page(&renderer, &cfg)?);
            let sitemap = sitemap::build_sitemap(&pages, &cfg)?;
            println!("Wrote {} pages and {}", pages.len(), sitemap.display());
            Ok(())
        }
        Commands::Ec2 => {
            let renderer = Renderer::new(&cfg.templates_dir)?;
            let pages = build_service(Service::Ec2, &cfg, &renderer, policy)?;
            println!("Wrote {} pages", pages.len());
            Ok(())
        }
        Commands::Rds => {
            let renderer = Renderer::new(&cfg.templates_dir)?;
            let pages = build_service(Service::Rds, &cfg, &renderer, policy)?;
            println!("Wrote {} pages", pages.len());
            Ok(())
        }
        Commands::About => {
            let renderer = Renderer::new(&cfg.templates_dir)?;
            let page = render::about_page(&renderer, &cfg)?;
            println!("Wrote {}", page.display());
            Ok(())
        }
        Commands::Stats => stats(&cfg),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Detail pages plus the index for one service, in sitemap order.
fn build_service(
    service: Service,
    cfg: &SiteConfig,
    renderer: &Renderer,
    policy: MissingKeyPolicy,
) -> Result<Vec<PathBuf>> {
    let mut instances = data::load_instances(&cfg.instances_file(service))?;
    for i in &mut instances {
        data::add_render_info(i);
    }

    let catalog = AttributeCatalog::load(&cfg.attribute_schema_file(service), service)
        .with_context(|| format!("loading attribute schema for {}", service.key()))?;
    let regions = data::load_regions(&cfg.regions_file())?;
    let community = data::load_community(&cfg.community_file())?;

    println!(
        "Rendering {} {} detail pages...",
        instances.len(),
        service.key()
    );
    let mut built = pages::build_detail_pages(
        service, &instances, &catalog, &regions, &community, renderer, cfg, policy,
    )?;
    built.push(render::render_index(service, &instances, renderer, cfg)?);
    Ok(built)
}

fn stats(cfg: &SiteConfig) -> Result<()> {
    let regions = data::load_regions(&cfg.regions_file())?;
    println!("Regions:  {}", regions.len());

    for service in [Service::Ec2, Service::Rds] {
        let path = cfg.instances_file(service);
        if !path.exists() {
            println!("{}: no data at {}", service.key(), path.display());
            continue;
        }
        let instances = data::load_instances(&path)?;
        let tables = pipeline::family::assemble(service, &instances);
        let catalog = AttributeCatalog::load(&cfg.attribute_schema_file(service), service)?;
        println!(
            "{}: {} instances, {} families, {} variant groups, {} mapped attributes",
            service.key(),
            instances.len(),
            tables.family_count(),
            tables.variant_count(),
            catalog.len()
        );
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

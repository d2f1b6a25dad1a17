use std::path::PathBuf;

use crate::pipeline::Service;

/// Where inputs live and rendered output lands.
///
/// The defaults reproduce the public site tree: scraped instance data under
/// `www/`, display metadata under `meta/`, handlebars templates under
/// `templates/`, generated HTML written back into `www/`.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub meta_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub out_dir: PathBuf,
    /// URL prefix for sitemap entries, e.g. `https://instances.example.com`.
    /// Empty by default so generated URLs are host-relative.
    pub host: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            meta_dir: PathBuf::from("meta"),
            templates_dir: PathBuf::from("templates"),
            out_dir: PathBuf::from("www"),
            host: String::new(),
        }
    }
}

impl SiteConfig {
    /// Scraped instance list for a service.
    pub fn instances_file(&self, service: Service) -> PathBuf {
        match service {
            Service::Ec2 => self.out_dir.join("instances.json"),
            Service::Rds => self.out_dir.join("rds").join("instances.json"),
        }
    }

    pub fn regions_file(&self) -> PathBuf {
        self.meta_dir.join("regions_aws.yaml")
    }

    pub fn attribute_schema_file(&self, service: Service) -> PathBuf {
        self.meta_dir
            .join(format!("service_attributes_{}.csv", service.key()))
    }

    pub fn community_file(&self) -> PathBuf {
        self.meta_dir.join("community_contributions.yaml")
    }

    /// Directory the per-instance detail pages are written to.
    pub fn detail_dir(&self, service: Service) -> PathBuf {
        self.out_dir.join("aws").join(service.key())
    }

    pub fn index_file(&self, service: Service) -> PathBuf {
        match service {
            Service::Ec2 => self.out_dir.join("index.html"),
            Service::Rds => self.out_dir.join("rds").join("index.html"),
        }
    }

    pub fn about_file(&self) -> PathBuf {
        self.out_dir.join("about.html")
    }

    pub fn sitemap_file(&self) -> PathBuf {
        self.out_dir.join("sitemap.xml")
    }
}

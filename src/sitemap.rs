use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;

use crate::config::SiteConfig;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Public URL for a generated page: the output-dir prefix is dropped,
/// "index" elided, and the ".html" suffix stripped.
///
/// "www/index.html" -> "/", "www/aws/ec2/m5.large.html" -> "/aws/ec2/m5.large"
fn page_url(host: &str, out_dir: &Path, page: &Path) -> String {
    let rel = page.strip_prefix(out_dir).unwrap_or(page);
    let mut url = rel.to_string_lossy().replace('\\', "/").replace("index", "");
    if let Some(stripped) = url.strip_suffix(".html") {
        url = stripped.to_string();
    }
    format!("{host}/{url}")
}

/// Write `sitemap.xml` listing every generated page.
pub fn build_sitemap(pages: &[PathBuf], cfg: &SiteConfig) -> Result<PathBuf> {
    let destination = cfg.sitemap_file();
    info!("Rendering all URLs to {}...", destination.display());

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(urlset))?;

    for page in pages {
        let url = page_url(&cfg.host, &cfg.out_dir, page);
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        writer.write_event(Event::Start(BytesStart::new("loc")))?;
        writer.write_event(Event::Text(BytesText::new(&url)))?;
        writer.write_event(Event::End(BytesEnd::new("loc")))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    let xml = String::from_utf8(writer.into_inner()).context("sitemap is not valid UTF-8")?;
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&destination, xml)
        .with_context(|| format!("writing sitemap {}", destination.display()))?;
    Ok(destination)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn urls_drop_index_and_html() {
        let out = Path::new("www");
        assert_eq!(page_url("", out, Path::new("www/index.html")), "/");
        assert_eq!(page_url("", out, Path::new("www/rds/index.html")), "/rds/");
        assert_eq!(
            page_url("", out, Path::new("www/aws/ec2/m5.large.html")),
            "/aws/ec2/m5.large"
        );
        assert_eq!(
            page_url("https://example.com", out, Path::new("www/about.html")),
            "https://example.com/about"
        );
    }

    #[test]
    fn sitemap_lists_every_page() {
        let out = TempDir::new().unwrap();
        let cfg = SiteConfig {
            out_dir: out.path().to_path_buf(),
            ..SiteConfig::default()
        };
        let pages = vec![
            out.path().join("index.html"),
            out.path().join("aws/ec2/m5.large.html"),
        ];

        let sitemap = build_sitemap(&pages, &cfg).unwrap();
        let xml = fs::read_to_string(&sitemap).unwrap();
        assert!(xml.contains(SITEMAP_NS));
        assert!(xml.contains("<loc>/</loc>"));
        assert!(xml.contains("<loc>/aws/ec2/m5.large</loc>"));
        assert_eq!(xml.matches("<url>").count(), 2);
    }
}

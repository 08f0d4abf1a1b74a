//! `sitemap.xml` and `robots.txt` for the public site.
//!
//! Static pages are always listed. Dynamic pages come from the written
//! alert and recall batches: one page per distinct hazard, state, category
//! and brand slug, plus one `/blog/{slug}` page per generated post. Each
//! group is deduplicated and sorted, so the sitemap only changes when the
//! underlying data does.

use crate::error::WriteError;
use crate::models::NormalizedRecord;
use crate::utils::slugify;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::collections::BTreeSet;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One `<url>` entry, relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePage {
    pub path: String,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

impl SitePage {
    fn new(path: impl Into<String>, changefreq: &'static str, priority: &'static str) -> Self {
        Self {
            path: path.into(),
            changefreq,
            priority,
        }
    }
}

fn static_pages() -> Vec<SitePage> {
    vec![
        SitePage::new("", "daily", "1.0"),
        SitePage::new("/about", "monthly", "0.8"),
        SitePage::new("/contact", "monthly", "0.6"),
        SitePage::new("/privacy", "yearly", "0.5"),
        SitePage::new("/air-quality", "hourly", "0.9"),
        SitePage::new("/alerts", "hourly", "0.9"),
        SitePage::new("/recalls", "daily", "0.9"),
    ]
}

fn slug_pages<'a>(
    prefix: &str,
    names: impl Iterator<Item = &'a str>,
    changefreq: &'static str,
    priority: &'static str,
) -> Vec<SitePage> {
    names
        .map(slugify)
        .filter(|slug| !slug.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|slug| SitePage::new(format!("/{prefix}/{slug}"), changefreq, priority))
        .collect()
}

/// Every page the site exposes for the given batches and blog post slugs.
pub fn site_pages(
    alerts: &[NormalizedRecord],
    recalls: &[NormalizedRecord],
    posts: &[String],
) -> Vec<SitePage> {
    let all = || alerts.iter().chain(recalls);

    let mut pages = static_pages();
    pages.extend(slug_pages(
        "hazard",
        alerts.iter().map(|r| r.hazard.as_str()),
        "hourly",
        "0.9",
    ));
    pages.extend(slug_pages(
        "state",
        all().flat_map(|r| r.states.iter().map(String::as_str)),
        "daily",
        "0.8",
    ));
    pages.extend(slug_pages(
        "category",
        all().map(|r| r.category.as_str()),
        "daily",
        "0.7",
    ));
    pages.extend(slug_pages(
        "brand",
        recalls.iter().filter_map(|r| r.brand.as_deref()),
        "weekly",
        "0.6",
    ));
    pages.extend(
        posts
            .iter()
            .filter(|slug| !slug.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|slug| SitePage::new(format!("/blog/{slug}"), "weekly", "0.8")),
    );
    pages
}

fn xml_err(e: impl std::fmt::Display) -> WriteError {
    WriteError::Xml(e.to_string())
}

fn text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), WriteError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)?;
    Ok(())
}

/// Render the sitemap document. `lastmod` is a `YYYY-MM-DD` date applied to
/// every entry.
pub fn render_sitemap(
    base_url: &str,
    pages: &[SitePage],
    lastmod: &str,
) -> Result<String, WriteError> {
    let base = base_url.trim_end_matches('/');
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Start(
            BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)]),
        ))
        .map_err(xml_err)?;

    for page in pages {
        writer
            .write_event(Event::Start(BytesStart::new("url")))
            .map_err(xml_err)?;
        text_element(&mut writer, "loc", &format!("{base}{}", page.path))?;
        text_element(&mut writer, "lastmod", lastmod)?;
        text_element(&mut writer, "changefreq", page.changefreq)?;
        text_element(&mut writer, "priority", page.priority)?;
        writer
            .write_event(Event::End(BytesEnd::new("url")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("urlset")))
        .map_err(xml_err)?;

    let mut xml = String::from_utf8(writer.into_inner()).map_err(xml_err)?;
    xml.push('\n');
    Ok(xml)
}

pub fn robots_txt(base_url: &str, generated_at: &str) -> String {
    format!(
        "# AlertsAnalytics robots.txt\n\
         # Generated: {generated_at}\n\
         \n\
         User-agent: *\n\
         Allow: /\n\
         Allow: /air-quality\n\
         Allow: /hazard/\n\
         Allow: /state/\n\
         Allow: /recalls/\n\
         Allow: /alerts/\n\
         \n\
         Disallow: /admin/\n\
         Disallow: /*.json\n\
         Disallow: /temp/\n\
         \n\
         Sitemap: {}/sitemap.xml\n\
         \n\
         Crawl-delay: 1\n",
        base_url.trim_end_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hazard: &str, category: &str, states: &[&str], brand: Option<&str>) -> NormalizedRecord {
        NormalizedRecord {
            id: slugify(hazard),
            title: hazard.to_string(),
            category: category.to_string(),
            hazard: hazard.to_string(),
            severity: "Unknown".to_string(),
            status: None,
            areas: vec![],
            states: states.iter().map(|s| s.to_string()).collect(),
            effective: None,
            expires: None,
            initiation: None,
            reported: None,
            description: String::new(),
            instruction: None,
            url: None,
            brand: brand.map(str::to_string),
            product: None,
            source: "test".to_string(),
        }
    }

    fn paths(pages: &[SitePage]) -> Vec<&str> {
        pages.iter().map(|p| p.path.as_str()).collect()
    }

    #[test]
    fn test_dynamic_pages_are_deduped_and_sorted() {
        let alerts = vec![
            record("Winter Storm Warning", "weather", &["CO"], None),
            record("Heat Advisory", "weather", &["AZ"], None),
            record("Heat Advisory", "weather", &["AZ", "NV"], None),
        ];
        let recalls = vec![record("Undeclared peanuts", "Food", &["CA"], Some("Acme Foods Inc."))];

        let pages = site_pages(&alerts, &recalls, &[]);
        let dynamic: Vec<&str> = paths(&pages)[static_pages().len()..].to_vec();
        assert_eq!(
            dynamic,
            vec![
                "/hazard/heat-advisory",
                "/hazard/winter-storm-warning",
                "/state/az",
                "/state/ca",
                "/state/co",
                "/state/nv",
                "/category/food",
                "/category/weather",
                "/brand/acme-foods-inc",
            ]
        );
    }

    #[test]
    fn test_empty_batches_give_static_pages() {
        assert_eq!(site_pages(&[], &[], &[]), static_pages());
    }

    #[test]
    fn test_blog_posts_are_listed() {
        let posts = vec![
            "weather-alerts-2025-01-10".to_string(),
            "air-quality-report-2025-01-10".to_string(),
            "weather-alerts-2025-01-10".to_string(),
        ];
        let pages = site_pages(&[], &[], &posts);
        let blog = &pages[static_pages().len()..];
        assert_eq!(
            paths(blog),
            vec![
                "/blog/air-quality-report-2025-01-10",
                "/blog/weather-alerts-2025-01-10",
            ]
        );
        assert!(blog.iter().all(|p| p.changefreq == "weekly" && p.priority == "0.8"));
    }

    #[test]
    fn test_render_sitemap() {
        let pages = vec![
            SitePage::new("", "daily", "1.0"),
            SitePage::new("/state/ca", "daily", "0.8"),
        ];
        let xml = render_sitemap("https://example.com/", &pages, "2025-01-10").unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(xml.contains("<loc>https://example.com</loc>"));
        assert!(xml.contains("<loc>https://example.com/state/ca</loc>"));
        assert_eq!(xml.matches("<lastmod>2025-01-10</lastmod>").count(), 2);
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_robots_points_at_sitemap() {
        let robots = robots_txt("https://example.com", "2025-01-10T12:00:00Z");
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
        assert!(robots.contains("User-agent: *"));
    }
}

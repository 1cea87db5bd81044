//! HTML rendering of the assembled report.
//!
//! Every section is rendered on its own from a Handlebars template and the
//! fragments are embedded into the page. Handlebars' default escape function
//! is kept, so titles, labels and URLs coming from GitHub cannot break out of
//! the markup.

use crate::error::Result;
use crate::report::{Report, Section};
use handlebars::Handlebars;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::debug;

const PAGE_TEMPLATE: &str = include_str!("../templates/page.hbs");
const ORGANIZATION_TEMPLATE: &str = include_str!("../templates/organization.hbs");
const UNMIRRORED_TEMPLATE: &str = include_str!("../templates/unmirrored.hbs");
const FRESHNESS_TEMPLATE: &str = include_str!("../templates/freshness.hbs");

pub const PAGE_TITLE: &str = "Organization Dashboard";

pub struct Renderer {
    handlebars: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string("page", PAGE_TEMPLATE)?;
        handlebars.register_template_string("organization", ORGANIZATION_TEMPLATE)?;
        handlebars.register_template_string("unmirrored", UNMIRRORED_TEMPLATE)?;
        handlebars.register_template_string("freshness", FRESHNESS_TEMPLATE)?;
        Ok(Self { handlebars })
    }

    pub fn render(&self, report: &Report) -> Result<String> {
        let mut body = String::new();
        for section in &report.sections {
            let fragment = match section {
                Section::Organization(s) => self.handlebars.render("organization", s)?,
                Section::Unmirrored(s) => self.handlebars.render("unmirrored", s)?,
                Section::Freshness(s) => self.handlebars.render("freshness", s)?,
            };
            body.push_str(&fragment);
        }

        let page = self.handlebars.render(
            "page",
            &json!({
                "title": PAGE_TITLE,
                "generated_at": report.generated_at,
                "body": body,
            }),
        )?;
        Ok(page)
    }
}

/// Writes the page, creating missing parent directories and replacing any
/// previous file.
pub fn write_report(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    debug!(path = %path.display(), bytes = html.len(), "Wrote dashboard");
    Ok(())
}

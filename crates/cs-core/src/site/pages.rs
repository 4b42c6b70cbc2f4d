//! Page fragments and full pages.
//!
//! Every page is composed bottom-up: chart script tag, header, graphs, then
//! the `full` section wrapping header and content.

use crate::error::Result;
use crate::series::{encode_incidence, encode_series};
use cs_common::{group_page_file_name, Entity, IncidencePoint, SeriesPoint};
use cs_template::{TemplateDocument, TemplateEngine, UnknownPlaceholderPolicy};
use std::sync::Arc;

/// Separator between graphs on one page.
pub const GRAPH_SEPARATOR: &str = "\n<br />\n";

/// Text of the world link on the index page.
pub const WORLD_LINK_TEXT: &str = "All countries accumulated";

pub const WORLD_PAGE: &str = "world.html";
pub const INDEX_PAGE: &str = "index.html";

/// Sections every run needs.
pub const REQUIRED_SECTIONS: [&str; 9] = [
    "script",
    "header",
    "full",
    "graph",
    "graphAccumulated",
    "graphIncidence",
    "indexLink",
    "index",
    "indexGroups",
];

/// Sections needed for group pages.
pub const GROUP_SECTIONS: [&str; 2] = ["trace", "graphGroup"];

/// Which daily chart section to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Daily,
    Accumulated,
}

impl GraphKind {
    fn section(self) -> &'static str {
        match self {
            GraphKind::Daily => "graph",
            GraphKind::Accumulated => "graphAccumulated",
        }
    }
}

/// Renders fragments from one shared template document.
pub struct PageRenderer {
    document: Arc<TemplateDocument>,
    policy: UnknownPlaceholderPolicy,
    chart_src: String,
}

impl PageRenderer {
    pub fn new(
        document: Arc<TemplateDocument>,
        policy: UnknownPlaceholderPolicy,
        chart_src: impl Into<String>,
    ) -> Self {
        Self {
            document,
            policy,
            chart_src: chart_src.into(),
        }
    }

    /// Fresh engine for one page.
    pub fn engine(&self) -> TemplateEngine {
        TemplateEngine::with_document(Arc::clone(&self.document)).with_policy(self.policy)
    }

    /// Header with the chart script, or without scripts for pages lacking charts.
    pub fn header(&self, tpl: &mut TemplateEngine, title: &str, with_chart: bool) -> Result<String> {
        let scripts = if with_chart {
            tpl.load_section("script")?;
            tpl.tag("path", &self.chart_src)?;
            tpl.generate()?
        } else {
            String::new()
        };
        tpl.load_section("header")?;
        tpl.integrate("scripts", &scripts)?;
        tpl.tag("title", title)?;
        Ok(tpl.generate()?)
    }

    /// Complete HTML document.
    pub fn full(&self, tpl: &mut TemplateEngine, header: &str, content: &str) -> Result<String> {
        tpl.load_section("full")?;
        tpl.integrate("header", header)?;
        tpl.integrate("content", content)?;
        Ok(tpl.generate()?)
    }

    /// Cases and deaths chart.
    pub fn graph(
        &self,
        tpl: &mut TemplateEngine,
        kind: GraphKind,
        title: &str,
        plot_id: &str,
        points: &[SeriesPoint],
    ) -> Result<String> {
        let json = encode_series(points)?;
        tpl.load_section(kind.section())?;
        tpl.tag("title", title)?;
        tpl.tag("plotId", plot_id)?;
        tpl.integrate("dates", &json.dates)?;
        tpl.integrate("infections", &json.cases)?;
        tpl.integrate("deaths", &json.deaths)?;
        Ok(tpl.generate()?)
    }

    /// 14-day incidence chart; `None` when there is no incidence data.
    pub fn incidence_graph(
        &self,
        tpl: &mut TemplateEngine,
        title: &str,
        plot_id: &str,
        points: &[IncidencePoint],
    ) -> Result<Option<String>> {
        if points.is_empty() {
            return Ok(None);
        }
        let json = encode_incidence(points)?;
        tpl.load_section("graphIncidence")?;
        tpl.tag("title", title)?;
        tpl.tag("plotId", plot_id)?;
        tpl.integrate("dates", &json.dates)?;
        tpl.integrate("incidence", &json.incidence)?;
        Ok(Some(tpl.generate()?))
    }

    /// Multi-trace incidence chart of a group.
    ///
    /// Entities with empty series get no trace.
    pub fn group_graph(
        &self,
        tpl: &mut TemplateEngine,
        group_tag: &str,
        series: &[(Entity, Vec<IncidencePoint>)],
    ) -> Result<String> {
        tpl.load_section("trace")?;
        let mut traces = Vec::new();
        for (entity, points) in series {
            if points.is_empty() {
                continue;
            }
            let json = encode_incidence(points)?;
            tpl.integrate("dates", &json.dates)?;
            tpl.integrate("incidence", &json.incidence)?;
            tpl.tag("name", &entity.name)?;
            traces.push(tpl.generate()?);
        }
        tpl.load_section("graphGroup")?;
        tpl.integrate("traces", &traces.join("\n"))?;
        tpl.tag("plotId", &group_plot_id(group_tag))?;
        tpl.tag("title", &format!("Coronavirus: 14-day incidence in {}", group_tag))?;
        Ok(tpl.generate()?)
    }

    /// Index content: world link, entity links and, if any, group links.
    pub fn index_content(
        &self,
        tpl: &mut TemplateEngine,
        site_title: &str,
        entities: &[Entity],
        groups: &[String],
    ) -> Result<String> {
        tpl.load_section("indexLink")?;
        let mut links = Vec::with_capacity(entities.len() + 1);
        links.push(link(tpl, &format!("./{}", WORLD_PAGE), WORLD_LINK_TEXT)?);
        for entity in entities {
            links.push(link(tpl, &format!("./{}", entity.page_file_name()), &entity.label())?);
        }
        let mut group_links = Vec::with_capacity(groups.len());
        for group in groups {
            group_links.push(link(tpl, &format!("./{}", group_page_file_name(group)), group)?);
        }

        tpl.load_section("index")?;
        tpl.tag("title", site_title)?;
        tpl.integrate("links", &links.join("\n"))?;
        let mut content = tpl.generate()?;

        if !group_links.is_empty() {
            tpl.load_section("indexGroups")?;
            tpl.integrate("links", &group_links.join("\n"))?;
            content.push_str("<br />\n");
            content.push_str(&tpl.generate()?);
        }
        Ok(content)
    }
}

/// Render one link with the active `indexLink` section.
fn link(tpl: &mut TemplateEngine, url: &str, text: &str) -> Result<String> {
    tpl.tag("url", url)?;
    tpl.tag("text", text)?;
    Ok(tpl.generate()?)
}

pub fn daily_plot_id(entity: &Entity) -> String {
    format!("graph_{}", entity.short_code.to_lowercase())
}

pub fn accumulated_plot_id(entity: &Entity) -> String {
    format!("graph_accu_{}", entity.short_code.to_lowercase())
}

pub fn incidence_plot_id(entity: &Entity) -> String {
    format!("graph_incidence14_{}", entity.short_code.to_lowercase())
}

pub fn group_plot_id(group_tag: &str) -> String {
    format!("group_{}", group_tag.to_lowercase())
}

//! Page assembly.
//!
//! A run migrates the running totals, then writes one page per entity,
//! `world.html`, one page per group, the assets and finally `index.html`.
//! The first failure aborts the run; pages written before it stay on disk.

pub mod pages;

use crate::error::{Result, SiteError, StepContext};
use crate::logging::{event_names, LogContext, Stage};
use crate::output::{
    copy_assets, create_assets_dir, create_output_dir, minify_page, write_page, STYLESHEET_FILE,
};
use cs_common::{group_page_file_name, Entity};
use cs_config::{ChartSource, SiteConfig};
use cs_store::{sqlite_check, MigrationReport, Status, Store};
use cs_template::{TemplateDocument, TemplateError};
use pages::{
    accumulated_plot_id, daily_plot_id, incidence_plot_id, GraphKind, PageRenderer,
    GRAPH_SEPARATOR, GROUP_SECTIONS, INDEX_PAGE, REQUIRED_SECTIONS, WORLD_PAGE,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Template compiled into the binary.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/main.tpl");

/// Asset directory shipped with the crate, used when none is configured.
/// Drop the chart library file here to make the default run self-contained.
pub const BUILTIN_ASSETS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

/// What a successful run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationSummary {
    pub migration: MigrationReport,
    /// Page file names in write order.
    pub pages: Vec<String>,
    /// Files in `<output>/assets`, sorted.
    pub assets: Vec<PathBuf>,
    pub bytes_written: usize,
}

/// Load the configured template, or the built-in one.
pub fn load_template(path: Option<&Path>) -> Result<Arc<TemplateDocument>> {
    let document = match path {
        Some(path) => TemplateDocument::from_file(path)?,
        None => TemplateDocument::parse(DEFAULT_TEMPLATE)?,
    };
    Ok(Arc::new(document))
}

/// Fail early if the document lacks a section the run will need.
pub fn check_sections(document: &TemplateDocument, group_pages: bool) -> Result<()> {
    let mut needed: Vec<&str> = REQUIRED_SECTIONS.to_vec();
    if group_pages {
        needed.extend(GROUP_SECTIONS);
    }
    match document.missing_sections(&needed).first() {
        Some(name) => Err(TemplateError::SectionNotFound((*name).to_string()).into()),
        None => Ok(()),
    }
}

/// Generates the static site from one database.
pub struct SiteGenerator {
    config: SiteConfig,
    renderer: PageRenderer,
    ctx: LogContext,
}

impl SiteGenerator {
    /// Load and check the template named by `config`.
    pub fn new(config: SiteConfig, ctx: LogContext) -> Result<Self> {
        let document = load_template(config.template_path.as_deref()).step("template")?;
        Self::with_document(config, document, ctx)
    }

    pub fn with_document(
        config: SiteConfig,
        document: Arc<TemplateDocument>,
        ctx: LogContext,
    ) -> Result<Self> {
        check_sections(&document, config.group_pages).step("template")?;
        log_event!(
            ctx,
            DEBUG,
            event_names::TEMPLATE_LOADED,
            Stage::Init,
            "Template loaded",
            sections = document.len()
        );
        let renderer = PageRenderer::new(
            document,
            config.unknown_placeholders,
            config.chart_script().src(),
        );
        Ok(Self {
            config,
            renderer,
            ctx,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Open the database and generate the site into `output`.
    pub fn run(&self, db_path: &Path, output: &Path) -> Result<GenerationSummary> {
        match sqlite_check() {
            Status::Ok => {}
            Status::Warn(message) => {
                log_event!(self.ctx, WARN, event_names::SQLITE_CHECK, Stage::Init, message);
            }
            Status::Error(message) => {
                return Err(SiteError::SqliteVersion(message)).step("sqlite check");
            }
        }
        let mut store = Store::open(db_path).step("database")?;
        let summary = self.generate(&mut store, output)?;
        store.close().step("database")?;
        Ok(summary)
    }

    /// Generate the site from an open store.
    pub fn generate(&self, store: &mut Store, output: &Path) -> Result<GenerationSummary> {
        let mut summary = GenerationSummary {
            migration: self.migrate(store)?,
            ..Default::default()
        };

        let entities = store.list_entities().step("entities")?;
        if entities.is_empty() {
            return Err(SiteError::NoEntities).step("entities");
        }
        let asset_source = self.asset_source().step("assets")?;
        create_output_dir(output).step("output directory")?;

        for entity in &entities {
            let file = entity.page_file_name();
            let html = self.entity_page(store, entity).step(file.as_str())?;
            self.write(output, &file, html, Stage::Pages, &mut summary)?;
        }

        let html = self.world_page(store).step(WORLD_PAGE)?;
        self.write(output, WORLD_PAGE, html, Stage::Pages, &mut summary)?;

        let groups = if self.config.group_pages {
            store.list_groups().step("groups")?
        } else {
            Vec::new()
        };
        for group in &groups {
            let file = group_page_file_name(group);
            let html = self.group_page(store, group).step(file.as_str())?;
            self.write(output, &file, html, Stage::Pages, &mut summary)?;
        }

        summary.assets = self.write_assets(asset_source.as_deref(), output).step("assets")?;
        log_event!(
            self.ctx,
            INFO,
            event_names::ASSET_COPIED,
            Stage::Assets,
            "Assets copied",
            count = summary.assets.len()
        );

        let html = self.index_page(&entities, &groups).step(INDEX_PAGE)?;
        self.write(output, INDEX_PAGE, html, Stage::Index, &mut summary)?;
        Ok(summary)
    }

    /// Directory whose files go to `<output>/assets`.
    ///
    /// With a local chart library the directory must contain it.
    fn asset_source(&self) -> Result<Option<PathBuf>> {
        let source = match (&self.config.assets_dir, self.config.chart_source) {
            (Some(dir), _) => dir.clone(),
            (None, ChartSource::Local) => PathBuf::from(BUILTIN_ASSETS_DIR),
            (None, ChartSource::Cdn) => return Ok(None),
        };
        if self.config.chart_source == ChartSource::Local {
            let script = source.join(&self.config.chart_script);
            if !script.is_file() {
                return Err(SiteError::AssetCopy {
                    path: script,
                    message: "chart library not found; add it or load it from the CDN with --chart-cdn"
                        .to_string(),
                });
            }
        }
        Ok(Some(source))
    }

    fn write_assets(&self, source: Option<&Path>, output: &Path) -> Result<Vec<PathBuf>> {
        let target = create_assets_dir(output)?;
        let mut files = vec![target.join(STYLESHEET_FILE)];
        if let Some(source) = source {
            files.extend(copy_assets(source, &target)?);
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn migrate(&self, store: &mut Store) -> Result<MigrationReport> {
        let report = store
            .ensure_cumulative_columns(self.config.cumulative_policy)
            .step("migration")?;
        for step in &report.steps {
            log_event!(
                self.ctx,
                INFO,
                event_names::MIGRATION_STEP,
                Stage::Migrate,
                step.to_string()
            );
        }
        log_event!(
            self.ctx,
            INFO,
            event_names::MIGRATION_FINISHED,
            Stage::Migrate,
            "Accumulated numbers are up to date",
            steps = report.steps.len(),
            rows = report.rows_updated
        );
        Ok(report)
    }

    fn entity_page(&self, store: &Store, entity: &Entity) -> Result<String> {
        let r = &self.renderer;
        let mut tpl = r.engine();
        let label = entity.label();
        let mut graphs = Vec::with_capacity(3);

        let incidence = store.incidence_series(entity.id)?;
        let title = format!("Coronavirus: 14-day incidence in {}", label);
        match r.incidence_graph(&mut tpl, &title, &incidence_plot_id(entity), &incidence)? {
            Some(graph) => graphs.push(graph),
            None => log_event!(
                self.ctx,
                DEBUG,
                event_names::PAGE_SKIPPED_GRAPH,
                Stage::Pages,
                "No incidence data, graph skipped",
                entity = entity.short_code.as_str()
            ),
        }

        let daily = store.daily_series(entity.id)?;
        let title = format!("Coronavirus cases in {}", label);
        graphs.push(r.graph(&mut tpl, GraphKind::Daily, &title, &daily_plot_id(entity), &daily)?);

        let total = store.cumulative_series(entity.id)?;
        let title = format!("Accumulated Coronavirus cases in {}", label);
        graphs.push(r.graph(
            &mut tpl,
            GraphKind::Accumulated,
            &title,
            &accumulated_plot_id(entity),
            &total,
        )?);

        let header = r.header(&mut tpl, &format!("Coronavirus cases in {}", label), true)?;
        r.full(&mut tpl, &header, &graphs.join(GRAPH_SEPARATOR))
    }

    fn world_page(&self, store: &Store) -> Result<String> {
        let r = &self.renderer;
        let mut tpl = r.engine();
        let daily = store.world_daily_series()?;
        let total = store.world_cumulative_series()?;
        let graphs = [
            r.graph(
                &mut tpl,
                GraphKind::Daily,
                "Coronavirus cases worldwide",
                "graph_world",
                &daily,
            )?,
            r.graph(
                &mut tpl,
                GraphKind::Accumulated,
                "Accumulated Coronavirus cases worldwide",
                "graph_world_accu",
                &total,
            )?,
        ];
        let header = r.header(&mut tpl, "Coronavirus cases worldwide", true)?;
        r.full(&mut tpl, &header, &graphs.join(GRAPH_SEPARATOR))
    }

    fn group_page(&self, store: &Store, group: &str) -> Result<String> {
        let r = &self.renderer;
        let mut tpl = r.engine();
        let mut series = Vec::new();
        for entity in store.entities_in_group(group)? {
            let points = store.incidence_series(entity.id)?;
            series.push((entity, points));
        }
        let graph = r.group_graph(&mut tpl, group, &series)?;
        let header = r.header(
            &mut tpl,
            &format!("Coronavirus: 14-day incidence in {}", group),
            true,
        )?;
        r.full(&mut tpl, &header, &graph)
    }

    fn index_page(&self, entities: &[Entity], groups: &[String]) -> Result<String> {
        let r = &self.renderer;
        let mut tpl = r.engine();
        let content = r.index_content(&mut tpl, &self.config.site_title, entities, groups)?;
        let header = r.header(&mut tpl, &self.config.site_title, false)?;
        r.full(&mut tpl, &header, &content)
    }

    fn write(
        &self,
        output: &Path,
        file: &str,
        html: String,
        stage: Stage,
        summary: &mut GenerationSummary,
    ) -> Result<()> {
        let html = if self.config.minify {
            minify_page(html)
        } else {
            html
        };
        let bytes = write_page(&output.join(file), &html).step(file)?;
        log_event!(
            self.ctx,
            INFO,
            event_names::PAGE_WRITTEN,
            stage,
            "Page written",
            file = file,
            bytes = bytes
        );
        summary.pages.push(file.to_string());
        summary.bytes_written += bytes;
        Ok(())
    }
}

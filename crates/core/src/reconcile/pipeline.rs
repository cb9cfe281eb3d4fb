use crate::communications::CommunicationTable;
use crate::config::Settings;
use crate::domain::MonthlyDividend;
use crate::ingest::{SchemaSet, SourceSchema, SourceTable};
use crate::reconcile::canonical::FundTable;
use crate::reconcile::derived::RankWeights;
use crate::reconcile::mappings::CategoryMappings;
use crate::reconcile::merger::{FallbackPolicy, SourceMerger};
use crate::time::{last_update_summary, ZoneSettings};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Holds configuration only; every `run_*` call re-reads its files, so repeated
/// calls over unchanged inputs return identical tables.
#[derive(Debug, Clone)]
pub struct Pipeline {
    schemas: SchemaSet,
    merger: SourceMerger,
    zones: ZoneSettings,
    weights: RankWeights,
    primary_path: PathBuf,
    secondary_path: PathBuf,
    segment_path: PathBuf,
    communications_path: PathBuf,
    dividends_path: PathBuf,
}

impl Pipeline {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let schemas = match &settings.schema_file {
            Some(path) => SchemaSet::from_json_file(path)?,
            None => SchemaSet::default(),
        };
        let mappings = match &settings.mappings_file {
            Some(path) => CategoryMappings::from_json_file(path)?,
            None => CategoryMappings::default(),
        };

        anyhow::ensure!(
            settings.dy_rank_weight.is_finite() && settings.dy_rank_weight > 0.0,
            "dividend yield rank weight must be positive (got {})",
            settings.dy_rank_weight
        );

        Ok(Self {
            schemas,
            merger: SourceMerger::new(mappings, FallbackPolicy::ZeroIsMissing),
            zones: ZoneSettings::new(settings.source_tz, settings.reference_tz),
            weights: RankWeights::with_dividend_yield(settings.dy_rank_weight),
            primary_path: settings.primary_path(),
            secondary_path: settings.secondary_path(),
            segment_path: settings.segment_path(),
            communications_path: settings.communications_path(),
            dividends_path: settings.dividends_path(),
        })
    }

    pub fn run_funds(&self) -> anyhow::Result<FundTable> {
        let primary = self
            .schemas
            .primary
            .load(&self.primary_path)
            .context("primary fund extract is required")?;

        let secondaries: Vec<SourceTable> = [
            (&self.schemas.secondary, self.secondary_path.as_path()),
            (&self.schemas.segment_override, self.segment_path.as_path()),
        ]
        .into_iter()
        .filter_map(|(schema, path)| load_optional(schema, path))
        .collect();

        let merged = self.merger.merge(&primary, &secondaries);
        let table = FundTable::assemble(merged, &self.zones, self.weights);

        tracing::info!(
            primary_rows = primary.len(),
            secondaries = secondaries.len(),
            funds = table.len(),
            "canonical fund table assembled"
        );
        Ok(table)
    }

    pub fn run_communications(&self) -> anyhow::Result<CommunicationTable> {
        CommunicationTable::load(&self.communications_path, &self.zones)
            .context("communications extract could not be read")
    }

    pub fn run_dividends(&self) -> anyhow::Result<Vec<MonthlyDividend>> {
        crate::dividends::load_monthly(&self.dividends_path)
            .context("dividend history extract could not be read")
    }

    pub fn last_update(&self) -> String {
        let funds = match self.run_funds() {
            Ok(t) => t.min_last_updated(),
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "fund table unavailable for last-update summary");
                None
            }
        };
        let communications = match self.run_communications() {
            Ok(t) => t.min_last_updated(),
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "communications unavailable for last-update summary");
                None
            }
        };
        last_update_summary(funds, communications)
    }
}

fn load_optional(schema: &SourceSchema, path: &Path) -> Option<SourceTable> {
    match schema.load(path) {
        Ok(table) => Some(table),
        Err(e) => {
            tracing::warn!(
                source = %schema.name,
                error = %e,
                "secondary extract unavailable; continuing without it"
            );
            None
        }
    }
}

pub mod communications;
pub mod dividends;
pub mod domain;
pub mod ingest;
pub mod normalize;
pub mod reconcile;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;
    use chrono_tz::Tz;
    use std::path::{Path, PathBuf};

    const DEFAULT_DATA_DIR: &str = "downloads";
    const DEFAULT_OUTPUT_DIR: &str = "output";
    const DEFAULT_PRIMARY_FILE: &str = "investidor10_fiis.csv";
    const DEFAULT_SECONDARY_FILE: &str = "fundamentus_fiis.csv";
    const DEFAULT_SEGMENT_FILE: &str = "ward_fiis.csv";
    const DEFAULT_COMMUNICATIONS_FILE: &str = "communications.csv";
    const DEFAULT_DIVIDENDS_FILE: &str = "investidor10_dividends.csv";
    pub const DEFAULT_REFERENCE_TZ: Tz = chrono_tz::America::Sao_Paulo;
    pub const DEFAULT_DY_RANK_WEIGHT: f64 = 2.0;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub data_dir: PathBuf,
        pub output_dir: PathBuf,
        pub primary_file: String,
        pub secondary_file: String,
        pub segment_file: String,
        pub communications_file: String,
        pub dividends_file: String,
        pub reference_tz: Tz,
        pub source_tz: Option<Tz>,
        pub dy_rank_weight: f64,
        pub schema_file: Option<PathBuf>,
        pub mappings_file: Option<PathBuf>,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                data_dir: PathBuf::from(DEFAULT_DATA_DIR),
                output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
                primary_file: DEFAULT_PRIMARY_FILE.to_string(),
                secondary_file: DEFAULT_SECONDARY_FILE.to_string(),
                segment_file: DEFAULT_SEGMENT_FILE.to_string(),
                communications_file: DEFAULT_COMMUNICATIONS_FILE.to_string(),
                dividends_file: DEFAULT_DIVIDENDS_FILE.to_string(),
                reference_tz: DEFAULT_REFERENCE_TZ,
                source_tz: None,
                dy_rank_weight: DEFAULT_DY_RANK_WEIGHT,
                schema_file: None,
                mappings_file: None,
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let mut out = Self::default();

            if let Some(v) = env_non_empty("FII_DATA_DIR") {
                out.data_dir = PathBuf::from(v);
            }
            if let Some(v) = env_non_empty("FII_OUTPUT_DIR") {
                out.output_dir = PathBuf::from(v);
            }
            if let Some(v) = env_non_empty("FII_PRIMARY_FILE") {
                out.primary_file = v;
            }
            if let Some(v) = env_non_empty("FII_SECONDARY_FILE") {
                out.secondary_file = v;
            }
            if let Some(v) = env_non_empty("FII_SEGMENT_FILE") {
                out.segment_file = v;
            }
            if let Some(v) = env_non_empty("FII_COMMUNICATIONS_FILE") {
                out.communications_file = v;
            }
            if let Some(v) = env_non_empty("FII_DIVIDENDS_FILE") {
                out.dividends_file = v;
            }

            if let Some(v) = env_non_empty("FII_REFERENCE_TZ") {
                out.reference_tz = parse_tz(&v).context("FII_REFERENCE_TZ is invalid")?;
            }
            if let Some(v) = env_non_empty("FII_SOURCE_TZ") {
                out.source_tz = Some(parse_tz(&v).context("FII_SOURCE_TZ is invalid")?);
            }

            if let Some(v) = env_non_empty("FII_DY_RANK_WEIGHT") {
                let weight = v
                    .parse::<f64>()
                    .with_context(|| format!("FII_DY_RANK_WEIGHT is not a number: {v}"))?;
                anyhow::ensure!(
                    weight.is_finite() && weight > 0.0,
                    "FII_DY_RANK_WEIGHT must be positive (got {weight})"
                );
                out.dy_rank_weight = weight;
            }

            out.schema_file = env_non_empty("FII_SCHEMA_FILE").map(PathBuf::from);
            out.mappings_file = env_non_empty("FII_MAPPINGS_FILE").map(PathBuf::from);
            out.sentry_dsn = env_non_empty("SENTRY_DSN");

            Ok(out)
        }

        pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
            self.data_dir = dir.as_ref().to_path_buf();
            self
        }

        pub fn primary_path(&self) -> PathBuf {
            self.data_dir.join(&self.primary_file)
        }

        pub fn secondary_path(&self) -> PathBuf {
            self.data_dir.join(&self.secondary_file)
        }

        pub fn segment_path(&self) -> PathBuf {
            self.data_dir.join(&self.segment_file)
        }

        pub fn communications_path(&self) -> PathBuf {
            self.data_dir.join(&self.communications_file)
        }

        pub fn dividends_path(&self) -> PathBuf {
            self.data_dir.join(&self.dividends_file)
        }
    }

    fn env_non_empty(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parse_tz(name: &str) -> anyhow::Result<Tz> {
        name.parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("unknown time zone {name:?}: {e}"))
    }

}

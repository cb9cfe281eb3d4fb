use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStage {
    Open,
    Header,
    Row,
    Schema,
}

impl fmt::Display for ExtractStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtractStage::Open => "open",
            ExtractStage::Header => "header",
            ExtractStage::Row => "row",
            ExtractStage::Schema => "schema",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractError {
    pub source_name: String,
    pub path: PathBuf,
    pub stage: ExtractStage,
    pub detail: String,
}

impl ExtractError {
    pub fn new(
        source_name: impl Into<String>,
        path: impl Into<PathBuf>,
        stage: ExtractStage,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            path: path.into(),
            stage,
            detail: detail.into(),
        }
    }

    pub fn is_missing_file(&self) -> bool {
        self.stage == ExtractStage::Open
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "extract error (source={}, stage={}, path={}): {}",
            self.source_name,
            self.stage,
            self.path.display(),
            self.detail
        )
    }
}

impl std::error::Error for ExtractError {}

use crate::request::{AnalyzeMode, AnalyzeRequest, RequestId, RunRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Analyze {
        request_id: RequestId,
        mode: AnalyzeMode,
        request: AnalyzeRequest,
    },
    RunScript {
        request_id: RequestId,
        request: RunRequest,
    },
    ExportCsv {
        request_id: RequestId,
        request: RunRequest,
    },
    SaveDownload(Download),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    Script,
    Csv,
}

impl DownloadKind {
    pub fn filename(self) -> &'static str {
        match self {
            DownloadKind::Script => "scraper_script.py",
            DownloadKind::Csv => "scraped_data.csv",
        }
    }
}

/// A client-initiated file download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub kind: DownloadKind,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn new(kind: DownloadKind, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
        }
    }

    pub fn filename(&self) -> &'static str {
        self.kind.filename()
    }
}

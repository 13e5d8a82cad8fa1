use forge_core::{OutputFormat, RunRequest, ScrapedRecord};
use forge_logging::forge_info;

use crate::http::{build_client, failure_from_response, map_reqwest_error, post_json};
use crate::wire::decode_run_body;
use crate::{ClientSettings, ServiceError};

/// Result of a script run, shaped by the requested output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutput {
    Records(Vec<ScrapedRecord>),
    Csv(Vec<u8>),
}

/// Runs a generated script on the backend.
#[async_trait::async_trait]
pub trait ExecutionClient: Send + Sync {
    async fn run(&self, request: &RunRequest) -> Result<RunOutput, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestExecutionClient {
    settings: ClientSettings,
}

impl ReqwestExecutionClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl ExecutionClient for ReqwestExecutionClient {
    async fn run(&self, request: &RunRequest) -> Result<RunOutput, ServiceError> {
        let endpoint = self.settings.run_url()?;
        let client = build_client(&self.settings)?;
        forge_info!(
            "run request for {} (format={:?}, max_pages={})",
            request.url,
            request.format,
            request.max_pages
        );

        let response = post_json(&client, endpoint, request).await?;
        if !response.status().is_success() {
            return Err(failure_from_response(response).await);
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        match request.format {
            OutputFormat::Json => {
                let records = decode_run_body(&body)?;
                forge_info!("run returned {} records", records.len());
                Ok(RunOutput::Records(records))
            }
            OutputFormat::Csv => {
                forge_info!("run returned {} bytes of csv", body.len());
                Ok(RunOutput::Csv(body.to_vec()))
            }
        }
    }
}

use futures_util::StreamExt;

use forge_core::{AnalysisOutcome, AnalyzeRequest, RequestId};
use forge_logging::{forge_debug, forge_info};

use crate::http::{build_client, failure_from_response, map_reqwest_error, post_json};
use crate::wire::{decode_analyze_body, progress_status, FrameSplitter};
use crate::{ClientSettings, EngineEvent, ServiceError};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Asks the backend to validate selectors and produce a scraper script.
#[async_trait::async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(
        &self,
        request_id: RequestId,
        request: &AnalyzeRequest,
        sink: &dyn ProgressSink,
    ) -> Result<AnalysisOutcome, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestAnalysisClient {
    settings: ClientSettings,
}

impl ReqwestAnalysisClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl AnalysisClient for ReqwestAnalysisClient {
    async fn analyze(
        &self,
        request_id: RequestId,
        request: &AnalyzeRequest,
        sink: &dyn ProgressSink,
    ) -> Result<AnalysisOutcome, ServiceError> {
        let endpoint = self.settings.analyze_url()?;
        let client = build_client(&self.settings)?;
        forge_info!(
            "analyze request {} for {} (max_iterations={})",
            request_id,
            request.url,
            request.max_iterations
        );

        let response = post_json(&client, endpoint, request).await?;
        if !response.status().is_success() {
            return Err(failure_from_response(response).await);
        }

        // Progress frames are surfaced as they arrive; the full body is
        // decoded once the stream ends.
        let mut body = Vec::new();
        let mut splitter = FrameSplitter::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            body.extend_from_slice(&chunk);
            for frame in splitter.push(&chunk) {
                if let Some(status) = progress_status(&frame) {
                    forge_debug!("analyze request {}: {}", request_id, status);
                    sink.emit(EngineEvent::AnalysisProgress { request_id, status });
                }
            }
        }

        let outcome = decode_analyze_body(&body)?;
        forge_info!(
            "analyze request {} finished: iterations={} all_valid={}",
            request_id,
            outcome.report.iterations,
            outcome.report.all_fields_valid()
        );
        Ok(outcome)
    }
}

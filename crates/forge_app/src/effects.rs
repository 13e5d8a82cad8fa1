use std::time::Duration;

use forge_core::{Effect, Msg};
use forge_engine::{DownloadWriter, EngineHandle};
use forge_logging::{forge_error, forge_info};

/// Carries effects out: backend calls go to the engine, downloads to disk.
pub struct EffectRunner {
    engine: EngineHandle,
    writer: DownloadWriter,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, writer: DownloadWriter) -> Self {
        Self { engine, writer }
    }

    /// Runs `effects` and returns one notice line per saved or failed download.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<String> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::Analyze {
                    request_id,
                    mode,
                    request,
                } => {
                    forge_info!(
                        "Analyze request_id={} mode={:?} url={}",
                        request_id,
                        mode,
                        request.url
                    );
                    self.engine.enqueue_analyze(request_id, request);
                }
                Effect::RunScript {
                    request_id,
                    request,
                } => {
                    forge_info!("RunScript request_id={} url={}", request_id, request.url);
                    self.engine.enqueue_run(request_id, request);
                }
                Effect::ExportCsv {
                    request_id,
                    request,
                } => {
                    forge_info!("ExportCsv request_id={} url={}", request_id, request.url);
                    self.engine.enqueue_csv_export(request_id, request);
                }
                Effect::SaveDownload(download) => match self.writer.save(&download) {
                    Ok(path) => notices.push(format!("Saved {}", path.display())),
                    Err(err) => {
                        forge_error!("Failed to save {}: {}", download.filename(), err);
                        notices.push(format!("Could not save {}: {}", download.filename(), err));
                    }
                },
            }
        }
        notices
    }

    /// Next engine completion as a workflow message, waiting at most `timeout`.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(|event| event.into_msg())
    }

    pub fn try_next_msg(&self) -> Option<Msg> {
        self.engine.try_recv().map(|event| event.into_msg())
    }
}

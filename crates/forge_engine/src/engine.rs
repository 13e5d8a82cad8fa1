use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use forge_core::{AnalyzeRequest, RequestId, RunRequest};
use forge_logging::{forge_error, forge_warn};

use crate::analysis::{AnalysisClient, ChannelProgressSink, ReqwestAnalysisClient};
use crate::execution::{ExecutionClient, ReqwestExecutionClient, RunOutput};
use crate::{ClientSettings, EngineEvent, ServiceError};

enum EngineCommand {
    Analyze {
        request_id: RequestId,
        request: AnalyzeRequest,
    },
    Run {
        request_id: RequestId,
        request: RunRequest,
    },
    ExportCsv {
        request_id: RequestId,
        request: RunRequest,
    },
}

struct Clients {
    analysis: Arc<dyn AnalysisClient>,
    execution: Arc<dyn ExecutionClient>,
}

/// Owns the background runtime that talks to the backend.
///
/// Commands are fire-and-forget; every command yields exactly one
/// completion event, tagged with the request id it was enqueued with.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Self {
        Self::with_clients(
            Arc::new(ReqwestAnalysisClient::new(settings.clone())),
            Arc::new(ReqwestExecutionClient::new(settings)),
        )
    }

    pub fn with_clients(
        analysis: Arc<dyn AnalysisClient>,
        execution: Arc<dyn ExecutionClient>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let clients = Arc::new(Clients {
            analysis,
            execution,
        });

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    forge_error!("could not start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let clients = clients.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(clients.as_ref(), command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn enqueue_analyze(&self, request_id: RequestId, request: AnalyzeRequest) {
        self.send(EngineCommand::Analyze {
            request_id,
            request,
        });
    }

    pub fn enqueue_run(&self, request_id: RequestId, request: RunRequest) {
        self.send(EngineCommand::Run {
            request_id,
            request,
        });
    }

    pub fn enqueue_csv_export(&self, request_id: RequestId, request: RunRequest) {
        self.send(EngineCommand::ExportCsv {
            request_id,
            request,
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            forge_warn!("engine thread is gone; command dropped");
        }
    }
}

async fn handle_command(
    clients: &Clients,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Analyze {
            request_id,
            request,
        } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let result = clients.analysis.analyze(request_id, &request, &sink).await;
            EngineEvent::AnalysisCompleted { request_id, result }
        }
        EngineCommand::Run {
            request_id,
            request,
        } => {
            let result = clients
                .execution
                .run(&request)
                .await
                .and_then(|output| match output {
                    RunOutput::Records(records) => Ok(records),
                    RunOutput::Csv(_) => Err(ServiceError::decode(None)),
                });
            EngineEvent::RunCompleted { request_id, result }
        }
        EngineCommand::ExportCsv {
            request_id,
            request,
        } => {
            let result = clients
                .execution
                .run(&request)
                .await
                .and_then(|output| match output {
                    RunOutput::Csv(bytes) => Ok(bytes),
                    RunOutput::Records(_) => Err(ServiceError::decode(None)),
                });
            EngineEvent::CsvCompleted { request_id, result }
        }
    };
    let _ = event_tx.send(event);
}

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use forge_core::{update, AppState, Msg, Phase, SelectorEdits};
use forge_logging::{forge_debug, forge_warn};

use crate::commands::{parse_command, Command, HELP};
use crate::config::Settings;
use crate::effects::EffectRunner;
use crate::render::render;

const TICK: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Terminal front end: reads commands, feeds the workflow, prints the view.
///
/// Lines typed while a backend call is outstanding are held and replayed
/// once it settles, so scripted input runs step by step.
pub struct Session<W: Write> {
    state: AppState,
    runner: EffectRunner,
    out: W,
    held: VecDeque<String>,
}

impl<W: Write> Session<W> {
    pub fn new(settings: &Settings, runner: EffectRunner, out: W) -> Self {
        let state = if settings.seed_blank_selectors {
            AppState::with_blank_selectors()
        } else {
            AppState::new()
        };
        let mut session = Self {
            state,
            runner,
            out,
            held: VecDeque::new(),
        };
        if let Some(edits) = &settings.manual_selectors {
            session.apply(Msg::SelectorsEntered(edits.clone()));
        }
        if let Some(url) = &settings.initial_url {
            session.apply(Msg::UrlInputChanged(url.clone()));
        }
        session.state.consume_dirty();
        session
    }

    pub fn run(&mut self, input: mpsc::Receiver<String>) -> io::Result<()> {
        self.print(&["Type `help` for commands.".to_string()])?;
        self.print_view()?;
        let mut input_open = true;

        loop {
            while let Some(msg) = self.runner.try_next_msg() {
                self.dispatch_msg(msg)?;
            }

            if !self.state.is_busy() {
                if let Some(line) = self.held.pop_front() {
                    if self.handle_line(&line)? == Flow::Quit {
                        break;
                    }
                    continue;
                }
                if !input_open {
                    break;
                }
            }

            if !input_open {
                if let Some(msg) = self.runner.next_msg(TICK) {
                    self.dispatch_msg(msg)?;
                }
                continue;
            }

            match input.recv_timeout(TICK) {
                Ok(line) => {
                    if matches!(parse_command(&line), Ok(Some(Command::Quit))) {
                        break;
                    }
                    self.held.push_back(line);
                }
                Err(RecvTimeoutError::Timeout) => self.dispatch_msg(Msg::Tick)?,
                Err(RecvTimeoutError::Disconnected) => {
                    forge_debug!("input closed; finishing outstanding work");
                    input_open = false;
                }
            }
        }
        self.out.flush()
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.out
    }

    fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(err) => {
                self.print(&[err.to_string()])?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                let help: Vec<String> = HELP.iter().map(|line| line.to_string()).collect();
                self.print(&help)?;
            }
            Command::Show => self.print_view()?,
            Command::SetSelector { field, value } => {
                let msg = if self.state.phase() == Phase::Editing {
                    Msg::DraftFieldChanged { field, value }
                } else {
                    let current = self.state.selectors().cloned().unwrap_or_default();
                    let mut edits = SelectorEdits::from_current(&current);
                    edits.set(field, value);
                    Msg::SelectorsEntered(edits)
                };
                self.dispatch_msg(msg)?;
            }
            other => {
                for msg in other.into_msgs() {
                    self.dispatch_msg(msg)?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn dispatch_msg(&mut self, msg: Msg) -> io::Result<()> {
        let notices = self.apply(msg);
        if !notices.is_empty() {
            self.print(&notices)?;
        }
        if self.state.consume_dirty() {
            self.print_view()?;
        }
        Ok(())
    }

    fn apply(&mut self, msg: Msg) -> Vec<String> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects)
    }

    fn print_view(&mut self) -> io::Result<()> {
        let lines = render(&self.state.view());
        self.print(&lines)
    }

    fn print(&mut self, lines: &[String]) -> io::Result<()> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }
}

/// Forwards stdin lines to a channel from a background thread.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    forge_warn!("stdin read failed: {}", err);
                    break;
                }
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::{Arc, Mutex};

    use forge_core::{
        AnalysisOutcome, AnalyzeRequest, FieldVerdict, OutputFormat, RequestId, RunRequest,
        ScrapedRecord, ScriptArtifact, ValidationReport,
    };
    use forge_engine::{
        AnalysisClient, DownloadWriter, EngineHandle, ExecutionClient, ProgressSink, RunOutput,
        ServiceError,
    };
    use forge_logging::LogDestination;
    use tempfile::TempDir;

    use super::*;

    #[derive(Default)]
    struct RecordingAnalysis {
        requests: Mutex<Vec<AnalyzeRequest>>,
    }

    #[async_trait::async_trait]
    impl AnalysisClient for RecordingAnalysis {
        async fn analyze(
            &self,
            _request_id: RequestId,
            request: &AnalyzeRequest,
            _sink: &dyn ProgressSink,
        ) -> Result<AnalysisOutcome, ServiceError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut selectors = request.selectors.clone();
            selectors.product_container = ".card".into();
            Ok(AnalysisOutcome {
                selectors,
                script: ScriptArtifact("print('scrape')\n".into()),
                report: ValidationReport {
                    final_validation: vec![FieldVerdict {
                        field: "title".into(),
                        valid: true,
                    }],
                    iterations: 1,
                    ..ValidationReport::default()
                },
            })
        }
    }

    struct OneRecord;

    #[async_trait::async_trait]
    impl ExecutionClient for OneRecord {
        async fn run(&self, request: &RunRequest) -> Result<RunOutput, ServiceError> {
            Ok(match request.format {
                OutputFormat::Json => RunOutput::Records(vec![ScrapedRecord {
                    title: Some("Shoe".into()),
                    price: Some("$10".into()),
                    ..ScrapedRecord::default()
                }]),
                OutputFormat::Csv => RunOutput::Csv(b"title\r\nShoe\r\n".to_vec()),
            })
        }
    }

    fn settings(output_dir: &std::path::Path) -> Settings {
        Settings {
            backend_url: "http://127.0.0.1:5000".into(),
            output_dir: output_dir.to_path_buf(),
            log_destination: LogDestination::Terminal,
            seed_blank_selectors: true,
            request_timeout: None,
            initial_url: Some("https://shop.example".into()),
            manual_selectors: None,
        }
    }

    fn run_script(
        lines: &[&str],
        analysis: Arc<RecordingAnalysis>,
        dir: &std::path::Path,
    ) -> String {
        let engine = EngineHandle::with_clients(analysis, Arc::new(OneRecord));
        let runner = EffectRunner::new(engine, DownloadWriter::new(dir));
        let mut session = Session::new(&settings(dir), runner, Vec::new());

        let (tx, rx) = mpsc::channel();
        for line in lines {
            tx.send(line.to_string()).unwrap();
        }
        drop(tx);
        session.run(rx).unwrap();
        String::from_utf8(session.into_output()).unwrap()
    }

    #[test]
    fn scripted_session_analyzes_runs_and_saves() {
        let temp = TempDir::new().unwrap();
        let analysis = Arc::new(RecordingAnalysis::default());

        let output = run_script(
            &["set title .item h2", "submit", "run", "export", "script"],
            analysis.clone(),
            temp.path(),
        );

        let requests = analysis.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://shop.example");
        assert_eq!(requests[0].selectors.product_title, ".item h2");
        assert!(output.contains("Product Container: .card"));
        assert!(output.contains("Scraped data: 1 items"));
        assert!(output.contains("Shoe | N/A | N/A | $10"));

        let csv = fs::read_to_string(temp.path().join("scraped_data.csv")).unwrap();
        assert!(csv.starts_with("Title,URL,Image URL,Price\r\n"));
        assert!(csv.contains("\"Shoe\""));
        let script = fs::read_to_string(temp.path().join("scraper_script.py")).unwrap();
        assert_eq!(script, "print('scrape')\n");
    }

    #[test]
    fn set_while_editing_goes_to_the_draft() {
        let temp = TempDir::new().unwrap();
        let analysis = Arc::new(RecordingAnalysis::default());

        run_script(
            &["submit", "edit", "set price .sale", "save"],
            analysis.clone(),
            temp.path(),
        );

        let requests = analysis.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].selectors.product_price, ".sale");
        assert_eq!(requests[1].selectors.product_container, ".card");
    }

    #[test]
    fn bad_commands_are_reported_and_quit_stops_early() {
        let temp = TempDir::new().unwrap();
        let analysis = Arc::new(RecordingAnalysis::default());

        let output = run_script(&["jump", "quit", "submit"], analysis.clone(), temp.path());

        assert!(output.contains("unknown command `jump`"));
        assert!(analysis.requests.lock().unwrap().is_empty());
    }
}

use forge_core::{Msg, SelectorField};
use thiserror::Error;

pub const HELP: &[&str] = &[
    "Commands:",
    "  url <address>              set the target page",
    "  paginate on [selector]     enable pagination (optionally with a next-page selector)",
    "  paginate off               disable pagination",
    "  set <field> <selector...>  set one selector (container, title, url, image, price, pagination_next)",
    "  submit                     analyze the page with the current selectors",
    "  edit                       open the selector editor",
    "  save                       save edited selectors and regenerate the script",
    "  cancel                     close the editor without saving",
    "  regenerate                 regenerate the script with the current selectors",
    "  run                        run the script and show scraped records",
    "  export                     save scraped records as CSV",
    "  script                     save the generated script",
    "  dismiss                    dismiss the current alert",
    "  show                       redraw the screen",
    "  help                       show this list",
    "  quit                       exit",
];

/// One line of terminal input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Goes straight to the workflow.
    Workflow(Msg),
    Paginate {
        enabled: bool,
        selector: Option<String>,
    },
    /// Selector entry; its message depends on whether the editor is open.
    SetSelector { field: SelectorField, value: String },
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command `{0}`; type `help` for a list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown selector field `{0}`")]
    UnknownField(String),
}

/// Parses one input line. Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    let Some((word, rest)) = split_word(line) else {
        return Ok(None);
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "url" => Command::Workflow(Msg::UrlInputChanged(rest.to_string())),
        "paginate" => match split_word(rest) {
            Some((toggle, selector)) if toggle.eq_ignore_ascii_case("on") => Command::Paginate {
                enabled: true,
                selector: (!selector.is_empty()).then(|| selector.to_string()),
            },
            Some((toggle, "")) if toggle.eq_ignore_ascii_case("off") => Command::Paginate {
                enabled: false,
                selector: None,
            },
            _ => return Err(ParseError::Usage("paginate on [selector] | paginate off")),
        },
        "set" => {
            let Some((field, value)) = split_word(rest) else {
                return Err(ParseError::Usage("set <field> <selector...>"));
            };
            let field = SelectorField::parse(field)
                .ok_or_else(|| ParseError::UnknownField(field.to_string()))?;
            Command::SetSelector {
                field,
                value: value.to_string(),
            }
        }
        "submit" | "analyze" => Command::Workflow(Msg::SubmitClicked),
        "edit" => Command::Workflow(Msg::EditSelectorsClicked),
        "save" => Command::Workflow(Msg::SaveSelectorsClicked),
        "cancel" => Command::Workflow(Msg::EditCancelled),
        "regenerate" => Command::Workflow(Msg::RegenerateClicked),
        "run" => Command::Workflow(Msg::RunScriptClicked),
        "export" => Command::Workflow(Msg::ExportCsvClicked),
        "script" => Command::Workflow(Msg::DownloadScriptClicked),
        "dismiss" | "ok" => Command::Workflow(Msg::AlertDismissed),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((text, "")),
    }
}

impl Command {
    /// Workflow messages for commands that do not depend on session state.
    pub fn into_msgs(self) -> Vec<Msg> {
        match self {
            Command::Workflow(msg) => vec![msg],
            Command::Paginate { enabled, selector } => {
                let mut msgs = vec![Msg::PaginationToggled(enabled)];
                msgs.extend(selector.map(Msg::PaginationSelectorChanged));
                msgs
            }
            Command::SetSelector { .. } | Command::Show | Command::Help | Command::Quit => {
                Vec::new()
            }
        }
    }
}

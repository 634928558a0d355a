//! Slash commands handled locally, never forwarded to the model.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    Exit,
    Help,
    Clear,
    Powers,
    Examples,
}

/// Recognized tokens. Matching is exact and case-sensitive.
const COMMANDS: &[(&str, LocalCommand)] = &[
    ("/exit", LocalCommand::Exit),
    ("/quit", LocalCommand::Exit),
    ("/help", LocalCommand::Help),
    ("/clear", LocalCommand::Clear),
    ("/powers", LocalCommand::Powers),
    ("/examples", LocalCommand::Examples),
];

/// What to do with one line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch<'a> {
    Empty,
    Command(LocalCommand),
    Forward(&'a str),
}

pub fn dispatch(line: &str) -> Dispatch<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Dispatch::Empty;
    }
    match COMMANDS.iter().find(|(token, _)| *token == trimmed) {
        Some((_, command)) => Dispatch::Command(*command),
        None => Dispatch::Forward(trimmed),
    }
}

pub const HELP_TEXT: &str = "CLI AI Agent (Responses API + Zapier MCP)

Commands:
  /help      show this help
  /powers    list what the assistant can do through Zapier
  /examples  show example requests
  /clear     reset the screen
  /exit      quit (also /quit)

Anything else is sent to the assistant. Ctrl-D or Ctrl-C at the prompt exits.";

pub const POWERS_TEXT: &str = "The assistant acts through your Zapier MCP server. With the matching actions enabled it can:
  - read, draft and send Gmail messages
  - create and look up Google Calendar events
  - post messages to Slack channels
  - add and find rows in Google Sheets
  - create Notion pages and Trello cards
  - run any other Zapier action exposed to the MCP server

Actions run without asking for approval, so phrase requests precisely.";

pub const EXAMPLES_TEXT: &str = "Try asking:
  Send an email to alex@example.com saying the report is ready
  What is on my calendar tomorrow?
  Post \"deploy finished\" to the #releases Slack channel
  Add a row to the Expenses sheet: lunch, 14.50, today
  Create a Trello card called \"Review Q3 budget\" on the Finance board";

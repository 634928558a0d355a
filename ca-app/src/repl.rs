//! The interactive chat loop.
//!
//! One line in, at most one completion request out. The next prompt is only
//! shown once the previous turn has been fully printed.

use crate::commands::{self, Dispatch, EXAMPLES_TEXT, HELP_TEXT, LocalCommand, POWERS_TEXT};
use crate::config::SessionConfig;
use crate::display::{Display, Tone};
use crate::input::{InputEvent, LineSource};
use ca_llm::{CompletionApi, CompletionRequest, ToolActivity, display_text, tool_activity};
use std::io::{self, Write};
use std::ops::ControlFlow;

pub const BANNER_TITLE: &str = "CLI Agent";
pub const DEFAULT_DISPLAY_NAME: &str = "You";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// `/exit` or `/quit`.
    Quit,
    EndOfInput,
    Interrupted,
}

pub struct ChatLoop<'a, A: ?Sized, W> {
    config: &'a SessionConfig,
    api: &'a A,
    display: &'a Display,
    out: W,
}

impl<'a, A, W> ChatLoop<'a, A, W>
where
    A: CompletionApi + ?Sized,
    W: Write,
{
    pub fn new(config: &'a SessionConfig, api: &'a A, display: &'a Display, out: W) -> Self {
        Self {
            config,
            api,
            display,
            out,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Banner, ready line, display name, then the loop.
    pub async fn start(&mut self, input: &mut dyn LineSource) -> io::Result<LoopExit> {
        writeln!(self.out, "{}", self.display.banner(BANNER_TITLE))?;
        let ready = self.display.paint(
            Tone::Notice,
            "Assistant ready (Responses API + Zapier MCP). Type your message. /exit to quit, /help for help.",
        );
        writeln!(self.out, "{}", self.display.wrap(&ready))?;

        let question = self.display.paint(Tone::Notice, "What should I call you?");
        let name = match self.read_line(input, &format!("{question} ")).await? {
            ControlFlow::Continue(line) => display_name(&line),
            ControlFlow::Break(exit) => return Ok(exit),
        };
        tracing::debug!(name = %name, "display name captured");

        self.run(input, &name).await
    }

    pub async fn run(&mut self, input: &mut dyn LineSource, name: &str) -> io::Result<LoopExit> {
        let prompt = format!("{}: ", self.display.paint(Tone::User, name));
        loop {
            let line = match self.read_line(input, &prompt).await? {
                ControlFlow::Continue(line) => line,
                ControlFlow::Break(exit) => return Ok(exit),
            };

            match commands::dispatch(&line) {
                Dispatch::Empty => continue,
                Dispatch::Command(LocalCommand::Exit) => {
                    writeln!(self.out, "Goodbye!")?;
                    return Ok(LoopExit::Quit);
                }
                Dispatch::Command(LocalCommand::Help) => self.print_block(HELP_TEXT)?,
                Dispatch::Command(LocalCommand::Powers) => self.print_block(POWERS_TEXT)?,
                Dispatch::Command(LocalCommand::Examples) => self.print_block(EXAMPLES_TEXT)?,
                Dispatch::Command(LocalCommand::Clear) => {
                    self.out.flush()?;
                    self.display.clear_screen();
                }
                Dispatch::Forward(text) => {
                    if let ControlFlow::Break(exit) = self.turn(input, text).await? {
                        return Ok(exit);
                    }
                }
            }
        }
    }

    async fn read_line(
        &mut self,
        input: &mut dyn LineSource,
        prompt: &str,
    ) -> io::Result<ControlFlow<LoopExit, String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        let exit = match input.next_line().await? {
            InputEvent::Line(line) => return Ok(ControlFlow::Continue(line)),
            InputEvent::Eof => LoopExit::EndOfInput,
            InputEvent::Interrupted => LoopExit::Interrupted,
        };
        writeln!(self.out, "\nExiting.")?;
        Ok(ControlFlow::Break(exit))
    }

    /// One completion round trip. Ctrl-C while it is in flight drops the
    /// request and ends the loop.
    #[tracing::instrument(level = "info", skip_all, fields(input_len = text.len()))]
    async fn turn(
        &mut self,
        input: &mut dyn LineSource,
        text: &str,
    ) -> io::Result<ControlFlow<LoopExit>> {
        let request =
            CompletionRequest::tool_required(self.config.model(), text, self.config.tool());
        let result = match request {
            Ok(request) => {
                let api = self.api;
                tokio::select! {
                    result = api.create_completion(&request) => result,
                    () = input.interrupted() => {
                        tracing::debug!("completion abandoned on interrupt");
                        writeln!(self.out, "\nExiting.")?;
                        return Ok(ControlFlow::Break(LoopExit::Interrupted));
                    }
                }
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => {
                for activity in tool_activity(&response) {
                    match activity {
                        ToolActivity::Listed {
                            server_label,
                            tools,
                        } => tracing::debug!(%server_label, tools, "mcp tools listed"),
                        ToolActivity::Called {
                            server_label,
                            name,
                            failed,
                        } => tracing::debug!(%server_label, %name, failed, "mcp tool called"),
                    }
                }
                tracing::info!(
                    response_id = ?response.id,
                    usage = ?response.usage,
                    "completion received"
                );
                self.print_labeled(Tone::Assistant, "Assistant:", &display_text(&response))?;
            }
            Err(e) => {
                // The error line below is the user-facing report.
                tracing::debug!(error = %e, "completion failed");
                self.print_labeled(Tone::Error, "Error:", &e.to_string())?;
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn print_labeled(&mut self, tone: Tone, label: &str, body: &str) -> io::Result<()> {
        let text = format!("{} {body}", self.display.paint(tone, label));
        writeln!(self.out, "{}", self.display.wrap(&text))
    }

    fn print_block(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", self.display.wrap(text))
    }
}

fn display_name(answer: &str) -> String {
    let name = answer.trim();
    if name.is_empty() {
        DEFAULT_DISPLAY_NAME.to_string()
    } else {
        name.to_string()
    }
}

//! cli-agent: an interactive chat loop over the OpenAI Responses API with a
//! Zapier MCP server attached as the only tool.

mod commands;
mod config;
mod display;
mod input;
mod repl;

use ca_llm::{CompletionApi, ResponsesClient};
use clap::Parser;
use config::{ConfigError, SessionConfig};
use display::Display;
use input::{LineSource, StdinLines};
use repl::ChatLoop;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

const EXIT_OK: u8 = 0;
/// Missing credential or otherwise unusable environment.
const EXIT_CONFIG_ERROR: u8 = 1;
/// The terminal itself failed (stdin/stdout i/o, runtime start).
const EXIT_IO_ERROR: u8 = 2;

/// Quiet by default: anything the user must see is printed by the loop.
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Parser)]
#[command(
    name = "cli-agent",
    version,
    about = "Chat with an OpenAI model that acts through your Zapier MCP server"
)]
struct Cli {}

fn main() -> ExitCode {
    let _cli = Cli::parse();

    // Optional; the environment wins over the file.
    let _ = dotenvy::dotenv();

    if let Err(e) = init_tracing() {
        eprintln!("{e}");
        return ExitCode::from(EXIT_CONFIG_ERROR);
    }
    install_panic_hook();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            return ExitCode::from(EXIT_IO_ERROR);
        }
    };
    let code = runtime.block_on(async {
        let display = Display::detect(std::env::var_os("NO_COLOR").is_some());
        let mut input = StdinLines::new();
        run(
            SessionConfig::from_env,
            |cfg| ResponsesClient::with_base_url(cfg.api_key(), cfg.api_base_url()),
            &display,
            &mut input,
            std::io::stdout(),
        )
        .await
    });
    // A pending stdin read parks a blocking thread; don't wait for it.
    runtime.shutdown_background();

    ExitCode::from(code)
}

/// Validate the configuration, then run one chat session. Returns the
/// process exit status; nothing is read or sent when configuration fails.
async fn run<A, L, C, W>(
    load: L,
    connect: C,
    display: &Display,
    input: &mut dyn LineSource,
    mut out: W,
) -> u8
where
    A: CompletionApi,
    L: FnOnce() -> Result<SessionConfig, ConfigError>,
    C: FnOnce(&SessionConfig) -> A,
    W: Write,
{
    let cfg = match load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::debug!(error = %e, "configuration rejected");
            if let Err(e) = writeln!(out, "{}", e.remediation()) {
                tracing::debug!(%e, "remediation text not written");
            }
            return EXIT_CONFIG_ERROR;
        }
    };
    tracing::info!(config = ?cfg, "session configured");

    let api = connect(&cfg);
    let mut chat = ChatLoop::new(&cfg, &api, display, out);
    match chat.start(input).await {
        Ok(exit) => {
            tracing::info!(?exit, "chat loop finished");
            EXIT_OK
        }
        Err(e) => {
            tracing::debug!(error = %e, "chat loop aborted");
            eprintln!("Error: terminal i/o: {e}");
            EXIT_IO_ERROR
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(v) => v,
        Err(_) => EnvFilter::new(DEFAULT_LOG_FILTER),
    };
    let log_format = std::env::var("CLI_AGENT_LOG_FORMAT")
        .unwrap_or_else(|_| "compact".to_string())
        .to_ascii_lowercase();

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .init();
        }
        "pretty" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .pretty()
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .compact()
                .init();
        }
        other => {
            return Err(anyhow::anyhow!(
                "unsupported CLI_AGENT_LOG_FORMAT={other:?}; expected one of: json, pretty, compact"
            ));
        }
    }

    tracing::debug!(
        log_format = %log_format,
        env_filter = ?std::env::var("RUST_LOG").ok(),
        "tracing initialized"
    );
    Ok(())
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_to_string(panic_info.payload());
        tracing::error!(
            panic_location = %location,
            panic_payload = %payload,
            "panic captured"
        );
        default_hook(panic_info);
    }));
}

fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        return msg.to_string();
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return msg.clone();
    }
    "non-string panic payload".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ca_llm::{CompletionRequest, CompletionResponse, LlmError};
    use clap::CommandFactory;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use crate::input::InputEvent;

    #[test]
    fn cli_definition_is_valid_and_takes_no_arguments() {
        Cli::command().debug_assert();
        assert!(Cli::try_parse_from(["cli-agent"]).is_ok());
        assert!(Cli::try_parse_from(["cli-agent", "--model", "x"]).is_err());
    }

    #[derive(Default)]
    struct CountingInput(usize);

    #[async_trait]
    impl LineSource for CountingInput {
        async fn next_line(&mut self) -> std::io::Result<InputEvent> {
            self.0 += 1;
            Ok(InputEvent::Eof)
        }
    }

    struct RefusingApi;

    #[async_trait]
    impl CompletionApi for RefusingApi {
        async fn create_completion(
            &self,
            _request: &CompletionRequest,
        ) -> ca_llm::Result<CompletionResponse> {
            panic!("no request may be sent");
        }
    }

    struct FailingApi;

    #[async_trait]
    impl CompletionApi for FailingApi {
        async fn create_completion(
            &self,
            _request: &CompletionRequest,
        ) -> ca_llm::Result<CompletionResponse> {
            Err(LlmError::Http("connection refused".to_string()))
        }
    }

    struct Typed(VecDeque<&'static str>);

    #[async_trait]
    impl LineSource for Typed {
        async fn next_line(&mut self) -> std::io::Result<InputEvent> {
            Ok(match self.0.pop_front() {
                Some(line) => InputEvent::Line(line.to_string()),
                None => InputEvent::Eof,
            })
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn only(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[tokio::test]
    async fn missing_model_key_exits_one_before_the_loop_starts() {
        let mut input = CountingInput::default();
        let mut out = Vec::new();
        let mut connects = 0;
        let code = run(
            || SessionConfig::from_lookup(only(&[("ZAPIER_MCP_API_KEY", "zap-test")])),
            |_| {
                connects += 1;
                RefusingApi
            },
            &Display::plain(),
            &mut input,
            &mut out,
        )
        .await;

        assert_eq!(code, 1);
        assert_eq!(connects, 0);
        assert_eq!(input.0, 0);
        let out = String::from_utf8(out).expect("utf8 output");
        assert_eq!(
            out,
            "Error: OPENAI_API_KEY is not set. Export it before running.\n\
             Example: export OPENAI_API_KEY=sk-...\n"
        );
    }

    #[tokio::test]
    async fn empty_environment_exits_one() {
        let mut input = CountingInput::default();
        let mut out = Vec::new();
        let code = run(
            || SessionConfig::from_lookup(|_| None),
            |_| RefusingApi,
            &Display::plain(),
            &mut input,
            &mut out,
        )
        .await;
        assert_eq!(code, EXIT_CONFIG_ERROR);
        assert_eq!(input.0, 0);
        assert!(!out.is_empty());
    }

    #[tokio::test]
    async fn closed_input_after_valid_config_exits_zero() {
        let mut input = CountingInput::default();
        let mut out = Vec::new();
        let code = run(
            || {
                SessionConfig::from_lookup(only(&[
                    ("OPENAI_API_KEY", "sk-test"),
                    ("ZAPIER_MCP_API_KEY", "zap-test"),
                ]))
            },
            |_| RefusingApi,
            &Display::plain(),
            &mut input,
            &mut out,
        )
        .await;
        assert_eq!(code, EXIT_OK);
        assert_eq!(input.0, 1);
        let out = String::from_utf8(out).expect("utf8 output");
        assert!(out.ends_with("\nExiting.\n"));
    }

    #[tokio::test]
    async fn default_log_filter_stays_silent_for_errors_shown_inline() {
        let logs = Captured::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(DEFAULT_LOG_FILTER))
            .with_writer(move || sink.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let code = run(
            || SessionConfig::from_lookup(|_| None),
            |_| RefusingApi,
            &Display::plain(),
            &mut CountingInput::default(),
            Vec::new(),
        )
        .await;
        assert_eq!(code, EXIT_CONFIG_ERROR);

        let mut out = Vec::new();
        let code = run(
            || {
                SessionConfig::from_lookup(only(&[
                    ("OPENAI_API_KEY", "sk-test"),
                    ("ZAPIER_MCP_API_KEY", "zap-test"),
                ]))
            },
            |_| FailingApi,
            &Display::plain(),
            &mut Typed(VecDeque::from(["Ada", "hello"])),
            &mut out,
        )
        .await;
        assert_eq!(code, EXIT_OK);
        let out = String::from_utf8(out).expect("utf8 output");
        assert!(out.contains("Error: http error: connection refused\n"));

        let logged = String::from_utf8(logs.0.lock().expect("log lock").clone())
            .expect("utf8 logs");
        assert!(logged.is_empty(), "unexpected log output: {logged}");
    }

    #[test]
    fn panic_payloads_render_as_text() {
        let s: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_payload_to_string(&*s), "boom");
        let s: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_payload_to_string(&*s), "bang");
        let s: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_payload_to_string(&*s), "non-string panic payload");
    }
}

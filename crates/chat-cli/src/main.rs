use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chat_core::{ContextTag, Responder, Speaker, Transcript, WidgetConfig};
use chat_state::{ChatWidget, SubmitOutcome, WidgetError};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "portfolio-chat")]
#[command(about = "Chat with the portfolio FAQ bot from the terminal")]
#[command(version)]
struct Cli {
    /// Config file (TOML, or JSON with a .json extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rule file replacing the built-in rules
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Typing delay before each reply, in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive chat (default)
    Chat,
    /// Answer a single message
    Send {
        /// Message content
        message: String,
        /// Context remembered from the previous turn
        #[arg(long, default_value = "none")]
        context: ContextTag,
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a file of utterances, one per line
    Script {
        /// Script file
        file: PathBuf,
        /// Print the transcript as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the active rules in evaluation order
    Rules,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(&cli)?;
    tracing::debug!(
        typing_delay_ms = config.typing_delay_ms,
        rules = ?config.rules_path,
        "Configuration loaded"
    );

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_interactive_chat(config).await,
        Commands::Send {
            message,
            context,
            json,
        } => send_message(&config, &message, context, json),
        Commands::Script { file, json } => run_script(config, &file, json).await,
        Commands::Rules => list_rules(&config),
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_line_number(true)
                .with_file(false),
        )
        .init();
}

/// Config precedence: explicit --config file, else the usual lookup; CLI
/// flags override both.
fn load_config(cli: &Cli) -> anyhow::Result<WidgetConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = WidgetConfig::from_path(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
        None => WidgetConfig::new(),
    };
    if let Some(rules) = &cli.rules {
        config.rules_path = Some(rules.clone());
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.typing_delay_ms = delay_ms;
    }
    Ok(config)
}

fn responder_for(config: &WidgetConfig) -> anyhow::Result<Responder> {
    let rules = config.load_rules().context("loading rules")?;
    Ok(Responder::new(rules))
}

fn send_message(
    config: &WidgetConfig,
    message: &str,
    context: ContextTag,
    json: bool,
) -> anyhow::Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("message is empty");
    }

    let responder = responder_for(config)?;
    let response = responder.respond(message, context);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("{} {}", format!("{}:", config.bot_name).green().bold(), response.reply);
    println!(
        "{}",
        format!(
            "rule: {}  context: {} -> {}",
            response.rule_id.as_deref().unwrap_or("fallback"),
            context,
            response.next_context
        )
        .dimmed()
    );
    Ok(())
}

async fn run_script(config: WidgetConfig, file: &Path, json: bool) -> anyhow::Result<()> {
    let widget = replay_script(config, file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(widget.transcript())?);
    } else {
        print_transcript(widget.transcript(), &widget.config().bot_name);
        println!("{}", format!("final context: {}", widget.context()).dimmed());
    }
    Ok(())
}

/// Feed every line of `file` through an open widget, waiting for each reply.
async fn replay_script(config: WidgetConfig, file: &Path) -> anyhow::Result<ChatWidget> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading script {}", file.display()))?;

    let responder = responder_for(&config)?;
    let mut widget = ChatWidget::with_responder(config, responder);
    widget.open()?;

    for utterance in content.lines() {
        if let SubmitOutcome::Scheduled { .. } = widget.submit(utterance)? {
            widget.next_reply().await;
        }
    }
    Ok(widget)
}

fn list_rules(config: &WidgetConfig) -> anyhow::Result<()> {
    let responder = responder_for(config)?;
    let rules = responder.rules();

    for (idx, rule) in rules.rules().iter().enumerate() {
        let def = rule.def();
        let keywords: Vec<String> = def
            .entries()
            .into_iter()
            .filter(|entry| entry.enabled)
            .map(|entry| entry.pattern)
            .collect();
        let when = def
            .when_context
            .map(|tag| format!("[{}] ", tag))
            .unwrap_or_default();
        println!(
            "{:>2}. {}{} {} -> {}",
            idx + 1,
            when.yellow(),
            rule.id().cyan().bold(),
            keywords.join(" | ").dimmed(),
            rule.next_context()
        );
    }
    println!(
        "{}",
        format!("    fallback -> {}: {}", ContextTag::None, rules.fallback()).dimmed()
    );
    Ok(())
}

fn print_transcript(transcript: &Transcript, bot_name: &str) {
    for entry in transcript {
        match entry.speaker {
            Speaker::User => println!("{} {}", "You:".cyan().bold(), entry.text),
            Speaker::Bot => println!(
                "{} {}",
                format!("{}:", bot_name).green().bold(),
                entry.text
            ),
        }
    }
}

/// What a line typed into the REPL asks for
#[derive(Debug, PartialEq)]
enum ReplInput<'a> {
    Exit,
    History,
    Context,
    Open,
    Close,
    QuickReply(usize),
    Message(&'a str),
}

fn parse_repl_input(line: &str) -> ReplInput<'_> {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        return ReplInput::Exit;
    }
    match trimmed {
        "/history" => ReplInput::History,
        "/context" => ReplInput::Context,
        "/open" => ReplInput::Open,
        "/close" => ReplInput::Close,
        _ => match trimmed.strip_prefix('/').and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n > 0 => ReplInput::QuickReply(n - 1),
            _ => ReplInput::Message(line),
        },
    }
}

fn print_quick_replies(widget: &ChatWidget) {
    let labels: Vec<String> = widget
        .quick_replies()
        .iter()
        .enumerate()
        .map(|(idx, quick)| format!("/{} {}", idx + 1, quick.label))
        .collect();
    if !labels.is_empty() {
        println!("{}", format!("Quick replies: {}", labels.join("  ")).dimmed());
    }
}

async fn run_interactive_chat(config: WidgetConfig) -> anyhow::Result<()> {
    let responder = responder_for(&config)?;
    let mut widget = ChatWidget::with_responder(config, responder);
    widget.open()?;

    let bot_label = format!("{}:", widget.config().bot_name);
    println!("{}", format!("🤖 {}", widget.config().bot_name).cyan().bold());
    println!("{}", "Type 'exit' or 'quit' to leave, /history for the transcript".dimmed());
    println!();
    println!("{} {}", bot_label.green().bold(), widget.config().welcome_message);
    print_quick_replies(&widget);
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let outcome = match parse_repl_input(&line) {
            ReplInput::Exit => {
                println!("{}", "👋 Goodbye!".cyan());
                break;
            }
            ReplInput::History => {
                print_transcript(widget.transcript(), &widget.config().bot_name);
                continue;
            }
            ReplInput::Context => {
                println!("{}", format!("context: {}", widget.context()).dimmed());
                continue;
            }
            ReplInput::Open => {
                widget.open()?;
                println!("{} {}", bot_label.green().bold(), widget.config().welcome_message);
                continue;
            }
            ReplInput::Close => {
                widget.close()?;
                println!("{}", "Chat closed. /open to bring it back.".dimmed());
                continue;
            }
            ReplInput::QuickReply(index) => widget.quick_reply(index),
            ReplInput::Message(text) => widget.submit(text),
        };

        match outcome {
            Ok(SubmitOutcome::Scheduled { .. }) => {
                println!("{}", "…".dimmed());
                if let Some(reply) = widget.next_reply().await {
                    println!("{} {}", bot_label.green().bold(), reply.text);
                }
                println!();
            }
            Ok(SubmitOutcome::Ignored) => {}
            Err(WidgetError::NotOpen) => {
                println!("{}", "Chat is closed. /open to bring it back.".yellow());
            }
            Err(e @ WidgetError::UnknownQuickReply { .. }) => {
                println!("{}", format!("❌ {}", e).red());
            }
            Err(e) => return Err(e.into()),
        }
    }

    widget.unmount();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn send_parses_context() {
        let cli = Cli::parse_from(["portfolio-chat", "send", "more", "--context", "skills"]);
        match cli.command {
            Some(Commands::Send { message, context, json }) => {
                assert_eq!(message, "more");
                assert_eq!(context, ContextTag::Skills);
                assert!(!json);
            }
            _ => panic!("expected send"),
        }
        assert!(Cli::try_parse_from(["portfolio-chat", "send", "x", "--context", "weather"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.toml");
        std::fs::write(&path, "typing_delay_ms = 100\nbot_name = \"Bot\"\n").unwrap();

        let cli = Cli::parse_from([
            "portfolio-chat",
            "--config",
            path.to_str().unwrap(),
            "--delay-ms",
            "0",
            "rules",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.typing_delay_ms, 0);
        assert_eq!(config.bot_name, "Bot");
    }

    #[tokio::test]
    async fn script_replays_every_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.txt");
        std::fs::write(&path, "hi\n\ntell me about pitstop\n   \nmore\n").unwrap();

        let config = WidgetConfig {
            typing_delay_ms: 0,
            ..WidgetConfig::default()
        };
        let widget = replay_script(config, &path).await.unwrap();

        assert_eq!(widget.transcript().len(), 6);
        assert_eq!(widget.transcript().count(Speaker::Bot), 3);
        assert_eq!(widget.context(), ContextTag::Projects);

        let json = serde_json::to_value(widget.transcript()).unwrap();
        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0]["speaker"], "user");
        assert_eq!(entries[0]["text"], "hi");
        assert_eq!(entries[1]["speaker"], "bot");
    }

    #[tokio::test]
    async fn script_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let Err(err) = replay_script(WidgetConfig::default(), &missing).await else {
            panic!("missing script should fail");
        };
        assert!(err.to_string().contains("reading script"));
    }

    #[test]
    fn send_json_shape() {
        let responder = responder_for(&WidgetConfig::default()).unwrap();
        let response = responder.respond("more", ContextTag::Skills);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["next_context"], "skills");
        assert_eq!(json["rule_id"], "skills_follow_up");
        assert!(json["reply"].as_str().is_some_and(|r| !r.is_empty()));

        let fallback = serde_json::to_value(responder.respond("weather?", ContextTag::None)).unwrap();
        assert_eq!(fallback["next_context"], "none");
        assert!(fallback["rule_id"].is_null());
    }

    #[test]
    fn repl_input_parsing() {
        assert_eq!(parse_repl_input(" QUIT "), ReplInput::Exit);
        assert_eq!(parse_repl_input("/history"), ReplInput::History);
        assert_eq!(parse_repl_input("/2"), ReplInput::QuickReply(1));
        assert_eq!(parse_repl_input("/0"), ReplInput::Message("/0"));
        assert_eq!(parse_repl_input("hi there"), ReplInput::Message("hi there"));
    }
}

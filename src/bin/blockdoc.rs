use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use blockdoc::clipboard::ClipboardData;
use blockdoc::{
    BlockId, BlockType, CaretPlacement, Document, Editor, EditorConfig, Key, ManualClock,
    Modifiers,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Renders a document value as HTML, plain text or canonical JSON
    Render {
        #[arg(long, value_enum, default_value_t = Format::Html)]
        format: Format,
        /// Document value to read; stdin when omitted
        input: Option<PathBuf>,
    },
    /// Reads any accepted document value and prints the canonical form
    Normalize { input: Option<PathBuf> },
    /// Prints block and word counts
    Stats {
        #[arg(long)]
        json: bool,
        input: Option<PathBuf>,
    },
    /// Replays a scripted editing session and prints the resulting document
    Replay {
        /// JSON array of steps
        script: PathBuf,
        /// Initial document value
        #[arg(long)]
        value: Option<PathBuf>,
        /// Editor configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Text,
    Json,
}

/// One step of a replay script.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    /// Focuses a block (the first one by default) with the caret at its end.
    Focus {
        block: Option<String>,
        at: Option<usize>,
    },
    Type {
        text: String,
    },
    Press {
        key: String,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        ctrl: bool,
    },
    Paste {
        text: Option<String>,
        html: Option<String>,
        json: Option<String>,
    },
    SelectAll,
    Undo,
    Redo,
    Wait {
        ms: u64,
    },
}

#[derive(Serialize)]
struct Stats {
    blocks: usize,
    words: usize,
    characters: usize,
    types: BTreeMap<String, usize>,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Render { format, input } => render_command(*format, input.as_deref()),
        Commands::Normalize { input } => normalize_command(input.as_deref()),
        Commands::Stats { json, input } => stats_command(*json, input.as_deref()),
        Commands::Replay {
            script,
            value,
            config,
        } => replay_command(script, value.as_deref(), config.as_deref()),
    }
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blockdoc=warn"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn read_input(path: Option<&Path>) -> String {
    let result = match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).map(|_| buf)
        }
    };
    result.unwrap_or_else(|err| fail(err))
}

fn render_command(format: Format, input: Option<&Path>) {
    let doc = Document::from_value_lossy(&read_input(input));
    let output = match format {
        Format::Html => doc.to_html(),
        Format::Text => doc.to_plain_text(),
        Format::Json => doc.to_json_pretty(),
    };
    println!("{output}");
}

fn normalize_command(input: Option<&Path>) {
    let doc = Document::from_value_lossy(&read_input(input));
    println!("{}", doc.to_json_pretty());
}

fn stats_command(json: bool, input: Option<&Path>) {
    let doc = Document::from_value_lossy(&read_input(input));
    let mut types = BTreeMap::new();
    for block in doc.blocks() {
        *types.entry(block.block_type.key().to_string()).or_insert(0) += 1;
    }
    let text = doc.to_plain_text();
    let stats = Stats {
        blocks: doc.block_count(),
        words: text.split_whitespace().count(),
        characters: blockdoc::caret::grapheme_len(&text.replace('\n', "")),
        types,
    };

    if json {
        match serde_json::to_string_pretty(&stats) {
            Ok(output) => println!("{output}"),
            Err(err) => fail(err),
        }
        return;
    }
    println!("blocks: {}", stats.blocks);
    println!("words: {}", stats.words);
    println!("characters: {}", stats.characters);
    for block_type in BlockType::ALL {
        if let Some(count) = stats.types.get(block_type.key()) {
            println!("  {}: {count}", block_type.label());
        }
    }
}

fn replay_command(script: &Path, value: Option<&Path>, config: Option<&Path>) {
    let steps: Vec<Step> = serde_json::from_str(&read_input(Some(script)))
        .unwrap_or_else(|err| fail(format!("invalid script: {err}")));
    let config = match config {
        Some(path) => EditorConfig::from_json(&read_input(Some(path)))
            .unwrap_or_else(|err| fail(format!("invalid config: {err}"))),
        None => EditorConfig::default(),
    };
    let value = value.map(|path| read_input(Some(path))).unwrap_or_default();

    let clock = ManualClock::new();
    let mut editor = Editor::with_config(&value, config, |_| {}).with_clock(clock.clone());

    for (index, step) in steps.into_iter().enumerate() {
        tracing::debug!(index, ?step, "replaying step");
        match step {
            Step::Focus { block, at } => {
                let id = match block {
                    Some(id) => BlockId::new(id),
                    None => editor.document().blocks()[0].id.clone(),
                };
                let placement = at.map_or(CaretPlacement::End, CaretPlacement::Offset);
                if !editor.focus(&id, placement) {
                    fail(format!("step {index}: no block {id}"));
                }
            }
            Step::Type { text } => editor.type_text(&text),
            Step::Press { key, shift, ctrl } => {
                let key: Key = key
                    .parse()
                    .unwrap_or_else(|err| fail(format!("step {index}: {err}")));
                let modifiers = Modifiers {
                    shift,
                    ctrl,
                    ..Modifiers::NONE
                };
                editor.press(key, modifiers);
            }
            Step::Paste { text, html, json } => {
                editor.paste_into_focus(&ClipboardData { json, html, text });
            }
            Step::SelectAll => editor.select_all_blocks(),
            Step::Undo => {
                editor.undo();
            }
            Step::Redo => {
                editor.redo();
            }
            Step::Wait { ms } => clock.advance(Duration::from_millis(ms)),
        }
        editor.tick();
    }

    println!("{}", editor.document().to_json_pretty());
}

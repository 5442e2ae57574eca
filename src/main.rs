//! Feedmark command line
//!
//! Harvest links from a timeline, inspect the reading list, export it, or
//! serve it over MCP.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use feedmark::browser::BrowserConfig;
use feedmark::config::{self, ExtractorConfig};
use feedmark::error::StorageError;
use feedmark::mcp::{McpServer, ToolRegistry};
use feedmark::{preview, ReadingList};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Feedmark reading list harvester
#[derive(Parser, Debug)]
#[command(name = "feedmark")]
#[command(version)]
#[command(about = "Collect the links shared on an X (Twitter) timeline into a reading list")]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reading list file (default: $FEEDMARK_STORE or reading-list.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one extraction pass and save what it finds
    Extract {
        /// Timeline URL to open
        #[arg(long, conflicts_with = "html")]
        url: Option<String>,

        /// Saved timeline HTML file to read instead of a live page
        #[arg(long)]
        html: Option<PathBuf>,

        /// URL that relative links in --html resolve against
        #[arg(long, requires = "html")]
        base_url: Option<String>,

        /// DevTools endpoint of a running, signed-in browser
        #[arg(long, conflicts_with = "html")]
        attach: Option<String>,

        /// Path to Chrome/Chromium executable
        #[arg(long)]
        chrome_path: Option<String>,

        /// Show the browser window
        #[arg(long)]
        no_headless: bool,
    },

    /// Print every saved record as JSON
    List,

    /// Print a short preview of the list
    Preview,

    /// Write the list to a dated Markdown file
    Export {
        /// Directory for the Markdown file
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Remove every saved record
    Clear,

    /// Serve the reading list tools over MCP stdio
    Serve {
        /// DevTools endpoint of a running, signed-in browser
        #[arg(long)]
        attach: Option<String>,

        /// Path to Chrome/Chromium executable
        #[arg(long)]
        chrome_path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "feedmark=debug" } else { "feedmark=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout belongs to command output and MCP traffic
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let store_path = config::store_path(args.store);
    let mut list = ReadingList::open(&store_path)
        .with_context(|| format!("opening reading list {}", store_path.display()))?;

    match args.command {
        Command::Extract {
            url,
            html,
            base_url,
            attach,
            chrome_path,
            no_headless,
        } => {
            let registry = build_registry(list, attach, chrome_path, !no_headless)?;

            let mut call = json!({ "wait": true });
            if let Some(path) = html {
                let body = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                call["html"] = json!(body);
            }
            if let Some(url) = url {
                call["url"] = json!(url);
            }
            if let Some(base) = base_url {
                call["baseUrl"] = json!(base);
            }

            let result = registry.execute("extract_urls", call).await;
            registry.shutdown().await?;

            let text = result.first_text().unwrap_or_default();
            if result.is_error {
                bail!("{}", text);
            }

            let body: Value = serde_json::from_str(text)?;
            let report = &body["report"];
            println!(
                "Extracted {} URLs from {} posts",
                body["saved"], report["posts_found"]
            );
            if report["posts_found"] == json!(0) {
                println!("No posts found. Make sure the timeline has loaded.");
            }

            let store = registry.store();
            let list = store.read().await;
            print!("\n{}", preview::render(list.list_all()));
        }
        Command::List => {
            println!("{}", serde_json::to_string_pretty(list.list_all())?);
        }
        Command::Preview => {
            print!("{}", preview::render(list.list_all()));
        }
        Command::Export { out_dir } => match list.export() {
            Ok(doc) => {
                let path = doc
                    .write_to(&out_dir)
                    .with_context(|| format!("writing to {}", out_dir.display()))?;
                println!("Exported {} URLs to {}", doc.count, path.display());
            }
            Err(StorageError::Empty) => bail!("No URLs to export!"),
            Err(e) => return Err(e.into()),
        },
        Command::Clear => {
            let count = list.len();
            list.clear()?;
            println!("Cleared {} URLs", count);
        }
        Command::Serve {
            attach,
            chrome_path,
        } => {
            let server = McpServer::new(build_registry(list, attach, chrome_path, true)?);
            server.run().await?;
        }
    }

    Ok(())
}

fn build_registry(
    list: ReadingList,
    attach: Option<String>,
    chrome_path: Option<String>,
    headless: bool,
) -> anyhow::Result<ToolRegistry> {
    let mut browser = BrowserConfig::builder().headless(headless);
    if let Some(path) = chrome_path {
        browser = browser.chrome_path(path);
    }

    let mut registry = ToolRegistry::new(list)
        .with_extractor_config(ExtractorConfig::from_env()?)
        .with_browser_config(browser.build());
    if let Some(url) = attach {
        registry = registry.with_attach_url(url);
    }
    Ok(registry)
}

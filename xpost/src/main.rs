//! xpost - cross-post a markdown article to Dev.to and Hashnode

use std::collections::HashMap;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libxpost::events::{Event, EventBus, EventReceiver};
use libxpost::logging::LoggingConfig;
use libxpost::types::{ListOptions, PlatformPost};
use libxpost::{
    markdown, Config, DispatchReport, Dispatcher, Operation, PlatformRegistry, Post,
    PublishStatus, XpostError,
};
use tokio::task::JoinHandle;

#[derive(Parser, Debug)]
#[command(name = "xpost")]
#[command(version, about = "Cross-post markdown articles to Dev.to and Hashnode")]
#[command(long_about = r#"Cross-post markdown articles to Dev.to and Hashnode.

EXAMPLES:
    # Publish to every configured platform
    xpost post article.md

    # Only Dev.to, as a draft
    xpost post article.md --platform devto --draft

    # Update existing posts
    xpost update article.md --id devto=1234 --id hashnode=65a1f0

    # Remove a post
    xpost delete --id devto=1234

    # Inspect remote posts
    xpost get devto 1234
    xpost list hashnode --page 2 --per-page 10

    # Check credentials
    xpost auth

    # JSON output for scripting
    xpost --format json post article.md | jq '.results[] | select(.success == false)'

CONFIGURATION:
    ~/.config/xpost/config.toml (or XPOST_CONFIG / --config), plus the
    DEVTO_API_KEY, HASHNODE_TOKEN and HASHNODE_PUBLICATION_ID variables.

EXIT CODES:
    0 - Every platform succeeded
    1 - At least one platform failed, or a configuration error
    2 - Authentication failed
    3 - Invalid input (unreadable article, bad frontmatter, bad arguments)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(short, long, global = true, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Configuration file (defaults to ~/.config/xpost/config.toml)
    #[arg(long, global = true, env = "XPOST_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a post on every target platform
    Post {
        /// Markdown file with optional +++ TOML frontmatter
        file: PathBuf,

        /// Target specific platform(s) (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        platform: Vec<String>,

        /// Create drafts even if the frontmatter says published
        #[arg(short, long)]
        draft: bool,
    },

    /// Replace existing posts with the article's content
    Update {
        file: PathBuf,

        /// Remote post id per platform, as key=id (repeatable)
        #[arg(long = "id", value_name = "KEY=ID", required = true)]
        ids: Vec<String>,

        #[arg(short, long)]
        draft: bool,
    },

    /// Delete existing posts
    Delete {
        /// Remote post id per platform, as key=id (repeatable)
        #[arg(long = "id", value_name = "KEY=ID", required = true)]
        ids: Vec<String>,
    },

    /// Show one remote post
    Get {
        /// Platform key (devto, hashnode)
        platform: String,
        id: String,
    },

    /// List your posts on one platform
    List {
        platform: String,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "30")]
        per_page: u32,
    },

    /// Verify the credentials of every configured platform
    Auth,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    LoggingConfig::from_env(cli.verbose).init();

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<XpostError>()
                .map(XpostError::exit_code)
                .unwrap_or(1);
            process::exit(code);
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Parse repeated `key=id` arguments, keeping their order
fn parse_ids(raw: &[String]) -> libxpost::Result<(Vec<String>, HashMap<String, String>)> {
    let mut keys = Vec::new();
    let mut ids = HashMap::new();

    for pair in raw {
        let (key, id) = pair
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .ok_or_else(|| {
                XpostError::InvalidInput(format!("Expected KEY=ID for --id, got '{}'", pair))
            })?;
        if ids.insert(key.to_string(), id.to_string()).is_none() {
            keys.push(key.to_string());
        }
    }

    Ok((keys, ids))
}

fn read_article(file: &PathBuf, draft: bool) -> Result<Post> {
    let mut post = markdown::parse_file(file)?;
    if draft {
        post.publish_status = PublishStatus::Draft;
    }
    Ok(post)
}

/// Print per-platform progress to stderr as a dispatch runs
fn spawn_progress(mut events: EventReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::DispatchStarted {
                    operation,
                    platforms,
                } => eprintln!("{} on {}...", operation, platforms.join(", ")),
                Event::PlatformCompleted {
                    platform,
                    success: true,
                    ..
                } => eprintln!("  {} done", platform),
                Event::PlatformCompleted {
                    platform, error, ..
                } => eprintln!(
                    "  {} failed: {}",
                    platform,
                    error.unwrap_or_default()
                ),
                Event::DispatchCompleted { .. } => {}
            }
        }
    })
}

async fn run(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config.as_ref())?;
    let registry = PlatformRegistry::from_config(&config)?;
    tracing::debug!("Configured platforms: {:?}", registry.keys());
    let json = cli.format == "json";

    // Progress is shown for verbose text output only
    let (dispatcher, progress) = if cli.verbose && !json {
        let bus = EventBus::new(32);
        let progress = spawn_progress(bus.subscribe());
        (Dispatcher::new(registry).with_event_bus(bus), Some(progress))
    } else {
        (Dispatcher::new(registry), None)
    };

    let code = execute(cli.command, &dispatcher, &config, json).await;

    // Dropping the dispatcher closes the bus and lets the printer drain
    drop(dispatcher);
    if let Some(progress) = progress {
        progress.await.ok();
    }
    code
}

async fn execute(
    command: Command,
    dispatcher: &Dispatcher,
    config: &Config,
    json: bool,
) -> Result<i32> {
    match command {
        Command::Post {
            file,
            platform,
            draft,
        } => {
            let post = read_article(&file, draft)?;
            let targets = if !platform.is_empty() {
                Some(platform)
            } else if !config.defaults.platforms.is_empty() {
                Some(config.defaults.platforms.clone())
            } else {
                None
            };

            let report = dispatcher
                .dispatch(&post, targets.as_deref(), &Operation::Create)
                .await;
            print_report(&report, json)
        }
        Command::Update { file, ids, draft } => {
            let post = read_article(&file, draft)?;
            let (keys, ids) = parse_ids(&ids)?;

            let report = dispatcher
                .dispatch(&post, Some(keys.as_slice()), &Operation::Update { ids })
                .await;
            print_report(&report, json)
        }
        Command::Delete { ids } => {
            let (keys, ids) = parse_ids(&ids)?;
            // Delete ignores the post body
            let placeholder = Post::new(String::new(), String::new());

            let report = dispatcher
                .dispatch(&placeholder, Some(keys.as_slice()), &Operation::Delete { ids })
                .await;
            print_report(&report, json)
        }
        Command::Get { platform, id } => {
            let post = dispatcher.get_on(&platform, &id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&post)?);
            } else {
                print_post(&post, true);
            }
            Ok(0)
        }
        Command::List {
            platform,
            page,
            per_page,
        } => {
            if page == 0 || per_page == 0 {
                return Err(XpostError::InvalidInput(
                    "--page and --per-page must be at least 1".to_string(),
                )
                .into());
            }
            let posts = dispatcher
                .list_on(&platform, &ListOptions { page, per_page })
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else if posts.is_empty() {
                println!("No posts on page {}", page);
            } else {
                for post in &posts {
                    print_post(post, false);
                }
            }
            Ok(0)
        }
        Command::Auth => {
            if dispatcher.registry().is_empty() {
                eprintln!("No platforms configured. Add a [devto] or [hashnode] section to your config.");
                return Ok(1);
            }

            let status = dispatcher.authenticate_all().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                for (platform, ok) in &status {
                    let mark = if *ok { "✓" } else { "✗" };
                    println!("{} {}", mark, platform);
                }
            }
            Ok(if status.values().all(|ok| *ok) { 0 } else { 2 })
        }
    }
}

fn print_report(report: &DispatchReport, json: bool) -> Result<i32> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        for result in report.results() {
            match (result.error(), result.platform_post()) {
                (Some(error), _) => println!("✗ {}: {}", result.platform, error),
                (None, Some(post)) => println!(
                    "✓ {}: {}",
                    result.platform,
                    post.platform_url.as_deref().unwrap_or(&post.platform_id)
                ),
                (None, None) => println!(
                    "✓ {}: deleted {}",
                    result.platform,
                    result.platform_id().unwrap_or_default()
                ),
            }
        }
        println!(
            "{}/{} platform(s) succeeded",
            report.successful(),
            report.total()
        );
    }

    Ok(if report.all_succeeded() { 0 } else { 1 })
}

fn print_post(post: &PlatformPost, detailed: bool) {
    println!("{} [{}] {}", post.platform_id, post.publish_status, post.title);
    if !detailed {
        return;
    }
    if let Some(url) = &post.platform_url {
        println!("  url:      {}", url);
    }
    if !post.tags.is_empty() {
        println!("  tags:     {}", post.tags.join(", "));
    }
    if let Some(published_at) = post.published_at {
        println!("  published {}", published_at.to_rfc3339());
    }
    println!(
        "  views: {}  likes: {}  comments: {}",
        post.stats.views, post.stats.likes, post.stats.comments
    );
}

//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use awesomehub_core::{
    AttributesResolver, CategoryNode, EntryCache, List, ProcessorRegistry, ProgressReporter,
    ResolverRegistry,
};
use awesomehub_shared::{AppConfig, ListDefinition, expand_home, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// AwesomeHub: curate categorized lists from configurable sources.
#[derive(Parser)]
#[command(
    name = "awesomehub",
    version,
    about = "Build deduplicated, categorized and resolved lists from list definitions.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Process and resolve a list definition, writing the result as JSON.
    Build {
        /// Path to the list definition JSON file.
        list: PathBuf,

        /// Output directory (defaults to the configured output dir).
        #[arg(short, long)]
        out: Option<String>,

        /// Bypass the resolver cache.
        #[arg(long)]
        force: bool,

        /// Stop after processing; do not resolve entries.
        #[arg(long)]
        no_resolve: bool,
    },

    /// Process a list definition and print its category tree.
    Categories {
        /// Path to the list definition JSON file.
        list: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "awesomehub=info",
        1 => "awesomehub=debug",
        _ => "awesomehub=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            list,
            out,
            force,
            no_resolve,
        } => cmd_build(&list, out.as_deref(), force, no_resolve),
        Command::Categories { list } => cmd_categories(&list),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Load a definition and the processors able to read its sources.
fn load_list(path: &Path) -> Result<(List, ProcessorRegistry)> {
    let definition = ListDefinition::load(path)?;
    let list = List::new(definition)?;

    // Relative include paths resolve against the definition's directory.
    let include_root = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok((list, ProcessorRegistry::with_builtins(include_root)))
}

fn cmd_build(path: &Path, out: Option<&str>, force: bool, no_resolve: bool) -> Result<()> {
    let config = load_config()?;
    let (mut list, processors) = load_list(path)?;
    info!(list = %list.id(), path = %path.display(), "building list");

    let progress = CliProgress::new();
    let processed = list.process(&processors, &progress)?;

    let resolved = if no_resolve {
        None
    } else {
        let resolvers = build_resolvers(&config)?;
        let force = force || config.resolve.force;
        Some(list.resolve(&resolvers, force, &progress)?)
    };

    let out_dir = expand_home(out.unwrap_or(&config.output.dir))?;
    std::fs::create_dir_all(&out_dir)
        .map_err(|e| eyre!("cannot create output directory '{}': {e}", out_dir.display()))?;
    let out_path = out_dir.join(format!("{}.json", list.id()));

    let output = list.output();
    let json = if config.output.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    std::fs::write(&out_path, json)
        .map_err(|e| eyre!("cannot write '{}': {e}", out_path.display()))?;

    println!();
    println!("  List built successfully!");
    println!("  ID:         {}", list.id());
    println!("  Entries:    {}", list.entries().len());
    println!("  Categories: {}", list.categories().len());
    println!("  Processed:  {} entry(s)", processed.entries);
    if let Some(stats) = resolved {
        println!(
            "  Resolved:   {}/{} ({} cached)",
            stats.resolved, stats.total, stats.cached
        );
    }
    println!("  Output:     {}", out_path.display());
    println!();

    Ok(())
}

fn build_resolvers(config: &AppConfig) -> Result<ResolverRegistry> {
    let cache_dir = expand_home(&config.resolve.cache_dir)?;
    let cache = EntryCache::open(cache_dir, config.resolve.cache_ttl_secs)?;
    Ok(ResolverRegistry::new().with(AttributesResolver::new(
        cache,
        config.resolve.required_attributes.clone(),
    )))
}

fn cmd_categories(path: &Path) -> Result<()> {
    let (mut list, processors) = load_list(path)?;
    let progress = CliProgress::new();
    list.process(&processors, &progress)?;

    let mut lines = Vec::new();
    render_tree(&list.categories().tree(), 0, &mut lines);
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn render_tree(nodes: &[CategoryNode], depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        lines.push(format!(
            "{}{} ({}) [{}]",
            "  ".repeat(depth),
            node.title,
            node.count,
            node.path
        ));
        render_tree(&node.children, depth + 1, lines);
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner per phase.
struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn with_spinner(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        if let Ok(mut guard) = self.spinner.lock() {
            f(&mut guard);
        }
    }
}

impl ProgressReporter for CliProgress {
    fn start(&self, phase: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.set_message(phase.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.with_spinner(|slot| {
            if let Some(previous) = slot.replace(spinner) {
                previous.finish_and_clear();
            }
        });
    }

    fn update(&self, message: &str) {
        self.with_spinner(|slot| {
            if let Some(spinner) = slot {
                spinner.set_message(message.to_string());
            }
        });
    }

    fn end(&self) {
        self.with_spinner(|slot| {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        });
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use awesomehub_core::CategoryTree;
    use std::collections::BTreeMap;

    #[test]
    fn cli_parses_build_flags() {
        let cli = Cli::parse_from(["awesomehub", "-v", "build", "lists/awesome.json", "--force"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Build {
                list,
                force,
                no_resolve,
                out,
            } => {
                assert_eq!(list, PathBuf::from("lists/awesome.json"));
                assert!(force);
                assert!(!no_resolve);
                assert!(out.is_none());
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn render_tree_indents_children() {
        let mut tree = CategoryTree::new();
        let count = BTreeMap::from([("all".to_string(), 1), ("x".to_string(), 1)]);
        tree.insert("Tools/CLI", &count);

        let mut lines = Vec::new();
        render_tree(&tree.tree(), 0, &mut lines);
        assert_eq!(lines, vec!["Tools (1) [tools]", "  CLI (1) [tools/cli]"]);
    }
}

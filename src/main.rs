use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tag_policy::config::PolicyConfig;
use tag_policy::policy::{Alphabetical, Policy, SemVer, TagPolicy, TagPrefixMatcher};

#[derive(Parser)]
#[command(name = "tag-policy")]
#[command(version, about = "Select the latest tag from a list using a version policy")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the latest tag according to a policy
    Latest(LatestArgs),
    /// Validate a policy configuration file
    Check {
        /// JSON policy configuration file
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("policy")
        .required(true)
        .args(["config", "semver", "alphabetical"])
))]
struct LatestArgs {
    /// JSON policy configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Semver range the selected tag must satisfy
    #[arg(long)]
    semver: Option<String>,

    /// Order tags alphabetically: --alphabetical or --alphabetical=desc
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "")]
    alphabetical: Option<String>,

    /// Only consider tags starting with this prefix (repeatable; added to the config's include list)
    #[arg(long)]
    include: Vec<String>,

    /// Ignore tags starting with this prefix (repeatable; added to the config's exclude list)
    #[arg(long)]
    exclude: Vec<String>,

    /// Strip include prefixes before parsing versions (also enables the config's trim)
    #[arg(long)]
    trim: bool,

    /// Tags to choose from; read from stdin, one per line, when omitted
    tags: Vec<String>,
}

impl LatestArgs {
    /// Extend `base` with the prefix flags; `None` when neither sets anything
    fn merge_matcher(&self, base: Option<TagPrefixMatcher>) -> Option<TagPrefixMatcher> {
        if self.include.is_empty() && self.exclude.is_empty() && !self.trim {
            return base;
        }
        let mut matcher = base.unwrap_or_default();
        matcher.include.extend(self.include.iter().cloned());
        matcher.exclude.extend(self.exclude.iter().cloned());
        matcher.trim |= self.trim;
        Some(matcher)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Latest(args) => {
            let latest = run_latest(args)?;
            println!("{latest}");
        }
        Command::Check { config } => {
            load_config(&config)?.policy.build()?;
            println!("{}: ok", config.display());
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_latest(args: LatestArgs) -> anyhow::Result<String> {
    let (policy, matcher) = if let Some(path) = &args.config {
        let config = load_config(path)?;
        (config.policy.build()?, args.merge_matcher(config.filter_tags))
    } else if let Some(range) = &args.semver {
        (Policy::from(SemVer::new(range)?), args.merge_matcher(None))
    } else {
        let order = args.alphabetical.as_deref().unwrap_or_default();
        (Policy::from(Alphabetical::new(order)?), args.merge_matcher(None))
    };

    let tags = if args.tags.is_empty() {
        read_tags(io::stdin().lock())?
    } else {
        args.tags
    };
    debug!(count = tags.len(), ?policy, "evaluating tags");

    Ok(policy.latest(&tags, matcher.as_ref())?)
}

fn load_config(path: &Path) -> anyhow::Result<PolicyConfig> {
    PolicyConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

fn read_tags(reader: impl BufRead) -> io::Result<Vec<String>> {
    let mut tags = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let tag = line.trim();
        if !tag.is_empty() {
            tags.push(tag.to_string());
        }
    }
    Ok(tags)
}

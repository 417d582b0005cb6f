use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use plugin_env::resolver::FixedGlobalModules;
use plugin_env::{Context, Env, EnvConfig, EnvFactory, Options};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

/// Inspect how module references resolve
#[derive(Parser)]
#[command(name = "penv")]
#[command(about = "Resolve module references into envs", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Global module root, overriding the npm prefix lookup
    #[arg(long, global = true)]
    global_root: Option<PathBuf>,

    /// Host namespace used as the first namespace segment
    #[arg(long, default_value = "base", global = true)]
    namespace: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a reference and print the derived fields
    Resolve {
        /// Path, directory or `npm:` reference
        reference: String,

        /// Explicit env name
        #[arg(long)]
        name: Option<String>,

        /// Directory relative references resolve against
        #[arg(long)]
        base: Option<PathBuf>,

        /// Print a JSON summary instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    plugin_env::logging::init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => EnvConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let mut config = EnvConfig::default();
            config.merge_env_vars();
            config
        }
    };
    if let Some(root) = cli.global_root {
        config.global_modules = Some(root);
    }
    debug!("Using config: {:?}", config);

    let Commands::Resolve {
        reference,
        name,
        base,
        json,
    } = cli.command;

    let mut builder = EnvFactory::builder(Context::new(cli.namespace)).config(config.clone());
    if let Some(root) = config.global_modules {
        builder = builder.global_modules(Arc::new(FixedGlobalModules::new(root)));
    }
    if let Some(base) = base {
        builder = builder.options(Options::new().base(base));
    }
    let factory = builder.build()?;

    // The reference always goes positionally so it is never read as a name
    let env = match name {
        Some(name) => factory.create_env((name, reference))?,
        None => factory.create_env(reference)?,
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&env.summary())?);
    } else {
        print_env(&env);
    }

    Ok(())
}

fn print_env(env: &Env) {
    let summary = env.summary();
    println!("{}", env.inspect());
    println!("  name:       {}", summary.name);
    println!("  alias:      {}", summary.alias);
    println!("  namespace:  {}", summary.namespace);
    println!("  is_default: {}", summary.is_default);
    if let Some(path) = &summary.path {
        println!("  path:       {}", path.display());
    }
    if let Some(relative) = &summary.relative {
        println!("  relative:   {}", relative.display());
    }
    if let Some(pkg_path) = &summary.pkg_path {
        println!("  pkg_path:   {}", pkg_path.display());
    }
    if let Some(version) = summary.pkg.version() {
        println!("  version:    {}", version);
    }
    println!("  exists:     {}", summary.stat.exists);
}

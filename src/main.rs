//! silo - package lifecycle engine CLI

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use silo::ops;
use silo::paths::Paths;

#[derive(Parser)]
#[command(name = "silo")]
#[command(author, version, about = "silo - a sandboxed, versioned package manager")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the package index from the remote catalogue
    Refresh {
        /// Index document URL
        #[arg(long, env = "SILO_INDEX_URL")]
        url: Option<String>,
    },
    /// Install one or more packages
    Install {
        /// Package spec(s): name or name=version
        #[arg(required = true)]
        specs: Vec<String>,
    },
    /// Remove an installed package
    Remove {
        /// Package spec: name or name=version
        spec: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Update installed packages to their newest index versions
    Update,
    /// Point a package's current link at an installed version
    Switch { package: String, version: String },
    /// Upgrade the engine itself
    Upgrade,
    /// Run a declared binary inside its sandbox
    Run {
        /// Package spec: name or name=version
        spec: String,
        /// Declared binary name
        binary: String,
        /// Arguments passed through to the binary
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Pack the working directory into a package archive
    Build {
        /// Archive name (produces <name>.archive)
        name: String,
    },
    /// Search the index
    Search { query: String },
    /// Show index details for a package
    Info { package: String },
    /// List installed packages
    List,
    /// Delete cached archives and stale staging directories
    Clean,
    /// Pin an installed version against updates
    Pin { package: String, version: String },
    /// Clear the pin on the published version
    Unpin { package: String },
    /// Show packages with a newer index version
    Outdated,
    /// Check a package's artifact against its recorded digest
    Verify { package: String },
    /// Print the resolved install plan for a package
    Deps {
        /// Package spec: name or name=version
        spec: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = Paths::from_env();

    let result = match cli.command {
        Commands::Refresh { url } => ops::refresh::refresh(&paths, url.as_deref()),
        Commands::Install { specs } => ops::install::install(&paths, &specs),
        Commands::Remove { spec, yes } => ops::remove::remove(&paths, &spec, yes),
        Commands::Update => ops::update::update(&paths),
        Commands::Switch { package, version } => ops::switch::switch(&paths, &package, &version),
        Commands::Upgrade => ops::upgrade::upgrade(&paths),
        Commands::Run { spec, binary, args } => {
            match ops::run::run(&paths, &spec, &binary, &args) {
                // The sandboxed program's exit status is the caller's.
                Ok(status) => std::process::exit(status),
                Err(err) => Err(err),
            }
        }
        Commands::Build { name } => ops::build::build(&name),
        Commands::Search { query } => ops::query::search(&paths, &query),
        Commands::Info { package } => ops::query::info(&paths, &package),
        Commands::List => ops::query::list(&paths),
        Commands::Clean => ops::clean::clean(&paths),
        Commands::Pin { package, version } => ops::switch::pin(&paths, &package, &version),
        Commands::Unpin { package } => ops::switch::unpin(&paths, &package),
        Commands::Outdated => ops::update::outdated(&paths),
        Commands::Verify { package } => ops::verify::verify(&paths, &package),
        Commands::Deps { spec } => ops::query::deps(&paths, &spec),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

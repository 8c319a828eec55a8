use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use eidx::registry::{
    IdentifierMetadata, IdentifierRegistry, RegistryState, SearchOptions, SortBy,
};
use eidx::{output, utils};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "eidx")]
#[command(about = "In-memory discovery index for hierarchical event identifiers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the registry snapshot file
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load identifier records from a JSON file
    Load {
        /// JSON file holding an array of identifier records
        file: PathBuf,

        /// Discard existing records instead of merging
        #[arg(long)]
        replace: bool,
    },
    /// Search identifiers (omit the query to browse everything)
    Search {
        query: Option<String>,

        /// Only show identifiers in this namespace
        #[arg(short, long)]
        namespace: Option<String>,

        /// Only show identifiers in this group
        #[arg(short, long)]
        group: Option<String>,

        /// Sort order for results
        #[arg(short, long, value_enum, default_value_t = SortArg::Frequency)]
        sort: SortArg,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Show the hottest identifiers
    Hot {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Show recently used identifiers
    Recent {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the namespace hierarchy
    Tree,
    /// Record a usage of one or more identifiers
    Touch {
        /// Identifier ids to mark as used
        ids: Vec<String>,
    },
    /// Show registry statistics
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Frequency,
    Alpha,
    Recent,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Frequency => SortBy::Frequency,
            SortArg::Alpha => SortBy::Alphabetical,
            SortArg::Recent => SortBy::Recent,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let state_path = match cli.state {
        Some(path) => path,
        None => utils::default_state_path()?,
    };
    let color = !cli.no_color;

    match cli.command {
        Commands::Load { file, replace } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let records: Vec<IdentifierMetadata> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse records from {}", file.display()))?;
            let count = records.len();

            let mut reg = load_registry(&state_path);
            if replace {
                reg.initialize(records);
            } else {
                reg.insert_many(records);
            }
            reg.export_state().save_to(&state_path)?;
            println!("Loaded {} records ({} total)", count, reg.len());
        }
        Commands::Search {
            query,
            namespace,
            group,
            sort,
            limit,
        } => {
            let reg = load_registry(&state_path);
            let options = SearchOptions {
                limit,
                filter_by_namespace: namespace,
                filter_by_group: group,
                sort_by: sort.into(),
            };
            let hits = reg.search(query.as_deref().unwrap_or(""), &options);
            if hits.is_empty() {
                println!("No matches");
            } else {
                output::print_suggestions(&hits, color)?;
            }
        }
        Commands::Hot { limit } => {
            let reg = load_registry(&state_path);
            output::print_hot(&reg.get_hot(limit), color)?;
        }
        Commands::Recent { limit } => {
            let reg = load_registry(&state_path);
            output::print_recent(&reg.get_recent(limit), color)?;
        }
        Commands::Tree => {
            let reg = load_registry(&state_path);
            output::print_hierarchy(&reg.get_hierarchy(), color)?;
        }
        Commands::Touch { ids } => {
            let mut reg = load_registry(&state_path);
            for id in &ids {
                reg.record_usage(id);
            }
            reg.export_state().save_to(&state_path)?;
            println!("Recorded {} usages ({} identifiers known)", ids.len(), reg.len());
        }
        Commands::Stats => {
            let reg = load_registry(&state_path);
            output::print_stats(&reg.stats())?;
        }
    }

    Ok(())
}

/// Load the registry from the snapshot file, falling back to an empty
/// registry when the file is missing or unreadable. Malformed state is
/// recoverable: a warning, never a crash.
fn load_registry(path: &Path) -> IdentifierRegistry {
    if !path.exists() {
        return IdentifierRegistry::new();
    }
    let loaded = RegistryState::load_from(path)
        .and_then(|state| IdentifierRegistry::from_state(state).map_err(Into::into));
    match loaded {
        Ok(reg) => reg,
        Err(err) => {
            eprintln!(
                "warning: ignoring unreadable state file {}: {err:#}",
                path.display()
            );
            IdentifierRegistry::new()
        }
    }
}

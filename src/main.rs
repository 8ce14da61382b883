use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dirsearch::context::DirectoryContext;
use dirsearch::index::source_for;
use dirsearch::output::{self, HtmlPresenter};
use dirsearch::storage::{FileStore, SaveOutcome};
use dirsearch::utils::{self, EngineConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dirsearch")]
#[command(about = "Faceted search and autocomplete over a directory index")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Index location (file path, or URL with the `http` feature)
    #[arg(short, long, global = true)]
    index: Option<String>,

    /// Config file (defaults to the app data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for saved searches (defaults to the app data directory)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorMode {
    Auto,
    Never,
}

#[derive(clap::Args)]
struct FacetArgs {
    /// Free-text query
    #[arg(default_value = "")]
    query: String,

    #[arg(long, default_value = "")]
    category: String,

    #[arg(long, default_value = "")]
    location: String,

    /// Entity type
    #[arg(long = "type", default_value = "")]
    entity_type: String,

    /// Minimum rating; unusable values mean no constraint
    #[arg(long, default_value = "")]
    min_rating: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter and sort the directory
    Search {
        #[command(flatten)]
        facets: FacetArgs,

        /// Sort key: name, rating or location
        #[arg(long, default_value = "name")]
        sort: String,

        /// Print result cards as HTML
        #[arg(long)]
        html: bool,
    },
    /// Autocomplete suggestions for partial input
    Suggest {
        query: String,
    },
    /// Show directory statistics
    Stats,
    /// Saved-search history
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },
    /// Interactive search (TUI)
    #[cfg(feature = "interactive")]
    Interactive {
        /// Initial query
        query: Option<String>,
    },
}

#[derive(Subcommand)]
enum SavedAction {
    /// List saved searches, newest first
    List,
    /// Save a search
    Add {
        #[command(flatten)]
        facets: FacetArgs,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal; logging there would corrupt the screen
    #[cfg(feature = "interactive")]
    let interactive = matches!(cli.command, Commands::Interactive { .. });
    #[cfg(not(feature = "interactive"))]
    let interactive = false;
    if !interactive {
        init_logging(cli.verbose);
    }

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::load()?,
    };
    if let Some(index) = &cli.index {
        config.index_location = index.clone();
    }

    let store = match &cli.storage_dir {
        Some(dir) => FileStore::new(dir),
        None => utils::default_file_store()?,
    };
    let color = matches!(cli.color, ColorMode::Auto);
    let location = config.index_location.clone();
    let mut ctx = DirectoryContext::new(config, store);

    match cli.command {
        Commands::Search { facets, sort, html } => {
            load(&mut ctx, &location)?;
            apply_facets(&mut ctx, &facets)?;
            ctx.set_sort_input(&sort)?;

            if html {
                let mut presenter = HtmlPresenter::new();
                ctx.present(&mut presenter);
                println!("{}", presenter.into_html());
            } else {
                output::print_results(ctx.results(), color)?;
            }
        }
        Commands::Suggest { query } => {
            load(&mut ctx, &location)?;
            output::print_suggestions(&ctx.suggest(&query)?, color)?;
        }
        Commands::Stats => {
            load(&mut ctx, &location)?;
            let index = ctx.index()?;
            output::print_stats(&index.stats(), index.generated_at.as_deref(), color)?;
        }
        Commands::Saved { action } => match action {
            SavedAction::List => {
                output::print_saved_searches(ctx.saved_searches(), color)?;
            }
            SavedAction::Add { facets } => {
                load(&mut ctx, &location)?;
                apply_facets(&mut ctx, &facets)?;
                match ctx.save_search() {
                    SaveOutcome::Saved { len } => println!("Saved ({} in history)", len),
                    SaveOutcome::SkippedEmptyQuery => bail!("Refusing to save an empty query"),
                    SaveOutcome::Unavailable(reason) => bail!("Could not save search: {}", reason),
                }
            }
        },
        #[cfg(feature = "interactive")]
        Commands::Interactive { query } => {
            dirsearch::tui::run(ctx, location, query)?;
        }
    }

    Ok(())
}

fn load(ctx: &mut DirectoryContext<FileStore>, location: &str) -> Result<()> {
    let source = source_for(location);
    ctx.load_index(source.as_ref())
        .with_context(|| format!("Failed to load index from {}", location))?;
    Ok(())
}

fn apply_facets(ctx: &mut DirectoryContext<FileStore>, facets: &FacetArgs) -> Result<()> {
    ctx.submit_query(&facets.query)?;
    ctx.set_category(&facets.category)?;
    ctx.set_location(&facets.location)?;
    ctx.set_entity_type(&facets.entity_type)?;
    ctx.set_min_rating_input(&facets.min_rating)?;
    Ok(())
}

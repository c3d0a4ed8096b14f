//! curator CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use curator::{
    commands::{
        cmd_chunk, cmd_embed, cmd_eval, cmd_init, cmd_load, cmd_query, cmd_reset, cmd_status,
        print_chunk_stats, print_embed_report, print_eval_report, print_load_stats,
        print_query_results, print_status,
    },
    config::Config,
    embed::create_embedder,
    error::Result,
    store::QdrantStore,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "curator")]
#[command(version, about = "Hybrid retrieval (RAG) over document corpora", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize curator configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Split a documents JSONL file into overlapping chunks
    Chunk {
        /// Input documents JSONL ({id, source, content} per line)
        input: PathBuf,

        /// Output chunks JSONL (defaults to the configured chunks file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Embed chunks (resumable; re-runs skip already-embedded chunks)
    Embed {
        /// Chunks JSONL (defaults to the configured chunks file)
        #[arg(long)]
        chunks: Option<PathBuf>,

        /// Embedded-chunks JSONL (defaults to the configured store file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upsert embedded chunks into the Qdrant collection
    Load {
        /// Embedded-chunks JSONL (defaults to the configured store file)
        #[arg(long)]
        embedded: Option<PathBuf>,
    },

    /// Drop and recreate the collection (destructive)
    Reset,

    /// Run a hybrid query against the index
    Query {
        /// The search query
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Evaluate retrieval quality (Hit-Rate@k, vector vs hybrid)
    Eval {
        /// Labeled query set JSONL ({query, answer_id} per line)
        eval_file: PathBuf,

        /// Rank cutoff k
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Show system status
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Handle init command specially (doesn't need existing config)
    if let Commands::Init { force } = cli.command {
        let base_dir = cli.config.as_ref().and_then(|p| {
            if p.extension().is_some() {
                p.parent().map(PathBuf::from)
            } else {
                Some(p.clone())
            }
        });
        let config = cmd_init(base_dir, force).await?;
        println!("✓ curator initialized successfully");
        println!("  Config: {}", config.paths.config_file.display());
        println!("\nNext steps:");
        println!("  1. Edit the config file to customize settings");
        println!("  2. Start Qdrant: docker run -p 6333:6333 -p 6334:6334 qdrant/qdrant");
        println!("  3. Chunk docs: curator chunk /path/to/docs.jsonl");
        return Ok(());
    }

    // Handle completions command (doesn't need config/store)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "curator", &mut std::io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = load_config(cli.config.clone())?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Chunk { input, output } => {
            let output = output.unwrap_or_else(|| config.paths.chunks_file.clone());
            let stats = cmd_chunk(&config, &input, &output)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_chunk_stats(&stats);
            }
        }

        Commands::Embed { chunks, output } => {
            let chunks = chunks.unwrap_or_else(|| config.paths.chunks_file.clone());
            let output = output.unwrap_or_else(|| config.paths.embedded_file.clone());

            let embedder = create_embedder(&config.embedding, config.embedding_api_key())?;
            let report = cmd_embed(&config, embedder.as_ref(), &chunks, &output).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_embed_report(&report);
            }
        }

        Commands::Load { embedded } => {
            let embedded = embedded.unwrap_or_else(|| config.paths.embedded_file.clone());
            let store = QdrantStore::connect(&config).await?;
            let stats = cmd_load(&store, &embedded).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_load_stats(&stats);
            }
        }

        Commands::Reset => {
            let store = QdrantStore::connect(&config).await?;
            cmd_reset(&store).await?;
            println!("✓ Collection '{}' recreated", config.collection_name);
        }

        Commands::Query { query, limit } => {
            let k = limit.unwrap_or(config.query.top_k);
            let store = QdrantStore::connect(&config).await?;
            let embedder = create_embedder(&config.embedding, config.embedding_api_key())?;

            match cmd_query(embedder.as_ref(), &store, &query, k).await {
                Ok(output) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&output)?);
                    } else {
                        print_query_results(&output);
                    }
                }
                Err(curator::Error::Retrieval(e)) => {
                    // A failed query gets an explicit "no answer", not a crash.
                    eprintln!("Retrieval failed: {}", e);
                    println!("No relevant documents found.");
                }
                Err(e) => return Err(e),
            }
        }

        Commands::Eval { eval_file, k } => {
            let k = k.unwrap_or(config.query.top_k);
            let store = QdrantStore::connect(&config).await?;
            let embedder = create_embedder(&config.embedding, config.embedding_api_key())?;

            let report = cmd_eval(embedder.as_ref(), &store, &eval_file, k).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_eval_report(&report);
            }
        }

        Commands::Status => {
            let store = QdrantStore::connect(&config).await?;
            let status = cmd_status(&config, &store).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(p) if p.extension().map_or(false, |e| e == "toml") => Config::load(&p),
        Some(p) => Config::load_from(Some(p)),
        None => Config::load_from(None),
    }
}

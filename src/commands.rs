//! Command handlers for the mnemon CLI.

use std::process::ExitCode;

use mnemon::{Config, Embedder, Error, MemoryStore};

use crate::output::*;

/// Commands supported by the mnemon CLI.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Store one memory per argument
    Add {
        /// Memory texts
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Find the closest memories to a query
    Search {
        /// Search query text
        query: String,

        /// Maximum number of results (default: from config)
        #[arg(short = 'l', long)]
        limit: Option<usize>,
    },
    /// Delete every memory closer to the query than a distance threshold
    Forget {
        /// Query text
        query: String,

        /// Cosine distance below which memories are deleted (default: from config)
        #[arg(short = 's', long)]
        score_limit: Option<f64>,

        /// Records examined per deletion round (default: from config)
        #[arg(short = 'b', long)]
        batch_size: Option<usize>,
    },
    /// Show one memory
    Get {
        /// Memory ID
        id: String,
    },
    /// Delete memories by ID
    Delete {
        /// Memory IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Count memories in the collection
    Count,
    /// List memories, newest first
    List {
        /// Maximum number of results
        #[arg(short = 'l', long, default_value = "10")]
        limit: usize,
    },
    /// Print the mnemon version
    Version,
}

/// Execute a CLI command.
pub fn execute<E: Embedder>(
    command: &Commands,
    store: &mut MemoryStore<E>,
    config: &Config,
    json: bool,
) -> Result<ExitCode, Error> {
    match command {
        Commands::Add { texts } => handle_add(store, texts, json),
        Commands::Search { query, limit } => {
            handle_search(store, query, limit.unwrap_or(config.search_limit), json)
        }
        Commands::Forget {
            query,
            score_limit,
            batch_size,
        } => handle_forget(
            store,
            query,
            score_limit.unwrap_or(config.score_limit),
            batch_size.unwrap_or(config.batch_size),
            json,
        ),
        Commands::Get { id } => handle_get(store, id, json),
        Commands::Delete { ids } => handle_delete(store, ids, json),
        Commands::Count => handle_count(store, json),
        Commands::List { limit } => handle_list(store, *limit, json),
        Commands::Version => handle_version(json),
    }
}

fn handle_add<E: Embedder>(
    store: &mut MemoryStore<E>,
    texts: &[String],
    json: bool,
) -> Result<ExitCode, Error> {
    let ids = store.insert(texts)?;
    if json {
        print_json(&AddResponse {
            status: "added".to_string(),
            ids,
        })?;
    } else {
        for id in ids {
            println!("Added memory: {id}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_search<E: Embedder>(
    store: &mut MemoryStore<E>,
    query: &str,
    limit: usize,
    json: bool,
) -> Result<ExitCode, Error> {
    let results = store.search(query, limit)?;
    if json {
        print_json(&SearchResponse { results })?;
    } else {
        for hit in results {
            println!("{} [distance: {:.3}]\n  {}\n", hit.id, hit.distance, hit.text);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_forget<E: Embedder>(
    store: &mut MemoryStore<E>,
    query: &str,
    score_limit: f64,
    batch_size: usize,
    json: bool,
) -> Result<ExitCode, Error> {
    let deleted = store.delete_by_threshold(query, score_limit, batch_size)?;
    if json {
        print_json(&ForgetResponse {
            status: "forgotten".to_string(),
            deleted,
            score_limit,
        })?;
    } else {
        println!("Forgot {deleted} memories (distance < {score_limit})");
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_get<E: Embedder>(
    store: &MemoryStore<E>,
    id: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let Some(memory) = store.get(id)? else {
        if json {
            print_json(&ErrorResponse {
                error: Error::NotFound(id.to_string()).to_string(),
            })?;
        } else {
            eprintln!("Memory not found: {id}");
        }
        return Ok(ExitCode::from(2));
    };

    if json {
        let dimensions = memory.embedding.len();
        print_json(&GetResponse { memory, dimensions })?;
    } else {
        println!("ID: {}", memory.id);
        println!("Text: {}", memory.text);
        println!("Dimensions: {}", memory.embedding.len());
        println!("Created: {}", memory.created_at);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_delete<E: Embedder>(
    store: &mut MemoryStore<E>,
    ids: &[String],
    json: bool,
) -> Result<ExitCode, Error> {
    let deleted = store.delete(ids)?;
    if json {
        print_json(&DeleteResponse {
            status: "deleted".to_string(),
            deleted,
        })?;
    } else {
        println!("Deleted {deleted} of {} memories", ids.len());
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_count<E: Embedder>(store: &MemoryStore<E>, json: bool) -> Result<ExitCode, Error> {
    let count = store.count()?;
    if json {
        print_json(&CountResponse {
            collection: store.collection().to_string(),
            count,
        })?;
    } else {
        println!("{count}");
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_list<E: Embedder>(
    store: &MemoryStore<E>,
    limit: usize,
    json: bool,
) -> Result<ExitCode, Error> {
    let memories = store.list(limit)?;
    if json {
        print_json(&ListResponse { memories })?;
    } else {
        for memory in memories {
            println!("{}: {}", memory.id, memory.text);
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_version(json: bool) -> Result<ExitCode, Error> {
    if json {
        print_json(&VersionResponse {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })?;
    } else {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    }
    Ok(ExitCode::SUCCESS)
}

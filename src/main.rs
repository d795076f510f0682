use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use cosmoql::{logging, parse_parameter_arg, Config, DbError, DocumentStore, Parameters, QueryService};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "cosmoql")]
#[command(about = "Run a Cosmos-style SQL query over JSON documents", long_about = None)]
struct Args {
    /// Query text, e.g. "SELECT c.id FROM c WHERE c.age > 30"
    #[arg(short, long)]
    query: String,

    /// JSON file holding an array of documents to load into the collection
    #[arg(short, long)]
    documents: Option<PathBuf>,

    /// Query parameter as @name=<json> (repeatable)
    #[arg(short, long = "param")]
    params: Vec<String>,

    /// Configuration file (defaults to ./cosmoql.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database to query
    #[arg(long, default_value = "cli")]
    database: String,

    /// Collection to query
    #[arg(long, default_value = "documents")]
    collection: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(Path::new("."))?,
    };

    // Initialize logging
    logging::init(&config.log_filter);

    let store = match &config.initial_data {
        Some(path) => DocumentStore::from_json_file(path)
            .with_context(|| format!("loading initial data from {}", path.display()))?,
        None => DocumentStore::new(),
    };
    ensure_collection(&store, &args.database, &args.collection)?;

    if let Some(path) = &args.documents {
        let loaded = load_documents(&store, &args.database, &args.collection, path)?;
        tracing::info!("Loaded {} document(s) from {}", loaded, path.display());
    }

    let mut parameters = Parameters::new();
    for arg in &args.params {
        let (name, value) = parse_parameter_arg(arg)?;
        parameters.insert(name, value);
    }

    let service = QueryService::new(store.clone(), &config);
    let results = service.execute(&args.database, &args.collection, &args.query, parameters)?;
    println!("{}", serde_json::to_string_pretty(&results)?);

    if let Some(path) = &config.persist {
        store
            .dump_to_json(path)
            .with_context(|| format!("persisting state to {}", path.display()))?;
    }

    Ok(())
}

fn ensure_collection(store: &DocumentStore, database: &str, collection: &str) -> anyhow::Result<()> {
    match store.create_database(database) {
        Ok(_) | Err(DbError::DatabaseAlreadyExists(_)) => {}
        Err(e) => return Err(e.into()),
    }
    match store.create_collection(database, collection, Vec::new()) {
        Ok(_) | Err(DbError::CollectionAlreadyExists(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn load_documents(
    store: &DocumentStore,
    database: &str,
    collection: &str,
    path: &Path,
) -> anyhow::Result<usize> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading documents from {}", path.display()))?;
    let parsed: Value = serde_json::from_str(&content)?;
    let documents = match parsed {
        Value::Array(documents) => documents,
        _ => anyhow::bail!("{} must contain a JSON array of documents", path.display()),
    };

    let count = documents.len();
    for document in documents {
        store.create_document(database, collection, document, true)?;
    }
    Ok(count)
}

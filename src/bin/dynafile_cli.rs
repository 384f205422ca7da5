//! A small CLI for poking at a Dynafile table from a shell: put, get,
//! delete, scan, query, and create-gsi.
//!
//! Grounded on `ufos/src/main.rs`'s `clap::Parser` + `env_logger::init()`
//! pairing; a complete embedded-store crate in this corpus always ships
//! a runnable CLI entry point next to the library.

use clap::{Parser, Subcommand};
use dynafile::{Dynafile, Filter, QueryParams, TableOptions};
use std::path::PathBuf;

/// Inspect and drive a Dynafile table from the command line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the table's root directory
    #[arg(long)]
    data: PathBuf,

    /// Partition-key attribute name (only used on first creation)
    #[arg(long)]
    pk_attr: Option<String>,

    /// Sort-key attribute name (only used on first creation)
    #[arg(long)]
    sk_attr: Option<String>,

    /// Attribute holding a Unix epoch-second TTL value, if any
    #[arg(long)]
    ttl_attr: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert or overwrite an item
    Put {
        /// The item as a JSON object
        item: String,
    },
    /// Fetch one item by key
    Get {
        /// The key as a JSON object
        key: String,
    },
    /// Delete one item by key
    Delete {
        /// The key as a JSON object
        key: String,
    },
    /// List every item in the table
    Scan,
    /// List items in one partition, optionally by sort-key prefix
    Query {
        /// Partition key value
        pk: String,
        /// Only return items with sk >= this (or <= in reverse)
        #[arg(long, default_value = "")]
        starts_with: String,
        /// Iterate sk in descending order
        #[arg(long, action)]
        reverse: bool,
        /// Query a GSI by name instead of the base table
        #[arg(long)]
        index: Option<String>,
    },
    /// Create and backfill a global secondary index
    CreateGsi {
        name: String,
        pk_attr: String,
        sk_attr: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let table = Dynafile::open(
        &args.data,
        TableOptions {
            pk_attr: args.pk_attr,
            sk_attr: args.sk_attr,
            ttl_attr: args.ttl_attr,
        },
    )?;

    match args.command {
        Command::Put { item } => {
            let item = parse_item(&item)?;
            table.put_item(item)?;
        }
        Command::Get { key } => {
            let key = parse_item(&key)?;
            match table.get_item(&key)? {
                Some(item) => println!("{}", serde_json::Value::Object(item)),
                None => log::info!("no item found for key {key:?}"),
            }
        }
        Command::Delete { key } => {
            let key = parse_item(&key)?;
            table.delete_item(&key)?;
        }
        Command::Scan => {
            for item in table.scan(Filter::AlwaysTruthy)? {
                println!("{}", serde_json::Value::Object(item));
            }
        }
        Command::Query {
            pk,
            starts_with,
            reverse,
            index,
        } => {
            let params = QueryParams {
                pk,
                starts_with,
                forward: !reverse,
                filter: Filter::AlwaysTruthy,
                index,
            };
            for item in table.query(params)? {
                println!("{}", serde_json::Value::Object(item));
            }
        }
        Command::CreateGsi {
            name,
            pk_attr,
            sk_attr,
        } => {
            table.create_gsi(&name, &pk_attr, &sk_attr)?;
        }
    }

    Ok(())
}

fn parse_item(raw: &str) -> anyhow::Result<dynafile::Item> {
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Object(map) => Ok(map),
        other => anyhow::bail!("expected a JSON object, got {other}"),
    }
}

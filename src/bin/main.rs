// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The exchange-demo-rs Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use exchange_demo_rs::{
    Decision, ExchangeEngine, Item, ItemId, LogSink, MemoryCatalog, MemoryDirectory, ProposalId,
    UserId,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Exchange Engine - Process trade scenario CSV files
///
/// Reads a scenario from a CSV file, drives the exchange engine through
/// it, and outputs the final item ownership table to stdout.
#[derive(Parser, Debug)]
#[command(name = "exchange-demo-rs")]
#[command(about = "An exchange engine that processes trade scenario CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with scenario rows
    ///
    /// Expected format: op,user,a,b,public,name
    /// Example: cargo run -- scenario.csv > items.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args = Args::parse();

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    // Run the scenario
    let (catalog, _engine) = match process_scenario(BufReader::new(file)) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Error processing scenario: {}", e);
            process::exit(1);
        }
    };

    // Write results to stdout
    if let Err(e) = write_items(&catalog, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `op, user, a, b, public, name`
/// - `user 1,,,,"alice"` registers a display name
/// - `item 1,10,,true,"Penny Black"` seeds item 10 owned by user 1
/// - `propose 1,10,20,,` user 1 offers item 10 for item 20
/// - `accept 2,1,,,` / `refuse 2,1,,,` user 2 answers proposal 1
#[derive(Debug, Deserialize)]
struct CsvRecord {
    op: String,
    user: u32,
    #[serde(deserialize_with = "csv::invalid_option")]
    a: Option<u64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    b: Option<u64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    public: Option<bool>,
    name: Option<String>,
}

/// One parsed scenario step.
#[derive(Debug)]
enum Command {
    Register {
        user: UserId,
        name: String,
    },
    Seed {
        item: Item,
    },
    Propose {
        sender: UserId,
        offered: ItemId,
        requested: ItemId,
    },
    Resolve {
        acting: UserId,
        proposal: ProposalId,
        decision: Decision,
    },
}

impl CsvRecord {
    /// Converts the CSV record to a scenario command.
    ///
    /// Returns `None` for unknown ops or missing required fields.
    fn into_command(self) -> Option<Command> {
        let user = UserId(self.user);

        match self.op.to_lowercase().as_str() {
            "user" => Some(Command::Register {
                user,
                name: self.name?,
            }),
            "item" => {
                let mut item = Item::new(ItemId(self.a?), user, self.name.unwrap_or_default());
                item.is_public = self.public.unwrap_or(true);
                Some(Command::Seed { item })
            }
            "propose" => Some(Command::Propose {
                sender: user,
                offered: ItemId(self.a?),
                requested: ItemId(self.b?),
            }),
            "accept" => Some(Command::Resolve {
                acting: user,
                proposal: ProposalId(self.a?),
                decision: Decision::Accept,
            }),
            "refuse" => Some(Command::Resolve {
                acting: user,
                proposal: ProposalId(self.a?),
                decision: Decision::Refuse,
            }),
            _ => None,
        }
    }
}

/// Runs a scenario from a CSV reader.
///
/// Streaming: rows are applied as they are read. Malformed rows and
/// commands the engine rejects are logged and skipped; the scenario keeps
/// going, matching the engine's leave-state-unchanged failure contract.
///
/// # CSV Format
///
/// ```csv
/// op,user,a,b,public,name
/// user,1,,,,alice
/// item,1,10,,true,Penny Black
/// propose,1,10,20,,
/// accept,2,1,,,
/// ```
///
/// Proposal ids are assigned sequentially from 1, so later rows can refer
/// to them by position.
///
/// # Errors
///
/// Returns a CSV error if the reader itself fails.
pub fn process_scenario<R: Read>(
    reader: R,
) -> Result<(Arc<MemoryCatalog>, ExchangeEngine), csv::Error> {
    let catalog = Arc::new(MemoryCatalog::new());
    let directory = Arc::new(MemoryDirectory::new());
    let engine = ExchangeEngine::new(catalog.clone(), directory.clone(), Arc::new(LogSink::new()));

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " propose "
        .flexible(true) // Allow missing trailing fields
        .has_headers(true) // Skip first row as header
        .from_reader(reader);

    for result in rdr.deserialize::<CsvRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed row");
                continue;
            }
        };

        let Some(command) = record.into_command() else {
            tracing::warn!("skipping invalid scenario row");
            continue;
        };

        match command {
            Command::Register { user, name } => directory.add(user, name),
            Command::Seed { item } => catalog.add(item),
            Command::Propose {
                sender,
                offered,
                requested,
            } => {
                if let Err(e) = engine.propose(sender, offered, requested) {
                    tracing::warn!(error = %e, "skipping proposal");
                }
            }
            Command::Resolve {
                acting,
                proposal,
                decision,
            } => {
                if let Err(e) = engine.resolve(proposal, acting, decision) {
                    tracing::warn!(error = %e, proposal = proposal.0, "skipping resolution");
                }
            }
        }
    }

    Ok((catalog, engine))
}

/// Final ownership row in the output CSV.
///
/// Columns: `item, owner, name, public`
#[derive(Debug, Serialize)]
struct ItemRow {
    item: u64,
    owner: u32,
    name: String,
    public: bool,
}

/// Write the item ownership table to a CSV writer.
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_items<W: Write>(catalog: &MemoryCatalog, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for item in catalog.snapshot() {
        wtr.serialize(ItemRow {
            item: item.id.0,
            owner: item.owner.0,
            name: item.name,
            public: item.is_public,
        })?;
    }

    wtr.flush()?;
    Ok(())
}

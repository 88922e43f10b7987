use anyhow::{Context, Result, bail};
use chrono::Datelike;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tally_core::{
    Category, Filter, LabelPolicy, Selector, Transaction, chronological, current_period,
    exclude_category, forecast_by_category, newest_first, sum_by_category, sum_by_month,
    sum_by_observed_category, sum_by_sub_category,
};
use tally_ingest::read_rows;
use tally_store::{
    EXPENSES, INCOMES, ImportOutcome, JsonFileStore, ManualEntry, delete, load, load_all, purge,
    reassign_category,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod report;
mod state;

use config::{Config, load_config};

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Import bank spreadsheets and report spending by month and category"
)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). Overrides TALLY_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import the first sheet of a .xlsx/.xls/.ods file, or a .csv
    Import { file: PathBuf },

    /// Add a single record by hand
    Add {
        /// Amount, e.g. -12,50 (negative for spending)
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        /// dd/mm/yyyy or yyyy-mm-dd (default: today)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        sub_category: Option<String>,
    },

    /// List records, newest first
    List {
        #[arg(long, value_enum, default_value_t = Scope::All)]
        collection: Scope,
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Change the category (and optionally sub-category) of a record
    Recategorize {
        id: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        sub_category: Option<String>,
        #[arg(long, value_enum, default_value_t = Collection::Expenses)]
        collection: Collection,
    },

    /// Delete one record
    Delete {
        id: String,
        #[arg(long, value_enum, default_value_t = Collection::Expenses)]
        collection: Collection,
    },

    /// Delete every record of a collection
    Purge {
        #[arg(long, value_enum, default_value_t = Collection::Expenses)]
        collection: Collection,
        /// Required; there is no undo
        #[arg(long)]
        yes: bool,
    },

    /// Aggregated views
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Signed totals per month
    Months {
        #[command(flatten)]
        scope: ReportScope,
    },
    /// Spending per category of the configured axis
    Categories {
        #[command(flatten)]
        scope: ReportScope,
        /// Only the categories present in the data, in order of appearance
        #[arg(long)]
        observed: bool,
    },
    /// Spending per sub-category
    Subcategories {
        #[command(flatten)]
        scope: ReportScope,
    },
    /// Naive per-category forecast from monthly history
    Forecast {
        #[command(flatten)]
        scope: ReportScope,
        /// Periods to project (default: [forecast] horizon)
        #[arg(long)]
        horizon: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(clap::Args, Debug, Clone)]
struct FilterArgs {
    /// Year, or All
    #[arg(long, default_value = "All")]
    year: Selector<i32>,
    /// Month 1-12, or All
    #[arg(long, default_value = "All")]
    month: Selector<u32>,
    /// Category label, or All
    #[arg(long, default_value = "All")]
    category: Selector<String>,
}

impl FilterArgs {
    fn to_filter(&self, labels: LabelPolicy) -> Filter {
        Filter {
            year: self.year.clone(),
            month: self.month.clone(),
            category: self.category.clone().labelled(labels),
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
struct ReportScope {
    #[arg(long, value_enum, default_value_t = Scope::Expenses)]
    collection: Scope,
    #[command(flatten)]
    filter: FilterArgs,
    /// Use this month if it has data in the selected year, else the latest month that does
    #[arg(long, conflicts_with = "month")]
    current: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Expenses,
    Incomes,
}

impl Collection {
    fn name(self) -> &'static str {
        match self {
            Collection::Expenses => EXPENSES,
            Collection::Incomes => INCOMES,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Expenses,
    Incomes,
    All,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Import { file } => {
            let cfg = load_config()?;
            let rows = read_rows(&file).with_context(|| format!("reading {}", file.display()))?;
            let importer = cfg.importer()?;
            let mut store = state::open_store(&cfg)?;
            let result = importer
                .import(&mut store, &cfg.identity(), &rows)
                .with_context(|| format!("importing {}", file.display()))?;

            emit(cli.json, &result, || report::import(&result))?;
            if result.outcome == ImportOutcome::Failed {
                bail!("nothing was imported from {}", file.display());
            }
        }

        Command::Add {
            amount,
            date,
            category,
            sub_category,
        } => {
            let cfg = load_config()?;
            let importer = cfg.importer()?;
            let mut store = state::open_store(&cfg)?;
            let entry = ManualEntry {
                date,
                amount: Some(amount),
                category,
                sub_category,
            };
            let committed = importer
                .add_manual(&mut store, &cfg.identity(), &entry)
                .context("adding record")?;
            emit(cli.json, &committed, || {
                format!("Added {} to {}\n", committed.id, committed.collection)
            })?;
        }

        Command::List {
            collection,
            filter,
            limit,
        } => {
            let cfg = load_config()?;
            let store = state::open_store(&cfg)?;
            let filter = filter.to_filter(cfg.label_policy());
            let mut records = Vec::new();
            for name in scope_collections(collection) {
                for tx in filter.apply(&load(&store, name)?) {
                    records.push((name, tx));
                }
            }
            // Stable, so each collection keeps its own newest-first order on ties.
            records.sort_by(|a, b| b.1.date.cmp(&a.1.date));
            records.truncate(limit.unwrap_or(usize::MAX));

            let json_rows: Vec<ListedRecord> = records
                .iter()
                .map(|(collection, tx)| ListedRecord {
                    collection: *collection,
                    record: tx,
                })
                .collect();
            emit(cli.json, &json_rows, || report::listing(&records))?;
        }

        Command::Recategorize {
            id,
            category,
            sub_category,
            collection,
        } => {
            let cfg = load_config()?;
            let mut store = state::open_store(&cfg)?;
            let labels = cfg.label_policy();
            reassign_category(
                &mut store,
                collection.name(),
                &id,
                Category::from_raw(Some(category.as_str()), labels),
                sub_category.map(|s| Category::from_raw(Some(s.as_str()), labels)),
            )
            .with_context(|| format!("recategorizing {id}"))?;
            println!("Updated {id} in {}", collection.name());
        }

        Command::Delete { id, collection } => {
            let cfg = load_config()?;
            let mut store = state::open_store(&cfg)?;
            delete(&mut store, collection.name(), &id)
                .with_context(|| format!("deleting {id}"))?;
            println!("Deleted {id} from {}", collection.name());
        }

        Command::Purge { collection, yes } => {
            if !yes {
                bail!(
                    "purge deletes every record in {}; re-run with --yes",
                    collection.name()
                );
            }
            let cfg = load_config()?;
            let mut store = state::open_store(&cfg)?;
            let result = purge(&mut store, collection.name())
                .with_context(|| format!("purging {}", collection.name()))?;
            emit(cli.json, &result, || report::purge(collection.name(), &result))?;
            if !result.is_complete() {
                bail!("{} record(s) could not be deleted", result.failures.len());
            }
        }

        Command::Report { command } => run_report(command, cli.json)?,
    }

    Ok(())
}

/// `-v` flags win over `TALLY_LOG`; with neither, only warnings are shown.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("TALLY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(Serialize)]
struct ListedRecord<'a> {
    collection: &'a str,
    #[serde(flatten)]
    record: &'a Transaction,
}

fn scope_collections(scope: Scope) -> Vec<&'static str> {
    match scope {
        Scope::Expenses => vec![EXPENSES],
        Scope::Incomes => vec![INCOMES],
        Scope::All => vec![EXPENSES, INCOMES],
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

fn run_report(command: ReportCommand, json: bool) -> Result<()> {
    let cfg = load_config()?;
    let store = state::open_store(&cfg)?;
    let axis = cfg.axis();

    match command {
        ReportCommand::Months { scope } => {
            let txs = select(&store, &cfg, &scope)?;
            let totals = sum_by_month(&chronological(&txs));
            emit(json, &totals, || report::months(&totals))
        }
        ReportCommand::Categories { scope, observed } => {
            let txs = spending(select(&store, &cfg, &scope)?, &cfg);
            let totals = if observed {
                sum_by_observed_category(&txs)
            } else {
                sum_by_category(&txs, &axis)
            };
            emit(json, &totals, || report::categories(&totals))
        }
        ReportCommand::Subcategories { scope } => {
            let txs = spending(select(&store, &cfg, &scope)?, &cfg);
            let totals = sum_by_sub_category(&txs);
            emit(json, &totals, || report::sub_categories(&totals))
        }
        ReportCommand::Forecast { scope, horizon } => {
            let txs = spending(select(&store, &cfg, &scope)?, &cfg);
            let horizon = horizon.unwrap_or(cfg.forecast.horizon);
            let forecasts = forecast_by_category(&chronological(&txs), &axis, horizon);
            emit(json, &forecasts, || report::forecasts(&forecasts))
        }
    }
}

/// Income-labelled records never count as spending, wherever they are stored.
fn spending(txs: Vec<Transaction>, cfg: &Config) -> Vec<Transaction> {
    exclude_category(&txs, &cfg.ledger.income_label)
}

/// Records in scope after filtering, newest first.
fn select(store: &JsonFileStore, cfg: &Config, scope: &ReportScope) -> Result<Vec<Transaction>> {
    let txs = match scope.collection {
        Scope::Expenses => load(store, EXPENSES)?,
        Scope::Incomes => load(store, INCOMES)?,
        Scope::All => load_all(store)?,
    };

    let mut filter = scope.filter.to_filter(cfg.label_policy());
    if scope.current {
        let today = cfg.time_policy()?.today();
        let year = scope
            .filter
            .year
            .as_option()
            .copied()
            .unwrap_or_else(|| today.year());
        let period = current_period(&txs, year, today);
        if let Some(advisory) = &period.advisory {
            eprintln!("note: {advisory}");
        }
        filter.year = Selector::Only(period.year);
        match period.month {
            Some(month) => filter.month = Selector::Only(month),
            None => return Ok(Vec::new()),
        }
    }

    let selected = filter.apply(&txs);
    info!(
        collection = ?scope.collection,
        filter = ?filter,
        records = selected.len(),
        "report selection"
    );
    Ok(newest_first(&selected))
}

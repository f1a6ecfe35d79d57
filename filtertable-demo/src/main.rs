mod config;
mod securities;

use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use filtertable_lib::error::{FormError, SchemaError};
use filtertable_lib::orchestrator::QueryOrchestrator;
use filtertable_lib::provider::InMemoryProvider;
use filtertable_lib::table::{RenderState, TableWidget};
use simplelog::{Config, WriteLogger};
use thiserror::Error;

use config::{ConfigError, DemoConfig};
use securities::{COLUMNS, Security};

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create log file: {0}")]
    LogFile(#[from] std::io::Error),
    #[error("failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Form(#[from] FormError),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), DemoError> {
    let config = match std::env::args().nth(1) {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };

    let log_file = File::create(&config.log_file)?;
    WriteLogger::init(config.level_filter()?, Config::default(), log_file)?;
    log::info!("Starting securities demo with {:?}", config);

    let mut table: TableWidget<Security> = TableWidget::new(COLUMNS, config.table_config());
    table.set_filter_fields(securities::filter_fields())?;

    let provider =
        Arc::new(InMemoryProvider::new(securities::seed()).with_delay(config.provider_delay()));
    let orchestrator =
        QueryOrchestrator::connect(&mut table, provider, config.orchestrator_config());
    let _errors = orchestrator.on_error(|e| eprintln!("Query failed: {}", e));
    let _selection =
        table.on_row_activated(|s: &Security| println!("> selected {} ({})", s.name, s.id));
    tokio::spawn(orchestrator.run());

    settle(&table).await;
    print_table("All securities", &table);

    table.edit_filter("name", "Ac")?;
    settle(&table).await;
    print_table("Name contains \"Ac\"", &table);

    table.edit_filter("name", "")?;
    table.edit_filter("type", vec!["Equity", "RealEstate"])?;
    table.edit_filter("isPrivate", false)?;
    settle(&table).await;
    print_table("Public equities and real estate", &table);

    table.reset_filter()?;
    settle(&table).await;
    if table.next_page() {
        settle(&table).await;
    }
    print_table("Filters reset, second page", &table);

    table.activate_row_at(0);
    log::info!("Demo finished");
    Ok(())
}

/// Wait for the orchestrator to pick up the last change and answer it.
async fn settle(table: &TableWidget<Security>) {
    tokio::time::sleep(Duration::from_millis(20)).await;
    while table.is_loading() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

fn print_table(title: &str, table: &TableWidget<Security>) {
    println!("\n== {} ==", title);
    println!("{:<28}{:<18}{:<8}", COLUMNS[0], COLUMNS[1], COLUMNS[2]);

    match table.render() {
        RenderState::Loading => println!("(loading)"),
        RenderState::Empty => println!("No data"),
        RenderState::Rows(rows) => {
            for rendered in rows {
                let s = &rendered.row;
                println!("{:<28}{:<18}{:<8}", s.cell("name"), s.cell("type"), s.cell("currency"));
            }
        }
    }

    let page = table.page();
    println!(
        "Page {} of {} ({} securities)",
        page.page_index(),
        page.page_count(),
        page.total_items()
    );
}

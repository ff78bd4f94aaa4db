use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use stockmarket_core::config::Settings;
use stockmarket_core::presentation::{
    CompanyInfoState, CompanyInfoViewModel, CompanyListingsEvent, CompanyListingsState,
    CompanyListingsViewModel,
};
use stockmarket_core::remote::AlphaVantageClient;
use stockmarket_core::repository::{CachedStockRepository, StockRepository};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "stockmarket")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show company listings, from the local cache when it is warm.
    Listings {
        /// Filter by name substring or exact symbol.
        #[arg(long)]
        query: Option<String>,

        /// Fetch the full listing set from the remote API and replace the cache.
        #[arg(long)]
        refresh: bool,
    },

    /// Interactive search: every stdin line is a new query, debounced like keystrokes.
    Search,

    /// Show the company overview and yesterday's intraday closes.
    Info {
        symbol: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(args, &settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "stockmarket failed");
    }
    result
}

async fn run(args: Args, settings: &Settings) -> anyhow::Result<()> {
    let pool = stockmarket_core::storage::connect(&settings.database_url).await?;
    stockmarket_core::storage::migrate(&pool).await?;

    let api = AlphaVantageClient::from_settings(settings)?;
    let repository: Arc<dyn StockRepository> =
        Arc::new(CachedStockRepository::new(Arc::new(api), pool.clone()));

    match args.command {
        Command::Listings { query, refresh } => {
            let mut vm = CompanyListingsViewModel::new(repository, settings.search_debounce);
            if let Some(query) = query {
                vm.on_event(CompanyListingsEvent::OnSearchQueryChange(query));
            }
            if refresh {
                vm.on_event(CompanyListingsEvent::Refresh);
            }
            vm.idle().await;
            print_listings(&vm.state());
        }
        Command::Search => search(repository, settings).await?,
        Command::Info { symbol } => {
            let mut vm = CompanyInfoViewModel::new(repository, symbol.trim().to_uppercase());
            vm.idle().await;
            print_company(&vm.state());
        }
    }

    pool.close().await;
    Ok(())
}

async fn search(repository: Arc<dyn StockRepository>, settings: &Settings) -> anyhow::Result<()> {
    let mut vm = CompanyListingsViewModel::new(repository, settings.search_debounce);

    let mut rx = vm.subscribe();
    let printer = tokio::spawn(async move {
        let mut last_printed: Option<CompanyListingsState> = None;
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if state.is_loading || last_printed.as_ref() == Some(&state) {
                continue;
            }
            print_listings(&state);
            last_printed = Some(state);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("read search query from stdin failed")?
    {
        vm.on_event(CompanyListingsEvent::OnSearchQueryChange(line.trim().to_string()));
    }

    vm.idle().await;
    drop(vm);
    printer.await.context("join printer task failed")?;
    Ok(())
}

fn print_listings(state: &CompanyListingsState) {
    if !state.search_query.is_empty() {
        println!("query: {}", state.search_query);
    }
    for company in &state.companies {
        println!("{:<8} {:<10} {}", company.symbol, company.exchange, company.name);
    }
    println!("{} companies", state.companies.len());
}

fn print_company(state: &CompanyInfoState) {
    if let Some(error) = &state.error {
        eprintln!("{error}");
        return;
    }
    let Some(company) = &state.company else {
        return;
    };

    println!("{} ({})", company.name, company.symbol);
    println!("Industry: {}", company.industry);
    println!("Country: {}", company.country);
    if !company.description.is_empty() {
        println!();
        println!("{}", company.description);
    }

    if state.stock_infos.is_empty() {
        return;
    }
    println!();
    println!("Market Summary");
    for info in &state.stock_infos {
        println!("{}  {:>10.2}", info.date.format("%Y-%m-%d %H:%M"), info.close);
    }
    let (low, high) = state
        .stock_infos
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), i| {
            (lo.min(i.close), hi.max(i.close))
        });
    println!("low {low:.2}  high {high:.2}");
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

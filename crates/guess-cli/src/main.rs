use std::future::Future;

use alloy::primitives::Address;
use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Context, Result};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use guess_analysis::{format_flow, LeaderboardEntry, LeaderboardService, SortBy};
use guess_data::config::DEFAULT_CONTRACT_ADDRESS;
use guess_data::{BlockscoutClient, CacheStatus, ExplorerConfig};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

const EXPLORER_URL_ENV: &str = "GUESS_EXPLORER_URL";

#[derive(Parser, Debug)]
#[command(name = "guess-leaderboard")]
#[command(about = "Leaderboards for the on-chain prompt guessing game")]
#[command(version)]
struct Cli {
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Blockscout API root; falls back to $GUESS_EXPLORER_URL.
    #[arg(long, global = true)]
    explorer_url: Option<String>,

    /// Game contract address.
    #[arg(long, global = true, default_value = DEFAULT_CONTRACT_ADDRESS)]
    contract: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank players by wins, prizes, win rate or activity.
    Leaderboard(LeaderboardArgs),
    /// Show statistics for one player.
    Player(PlayerArgs),
    /// Show totals across all players.
    Summary(SummaryArgs),
}

#[derive(Args, Debug)]
struct LeaderboardArgs {
    /// wins, prizes, win-rate or activity.
    #[arg(long, default_value = "wins")]
    sort: String,

    /// Only show the top N players.
    #[arg(long)]
    limit: Option<usize>,

    /// Output format: table (default), json or csv.
    #[arg(long, default_value = "table")]
    output: String,

    /// Bypass the log cache.
    #[arg(long)]
    refresh: bool,
}

#[derive(Args, Debug)]
struct PlayerArgs {
    /// Player address (any letter case).
    address: String,

    #[arg(long)]
    refresh: bool,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[arg(long)]
    refresh: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    let config = ExplorerConfig {
        base_url: cli
            .explorer_url
            .or_else(|| std::env::var(EXPLORER_URL_ENV).ok())
            .unwrap_or_else(|| ExplorerConfig::default().base_url),
        contract_address: cli.contract,
        ..ExplorerConfig::default()
    };
    let service =
        LeaderboardService::from_config(&config).wrap_err("failed to configure explorer client")?;

    match cli.command {
        Commands::Leaderboard(args) => handle_leaderboard(&service, args).await,
        Commands::Player(args) => handle_player(&service, args).await,
        Commands::Summary(args) => handle_summary(&service, args).await,
    }
}

fn init_tracing(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::WARN
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))
        .wrap_err("failed to initialize tracing filter")?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

/// Runs `fut` behind a spinner that is cleared once it resolves.
async fn with_spinner<T>(message: &'static str, fut: impl Future<Output = T>) -> Result<T> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .wrap_err("failed to create progress style")?,
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let output = fut.await;
    pb.finish_and_clear();
    Ok(output)
}

async fn handle_leaderboard(
    service: &LeaderboardService<BlockscoutClient>,
    args: LeaderboardArgs,
) -> Result<()> {
    let sort_by: SortBy = args.sort.parse()?;
    let use_cache = !args.refresh;

    let rows = match args.limit {
        Some(limit) => {
            with_spinner(
                "fetching contract logs",
                service.top_players(sort_by, limit, use_cache),
            )
            .await?
        }
        None => {
            with_spinner(
                "fetching contract logs",
                service.leaderboard(sort_by, use_cache),
            )
            .await?
        }
    }
    .wrap_err("failed to build leaderboard")?;

    match args.output.to_lowercase().as_str() {
        "table" => print_leaderboard_table(&rows, sort_by, &service.cache_status()),
        "json" => print_leaderboard_json(&rows, sort_by)?,
        "csv" => print_leaderboard_csv(&rows),
        _ => {
            return Err(eyre!(
                "unknown output format '{}'; use 'table', 'json', or 'csv'",
                args.output
            ))
        }
    }

    info!(
        sort_by = %sort_by,
        players = rows.len(),
        output = %args.output,
        "leaderboard command completed"
    );

    Ok(())
}

fn print_leaderboard_table(rows: &[LeaderboardEntry], sort_by: SortBy, status: &CacheStatus) {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec![
        "Rank",
        "Player",
        "Wins",
        "Prizes Won",
        "Guesses",
        "Win Rate",
        "Challenges",
        "Last Block",
    ]);

    for (rank, row) in rows.iter().enumerate() {
        table.add_row(vec![
            format!("#{}", rank + 1),
            truncate_address(&row.player),
            row.total_wins.to_string(),
            format_flow(row.total_prizes_won),
            row.total_guesses.to_string(),
            format!("{:.1}%", row.win_rate * 100.0),
            row.challenges_created.to_string(),
            row.last_activity.to_string(),
        ]);
    }

    println!("{}\n", table);
    println!("Sorted by {} ({} players)", sort_by, rows.len());
    if let Some(fetched_at) = status.fetched_at {
        println!(
            "Data fetched at {}\n",
            fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
}

fn print_leaderboard_json(rows: &[LeaderboardEntry], sort_by: SortBy) -> Result<()> {
    use serde::Serialize;

    #[derive(Serialize)]
    struct JsonOutput {
        sort_by: String,
        players: Vec<JsonEntry>,
    }

    #[derive(Serialize)]
    struct JsonEntry {
        rank: usize,
        player: String,
        total_wins: String,
        total_prizes_won_wei: String,
        total_guesses: String,
        win_rate: f64,
        challenges_created: String,
        last_activity: u64,
    }

    let players = rows
        .iter()
        .enumerate()
        .map(|(rank, row)| JsonEntry {
            rank: rank + 1,
            player: format!("{:#x}", row.player),
            total_wins: row.total_wins.to_string(),
            total_prizes_won_wei: row.total_prizes_won.to_string(),
            total_guesses: row.total_guesses.to_string(),
            win_rate: row.win_rate,
            challenges_created: row.challenges_created.to_string(),
            last_activity: row.last_activity,
        })
        .collect();

    let output = JsonOutput {
        sort_by: sort_by.to_string(),
        players,
    };
    let json_str = serde_json::to_string_pretty(&output).wrap_err("failed to serialize JSON")?;
    println!("{}", json_str);

    Ok(())
}

fn print_leaderboard_csv(rows: &[LeaderboardEntry]) {
    println!("rank,player,total_wins,total_prizes_won_wei,total_guesses,win_rate,challenges_created,last_activity");

    for (rank, row) in rows.iter().enumerate() {
        println!(
            "{},{:#x},{},{},{},{},{},{}",
            rank + 1,
            row.player,
            row.total_wins,
            row.total_prizes_won,
            row.total_guesses,
            row.win_rate,
            row.challenges_created,
            row.last_activity,
        );
    }
}

async fn handle_player(
    service: &LeaderboardService<BlockscoutClient>,
    args: PlayerArgs,
) -> Result<()> {
    let player: Address = args
        .address
        .trim()
        .parse()
        .wrap_err_with(|| format!("invalid player address '{}'", args.address))?;

    let stats = with_spinner(
        "fetching contract logs",
        service.player_stats(player, !args.refresh),
    )
    .await?
    .wrap_err("failed to load player stats")?;

    let Some(stats) = stats else {
        println!("No activity recorded for {:#x}", player);
        return Ok(());
    };

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Player".to_string(), format!("{:#x}", player)]);
    table.add_row(vec!["Wins".to_string(), stats.total_wins.to_string()]);
    table.add_row(vec![
        "Prizes Won".to_string(),
        format_flow(stats.total_prizes_won),
    ]);
    table.add_row(vec!["Guesses".to_string(), stats.total_guesses.to_string()]);
    table.add_row(vec![
        "Win Rate".to_string(),
        format!("{:.1}%", stats.win_rate() * 100.0),
    ]);
    table.add_row(vec![
        "Challenges Created".to_string(),
        stats.challenges_created.to_string(),
    ]);
    table.add_row(vec![
        "Last Active Block".to_string(),
        stats.last_activity.to_string(),
    ]);

    println!("\n{}\n", table);

    info!(player = %player, "player command completed");
    Ok(())
}

async fn handle_summary(
    service: &LeaderboardService<BlockscoutClient>,
    args: SummaryArgs,
) -> Result<()> {
    let summary = with_spinner("fetching contract logs", service.summary(!args.refresh))
        .await?
        .wrap_err("failed to build summary")?;

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Players".to_string(), summary.total_players.to_string()]);
    table.add_row(vec![
        "Challenges Created".to_string(),
        summary.challenges_created.to_string(),
    ]);
    table.add_row(vec![
        "Guesses".to_string(),
        summary.total_guesses.to_string(),
    ]);
    table.add_row(vec!["Wins".to_string(), summary.total_wins.to_string()]);
    table.add_row(vec![
        "Prizes Paid".to_string(),
        format_flow(summary.total_prizes_won),
    ]);

    println!("\n{}\n", table);

    let status = service.cache_status();
    info!(
        players = summary.total_players,
        cache_age_ms = status.age.map(|age| age.as_millis() as u64).unwrap_or_default(),
        "summary command completed"
    );
    Ok(())
}

/// Truncate an address for compact table display.
fn truncate_address(address: &Address) -> String {
    let full = format!("{:#x}", address);
    format!("{}…{}", &full[..8], &full[full.len() - 4..])
}

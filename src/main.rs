mod api;
mod server;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use engagement_engine::calendar::upcoming_slots;
use engagement_engine::config::EngineConfig;
use engagement_engine::model::parse_instant;
use engagement_engine::rest_client::RestSource;
use engagement_engine::seed::{generate_sample_audience, generate_sample_posts};
use engagement_engine::store::FileStore;
use engagement_engine::{
    format_float, format_number, AnalyticsReport, AnalyticsSource, AuditSink, DateRange,
    PlatformRecommendation, ReportAssembler, ReportOutcome, ReportRequest,
};

use crate::api::parse_platform;

#[derive(Parser)]
#[command(name = "engagement-engine", about = "Engagement analytics and posting-time recommendations")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Report(ReportArgs),
    Recommend(RecommendArgs),
    Seed(SeedArgs),
    InitConfig(InitConfigArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct ReportArgs {
    #[arg(long)]
    user: String,
    /// RFC 3339 instant or YYYY-MM-DD
    #[arg(long)]
    from: Option<String>,
    #[arg(long)]
    to: Option<String>,
    #[arg(long, default_value_t = 30)]
    days: i64,
    #[arg(long)]
    platform: Option<String>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct RecommendArgs {
    #[arg(long)]
    user: String,
    #[arg(long)]
    platform: Option<String>,
    #[arg(long, default_value_t = 5)]
    upcoming: usize,
}

#[derive(Args, Debug, Clone)]
struct SeedArgs {
    #[arg(long)]
    user: String,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/engine.toml")]
    path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
}

pub struct Backend {
    pub assembler: Arc<ReportAssembler>,
    pub store: Option<Arc<FileStore>>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, _) = EngineConfig::load(cli.config)?;

    match cli.command {
        Command::Report(args) => run_report(args, &config).await,
        Command::Recommend(args) => run_recommend(args, &config).await,
        Command::Seed(args) => run_seed(args, &config).await,
        Command::InitConfig(args) => run_init_config(&args.path),
        Command::Serve(args) => {
            let backend = build_backend(&config).await?;
            server::serve(args, backend).await
        }
    }
}

async fn build_backend(config: &EngineConfig) -> Result<Backend, String> {
    if config.backend.endpoint.is_some() {
        let client = Arc::new(RestSource::from_config(&config.backend)?);
        let source: Arc<dyn AnalyticsSource> = client.clone();
        let audit: Arc<dyn AuditSink> = client;
        let assembler = ReportAssembler::from_config(source, audit, config)?;
        return Ok(Backend {
            assembler: Arc::new(assembler),
            store: None,
        });
    }

    let store = Arc::new(FileStore::from_config(&config.storage).await?);
    let source: Arc<dyn AnalyticsSource> = store.clone();
    let audit: Arc<dyn AuditSink> = store.clone();
    let assembler = ReportAssembler::from_config(source, audit, config)?;
    Ok(Backend {
        assembler: Arc::new(assembler),
        store: Some(store),
    })
}

async fn run_report(args: ReportArgs, config: &EngineConfig) -> Result<(), String> {
    let now = Utc::now();
    let end = match args.to.as_deref() {
        Some(value) => parse_instant(value, true)?,
        None => now,
    };
    let range = match args.from.as_deref() {
        Some(value) => DateRange::new(parse_instant(value, false)?, end)?,
        None => DateRange::trailing_days(end, args.days)?,
    };
    let platform = parse_platform(args.platform.as_deref())?;
    let request = ReportRequest::new(args.user.clone(), range, platform);

    let backend = build_backend(config).await?;
    let outcome = backend
        .assembler
        .generate_report(&request)
        .await
        .map_err(|err| err.to_string())?;

    if args.json {
        let payload = serde_json::to_string_pretty(&outcome)
            .map_err(|err| format!("failed to serialize report: {}", err))?;
        println!("{}", payload);
        return Ok(());
    }

    match outcome {
        ReportOutcome::Ready(report) => print_report(&report),
        ReportOutcome::NoData(no_data) => {
            println!("{}", no_data.message);
            println!("Hint: engagement-engine seed --user {}", no_data.user_id);
        }
    }
    Ok(())
}

async fn run_recommend(args: RecommendArgs, config: &EngineConfig) -> Result<(), String> {
    let platform = parse_platform(args.platform.as_deref())?;
    let backend = build_backend(config).await?;
    let recommendations = backend
        .assembler
        .recommend(&args.user, platform)
        .await
        .map_err(|err| err.to_string())?;

    print_recommendations(&recommendations);

    let upcoming = upcoming_slots(
        &recommendations,
        Utc::now(),
        backend.assembler.timezone(),
        args.upcoming,
    );
    if !upcoming.is_empty() {
        println!("\nUpcoming slots ({}):", backend.assembler.timezone());
        for slot in upcoming {
            println!(
                "- {} {} (score {})",
                slot.at.with_timezone(&backend.assembler.timezone()).format("%a %Y-%m-%d %H:%M"),
                slot.platform.label(),
                format_float(slot.score, 2)
            );
        }
    }
    Ok(())
}

async fn run_seed(args: SeedArgs, config: &EngineConfig) -> Result<(), String> {
    let store = FileStore::from_config(&config.storage).await?;
    let now = Utc::now();
    let inserted = store
        .replace_user_data(
            &args.user,
            generate_sample_posts(&args.user, now, args.seed),
            generate_sample_audience(&args.user, now, args.seed),
        )
        .await?;
    println!(
        "Seeded {} sample posts for {} into {}",
        inserted,
        args.user,
        config.storage.data_path.display()
    );
    Ok(())
}

fn run_init_config(path: &Path) -> Result<(), String> {
    EngineConfig::default().write(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn print_report(report: &AnalyticsReport) {
    let totals = &report.totals;
    println!(
        "Report for {} ({} to {})",
        report.user_id,
        report.range.start.format("%Y-%m-%d"),
        report.range.end.format("%Y-%m-%d")
    );
    println!(
        "Posts: {} | Engagement: {} | Avg engagement rate: {}%",
        totals.posts,
        format_number(totals.total_engagement as f64),
        format_float(totals.average_engagement_rate, 2)
    );
    println!(
        "Impressions: {} | Reach: {}",
        format_number(totals.impressions as f64),
        format_number(totals.reach as f64)
    );

    if !report.platforms.is_empty() {
        println!("\nPlatforms:");
        for row in &report.platforms {
            println!(
                "  {}: {} posts, {} avg engagement",
                row.platform.label(),
                row.posts,
                format_float(row.average_engagement, 1)
            );
        }
    }

    if !report.content_types.is_empty() {
        println!("\nContent types:");
        for row in &report.content_types {
            println!(
                "  {}: {} posts, {} avg engagement",
                row.content_type,
                row.posts,
                format_float(row.average_engagement, 1)
            );
        }
    }

    if !report.best_posting_times.is_empty() {
        println!("\nBest posting times:");
        for slot in &report.best_posting_times {
            println!(
                "  {} ({} avg engagement over {} posts)",
                slot.label(),
                format_float(slot.score, 1),
                slot.posts
            );
        }
    }

    println!();
    print_recommendations(&report.recommendations);

    if !report.insights.is_empty() {
        println!("\nInsights:");
        for insight in &report.insights {
            println!("- {}", insight);
        }
    }
}

fn print_recommendations(recommendations: &[PlatformRecommendation]) {
    println!("Recommendations:");
    for recommendation in recommendations {
        println!("  {}: {}", recommendation.platform.label(), recommendation.explanation);
        for day in &recommendation.best_days {
            let hours: Vec<String> = day
                .slots
                .iter()
                .map(|slot| format!("{:02}:00 ({})", slot.hour, format_float(slot.score, 2)))
                .collect();
            println!("    {}: {}", day.day.label(), hours.join(", "));
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("engagement_engine=info,tower_http=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bettrack::chart::{self, PieLayout, RoiLayout};
use bettrack::config::TrackerConfig;
use bettrack::filter::{self, BetFilter, Period};
use bettrack::models::{fixed2, BetPatch, BetResult, NewBet, SettingsPatch};
use bettrack::output::{self, ExportKind, ExportOptions};
use bettrack::stats;
use bettrack::store::{BetStore, SettingsStore};

#[derive(Parser)]
#[command(name = "bettrack")]
#[command(about = "Track sports bets and analyse profit, ROI and win rate")]
struct Cli {
    /// YAML configuration file (defaults to $BETTRACK_CONFIG_PATH or config/tracker.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new bet
    Add {
        /// Bet date (YYYY-MM-DD), today when omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Bet category (e.g. escanteios, cartoes, gols, resultado)
        #[arg(short = 't', long = "type")]
        category: String,

        /// Stake amount
        #[arg(short, long)]
        amount: Decimal,

        /// Decimal odds (e.g. 1.85)
        #[arg(short, long)]
        odds: Decimal,

        /// Outcome: win or loss
        #[arg(short, long)]
        result: BetResult,
    },

    /// List bets, newest first
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Change fields of an existing bet
    Update {
        id: String,

        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[arg(short = 't', long = "type")]
        category: Option<String>,

        #[arg(short, long)]
        amount: Option<Decimal>,

        #[arg(short, long)]
        odds: Option<Decimal>,

        #[arg(short, long)]
        result: Option<BetResult>,
    },

    /// Delete a bet
    Delete { id: String },

    /// Summary, recent bets and monthly goal progress
    Dashboard,

    /// Overall statistics, performance by category and odds extremes
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Cumulative ROI after each betting day
    Roi,

    /// Render a chart to an SVG file
    Chart {
        /// Chart type
        #[arg(value_enum)]
        kind: ChartKind,

        /// Output SVG path
        #[arg(short, long)]
        out: PathBuf,

        /// Animation progress between 0 and 1
        #[arg(short, long, default_value = "1.0")]
        progress: f64,

        /// Pointer x position, to highlight the element under it
        #[arg(long, requires = "hover_y")]
        hover_x: Option<f64>,

        /// Pointer y position
        #[arg(long, requires = "hover_x")]
        hover_y: Option<f64>,
    },

    /// Export bets to CSV or PDF
    Export {
        #[arg(value_enum)]
        format: ExportFormat,

        /// Output file (defaults to a dated file in the export directory)
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        columns: ColumnArgs,
    },

    /// Print the text report
    Report {
        /// Also save the report to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show or change user settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ChartKind {
    /// Bet count per category
    Pie,
    /// Cumulative ROI over time
    Roi,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Pdf,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// all, 7days, 30days or <n>days
    #[arg(short, long, default_value = "all")]
    period: Period,

    /// Custom range start (overrides --period)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Custom range end (overrides --period)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Only this category
    #[arg(short = 't', long = "type")]
    category: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> BetFilter {
        let period = if self.from.is_some() || self.to.is_some() {
            Period::Custom { from: self.from, to: self.to }
        } else {
            self.period
        };
        BetFilter {
            period,
            category: self.category.clone(),
        }
    }
}

#[derive(clap::Args)]
struct ColumnArgs {
    /// Include the bet id column
    #[arg(long)]
    include_id: bool,
    #[arg(long)]
    no_date: bool,
    #[arg(long)]
    no_type: bool,
    #[arg(long)]
    no_amount: bool,
    #[arg(long)]
    no_odds: bool,
    #[arg(long)]
    no_result: bool,
    #[arg(long)]
    no_profit: bool,
    /// Leave out the statistics sections
    #[arg(long)]
    no_stats: bool,
    #[arg(long)]
    no_win_rate: bool,
    #[arg(long)]
    no_roi: bool,
}

impl ColumnArgs {
    fn to_options(&self, config: &TrackerConfig) -> ExportOptions {
        ExportOptions {
            include_id: self.include_id,
            include_date: !self.no_date,
            include_category: !self.no_type,
            include_amount: !self.no_amount,
            include_odds: !self.no_odds,
            include_result: !self.no_result,
            include_profit: !self.no_profit,
            include_stats: !self.no_stats,
            include_win_rate: !self.no_win_rate,
            include_roi: !self.no_roi,
            date_format: config.display.date_format.clone(),
            currency_symbol: config.display.currency_symbol.clone(),
        }
    }
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Show,

    /// Change one or more settings
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Monthly profit goal
        #[arg(long)]
        monthly_goal: Option<Decimal>,

        /// Enable or disable notifications (true/false)
        #[arg(long)]
        notifications: Option<bool>,
    },

    /// Switch between light and dark mode
    ToggleDarkMode,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "warn,bettrack=info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&log_filter))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(|| {
        std::env::var("BETTRACK_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/tracker.yaml"))
    });
    let config = TrackerConfig::load_with_env(&config_path)?;
    info!("Using data directory {}", config.storage.data_dir.display());

    let today = Local::now().date_naive();

    match cli.command {
        Commands::Add { date, category, amount, odds, result } => {
            let new_bet = NewBet {
                date: date.unwrap_or(today),
                category,
                amount,
                odds,
                result,
            };
            add_bet(&config, new_bet)?;
        }
        Commands::List { filter } => {
            list_bets(&config, &filter.to_filter(), today)?;
        }
        Commands::Update { id, date, category, amount, odds, result } => {
            let patch = BetPatch { date, category, amount, odds, result };
            update_bet(&config, &id, patch)?;
        }
        Commands::Delete { id } => {
            delete_bet(&config, &id)?;
        }
        Commands::Dashboard => {
            show_dashboard(&config, today)?;
        }
        Commands::Stats { filter } => {
            show_stats(&config, &filter.to_filter(), today)?;
        }
        Commands::Roi => {
            show_roi(&config)?;
        }
        Commands::Chart { kind, out, progress, hover_x, hover_y } => {
            let hover = hover_x.zip(hover_y);
            render_chart(&config, kind, &out, progress, hover)?;
        }
        Commands::Export { format, out, columns } => {
            export(&config, format, out, &columns.to_options(&config), today)?;
        }
        Commands::Report { out } => {
            print_report(&config, out.as_deref())?;
        }
        Commands::Settings { action } => {
            handle_settings(&config, action)?;
        }
    }

    Ok(())
}

fn open_bets(config: &TrackerConfig) -> Result<BetStore> {
    BetStore::open(&config.storage.data_dir, config.storage.seed_sample_data)
        .with_context(|| format!("Failed to load bets from {}", config.storage.data_dir.display()))
}

fn open_settings(config: &TrackerConfig) -> Result<SettingsStore> {
    SettingsStore::open(&config.storage.data_dir)
        .with_context(|| format!("Failed to load settings from {}", config.storage.data_dir.display()))
}

fn add_bet(config: &TrackerConfig, new_bet: NewBet) -> Result<()> {
    let mut store = open_bets(config)?;
    let bet = store.add(new_bet).context("Failed to add bet")?;

    println!("✅ Bet added: {}", bet.id);
    println!(
        "   {} | {} | stake {} @ {} | {} | {}",
        bet.date.format(&config.display.date_format),
        bet.category,
        config.money(bet.amount),
        fixed2(bet.odds),
        bet.result.label(),
        config.money(bet.profit())
    );
    Ok(())
}

fn list_bets(config: &TrackerConfig, bet_filter: &BetFilter, today: NaiveDate) -> Result<()> {
    let store = open_bets(config)?;
    let bets = bet_filter.apply(store.bets(), today);

    if bets.is_empty() {
        println!("No bets match the selected filters.");
        return Ok(());
    }

    println!("{}", output::bets_table(&bets, &config.display.date_format));
    println!("{} of {} bets", bets.len(), store.bets().len());

    let categories = filter::categories(store.bets());
    if !categories.is_empty() {
        println!("Categories: {}", categories.join(", "));
    }
    Ok(())
}

fn update_bet(config: &TrackerConfig, id: &str, patch: BetPatch) -> Result<()> {
    if patch.is_empty() {
        bail!("Nothing to update: pass at least one field to change");
    }

    let mut store = open_bets(config)?;
    let bet = store.update(id, &patch).with_context(|| format!("Failed to update bet {}", id))?;

    println!("✅ Bet updated: {}", bet.id);
    println!(
        "   {} | {} | stake {} @ {} | {} | {}",
        bet.date.format(&config.display.date_format),
        bet.category,
        config.money(bet.amount),
        fixed2(bet.odds),
        bet.result.label(),
        config.money(bet.profit())
    );
    Ok(())
}

fn delete_bet(config: &TrackerConfig, id: &str) -> Result<()> {
    let mut store = open_bets(config)?;
    let bet = store.delete(id).with_context(|| format!("Failed to delete bet {}", id))?;
    println!("🗑️  Bet deleted: {} ({} on {})", bet.id, bet.category, bet.date);
    Ok(())
}

fn show_dashboard(config: &TrackerConfig, today: NaiveDate) -> Result<()> {
    let store = open_bets(config)?;
    let settings = open_settings(config)?;
    let bets = store.bets();

    println!("👋 Hello, {}", settings.settings().name);
    println!();

    if bets.is_empty() {
        println!("No bets recorded yet. Add one with `bettrack add`.");
        return Ok(());
    }

    let summary = stats::summarize(bets);
    println!("📊 OVERVIEW");
    println!("─────────────────────────────────────────");
    println!("Total bets:      {} ({} won, {} lost)", summary.total_bets, summary.wins, summary.losses);
    println!("Total wagered:   {}", config.money(summary.total_wagered));
    println!("Profit/loss:     {}", config.money(summary.net_profit));
    println!("Win rate:        {:.2}%", summary.win_rate);
    println!("ROI:             {:.2}%", summary.roi);
    println!();

    let goal = stats::monthly_goal_progress(bets, settings.settings().monthly_goal, today);
    println!("🎯 MONTHLY GOAL ({}-{:02})", goal.year, goal.month);
    println!("─────────────────────────────────────────");
    println!(
        "{} of {} ({:.1}%) from {} bets",
        config.money(goal.profit),
        config.money(goal.goal),
        goal.percent,
        goal.bets
    );
    println!();

    println!("🕒 RECENT BETS");
    let recent = filter::recent(bets, config.display.recent_limit);
    println!("{}", output::bets_table(&recent, &config.display.date_format));
    Ok(())
}

fn show_stats(config: &TrackerConfig, bet_filter: &BetFilter, today: NaiveDate) -> Result<()> {
    let store = open_bets(config)?;
    let bets: Vec<_> = bet_filter.apply(store.bets(), today).into_iter().cloned().collect();

    if bets.is_empty() {
        println!("No bets match the selected filters.");
        return Ok(());
    }

    let summary = stats::summarize(&bets);
    println!("📊 STATISTICS");
    println!("─────────────────────────────────────────");
    println!("Total bets:      {}", summary.total_bets);
    println!("Won / lost:      {} / {}", summary.wins, summary.losses);
    println!("Total wagered:   {}", config.money(summary.total_wagered));
    println!("Total returns:   {}", config.money(summary.total_winnings));
    println!("Profit/loss:     {}", config.money(summary.net_profit));
    println!("Win rate:        {:.2}%", summary.win_rate);
    println!("ROI:             {:.2}%", summary.roi);
    println!();

    println!("📈 PERFORMANCE BY CATEGORY");
    println!("{}", output::category_table(&stats::category_performance(&bets)));
    println!();

    println!("📋 DISTRIBUTION");
    for share in stats::category_distribution(&bets) {
        println!("  {:<12} {:3} bets  {:3}%", share.name, share.count, share.percent);
    }
    println!();

    match stats::best_winning_odds(&bets) {
        Some(bet) => println!(
            "🏆 Best winning odds:  {} ({}, {}) won {}",
            fixed2(bet.odds),
            bet.category,
            bet.date.format(&config.display.date_format),
            config.money(bet.profit())
        ),
        None => println!("🏆 Best winning odds:  no winning bets"),
    }
    match stats::worst_losing_odds(&bets) {
        Some(bet) => println!(
            "⚠️  Worst losing odds: {} ({}, {}) lost {}",
            fixed2(bet.odds),
            bet.category,
            bet.date.format(&config.display.date_format),
            config.money(bet.amount)
        ),
        None => println!("⚠️  Worst losing odds: no losing bets"),
    }
    Ok(())
}

fn show_roi(config: &TrackerConfig) -> Result<()> {
    let store = open_bets(config)?;
    let series = stats::roi_series(store.bets());

    if series.is_empty() {
        println!("No bets recorded yet.");
        return Ok(());
    }

    println!("📈 CUMULATIVE ROI");
    println!("{}", output::roi_table(&series, &config.display.date_format));
    Ok(())
}

fn render_chart(
    config: &TrackerConfig,
    kind: ChartKind,
    out: &Path,
    progress: f64,
    hover: Option<(f64, f64)>,
) -> Result<()> {
    let store = open_bets(config)?;
    let charts = &config.charts;

    let svg = match kind {
        ChartKind::Pie => {
            let shares = stats::category_distribution(store.bets());
            let layout = PieLayout::compute(&shares, charts.width, charts.height, charts.pie_margin, progress);
            let active = hover.and_then(|(x, y)| layout.active_slice(x, y));
            if let Some(slice) = active.and_then(|i| layout.slices.get(i)) {
                println!("{}", slice.tooltip());
            }
            chart::render_pie_svg(&layout, active)
        }
        ChartKind::Roi => {
            let series = stats::roi_series(store.bets());
            let layout = RoiLayout::compute(
                &series,
                charts.width,
                charts.height,
                charts.padding,
                charts.grid_lines,
                charts.x_labels,
                progress,
            );
            if let Some(point) = hover.and_then(|(x, y)| layout.hit_test(x, y)) {
                println!("{}", point.tooltip(&config.display.date_format));
            }
            chart::render_roi_svg(&layout, &config.display.date_format)
        }
    };

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(out, svg).with_context(|| format!("Failed to write chart to {}", out.display()))?;

    info!("Chart written to {}", out.display());
    println!("💾 Chart saved to {}", out.display());
    Ok(())
}

fn export(
    config: &TrackerConfig,
    format: ExportFormat,
    out: Option<PathBuf>,
    options: &ExportOptions,
    today: NaiveDate,
) -> Result<()> {
    let store = open_bets(config)?;
    let kind = match format {
        ExportFormat::Csv => ExportKind::Csv,
        ExportFormat::Pdf => ExportKind::Pdf,
    };
    let path = output::export_path(out, &config.export.output_dir, &config.export.file_prefix, kind, today);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    match kind {
        ExportKind::Csv => output::export_csv(store.bets(), options, &path)
            .with_context(|| format!("Failed to export CSV to {}", path.display()))?,
        ExportKind::Pdf => output::export_pdf(store.bets(), options, &path, today)
            .with_context(|| format!("Failed to export PDF to {}", path.display()))?,
    }

    println!("💾 Exported {} bets to {}", store.bets().len(), path.display());
    Ok(())
}

fn print_report(config: &TrackerConfig, out: Option<&Path>) -> Result<()> {
    let store = open_bets(config)?;
    let report = output::generate_report(
        store.bets(),
        &config.display.currency_symbol,
        &config.display.date_format,
    );
    println!("{}", report);

    if let Some(path) = out {
        std::fs::write(path, &report)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("💾 Report saved to {}", path.display());
    }
    Ok(())
}

fn handle_settings(config: &TrackerConfig, action: SettingsAction) -> Result<()> {
    let mut store = open_settings(config)?;

    match action {
        SettingsAction::Show => {}
        SettingsAction::Set { name, email, monthly_goal, notifications } => {
            let patch = SettingsPatch {
                name,
                email,
                monthly_goal,
                dark_mode: None,
                notifications,
            };
            store.update(patch).context("Failed to save settings")?;
            println!("✅ Settings saved");
        }
        SettingsAction::ToggleDarkMode => {
            let dark_mode = store.toggle_dark_mode().context("Failed to save settings")?;
            println!("✅ Dark mode {}", if dark_mode { "enabled" } else { "disabled" });
        }
    }

    let settings = store.settings();
    println!("Name:           {}", settings.name);
    println!("Email:          {}", settings.email);
    println!("Monthly goal:   {}", config.money(settings.monthly_goal));
    println!("Dark mode:      {}", if settings.dark_mode { "on" } else { "off" });
    println!("Notifications:  {}", if settings.notifications { "on" } else { "off" });
    Ok(())
}

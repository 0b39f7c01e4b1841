use chrono::NaiveDate;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::info;

use crate::error::Result;
use crate::models::{fixed2, Bet};
use crate::stats::{self, CategoryPerformance, RoiPoint, Summary};

/// What goes into an export
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub include_id: bool,
    pub include_date: bool,
    pub include_category: bool,
    pub include_amount: bool,
    pub include_odds: bool,
    pub include_result: bool,
    pub include_profit: bool,
    /// Statistics and per-category sections
    pub include_stats: bool,
    pub include_win_rate: bool,
    pub include_roi: bool,
    pub date_format: String,
    pub currency_symbol: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_id: false,
            include_date: true,
            include_category: true,
            include_amount: true,
            include_odds: true,
            include_result: true,
            include_profit: true,
            include_stats: true,
            include_win_rate: true,
            include_roi: true,
            date_format: "%Y-%m-%d".to_string(),
            currency_symbol: "R$".to_string(),
        }
    }
}

impl ExportOptions {
    /// Headers of the selected bet columns
    pub fn headers(&self) -> Vec<String> {
        let stake = format!("Stake ({})", self.currency_symbol);
        let profit = format!("Profit/Loss ({})", self.currency_symbol);
        [
            (self.include_id, "Id"),
            (self.include_date, "Date"),
            (self.include_category, "Category"),
            (self.include_amount, stake.as_str()),
            (self.include_odds, "Odds"),
            (self.include_result, "Result"),
            (self.include_profit, profit.as_str()),
        ]
        .iter()
        .filter(|(include, _)| *include)
        .map(|(_, header)| header.to_string())
        .collect()
    }

    /// Selected cells of one bet, in header order
    pub fn row(&self, bet: &Bet) -> Vec<String> {
        let mut row = Vec::new();
        if self.include_id {
            row.push(bet.id.clone());
        }
        if self.include_date {
            row.push(bet.date.format(&self.date_format).to_string());
        }
        if self.include_category {
            row.push(bet.category.clone());
        }
        if self.include_amount {
            row.push(fixed2(bet.amount));
        }
        if self.include_odds {
            row.push(fixed2(bet.odds));
        }
        if self.include_result {
            row.push(bet.result.label().to_string());
        }
        if self.include_profit {
            row.push(fixed2(bet.profit()));
        }
        row
    }

    /// Label/value pairs of the statistics section
    pub fn summary_rows(&self, summary: &Summary, money: impl Fn(&str) -> String) -> Vec<[String; 2]> {
        let mut rows = vec![
            ["Total bets".to_string(), summary.total_bets.to_string()],
            ["Bets won".to_string(), summary.wins.to_string()],
            ["Bets lost".to_string(), summary.losses.to_string()],
            ["Total wagered".to_string(), money(&fixed2(summary.total_wagered))],
            ["Total profit/loss".to_string(), money(&fixed2(summary.net_profit))],
        ];
        if self.include_win_rate {
            rows.push(["Win rate".to_string(), format!("{:.2}%", summary.win_rate)]);
        }
        if self.include_roi {
            rows.push(["ROI".to_string(), format!("{:.2}%", summary.roi)]);
        }
        rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Pdf,
}

/// `{prefix}_bets_{date}.csv` or `{prefix}_report_{date}.pdf`
pub fn export_filename(prefix: &str, kind: ExportKind, date: NaiveDate) -> String {
    match kind {
        ExportKind::Csv => format!("{}_bets_{}.csv", prefix, date.format("%Y-%m-%d")),
        ExportKind::Pdf => format!("{}_report_{}.pdf", prefix, date.format("%Y-%m-%d")),
    }
}

/// Export bets to CSV
/// Format: one row per bet, then a STATISTICS section and a
/// PERFORMANCE BY CATEGORY section when statistics are enabled
pub fn export_csv(bets: &[Bet], options: &ExportOptions, path: &Path) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(path)?;

    wtr.write_record(options.headers())?;
    for bet in bets {
        wtr.write_record(options.row(bet))?;
    }

    if options.include_stats {
        let summary = stats::summarize(bets);

        wtr.write_record([""])?;
        wtr.write_record(["STATISTICS"])?;
        for row in options.summary_rows(&summary, |v| v.to_string()) {
            wtr.write_record(&row)?;
        }

        wtr.write_record([""])?;
        wtr.write_record(["PERFORMANCE BY CATEGORY"])?;
        let mut header = vec!["Category", "Bets"];
        if options.include_win_rate {
            header.push("Win rate");
        }
        header.push("Profit/Loss");
        wtr.write_record(&header)?;

        for perf in stats::category_performance(bets) {
            let mut row = vec![perf.category.clone(), perf.count.to_string()];
            if options.include_win_rate {
                row.push(format!("{:.1}%", perf.win_rate));
            }
            row.push(fixed2(perf.profit));
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    info!("Exported {} bets to {}", bets.len(), path.display());
    Ok(())
}

// ============================================================================
// PDF REPORT
// ============================================================================

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 14.0;
const HEADER_BAND_MM: f64 = 30.0;
const STATS_TOP_MM: f64 = 50.0;
const STATS_ROW_MM: f64 = 9.0;
const HEAD_ROW_MM: f64 = 8.0;
const BET_ROW_MM: f64 = 7.0;
const CONTINUATION_TOP_MM: f64 = 20.0;
/// Tables stop here so the footer stays clear
const CONTENT_BOTTOM_MM: f64 = PAGE_HEIGHT_MM - 20.0;

/// Bet rows placed on one page; `table_top` is measured from the top edge
#[derive(Debug, Clone, PartialEq)]
pub struct PageRows {
    pub start: usize,
    pub end: usize,
    pub table_top: f64,
}

/// Where every part of the PDF report goes
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    /// Top of the statistics table, absent when statistics are disabled
    pub stats_top: Option<f64>,
    pub history_title_y: f64,
    pub pages: Vec<PageRows>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Split `bet_rows` history rows over A4 pages. The first page carries the
/// header band and the statistics table; later pages repeat the column header.
pub fn plan_pages(stats_rows: Option<usize>, bet_rows: usize) -> PagePlan {
    let history_title_y = match stats_rows {
        Some(n) => STATS_TOP_MM + n as f64 * STATS_ROW_MM + 15.0,
        None => STATS_TOP_MM - 5.0,
    };

    let capacity = |table_top: f64| {
        (((CONTENT_BOTTOM_MM - table_top - HEAD_ROW_MM) / BET_ROW_MM).floor() as usize).max(1)
    };

    let mut pages = Vec::new();
    let mut start = 0;
    let mut table_top = history_title_y + 5.0;
    loop {
        let end = (start + capacity(table_top)).min(bet_rows);
        pages.push(PageRows { start, end, table_top });
        if end >= bet_rows {
            break;
        }
        start = end;
        table_top = CONTINUATION_TOP_MM;
    }

    PagePlan {
        stats_top: stats_rows.map(|_| STATS_TOP_MM),
        history_title_y,
        pages,
    }
}

/// Rough Helvetica text width, used to right-align and centre text
fn text_width_mm(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * 0.5 * 0.3528
}

mod pdf {
    use printpdf::path::PaintMode;
    use printpdf::{Color, IndirectFontRef, Mm, PdfLayerReference, Rect, Rgb};

    use super::PAGE_HEIGHT_MM;

    pub fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
    }

    /// Filled rectangle, `top` measured from the top edge of the page
    pub fn fill_rect(layer: &PdfLayerReference, x: f64, top: f64, width: f64, height: f64, color: Color) {
        layer.set_fill_color(color);
        let rect = Rect::new(
            Mm(x as f32),
            Mm((PAGE_HEIGHT_MM - top - height) as f32),
            Mm((x + width) as f32),
            Mm((PAGE_HEIGHT_MM - top) as f32),
        )
        .with_mode(PaintMode::Fill);
        layer.add_rect(rect);
    }

    pub fn stroke_rect(layer: &PdfLayerReference, x: f64, top: f64, width: f64, height: f64) {
        layer.set_outline_color(rgb(200, 200, 200));
        layer.set_outline_thickness(0.3);
        let rect = Rect::new(
            Mm(x as f32),
            Mm((PAGE_HEIGHT_MM - top - height) as f32),
            Mm((x + width) as f32),
            Mm((PAGE_HEIGHT_MM - top) as f32),
        )
        .with_mode(PaintMode::Stroke);
        layer.add_rect(rect);
    }

    /// Text whose baseline sits `baseline` mm below the top edge
    pub fn text(layer: &PdfLayerReference, text: &str, size: f64, x: f64, baseline: f64, font: &IndirectFontRef, color: Color) {
        layer.set_fill_color(color);
        layer.use_text(text, size as f32, Mm(x as f32), Mm((PAGE_HEIGHT_MM - baseline) as f32), font);
    }
}

/// Export the betting report to an A4 PDF
pub fn export_pdf(bets: &[Bet], options: &ExportOptions, path: &Path, generated_on: NaiveDate) -> Result<()> {
    use printpdf::{BuiltinFont, Mm, PdfDocument};

    let summary = stats::summarize(bets);
    let money = |v: &str| format!("{} {}", options.currency_symbol, v);
    let stats_rows = options.summary_rows(&summary, money);
    let headers = options.headers();
    let rows: Vec<Vec<String>> = bets.iter().map(|b| options.row(b)).collect();
    let plan = plan_pages(options.include_stats.then_some(stats_rows.len()), rows.len());

    let (doc, first_page, first_layer) = PdfDocument::new(
        "BetTrack - Betting Report",
        Mm(PAGE_WIDTH_MM as f32),
        Mm(PAGE_HEIGHT_MM as f32),
        "Layer 1",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let black = || pdf::rgb(0, 0, 0);
    let grey = || pdf::rgb(100, 100, 100);
    let blue = || pdf::rgb(41, 128, 185);
    let white = || pdf::rgb(255, 255, 255);

    let column_width = if headers.is_empty() {
        0.0
    } else {
        (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / headers.len() as f64
    };
    let total_pages = plan.page_count();

    for (page_number, page) in plan.pages.iter().enumerate() {
        let layer = if page_number == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(PAGE_WIDTH_MM as f32), Mm(PAGE_HEIGHT_MM as f32), "Layer 1");
            doc.get_page(p).get_layer(l)
        };

        if page_number == 0 {
            pdf::fill_rect(&layer, 0.0, 0.0, PAGE_WIDTH_MM, HEADER_BAND_MM, blue());
            pdf::text(&layer, "BetTrack", 22.0, MARGIN_MM, 15.0, &bold, white());
            pdf::text(&layer, "Betting Report", 12.0, MARGIN_MM, 22.0, &regular, white());

            let generated = format!("Generated on: {}", generated_on.format(&options.date_format));
            let x = PAGE_WIDTH_MM - MARGIN_MM - text_width_mm(&generated, 10.0);
            pdf::text(&layer, &generated, 10.0, x, 38.0, &regular, grey());

            if let Some(stats_top) = plan.stats_top {
                pdf::text(&layer, "Statistical Summary", 14.0, MARGIN_MM, 45.0, &bold, black());
                for (i, [label, value]) in stats_rows.iter().enumerate() {
                    let top = stats_top + i as f64 * STATS_ROW_MM;
                    pdf::stroke_rect(&layer, MARGIN_MM, top, 80.0, STATS_ROW_MM);
                    pdf::stroke_rect(&layer, MARGIN_MM + 80.0, top, 60.0, STATS_ROW_MM);
                    pdf::text(&layer, label, 10.0, MARGIN_MM + 3.0, top + 6.0, &bold, black());
                    pdf::text(&layer, value, 10.0, MARGIN_MM + 83.0, top + 6.0, &regular, black());
                }
            }

            pdf::text(&layer, "Bet History", 14.0, MARGIN_MM, plan.history_title_y, &bold, black());
        }

        // Column header, repeated on every page
        pdf::fill_rect(&layer, MARGIN_MM, page.table_top, PAGE_WIDTH_MM - 2.0 * MARGIN_MM, HEAD_ROW_MM, blue());
        for (c, header) in headers.iter().enumerate() {
            let x = MARGIN_MM + c as f64 * column_width + 2.0;
            pdf::text(&layer, header, 9.0, x, page.table_top + 5.5, &bold, white());
        }

        for (offset, row) in rows[page.start..page.end].iter().enumerate() {
            let top = page.table_top + HEAD_ROW_MM + offset as f64 * BET_ROW_MM;
            if (page.start + offset) % 2 == 1 {
                pdf::fill_rect(&layer, MARGIN_MM, top, PAGE_WIDTH_MM - 2.0 * MARGIN_MM, BET_ROW_MM, pdf::rgb(245, 245, 245));
            }
            for (c, cell) in row.iter().enumerate() {
                let x = MARGIN_MM + c as f64 * column_width + 2.0;
                pdf::text(&layer, cell, 9.0, x, top + 5.0, &regular, black());
            }
        }

        let footer = format!("BetTrack - Betting Report - Page {} of {}", page_number + 1, total_pages);
        let x = (PAGE_WIDTH_MM - text_width_mm(&footer, 8.0)) / 2.0;
        pdf::text(&layer, &footer, 8.0, x, PAGE_HEIGHT_MM - 10.0, &regular, grey());
    }

    let mut writer = BufWriter::new(File::create(path)?);
    doc.save(&mut writer)?;
    info!("Exported {} bets to {} ({} pages)", bets.len(), path.display(), total_pages);
    Ok(())
}

/// Resolve an export destination: the explicit path, or a dated file in `output_dir`
pub fn export_path(explicit: Option<PathBuf>, output_dir: &Path, prefix: &str, kind: ExportKind, today: NaiveDate) -> PathBuf {
    explicit.unwrap_or_else(|| output_dir.join(export_filename(prefix, kind, today)))
}

// ============================================================================
// TERMINAL OUTPUT
// ============================================================================

#[derive(Tabled)]
struct BetRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Stake")]
    amount: String,
    #[tabled(rename = "Odds")]
    odds: String,
    #[tabled(rename = "Result")]
    result: &'static str,
    #[tabled(rename = "Profit/Loss")]
    profit: String,
}

/// Table of bets; ids are shortened to their first 8 characters
pub fn bets_table(bets: &[&Bet], date_format: &str) -> String {
    let rows: Vec<BetRow> = bets
        .iter()
        .map(|b| BetRow {
            id: b.id.chars().take(8).collect(),
            date: b.date.format(date_format).to_string(),
            category: b.category.clone(),
            amount: fixed2(b.amount),
            odds: fixed2(b.odds),
            result: b.result.label(),
            profit: fixed2(b.profit()),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Bets")]
    count: usize,
    #[tabled(rename = "Wins")]
    wins: usize,
    #[tabled(rename = "Win rate")]
    win_rate: String,
    #[tabled(rename = "95% CI")]
    interval: String,
    #[tabled(rename = "Profit/Loss")]
    profit: String,
    #[tabled(rename = "ROI")]
    roi: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
}

pub fn category_table(rows: &[CategoryPerformance]) -> String {
    let rows: Vec<CategoryRow> = rows
        .iter()
        .map(|p| CategoryRow {
            category: p.category.clone(),
            count: p.count,
            wins: p.wins,
            win_rate: format!("{:.1}%", p.win_rate),
            interval: format!("{:.0}%-{:.0}%", p.win_rate_lower * 100.0, p.win_rate_upper * 100.0),
            profit: fixed2(p.profit),
            roi: format!("{:.2}%", p.roi),
            confidence: p.confidence_level.to_string(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct RoiRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Wagered")]
    wagered: String,
    #[tabled(rename = "Profit/Loss")]
    profit: String,
    #[tabled(rename = "ROI")]
    roi: String,
}

pub fn roi_table(series: &[RoiPoint], date_format: &str) -> String {
    let rows: Vec<RoiRow> = series
        .iter()
        .map(|p| RoiRow {
            date: p.date.format(date_format).to_string(),
            wagered: fixed2(p.wagered),
            profit: fixed2(p.profit),
            roi: format!("{:.2}%", p.roi),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Generate a human-readable summary report
pub fn generate_report(bets: &[Bet], currency_symbol: &str, date_format: &str) -> String {
    let mut report = String::new();

    report.push_str("╔══════════════════════════════════════════════════════════════════╗\n");
    report.push_str("║                 BETTRACK - BETTING ACTIVITY REPORT               ║\n");
    report.push_str("╚══════════════════════════════════════════════════════════════════╝\n\n");

    if bets.is_empty() {
        report.push_str("No bets recorded yet.\n");
        return report;
    }

    let summary = stats::summarize(bets);
    let money = |v: rust_decimal::Decimal| format!("{} {}", currency_symbol, fixed2(v));

    report.push_str("📊 SUMMARY\n");
    report.push_str("─────────────────────────────────────────\n");
    report.push_str(&format!("Total bets:        {}\n", summary.total_bets));
    report.push_str(&format!("Won / lost:        {} / {}\n", summary.wins, summary.losses));
    report.push_str(&format!("Total wagered:     {}\n", money(summary.total_wagered)));
    report.push_str(&format!("Total returns:     {}\n", money(summary.total_winnings)));
    report.push_str(&format!("Net profit/loss:   {}\n", money(summary.net_profit)));
    report.push_str(&format!("Win rate:          {:.2}%\n", summary.win_rate));
    report.push_str(&format!("ROI:               {:.2}%\n", summary.roi));
    if let (Some(first), Some(last)) = (bets.iter().map(|b| b.date).min(), bets.iter().map(|b| b.date).max()) {
        report.push_str(&format!("Date range:        {} to {}\n", first.format(date_format), last.format(date_format)));
    }
    report.push('\n');

    report.push_str("📈 PERFORMANCE BY CATEGORY (most profitable first)\n");
    report.push_str("─────────────────────────────────────────\n");
    for perf in stats::category_performance(bets) {
        report.push_str(&format!(
            "  {:<12} | {:3} bets | win rate {:5.1}% (CI: {:.0}%-{:.0}%) | {} | ROI {:.2}%\n",
            perf.category,
            perf.count,
            perf.win_rate,
            perf.win_rate_lower * 100.0,
            perf.win_rate_upper * 100.0,
            money(perf.profit),
            perf.roi
        ));
    }
    report.push('\n');

    report.push_str("🎯 ODDS EXTREMES\n");
    report.push_str("─────────────────────────────────────────\n");
    match stats::best_winning_odds(bets) {
        Some(bet) => report.push_str(&format!(
            "Best winning odds:  {} ({} - {}), gain {}\n",
            fixed2(bet.odds),
            bet.category,
            bet.date.format(date_format),
            money(bet.profit())
        )),
        None => report.push_str("Best winning odds:  no winning bets\n"),
    }
    match stats::worst_losing_odds(bets) {
        Some(bet) => report.push_str(&format!(
            "Worst losing odds:  {} ({} - {}), loss {}\n",
            fixed2(bet.odds),
            bet.category,
            bet.date.format(date_format),
            money(bet.amount)
        )),
        None => report.push_str("Worst losing odds:  no losing bets\n"),
    }

    report.push('\n');
    report.push_str("═══════════════════════════════════════════════════════════════════\n");

    report
}

//! Terminal rendering for the valuation flow

use colored::*;
use crossterm::terminal::size;

use tiv_core::{ProgressReceiver, ValuationEvent, ValuationRecord};

const BANNER_TITLE: &str = "TIV - Trade-In Valuator";

/// Banner width for a terminal, never narrower than the title box
fn banner_width(terminal_width: usize) -> usize {
    std::cmp::min(58, terminal_width.saturating_sub(4)).max(BANNER_TITLE.len() + 4)
}

/// Display the startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let width = banner_width(terminal_width);

    let top_border = format!("┌{}┐", "─".repeat(width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(width - 2));
    let empty_line = format!("│{}│", " ".repeat(width - 2));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title_line = format!(
        "│  {}{}│",
        BANNER_TITLE.blue().bold(),
        " ".repeat(width.saturating_sub(BANNER_TITLE.len() + 4))
    );
    println!("{}", title_line);
    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
}

/// Render live stage progress from orchestrator events
///
/// Consumes events until the channel closes; returns once the run completed
/// or failed. Warnings accumulated on the snapshots surface immediately so
/// the operator sees a degraded source the moment it degrades.
pub async fn render_progress(mut events: ProgressReceiver) {
    let mut reported_warnings = 0;
    while let Some(event) = events.recv().await {
        match event {
            ValuationEvent::StageCompleted { stage, snapshot } => {
                println!("{} {} done", "✓".green(), stage);
                for warning in snapshot.warnings.iter().skip(reported_warnings) {
                    println!("  {} {}", "⚠".yellow(), warning.yellow());
                }
                reported_warnings = snapshot.warnings.len();
            }
            ValuationEvent::Completed { .. } => {
                println!("{} valuation completed", "✓".green().bold());
                return;
            }
            ValuationEvent::Failed { reason, .. } => {
                println!("{} valuation failed: {}", "✗".red().bold(), reason.red());
                return;
            }
        }
    }
}

/// Print the final advice report for a completed record
pub fn print_report(record: &ValuationRecord) {
    println!();
    println!("{}", "Trade-in valuation".bold());
    println!("  {}", record.descriptor.summary());
    println!();

    if let Some(advice) = &record.advice {
        println!(
            "  {} {}",
            "Advised trade-in price:".bold(),
            format!("€ {:.0}", advice.trade_in_price).green().bold()
        );
        println!("  Confidence: {:.0}%", record.confidence * 100.0);
        println!();
        println!("  {}", advice.rationale);

        if !advice.risk_flags.is_empty() {
            println!();
            println!("  {}", "Risks:".bold());
            for flag in &advice.risk_flags {
                println!("    {} {}", "•".yellow(), flag);
            }
        }
    }

    if let Some(catalog) = &record.catalog {
        if !catalog.is_unavailable() {
            println!();
            println!(
                "  Catalog: € {:.0} ({:.0} – {:.0}), {}",
                catalog.total_value, catalog.range.min, catalog.range.max, catalog.liquidity
            );
        }
    }

    if let Some(market) = &record.market {
        if !market.is_unavailable() {
            println!(
                "  Market: {} listings ({} primary), median € {:.0}",
                market.listing_count, market.primary_count, market.median_price
            );
        }
    }

    if let Some(history) = &record.history {
        if !history.is_unavailable() {
            println!(
                "  Own sales, 12m: {} consumer / {} business, avg margin € {:.0}",
                history.sold_consumer_12m, history.sold_business_12m, history.average_margin
            );
        }
    }

    if !record.warnings.is_empty() {
        println!();
        println!("  {}", "Data partially unavailable:".yellow().bold());
        for warning in &record.warnings {
            println!("    {} {}", "⚠".yellow(), warning);
        }
    }

    if let Some(id) = &record.id {
        println!();
        println!("  {}", format!("Recorded as {}", id).dimmed());
    }
    println!();
}

//! Text, JSON and CSV presentation of engine results.

use amarantos_ranker::value::ValuationOutcome;
use amarantos_ranker::{RankedEntry, RankingOutcome, RejectedChoice};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// One flat CSV row per ranked entry.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    rank: usize,
    name: &'a str,
    domain: &'a str,
    percentile_years: f64,
    mean_years: f64,
    std_years: f64,
    annual_cost_usd: f64,
    annual_hours: f64,
    verdict: &'static str,
}

/// Render a ranking in the requested format. With `top = Some(n)` only the
/// best `n` and worst `n` entries are shown, keeping their overall rank.
pub fn write_ranking<W: Write>(
    out: &mut W,
    outcome: &RankingOutcome,
    format: OutputFormat,
    top: Option<usize>,
) -> anyhow::Result<()> {
    let rows = ranked_rows(&outcome.entries, top);
    match format {
        OutputFormat::Text => write_ranking_table(out, &rows),
        OutputFormat::Json => {
            let shown = RankingOutcome {
                entries: rows.iter().map(|(_, e)| (*e).clone()).collect(),
                rejected: outcome.rejected.clone(),
            };
            serde_json::to_writer_pretty(&mut *out, &shown)?;
            writeln!(out)?;
            Ok(())
        }
        OutputFormat::Csv => write_ranking_csv(out, &rows),
    }
}

/// `(rank, entry)` pairs, 1-based, trimmed to the top and bottom `n`.
fn ranked_rows(entries: &[RankedEntry], top: Option<usize>) -> Vec<(usize, &RankedEntry)> {
    let mut rows: Vec<_> = entries.iter().enumerate().map(|(i, e)| (i + 1, e)).collect();
    if let Some(n) = top {
        keep_top_and_bottom(&mut rows, n);
    }
    rows
}

fn write_ranking_table<W: Write>(out: &mut W, rows: &[(usize, &RankedEntry)]) -> anyhow::Result<()> {
    let width = rows
        .iter()
        .map(|(_, e)| e.choice.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Choice".len());
    let label = rows
        .first()
        .map(|(_, e)| format!("P{:.0} (years)", e.percentile * 100.0))
        .unwrap_or_else(|| "Percentile (years)".to_string());

    writeln!(
        out,
        "{:>4}  {:<width$}  {:<10}  {:>18}  {:>10}  {:>8}",
        "#", "Choice", "Domain", label, "$/year", "h/year"
    )?;
    let mut previous = 0;
    for &(rank, e) in rows {
        if rank > previous + 1 {
            writeln!(out, "{:>4}", "...")?;
        }
        previous = rank;
        writeln!(
            out,
            "{:>4}  {:<width$}  {:<10}  {:>18.3}  {:>10.0}  {:>8.0}",
            rank,
            e.choice.name,
            e.choice.domain,
            e.p30,
            e.choice.annual_cost_usd,
            e.choice.annual_hours
        )?;
    }
    if rows.is_empty() {
        writeln!(out, "(no choices matched)")?;
    }
    Ok(())
}

fn write_ranking_csv<W: Write>(out: &mut W, rows: &[(usize, &RankedEntry)]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for &(rank, e) in rows {
        wtr.serialize(CsvRow {
            rank,
            name: &e.choice.name,
            domain: &e.choice.domain,
            percentile_years: e.p30,
            mean_years: e.aggregate_mean,
            std_years: e.aggregate_std,
            annual_cost_usd: e.choice.annual_cost_usd,
            annual_hours: e.choice.annual_hours,
            verdict: e.verdict.marker(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Catalogue grouped by domain, each choice marked by its evidence verdict.
pub fn write_catalogue<W: Write>(
    out: &mut W,
    entries: &[RankedEntry],
    domain: Option<&str>,
) -> anyhow::Result<()> {
    match domain {
        Some(d) => writeln!(out, "{d} choices ({} total)", entries.len())?,
        None => writeln!(out, "All choices ({} total)", entries.len())?,
    }
    writeln!(out)?;

    let mut by_domain: BTreeMap<&str, Vec<&RankedEntry>> = BTreeMap::new();
    for e in entries {
        by_domain.entry(&e.choice.domain).or_default().push(e);
    }
    for (domain, mut group) in by_domain {
        group.sort_by_cached_key(|e| (e.choice.name.to_lowercase(), e.choice.name.clone()));
        let noun = if group.len() == 1 { "choice" } else { "choices" };
        writeln!(out, "[{}] ({} {noun})", domain.to_uppercase(), group.len())?;
        for e in group {
            writeln!(
                out,
                "  {} {:<40} {:>7.2} ± {:.2} years",
                e.verdict.marker(),
                e.choice.name,
                e.aggregate_mean,
                e.aggregate_std
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Keep the first and last `n` entries of a sorted list.
pub fn keep_top_and_bottom<T>(entries: &mut Vec<T>, n: usize) {
    if entries.len() > 2 * n {
        entries.drain(n..entries.len() - n);
    }
}

/// Signed whole-dollar amount with thousands separators, e.g. `+$1,234`.
pub fn format_usd(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { '-' } else { '+' };
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}")
}

pub fn write_valuation<W: Write>(
    out: &mut W,
    outcome: &ValuationOutcome,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, outcome)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(&mut *out);
            wtr.write_record(["name", "domain", "benefit_usd", "cost_usd", "net_value_usd"])?;
            for v in &outcome.entries {
                wtr.write_record([
                    v.choice.name.clone(),
                    v.choice.domain.clone(),
                    v.benefit_usd.to_string(),
                    v.cost_usd.to_string(),
                    v.net_value_usd.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Text => {
            for v in &outcome.entries {
                writeln!(
                    out,
                    "{:>14}/year  {} ({})",
                    format_usd(v.net_value_usd),
                    v.choice.name,
                    v.choice.domain
                )?;
            }
            if outcome.entries.is_empty() {
                writeln!(out, "(no choices matched)")?;
            }
        }
    }
    Ok(())
}

/// One line per skipped choice.
pub fn write_rejected<W: Write>(out: &mut W, rejected: &[RejectedChoice]) -> anyhow::Result<()> {
    for r in rejected {
        writeln!(out, "skipped {}/{}: {}", r.domain, r.name, r.reason)?;
    }
    Ok(())
}

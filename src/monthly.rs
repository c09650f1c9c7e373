use crate::config::Config;
use crate::daily::{aggregate_day, DayJournal, OrderTotals, UnmappedPayment};
use crate::journal::{BalanceCheck, JournalAccount, JournalAmount, JournalLine};
use crate::order::{raw, Order, OrderExport, SkippedRow};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;

/// Accounting month being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .with_context(|| format!("Invalid period month {} year {}", month, year))?;
        Ok(Self { month, year })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.year() == self.year
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub orders: usize,
    pub lines: usize,
    pub balance: BalanceCheck,
    pub balanced: bool,
}

impl From<&DayJournal> for DaySummary {
    fn from(day: &DayJournal) -> Self {
        Self {
            date: day.date,
            orders: day.orders,
            lines: day.lines.len(),
            balance: day.balance,
            balanced: day.is_balanced(),
        }
    }
}

/// Net movement of one account over the month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountTotal {
    pub account: JournalAccount,
    pub amount: JournalAmount,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub period: Period,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub orders: usize,
    pub totals: OrderTotals,
    pub days: Vec<DaySummary>,
    pub balance: BalanceCheck,
    pub balanced: bool,
    pub imbalanced_days: usize,
    pub skipped: Vec<SkippedRow>,
    pub out_of_period: usize,
    pub unmapped: Vec<UnmappedPayment>,
    pub account_totals: Vec<AccountTotal>,
}

/// Lines for the whole month in date order, with the summary of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyJournal {
    pub lines: Vec<JournalLine>,
    pub summary: MonthlySummary,
}

/// Converts every order of `period` into journal lines, one balanced set per
/// day. Rows with unreadable dates are skipped and listed; imbalances are
/// reported and never stop the run.
pub fn convert_month(orders: &[raw::Order], period: Period, config: &Config) -> MonthlyJournal {
    info!("Processing all days of {}", period);

    let mut skipped = Vec::new();
    let mut out_of_period = 0;
    let mut by_date: BTreeMap<NaiveDate, Vec<Order>> = BTreeMap::new();
    for raw_order in orders {
        match Order::try_from(raw_order.clone()) {
            Ok(order) if period.contains(order.date) => {
                by_date.entry(order.date).or_default().push(order)
            }
            Ok(_) => out_of_period += 1,
            Err(err) => {
                warn!("Skipping line {}: {}", raw_order.line, err);
                skipped.push(SkippedRow {
                    line: raw_order.line,
                    created_at: raw_order.created_at.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    info!(
        "Found {} orders across {} days in {}",
        by_date.values().map(Vec::len).sum::<usize>(),
        by_date.len(),
        period
    );

    let days: Vec<DayJournal> = by_date
        .iter()
        .filter_map(|(date, orders)| aggregate_day(*date, orders, config))
        .collect();
    let lines: Vec<JournalLine> = days.iter().flat_map(|day| day.lines.clone()).collect();
    let summary = summarize(period, &days, &lines, skipped, out_of_period);
    MonthlyJournal { lines, summary }
}

/// Converts a whole export: rows the reader could not use are listed with
/// those skipped for their dates, in line order.
pub fn convert_export(export: &OrderExport, period: Period, config: &Config) -> MonthlyJournal {
    let mut journal = convert_month(&export.orders, period, config);
    let skipped = &mut journal.summary.skipped;
    skipped.extend(export.skipped.iter().cloned());
    skipped.sort_by_key(|row| row.line);
    journal
}

fn summarize(
    period: Period,
    days: &[DayJournal],
    lines: &[JournalLine],
    skipped: Vec<SkippedRow>,
    out_of_period: usize,
) -> MonthlySummary {
    let totals = days.iter().fold(OrderTotals::default(), |mut acc, day| {
        acc += day.totals;
        acc
    });

    let mut unmapped: BTreeMap<String, UnmappedPayment> = BTreeMap::new();
    for payment in days.iter().flat_map(|day| day.unmapped.iter()) {
        unmapped
            .entry(payment.label.clone())
            .and_modify(|merged| {
                merged.orders += payment.orders;
                merged.amount += payment.amount;
            })
            .or_insert_with(|| payment.clone());
    }
    for payment in unmapped.values() {
        warn!(
            "Payment method {:?} has no account mapping, {} orders ({}) posted to {}",
            payment.label, payment.orders, payment.amount, payment.account
        );
    }

    let account_totals: Vec<AccountTotal> = lines
        .iter()
        .fold(BTreeMap::<JournalAccount, JournalAmount>::new(), |mut acc, line| {
            *acc.entry(line.account.clone()).or_default() += line.amount;
            acc
        })
        .into_iter()
        .map(|(account, amount)| AccountTotal { account, amount })
        .collect();

    let day_summaries: Vec<DaySummary> = days.iter().map(DaySummary::from).collect();
    let imbalanced_days = day_summaries.iter().filter(|day| !day.balanced).count();
    let balance = BalanceCheck::of(lines);

    MonthlySummary {
        period,
        first_date: days.first().map(|day| day.date),
        last_date: days.last().map(|day| day.date),
        orders: days.iter().map(|day| day.orders).sum(),
        totals,
        days: day_summaries,
        balance,
        balanced: balance.is_balanced() && imbalanced_days == 0,
        imbalanced_days,
        skipped,
        out_of_period,
        unmapped: unmapped.into_values().collect(),
        account_totals,
    }
}

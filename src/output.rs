use crate::journal::JournalLine;
use anyhow::{bail, Context, Error, Result};
use csv::{Terminator, WriterBuilder};
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Column layout of the written journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Separate debit and credit columns
    #[default]
    Ledger,
    /// Xero manual journal import, one signed amount column
    Xero,
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ledger" => Ok(Self::Ledger),
            "xero" => Ok(Self::Xero),
            other => bail!("Unknown layout {:?}, expected ledger or xero", other),
        }
    }
}

impl Layout {
    fn headers(&self) -> &'static [&'static str] {
        match self {
            Layout::Ledger => &["Date", "AccountCode", "Description", "Debit", "Credit"],
            Layout::Xero => &[
                "*Narration",
                "*Date",
                "Description",
                "*AccountCode",
                "*Tax Rate",
                "*Amount",
            ],
        }
    }
}

#[derive(Serialize)]
struct LedgerRow<'a> {
    date: String,
    account: &'a str,
    description: &'a str,
    debit: String,
    credit: String,
}

#[derive(Serialize)]
struct XeroRow<'a> {
    narration: &'a str,
    date: String,
    description: &'a str,
    account: &'a str,
    tax_rate: &'a str,
    amount: String,
}

/// Writes the header and one row per line. An empty journal still gets
/// its header.
pub fn write_journal<W: Write>(writer: W, lines: &[JournalLine], layout: Layout) -> Result<()> {
    let mut wrt = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    wrt.write_record(layout.headers())?;
    for line in lines {
        let date = line.date.format(DATE_FORMAT).to_string();
        let row = match layout {
            Layout::Ledger => wrt.serialize(LedgerRow {
                date,
                account: &line.account,
                description: &line.description,
                debit: line.amount.as_debit().map(|m| m.to_string()).unwrap_or_default(),
                credit: line.amount.as_credit().map(|m| m.to_string()).unwrap_or_default(),
            }),
            Layout::Xero => wrt.serialize(XeroRow {
                narration: &line.description,
                date,
                description: &line.description,
                account: &line.account,
                tax_rate: &line.tax_rate,
                amount: line.amount.signed().to_string(),
            }),
        };
        row.with_context(|| format!("Failed to write journal line for {}", line.account))?;
    }
    wrt.flush()?;
    Ok(())
}

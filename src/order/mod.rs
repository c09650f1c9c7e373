pub mod raw;

use crate::money::{parse_amount, Money};
use anyhow::{anyhow, bail, Context, Error, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::warn;
use num_traits::Zero;
use serde::Serialize;
use std::convert::TryFrom;
use std::io::Read;

/// Columns the export must carry, compared after trimming and lowercasing.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "created at",
    "subtotal",
    "shipping",
    "discount amount",
    "taxes",
    "total",
    "payment method",
];

const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// A single exported order with its date resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub line: u64,
    pub date: NaiveDate,
    pub subtotal: Money,
    pub shipping: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
    pub payment_method: String,
    pub country: Option<String>,
}

impl Order {
    /// Billed outside the home country, or untaxed with positive sales when
    /// the export carries no country.
    pub fn is_zero_rated(&self, home_country: &str) -> bool {
        match &self.country {
            Some(country) => !country.eq_ignore_ascii_case(home_country.trim()),
            None => self.tax.is_zero() && self.subtotal > Money::zero(),
        }
    }
}

/// Day-first date, ignoring any time that follows it.
pub fn parse_order_date(created_at: &str) -> Result<NaiveDate> {
    let day = created_at
        .split_whitespace()
        .next()
        .ok_or_else(|| anyhow!("Empty order date"))?;
    let day = day.split('T').next().unwrap_or(day);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(day, format).ok())
        .ok_or_else(|| anyhow!("Unrecognised order date {:?}, expected DD/MM/YYYY", created_at))
}

impl TryFrom<raw::Order> for Order {
    type Error = Error;

    fn try_from(
        raw::Order {
            line,
            created_at,
            subtotal,
            shipping,
            discount_amount,
            taxes,
            total,
            payment_method,
            billing_country,
        }: raw::Order,
    ) -> Result<Self> {
        Ok(Self {
            line,
            date: parse_order_date(&created_at)?,
            subtotal: parse_amount(&subtotal),
            shipping: parse_amount(&shipping),
            discount: parse_amount(&discount_amount),
            tax: parse_amount(&taxes),
            total: parse_amount(&total),
            payment_method: payment_method.trim().to_owned(),
            country: billing_country
                .map(|c| c.trim().to_owned())
                .filter(|c| !c.is_empty()),
        })
    }
}

/// Row left out of the conversion, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub created_at: String,
    pub reason: String,
}

/// Rows read from an export, and the rows that could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderExport {
    pub orders: Vec<raw::Order>,
    pub skipped: Vec<SkippedRow>,
}

/// Reads every row of an order export. Fails only when the export itself is
/// unusable: unreadable or missing columns. Fields are decoded lossily and a
/// row that still cannot be read is skipped.
pub fn read_orders<R: Read>(reader: R, delimiter: u8) -> Result<OrderExport> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers: StringRecord = rdr
        .byte_headers()
        .context("Failed to read order export header")?
        .iter()
        .map(|h| {
            String::from_utf8_lossy(h)
                .trim_start_matches('\u{feff}')
                .trim()
                .to_lowercase()
        })
        .collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        bail!("Order export is missing required columns: {}", missing.join(", "));
    }
    let created_at = headers.iter().position(|h| h == "created at");

    let mut export = OrderExport::default();
    for record in rdr.byte_records() {
        let record = record.context("Failed to read order row")?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let record = StringRecord::from_byte_record_lossy(record);
        let order: csv::Result<raw::Order> = record.deserialize(Some(&headers));
        match order {
            Ok(mut order) => {
                order.line = line;
                export.orders.push(order);
            }
            Err(err) => {
                warn!("Skipping line {}: {}", line, err);
                export.skipped.push(SkippedRow {
                    line,
                    created_at: created_at
                        .and_then(|i| record.get(i))
                        .unwrap_or_default()
                        .to_owned(),
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(export)
}

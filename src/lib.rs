pub mod account;
pub mod config;
pub mod daily;
pub mod journal;
pub mod money;
pub mod monthly;
pub mod order;
pub mod output;
pub mod report;

use anyhow::{Context, Result};
use async_std::fs;
use config::Config;
use monthly::{MonthlyJournal, MonthlySummary, Period};
use order::OrderExport;
use output::Layout;

/// Converts order exports into journal files under one set of rules.
pub struct Converter {
    pub config: Config,
}

impl Converter {
    pub fn new(config: Config) -> Self {
        Converter { config }
    }

    /// Built-in rules unless a config file is given.
    pub async fn from_config_file(file: Option<&str>) -> Result<Self> {
        let config = match file {
            Some(file) => Config::from_file(file).await?,
            None => Config::default(),
        };
        Ok(Self::new(config))
    }

    pub async fn read_orders(&self, file: &str) -> Result<OrderExport> {
        let bytes = fs::read(file)
            .await
            .with_context(|| format!("Failed to read order export {}", file))?;
        order::read_orders(bytes.as_slice(), self.config.delimiter)
            .with_context(|| format!("Invalid order export {}", file))
    }

    pub fn convert(&self, export: &OrderExport, period: Period) -> MonthlyJournal {
        monthly::convert_export(export, period, &self.config)
    }

    pub async fn write_journal(
        &self,
        file: &str,
        journal: &MonthlyJournal,
        layout: Layout,
    ) -> Result<()> {
        let mut buf = Vec::new();
        output::write_journal(&mut buf, &journal.lines, layout)?;
        fs::write(file, buf)
            .await
            .with_context(|| format!("Failed to write journal {}", file))
    }

    /// Reads `input`, writes the period's journal to `output` and returns the
    /// summary. Only an unusable input or output file is an error.
    pub async fn run(
        &self,
        input: &str,
        output: &str,
        period: Period,
        layout: Layout,
    ) -> Result<MonthlySummary> {
        let export = self.read_orders(input).await?;
        let journal = self.convert(&export, period);
        self.write_journal(output, &journal, layout).await?;
        Ok(journal.summary)
    }
}

/// Default journal file name for a period.
pub fn default_output_file(period: Period) -> String {
    format!("monthly_journal_{:02}_{}.csv", period.month, period.year)
}

use crate::monthly::MonthlySummary;
use itertools::Itertools;
use std::fmt;

impl fmt::Display for MonthlySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let acc_pad = 40;
        let amt_pad = 12;
        writeln!(f, "Journal for {}", self.period)?;
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => writeln!(
                f,
                "Date range: {} to {} ({} days)",
                first.format("%d/%m/%Y"),
                last.format("%d/%m/%Y"),
                self.days.len()
            )?,
            _ => writeln!(f, "No orders found for {}", self.period)?,
        }
        writeln!(f, "Orders processed: {}", self.orders)?;
        if self.out_of_period > 0 {
            writeln!(f, "Orders outside period: {}", self.out_of_period)?;
        }

        writeln!(f)?;
        let totals = &self.totals;
        for (label, amount) in [
            ("Subtotal", totals.subtotal),
            ("Shipping", totals.shipping),
            ("Discount", totals.discount),
            ("Taxes", totals.tax),
            ("Total", totals.total),
        ] {
            writeln!(f, "{label:acc_pad$} | {:>amt_pad$}", amount.to_string())?;
        }

        if !self.account_totals.is_empty() {
            writeln!(f)?;
            writeln!(f, "{:acc_pad$} | {:>amt_pad$} | {:>amt_pad$}", "Account", "Debit", "Credit")?;
            for total in &self.account_totals {
                let amt_string = total.amount.to_row_string(amt_pad);
                writeln!(f, "{:acc_pad$} | {amt_string}", total.account)?;
            }
        }

        writeln!(f)?;
        for day in self.days.iter().filter(|day| !day.balanced) {
            writeln!(
                f,
                "IMBALANCED {}: debits {} credits {} variance {}",
                day.date.format("%d/%m/%Y"),
                day.balance.debits,
                day.balance.credits,
                day.balance.variance()
            )?;
        }
        if self.balanced {
            writeln!(
                f,
                "Balanced: debits {} credits {}",
                self.balance.debits, self.balance.credits
            )?;
        } else {
            writeln!(
                f,
                "NOT BALANCED: {} of {} days imbalanced, monthly variance {}",
                self.imbalanced_days,
                self.days.len(),
                self.balance.variance()
            )?;
        }

        if !self.unmapped.is_empty() {
            writeln!(f)?;
            writeln!(f, "Payment methods without an account mapping:")?;
            for payment in &self.unmapped {
                writeln!(
                    f,
                    "  {:?}: {} orders, {} posted to {}",
                    payment.label, payment.orders, payment.amount, payment.account
                )?;
            }
        }

        if !self.skipped.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "Skipped {} unreadable rows (lines {})",
                self.skipped.len(),
                self.skipped.iter().map(|row| row.line).join(", ")
            )?;
        }
        Ok(())
    }
}

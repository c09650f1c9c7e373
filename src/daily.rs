use crate::account::Mapping;
use crate::config::{Config, DiscountTreatment};
use crate::journal::{BalanceCheck, JournalAccount, JournalLine};
use crate::money::Money;
use crate::order::Order;
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// Sums of the exported amounts over a set of orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl AddAssign<&Order> for OrderTotals {
    fn add_assign(&mut self, order: &Order) {
        self.subtotal += order.subtotal;
        self.shipping += order.shipping;
        self.discount += order.discount;
        self.tax += order.tax;
        self.total += order.total;
    }
}

impl AddAssign for OrderTotals {
    fn add_assign(&mut self, other: Self) {
        self.subtotal += other.subtotal;
        self.shipping += other.shipping;
        self.discount += other.discount;
        self.tax += other.tax;
        self.total += other.total;
    }
}

/// A payment method label with no mapping, posted to the default account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmappedPayment {
    pub label: String,
    pub account: JournalAccount,
    pub orders: usize,
    pub amount: Money,
}

/// Journal lines for every order of one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayJournal {
    pub date: NaiveDate,
    pub orders: usize,
    pub totals: OrderTotals,
    pub lines: Vec<JournalLine>,
    pub balance: BalanceCheck,
    pub unmapped: Vec<UnmappedPayment>,
}

impl DayJournal {
    pub fn is_balanced(&self) -> bool {
        self.balance.is_balanced()
    }
}

/// Builds the day's lines: payment debits by account, the discount debit,
/// then sales, zero-rated sales, shipping and VAT credits.
///
/// Returns `None` for a day without orders. An imbalance is reported in the
/// result, never corrected.
pub fn aggregate_day(date: NaiveDate, orders: &[Order], config: &Config) -> Option<DayJournal> {
    if orders.is_empty() {
        return None;
    }
    info!("Processing {}: {} orders", date.format("%d/%m/%Y"), orders.len());

    let mut totals = OrderTotals::default();
    let mut standard_sales = Money::default();
    let mut standard_tax = Money::default();
    let mut zero_rated_sales = Money::default();
    let mut payments: BTreeMap<&str, Money> = BTreeMap::new();
    let mut unmapped: BTreeMap<&str, UnmappedPayment> = BTreeMap::new();

    for order in orders {
        totals += order;

        let sales = match config.discount_treatment {
            DiscountTreatment::Explicit => order.subtotal,
            DiscountTreatment::Contra => order.subtotal - order.discount,
        };
        if order.is_zero_rated(&config.home_country) {
            zero_rated_sales += sales + order.tax;
        } else {
            standard_sales += sales;
            standard_tax += order.tax;
        }

        let mapping = config.payment_accounts.lookup(&order.payment_method);
        *payments.entry(mapping.account()).or_default() += order.total;
        match mapping {
            Mapping::Exact(_) => {}
            Mapping::Partial(matched) => info!(
                "Line {}: payment method {:?} matched {:?}, posted to {}",
                order.line, order.payment_method, matched.label, matched.account
            ),
            Mapping::Unmapped(account) => {
                debug!(
                    "Line {}: payment method {:?} posted to {}",
                    order.line, order.payment_method, account
                );
                let entry = unmapped
                    .entry(order.payment_method.as_str())
                    .or_insert_with(|| UnmappedPayment {
                        label: order.payment_method.clone(),
                        account: account.to_owned(),
                        orders: 0,
                        amount: Money::default(),
                    });
                entry.orders += 1;
                entry.amount += order.total;
            }
        }
    }

    let description = format!("{} {}", config.narration, date.format("%d.%m.%Y"));
    let accounts = &config.accounts;
    let rates = &config.tax_rates;
    let discount = match config.discount_treatment {
        DiscountTreatment::Explicit => totals.discount,
        DiscountTreatment::Contra => Money::default(),
    };

    let debits = payments
        .iter()
        .map(|(account, amount)| {
            JournalLine::debit(date, account, &description, &rates.exempt, *amount)
        })
        .chain([JournalLine::debit(
            date,
            &accounts.discount,
            &description,
            &rates.standard,
            discount,
        )]);
    let credits = [
        (&accounts.sales, &rates.standard, standard_sales),
        (&accounts.zero_rated_sales, &rates.zero_rated, zero_rated_sales),
        (&accounts.shipping, &rates.zero_rated, totals.shipping),
        (&accounts.tax, &rates.exempt, standard_tax),
    ]
    .into_iter()
    .map(|(account, rate, amount)| JournalLine::credit(date, account, &description, rate, amount));
    let lines: Vec<JournalLine> = debits.chain(credits).flatten().collect();

    let balance = BalanceCheck::of(&lines);
    if !balance.is_balanced() {
        warn!(
            "{} does not balance: debits {} credits {} variance {}",
            date.format("%d/%m/%Y"),
            balance.debits,
            balance.credits,
            balance.variance()
        );
    }

    Some(DayJournal {
        date,
        orders: orders.len(),
        totals,
        lines,
        balance,
        unmapped: unmapped.into_values().collect(),
    })
}

#[cfg(test)]
mod daily_tests {
    use super::*;
    use crate::journal::JournalAmount::{self, Credit, Debit};
    use anyhow::Result;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    fn order(
        subtotal: i64,
        shipping: i64,
        discount: i64,
        tax: i64,
        total: i64,
        method: &str,
    ) -> Order {
        Order {
            line: 2,
            date: date(),
            subtotal: Money::from(subtotal),
            shipping: Money::from(shipping),
            discount: Money::from(discount),
            tax: Money::from(tax),
            total: Money::from(total),
            payment_method: method.to_string(),
            country: None,
        }
    }

    fn summary(day: &DayJournal) -> Vec<(String, JournalAmount)> {
        day.lines
            .iter()
            .map(|line| (line.account.clone(), line.amount))
            .collect()
    }

    fn entry(account: &str, amount: JournalAmount) -> (String, JournalAmount) {
        (account.to_string(), amount)
    }

    #[test]
    fn no_orders_no_lines() {
        assert_eq!(aggregate_day(date(), &[], &Config::default()), None);
    }

    #[test]
    fn single_card_order() -> Result<()> {
        let orders = [order(100, 10, 0, 20, 130, "card")];
        let day = aggregate_day(date(), &orders, &Config::default()).expect("day with orders");
        dbg!(&day);
        assert_eq!(
            summary(&day),
            vec![
                entry("102 - Card Account", Debit(Money::from(130))),
                entry("208 - Revenue - Shopify", Credit(Money::from(100))),
                entry("203 - Revenue - Shipping Retail", Credit(Money::from(10))),
                entry("820 - VAT Payable", Credit(Money::from(20))),
            ]
        );
        assert!(day.is_balanced());
        assert_eq!(day.balance.debits, Money::from(130));
        assert_eq!(day.orders, 1);
        assert!(day.unmapped.is_empty());
        assert!(day.lines.iter().all(|l| l.description == "Shopify Sales 05.01.2024"));
        assert_eq!(day.lines[0].tax_rate, "Tax Exempt (0%)");
        assert_eq!(day.lines[1].tax_rate, "Output VAT 5% (5%)");
        assert_eq!(day.lines[2].tax_rate, "Zero Rated Output VAT (0%)");
        Ok(())
    }

    #[test]
    fn zero_rated_and_standard_split() -> Result<()> {
        let config = Config {
            accounts: crate::config::LedgerAccounts {
                zero_rated_sales: "209 - Revenue - Export".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let orders = [
            order(50, 0, 0, 0, 50, "Card"),
            order(50, 0, 0, 10, 60, "Cash"),
        ];
        let day = aggregate_day(date(), &orders, &config).expect("day with orders");
        assert_eq!(
            summary(&day),
            vec![
                entry("101 - Cash Account", Debit(Money::from(60))),
                entry("102 - Card Account", Debit(Money::from(50))),
                entry("208 - Revenue - Shopify", Credit(Money::from(50))),
                entry("209 - Revenue - Export", Credit(Money::from(50))),
                entry("820 - VAT Payable", Credit(Money::from(10))),
            ]
        );
        assert_eq!(day.balance.debits, Money::from(110));
        assert!(day.is_balanced());
        Ok(())
    }

    #[test]
    fn foreign_country_tax_goes_to_zero_rated_sales() -> Result<()> {
        let mut export = order(100, 0, 0, 5, 105, "Stripe");
        export.country = Some("SA".to_string());
        let mut local = order(100, 0, 0, 5, 105, "Stripe");
        local.country = Some("AE".to_string());
        let orders = [export, local];
        let day = aggregate_day(date(), &orders, &Config::default()).expect("day");
        assert_eq!(
            summary(&day),
            vec![
                entry("102 - Stripe Account", Debit(Money::from(210))),
                entry("208 - Revenue - Shopify", Credit(Money::from(100))),
                entry("208 - Revenue - Shopify", Credit(Money::from(105))),
                entry("820 - VAT Payable", Credit(Money::from(5))),
            ]
        );
        assert_eq!(day.lines[2].tax_rate, "Zero Rated Output VAT (0%)");
        assert!(day.is_balanced());
        Ok(())
    }

    #[test]
    fn explicit_discount_line() -> Result<()> {
        let orders = [order(100, 0, 20, 4, 84, "Tabby")];
        let day = aggregate_day(date(), &orders, &Config::default()).expect("day");
        assert_eq!(
            summary(&day),
            vec![
                entry("112 - Tabby", Debit(Money::from(84))),
                entry("205B - Sales Discount [Shopify]", Debit(Money::from(20))),
                entry("208 - Revenue - Shopify", Credit(Money::from(100))),
                entry("820 - VAT Payable", Credit(Money::from(4))),
            ]
        );
        assert!(day.is_balanced());
        Ok(())
    }

    #[test]
    fn contra_discount_nets_sales() -> Result<()> {
        let config = Config {
            discount_treatment: DiscountTreatment::Contra,
            ..Default::default()
        };
        let orders = [order(100, 0, 20, 4, 84, "Tabby")];
        let day = aggregate_day(date(), &orders, &config).expect("day");
        assert_eq!(
            summary(&day),
            vec![
                entry("112 - Tabby", Debit(Money::from(84))),
                entry("208 - Revenue - Shopify", Credit(Money::from(80))),
                entry("820 - VAT Payable", Credit(Money::from(4))),
            ]
        );
        assert!(day.is_balanced());
        Ok(())
    }

    #[test]
    fn unmapped_methods_use_default_and_are_recorded() -> Result<()> {
        let orders = [
            order(50, 0, 0, 0, 50, "PayPal"),
            order(20, 0, 0, 0, 20, "PayPal"),
            order(10, 0, 0, 0, 10, ""),
        ];
        let day = aggregate_day(date(), &orders, &Config::default()).expect("day");
        assert_eq!(
            summary(&day)[0],
            entry("199 - Payment Suspense", Debit(Money::from(80)))
        );
        assert_eq!(
            day.unmapped,
            vec![
                UnmappedPayment {
                    label: "".to_string(),
                    account: "199 - Payment Suspense".to_string(),
                    orders: 1,
                    amount: Money::from(10),
                },
                UnmappedPayment {
                    label: "PayPal".to_string(),
                    account: "199 - Payment Suspense".to_string(),
                    orders: 2,
                    amount: Money::from(70),
                },
            ]
        );
        assert!(day.is_balanced());
        Ok(())
    }

    #[test]
    fn label_variants_reach_their_accounts() -> Result<()> {
        let orders = [
            order(40, 0, 0, 0, 40, "gift_card"),
            order(60, 0, 0, 0, 60, "Cash on Delivery"),
        ];
        let day = aggregate_day(date(), &orders, &Config::default()).expect("day");
        assert_eq!(
            summary(&day)[..2],
            [
                entry("110 - Cash on Delivery", Debit(Money::from(60))),
                entry("115 - Gift Card Clearing", Debit(Money::from(40))),
            ]
        );
        assert!(day.unmapped.is_empty());
        assert!(day.is_balanced());
        Ok(())
    }

    #[test]
    fn inconsistent_totals_are_flagged_not_fixed() -> Result<()> {
        // total is 5 short of subtotal + shipping + tax
        let orders = [order(100, 10, 0, 20, 125, "Card")];
        let day = aggregate_day(date(), &orders, &Config::default()).expect("day");
        assert!(!day.is_balanced());
        assert_eq!(day.balance.variance(), Money::from(-5));
        assert_eq!(day.lines.len(), 4);
        Ok(())
    }

    #[test]
    fn refunds_flip_sides() -> Result<()> {
        let orders = [order(-50, 0, 0, -5, -55, "Card")];
        let day = aggregate_day(date(), &orders, &Config::default()).expect("day");
        assert_eq!(
            summary(&day),
            vec![
                entry("102 - Card Account", Credit(Money::from(55))),
                entry("208 - Revenue - Shopify", Debit(Money::from(50))),
                entry("820 - VAT Payable", Debit(Money::from(5))),
            ]
        );
        assert!(day.is_balanced());
        Ok(())
    }

    #[test]
    fn totals_sum_all_orders() {
        let orders = [
            order(100, 10, 5, 20, 125, "Card"),
            order(50, 0, 0, 0, 50, "Cash"),
        ];
        let day = aggregate_day(date(), &orders, &Config::default()).expect("day");
        assert_eq!(
            day.totals,
            OrderTotals {
                subtotal: Money::from(150),
                shipping: Money::from(10),
                discount: Money::from(5),
                tax: Money::from(20),
                total: Money::from(175),
            }
        );
    }
}

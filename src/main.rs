use anyhow::{Context, Result};
use clap::{Arg, Command};
use log::{info, warn};
use shopjournal::{default_output_file, monthly::Period, output::Layout, Converter};

#[async_std::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("shopjournal")
        .version("0.1.0")
        .about("Converts a month of order exports into ledger journal lines")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Order export CSV file")
                .value_name("FILE")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("month")
                .short('m')
                .long("month")
                .help("Month to convert (1-12)")
                .value_name("MONTH")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("year")
                .short('y')
                .long("year")
                .help("Year to convert")
                .value_name("YEAR")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Journal file to write, defaults to monthly_journal_MM_YYYY.csv")
                .value_name("FILE")
                .takes_value(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("YAML file with account mappings and conversion rules")
                .value_name("FILE")
                .takes_value(true),
        )
        .arg(
            Arg::new("layout")
                .short('l')
                .long("layout")
                .help("Journal column layout")
                .value_name("LAYOUT")
                .possible_values(["ledger", "xero"])
                .default_value("ledger")
                .takes_value(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the summary as JSON"),
        )
        .get_matches();

    let input = matches.value_of("input").unwrap(); // required
    let month: u32 = matches
        .value_of("month")
        .unwrap() // required
        .parse()
        .context("Month must be a number from 1 to 12")?;
    let year: i32 = matches
        .value_of("year")
        .unwrap() // required
        .parse()
        .context("Year must be a number")?;
    let period = Period::new(month, year)?;
    let output = matches
        .value_of("output")
        .map(String::from)
        .unwrap_or_else(|| default_output_file(period));
    let layout: Layout = matches.value_of("layout").unwrap_or("ledger").parse()?;

    let converter = Converter::from_config_file(matches.value_of("config")).await?;
    let summary = converter.run(input, &output, period, layout).await?;
    info!("Journal written to {}", output);
    if summary.imbalanced_days > 0 {
        warn!(
            "{} of {} days do not balance, review before importing",
            summary.imbalanced_days,
            summary.days.len()
        );
    }

    if matches.is_present("json") {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(())
}

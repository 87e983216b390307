use std::fmt::Write as _;

use clap::{Args, Parser, Subcommand};
use engine::{Currency, Engine, Member, MemberId, Money, SettlementReport};
use uuid::Uuid;

use crate::{error::Result, ledger_file::Ledger};

mod error;
mod ledger_file;

#[derive(Parser, Debug)]
#[command(name = "fairshare_cli")]
#[command(about = "Offline balance and settlement calculator for shared expenses")]
struct Cli {
    /// Log filter (also read from `RUST_LOG`).
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print balances and the transfers that settle a ledger file.
    Settle(SettleArgs),
    /// Preview an equal split.
    Split(SplitArgs),
}

#[derive(Args, Debug)]
struct SettleArgs {
    /// Path of the JSON ledger.
    #[arg(long)]
    ledger: std::path::PathBuf,
    /// Largest absolute balance, in minor units, treated as settled.
    #[arg(long, default_value_t = engine::DEFAULT_TOLERANCE.minor())]
    tolerance: i64,
}

#[derive(Args, Debug)]
struct SplitArgs {
    #[arg(long)]
    amount: String,
    #[arg(long = "member", required = true)]
    members: Vec<String>,
    #[arg(long, default_value = "USD")]
    currency: String,
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log.as_str())
        .with_writer(std::io::stderr)
        .init();

    let output = match cli.command {
        Command::Settle(args) => settle(&args)?,
        Command::Split(args) => split(&args)?,
    };
    print!("{output}");
    Ok(())
}

fn settle(args: &SettleArgs) -> Result<String> {
    let raw = std::fs::read_to_string(&args.ledger)?;
    let ledger = Ledger::from_json(&raw)?;
    tracing::debug!(
        members = ledger.roster.len(),
        entries = ledger.entries.len(),
        "ledger loaded"
    );

    let engine = Engine::builder()
        .tolerance(Money::new(args.tolerance))
        .build()?;
    let report = engine.settle(&ledger.roster, &ledger.entries)?;
    Ok(render_report(&report, ledger.currency))
}

fn split(args: &SplitArgs) -> Result<String> {
    let currency = Currency::try_from(args.currency.as_str())?;
    let amount = Money::parse_in(&args.amount, currency)?;
    let roster: Vec<Member> = args
        .members
        .iter()
        .zip(1u128..)
        .map(|(name, position)| Member::new(MemberId::new(Uuid::from_u128(position)), name, ""))
        .collect();

    let shares = Engine::default().compute_equal_split(amount, &roster)?;
    let mut out = String::new();
    for (member, share) in roster.iter().zip(&shares) {
        let _ = writeln!(out, "{:<20} {}", member.name, share.amount.display_in(currency));
    }
    Ok(out)
}

fn render_report(report: &SettlementReport, fallback: Currency) -> String {
    let currency = report.currency.unwrap_or(fallback);
    let mut out = String::new();

    let _ = writeln!(out, "Balances");
    for balance in &report.balances {
        let _ = writeln!(
            out,
            "  {:<20} {:>14}  (paid {}, owed {})",
            balance.member.name,
            balance.net.display_in(currency),
            balance.total_paid.display_in(currency),
            balance.total_owed.display_in(currency),
        );
    }

    if report.settlements.is_empty() {
        let _ = writeln!(out, "All settled up.");
        return out;
    }

    let _ = writeln!(out, "Settlements");
    for settlement in &report.settlements {
        let _ = writeln!(
            out,
            "  {} -> {}: {}",
            settlement.from.name,
            settlement.to.name,
            settlement.amount.display_in(currency),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_balances_and_transfers() {
        let ledger = Ledger::from_json(
            r#"{
                "members": [{ "name": "A" }, { "name": "B" }, { "name": "C" }],
                "entries": [{ "amount": "90", "payer": "A" }]
            }"#,
        )
        .unwrap();
        let report = Engine::default()
            .settle(&ledger.roster, &ledger.entries)
            .unwrap();
        let out = render_report(&report, ledger.currency);

        assert!(out.contains("B -> A: 30.00 USD"));
        assert!(out.contains("C -> A: 30.00 USD"));
        assert!(out.contains("(paid 90.00 USD, owed 30.00 USD)"));
    }

    #[test]
    fn empty_ledger_is_settled() {
        let ledger = Ledger::from_json(r#"{ "members": [{ "name": "A" }] }"#).unwrap();
        let report = Engine::default()
            .settle(&ledger.roster, &ledger.entries)
            .unwrap();
        assert!(render_report(&report, ledger.currency).ends_with("All settled up.\n"));
    }

    #[test]
    fn settle_drops_one_cent_balances_by_default() {
        let path = std::env::temp_dir().join(format!("fairshare-cent-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{
                "members": [{ "name": "A" }, { "name": "B" }],
                "entries": [{ "amount": "0.01", "payer": "A", "shares": [{ "member": "B", "amount": "0.01" }] }]
            }"#,
        )
        .unwrap();

        let lenient = Cli::parse_from(["fairshare_cli", "settle", "--ledger", path.to_str().unwrap()]);
        let Command::Settle(args) = lenient.command else {
            panic!("expected settle");
        };
        assert_eq!(args.tolerance, 1);
        assert!(settle(&args).unwrap().ends_with("All settled up.\n"));

        let exact = SettleArgs {
            ledger: path.clone(),
            tolerance: 0,
        };
        assert!(settle(&exact).unwrap().contains("B -> A: 0.01 USD"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn split_lists_every_member() {
        let out = split(&SplitArgs {
            amount: "10".to_string(),
            members: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            currency: "EUR".to_string(),
        })
        .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("3.34 EUR"));
        assert!(lines[2].ends_with("3.33 EUR"));
    }
}

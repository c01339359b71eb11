use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use installment_plan::{FormSession, FormView, PlanPolicy};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

/// Installment payment plan calculator
#[derive(Parser)]
#[command(
    name = "installment-calc",
    version,
    about = "Installment payment plan calculator",
    long_about = "Works out the financed amount, the installment counts it qualifies for, \
                  and the first, recurring and bonus payments of a retail financing plan. \
                  Amounts may be written with thousands separators."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file overriding the default thresholds
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the split amount and the installment counts on offer
    Split(FormArgs),
    /// Compute the payment plan
    Calculate(FormArgs),
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Form fields, as they would be typed in
#[derive(Args)]
struct FormArgs {
    /// Product price
    #[arg(long, default_value = "")]
    price: String,

    /// Upfront payment
    #[arg(long, default_value = "")]
    deposit: String,

    /// Amount paid at each bonus occurrence
    #[arg(long, default_value = "")]
    bonus: String,

    /// Installment count (24, 36, 48 or 60)
    #[arg(long)]
    installments: Option<u32>,

    /// Interest rate in percent
    #[arg(long, default_value = "0")]
    rate: Decimal,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("installment_plan=warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(view) => print_view(&cli.output, &view),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<FormView> {
    let policy = match &cli.config {
        Some(path) => PlanPolicy::load(path)
            .with_context(|| format!("loading policy from {}", path.display()))?,
        None => PlanPolicy::default(),
    };

    let mut session = FormSession::new(policy);
    let (args, calculate) = match &cli.command {
        Commands::Split(args) => (args, false),
        Commands::Calculate(args) => (args, true),
    };

    session.set_price(&args.price);
    session.set_deposit(&args.deposit);
    session.set_bonus_amount(&args.bonus);
    session.select_interest_rate(args.rate);
    if let Some(count) = args.installments {
        session.select_installment(count)?;
    }

    if calculate {
        session.calculate();
    }
    Ok(session.view().clone())
}

fn print_view(format: &OutputFormat, view: &FormView) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(view) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Text => print_text(view),
    }
}

fn print_text(view: &FormView) {
    if let Some(notice) = &view.notice {
        println!("{}", notice);
        return;
    }

    let options: Vec<String> = view.installment_options.iter().map(u32::to_string).collect();
    let rows = [
        ("Split amount", view.split_amount.clone()),
        ("Installments", format!("{} (available: {})", view.selected_installment, options.join(", "))),
        ("First payment", view.first_payment.clone()),
        ("Other payments", view.other_payment.clone()),
        ("Bonus payment", view.bonus_payment.clone()),
    ];
    for (label, value) in rows {
        if !value.is_empty() {
            println!("{:<15} {}", label, value);
        }
    }

    if !view.warning.is_empty() {
        println!("\nWarning: {}", view.warning);
    }
}

use std::path::PathBuf;

use atm_common::{AccountIdentifier, Amount, ValidatedPin, ValidationRule};
use atm_controller::{load_script, run_script, AtmController, AtmControllerConfig, InMemoryCashBin};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ATM controller demo over an in-memory cash bin
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set the log level (overrides ATM_LOG_LEVEL)
    #[arg(short, long)]
    log_level: Option<String>,

    /// JSON file with cash bin records (overrides ATM_SEED_FILE)
    #[arg(short, long)]
    seed_file: Option<PathBuf>,

    /// Regex pins must contain (overrides ATM_PIN_PATTERN)
    #[arg(short, long)]
    pin_pattern: Option<String>,

    /// Commands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the balance of every account registered under a pin
    Balance {
        #[arg(long)]
        pin: String,
    },
    /// Deposit into an account
    Deposit {
        #[arg(long)]
        pin: String,
        #[arg(long)]
        account: String,
        #[arg(long)]
        amount: Amount,
    },
    /// Withdraw from an account
    Withdraw {
        #[arg(long)]
        pin: String,
        #[arg(long)]
        account: String,
        #[arg(long)]
        amount: Amount,
    },
    /// Move money between two accounts of the same pin
    Transfer {
        #[arg(long)]
        pin: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Amount,
    },
    /// Print every record in the cash bin
    Records,
    /// Run a JSON script of operations
    Run {
        script: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    let cli = Cli::parse();

    let mut config = AtmControllerConfig::from_env();
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if cli.seed_file.is_some() {
        config.seed_file = cli.seed_file;
    }
    if cli.pin_pattern.is_some() {
        config.pin_pattern = cli.pin_pattern;
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "atm_controller={level},atm_common={level}",
            level = config.log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pin_rule = config.pin_rule()?;
    let account_rule = config.account_id_rule()?;
    let controller = AtmController::new(config.cash_bin()?);

    let result = execute(&controller, &*pin_rule, &*account_rule, cli.command);

    if let Err(e) = &result {
        error!("Operation failed: {}", e);
    }
    Ok(result?)
}

fn execute(
    controller: &AtmController<InMemoryCashBin>,
    pin_rule: &dyn ValidationRule,
    account_rule: &dyn ValidationRule,
    command: Commands,
) -> atm_common::Result<()> {
    match command {
        Commands::Balance { pin } => check_balance(controller, pin_rule, pin)?,
        Commands::Deposit { pin, account, amount } => {
            let account = account_for(pin_rule, account_rule, pin, account)?;
            controller.deposit(&account, amount)?;
            println!("Deposited {} to {}", amount, account);
        }
        Commands::Withdraw { pin, account, amount } => {
            let account = account_for(pin_rule, account_rule, pin, account)?;
            controller.withdraw(&account, amount)?;
            println!("Withdrew {} from {}", amount, account);
        }
        Commands::Transfer { pin, from, to, amount } => {
            let from = account_for(pin_rule, account_rule, pin.clone(), from)?;
            let to = account_for(pin_rule, account_rule, pin, to)?;
            controller.transfer(&from, &to, amount)?;
            println!("Sent {} from {} to {}", amount, from, to);
            print_records(controller.queries());
        }
        Commands::Records => print_records(controller.queries()),
        Commands::Run { script } => {
            let steps = load_script(&script)?;
            info!("Running {} steps from {}", steps.len(), script.display());
            for outcome in run_script(controller, pin_rule, account_rule, steps)? {
                match serde_json::to_string(&outcome) {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("Cannot encode outcome: {}", e),
                }
            }
        }
    }
    Ok(())
}

fn check_balance(
    controller: &AtmController<InMemoryCashBin>,
    pin_rule: &dyn ValidationRule,
    pin: String,
) -> atm_common::Result<()> {
    let pin = ValidatedPin::with_rule(pin, pin_rule)?;
    let accounts = controller.find_accounts(&pin)?;
    if accounts.is_empty() {
        println!("No accounts registered under {}", pin);
    }
    for account in accounts {
        match controller.get_balance(&account)? {
            Some(balance) => println!("{}'s balance: {}", account, balance),
            None => println!("{} has no balance", account),
        }
    }
    Ok(())
}

fn account_for(
    pin_rule: &dyn ValidationRule,
    account_rule: &dyn ValidationRule,
    pin: String,
    account: String,
) -> atm_common::Result<AccountIdentifier> {
    let pin = ValidatedPin::with_rule(pin, pin_rule)?;
    AccountIdentifier::with_rule(&pin, account, account_rule)
}

fn print_records(bin: &InMemoryCashBin) {
    println!("< CASH BIN TOTAL >");
    for record in bin.records() {
        println!(
            "Record(pin={}, account={}, balance={})",
            record.pin, record.account_id, record.balance
        );
    }
}

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use league::config::config_dir;
use league::logging::init_tracing;
use league::Result;

#[derive(Parser)]
#[command(name = "league")]
#[command(version, about = "Billing for basketball league programs", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.league or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log more (-v info, -vv debug); LEAGUE_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Show league billing summary
    Status,

    /// Build, send and settle invoices
    Invoice {
        #[command(subcommand)]
        command: InvoiceCommand,
    },

    /// Installment payment plans
    Plan {
        #[command(subcommand)]
        command: PlanCommand,
    },

    /// Affiliate applications, commissions and payouts
    Affiliate {
        #[command(subcommand)]
        command: AffiliateCommand,
    },

    /// Talk to the league's admin API
    Remote {
        #[command(subcommand)]
        command: RemoteCommand,
    },
}

#[derive(Subcommand)]
pub enum InvoiceCommand {
    /// Create a draft invoice
    Create {
        /// Member or family being billed
        #[arg(short, long)]
        bill_to: String,

        /// Line items in format "name:amount[:quantity]" (can be repeated)
        #[arg(short, long, value_name = "NAME:AMOUNT[:QTY]")]
        item: Vec<String>,

        /// Tax rate in percent (default: billing.tax_rate)
        #[arg(long)]
        tax: Option<String>,

        /// Issue date (default: today)
        #[arg(long)]
        issued: Option<String>,

        /// Due date (default: issue date + billing.due_days)
        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Send immediately instead of leaving it as a draft
        #[arg(long)]
        send: bool,
    },

    /// List invoices, newest first
    List {
        /// Only show invoices with this status
        #[arg(short, long)]
        status: Option<String>,

        /// Number of invoices to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one invoice with its line items
    Show {
        /// Invoice number or index from 'list' (e.g., 1 or INV-2026-0001)
        invoice: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a draft invoice as sent
    Send { invoice: String },

    /// Mark a sent or overdue invoice as paid
    Pay {
        invoice: String,

        /// Payment date (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Cancel an unpaid invoice
    Cancel { invoice: String },

    /// Delete a draft invoice
    Delete { invoice: String },
}

#[derive(Subcommand)]
pub enum PlanCommand {
    /// Create a payment plan and its installment schedule
    Create {
        #[arg(short, long)]
        member: String,

        /// Total amount to be paid over the plan
        #[arg(short, long)]
        total: String,

        /// Number of installments (2-12)
        #[arg(short = 'n', long)]
        installments: u32,

        /// weekly, bi-weekly or monthly
        #[arg(short, long, default_value = "monthly")]
        frequency: String,

        /// First payment date (default: today)
        #[arg(long)]
        first_date: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// List payment plans
    List,

    /// Show a plan's installment schedule
    Show {
        id: u32,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark an installment transaction as paid
    Pay {
        /// Transaction id from 'plan show'
        transaction: u32,

        /// Payment date (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Cancel a payment plan
    Cancel { id: u32 },

    /// Default plans with installments past the grace period
    Assess {
        /// Assess as of this date (default: today)
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AffiliateCommand {
    /// Record a new affiliate application
    Apply {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// Commission rate in percent (default: affiliates.commission_rate)
        #[arg(long)]
        rate: Option<String>,
    },

    /// List affiliates and their balances
    List,

    /// Approve a pending application
    Approve { id: u32 },

    /// Reject a pending application
    Reject {
        id: u32,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Record commission on a referred registration
    Commission {
        id: u32,

        /// Sale or registration amount
        #[arg(short, long)]
        amount: String,

        /// Registration reference
        #[arg(short, long)]
        reference: String,

        #[arg(long)]
        date: Option<String>,
    },

    /// Pay out pending commissions at or above the minimum
    Payouts {
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RemoteCommand {
    /// List invoices on the server
    Invoices,

    /// Upload a local invoice
    PushInvoice { invoice: String },

    /// Set an invoice's status on the server
    InvoiceStatus { id: String, status: String },

    /// List payment plans on the server
    Plans,

    /// Upload a local payment plan
    PushPlan { id: u32 },

    /// List a plan's transactions on the server
    Transactions { plan: u32 },

    /// Mark a plan transaction paid on the server
    MarkPaid { transaction: u32 },

    /// List affiliate applications on the server
    Applications,

    /// Approve an affiliate application on the server
    Approve { id: u32 },

    /// Reject an affiliate application on the server
    Reject {
        id: u32,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Run affiliate payouts on the server
    Payouts,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => commands::setup::cmd_init(&cfg_dir),
        Commands::Status => commands::setup::cmd_status(&cfg_dir),
        Commands::Invoice { command } => commands::invoice::run(&cfg_dir, command),
        Commands::Plan { command } => commands::plan::run(&cfg_dir, command),
        Commands::Affiliate { command } => commands::affiliate::run(&cfg_dir, command),
        Commands::Remote { command } => commands::remote::run(&cfg_dir, command),
    }
}

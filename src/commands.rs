//! Operator command dispatch and rendering
//!
//! Thin layer over the core operations: parse nothing, decide nothing,
//! just call the engine and print what happened.

use chrono::Local;
use colored::Colorize;

use crate::allocator::Allocator;
use crate::cli::*;
use crate::customer::{CustomerPatch, CustomerRepository};
use crate::db::Database;
use crate::invoice::InvoiceLifecycle;
use crate::ledger::{DateFilter, WarehouseLedger};
use crate::orders::OrderBook;
use crate::reconciler::Reconciler;

pub async fn run_command(db: &Database, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Purchase(args) => cmd_purchase(db, args).await,
        Command::Collect(args) => cmd_collect(db, args).await,
        Command::Verify(args) => cmd_verify(db, args).await,
        Command::Release(args) => cmd_release(db, args).await,
        Command::Ledger(args) => cmd_ledger(db, args).await,
        Command::WarehouseLedger(args) => cmd_warehouse_ledger(db, args).await,
        Command::WarehouseRecord(args) => cmd_warehouse_record(db, args).await,
        Command::Customer(args) => cmd_customer(db, args.command).await,
    }
}

async fn cmd_purchase(db: &Database, args: PurchaseArgs) -> anyhow::Result<()> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let order_id =
        OrderBook::record_purchase(db, args.customer, args.fuel, args.qty, date).await?;
    println!(
        "{} Purchase recorded. Order ID: {}",
        "✓".green().bold(),
        order_id.to_string().bold()
    );
    Ok(())
}

async fn cmd_collect(db: &Database, args: CollectArgs) -> anyhow::Result<()> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let outcome = Allocator::allocate(db, args.customer, args.fuel, args.qty, date).await?;

    println!("{} Collection request created", "✓".green().bold());
    println!(
        "  Invoice ID: {}",
        outcome.invoice.invoice_id.to_string().bold()
    );
    println!(
        "  {} L {} across {} order(s)",
        outcome.invoice.quantity_collected,
        outcome.invoice.fuel_type,
        outcome.withdrawals.len()
    );
    for line in &outcome.withdrawals {
        println!("    ORD#{}: {} L", line.order_id, line.quantity_taken);
    }
    println!(
        "  Take this invoice ID to the warehouse for verification."
    );
    Ok(())
}

async fn cmd_verify(db: &Database, args: VerifyArgs) -> anyhow::Result<()> {
    let verified = InvoiceLifecycle::verify(db, args.invoice, args.customer).await?;
    println!("{} Invoice verified", "✓".green().bold());
    println!("  Fuel type: {}", verified.fuel_type.to_string().bold());
    println!(
        "  Authorized quantity: {} L",
        verified.quantity.to_string().bold()
    );
    println!(
        "  Run {} to release the fuel.",
        format!("fueldepot release --invoice {}", verified.invoice_id).cyan()
    );
    Ok(())
}

async fn cmd_release(db: &Database, args: ReleaseArgs) -> anyhow::Result<()> {
    InvoiceLifecycle::confirm_release(db, args.invoice).await?;
    println!("{} Fuel released from warehouse.", "✓".green().bold());
    Ok(())
}

async fn cmd_ledger(db: &Database, args: LedgerArgs) -> anyhow::Result<()> {
    let filter = DateFilter::from_args(args.on.as_deref(), args.from.as_deref(), args.to.as_deref())?;
    let rows =
        Reconciler::running_balance(db, args.customer, args.fuel, filter.as_ref()).await?;

    println!(
        "{:<12} {:<10} {:<8} {:<12} {:>10} {:>12}",
        "Date", "Type", "Fuel", "Ref", "Qty(L)", "Balance(L)"
    );
    println!("{}", "-".repeat(70));
    for row in &rows {
        println!(
            "{:<12} {:<10} {:<8} {:<12} {:>10} {:>12}",
            row.event_date.to_string(),
            row.entry_type.to_string(),
            row.fuel_type.to_string(),
            row.reference,
            row.quantity.to_string(),
            row.balance.to_string()
        );
    }
    println!("{}", "-".repeat(70));
    println!(
        "{} Current available {}: {} L",
        "✓".green().bold(),
        args.fuel,
        Reconciler::final_balance(&rows).to_string().bold()
    );
    Ok(())
}

async fn cmd_warehouse_ledger(db: &Database, args: WarehouseLedgerArgs) -> anyhow::Result<()> {
    let filter = DateFilter::from_args(args.on.as_deref(), args.from.as_deref(), args.to.as_deref())?;
    let entries = WarehouseLedger::list(db, args.fuel, filter.as_ref()).await?;

    println!(
        "{:<6} {:<20} {:<8} {:<8} {:>10}",
        "ID", "Recorded", "Type", "Fuel", "Liters"
    );
    println!("{}", "-".repeat(58));
    for entry in &entries {
        println!(
            "{:<6} {:<20} {:<8} {:<8} {:>10}",
            entry.entry_id,
            entry.created_at,
            entry.entry_type.to_string(),
            entry.fuel_type.to_string(),
            entry.liters.to_string()
        );
    }
    println!("{}", "-".repeat(58));
    println!("{} {} entries", "✓".green(), entries.len());
    Ok(())
}

async fn cmd_warehouse_record(db: &Database, args: WarehouseRecordArgs) -> anyhow::Result<()> {
    let entry_id =
        WarehouseLedger::record(db, args.entry_type, args.fuel, args.qty, args.date).await?;
    println!(
        "{} Warehouse {} recorded. Entry ID: {}",
        "✓".green().bold(),
        args.entry_type,
        entry_id.to_string().bold()
    );
    Ok(())
}

async fn cmd_customer(db: &Database, command: CustomerCommand) -> anyhow::Result<()> {
    match command {
        CustomerCommand::Add {
            name,
            email,
            phone,
            address,
        } => {
            let customer_id = CustomerRepository::create(db, &name, email, phone, address).await?;
            println!(
                "{} Customer registered. ID: {}",
                "✓".green().bold(),
                customer_id.to_string().bold()
            );
        }
        CustomerCommand::Show { customer_id } => {
            match CustomerRepository::get_by_id(db, customer_id).await? {
                Some(customer) => {
                    println!("Customer {}", customer.customer_id.to_string().bold());
                    println!("  Name:    {}", customer.name);
                    println!("  Email:   {}", customer.email.as_deref().unwrap_or("-"));
                    println!("  Phone:   {}", customer.phone.as_deref().unwrap_or("-"));
                    println!("  Address: {}", customer.address.as_deref().unwrap_or("-"));
                    println!("  Since:   {}", customer.created_at);
                }
                None => println!("{} Customer {} not found.", "✗".red(), customer_id),
            }
        }
        CustomerCommand::Update {
            customer_id,
            name,
            email,
            phone,
            address,
        } => {
            let patch = CustomerPatch {
                name,
                email,
                phone,
                address,
            };
            CustomerRepository::update(db, customer_id, patch).await?;
            println!("{} Customer {} updated.", "✓".green().bold(), customer_id);
        }
        CustomerCommand::Remove { customer_id } => {
            CustomerRepository::delete(db, customer_id).await?;
            println!("{} Customer {} removed.", "✓".green().bold(), customer_id);
        }
    }
    Ok(())
}

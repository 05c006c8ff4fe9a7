use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use client_ledger::{
    NewClient, NewEmployee, Transaction, create_client, create_employee,
    create_transaction_for_client, initialize_db,
};

/// A utility for creating a test database for the REST API server of client_ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test client and employees...");

    let client = create_client(NewClient::new("Tenpo", "76.123.456-7"), &conn)?;
    let employees = [
        create_employee(NewEmployee::new("Ana", "12.345.678-9", client.id), &conn)?,
        create_employee(NewEmployee::new("Bruno", "9.876.543-2", client.id), &conn)?,
    ];

    println!("Creating test transactions...");

    let now = OffsetDateTime::now_utc();
    let merchants = ["Starbucks", "Amazon", "Lider", "Copec"];

    for (day, merchant) in merchants.iter().enumerate() {
        let employee = &employees[day % employees.len()];
        let builder = Transaction::build(
            1_000 * (day as i64 + 1),
            merchant,
            now - Duration::days(day as i64),
            employee.id,
        );

        create_transaction_for_client(client.id, builder, &conn)?;
    }

    println!("Success!");

    Ok(())
}

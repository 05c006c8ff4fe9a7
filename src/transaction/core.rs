//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{ClientId, EmployeeId, Error, TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Money spent by an employee at a merchant or business.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount spent, never negative.
    pub amount: i64,
    /// Where the money was spent.
    pub merchant_or_business: String,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// The employee who made the transaction.
    pub employee_id: EmployeeId,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: i64,
        merchant_or_business: &str,
        date: OffsetDateTime,
        employee_id: EmployeeId,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            merchant_or_business: merchant_or_business.to_owned(),
            date,
            employee_id,
        }
    }
}

/// The fields of a [Transaction] that has not been saved yet.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The amount spent.
    ///
    /// The database rejects negative amounts, callers should check requests
    /// with [crate::transaction::TransactionRequest::validate] first.
    pub amount: i64,

    /// Where the money was spent, e.g. "Starbucks".
    pub merchant_or_business: String,

    /// When the transaction happened. Must not be in the future.
    pub date: OffsetDateTime,

    /// The employee who made the transaction.
    pub employee_id: EmployeeId,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Insert a transaction without checking who owns the employee or how many
/// transactions the client already has.
///
/// Use [crate::create_transaction_for_client] for new transactions.
pub(crate) fn insert_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, merchant_or_business, date, employee_id)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, amount, merchant_or_business, date, employee_id",
        )?
        .query_row(
            (
                builder.amount,
                builder.merchant_or_business,
                builder.date,
                builder.employee_id,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, amount, merchant_or_business, date, employee_id
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound("Transaction"),
            error => error.into(),
        })
}

/// Retrieve every transaction, ordered by ID.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, amount, merchant_or_business, date, employee_id
             FROM \"transaction\" ORDER BY id",
        )?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Retrieve the transactions made by any employee of `client_id`, ordered by ID.
pub fn get_transactions_for_client(
    client_id: ClientId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.amount, t.merchant_or_business, t.date, t.employee_id
             FROM \"transaction\" t
             INNER JOIN employee e ON e.id = t.employee_id
             WHERE e.client_id = :client_id
             ORDER BY t.id",
        )?
        .query_map(&[(":client_id", &client_id)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Count the transactions made by any employee of `client_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions_for_client(
    client_id: ClientId,
    connection: &Connection,
) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(t.id) FROM \"transaction\" t
             INNER JOIN employee e ON e.id = t.employee_id
             WHERE e.client_id = ?1",
            [client_id],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Delete the transaction with `id`.
///
/// Deleting a transaction that does not exist is not an error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount INTEGER NOT NULL CHECK (amount >= 0),
                merchant_or_business TEXT NOT NULL,
                date TEXT NOT NULL,
                employee_id INTEGER NOT NULL,
                FOREIGN KEY(employee_id) REFERENCES employee(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by the per-client count and listing.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_employee ON \"transaction\"(employee_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let merchant_or_business = row.get(2)?;
    let date = row.get(3)?;
    let employee_id = row.get(4)?;

    Ok(Transaction {
        id,
        amount,
        merchant_or_business,
        date,
        employee_id,
    })
}

// ============================================================================
// TESTS
// ============================================================================

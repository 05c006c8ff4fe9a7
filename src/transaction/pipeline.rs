//! The checks that guard creating and replacing transactions.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    ClientId, Error, TransactionId,
    employee::get_employee,
    transaction::{
        Transaction, TransactionBuilder,
        core::{count_transactions_for_client, get_transaction, insert_transaction},
    },
};

/// The most transactions a client may own, counted across all of its employees.
pub const MAX_TRANSACTIONS_PER_CLIENT: u32 = 100;

/// Create a transaction for an employee of `client_id`.
///
/// The checks run in this order and stop at the first failure:
/// 1. the employee must exist,
/// 2. the employee must work for `client_id`,
/// 3. the client must own fewer than [MAX_TRANSACTIONS_PER_CLIENT] transactions.
///
/// All reads and the insert happen in one database transaction, nothing is
/// written if a check fails. The fields in `builder` are expected to have
/// passed [crate::transaction::TransactionRequest::validate].
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the employee does not exist,
/// - or [Error::OwnershipViolation] if the employee works for another client,
/// - or [Error::QuotaExceeded] if the client is at its transaction limit,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction_for_client(
    client_id: ClientId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    // Immediate takes the write lock up front so the count cannot go stale
    // before the insert.
    let unit_of_work = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let employee = get_employee(builder.employee_id, &unit_of_work)?;
    tracing::debug!("Resolved employee {} for new transaction", employee.id);

    if employee.client_id != client_id {
        tracing::info!(
            "Rejected transaction: employee {} belongs to client {}, not client {client_id}",
            employee.id,
            employee.client_id
        );
        return Err(Error::OwnershipViolation);
    }

    let transaction_count = count_transactions_for_client(client_id, &unit_of_work)?;
    if transaction_count >= MAX_TRANSACTIONS_PER_CLIENT {
        tracing::info!(
            "Rejected transaction: client {client_id} already has {transaction_count} transactions"
        );
        return Err(Error::QuotaExceeded);
    }

    let transaction = insert_transaction(builder, &unit_of_work)?;
    unit_of_work.commit()?;

    Ok(transaction)
}

/// Replace the fields of the transaction with `id`.
///
/// Only the existence of the transaction and the new employee are checked.
/// Unlike [create_transaction_for_client], the employee's client and the
/// client's transaction count are not checked.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the transaction or the employee does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let unit_of_work = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    get_transaction(id, &unit_of_work)?;
    get_employee(builder.employee_id, &unit_of_work)?;

    let transaction = unit_of_work
        .prepare(
            "UPDATE \"transaction\"
             SET amount = ?1, merchant_or_business = ?2, date = ?3, employee_id = ?4
             WHERE id = ?5
             RETURNING id, amount, merchant_or_business, date, employee_id",
        )?
        .query_row(
            (
                builder.amount,
                builder.merchant_or_business,
                builder.date,
                builder.employee_id,
                id,
            ),
            super::core::map_transaction_row,
        )?;

    unit_of_work.commit()?;

    Ok(transaction)
}

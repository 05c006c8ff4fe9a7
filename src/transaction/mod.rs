//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - The request body and its field checks
//! - The creation pipeline that enforces ownership and the per-client quota
//! - Route handlers for creating, reading, updating and deleting transactions

mod core;
mod create_endpoint;
mod endpoints;
mod pipeline;
mod request;

pub use core::{
    Transaction, TransactionBuilder, count_transactions_for_client, create_transaction_table,
    delete_transaction, get_all_transactions, get_transaction, get_transactions_for_client,
};
pub use create_endpoint::create_transaction_endpoint;
pub use endpoints::{
    delete_transaction_endpoint, get_transaction_endpoint, list_client_transactions_endpoint,
    list_transactions_endpoint, update_transaction_endpoint,
};
pub use pipeline::{MAX_TRANSACTIONS_PER_CLIENT, create_transaction_for_client, update_transaction};
pub use request::TransactionRequest;

#[cfg(test)]
pub(crate) use core::insert_transaction;

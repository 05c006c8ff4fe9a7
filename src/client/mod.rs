//! Clients: the companies whose employees make transactions.

mod core;
mod endpoints;

pub use core::{
    Client, NewClient, create_client, create_client_table, delete_client, get_all_clients,
    get_client, update_client,
};
pub use endpoints::{
    create_client_endpoint, delete_client_endpoint, get_client_endpoint, list_clients_endpoint,
    update_client_endpoint,
};

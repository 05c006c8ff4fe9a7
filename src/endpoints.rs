//! The API endpoints URIs.

/// The route for checking that the server is up.
pub const HEALTH: &str = "/health";
/// The route for creating and listing clients.
pub const CLIENTS: &str = "/client";
/// The route for a single client.
pub const CLIENT: &str = "/client/{client_id}";
/// The route for creating and listing employees.
pub const EMPLOYEES: &str = "/employee";
/// The route for a single employee.
pub const EMPLOYEE: &str = "/employee/{employee_id}";
/// The route for creating and listing transactions.
///
/// Creating a transaction here goes through the admission gate.
pub const TRANSACTIONS: &str = "/transaction";
/// The route for listing the transactions of one client.
pub const CLIENT_TRANSACTIONS: &str = "/transaction/client/{client_id}";
/// The route for a single transaction.
pub const TRANSACTION: &str = "/transaction/{transaction_id}";

//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a client. Also the key the admission gate throttles on.
pub type ClientId = DatabaseId;
/// The ID of an employee.
pub type EmployeeId = DatabaseId;
/// The ID of a transaction.
pub type TransactionId = DatabaseId;

//! Defines the client model and its database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{ClientId, Error, FieldErrors, map_duplicate_rut};

// ============================================================================
// MODELS
// ============================================================================

/// A company that employs the people making transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// The ID of the client.
    pub id: ClientId,
    /// The client's name.
    pub name: String,
    /// The client's RUT (tax ID), unique across clients.
    pub rut: String,
}

/// The request body for creating or replacing a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewClient {
    /// The client's name.
    pub name: Option<String>,
    /// The client's RUT.
    pub rut: Option<String>,
}

/// A [NewClient] whose fields have all been checked.
#[derive(Debug)]
pub(crate) struct ValidClient {
    name: String,
    rut: String,
}

impl NewClient {
    /// Create a request body with both fields set.
    pub fn new(name: &str, rut: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            rut: Some(rut.to_owned()),
        }
    }

    pub(crate) fn validate(self) -> Result<ValidClient, Error> {
        let mut errors = FieldErrors::default();
        let name = errors.require_text("name", self.name, "Name is required");
        let rut = errors.require_text("rut", self.rut, "RUT is required");
        errors.into_result()?;

        match (name, rut) {
            (Some(name), Some(rut)) => Ok(ValidClient { name, rut }),
            _ => Err(Error::Validation("name and rut are required".to_owned())),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new client in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the name or RUT is missing or blank,
/// - or [Error::DuplicateRut] if another client already has the RUT,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_client(new_client: NewClient, connection: &Connection) -> Result<Client, Error> {
    let ValidClient { name, rut } = new_client.validate()?;

    connection
        .prepare("INSERT INTO client (name, rut) VALUES (?1, ?2) RETURNING id, name, rut")?
        .query_row((&name, &rut), map_client_row)
        .map_err(|error| map_duplicate_rut(error, &rut))
}

/// Retrieve a client from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid client,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_client(id: ClientId, connection: &Connection) -> Result<Client, Error> {
    connection
        .prepare("SELECT id, name, rut FROM client WHERE id = :id")?
        .query_one(&[(":id", &id)], map_client_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound("Client"),
            error => error.into(),
        })
}

/// Retrieve every client, ordered by ID.
pub fn get_all_clients(connection: &Connection) -> Result<Vec<Client>, Error> {
    connection
        .prepare("SELECT id, name, rut FROM client ORDER BY id")?
        .query_map([], map_client_row)?
        .map(|maybe_client| maybe_client.map_err(Error::from))
        .collect()
}

/// Replace the name and RUT of the client with `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the name or RUT is missing or blank,
/// - or [Error::NotFound] if `id` does not refer to a valid client,
/// - or [Error::DuplicateRut] if another client already has the RUT,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_client(
    id: ClientId,
    new_client: NewClient,
    connection: &Connection,
) -> Result<Client, Error> {
    let ValidClient { name, rut } = new_client.validate()?;

    connection
        .prepare("UPDATE client SET name = ?1, rut = ?2 WHERE id = ?3 RETURNING id, name, rut")?
        .query_row((&name, &rut, id), map_client_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound("Client"),
            error => map_duplicate_rut(error, &rut),
        })
}

/// Delete the client with `id` along with its employees and their transactions.
///
/// Deleting a client that does not exist is not an error.
pub fn delete_client(id: ClientId, connection: &Connection) -> Result<(), Error> {
    connection.execute("DELETE FROM client WHERE id = :id", &[(":id", &id)])?;

    Ok(())
}

/// Create the client table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_client_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS client (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                rut TEXT NOT NULL UNIQUE
                )",
        (),
    )?;

    Ok(())
}

fn map_client_row(row: &Row) -> Result<Client, rusqlite::Error> {
    Ok(Client {
        id: row.get(0)?,
        name: row.get(1)?,
        rut: row.get(2)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use crate::{
        Error,
        client::{
            NewClient, create_client, delete_client, get_all_clients, get_client, update_client,
        },
        test_utils::get_test_connection,
    };

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let client = create_client(NewClient::new("Tenpo", "76.123.456-7"), &conn).unwrap();

        assert!(client.id > 0);
        assert_eq!(client.name, "Tenpo");
        assert_eq!(client.rut, "76.123.456-7");
    }

    #[test]
    fn create_fails_on_blank_fields() {
        let conn = get_test_connection();

        let result = create_client(
            NewClient {
                name: Some("  ".to_owned()),
                rut: None,
            },
            &conn,
        );

        assert_eq!(
            result,
            Err(Error::Validation(
                "name: Name is required, rut: RUT is required".to_owned()
            ))
        );
    }

    #[test]
    fn create_fails_on_duplicate_rut() {
        let conn = get_test_connection();
        create_client(NewClient::new("First", "1-9"), &conn).unwrap();

        let result = create_client(NewClient::new("Second", "1-9"), &conn);

        assert_eq!(result, Err(Error::DuplicateRut("1-9".to_owned())));
    }

    #[test]
    fn get_fails_on_missing_client() {
        let conn = get_test_connection();

        assert_eq!(get_client(1337, &conn), Err(Error::NotFound("Client")));
    }

    #[test]
    fn get_all_returns_clients_in_id_order() {
        let conn = get_test_connection();
        let want = vec![
            create_client(NewClient::new("A", "1-1"), &conn).unwrap(),
            create_client(NewClient::new("B", "2-2"), &conn).unwrap(),
        ];

        assert_eq!(get_all_clients(&conn).unwrap(), want);
    }

    #[test]
    fn update_replaces_fields() {
        let conn = get_test_connection();
        let client = create_client(NewClient::new("Old", "1-1"), &conn).unwrap();

        let updated = update_client(client.id, NewClient::new("New", "2-2"), &conn).unwrap();

        assert_eq!(updated.id, client.id);
        assert_eq!(get_client(client.id, &conn).unwrap(), updated);
        assert_eq!(updated.name, "New");
    }

    #[test]
    fn update_fails_on_missing_client() {
        let conn = get_test_connection();

        let result = update_client(42, NewClient::new("New", "2-2"), &conn);

        assert_eq!(result, Err(Error::NotFound("Client")));
    }

    #[test]
    fn delete_removes_client() {
        let conn = get_test_connection();
        let client = create_client(NewClient::new("Gone", "1-1"), &conn).unwrap();

        delete_client(client.id, &conn).unwrap();

        assert_eq!(get_client(client.id, &conn), Err(Error::NotFound("Client")));
    }
}

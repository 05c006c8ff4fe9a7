//! Defines the employee model and its database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    ClientId, EmployeeId, Error, FieldErrors, client::get_client, map_duplicate_rut,
};

// ============================================================================
// MODELS
// ============================================================================

/// A person employed by exactly one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// The ID of the employee.
    pub id: EmployeeId,
    /// The employee's name.
    pub name: String,
    /// The employee's RUT (tax ID), unique across employees.
    pub rut: String,
    /// The ID of the client the employee works for.
    pub client_id: ClientId,
}

/// The request body for creating or replacing an employee.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEmployee {
    /// The employee's name.
    pub name: Option<String>,
    /// The employee's RUT.
    pub rut: Option<String>,
    /// The client the employee works for.
    #[serde(
        default,
        alias = "clientId",
        deserialize_with = "crate::json::deserialize_optional_id"
    )]
    pub client_id: Option<ClientId>,
}

#[derive(Debug)]
pub(crate) struct ValidEmployee {
    name: String,
    rut: String,
    client_id: ClientId,
}

impl NewEmployee {
    /// Create a request body with every field set.
    pub fn new(name: &str, rut: &str, client_id: ClientId) -> Self {
        Self {
            name: Some(name.to_owned()),
            rut: Some(rut.to_owned()),
            client_id: Some(client_id),
        }
    }

    pub(crate) fn validate(self) -> Result<ValidEmployee, Error> {
        let mut errors = FieldErrors::default();
        let name = errors.require_text("name", self.name, "Name is required");
        let rut = errors.require_text("rut", self.rut, "RUT is required");
        let client_id = errors.require("client_id", self.client_id, "Client ID is required");
        errors.into_result()?;

        match (name, rut, client_id) {
            (Some(name), Some(rut), Some(client_id)) => Ok(ValidEmployee {
                name,
                rut,
                client_id,
            }),
            _ => Err(Error::Validation(
                "name, rut and client_id are required".to_owned(),
            )),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new employee for an existing client.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if a field is missing or blank,
/// - or [Error::NotFound] if the client does not exist,
/// - or [Error::DuplicateRut] if another employee already has the RUT,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_employee(
    new_employee: NewEmployee,
    connection: &Connection,
) -> Result<Employee, Error> {
    let ValidEmployee {
        name,
        rut,
        client_id,
    } = new_employee.validate()?;

    get_client(client_id, connection)?;

    connection
        .prepare(
            "INSERT INTO employee (name, rut, client_id) VALUES (?1, ?2, ?3)
             RETURNING id, name, rut, client_id",
        )?
        .query_row((&name, &rut, client_id), map_employee_row)
        .map_err(|error| map_duplicate_rut(error, &rut))
}

/// Retrieve an employee from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid employee,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_employee(id: EmployeeId, connection: &Connection) -> Result<Employee, Error> {
    connection
        .prepare("SELECT id, name, rut, client_id FROM employee WHERE id = :id")?
        .query_one(&[(":id", &id)], map_employee_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound("Employee"),
            error => error.into(),
        })
}

/// Retrieve every employee, ordered by ID.
pub fn get_all_employees(connection: &Connection) -> Result<Vec<Employee>, Error> {
    connection
        .prepare("SELECT id, name, rut, client_id FROM employee ORDER BY id")?
        .query_map([], map_employee_row)?
        .map(|maybe_employee| maybe_employee.map_err(Error::from))
        .collect()
}

/// Replace the fields of the employee with `id`, possibly moving them to another client.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if a field is missing or blank,
/// - or [Error::NotFound] if the employee or the new client does not exist,
/// - or [Error::DuplicateRut] if another employee already has the RUT,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_employee(
    id: EmployeeId,
    new_employee: NewEmployee,
    connection: &Connection,
) -> Result<Employee, Error> {
    let ValidEmployee {
        name,
        rut,
        client_id,
    } = new_employee.validate()?;

    get_employee(id, connection)?;
    get_client(client_id, connection)?;

    connection
        .prepare(
            "UPDATE employee SET name = ?1, rut = ?2, client_id = ?3 WHERE id = ?4
             RETURNING id, name, rut, client_id",
        )?
        .query_row((&name, &rut, client_id, id), map_employee_row)
        .map_err(|error| map_duplicate_rut(error, &rut))
}

/// Delete the employee with `id` along with their transactions.
///
/// Deleting an employee that does not exist is not an error.
pub fn delete_employee(id: EmployeeId, connection: &Connection) -> Result<(), Error> {
    connection.execute("DELETE FROM employee WHERE id = :id", &[(":id", &id)])?;

    Ok(())
}

/// Create the employee table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_employee_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS employee (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                rut TEXT NOT NULL UNIQUE,
                client_id INTEGER NOT NULL,
                FOREIGN KEY(client_id) REFERENCES client(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_employee_client ON employee(client_id);",
        (),
    )?;

    Ok(())
}

fn map_employee_row(row: &Row) -> Result<Employee, rusqlite::Error> {
    Ok(Employee {
        id: row.get(0)?,
        name: row.get(1)?,
        rut: row.get(2)?,
        client_id: row.get(3)?,
    })
}

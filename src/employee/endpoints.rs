//! Route handlers for employees.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    EmployeeId, Error, JsonBody,
    app_state::DbState,
    employee::{
        Employee, NewEmployee, create_employee, delete_employee, get_all_employees, get_employee,
        update_employee,
    },
};

/// A route handler for creating a new employee.
pub async fn create_employee_endpoint(
    State(state): State<DbState>,
    JsonBody(new_employee): JsonBody<NewEmployee>,
) -> Result<(StatusCode, Json<Employee>), Error> {
    let employee = state
        .run(move |connection| create_employee(new_employee, connection))
        .await?;

    tracing::info!(
        "Created employee {} for client {}",
        employee.id,
        employee.client_id
    );

    Ok((StatusCode::CREATED, Json(employee)))
}

/// A route handler for listing all employees.
pub async fn list_employees_endpoint(
    State(state): State<DbState>,
) -> Result<Json<Vec<Employee>>, Error> {
    state.run(get_all_employees).await.map(Json)
}

/// A route handler for getting an employee by their ID.
pub async fn get_employee_endpoint(
    State(state): State<DbState>,
    Path(employee_id): Path<EmployeeId>,
) -> Result<Json<Employee>, Error> {
    state
        .run(move |connection| get_employee(employee_id, connection))
        .await
        .map(Json)
}

/// A route handler for replacing an employee's fields.
pub async fn update_employee_endpoint(
    State(state): State<DbState>,
    Path(employee_id): Path<EmployeeId>,
    JsonBody(new_employee): JsonBody<NewEmployee>,
) -> Result<Json<Employee>, Error> {
    state
        .run(move |connection| update_employee(employee_id, new_employee, connection))
        .await
        .map(Json)
}

/// A route handler for deleting an employee and their transactions.
pub async fn delete_employee_endpoint(
    State(state): State<DbState>,
    Path(employee_id): Path<EmployeeId>,
) -> Result<StatusCode, Error> {
    state
        .run(move |connection| delete_employee(employee_id, connection))
        .await?;

    tracing::info!("Deleted employee {employee_id}");

    Ok(StatusCode::NO_CONTENT)
}

#![allow(missing_docs)]

use axum_test::TestServer;
use rusqlite::Connection;

use crate::{
    AppState, ClientId,
    admission::AdmissionGate,
    build_router,
    client::{Client, NewClient, create_client},
    db::initialize,
    employee::{Employee, NewEmployee, create_employee},
};

pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}

pub(crate) fn get_test_state() -> AppState {
    AppState::new(
        Connection::open_in_memory().unwrap(),
        AdmissionGate::new(),
    )
    .expect("Could not create app state.")
}

pub(crate) fn get_test_server_with_state(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

pub(crate) fn get_test_server() -> TestServer {
    get_test_server_with_state(get_test_state())
}

#[track_caller]
pub(crate) fn insert_client(conn: &Connection, rut: &str) -> Client {
    create_client(NewClient::new(&format!("Client {rut}"), rut), conn)
        .expect("Could not create client")
}

#[track_caller]
pub(crate) fn insert_employee(conn: &Connection, client_id: ClientId, rut: &str) -> Employee {
    create_employee(
        NewEmployee::new(&format!("Employee {rut}"), rut, client_id),
        conn,
    )
    .expect("Could not create employee")
}

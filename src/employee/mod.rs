//! Employees: the people who make transactions on behalf of a client.

mod core;
mod endpoints;

pub use core::{
    Employee, NewEmployee, create_employee, create_employee_table, delete_employee,
    get_all_employees, get_employee, update_employee,
};
pub use endpoints::{
    create_employee_endpoint, delete_employee_endpoint, get_employee_endpoint,
    list_employees_endpoint, update_employee_endpoint,
};

//! HR module: employee records, profile validation and review tracking.

mod employee;
mod error;
mod repository;

pub use employee::{Employee, EmployeeUpdate, NewEmployee, parse_review};
pub use error::{FieldProblem, HrError, HrResult, ValidationError};
pub use repository::EmployeeRepository;

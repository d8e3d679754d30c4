use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    employee::{Employee, EmployeeUpdate, NewEmployee, parse_review},
    error::{HrError, HrResult},
};

/// In-memory employee store.
///
/// Records are kept in insertion order and never removed. Every operation
/// returns an owned copy, so callers can only change stored records through
/// the methods below. A single lock serializes all writers; share the
/// repository between request handlers behind an `Arc`.
#[derive(Debug, Default)]
pub struct EmployeeRepository {
    employees: RwLock<Vec<Employee>>,
}

impl EmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `fields` and stores a new active employee with a fresh id.
    pub fn create(&self, fields: &Value) -> HrResult<Employee> {
        let employee = Employee::hire(NewEmployee::parse(fields)?);
        self.employees.write().push(employee.clone());
        info!(employee_id = %employee.id, "employee created");
        Ok(employee)
    }

    pub fn list(&self) -> Vec<Employee> {
        self.employees.read().clone()
    }

    pub fn get(&self, id: &str) -> HrResult<Employee> {
        self.employees
            .read()
            .iter()
            .find(|employee| employee.id == id)
            .cloned()
            .ok_or_else(|| HrError::not_found(id))
    }

    /// Overwrites the profile fields present in `fields` with non-empty text.
    /// Anything else in the payload is ignored.
    pub fn update(&self, id: &str, fields: &Value) -> HrResult<Employee> {
        self.modify(id, |employee| {
            let written = employee.apply(EmployeeUpdate::parse(fields));
            debug!(employee_id = %employee.id, fields = ?written, "employee updated");
            Ok(())
        })
    }

    /// Appends the `review` text of `body` to the employee's reviews.
    /// An unknown id is reported before an invalid review.
    pub fn add_review(&self, id: &str, body: &Value) -> HrResult<Employee> {
        self.modify(id, |employee| {
            let review = parse_review(body)?;
            employee.performance_reviews.push(review);
            debug!(
                employee_id = %employee.id,
                reviews = employee.performance_reviews.len(),
                "performance review added"
            );
            Ok(())
        })
    }

    /// Marks the employee inactive. Deactivating twice is not an error.
    pub fn deactivate(&self, id: &str) -> HrResult<Employee> {
        self.modify(id, |employee| {
            if employee.is_active {
                employee.is_active = false;
                info!(employee_id = %employee.id, "employee deactivated");
            }
            Ok(())
        })
    }

    pub fn len(&self) -> usize {
        self.employees.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.read().is_empty()
    }

    /// Runs `change` against the stored record under the write lock. When
    /// `change` fails the record must be left untouched.
    fn modify<F>(&self, id: &str, change: F) -> HrResult<Employee>
    where
        F: FnOnce(&mut Employee) -> HrResult<()>,
    {
        let mut employees = self.employees.write();
        let employee = employees
            .iter_mut()
            .find(|employee| employee.id == id)
            .ok_or_else(|| HrError::not_found(id))?;
        change(employee)?;
        Ok(employee.clone())
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{FieldProblem, ValidationError};

const NAME: &str = "name";
const POSITION: &str = "position";
const DEPARTMENT: &str = "department";
const CONTACT: &str = "contact";
const REVIEW: &str = "review";

/// A stored employee record as exposed over the wire.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub position: String,
    pub department: String,
    pub contact: String,
    pub is_active: bool,
    pub performance_reviews: Vec<String>,
}

impl Employee {
    pub(crate) fn hire(new: NewEmployee) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            position: new.position,
            department: new.department,
            contact: new.contact,
            is_active: true,
            performance_reviews: Vec::new(),
        }
    }

    /// Overwrites the profile fields carried by `update` and returns the names
    /// of the fields that were written.
    pub(crate) fn apply(&mut self, update: EmployeeUpdate) -> Vec<&'static str> {
        let mut written = Vec::new();
        let slots = [
            (NAME, update.name, &mut self.name),
            (POSITION, update.position, &mut self.position),
            (DEPARTMENT, update.department, &mut self.department),
            (CONTACT, update.contact, &mut self.contact),
        ];
        for (field, value, slot) in slots {
            if let Some(value) = value {
                *slot = value;
                written.push(field);
            }
        }
        written
    }
}

/// Validated input for creating an employee. Only [`NewEmployee::parse`]
/// can build one, so every value holds four non-empty strings.
///
/// ```compile_fail
/// let unchecked = products_hr::NewEmployee {
///     name: String::new(),
///     position: String::new(),
///     department: String::new(),
///     contact: String::new(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEmployee {
    name: String,
    position: String,
    department: String,
    contact: String,
}

impl NewEmployee {
    /// Checks `name`, `position`, `department` and `contact` in that order and
    /// reports the first field that is absent, not a string, or empty.
    pub fn parse(fields: &Value) -> Result<Self, ValidationError> {
        let text = |field: &'static str| {
            required_text(fields.get(field))
                .map_err(|problem| ValidationError::Employee { field, problem })
        };
        Ok(Self {
            name: text(NAME)?,
            position: text(POSITION)?,
            department: text(DEPARTMENT)?,
            contact: text(CONTACT)?,
        })
    }
}

/// Partial profile update. `None` means "leave the stored value alone".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeUpdate {
    name: Option<String>,
    position: Option<String>,
    department: Option<String>,
    contact: Option<String>,
}

impl EmployeeUpdate {
    /// Keeps only non-empty string values. Absent keys, `null`, `""` and
    /// non-string values all collapse to `None`; an update can never clear a
    /// field.
    pub fn parse(fields: &Value) -> Self {
        let text = |field: &str| non_empty_text(fields.get(field));
        Self {
            name: text(NAME),
            position: text(POSITION),
            department: text(DEPARTMENT),
            contact: text(CONTACT),
        }
    }
}

/// Reads the `review` key of a review submission.
pub fn parse_review(body: &Value) -> Result<String, ValidationError> {
    required_text(body.get(REVIEW)).map_err(ValidationError::Review)
}

fn required_text(value: Option<&Value>) -> Result<String, FieldProblem> {
    match value {
        None | Some(Value::Null) => Err(FieldProblem::Missing),
        Some(Value::String(text)) if text.is_empty() => Err(FieldProblem::Empty),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(FieldProblem::NotText),
    }
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

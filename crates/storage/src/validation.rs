use shared::domain::TodoList;

use crate::StoreError;

pub const MIN_NAME_CHARS: usize = 1;
pub const MAX_NAME_CHARS: usize = 100;

fn check_length(name: &str) -> Result<(), StoreError> {
    let actual = name.chars().count();
    if (MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&actual) {
        Ok(())
    } else {
        Err(StoreError::InvalidLength { actual })
    }
}

pub fn validate_todo_name(name: &str) -> Result<(), StoreError> {
    check_length(name)
}

/// Names compare case-sensitively.
pub fn validate_list_name(name: &str, existing: &[TodoList]) -> Result<(), StoreError> {
    check_length(name)?;
    if existing.iter().any(|list| list.name == name) {
        return Err(StoreError::DuplicateName(name.to_string()));
    }
    Ok(())
}

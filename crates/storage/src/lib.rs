//! In-memory, session-scoped storage for to-do lists.
//!
//! [`ListStore`] is the ordered list sequence owned by one session. Every
//! operation checks its indices and returns [`StoreError`] instead of
//! panicking on out-of-range access.

use serde::{Deserialize, Serialize};
use shared::{
    domain::{ListIndex, Todo, TodoIndex, TodoList},
    error::{ApiError, ErrorCode},
};
use thiserror::Error;

pub mod presentation;
pub mod session;
pub mod validation;

pub use session::{SessionId, SessionState, SessionStore};
pub use validation::{validate_list_name, validate_todo_name, MAX_NAME_CHARS, MIN_NAME_CHARS};

pub const INVALID_LENGTH_MESSAGE: &str = "Please enter a field between 1 to 100 characters";
pub const DUPLICATE_LIST_MESSAGE: &str = "This list already exists!";
pub const LIST_NOT_FOUND_MESSAGE: &str = "The specified list was not found.";
pub const TODO_NOT_FOUND_MESSAGE: &str = "The specified todo was not found.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("name must be 1..=100 characters, got {actual}")]
    InvalidLength { actual: usize },
    #[error("a list named {0:?} already exists")]
    DuplicateName(String),
    #[error("list {0} not found")]
    ListNotFound(ListIndex),
    #[error("todo {todo} not found in list {list}")]
    TodoNotFound { list: ListIndex, todo: TodoIndex },
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidLength { .. } => ErrorCode::InvalidLength,
            Self::DuplicateName(_) => ErrorCode::DuplicateName,
            Self::ListNotFound(_) | Self::TodoNotFound { .. } => ErrorCode::NotFound,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == ErrorCode::NotFound
    }

    /// Message shown to the user on the next rendered page.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidLength { .. } => INVALID_LENGTH_MESSAGE,
            Self::DuplicateName(_) => DUPLICATE_LIST_MESSAGE,
            Self::ListNotFound(_) => LIST_NOT_FOUND_MESSAGE,
            Self::TodoNotFound { .. } => TODO_NOT_FOUND_MESSAGE,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        ApiError::new(value.code(), value.user_message())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListStore {
    lists: Vec<TodoList>,
}

impl ListStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lists(&self) -> &[TodoList] {
        &self.lists
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn get(&self, index: ListIndex) -> Result<&TodoList, StoreError> {
        self.lists
            .get(index.0)
            .ok_or(StoreError::ListNotFound(index))
    }

    pub fn todo(&self, list: ListIndex, todo: TodoIndex) -> Result<&Todo, StoreError> {
        self.get(list)?
            .todos
            .get(todo.0)
            .ok_or(StoreError::TodoNotFound { list, todo })
    }

    fn get_mut(&mut self, index: ListIndex) -> Result<&mut TodoList, StoreError> {
        self.lists
            .get_mut(index.0)
            .ok_or(StoreError::ListNotFound(index))
    }

    fn todo_mut(&mut self, list: ListIndex, todo: TodoIndex) -> Result<&mut Todo, StoreError> {
        self.get_mut(list)?
            .todos
            .get_mut(todo.0)
            .ok_or(StoreError::TodoNotFound { list, todo })
    }

    pub fn create_list(&mut self, name: &str) -> Result<ListIndex, StoreError> {
        validate_list_name(name, &self.lists)?;
        self.lists.push(TodoList::new(name));
        Ok(ListIndex(self.lists.len() - 1))
    }

    /// The duplicate check covers every list, the renamed one included, so
    /// submitting the current name is rejected as a duplicate.
    pub fn rename_list(&mut self, index: ListIndex, name: &str) -> Result<(), StoreError> {
        self.get(index)?;
        validate_list_name(name, &self.lists)?;
        self.get_mut(index)?.name = name.to_string();
        Ok(())
    }

    /// Removes the list at `index`. Every later list moves down by one, so
    /// indices taken before the call no longer address the same lists.
    pub fn delete_list(&mut self, index: ListIndex) -> Result<TodoList, StoreError> {
        self.get(index)?;
        Ok(self.lists.remove(index.0))
    }

    pub fn add_todo(&mut self, list: ListIndex, name: &str) -> Result<TodoIndex, StoreError> {
        let target = self.get_mut(list)?;
        validate_todo_name(name)?;
        target.todos.push(Todo::new(name));
        Ok(TodoIndex(target.todos.len() - 1))
    }

    pub fn delete_todo(&mut self, list: ListIndex, todo: TodoIndex) -> Result<Todo, StoreError> {
        self.todo(list, todo)?;
        Ok(self.get_mut(list)?.todos.remove(todo.0))
    }

    pub fn set_todo_completed(
        &mut self,
        list: ListIndex,
        todo: TodoIndex,
        completed: bool,
    ) -> Result<(), StoreError> {
        self.todo_mut(list, todo)?.completed = completed;
        Ok(())
    }

    /// Returns how many todos were updated.
    pub fn set_all_completed(
        &mut self,
        list: ListIndex,
        completed: bool,
    ) -> Result<usize, StoreError> {
        let target = self.get_mut(list)?;
        for todo in &mut target.todos {
            todo.completed = completed;
        }
        Ok(target.todos.len())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

//! Route handler contract, independent of the HTTP framework.
//!
//! Each handler takes the caller's [`SessionState`], applies one operation,
//! records a status message, and tells the caller what to do next: redirect
//! on success, or re-render the originating form on a validation error. Bad
//! list/todo indices are not recoverable and come back as a `NotFound`
//! [`ApiError`].

use serde::Deserialize;
use shared::{
    domain::{ListIndex, TodoIndex},
    error::{ApiError, ErrorCode},
    protocol::{list_route, lists_route},
};
use storage::{SessionState, StoreError, LIST_NOT_FOUND_MESSAGE, TODO_NOT_FOUND_MESSAGE};
use tracing::{debug, warn};

pub const LIST_CREATED: &str = "The list has been created";
pub const LIST_UPDATED: &str = "The list has been updated!";
pub const LIST_DELETED: &str = "The list has been deleted.";
pub const TODO_ADDED: &str = "The todo was a success!";
pub const TODO_DELETED: &str = "The todo has been successfully deleted!";
pub const TODO_UPDATED: &str = "Your task has been updated!";
pub const ALL_TODOS_UPDATED: &str = "All tasks complete!";

/// Page the rendering layer should produce from the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Lists,
    NewList,
    List(ListIndex),
    EditList(ListIndex),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    Redirect(String),
    Render(View),
}

#[derive(Debug, Default, Deserialize)]
pub struct ListNameForm {
    #[serde(default)]
    pub list_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TodoForm {
    #[serde(default)]
    pub todo: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompletedForm {
    #[serde(default)]
    pub completed: Option<String>,
}

impl CompletedForm {
    /// Only the literal `"true"` marks something complete.
    pub fn is_completed(&self) -> bool {
        self.completed.as_deref() == Some("true")
    }
}

pub fn parse_list_index(raw: &str) -> Result<ListIndex, ApiError> {
    raw.parse::<ListIndex>().map_err(|_| {
        warn!(list_id = raw, "rejected malformed list id");
        ApiError::new(ErrorCode::NotFound, LIST_NOT_FOUND_MESSAGE)
    })
}

pub fn parse_todo_index(raw: &str) -> Result<TodoIndex, ApiError> {
    raw.parse::<TodoIndex>().map_err(|_| {
        warn!(todo_id = raw, "rejected malformed todo id");
        ApiError::new(ErrorCode::NotFound, TODO_NOT_FOUND_MESSAGE)
    })
}

/// Resolves a list id for the read-only pages (show and edit).
pub fn find_list(session: &SessionState, list_id: &str) -> Result<ListIndex, ApiError> {
    let index = parse_list_index(list_id)?;
    session.lists.get(index).map_err(not_found)?;
    Ok(index)
}

pub fn create_list(session: &mut SessionState, form: &ListNameForm) -> HandlerOutcome {
    let name = form.list_name.trim();
    match session.lists.create_list(name) {
        Ok(index) => {
            debug!(list_id = %index, name, "list created");
            session.set_success(LIST_CREATED);
            HandlerOutcome::Redirect(lists_route().to_string())
        }
        Err(err) => {
            session.set_error(err.user_message());
            HandlerOutcome::Render(View::NewList)
        }
    }
}

pub fn rename_list(
    session: &mut SessionState,
    list_id: &str,
    form: &ListNameForm,
) -> Result<HandlerOutcome, ApiError> {
    let index = parse_list_index(list_id)?;
    let name = form.list_name.trim();
    match session.lists.rename_list(index, name) {
        Ok(()) => {
            debug!(list_id = %index, name, "list renamed");
            session.set_success(LIST_UPDATED);
            Ok(HandlerOutcome::Redirect(list_route(index)))
        }
        Err(err) => recover(session, err, View::EditList(index)),
    }
}

pub fn delete_list(session: &mut SessionState, list_id: &str) -> Result<HandlerOutcome, ApiError> {
    let index = parse_list_index(list_id)?;
    let removed = session.lists.delete_list(index).map_err(not_found)?;
    debug!(list_id = %index, name = %removed.name, "list deleted");
    session.set_success(LIST_DELETED);
    Ok(HandlerOutcome::Redirect(lists_route().to_string()))
}

pub fn add_todo(
    session: &mut SessionState,
    list_id: &str,
    form: &TodoForm,
) -> Result<HandlerOutcome, ApiError> {
    let index = parse_list_index(list_id)?;
    let name = form.todo.trim();
    match session.lists.add_todo(index, name) {
        Ok(todo) => {
            debug!(list_id = %index, todo_id = %todo, name, "todo added");
            session.set_success(TODO_ADDED);
            Ok(HandlerOutcome::Redirect(list_route(index)))
        }
        Err(err) => recover(session, err, View::List(index)),
    }
}

pub fn delete_todo(
    session: &mut SessionState,
    list_id: &str,
    todo_id: &str,
) -> Result<HandlerOutcome, ApiError> {
    let index = parse_list_index(list_id)?;
    let todo = parse_todo_index(todo_id)?;
    session.lists.delete_todo(index, todo).map_err(not_found)?;
    debug!(list_id = %index, todo_id = %todo, "todo deleted");
    session.set_success(TODO_DELETED);
    Ok(HandlerOutcome::Redirect(list_route(index)))
}

pub fn update_todo(
    session: &mut SessionState,
    list_id: &str,
    todo_id: &str,
    form: &CompletedForm,
) -> Result<HandlerOutcome, ApiError> {
    let index = parse_list_index(list_id)?;
    let todo = parse_todo_index(todo_id)?;
    let completed = form.is_completed();
    session
        .lists
        .set_todo_completed(index, todo, completed)
        .map_err(not_found)?;
    debug!(list_id = %index, todo_id = %todo, completed, "todo status changed");
    session.set_success(TODO_UPDATED);
    Ok(HandlerOutcome::Redirect(list_route(index)))
}

pub fn complete_all(
    session: &mut SessionState,
    list_id: &str,
    form: &CompletedForm,
) -> Result<HandlerOutcome, ApiError> {
    let index = parse_list_index(list_id)?;
    let completed = form.is_completed();
    let updated = session
        .lists
        .set_all_completed(index, completed)
        .map_err(not_found)?;
    debug!(list_id = %index, updated, completed, "all todos status changed");
    session.set_success(ALL_TODOS_UPDATED);
    Ok(HandlerOutcome::Redirect(list_route(index)))
}

/// Validation failures become an error message and a re-render; a missing
/// list or todo is propagated.
fn recover(
    session: &mut SessionState,
    err: StoreError,
    view: View,
) -> Result<HandlerOutcome, ApiError> {
    if err.is_not_found() {
        return Err(not_found(err));
    }
    session.set_error(err.user_message());
    Ok(HandlerOutcome::Render(view))
}

fn not_found(err: StoreError) -> ApiError {
    warn!(%err, "rejected request for missing entry");
    err.into()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

//! JSON page documents produced by the server's rendering layer.
//!
//! Every page carries the session's pending [`Flash`], which is cleared once
//! it has been rendered.

use serde::{Deserialize, Serialize};

use crate::domain::{Flash, ListIndex, TodoIndex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
    pub list_id: ListIndex,
    pub name: String,
    pub href: String,
    pub todos_count: usize,
    pub todos_remaining: usize,
    pub complete: bool,
    /// `"complete"` when every todo is done, for styling hooks.
    pub class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoSummary {
    pub todo_id: TodoIndex,
    pub name: String,
    pub completed: bool,
    pub toggle_href: String,
    pub destroy_href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListsPage {
    pub flash: Option<Flash>,
    pub lists: Vec<ListSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewListPage {
    pub flash: Option<Flash>,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage {
    pub flash: Option<Flash>,
    pub list: ListSummary,
    pub todos: Vec<TodoSummary>,
    pub add_todo_href: String,
    pub complete_all_href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditListPage {
    pub flash: Option<Flash>,
    pub list_id: ListIndex,
    pub current_name: String,
    pub action: String,
    pub destroy_href: String,
}

pub fn lists_route() -> &'static str {
    "/lists"
}

pub fn new_list_route() -> &'static str {
    "/lists/new"
}

pub fn list_route(list_id: ListIndex) -> String {
    format!("/lists/{list_id}")
}

pub fn edit_list_route(list_id: ListIndex) -> String {
    format!("/lists/{list_id}/edit")
}

pub fn destroy_list_route(list_id: ListIndex) -> String {
    format!("/lists/{list_id}/destroy")
}

pub fn todos_route(list_id: ListIndex) -> String {
    format!("/lists/{list_id}/todos")
}

pub fn todo_route(list_id: ListIndex, todo_id: TodoIndex) -> String {
    format!("/lists/{list_id}/todos/{todo_id}")
}

pub fn destroy_todo_route(list_id: ListIndex, todo_id: TodoIndex) -> String {
    format!("/lists/{list_id}/todos/{todo_id}/destroy")
}

pub fn complete_all_route(list_id: ListIndex) -> String {
    format!("/lists/{list_id}/complete_all")
}

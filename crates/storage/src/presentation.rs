//! Display-order and completion helpers used when rendering pages.
//!
//! Sorting never touches the underlying sequence; each entry keeps the index
//! it has in the store, which is what links and forms must submit back.

use shared::domain::{ListIndex, Todo, TodoIndex, TodoList};

/// An empty list is never complete.
pub fn is_list_complete(list: &TodoList) -> bool {
    todos_count(list) > 0 && remaining_count(list) == 0
}

pub fn todos_count(list: &TodoList) -> usize {
    list.todos.len()
}

pub fn remaining_count(list: &TodoList) -> usize {
    list.todos.iter().filter(|todo| !todo.completed).count()
}

pub fn list_class(list: &TodoList) -> Option<&'static str> {
    is_list_complete(list).then_some("complete")
}

pub fn sort_lists(lists: &[TodoList]) -> Vec<(&TodoList, ListIndex)> {
    incomplete_first(lists, is_list_complete)
        .into_iter()
        .map(|(list, index)| (list, ListIndex(index)))
        .collect()
}

pub fn sort_todos(todos: &[Todo]) -> Vec<(&Todo, TodoIndex)> {
    incomplete_first(todos, |todo| todo.completed)
        .into_iter()
        .map(|(todo, index)| (todo, TodoIndex(index)))
        .collect()
}

fn incomplete_first<T>(items: &[T], is_done: impl Fn(&T) -> bool) -> Vec<(&T, usize)> {
    let (done, pending): (Vec<_>, Vec<_>) = items
        .iter()
        .enumerate()
        .map(|(index, item)| (item, index))
        .partition(|(item, _)| is_done(item));
    pending.into_iter().chain(done).collect()
}

#[cfg(test)]
#[path = "tests/presentation_tests.rs"]
mod tests;

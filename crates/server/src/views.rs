//! Rendering layer: turns session state into page documents. Rendering a
//! page consumes the session's pending status message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use server_api::{HandlerOutcome, View};
use shared::{
    domain::{ListIndex, TodoList},
    error::ApiError,
    protocol::{
        complete_all_route, destroy_list_route, destroy_todo_route, list_route, lists_route,
        todo_route, todos_route, EditListPage, ListPage, ListSummary, ListsPage, NewListPage,
        TodoSummary,
    },
};
use storage::{
    presentation::{is_list_complete, list_class, remaining_count, sort_lists, sort_todos, todos_count},
    SessionState,
};

#[derive(Debug)]
pub(crate) enum Page {
    Lists(ListsPage),
    NewList(NewListPage),
    List(ListPage),
    EditList(EditListPage),
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        match self {
            Page::Lists(page) => Json(page).into_response(),
            Page::NewList(page) => Json(page).into_response(),
            Page::List(page) => Json(page).into_response(),
            Page::EditList(page) => Json(page).into_response(),
        }
    }
}

pub(crate) fn render(session: &mut SessionState, view: View) -> Result<Page, ApiError> {
    let mut page = match view {
        View::Lists => Page::Lists(ListsPage {
            flash: None,
            lists: sort_lists(session.lists.lists())
                .into_iter()
                .map(|(list, index)| list_summary(list, index))
                .collect(),
        }),
        View::NewList => Page::NewList(NewListPage {
            flash: None,
            action: lists_route().to_string(),
        }),
        View::List(index) => {
            let list = session.lists.get(index)?;
            Page::List(ListPage {
                flash: None,
                list: list_summary(list, index),
                todos: sort_todos(&list.todos)
                    .into_iter()
                    .map(|(todo, todo_id)| TodoSummary {
                        todo_id,
                        name: todo.name.clone(),
                        completed: todo.completed,
                        toggle_href: todo_route(index, todo_id),
                        destroy_href: destroy_todo_route(index, todo_id),
                    })
                    .collect(),
                add_todo_href: todos_route(index),
                complete_all_href: complete_all_route(index),
            })
        }
        View::EditList(index) => {
            let list = session.lists.get(index)?;
            Page::EditList(EditListPage {
                flash: None,
                list_id: index,
                current_name: list.name.clone(),
                action: list_route(index),
                destroy_href: destroy_list_route(index),
            })
        }
    };

    let flash = session.take_flash();
    match &mut page {
        Page::Lists(p) => p.flash = flash,
        Page::NewList(p) => p.flash = flash,
        Page::List(p) => p.flash = flash,
        Page::EditList(p) => p.flash = flash,
    }
    Ok(page)
}

/// Redirects become `303 See Other`; a re-rendered form after a rejected
/// submission is `422 Unprocessable Entity`.
pub(crate) fn respond(session: &mut SessionState, outcome: HandlerOutcome) -> Result<Response, ApiError> {
    match outcome {
        HandlerOutcome::Redirect(location) => Ok(Redirect::to(&location).into_response()),
        HandlerOutcome::Render(view) => {
            let page = render(session, view)?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

fn list_summary(list: &TodoList, list_id: ListIndex) -> ListSummary {
    ListSummary {
        list_id,
        name: list.name.clone(),
        href: list_route(list_id),
        todos_count: todos_count(list),
        todos_remaining: remaining_count(list),
        complete: is_list_complete(list),
        class: list_class(list).map(str::to_string),
    }
}

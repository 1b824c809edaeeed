pub mod alert;
pub mod board_report;
pub mod briefing;
pub mod collaboration;
pub mod demo;
pub mod health;
pub mod organization;
pub mod playbook;
pub mod scenario;
pub mod signal;
pub mod task;
pub mod trigger;
pub mod user;
pub mod war_room;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /organizations                                   list, create
/// /organizations/{id}                              get, update, delete
/// /organizations/{id}/dashboard                    status counts
///
/// /users                                           list, create
/// /users/{id}                                      get, update, delete
///
/// /scenarios                                       list, create
/// /scenarios/{id}                                  get, update, delete
/// /scenarios/{id}/tasks                            list, create
/// /tasks                                           list
/// /tasks/{id}                                      get, update, delete
///
/// /playbooks                                       search, create
/// /playbooks/domains                               domains with counts
/// /playbooks/categories                            categories with counts
/// /playbooks/stats                                 library statistics
/// /playbooks/{id}                                  get, update, delete
/// /playbooks/{id}/activate                         spawn a scenario (POST)
///
/// /signals                                         list
/// /signals/categories                              category catalogue
/// /signals/{id}/playbooks                          linked playbooks
///
/// /triggers                                        list, create
/// /triggers/{id}                                   get, update, delete
/// /triggers/{id}/evaluate                          evaluate a value (POST)
///
/// /alerts                                          list, create
/// /alerts/{id}                                     get, update, delete
/// /alerts/{id}/acknowledge                         acknowledge (POST)
/// /alerts/{id}/resolve                             resolve (POST)
///
/// /war-rooms                                       list, create
/// /war-rooms/{id}                                  get, update
/// /war-rooms/{id}/start                            start, opens a room (POST)
/// /war-rooms/{id}/end                              end, closes the room (POST)
///
/// /collaboration/rooms                             list, create
/// /collaboration/rooms/{id}                        get, close
///
/// /briefings                                       list, create
/// /briefings/generate                              compose from live state (POST)
/// /briefings/{id}                                  get, update, delete
///
/// /board-reports                                   list, create
/// /board-reports/{id}                              get, update, delete
///
/// /activity                                        paged activity log
///
/// /demo/generate                                   create a demo tenant (POST)
/// /demo/reset                                      wipe tenant data (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/organizations", organization::router())
        .nest("/users", user::router())
        .nest("/scenarios", scenario::router())
        .nest("/tasks", task::router())
        // Playbook library and the signal catalogue it is linked to.
        .nest("/playbooks", playbook::router())
        .nest("/signals", signal::router())
        // Monitoring.
        .nest("/triggers", trigger::router())
        .nest("/alerts", alert::router())
        // Live sessions and in-memory decision rooms.
        .nest("/war-rooms", war_room::router())
        .nest("/collaboration", collaboration::router())
        // Documents.
        .nest("/briefings", briefing::router())
        .nest("/board-reports", board_report::router())
        .route("/activity", get(handlers::activity::list))
        .nest("/demo", demo::router())
}

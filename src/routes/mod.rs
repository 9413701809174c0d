pub mod auth;
pub mod health;
pub mod todos;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::me)
            .service(auth::update_profile)
            .service(auth::change_password),
    )
    .service(
        // The literal /stats and /completed routes must be registered before
        // the /{id} routes so they are not captured as ids.
        web::scope("/todos")
            .service(todos::get_stats)
            .service(todos::delete_completed)
            .service(todos::get_todos)
            .service(todos::create_todo)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::delete_todo)
            .service(todos::toggle_todo),
    );
}

pub mod health;
pub mod lists;
pub mod tasks;
pub mod users;

use actix_web::web;

/// Wires up everything under the `/api/v1` scope.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(users::create_user)
            .service(users::issue_token)
            .service(users::me)
            .service(users::verify_email)
            .service(users::delete_me)
            .service(users::send_reset_mail)
            .service(users::reset_password),
    )
    .service(
        web::scope("/lists")
            .service(lists::create_list)
            .service(lists::get_lists)
            .service(lists::retrieve_list)
            .service(lists::delete_list),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::create_task)
            .service(tasks::complete_task)
            .service(tasks::edit_task)
            .service(tasks::delete_task),
    );
}

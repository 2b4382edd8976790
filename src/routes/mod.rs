pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::{AuthMiddleware, RoleGuard, TokenService};
use crate::models::Role;

/// Builds the `/api` route tree.
///
/// The `/auth` scope is public. The `/tasks` and `/users` scopes sit behind
/// the authentication gate; individual routes add an authorization gate with
/// the role set they require. The token service is passed in explicitly so
/// tests can wire the same tree with their own secrets.
pub fn config(tokens: TokenService) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::refresh_token),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware::new(tokens.clone()))
                .service(
                    web::resource("")
                        .route(web::get().to(tasks::get_tasks))
                        .route(web::post().to(tasks::create_task)),
                )
                .service(
                    web::resource("/{id}/complete")
                        .route(web::patch().to(tasks::complete_task)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(tasks::get_task))
                        .route(
                            web::put()
                                .to(tasks::update_task)
                                .wrap(RoleGuard::allow(&[Role::Admin, Role::Manager])),
                        )
                        .route(
                            web::delete()
                                .to(tasks::delete_task)
                                .wrap(RoleGuard::allow(&[Role::Admin])),
                        ),
                ),
        )
        .service(
            web::scope("/users")
                .wrap(AuthMiddleware::new(tokens))
                .service(
                    web::resource("/role").route(
                        web::put()
                            .to(users::update_role)
                            .wrap(RoleGuard::allow(&[Role::Admin])),
                    ),
                )
                .service(
                    web::resource("/profile").route(web::put().to(users::update_profile)),
                )
                .service(
                    web::resource("/{id}")
                        .route(
                            web::get()
                                .to(users::get_user)
                                .wrap(RoleGuard::allow(&[Role::Admin])),
                        )
                        .route(
                            web::delete()
                                .to(users::delete_user)
                                .wrap(RoleGuard::allow(&[Role::Admin])),
                        ),
                )
                .service(
                    web::resource("").route(
                        web::get()
                            .to(users::list_users)
                            .wrap(RoleGuard::allow(&[Role::Admin])),
                    ),
                ),
        );
    }
}

use crate::{
    api::{approval, balance, delegation, holiday, leave_request, leave_type, report, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Auth routes (register/me authorize via the bearer token themselves)
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(web::resource("/me").route(web::get().to(handlers::me))),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/users")
                    // /users
                    .service(web::resource("").route(web::get().to(user::list_users)))
                    // /users/{id}/team
                    .service(web::resource("/{id}/team").route(web::get().to(user::get_team)))
                    // /users/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(user::get_user))
                            .route(web::put().to(user::update_user)),
                    ),
            )
            .service(
                web::scope("/leave-types")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_type::list_leave_types))
                            .route(web::post().to(leave_type::create_leave_type)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(leave_type::update_leave_type))
                            .route(web::delete().to(leave_type::deactivate_leave_type)),
                    ),
            )
            .service(
                web::scope("/balances")
                    // /balances/me must match before /balances/{user_id}
                    .service(web::resource("/me").route(web::get().to(balance::my_balances)))
                    .service(
                        web::resource("/initialize/{year}")
                            .route(web::post().to(balance::initialize_balances)),
                    )
                    .service(
                        web::resource("/{user_id}").route(web::get().to(balance::user_balances)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::put().to(leave_request::update_leave))
                            .route(web::delete().to(leave_request::cancel_leave)),
                    ),
            )
            .service(
                web::scope("/approvals")
                    .service(
                        web::resource("/pending")
                            .route(web::get().to(approval::my_pending_approvals)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(approval::approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(approval::reject_leave)),
                    ),
            )
            .service(
                web::scope("/holidays")
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday::list_holidays))
                            .route(web::post().to(holiday::create_holiday)),
                    )
                    // GET {year} lists a year; PUT/DELETE {id} edit one row
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(holiday::holidays_by_year))
                            .route(web::put().to(holiday::update_holiday))
                            .route(web::delete().to(holiday::delete_holiday)),
                    ),
            )
            .service(
                web::scope("/delegations")
                    .service(
                        web::resource("")
                            .route(web::post().to(delegation::create_delegation)),
                    )
                    .service(
                        web::resource("/active")
                            .route(web::get().to(delegation::active_delegations)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(delegation::cancel_delegation)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .service(
                        web::resource("/team-calendar")
                            .route(web::get().to(report::team_calendar)),
                    )
                    .service(
                        web::resource("/leave-summary").route(web::get().to(report::leave_summary)),
                    ),
            ),
    );
}

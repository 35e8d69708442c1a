use crate::{api::leave, auth::middleware::auth_middleware, config::Config};
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

    let submit_limiter = Arc::new(build_limiter(config.rate_submit_per_min));
    let decision_limiter = Arc::new(build_limiter(config.rate_decision_per_min));
    let callback_limiter = Arc::new(build_limiter(config.rate_callback_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Engine callbacks: no bearer principal, validated by payload contract
    cfg.service(
        web::scope("/callbacks").service(
            web::resource("/leave-event")
                .wrap(callback_limiter.clone())
                .route(web::post().to(leave::saga_event)),
        ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .wrap(submit_limiter.clone())
                            .route(web::get().to(leave::leave_list))
                            .route(web::post().to(leave::submit_leave)),
                    )
                    // /leave/{identity}
                    .service(
                        web::resource("/{identity}").route(web::get().to(leave::get_leave)),
                    )
                    // /leave/{identity}/accept and /leave/{identity}/reject,
                    // plus anything else the mail link got mangled into --
                    // the resolver answers unknown segments with 400
                    .service(
                        web::resource("/{identity}/{action}")
                            .wrap(decision_limiter.clone())
                            .route(web::get().to(leave::decide_leave))
                            .route(web::put().to(leave::decide_leave)),
                    ),
            ),
    );
}

// SUBMIT
//  └─ POST /api/v1/leave            (applicant, JWT)
//       └─ engine REQUEST event → POST /callbacks/leave-event
//            └─ reviewer mail with accept/reject links
// DECIDE
//  └─ GET|PUT /api/v1/leave/{identity}/{action}   (HR/Admin, JWT)
//       └─ engine ACCEPT|REJECT event → POST /callbacks/leave-event
//            └─ applicant mail + terminal transition

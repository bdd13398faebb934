use crate::{
    api::{attendance, device},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

/// Limiter allowing `requests_per_min` per peer IP.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let sync_limiter = build_limiter(config.rate_sync_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(protected_limiter)
            .service(
                web::scope("/attendance").service(
                    // /attendance/sync
                    web::resource("/sync")
                        .wrap(sync_limiter)
                        .route(web::post().to(attendance::sync_attendance)),
                ),
            )
            .service(
                web::scope("/devices")
                    // /devices
                    .service(web::resource("").route(web::get().to(device::list_devices)))
                    // /devices/{id}/test
                    .service(
                        web::resource("/{id}/test").route(web::post().to(device::test_connection)),
                    ),
            ),
    );
}

use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::{constants::FORM_BODY_LIMIT, handlers::contact};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/contact")
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(FORM_BODY_LIMIT)
                    .memory_limit(FORM_BODY_LIMIT),
            )
            .route(web::route().to(contact::submit_contact))
    );
}

use crate::consts;
use ntex::web;

/// Configures the WhatsApp webhook resource.
///
/// These routes are public endpoints that don't require authentication.
///
/// # Routes
/// - `GET /webhook` - WhatsApp webhook verification
/// - `POST /webhook` - WhatsApp webhook receiver
/// - any other method - 404 `Method not implemented`
pub fn whatsapp(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(consts::WEBHOOK_PATH)
            .route(web::get().to(super::whatsapp::verify))
            .route(web::post().to(super::whatsapp::receive))
            .route(web::route().to(super::whatsapp::method_not_implemented)),
    );
}

pub mod admin;
pub mod auth;
pub mod comments;
pub mod contests;
pub mod photos;
pub mod users;

use actix_web::web;

/// Upload bodies are read in full before validation, so the extractor limit
/// sits above the validator's own ceiling to let oversize files get a proper
/// validation message instead of a bare 413.
pub fn payload_config(max_upload_bytes: usize) -> web::PayloadConfig {
    web::PayloadConfig::new(max_upload_bytes.saturating_mul(2))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(
        web::scope("/auth")
            .route("/me", web::get().to(auth::me))
            .route("/complete-profile", web::post().to(auth::complete_profile)),
    );

    // ── User routes ──
    cfg.service(
        web::scope("/users")
            .route("/{id}", web::get().to(users::get_user))
            .route(
                "/{id}/submissions/weekly",
                web::get().to(users::weekly_submissions),
            ),
    );

    // ── Contest routes (reads are public) ──
    cfg.service(
        web::scope("/contests")
            .route("", web::get().to(contests::get_contests))
            .route("/{id}", web::get().to(contests::get_contest))
            .route("/{id}/photos", web::get().to(photos::get_contest_photos))
            .route("/{id}/photos", web::post().to(photos::submit_photo))
            .route("/{id}/my-submission", web::get().to(photos::my_submission))
            .route("/{id}/validate-photo", web::post().to(photos::validate_photo)),
    );

    // ── Photo routes ──
    cfg.service(
        web::scope("/photos")
            .route("/{id}", web::delete().to(photos::delete_photo))
            .route("/{id}/votes", web::post().to(photos::cast_vote))
            .route("/{id}/votes/me", web::get().to(photos::my_vote))
            .route("/{id}/comments", web::get().to(comments::get_comments))
            .route("/{id}/comments", web::post().to(comments::add_comment)),
    );

    // ── Comment moderation ──
    cfg.service(
        web::resource("/comments/{id}/flag").route(web::post().to(comments::flag_comment)),
    );
    cfg.service(
        web::resource("/moderation/profanity-check")
            .route(web::post().to(comments::profanity_check)),
    );

    // ── Admin routes (admin role checked per handler) ──
    cfg.service(
        web::scope("/admin")
            .route("/contests", web::post().to(admin::create_contest))
            .route("/contests/advance", web::post().to(admin::advance_phases))
            .route("/contests/{id}/status", web::put().to(admin::set_contest_status))
            .route("/photos/{id}/moderation", web::put().to(admin::moderate_photo))
            .route("/users/{id}/membership", web::put().to(admin::update_membership)),
    );
}

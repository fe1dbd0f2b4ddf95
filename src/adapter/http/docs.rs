use axum::{Json, response::Html};
use utoipa::{
    Modify, OpenApi,
    openapi::{
        OpenApi as OpenApiDoc,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};

use crate::adapter::http::{
    app_error_impl::ErrorResponse,
    routes::profile,
    schema::profile::{
        AvatarResponse, AvatarUploadRequest, BatchProfilesRequest, CreateProfileRequest, ProfileResponse,
        ProfileSummaryResponse, UpdateProfileRequest,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut OpenApiDoc) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Profile service", description = "User profiles, avatars and profile search"),
    modifiers(&SecurityAddon),
    paths(
        profile::search_profiles,
        profile::get_profiles_batch,
        profile::get_profile,
        profile::get_my_profile,
        profile::create_my_profile,
        profile::update_my_profile,
        profile::update_profile,
        profile::replace_my_avatar,
        profile::replace_avatar
    ),
    components(
        schemas(
            ErrorResponse,
            CreateProfileRequest,
            UpdateProfileRequest,
            AvatarUploadRequest,
            BatchProfilesRequest,
            ProfileResponse,
            ProfileSummaryResponse,
            AvatarResponse
        )
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<OpenApiDoc> {
    Json(ApiDoc::openapi())
}

pub async fn docs_ui() -> Html<&'static str> {
    Html(
        r#"
            <!doctype html>
            <html>
              <head>
                <title>Profile service API</title>
                <meta charset="utf-8">
                <meta name="viewport" content="width=device-width, initial-scale=1">
                <script src="https://unpkg.com/@stoplight/elements/web-components.min.js"></script>
                <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements/styles.min.css">
              </head>
              <body style="height: 100%; margin: 0;">
                <elements-api
                  apiDescriptionUrl="openapi.json"
                  basePath="/"
                  router="hash"
                />
              </body>
            </html>
        "#,
    )
}

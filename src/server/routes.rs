//! The user-facing web server: a static upload page and the single
//! tag-suggestion endpoint. This is the "front end"; everything interesting
//! about a request happens in `imaging` and `vision`.

use super::protocol::UploadRequest;
use super::ApiError;
use crate::imaging;
use crate::vision::VisionClient;
use actix_web::http::header::ContentType;
use actix_web::{get, post, web, HttpResponse, Responder};
use tracing::info;

type Result<T> = std::result::Result<T, ApiError>;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Serve the static upload page
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

/// Accept one uploaded photo and return the model's tag suggestions.
///
/// The request body carries the photo as a data URL. The pipeline is linear:
/// decode and normalize the image, send it upstream once, parse the reply,
/// return the parsed JSON verbatim. The two failure exits (unreadable image,
/// upstream trouble) surface through [`ApiError`].
#[post("/upload")]
pub async fn upload(
    req: web::Json<UploadRequest>,
    client: web::Data<VisionClient>,
) -> Result<impl Responder> {
    info!("handling {:?}", req.0);

    let transport_url = imaging::prepare_for_inference(&req.image)?;
    let suggestion = client.suggest_tags(&transport_url).await?;

    info!("finished serving tag suggestion request");

    Ok(web::Json(suggestion))
}

use actix_web::{middleware, web, App, HttpServer};
use osm_phototag::config::MAX_UPLOAD_BYTES;
use osm_phototag::server::routes;
use osm_phototag::settings::Settings;
use osm_phototag::vision::VisionClient;
use std::{env, io, process};

use tracing::info;

const USAGE: &str = "usage: ./phototag <port>";

fn get_args() -> u16 {
    let args: Vec<String> = env::args().collect();
    if args.len() - 1 != 1 {
        println!("{USAGE}");
        process::exit(1);
    }

    args[1].parse().expect("invalid port")
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt::init();

    let port = get_args();

    let settings = Settings::load().unwrap_or_else(|err| {
        eprintln!("failed to load settings: {err:#}");
        process::exit(1);
    });

    info!(
        "suggesting tags with model {} via {}",
        settings.model, settings.api_base
    );

    let client = web::Data::new(VisionClient::new(&settings));

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(client.clone())
            .app_data(web::JsonConfig::default().limit(MAX_UPLOAD_BYTES))
            .wrap(middleware::Logger::default())
            .service(routes::index)
            .service(routes::upload)
    })
    .bind(format!("0.0.0.0:{port}"))?
    .run()
    .await
}

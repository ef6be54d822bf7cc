use clap::Parser;
use tracing::info;

use crate::{
    config::{Config, StartArgs},
    hotel::db::HotelDb,
    image::ImageStore,
    state::Hotels,
};

pub mod config;
pub mod error;
pub mod hotel;
pub mod image;
pub mod router;
pub mod slug;
pub mod state;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let StartArgs {
        config_path,
        address: host,
        port,
        log_level: level,
    } = StartArgs::parse();

    tracing_subscriber::fmt().with_max_level(level).init();

    let addr = format!("{host}:{port}");

    let Config {
        hotels_dir,
        uploads_dir,
        max_upload_bytes,
    } = Config::read(config_path).expect("invalid config file");

    info!("Hotels stored in {hotels_dir}, images in {uploads_dir}");

    let hotels = Hotels::new(HotelDb::new(hotels_dir), ImageStore::new(uploads_dir));

    info!("Now listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("error while starting TCP listener");

    let router = router::router(hotels, max_upload_bytes);

    axum::serve(listener, router)
        .await
        .expect("error while starting server");
}

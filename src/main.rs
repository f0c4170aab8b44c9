#[actix_web::main]
async fn main() -> std::io::Result<()> {
    travel_docs_server::run().await
}

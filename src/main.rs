#[actix_web::main]
async fn main() -> std::io::Result<()> {
    agency_crm_lib::run().await
}

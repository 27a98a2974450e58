use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use schedman_db::{
    create_pool, repositories::token::purge_expired_tokens, schema::initialize_database,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").wrap_err("DATABASE_URL environment variable must be set")?;

    println!("Connecting to database...");
    let db_pool = create_pool(&database_url).await?;

    println!("Initializing database schema...");
    initialize_database(&db_pool).await?;

    let purged = purge_expired_tokens(&db_pool).await?;
    println!("Removed {} expired token revocations.", purged);

    println!("Database schema initialized successfully.");
    Ok(())
}

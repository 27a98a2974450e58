use color_eyre::eyre::{Result, WrapErr, eyre};
use dotenv::dotenv;
use schedman_api::middleware::auth::{UserSpec, create_user};
use schedman_core::validation::user::normalize_email;
use schedman_db::{create_pool, repositories::user::email_exists, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").wrap_err("DATABASE_URL environment variable must be set")?;
    let email = normalize_email(&std::env::var("SUPERUSER_EMAIL").unwrap_or_default());
    let password = std::env::var("SUPERUSER_PASSWORD").unwrap_or_default();

    let db_pool = create_pool(&database_url).await?;
    initialize_database(&db_pool).await?;

    if !email.is_empty() && email_exists(&db_pool, &email).await? {
        return Err(eyre!("A user with email {} already exists", email));
    }

    let user = create_user(
        &db_pool,
        UserSpec {
            email,
            password,
            is_superuser: true,
            ..UserSpec::default()
        },
    )
    .await?;

    println!("Superuser {} created ({}).", user.email, user.id);
    Ok(())
}

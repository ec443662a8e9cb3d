use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

#[rocket::launch]
fn rocket() -> _ {
    dotenv().ok();
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        eprintln!("tracing subscriber already installed: {}", err);
    }
    microposts::rocket()
}

use graphql_http::{Client, ClientConfig};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let endpoint =
        env::var("GRAPHQL_HTTP_URL").unwrap_or_else(|_| "http://localhost:4000/graphql".to_string());

    let client = Client::new(ClientConfig::new(endpoint))?;

    let response = client
        .execute_raw("{ __schema { queryType { name } } }", None, None)
        .await?;

    for error in response.errors() {
        eprintln!("graphql error: {error}");
    }
    println!("data: {}", response.data.unwrap_or_default());

    client.dispose();
    Ok(())
}

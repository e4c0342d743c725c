use graphql_http::{CancellationToken, Client, ClientConfig, GraphQlRequest};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct Vars {
    country_code: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Data {
    country: Option<Country>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Country {
    name: String,
    capital: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let endpoint =
        env::var("GRAPHQL_HTTP_URL").unwrap_or_else(|_| "https://countries.trevorblades.com/".to_string());

    let client = Client::new(ClientConfig::new(endpoint))?;

    let request = GraphQlRequest::new(
        "query Country($countryCode: ID!) { country(code: $countryCode) { name capital } }",
    )
    .with_variables(Vars {
        country_code: "NO".to_string(),
    })
    .with_operation_name("Country");

    // give up after five seconds
    let token = CancellationToken::new();
    let timer = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            token.cancel();
        })
    };

    let response = client
        .send_query::<_, Data>(&request, Some(&token))
        .await?;
    timer.abort();

    println!("response: {response:?}");
    client.dispose();
    Ok(())
}

use std::time::Duration;

use reqwest::Client;

pub(crate) fn build_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build reqwest client")
}

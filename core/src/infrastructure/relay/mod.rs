pub mod relay_http_client;

pub use relay_http_client::RelayHttpClient;

pub mod alert;
pub mod api_config;
pub mod proxy;
pub mod transport;

pub use alert::AlertService;
pub use api_config::ApiConfigService;
pub use proxy::ProxyClient;
pub use webhook_test::WebhookTestService;

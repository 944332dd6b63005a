pub mod classifier;
pub mod http;
pub mod sessions;

pub use classifier::{Intent, IntentClassifier};
pub use http::HttpService;
pub use sessions::UserSessions;

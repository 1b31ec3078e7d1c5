pub use self::configs::{ErrorResponse, SubmitConfigResponse};

mod configs;

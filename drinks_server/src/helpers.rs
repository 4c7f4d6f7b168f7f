use actix_web::web;
use log::debug;

use crate::errors::ServerError;

/// JSON body extraction that reports malformed payloads in the server's own error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!("💻️ Could not deserialize request body. {err}");
        ServerError::CouldNotDeserializePayload(err.to_string()).into()
    })
}

/// Path extraction that turns unparsable ids into a `bad_request` rather than actix's default 404.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req| {
        debug!("💻️ Invalid request path {}. {err}", req.path());
        ServerError::InvalidRequestPath(err.to_string()).into()
    })
}

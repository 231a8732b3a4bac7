pub mod fingerprint;
pub mod hello;

pub use hello::{
    classify_client_hello, classify_server_hello, ClientHello, ParseError, ParseMode, ServerHello,
};

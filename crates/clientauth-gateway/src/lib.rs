//! # Clientauth Gateway
//!
//! A thin request/response facade over the remote user service.
//!
//! - [`client`]: [`UserGateway`], one method per remote call
//! - [`token_store`]: [`TokenStore`], the single session token slot
//! - [`error`]: [`GatewayError`]
//!
//! Every call is a single HTTP round trip with no retry and no caching.
//! Non-zero envelope codes are errors even when the HTTP status is 200.
//!
//! # Example
//!
//! ```ignore
//! use clientauth_config::GatewayConfig;
//! use clientauth_gateway::UserGateway;
//! use clientauth_models::Credentials;
//!
//! let gateway = UserGateway::new(&GatewayConfig::new("http://localhost:11100"))?;
//! let code = gateway.get_register_code("15000000000").await?;
//! gateway.login(&Credentials::phone_and_code("15000000000", &code)).await?;
//! let me = gateway.get_user_by_phone_number("15000000000").await?;
//! ```

pub mod client;
pub mod error;
pub mod token_store;

pub use client::UserGateway;
pub use error::GatewayError;
pub use token_store::TokenStore;

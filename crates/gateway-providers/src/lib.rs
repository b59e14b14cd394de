//! # Gateway Providers
//!
//! Provider integrations for the Generation Gateway.
//!
//! This crate provides:
//! - The multimodal vendor (chat, image, video tasks)
//! - The enterprise LLM vendor with OAuth credential exchange
//! - The speech synthesis vendor
//! - Payload adapters, the upstream invoker and the response normalizer
//! - `GatewayService`, the request pipeline over a `ProviderRegistry`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod credential;
pub mod doubao;
pub mod invoker;
pub mod normalize;
pub mod qianfan;
pub mod registry;
pub mod service;
pub mod volc_tts;

// Re-export main types
pub use credential::{
    AuthScheme, Credential, CredentialError, CredentialProvider, CredentialStore,
    OAuthTokenExchange, QianfanCredential, StaticKeyCredential, TokenExchange, TokenGrant,
    REFRESH_WINDOW_SECS,
};
pub use doubao::{DoubaoConfig, DoubaoProvider};
pub use invoker::UpstreamInvoker;
pub use normalize::{normalize, QuotaPolicy};
pub use qianfan::QianfanProvider;
pub use registry::ProviderRegistry;
pub use service::GatewayService;
pub use volc_tts::VolcTtsProvider;

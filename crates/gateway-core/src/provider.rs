//! The seam between the gateway pipeline and each vendor integration.

use crate::error::GatewayResult;
use crate::request::GenerationRequest;
use crate::response::GatewayResponse;
use crate::types::{Capability, ProviderKind};
use crate::upstream::{UpstreamRequest, UpstreamResult};
use async_trait::async_trait;

/// One vendor integration serving one or more capabilities.
///
/// The pipeline calls these in order: [`Provider::check_config`],
/// [`Provider::build_request`], [`Provider::authorization_header`], then the
/// upstream call, then [`Provider::normalize`]. Nothing before the upstream
/// call may touch the network except the credential exchange.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider identity
    fn kind(&self) -> ProviderKind;

    /// Capabilities this provider serves
    fn capabilities(&self) -> &[Capability];

    /// Fail with `CONFIG_MISSING` when a required secret is absent
    fn check_config(&self) -> GatewayResult<()>;

    /// Sanitize, adapt and validate a request into the provider's wire shape
    fn build_request(&self, request: &GenerationRequest) -> GatewayResult<UpstreamRequest>;

    /// Value for the `Authorization` header; `None` sends the request without one
    async fn authorization_header(&self) -> Option<String>;

    /// Map the provider's raw result onto the uniform envelope
    fn normalize(&self, result: UpstreamResult) -> GatewayResponse;

    /// Whether this provider serves `capability`
    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

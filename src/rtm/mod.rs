//! Remember The Milk integration.
//!
//! Enabled when both `RTM_API_KEY` and `RTM_SHARED_SECRET` are configured.
//! Adds health and server-time resources, the `rtm_health_check` tool and two
//! dashboard endpoints.

pub mod api_client;
pub mod health;

pub use api_client::{RtmClient, RTM_BASE_URL};
pub use health::{check_health, HealthStatus};

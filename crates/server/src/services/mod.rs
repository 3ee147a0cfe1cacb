//! Business logic services.
//!
//! - [`funnel`] - pure funnel stage selection and prompt templates
//! - [`coach`] - the reply generator behind the chat endpoint
//! - [`membership`] - payment webhook orchestration and fulfillment
//! - [`mirror`] - fire-and-forget conversation mirroring to Supabase

pub mod coach;
pub mod funnel;
pub mod membership;
pub mod mirror;

pub use coach::CoachService;
pub use membership::MembershipService;
pub use mirror::MirrorClient;

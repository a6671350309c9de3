//! Deployment utilities for the semantic image-search web client: populate
//! the generated `aws-exports.js` from CloudFormation stack outputs and
//! publish the built bundle to Amplify Hosting or an S3/CloudFront origin.

use aws_config::{BehaviorVersion, Region, SdkConfig};

pub mod amplify;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod outputs;
pub mod site;
pub mod template;

pub use error::Error;

pub(crate) async fn sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// Logger used by every binary. Human-facing status lines go straight to
/// stdout; `RUST_LOG` opts in to debug detail.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();
}

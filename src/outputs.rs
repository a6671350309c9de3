use std::collections::HashMap;

use aws_sdk_cloudformation::error::SdkError;
use aws_sdk_cloudformation::types::Output;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("Service error occurred: {0}.")]
    ServiceError(String),

    #[error("Unknown error occurred: {0}.")]
    UnknownError(String),

    #[error("Stack {0} not found")]
    NotFoundError(String),
}

/// A deployed CloudFormation stack, queried for its declared outputs.
pub struct Stack {
    pub stack_name: String,

    client: aws_sdk_cloudformation::Client,
}

impl Stack {
    pub async fn new(stack_name: &str, region: &str) -> Self {
        let sdk_config = crate::sdk_config(region).await;
        let client = aws_sdk_cloudformation::Client::new(&sdk_config);

        Self {
            stack_name: stack_name.to_string(),
            client,
        }
    }

    /// One DescribeStacks call, no retries. A transient failure is fatal
    /// to the run.
    pub async fn get_outputs(&self) -> Result<Vec<Output>, Error> {
        let result = self
            .client
            .describe_stacks()
            .stack_name(&self.stack_name)
            .send()
            .await;

        let result = match result {
            Ok(data) => data,
            Err(SdkError::ServiceError(context)) => {
                return Err(Error::ServiceError(context.err().to_string()));
            }
            Err(err) => return Err(Error::UnknownError(err.to_string())),
        };

        let stacks = result.stacks();
        let stack = match stacks.first() {
            Some(stack) => stack,
            None => return Err(Error::NotFoundError(self.stack_name.clone())),
        };

        Ok(stack.outputs().to_vec())
    }
}

/// Collect outputs into a key/value mapping. Output keys are unique per
/// stack; entries without a key or value are skipped.
pub fn to_map(outputs: &[Output]) -> HashMap<String, String> {
    outputs
        .iter()
        .filter_map(|output| {
            Some((
                output.output_key()?.to_string(),
                output.output_value()?.to_string(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::to_map;
    use aws_sdk_cloudformation::types::Output;

    #[test]
    fn maps_outputs_by_key() {
        let outputs = vec![
            Output::builder()
                .output_key("Region")
                .output_value("us-east-1")
                .build(),
            Output::builder()
                .output_key("S3Bucket")
                .output_value("my-bucket")
                .build(),
        ];

        let map = to_map(&outputs);
        assert_eq!(2, map.len());
        assert_eq!("us-east-1", map["Region"]);
        assert_eq!("my-bucket", map["S3Bucket"]);
    }

    #[test]
    fn skips_incomplete_outputs() {
        let outputs = vec![Output::builder().output_key("OnlyKey").build()];
        assert_eq!(0, to_map(&outputs).len());
    }
}

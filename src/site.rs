use std::path::Path;

use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use console::style;
use futures::{stream, StreamExt, TryStreamExt};

use crate::config::DeployConfig;
use crate::{manifest, outputs};

/// Stack outputs the S3 publisher depends on.
const BUCKET_OUTPUT: &str = "S3Bucket";
const URL_OUTPUT: &str = "CloudFrontUrl";

const CONCURRENT_UPLOADS: usize = 8;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Service error occurred: {0}.")]
    ServiceError(String),

    #[error("Unknown error occurred: {0}.")]
    UnknownError(String),

    #[error("Stack output {0} was not found; is the stack deployed with the website resources?")]
    MissingOutput(&'static str),

    #[error("Unable to upload {key}: {message}")]
    Upload { key: String, message: String },
}

fn api_error<E>(error: SdkError<E>) -> Error
where
    E: std::error::Error,
{
    match error {
        SdkError::ServiceError(context) => Error::ServiceError(context.err().to_string()),
        other => Error::UnknownError(other.to_string()),
    }
}

fn content_type(path: &Path) -> String {
    // Bundles are served as application/javascript; the mime database has
    // since moved to text/javascript.
    if path.extension().and_then(|extension| extension.to_str()) == Some("js") {
        return "application/javascript".to_string();
    }

    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Upload the whole dist tree to the website bucket named by the stack
/// outputs, then print the CloudFront URL. Every run re-uploads every
/// file; there is no diffing and no cache invalidation.
pub async fn publish(config: &DeployConfig, dist: &Path) -> Result<(), crate::Error> {
    let stack = outputs::Stack::new(&config.stack_name, &config.region).await;
    let resolved = outputs::to_map(&stack.get_outputs().await?);

    let bucket = resolved
        .get(BUCKET_OUTPUT)
        .ok_or(Error::MissingOutput(BUCKET_OUTPUT))?;
    let url = resolved
        .get(URL_OUTPUT)
        .ok_or(Error::MissingOutput(URL_OUTPUT))?;

    let entries = manifest::walk(dist)?;

    let sdk_config = crate::sdk_config(&config.region).await;
    let client = aws_sdk_s3::Client::new(&sdk_config);

    let uploads = entries.iter().map(|entry| {
        let client = client.clone();
        async move {
            let body = ByteStream::from_path(&entry.path)
                .await
                .map_err(|error| Error::Upload {
                    key: entry.key.clone(),
                    message: error.to_string(),
                })?;

            client
                .put_object()
                .bucket(bucket)
                .key(&entry.key)
                .body(body)
                .content_type(content_type(&entry.path))
                .send()
                .await
                .map_err(|error| {
                    let api = api_error(error);
                    Error::Upload {
                        key: entry.key.clone(),
                        message: api.to_string(),
                    }
                })?;

            log::debug!("uploaded {}", entry.key);
            Ok::<(), Error>(())
        }
    });

    stream::iter(uploads)
        .buffer_unordered(CONCURRENT_UPLOADS)
        .try_collect::<Vec<()>>()
        .await?;

    println!("{}", style(url).green());

    Ok(())
}

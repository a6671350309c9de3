use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use aws_sdk_amplify::error::SdkError;
use aws_sdk_amplify::types::{JobStatus, Platform, Stage};
use console::style;
use futures::{stream, StreamExt, TryStreamExt};

use crate::manifest;

/// Every deployment goes through this fixed branch, promoted straight to
/// production.
const BRANCH_NAME: &str = "npm";

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const POLL_DEADLINE: Duration = Duration::from_secs(600);
const CONCURRENT_UPLOADS: usize = 8;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Service error occurred: {0}.")]
    ServiceError(String),

    #[error("Unknown error occurred: {0}.")]
    UnknownError(String),

    #[error("No App with name \"{0}\" was found.")]
    AppNotFound(String),

    #[error("Amplify response is missing the {0} field")]
    MissingField(&'static str),

    #[error("Unable to upload {key}: {message}")]
    Upload { key: String, message: String },

    #[error("Deployment finished with status FAILED")]
    JobFailed,

    #[error("Deployment did not reach a terminal status within {0} seconds")]
    Timeout(u64),

    #[error(transparent)]
    Manifest(#[from] manifest::Error),
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

fn is_terminal(status: &JobStatus) -> bool {
    matches!(status, JobStatus::Succeed | JobStatus::Failed)
}

/// First app id in a listing page whose name matches exactly.
fn find_app_id<'a, I>(apps: I, name: &str) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    apps.into_iter()
        .find(|(app_name, _)| *app_name == name)
        .map(|(_, app_id)| app_id.to_string())
}

struct CreatedApp {
    app_id: String,
    default_domain: String,
}

struct Deployment {
    job_id: String,
    file_upload_urls: HashMap<String, String>,
}

/// Publishes a built bundle as an Amplify Hosting application named after
/// the stack, or tears such an application down.
pub struct Publisher {
    client: aws_sdk_amplify::Client,
    app_name: String,
}

impl Publisher {
    pub async fn new(app_name: &str, region: &str) -> Self {
        let sdk_config = crate::sdk_config(region).await;
        let client = aws_sdk_amplify::Client::new(&sdk_config);

        Self {
            client,
            app_name: app_name.to_string(),
        }
    }

    /// Create the app and branch, upload the dist tree, then follow the
    /// deployment job to a terminal status. Re-running creates a second
    /// app with the same name; Amplify allows duplicates and so do we.
    pub async fn publish(&self, dist: &Path) -> Result<(), Error> {
        let app = self.create_app().await?;
        let branch = self.create_branch(&app.app_id).await?;

        let file_map = manifest::hashed(dist).await?;
        log::debug!("requesting deployment for {} files", file_map.len());

        let deployment = self.create_deployment(&app.app_id, &branch, file_map).await?;
        self.upload_files(dist, &deployment.file_upload_urls).await?;

        let status = self
            .start_deployment(&app.app_id, &branch, &deployment.job_id)
            .await?;
        let status = self
            .wait_for_job(&app.app_id, &branch, &deployment.job_id, status)
            .await?;

        println!("Deployment: {}", status.as_str());
        if status == JobStatus::Failed {
            return Err(Error::JobFailed);
        }

        println!(
            "{}",
            style(format!("https://{}.{}", branch, app.default_domain)).green()
        );

        Ok(())
    }

    /// Locate the app by exact name through the paginated listing and
    /// delete it.
    pub async fn unhost(&self) -> Result<(), Error> {
        let app_id = self.app_id_by_name().await?;
        println!("Amplify Application Id: {app_id}");

        self.client
            .delete_app()
            .app_id(&app_id)
            .send()
            .await
            .map_err(api_error)?;
        println!("Deleted Amplify Application: {}", self.app_name);

        Ok(())
    }

    async fn app_id_by_name(&self) -> Result<String, Error> {
        let mut next_token: Option<String> = None;

        loop {
            let mut request = self.client.list_apps();
            if let Some(token) = &next_token {
                request = request.next_token(token);
            }
            let response = request.send().await.map_err(api_error)?;

            let page = response
                .apps()
                .iter()
                .map(|app| (app.name(), app.app_id()));
            if let Some(app_id) = find_app_id(page, &self.app_name) {
                return Ok(app_id);
            }

            next_token = response.next_token().map(str::to_string);
            if next_token.is_none() {
                return Err(Error::AppNotFound(self.app_name.clone()));
            }
        }
    }

    async fn create_app(&self) -> Result<CreatedApp, Error> {
        let response = self
            .client
            .create_app()
            .name(&self.app_name)
            .platform(Platform::Web)
            .send()
            .await
            .map_err(api_error)?;

        let app = response.app().ok_or(Error::MissingField("app"))?;
        println!("Created Amplify Application: {}", self.app_name);

        Ok(CreatedApp {
            app_id: app.app_id().to_string(),
            default_domain: app.default_domain().to_string(),
        })
    }

    async fn create_branch(&self, app_id: &str) -> Result<String, Error> {
        let response = self
            .client
            .create_branch()
            .app_id(app_id)
            .branch_name(BRANCH_NAME)
            .stage(Stage::Production)
            .send()
            .await
            .map_err(api_error)?;

        let branch = response.branch().ok_or(Error::MissingField("branch"))?;
        println!("Created Amplify Application branch: {}", branch.branch_name());

        Ok(branch.branch_name().to_string())
    }

    async fn create_deployment(
        &self,
        app_id: &str,
        branch: &str,
        file_map: HashMap<String, String>,
    ) -> Result<Deployment, Error> {
        let response = self
            .client
            .create_deployment()
            .app_id(app_id)
            .branch_name(branch)
            .set_file_map(Some(file_map))
            .send()
            .await
            .map_err(api_error)?;

        let job_id = response
            .job_id()
            .ok_or(Error::MissingField("jobId"))?
            .to_string();
        let file_upload_urls = response.file_upload_urls().clone();

        Ok(Deployment {
            job_id,
            file_upload_urls,
        })
    }

    /// PUT each file's raw bytes to its signed URL as opaque binary. The
    /// fan-out is bounded and aborts on the first failed upload; files
    /// already uploaded stay where they are.
    async fn upload_files(
        &self,
        dist: &Path,
        urls: &HashMap<String, String>,
    ) -> Result<(), Error> {
        let http = reqwest::Client::new();

        let uploads = urls.iter().map(|(key, url)| {
            let http = http.clone();
            async move {
                let bytes = tokio::fs::read(dist.join(key)).await.map_err(|error| {
                    Error::Upload {
                        key: key.clone(),
                        message: error.to_string(),
                    }
                })?;

                http.put(url)
                    .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                    .body(bytes)
                    .send()
                    .await
                    .and_then(|response| response.error_for_status())
                    .map_err(|error| Error::Upload {
                        key: key.clone(),
                        message: error.to_string(),
                    })?;

                println!("Uploaded file: {key}");
                Ok::<(), Error>(())
            }
        });

        stream::iter(uploads)
            .buffer_unordered(CONCURRENT_UPLOADS)
            .try_collect::<Vec<()>>()
            .await?;

        Ok(())
    }

    async fn start_deployment(
        &self,
        app_id: &str,
        branch: &str,
        job_id: &str,
    ) -> Result<JobStatus, Error> {
        let response = self
            .client
            .start_deployment()
            .app_id(app_id)
            .branch_name(branch)
            .job_id(job_id)
            .send()
            .await
            .map_err(api_error)?;
        println!("Started deployment..");

        let summary = response
            .job_summary()
            .ok_or(Error::MissingField("jobSummary"))?;

        Ok(summary.status().clone())
    }

    /// Poll the job every two seconds, printing each observed status,
    /// until it is terminal or the deadline passes.
    async fn wait_for_job(
        &self,
        app_id: &str,
        branch: &str,
        job_id: &str,
        initial: JobStatus,
    ) -> Result<JobStatus, Error> {
        let deadline = tokio::time::Instant::now() + POLL_DEADLINE;
        let mut status = initial;

        while !is_terminal(&status) {
            println!("Deployment: {}", status.as_str());

            if tokio::time::Instant::now() >= deadline {
                return Err(Error::Timeout(POLL_DEADLINE.as_secs()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;

            let response = self
                .client
                .get_job()
                .app_id(app_id)
                .branch_name(branch)
                .job_id(job_id)
                .send()
                .await
                .map_err(api_error)?;

            status = response
                .job()
                .and_then(|job| job.summary())
                .map(|summary| summary.status().clone())
                .ok_or(Error::MissingField("job summary"))?;
        }

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::{find_app_id, is_terminal};
    use aws_sdk_amplify::types::JobStatus;

    #[test]
    fn follows_listing_pages_until_found() {
        let pages = vec![
            vec![("other-app", "d111"), ("sample", "d222")],
            vec![("my-stack", "d333")],
        ];

        let mut fetched = 0;
        let mut found = None;
        for page in &pages {
            fetched += 1;
            found = find_app_id(page.iter().copied(), "my-stack");
            if found.is_some() {
                break;
            }
        }

        assert_eq!(Some("d333".to_string()), found);
        assert_eq!(2, fetched);
    }

    #[test]
    fn exhausted_listing_finds_nothing() {
        let page = vec![("other-app", "d111")];
        assert_eq!(None, find_app_id(page.into_iter(), "my-stack"));
    }

    #[test]
    fn name_match_is_exact() {
        let page = vec![("my-stack-2", "d111"), ("my", "d222")];
        assert_eq!(None, find_app_id(page.into_iter(), "my-stack"));
    }

    #[test]
    fn terminal_statuses() {
        assert!(is_terminal(&JobStatus::Succeed));
        assert!(is_terminal(&JobStatus::Failed));
        assert!(!is_terminal(&JobStatus::Pending));
        assert!(!is_terminal(&JobStatus::Running));
        assert!(!is_terminal(&JobStatus::Provisioning));
    }
}

use std::path::PathBuf;

use clap::Args;

use crate::config::{self, DeployConfig};
use crate::error::Error;

/// Where the deployment target comes from: a samconfig toml file or an
/// explicit stack name and region pair. Shared by all three binaries.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// The path to the samconfig toml file
    #[arg(short, long, value_name = "PATH")]
    pub toml_file: Option<PathBuf>,

    /// The name of the CloudFormation Stack
    #[arg(short, long, value_name = "NAME")]
    pub stack_name: Option<String>,

    /// The AWS region
    #[arg(short, long, value_name = "REGION")]
    pub region: Option<String>,
}

impl SourceArgs {
    /// Enforce the single-source rule before anything touches the
    /// network: exactly one of the toml file or the full flag pair.
    pub fn resolve(&self) -> Result<DeployConfig, Error> {
        match (&self.toml_file, &self.stack_name, &self.region) {
            (None, None, None) => Err(Error::Usage(
                "Please specify a toml file or a stack name and region".to_string(),
            )),
            (Some(path), None, None) => Ok(config::parse(path)?),
            (Some(_), _, _) => Err(Error::Usage(
                "Please supply either a toml file or a stack name and region, not both."
                    .to_string(),
            )),
            (None, Some(stack_name), Some(region)) => Ok(DeployConfig {
                stack_name: stack_name.clone(),
                region: region.clone(),
            }),
            (None, _, _) => Err(Error::Usage(
                "Please supply a stack name and region.".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::SourceArgs;
    use crate::error::Error;
    use tempfile::tempdir;

    fn args(
        toml_file: Option<&str>,
        stack_name: Option<&str>,
        region: Option<&str>,
    ) -> SourceArgs {
        SourceArgs {
            toml_file: toml_file.map(Into::into),
            stack_name: stack_name.map(Into::into),
            region: region.map(Into::into),
        }
    }

    fn usage_message(result: Result<crate::config::DeployConfig, Error>) -> String {
        match result.err().unwrap() {
            Error::Usage(message) => message,
            other => panic!("Expected `Usage` error, got {other:?}"),
        }
    }

    #[test]
    fn nothing_supplied() {
        let message = usage_message(args(None, None, None).resolve());
        assert_eq!("Please specify a toml file or a stack name and region", message);
    }

    #[test]
    fn partial_flags() {
        for partial in [args(None, Some("my-stack"), None), args(None, None, Some("us-east-1"))] {
            let message = usage_message(partial.resolve());
            assert_eq!("Please supply a stack name and region.", message);
        }
    }

    #[test]
    fn toml_mixed_with_flags() {
        for mixed in [
            args(Some("samconfig.toml"), Some("my-stack"), None),
            args(Some("samconfig.toml"), None, Some("us-east-1")),
            args(Some("samconfig.toml"), Some("my-stack"), Some("us-east-1")),
        ] {
            let message = usage_message(mixed.resolve());
            assert_eq!(
                "Please supply either a toml file or a stack name and region, not both.",
                message
            );
        }
    }

    #[test]
    fn flags_alone_resolve() {
        let config = args(None, Some("my-stack"), Some("us-east-1"))
            .resolve()
            .unwrap();
        assert_eq!("my-stack", config.stack_name);
        assert_eq!("us-east-1", config.region);
    }

    #[test]
    fn toml_alone_resolves() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("samconfig.toml");
        fs::write(
            &path,
            "[default.deploy.parameters]\nstack_name = \"my-stack\"\nregion = \"eu-west-1\"\n",
        )
        .unwrap();

        let config = args(path.to_str(), None, None).resolve().unwrap();
        assert_eq!("my-stack", config.stack_name);
        assert_eq!("eu-west-1", config.region);
    }
}

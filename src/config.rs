use serde::Deserialize;
use std::{fs, io, path::Path};
use validator::Validate;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("File {0} not found")]
    FileNotFound(String),

    #[error("Unable to parse specified toml file: {0}")]
    ParsingError(String),

    #[error("Unable to find Stack Name and/or Region in specified toml.")]
    MissingParameters,

    #[error("Unknown error occurred: {0}")]
    Unknown(String),
}

/// Deployment target resolved from the samconfig toml or from CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployConfig {
    pub region: String,
    pub stack_name: String,
}

/// The slice of a samconfig.toml this tool cares about. Everything else in
/// the file (version, build parameters, other environments) is ignored.
#[derive(Debug, Deserialize)]
struct SamConfig {
    default: Option<Environment>,
}

#[derive(Debug, Deserialize)]
struct Environment {
    deploy: Option<DeployCommand>,
}

#[derive(Debug, Deserialize)]
struct DeployCommand {
    parameters: Option<Parameters>,
}

#[derive(Debug, Default, Deserialize, Validate)]
struct Parameters {
    #[validate(required)]
    region: Option<String>,

    #[validate(required)]
    stack_name: Option<String>,
}

pub fn parse(path: &Path) -> Result<DeployConfig, Error> {
    let contents = match fs::read_to_string(path) {
        Ok(raw_contents) => Ok(raw_contents),
        Err(error) => match error.kind() {
            io::ErrorKind::NotFound => Err(Error::FileNotFound(path.display().to_string())),
            _ => Err(Error::Unknown(error.to_string())),
        },
    }?;

    let config: SamConfig = match toml::from_str(&contents) {
        Ok(data) => Ok(data),
        Err(error) => Err(Error::ParsingError(error.to_string())),
    }?;

    let parameters = config
        .default
        .and_then(|environment| environment.deploy)
        .and_then(|deploy| deploy.parameters)
        .unwrap_or_default();

    if parameters.validate().is_err() {
        return Err(Error::MissingParameters);
    }

    log::debug!("loaded deploy config from {}", path.display());

    // Both fields validated as present above
    Ok(DeployConfig {
        region: parameters.region.unwrap_or_default(),
        stack_name: parameters.stack_name.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use super::parse;
    use super::Error;
    use tempfile::tempdir;

    #[test]
    fn file_does_not_exist() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("samconfig.toml");

        let result = parse(&file_path);
        assert_eq!(true, result.is_err());
        match result.err().unwrap() {
            Error::FileNotFound(_) => {}
            _ => panic!("Expected `FileNotFound` error"),
        }
    }

    #[test]
    fn file_wrong_format() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("samconfig.toml");

        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "not toml at all").unwrap();

        let result = parse(&file_path);
        assert_eq!(true, result.is_err());
        match result.err().unwrap() {
            Error::ParsingError(_) => {}
            _ => panic!("Expected `ParsingError` error"),
        }
    }

    #[test]
    fn file_missing_stack_name() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("samconfig.toml");

        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "[default.deploy.parameters]\nregion = \"us-east-1\"").unwrap();

        let result = parse(&file_path);
        assert_eq!(true, result.is_err());
        match result.err().unwrap() {
            Error::MissingParameters => {}
            _ => panic!("Expected `MissingParameters` error"),
        }
    }

    #[test]
    fn file_missing_parameters_section() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("samconfig.toml");

        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "version = 0.1\n\n[default.build.parameters]\ncached = true").unwrap();

        let result = parse(&file_path);
        assert_eq!(true, result.is_err());
        match result.err().unwrap() {
            Error::MissingParameters => {}
            _ => panic!("Expected `MissingParameters` error"),
        }
    }

    #[test]
    fn parses_the_config() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("samconfig.toml");

        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            "version = 0.1\n\n[default.deploy.parameters]\nstack_name = \"my-stack\"\nregion = \"us-east-1\"\nconfirm_changeset = true"
        )
        .unwrap();

        let result = parse(&file_path).unwrap();
        assert_eq!("my-stack", result.stack_name);
        assert_eq!("us-east-1", result.region);
    }
}

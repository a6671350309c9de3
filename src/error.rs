use console::style;

use crate::{amplify, config, manifest, outputs, site, template};

/// Everything a binary can fail with. The library never exits the
/// process; each binary's main prints the diagnostic and performs the
/// exit itself.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] config::Error),

    #[error(transparent)]
    Outputs(#[from] outputs::Error),

    #[error(transparent)]
    Template(#[from] template::Error),

    #[error(transparent)]
    Manifest(#[from] manifest::Error),

    #[error(transparent)]
    Amplify(#[from] amplify::Error),

    #[error(transparent)]
    Site(#[from] site::Error),
}

impl Error {
    /// Print the diagnostic the way the scripts always have: usage and
    /// config guidance in yellow, everything else in red.
    pub fn report(&self) {
        match self {
            Error::Usage(message) => eprintln!("{}", style(message).yellow()),
            Error::Config(error @ config::Error::MissingParameters) => {
                eprintln!("{}", style(error).yellow());
                eprintln!(
                    "Expecting to find properties with names: {} and {} in the {} section of the toml file.",
                    style("stack_name").yellow(),
                    style("region").yellow(),
                    style("[default.deploy.parameters]").yellow()
                );
                eprintln!("Ensure the toml file specified has these properties. Alternatively specify these values directly as arguments instead of the toml file path.");
            }
            other => eprintln!("{}", style(other).red()),
        }
    }

    pub fn exit_code(&self) -> i32 {
        1
    }
}

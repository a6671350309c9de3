use std::collections::{BTreeSet, HashMap};
use std::{fs, io, path::Path};

use regex::Regex;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("File {0} not found")]
    FileNotFound(String),

    #[error(
        "The following required exports were not found as outputs of the stack: {}",
        .0.join(", ")
    )]
    MissingOutputs(Vec<String>),

    #[error("Unable to write {0}: {1}")]
    WriteError(String, String),

    #[error("Unknown error occurred: {0}")]
    Unknown(String),
}

/// Distinct `{Identifier}` tokens found in the template text, sorted.
pub fn placeholders(text: &str) -> BTreeSet<String> {
    let pattern = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern");

    pattern
        .captures_iter(text)
        .map(|capture| capture[1].to_string())
        .collect()
}

/// Substitute every `{Key}` in the template with its stack output value and
/// write the result. Fails closed: if any placeholder has no matching
/// output, nothing is written.
pub fn populate(
    template_path: &Path,
    output_path: &Path,
    outputs: &HashMap<String, String>,
) -> Result<(), Error> {
    let template = match fs::read_to_string(template_path) {
        Ok(contents) => Ok(contents),
        Err(error) => match error.kind() {
            io::ErrorKind::NotFound => {
                Err(Error::FileNotFound(template_path.display().to_string()))
            }
            _ => Err(Error::Unknown(error.to_string())),
        },
    }?;

    let missing: Vec<String> = placeholders(&template)
        .into_iter()
        .filter(|key| !outputs.contains_key(key))
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingOutputs(missing));
    }

    let mut populated = template;
    for (key, value) in outputs {
        populated = populated.replace(&format!("{{{key}}}"), value);
    }

    fs::write(output_path, populated)
        .map_err(|error| Error::WriteError(output_path.display().to_string(), error.to_string()))
}

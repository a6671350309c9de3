use std::path::PathBuf;
use std::process;

use clap::Parser;

use cfn_site_deploy::cli::SourceArgs;
use cfn_site_deploy::{outputs, template, Error};

#[derive(Parser)]
#[command(
    name = "exports",
    version,
    about = "Populate the aws-exports.js template file with the CloudFormation stack outputs"
)]
struct Args {
    /// The path to the aws-exports template file
    #[arg(value_name = "TEMPLATE", default_value = "./src/aws-exports-template.js")]
    exports_template: PathBuf,

    #[command(flatten)]
    source: SourceArgs,

    /// The output file path
    #[arg(short, long, value_name = "PATH", default_value = "./src/aws-exports.js")]
    output_path: PathBuf,
}

async fn run(args: Args) -> Result<(), Error> {
    let config = args.source.resolve()?;

    let stack = outputs::Stack::new(&config.stack_name, &config.region).await;
    let resolved = outputs::to_map(&stack.get_outputs().await?);

    template::populate(&args.exports_template, &args.output_path, &resolved)?;

    Ok(())
}

#[tokio::main]
async fn main() {
    cfn_site_deploy::init_logger();
    let args = Args::parse();

    if let Err(error) = run(args).await {
        error.report();
        process::exit(error.exit_code());
    }
}

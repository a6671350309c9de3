use std::path::PathBuf;
use std::process;

use clap::Parser;

use cfn_site_deploy::cli::SourceArgs;
use cfn_site_deploy::{site, Error};

#[derive(Parser)]
#[command(
    name = "host-cloudfront",
    version,
    about = "Upload the web app to the S3 bucket behind the CloudFront distribution"
)]
struct Args {
    /// The path of the dist folder containing the built app
    #[arg(value_name = "DIST", default_value = "./dist")]
    dist_folder: PathBuf,

    #[command(flatten)]
    source: SourceArgs,
}

async fn run(args: Args) -> Result<(), Error> {
    let config = args.source.resolve()?;
    site::publish(&config, &args.dist_folder).await
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

use std::path::PathBuf;
use std::process;

use clap::Parser;

use cfn_site_deploy::amplify::Publisher;
use cfn_site_deploy::cli::SourceArgs;
use cfn_site_deploy::Error;

#[derive(Parser)]
#[command(
    name = "host-amplify",
    version,
    about = "Create an Amplify Application to host the web app"
)]
struct Args {
    /// The path of the dist folder containing the built app
    #[arg(value_name = "DIST", default_value = "./dist")]
    dist_folder: PathBuf,

    #[command(flatten)]
    source: SourceArgs,

    /// Delete the Amplify Application instead of publishing
    #[arg(short, long)]
    un_host: bool,
}

async fn run(args: Args) -> Result<(), Error> {
    let config = args.source.resolve()?;
    let publisher = Publisher::new(&config.stack_name, &config.region).await;

    if args.un_host {
        publisher.unhost().await?;
    } else {
        publisher.publish(&args.dist_folder).await?;
    }

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

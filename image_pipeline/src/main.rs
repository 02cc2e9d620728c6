use argh::FromArgs;
use image_pipeline::{config, init_tracing, start_app};
use std::path::PathBuf;

#[derive(FromArgs)]
/// Letterbox an image, run object detection on it and print the artifact paths.
struct Args {
    /// image to process (jpg, jpeg, png or gif)
    #[argh(positional)]
    image: PathBuf,

    /// directory holding base.yaml and the environment overlays
    #[argh(option, default = "PathBuf::from(\"configuration\")")]
    config_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    let config = config::get_configuration(&args.config_dir)?;
    init_tracing(&config.log_level);

    let output = match start_app(&config, &args.image) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("Request failed: {:#}", e);
            return Err(e);
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

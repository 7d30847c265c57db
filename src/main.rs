#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

/// View a glTF model with orbit controls.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "orbit-viewer", version, about)]
struct Cli {
    /// glTF or GLB file, relative to the working directory
    #[arg(default_value = "public/scene.gltf")]
    asset: String,

    /// Window title
    #[arg(long, default_value = "orbit-viewer")]
    title: String,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = orbit_viewer::ViewerConfig {
        asset_path: cli.asset,
        title: cli.title,
        ..Default::default()
    };
    orbit_viewer::flow::run(config)
}

// The web build starts from the library's wasm entry point.
#[cfg(target_arch = "wasm32")]
fn main() {}

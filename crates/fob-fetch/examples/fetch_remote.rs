//! Fetch a package entry and one of its subpaths from the live CDNs.
//!
//! ```sh
//! cargo run -p fob-fetch --example fetch_remote -- react 18.2.0
//! ```

use std::env;

use fob_fetch::{FetchConfig, Manifest, ModuleFetcher, ModuleGraph};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "react".to_string());
    let version = args.next().unwrap_or_else(|| "18.2.0".to_string());

    let fetcher = ModuleFetcher::builder()
        .config(FetchConfig::load(None)?)
        .manifest(Manifest::new().with_dependency(&name, &version))
        .build()?;
    let graph = ModuleGraph::new();

    let entry = fetcher.fetch_module(&name, "/src/index.js", &graph).await?;
    println!("{name}@{version} entry: {} ({} bytes)", entry.path, entry.code.len());

    let manifest = fetcher
        .fetch_module(&format!("{name}/package.json"), "/src/index.js", &graph)
        .await?;
    println!("manifest: {}", manifest.path);

    println!("graph: {:?}", graph.paths());
    println!("cache: {:?}", fetcher.cache().stats());

    Ok(())
}

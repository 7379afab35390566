//! Thread-safe concurrent access example.
//!
//! This example demonstrates:
//! - Sharing one ModuleGraph handle across threads
//! - Concurrent writers racing to register the same downloaded file
//! - Reading edges back from the main thread

use std::thread;

use fob_graph::{ModuleGraph, TranspiledModule};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let graph = ModuleGraph::new();
    graph.add_module(TranspiledModule::new(
        "/src/index.js",
        "require('react'); require('react-dom');",
    ));
    graph.add_module(TranspiledModule::new("/src/app.js", "require('react');"));

    // Every requester downloads react's package.json; only the first copy is kept
    let mut handles = vec![];
    for requester in ["/src/index.js", "/src/app.js", "/node_modules/react-dom/index.js"] {
        let graph = graph.clone();
        handles.push(thread::spawn(move || {
            let module = graph.get_or_add_module(TranspiledModule::downloaded(
                "/node_modules/react/package.json",
                format!(r#"{{"name":"react","version":"18.2.0","fetchedBy":"{requester}"}}"#),
            ));
            graph.add_dependency(requester, module.path.clone());
            module
        }));
    }

    let mut kept = vec![];
    for handle in handles {
        kept.push(handle.join().map_err(|_| "worker thread panicked")?);
    }

    let code = graph.code("/node_modules/react/package.json")?;
    println!("Modules: {}", graph.len());
    println!("Stored package.json: {code}");
    println!(
        "All workers saw the same copy: {}",
        kept.iter().all(|module| module.code == code)
    );
    println!(
        "Initiators of react/package.json: {:?}",
        graph.initiators("/node_modules/react/package.json")
    );
    println!(
        "/src/index.js requires: {:?}",
        graph.dependencies("/src/index.js")
    );

    Ok(())
}

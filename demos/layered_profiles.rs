// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration with profiles.
//!
//! This example demonstrates:
//! - Loading `app.properties` and `config/app.properties` from a working directory
//! - Activating a profile from the command line and picking up `app-<profile>.properties`
//! - Profile-conditional documents and `${...}` placeholders
//! - Observing what the engine adds through an update listener
//!
//! To run this example:
//! ```bash
//! cargo run --example layered_profiles -- --app.profiles.active=prod
//! ```

use layercfg::domain::ConfigResource;
use layercfg::ports::EnvironmentUpdateListener;
use layercfg::prelude::*;
use layercfg::service::placeholder::{resolve_placeholders, SourcesPlaceholderResolver};
use std::fs;
use std::sync::Arc;

struct PrintingListener;

impl EnvironmentUpdateListener for PrintingListener {
    fn on_property_source_added(
        &self,
        source: &Arc<dyn PropertySource>,
        location: Option<&ConfigDataLocation>,
        _resource: Option<&ConfigResource>,
    ) {
        match location {
            Some(location) => println!("  + {} (from {})", source.name(), location),
            None => println!("  + {}", source.name()),
        }
    }

    fn on_set_profiles(&self, profiles: &Profiles) {
        println!("  active profiles: {:?}", profiles.active());
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== layercfg: Layered Profiles ===\n");

    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("config"))?;
    fs::write(
        dir.path().join("app.properties"),
        "app.name=demo\nserver.port=8080\ngreeting=hello from ${app.name}\n\
         #---\napp.config.activate.on-profile=prod\nserver.port=443\n",
    )?;
    fs::write(dir.path().join("config/app.properties"), "server.host=localhost\n")?;
    fs::write(dir.path().join("app-prod.properties"), "server.host=example.com\n")?;

    let mut env = StandardEnvironment::system();
    println!("--- Applying config data ---");
    let profiles = ConfigDataEnvironmentBuilder::new()
        .base_dir(dir.path())
        .resource_root(dir.path().join("resources"))
        .listener(Arc::new(PrintingListener))
        .build(&env)?
        .process_and_apply(&mut env)?;

    println!("\n--- Resolved values ---");
    let resolver = SourcesPlaceholderResolver::new(env.property_sources());
    for key in ["greeting", "server.host", "server.port"] {
        match env.get_property(key) {
            Some(value) => println!("{} = {}", key, resolve_placeholders(value.as_str(), &resolver)?),
            None => println!("{} is not set", key),
        }
    }
    if let Some(port) = env.get_property("server.port") {
        println!("port as number: {}", port.as_u64("server.port")?);
    }
    println!("\nprofiles: active={:?} default={:?}", profiles.active(), profiles.default());

    Ok(())
}

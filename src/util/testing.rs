use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{Forest, MetadataBundle, NodeId};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else if let Err(e) = subscriber.try_init() {
        eprintln!("Error: Failed to set up logging: {}", e);
    }
    debug!(rust_log = ?env::var("RUST_LOG").ok(), "test logging ready");
}

/// Handles into the sample tree built by [`sample_tree`].
#[derive(Debug, Clone, Copy)]
pub struct SampleTree {
    pub root: NodeId,
    pub a: NodeId,
    pub b: NodeId,
    pub c: NodeId,
    pub d: NodeId,
}

/// Build `R` with children `a` (holding `b`, which holds `c`) and `d`,
/// plus a bundle `md` on the root.
///
/// ```text
/// R [md]
/// ├── a
/// │   └── b
/// │       └── c
/// └── d
/// ```
pub fn sample_tree(forest: &mut Forest) -> crate::domain::DomainResult<SampleTree> {
    let root = forest.new_root("R");
    forest.set_metadata(root, MetadataBundle::new("md").with("units", "nm"))?;
    let a = forest.new_node("a");
    let b = forest.new_node("b");
    let c = forest.new_node("c");
    let d = forest.new_node("d");
    forest.add_child(root, a)?;
    forest.add_child(a, b)?;
    forest.add_child(b, c)?;
    forest.add_child(root, d)?;
    Ok(SampleTree { root, a, b, c, d })
}

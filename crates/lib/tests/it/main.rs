/*! Integration tests for Deepmap.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - node_ops: Tests for scalar access, mutation, and auto-vivification
 * - paths: Tests for multi-segment path operations
 * - locking: Tests for the tri-state inheritable lock
 * - linkage: Tests for parent/key/root tracking across attach and detach
 * - traversal: Tests for shallow and deep iteration
 * - wrap: Tests for building trees from JSON sources
 * - serialization: Tests for serde round-trips
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("deepmap=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod linkage;
mod serialization;

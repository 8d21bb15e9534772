// crates/promql-compliance-config/tests/common/mod.rs
// ============================================================================
// Module: Config Test Support
// Description: Minimal valid configuration fixtures.
// Purpose: Share a baseline config across config test binaries.
// ============================================================================
//! ## Overview
//! Provides a minimal TOML document that individual tests extend.

#![allow(dead_code, reason = "Shared test helpers are not used by every test binary.")]

/// Minimal valid TOML configuration.
pub const MINIMAL_TOML: &str = r#"
[reference_target]
query_url = "http://localhost:9090"

[test_target]
query_url = "https://engine.example.com/prometheus"
"#;

/// Appends `extra` to the minimal configuration.
pub fn with_minimal(extra: &str) -> String {
    format!("{MINIMAL_TOML}\n{extra}")
}

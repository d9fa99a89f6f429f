//! Test-only crate. The integration suite lives under `tests/`.

//! Integration test package for the zpoly workspace.
//!
//! The tests live in `tests/`; this library target is intentionally empty.

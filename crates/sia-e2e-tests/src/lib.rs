//! End-to-end tests for the server inventory assistant.
//!
//! The tests live under `tests/` and drive `Assistant` and the HTTP router
//! against the sample inventory, mock inventory APIs and mock completion
//! providers.

/*
 * This module provides the application logic layer, centered around
 * `InstallationLogic`, which acts as the Presenter/Controller between the
 * platform's events and the core session. Visitor-facing strings live in
 * `ui_constants`. Unit tests for `InstallationLogic` are in `handler_tests.rs`.
 */
pub mod handler;
pub mod ui_constants;


pub use handler::InstallationLogic;

//! In-process HTTP testing for apiscribe routers.

mod app;

pub use app::{resolve_path, TestApp, TestRequest, TestResponse};

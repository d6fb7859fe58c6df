//! Integration tests: controller and worker driven by a scripted warp-cli

mod controller_tests;
mod support;
mod worker_tests;

//! Integration test harness.

mod helpers;

mod api_test;
mod gateway_test;

//! # CLI Module
//!
//! ```bash
//! # Run the server described by a YAML configuration file
//! chainroute serve --config chainroute.yaml --addr 127.0.0.1:8080
//!
//! # Which URI does a handler answer?
//! chainroute uri --namespace app.actions app.actions.sub.SomeTestAction
//! /sub/someTest
//!
//! # Which handler would serve a URI?
//! chainroute resolve --namespace app.actions /sub/someTest
//! app.actions.sub.SomeTestAction
//! ```

mod commands;


pub use commands::{candidate_of, index_handler_id, run, run_cli, uri_of, Cli, Commands};

//! Behavioural tests for the snapshot lifecycle.

mod bdd_steps;
mod scenarios;
mod test_helpers;

#[macro_use]
mod fixture;

mod cli_tests;
mod persistence_tests;

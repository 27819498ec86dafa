//! Integration tests across nodes, traversals and importers

mod bounds_integration;
mod commit_integration;

//! Unit-level scenario tests for the reconciliation and ranking engine

pub mod scenarios;

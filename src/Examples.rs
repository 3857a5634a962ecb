//! examples of usage of RustedCollo
/// scaling of the hypersensitive problem over mesh iterations
pub mod scaling_examples;

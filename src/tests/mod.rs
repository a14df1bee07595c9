mod common;
mod synthetics_tests;

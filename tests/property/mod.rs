// Property-based tests for the countdown arithmetic
mod decompose_properties;

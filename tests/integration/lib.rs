#![cfg(test)]

mod staking_flow_tests;

#![cfg(test)]

mod test_model;

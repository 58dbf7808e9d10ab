pub mod special;

#[cfg(test)]
mod special_test;

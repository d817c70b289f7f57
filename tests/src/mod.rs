#[cfg(test)]
pub mod read_path_tests;
#[cfg(test)]
pub mod session_tests;
#[cfg(test)]
pub mod utils;
#[cfg(test)]
pub mod write_path_tests;

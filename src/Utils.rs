//! different utility modules used throughout the project
/// logger setup and saving of vectors into csv files
pub mod logger;

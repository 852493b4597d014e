// Command-line front end for the Try It Sevens league data.

pub mod cli;
pub mod commands;
pub mod render;

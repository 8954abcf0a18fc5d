pub mod command_list;
pub mod execute;

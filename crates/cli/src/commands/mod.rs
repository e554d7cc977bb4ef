pub mod init;
pub mod locations;
pub mod run;

pub use init::init_command;
pub use locations::locations_command;
pub use run::run_command;

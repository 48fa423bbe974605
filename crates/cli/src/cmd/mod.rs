mod build;
mod info;
mod stamp;
mod verify;

pub use build::cmd_build;
pub use info::cmd_info;
pub use stamp::cmd_stamp;
pub use verify::cmd_verify;

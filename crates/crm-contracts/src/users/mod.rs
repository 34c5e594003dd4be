//! User administration contracts

pub mod base;
pub mod create;
pub mod password;
pub mod update;

pub use base::UserBaseContract;
pub use create::CreateUserContract;
pub use password::ChangePasswordContract;
pub use update::UpdateUserContract;

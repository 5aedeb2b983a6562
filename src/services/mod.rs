//! Use cases behind the HTTP handlers. Every operation takes the request's
//! `Deadline` and reports failures as `AppError`.

pub mod admin;
pub mod directory;
pub mod tasks;

pub use admin::AdminService;
pub use directory::UserDirectory;
pub use tasks::TaskService;

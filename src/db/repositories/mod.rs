pub mod feed;
pub mod invitation;
pub mod label;
pub mod session;
pub mod user;
pub mod workspace;

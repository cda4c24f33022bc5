pub mod prelude;

pub mod feed_comments;
pub mod feed_labels;
pub mod feeds;
pub mod sessions;
pub mod users;
pub mod workspace_invitations;
pub mod workspace_members;
pub mod workspaces;

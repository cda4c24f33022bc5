pub use super::feed_comments::Entity as FeedComments;
pub use super::feed_labels::Entity as FeedLabels;
pub use super::feeds::Entity as Feeds;
pub use super::sessions::Entity as Sessions;
pub use super::users::Entity as Users;
pub use super::workspace_invitations::Entity as WorkspaceInvitations;
pub use super::workspace_members::Entity as WorkspaceMembers;
pub use super::workspaces::Entity as Workspaces;

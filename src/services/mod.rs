pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod workspace_service;
pub mod workspace_service_impl;
pub use workspace_service::{
    InvitationInfo, MemberInfo, WorkspaceDetail, WorkspaceError, WorkspaceInfo, WorkspaceService,
    WorkspaceSummary,
};
pub use workspace_service_impl::SeaOrmWorkspaceService;

pub mod feed_service;
pub mod feed_service_impl;
pub use feed_service::{CommentInfo, FeedDetail, FeedError, FeedInfo, FeedService, LabelInfo};
pub use feed_service_impl::SeaOrmFeedService;

pub mod mailer;
pub use mailer::{InvitationEmail, LogMailer, Mailer, MailerError, ResendMailer};

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "workspaces")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    /// Stored lowercase; uniqueness is therefore case-insensitive
    #[sea_orm(unique)]
    pub slug: String,

    pub owner_id: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,

    #[sea_orm(has_many = "super::workspace_members::Entity")]
    WorkspaceMembers,

    #[sea_orm(has_many = "super::workspace_invitations::Entity")]
    WorkspaceInvitations,

    #[sea_orm(has_many = "super::feeds::Entity")]
    Feeds,

    #[sea_orm(has_many = "super::feed_labels::Entity")]
    FeedLabels,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::workspace_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkspaceMembers.def()
    }
}

impl Related<super::workspace_invitations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkspaceInvitations.def()
    }
}

impl Related<super::feeds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feeds.def()
    }
}

impl Related<super::feed_labels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeedLabels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

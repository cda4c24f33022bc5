use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Sessions)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Workspaces)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(WorkspaceMembers)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(WorkspaceInvitations)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Feeds)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(FeedComments)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(FeedLabels)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // At most one role per (workspace, user) pair
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_workspace_members_workspace_user")
                    .table(WorkspaceMembers)
                    .col(crate::entities::workspace_members::Column::WorkspaceId)
                    .col(crate::entities::workspace_members::Column::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FeedLabels).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FeedComments).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Feeds).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkspaceInvitations).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkspaceMembers).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Workspaces).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}

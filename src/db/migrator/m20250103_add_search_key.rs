use crate::entities::{facilities, prelude::*};
use crate::models::facility::search_key;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_column("facilities", "search_key").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Facilities)
                        .add_column(
                            ColumnDef::new(facilities::Column::SearchKey)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .to_owned(),
                )
                .await?;
        }

        // SQLite's LOWER() only folds ASCII, so existing rows are keyed here.
        let conn = manager.get_connection();
        let backend = manager.get_database_backend();

        let select = Query::select()
            .columns([
                facilities::Column::Id,
                facilities::Column::FacilityName,
                facilities::Column::Address,
            ])
            .from(Facilities)
            .to_owned();

        for row in conn.query_all(backend.build(&select)).await? {
            let id: i32 = row.try_get("", "id")?;
            let name: String = row.try_get("", "facility_name")?;
            let address: Option<String> = row.try_get("", "address")?;

            let update = Query::update()
                .table(Facilities)
                .value(
                    facilities::Column::SearchKey,
                    search_key(&name, address.as_deref()),
                )
                .and_where(Expr::col(facilities::Column::Id).eq(id))
                .to_owned();

            manager.exec_stmt(update).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.has_column("facilities", "search_key").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Facilities)
                        .drop_column(facilities::Column::SearchKey)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

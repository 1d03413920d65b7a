use sea_orm_migration::prelude::*;

/// Creates `devices`, `updates` and `firmware`.
///
/// Every statement is `IF NOT EXISTS`, so running this against a database
/// that already holds the relations leaves them untouched. There is no
/// `down`: the release history is append-only and never dropped.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 devices 表（codename 为自然键）
        manager
            .create_table(
                Table::create()
                    .table(Devices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Devices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Devices::Name).string_len(40).not_null())
                    .col(
                        ColumnDef::new(Devices::Codename)
                            .string_len(30)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Devices::Region).string_len(30).not_null())
                    .col(ColumnDef::new(Devices::MiuiName).string_len(30).not_null())
                    .col(ColumnDef::new(Devices::MiuiCode).string_len(6).not_null())
                    .col(ColumnDef::new(Devices::MiWebsiteId).integer().null())
                    .col(ColumnDef::new(Devices::Picture).text().null())
                    .col(
                        ColumnDef::new(Devices::Eol)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Devices::FirmwareUpdater)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 updates 表
        manager
            .create_table(
                Table::create()
                    .table(Updates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Updates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Updates::Codename).string_len(30).not_null())
                    .col(ColumnDef::new(Updates::Version).string_len(40).not_null())
                    .col(ColumnDef::new(Updates::Android).string_len(5).not_null())
                    .col(ColumnDef::new(Updates::Branch).string_len(15).not_null())
                    .col(ColumnDef::new(Updates::Type).string_len(11).not_null())
                    .col(ColumnDef::new(Updates::Method).string_len(8).not_null())
                    .col(ColumnDef::new(Updates::Size).big_integer().null())
                    .col(ColumnDef::new(Updates::Md5).char_len(32).null().unique_key())
                    .col(
                        ColumnDef::new(Updates::Filename)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Updates::Link).text().not_null())
                    .col(ColumnDef::new(Updates::Changelog).text().null())
                    .col(ColumnDef::new(Updates::Date).date().null())
                    .col(
                        ColumnDef::new(Updates::InsertedOn)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_updates_codename")
                            .from(Updates::Table, Updates::Codename)
                            .to(Devices::Table, Devices::Codename)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 firmware 表
        manager
            .create_table(
                Table::create()
                    .table(Firmware::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Firmware::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Firmware::Codename).string_len(30).not_null())
                    .col(ColumnDef::new(Firmware::Version).string_len(40).not_null())
                    .col(ColumnDef::new(Firmware::Android).string_len(5).not_null())
                    .col(ColumnDef::new(Firmware::Branch).string_len(15).not_null())
                    .col(ColumnDef::new(Firmware::Size).big_integer().null())
                    .col(ColumnDef::new(Firmware::Md5).char_len(32).null().unique_key())
                    .col(
                        ColumnDef::new(Firmware::Filename)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Firmware::GithubLink).text().not_null())
                    .col(ColumnDef::new(Firmware::OsdnLink).text().null())
                    .col(ColumnDef::new(Firmware::Date).date().null())
                    .col(
                        ColumnDef::new(Firmware::InsertedOn)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_firmware_codename")
                            .from(Firmware::Table, Firmware::Codename)
                            .to(Devices::Table, Devices::Codename)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // 复合索引（用于按分支取最新版本的扫描）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_updates_codename_branch_type")
                    .table(Updates::Table)
                    .col(Updates::Codename)
                    .col(Updates::Branch)
                    .col(Updates::Type)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_updates_date")
                    .table(Updates::Table)
                    .col(Updates::Date)
                    .to_owned(),
            )
            .await?;

        // 按版本号的点查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_updates_version")
                    .table(Updates::Table)
                    .col(Updates::Version)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_firmware_codename_version")
                    .table(Firmware::Table)
                    .col(Firmware::Codename)
                    .col(Firmware::Version)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Devices {
    Table,
    Id,
    Name,
    Codename,
    Region,
    MiuiName,
    MiuiCode,
    MiWebsiteId,
    Picture,
    Eol,
    FirmwareUpdater,
}

#[derive(DeriveIden)]
enum Updates {
    Table,
    Id,
    Codename,
    Version,
    Android,
    Branch,
    Type,
    Method,
    Size,
    Md5,
    Filename,
    Link,
    Changelog,
    Date,
    InsertedOn,
}

#[derive(DeriveIden)]
enum Firmware {
    Table,
    Id,
    Codename,
    Version,
    Android,
    Branch,
    Size,
    Md5,
    Filename,
    GithubLink,
    OsdnLink,
    Date,
    InsertedOn,
}

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(string(Categories::Name))
                    .col(text(Categories::Description))
                    .col(string(Categories::Url))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_categories_url_unique")
                    .table(Categories::Table)
                    .col(Categories::Url)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genres::Table)
                    .if_not_exists()
                    .col(pk_auto(Genres::Id))
                    .col(string(Genres::Name))
                    .col(text(Genres::Description))
                    .col(string(Genres::Url))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_genres_url_unique")
                    .table(Genres::Table)
                    .col(Genres::Url)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actors::Table)
                    .if_not_exists()
                    .col(pk_auto(Actors::Id))
                    .col(string(Actors::Name))
                    .col(integer(Actors::Age).default(0))
                    .col(text(Actors::Description))
                    .col(string(Actors::Image))
                    .col(string(Actors::Profession).default("actor"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(string(Movies::Title))
                    .col(string(Movies::Tagline).default(""))
                    .col(text(Movies::Description))
                    .col(string(Movies::Poster))
                    .col(integer(Movies::Year))
                    .col(string(Movies::WorldPremiere))
                    .col(string(Movies::Country))
                    .col(big_integer(Movies::Budget).default(0))
                    .col(big_integer(Movies::FeesUsa).default(0))
                    .col(big_integer(Movies::FeesWorld).default(0))
                    .col(integer_null(Movies::CategoryId))
                    .col(string(Movies::Url))
                    .col(boolean(Movies::Draft).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_category")
                            .from(Movies::Table, Movies::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_url_unique")
                    .table(Movies::Table)
                    .col(Movies::Url)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_draft")
                    .table(Movies::Table)
                    .col(Movies::Draft)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieCredits::Table)
                    .if_not_exists()
                    .col(pk_auto(MovieCredits::Id))
                    .col(integer(MovieCredits::MovieId))
                    .col(integer(MovieCredits::ActorId))
                    .col(integer(MovieCredits::Role))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_credits_movie")
                            .from(MovieCredits::Table, MovieCredits::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_credits_actor")
                            .from(MovieCredits::Table, MovieCredits::ActorId)
                            .to(Actors::Table, Actors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_credits_unique")
                    .table(MovieCredits::Table)
                    .col(MovieCredits::MovieId)
                    .col(MovieCredits::ActorId)
                    .col(MovieCredits::Role)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieGenres::Table)
                    .if_not_exists()
                    .col(pk_auto(MovieGenres::Id))
                    .col(integer(MovieGenres::MovieId))
                    .col(integer(MovieGenres::GenreId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genres_movie")
                            .from(MovieGenres::Table, MovieGenres::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genres_genre")
                            .from(MovieGenres::Table, MovieGenres::GenreId)
                            .to(Genres::Table, Genres::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_genres_unique")
                    .table(MovieGenres::Table)
                    .col(MovieGenres::MovieId)
                    .col(MovieGenres::GenreId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieShots::Table)
                    .if_not_exists()
                    .col(pk_auto(MovieShots::Id))
                    .col(string(MovieShots::Title))
                    .col(text(MovieShots::Description))
                    .col(string(MovieShots::Image))
                    .col(integer(MovieShots::MovieId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_shots_movie")
                            .from(MovieShots::Table, MovieShots::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_shots_movie")
                    .table(MovieShots::Table)
                    .col(MovieShots::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MovieShots::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieGenres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieCredits::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Actors::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Categories::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Description,
    Url,
}

#[derive(DeriveIden)]
enum Genres {
    Table,
    Id,
    Name,
    Description,
    Url,
}

#[derive(DeriveIden)]
enum Actors {
    Table,
    Id,
    Name,
    Age,
    Description,
    Image,
    Profession,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Title,
    Tagline,
    Description,
    Poster,
    Year,
    WorldPremiere,
    Country,
    Budget,
    FeesUsa,
    FeesWorld,
    CategoryId,
    Url,
    Draft,
}

#[derive(DeriveIden)]
enum MovieCredits {
    Table,
    Id,
    MovieId,
    ActorId,
    Role,
}

#[derive(DeriveIden)]
enum MovieGenres {
    Table,
    Id,
    MovieId,
    GenreId,
}

#[derive(DeriveIden)]
enum MovieShots {
    Table,
    Id,
    Title,
    Description,
    Image,
    MovieId,
}

//! Game review repository.
//!
//! Simple CRUD; edit and delete verify authorship before writing.

use chrono::Utc;
use sqlx::SqlitePool;

use gamevault_core::{CommentId, GameId, UserId};

use super::RepositoryError;
use crate::models::Comment;

/// Repository for game comments.
pub struct CommentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List a game's comments, newest first, with author usernames.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_game(&self, game: GameId) -> Result<Vec<Comment>, RepositoryError> {
        let comments = sqlx::query_as(
            "SELECT c.id, c.game_id, c.user_id, co.username AS author,
                    c.rating, c.body, c.created_at
             FROM comments c
             JOIN customers co ON co.id = c.user_id
             WHERE c.game_id = ?1
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .bind(game)
        .fetch_all(self.pool)
        .await?;
        Ok(comments)
    }

    /// Get a comment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        let comment = sqlx::query_as(
            "SELECT c.id, c.game_id, c.user_id, co.username AS author,
                    c.rating, c.body, c.created_at
             FROM comments c
             JOIN customers co ON co.id = c.user_id
             WHERE c.id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(comment)
    }

    /// Add a comment to a game.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        game: GameId,
        user: UserId,
        rating: i64,
        body: &str,
    ) -> Result<CommentId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO comments (game_id, user_id, rating, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(game)
        .bind(user)
        .bind(rating)
        .bind(body)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;
        Ok(CommentId::new(result.last_insert_rowid()))
    }

    /// Update a comment's rating and body. Only the author may update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the comment does not exist.
    /// Returns `RepositoryError::Forbidden` if `user` is not the author.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CommentId,
        user: UserId,
        rating: i64,
        body: &str,
    ) -> Result<(), RepositoryError> {
        self.check_author(id, user).await?;

        sqlx::query("UPDATE comments SET rating = ?1, body = ?2 WHERE id = ?3")
            .bind(rating)
            .bind(body)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Delete a comment. Only the author may delete.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the comment does not exist.
    /// Returns `RepositoryError::Forbidden` if `user` is not the author.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CommentId, user: UserId) -> Result<(), RepositoryError> {
        self.check_author(id, user).await?;

        sqlx::query("DELETE FROM comments WHERE id = ?1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn check_author(&self, id: CommentId, user: UserId) -> Result<(), RepositoryError> {
        let author: Option<UserId> = sqlx::query_scalar("SELECT user_id FROM comments WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        match author {
            None => Err(RepositoryError::NotFound),
            Some(author) if author != user => Err(RepositoryError::Forbidden),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use gamevault_core::{Price, Username};

    use super::*;
    use crate::db::{GameRepository, UserRepository, test_pool};

    async fn seed(pool: &SqlitePool) -> (UserId, GameId) {
        let user = UserRepository::new(pool)
            .create(&Username::parse("player_one").expect("valid"), "hash")
            .await
            .expect("user")
            .id;
        let game = GameRepository::new(pool)
            .insert("Star Drifter", "", Price::from_cents(999), "")
            .await
            .expect("game");
        (user, game)
    }

    #[tokio::test]
    async fn test_insert_and_list_with_author() {
        let pool = test_pool().await;
        let (user, game) = seed(&pool).await;
        let repo = CommentRepository::new(&pool);

        repo.insert(game, user, 5, "Great.").await.expect("insert");
        let comments = repo.list_for_game(game).await.expect("list");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author, "player_one");
        assert_eq!(comments[0].rating, 5);
    }

    #[tokio::test]
    async fn test_only_author_may_modify() {
        let pool = test_pool().await;
        let (author, game) = seed(&pool).await;
        let other = UserRepository::new(&pool)
            .create(&Username::parse("player_two").expect("valid"), "hash")
            .await
            .expect("user")
            .id;
        let repo = CommentRepository::new(&pool);

        let id = repo.insert(game, author, 4, "Good.").await.expect("insert");

        assert!(matches!(
            repo.update(id, other, 1, "Bad.").await,
            Err(RepositoryError::Forbidden)
        ));
        assert!(matches!(
            repo.delete(id, other).await,
            Err(RepositoryError::Forbidden)
        ));

        repo.update(id, author, 3, "Fine.").await.expect("update");
        let comment = repo.get(id).await.expect("get").expect("present");
        assert_eq!(comment.body, "Fine.");

        repo.delete(id, author).await.expect("delete");
        assert!(repo.get(id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_missing_comment_is_not_found() {
        let pool = test_pool().await;
        let (user, _) = seed(&pool).await;
        let repo = CommentRepository::new(&pool);

        assert!(matches!(
            repo.delete(CommentId::new(42), user).await,
            Err(RepositoryError::NotFound)
        ));
    }
}

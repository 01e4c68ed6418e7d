use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Postgres, Row, Transaction};
use thiserror::Error;

use threadboard_core::domain::{Comment, CommentId, NewComment, NewPost, Post, PostId};
use threadboard_core::store::{BoardRepository, BoardStore, StoreError, StoreResult};

#[derive(Debug, Error)]
pub enum BoardRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("post {0} does not exist")]
    MissingPost(PostId),
}

impl From<BoardRepoError> for StoreError {
    fn from(err: BoardRepoError) -> Self {
        match err {
            BoardRepoError::MissingPost(_) => StoreError::Integrity(err.to_string()),
            BoardRepoError::Sqlx(inner) => StoreError::backend(inner),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgBoardRepository {
    pool: PgPool,
}

impl PgBoardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// One Postgres transaction. Dropping it without `commit` rolls back.
pub struct PgBoardStore {
    tx: Transaction<'static, Postgres>,
}

impl BoardRepository for PgBoardRepository {
    type Store = PgBoardStore;

    async fn begin(&self) -> StoreResult<PgBoardStore> {
        let tx = self.pool.begin().await.map_err(BoardRepoError::from)?;
        Ok(PgBoardStore { tx })
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

impl BoardStore for PgBoardStore {
    async fn insert_post(&mut self, post: NewPost) -> StoreResult<Post> {
        Ok(insert_post(&mut self.tx, &post).await?)
    }

    async fn update_post(&mut self, post: &Post) -> StoreResult<Post> {
        Ok(update_post(&mut self.tx, post).await?)
    }

    async fn find_post(&mut self, id: PostId) -> StoreResult<Option<Post>> {
        Ok(find_post(&mut self.tx, id).await?)
    }

    async fn post_exists(&mut self, id: PostId) -> StoreResult<bool> {
        Ok(post_exists(&mut self.tx, id).await?)
    }

    async fn delete_post(&mut self, id: PostId) -> StoreResult<()> {
        Ok(delete_post(&mut self.tx, id).await?)
    }

    async fn list_posts(&mut self) -> StoreResult<Vec<Post>> {
        Ok(list_posts(&mut self.tx).await?)
    }

    async fn insert_comment(&mut self, comment: NewComment) -> StoreResult<Comment> {
        Ok(insert_comment(&mut self.tx, &comment).await?)
    }

    async fn find_comment(&mut self, id: CommentId) -> StoreResult<Option<Comment>> {
        Ok(find_comment(&mut self.tx, id).await?)
    }

    async fn delete_comment(&mut self, id: CommentId) -> StoreResult<()> {
        Ok(delete_comment(&mut self.tx, id).await?)
    }

    async fn find_top_level_comments(&mut self, post_id: PostId) -> StoreResult<Vec<Comment>> {
        Ok(find_top_level_comments(&mut self.tx, post_id).await?)
    }

    async fn find_replies(&mut self, parent_id: CommentId) -> StoreResult<Vec<Comment>> {
        Ok(find_replies(&mut self.tx, parent_id).await?)
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(BoardRepoError::from)?;
        Ok(())
    }
}

pub async fn insert_post(conn: &mut PgConnection, post: &NewPost) -> Result<Post, BoardRepoError> {
    let row = sqlx::query(
        r#"
        INSERT INTO posts (title, content, author)
        VALUES ($1, $2, $3)
        RETURNING id, title, content, author, created_at, updated_at
        "#,
    )
    .bind(post.title.as_str())
    .bind(post.content.as_str())
    .bind(&post.author)
    .fetch_one(conn)
    .await?;
    Ok(map_post(&row)?)
}

pub async fn update_post(conn: &mut PgConnection, post: &Post) -> Result<Post, BoardRepoError> {
    let row = sqlx::query(
        r#"
        UPDATE posts
        SET title = $2,
            content = $3,
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, title, content, author, created_at, updated_at
        "#,
    )
    .bind(post.id.get())
    .bind(&post.title)
    .bind(&post.content)
    .fetch_optional(conn)
    .await?;
    let row = row.ok_or(BoardRepoError::MissingPost(post.id))?;
    Ok(map_post(&row)?)
}

pub async fn find_post(
    conn: &mut PgConnection,
    id: PostId,
) -> Result<Option<Post>, BoardRepoError> {
    let row = sqlx::query(
        r#"
        SELECT id, title, content, author, created_at, updated_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .fetch_optional(conn)
    .await?;
    Ok(row.as_ref().map(map_post).transpose()?)
}

pub async fn post_exists(conn: &mut PgConnection, id: PostId) -> Result<bool, BoardRepoError> {
    let row = sqlx::query(
        r#"
        SELECT 1
        FROM posts
        WHERE id = $1
        LIMIT 1
        "#,
    )
    .bind(id.get())
    .fetch_optional(conn)
    .await?;
    Ok(row.is_some())
}

pub async fn delete_post(conn: &mut PgConnection, id: PostId) -> Result<(), BoardRepoError> {
    sqlx::query(
        r#"
        DELETE FROM posts
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn list_posts(conn: &mut PgConnection) -> Result<Vec<Post>, BoardRepoError> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, content, author, created_at, updated_at
        FROM posts
        ORDER BY id ASC
        "#,
    )
    .fetch_all(conn)
    .await?;
    let mut posts = Vec::with_capacity(rows.len());
    for row in &rows {
        posts.push(map_post(row)?);
    }
    Ok(posts)
}

pub async fn insert_comment(
    conn: &mut PgConnection,
    comment: &NewComment,
) -> Result<Comment, BoardRepoError> {
    let row = sqlx::query(
        r#"
        INSERT INTO comments (post_id, parent_id, content, author)
        VALUES ($1, $2, $3, $4)
        RETURNING id, post_id, parent_id, content, author, created_at
        "#,
    )
    .bind(comment.post_id.get())
    .bind(comment.parent_id.map(CommentId::get))
    .bind(comment.content.as_str())
    .bind(&comment.author)
    .fetch_one(conn)
    .await?;
    Ok(map_comment(&row)?)
}

pub async fn find_comment(
    conn: &mut PgConnection,
    id: CommentId,
) -> Result<Option<Comment>, BoardRepoError> {
    let row = sqlx::query(
        r#"
        SELECT id, post_id, parent_id, content, author, created_at
        FROM comments
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .fetch_optional(conn)
    .await?;
    Ok(row.as_ref().map(map_comment).transpose()?)
}

pub async fn delete_comment(conn: &mut PgConnection, id: CommentId) -> Result<(), BoardRepoError> {
    sqlx::query(
        r#"
        DELETE FROM comments
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_top_level_comments(
    conn: &mut PgConnection,
    post_id: PostId,
) -> Result<Vec<Comment>, BoardRepoError> {
    let rows = sqlx::query(
        r#"
        SELECT id, post_id, parent_id, content, author, created_at
        FROM comments
        WHERE post_id = $1 AND parent_id IS NULL
        ORDER BY id ASC
        "#,
    )
    .bind(post_id.get())
    .fetch_all(conn)
    .await?;
    map_comments(&rows)
}

pub async fn find_replies(
    conn: &mut PgConnection,
    parent_id: CommentId,
) -> Result<Vec<Comment>, BoardRepoError> {
    let rows = sqlx::query(
        r#"
        SELECT id, post_id, parent_id, content, author, created_at
        FROM comments
        WHERE parent_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(parent_id.get())
    .fetch_all(conn)
    .await?;
    map_comments(&rows)
}

fn map_post(row: &PgRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        id: PostId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_comment(row: &PgRow) -> Result<Comment, sqlx::Error> {
    let parent_id: Option<i64> = row.try_get("parent_id")?;
    Ok(Comment {
        id: CommentId::new(row.try_get("id")?),
        post_id: PostId::new(row.try_get("post_id")?),
        parent_id: parent_id.map(CommentId::new),
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_comments(rows: &[PgRow]) -> Result<Vec<Comment>, BoardRepoError> {
    let mut comments = Vec::with_capacity(rows.len());
    for row in rows {
        comments.push(map_comment(row)?);
    }
    Ok(comments)
}
